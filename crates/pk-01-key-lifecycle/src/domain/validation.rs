//! Key format rules
//!
//! One [`KeyFormat`] implementation per key type, selected by [`format_for`].
//! All rules are pure and total: they return `false` rather than failing.

use regex::Regex;
use shared_types::KeyType;
use std::sync::LazyLock;

static TAX_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{3}\.?[0-9]{3}\.?[0-9]{3}-[0-9]{2}|[0-9]{11})$")
        .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+[1-9][0-9]{1,14}$").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Format rule for one key type.
pub trait KeyFormat: Send + Sync {
    /// Whether `value` is acceptable as a key of this type.
    fn is_valid(&self, value: &str) -> bool;
}

/// CPF: `ddd.ddd.ddd-dd` (dots optional) or bare 11 digits, with both
/// mod-11 check digits.
pub struct TaxIdFormat;

/// E.164-shaped phone number.
pub struct PhoneFormat;

/// `local@domain` address.
pub struct EmailFormat;

/// Random keys accept only the absence of a caller value.
pub struct RandomFormat;

impl KeyFormat for TaxIdFormat {
    fn is_valid(&self, value: &str) -> bool {
        if is_blank(value) || !TAX_ID_PATTERN.is_match(value) {
            return false;
        }

        let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
        if digits.iter().all(|d| *d == digits[0]) {
            return false;
        }

        let first = cpf_check_digit(&digits[..9]);
        let second = cpf_check_digit(&digits[..10]);
        digits[9] == first && digits[10] == second
    }
}

impl KeyFormat for PhoneFormat {
    fn is_valid(&self, value: &str) -> bool {
        !is_blank(value) && PHONE_PATTERN.is_match(value)
    }
}

impl KeyFormat for EmailFormat {
    fn is_valid(&self, value: &str) -> bool {
        !is_blank(value) && EMAIL_PATTERN.is_match(value)
    }
}

impl KeyFormat for RandomFormat {
    fn is_valid(&self, value: &str) -> bool {
        is_blank(value)
    }
}

/// Rule for a key type.
pub fn format_for(key_type: KeyType) -> &'static dyn KeyFormat {
    match key_type {
        KeyType::TaxId => &TaxIdFormat,
        KeyType::Phone => &PhoneFormat,
        KeyType::Email => &EmailFormat,
        KeyType::Random => &RandomFormat,
    }
}

/// Validate `value` against the rule of `key_type`.
pub fn is_valid(key_type: KeyType, value: &str) -> bool {
    format_for(key_type).is_valid(value)
}

/// Empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Mod-11 check digit over `digits`, weights descending from `len + 1` to 2.
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    match sum % 11 {
        0 | 1 => 0,
        rest => 11 - rest,
    }
}
