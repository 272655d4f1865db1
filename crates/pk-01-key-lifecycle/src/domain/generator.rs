//! Key value generation
//!
//! Produces the value to register for a key. Runs after format validation and
//! never re-checks format.

use shared_types::KeyType;
use uuid::Uuid;

use crate::domain::errors::KeyError;
use crate::domain::validation::is_blank;

/// Value to register for a key of `key_type` given the caller's input.
///
/// Random keys get a fresh UUID v4 and ignore `caller_value`. Every other
/// type returns `caller_value` unchanged and requires it to be non-blank.
pub fn generate(key_type: KeyType, caller_value: &str) -> Result<String, KeyError> {
    if key_type.is_random() {
        return Ok(Uuid::new_v4().to_string());
    }

    if is_blank(caller_value) {
        return Err(KeyError::KeyValueRequired);
    }

    Ok(caller_value.to_string())
}
