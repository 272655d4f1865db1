//! Configuration for the key lifecycle

use serde::{Deserialize, Serialize};
use shared_types::MAX_KEY_VALUE_LEN;
use std::time::Duration;
use thiserror::Error;

/// Settlement participant id this institution acts as.
pub const DEFAULT_PARTICIPANT_ID: &str = "60701190";

/// Display name of this institution.
pub const DEFAULT_INSTITUTION_NAME: &str = "ITAÚ UNIBANCO S.A.";

/// Lifecycle configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Participant id attached to registry save/delete calls
    pub participant_id: String,
    /// Bank name reported for accounts held at this participant
    pub institution_name: String,
    /// Longest accepted key value
    pub max_key_length: usize,
    /// Budget for registry calls
    pub registry_policy: CallPolicy,
    /// Budget for directory calls
    pub directory_policy: CallPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            participant_id: DEFAULT_PARTICIPANT_ID.to_string(),
            institution_name: DEFAULT_INSTITUTION_NAME.to_string(),
            max_key_length: MAX_KEY_VALUE_LEN,
            registry_policy: CallPolicy::default(),
            directory_policy: CallPolicy::default(),
        }
    }
}

impl LifecycleConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), LifecycleConfigError> {
        if self.participant_id.trim().is_empty() {
            return Err(LifecycleConfigError::MissingParticipant);
        }
        if self.max_key_length == 0 || self.max_key_length > MAX_KEY_VALUE_LEN {
            return Err(LifecycleConfigError::InvalidKeyLength(self.max_key_length));
        }
        self.registry_policy.validate("registry")?;
        self.directory_policy.validate("directory")?;
        Ok(())
    }
}

/// Timeout and retry budget for one external collaborator.
///
/// `max_attempts` applies to idempotent reads only. Writes always run once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallPolicy {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Attempts for idempotent calls (1 = no retry)
    pub max_attempts: u32,
    /// Pause between attempts
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            backoff: Duration::from_millis(200),
        }
    }
}

impl CallPolicy {
    fn validate(&self, collaborator: &'static str) -> Result<(), LifecycleConfigError> {
        if self.timeout.is_zero() {
            return Err(LifecycleConfigError::InvalidPolicy {
                collaborator,
                reason: "timeout cannot be 0",
            });
        }
        if self.max_attempts == 0 {
            return Err(LifecycleConfigError::InvalidPolicy {
                collaborator,
                reason: "max_attempts cannot be 0",
            });
        }
        Ok(())
    }
}

/// Lifecycle configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleConfigError {
    #[error("participant id cannot be empty")]
    MissingParticipant,

    #[error("max key length must be within 1..={MAX_KEY_VALUE_LEN}, got {0}")]
    InvalidKeyLength(usize),

    #[error("invalid {collaborator} call policy: {reason}")]
    InvalidPolicy {
        collaborator: &'static str,
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LifecycleConfig::default();
        assert_eq!(config.participant_id, "60701190");
        assert_eq!(config.max_key_length, 77);
        assert_eq!(config.registry_policy.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_blank_participant() {
        let config = LifecycleConfig {
            participant_id: "  ".into(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(LifecycleConfigError::MissingParticipant)
        );
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let config = LifecycleConfig {
            directory_policy: CallPolicy {
                max_attempts: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LifecycleConfigError::InvalidPolicy {
                collaborator: "directory",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_key_length_above_registry_limit() {
        let config = LifecycleConfig {
            max_key_length: 78,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(LifecycleConfigError::InvalidKeyLength(78))
        );
    }
}
