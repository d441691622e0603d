//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// A grace margin longer than this is almost certainly a misconfigured unit
const MAX_GRACE_SECONDS: u64 = 24 * 3600;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Policy field '{field}': {message}")]
    PolicyError { field: String, message: String },

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_grace(
        "join_grace_before_seconds",
        config.policy.join_grace_before_seconds,
        &mut errors,
    );
    validate_grace(
        "join_grace_after_seconds",
        config.policy.join_grace_after_seconds,
        &mut errors,
    );
    validate_grace(
        "ask_grace_after_seconds",
        config.policy.ask_grace_after_seconds,
        &mut errors,
    );

    if let Some(max_chars) = config.policy.max_question_chars
        && max_chars == 0
    {
        errors.push(ValidationError::PolicyError {
            field: "max_question_chars".into(),
            message: "must be greater than zero".into(),
        });
    }

    errors
}

fn validate_grace(field: &str, value: Option<u64>, errors: &mut Vec<ValidationError>) {
    if let Some(seconds) = value
        && seconds > MAX_GRACE_SECONDS
    {
        errors.push(ValidationError::PolicyError {
            field: field.to_string(),
            message: format!(
                "{}s exceeds the maximum of {}s (one day)",
                seconds, MAX_GRACE_SECONDS
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawPolicyConfig, RawServiceConfig};

    fn raw_with_policy(policy: RawPolicyConfig) -> RawConfig {
        RawConfig {
            config_version: 1,
            service: RawServiceConfig::default(),
            policy,
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = raw_with_policy(RawPolicyConfig::default());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn oversized_grace_is_rejected() {
        let config = raw_with_policy(RawPolicyConfig {
            join_grace_before_seconds: Some(48 * 3600),
            ..Default::default()
        });

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], ValidationError::PolicyError { field, .. }
            if field == "join_grace_before_seconds"));
    }

    #[test]
    fn zero_question_limit_is_rejected() {
        let config = raw_with_policy(RawPolicyConfig {
            max_question_chars: Some(0),
            ..Default::default()
        });

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn multiple_errors_are_collected() {
        let config = raw_with_policy(RawPolicyConfig {
            join_grace_before_seconds: Some(48 * 3600),
            ask_grace_after_seconds: Some(48 * 3600),
            max_question_chars: Some(0),
            ..Default::default()
        });

        assert_eq!(validate_config(&config).len(), 3);
    }
}
