//! Validated policy structures

use crate::schema::{RawConfig, RawPolicyConfig, RawServiceConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Validated configuration ready for use by the core engine
#[derive(Debug, Clone)]
pub struct Policy {
    /// Service configuration
    pub service: ServiceConfig,

    /// Join-listing grace margins around a lecture's scheduled window
    pub join_grace_before: Duration,
    pub join_grace_after: Duration,

    /// Question-submission grace after a natural end.
    /// Zero keeps the default contract: strict live-only submission.
    pub ask_grace_after: Duration,

    /// Maximum question length in characters
    pub max_question_chars: usize,
}

impl Policy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            join_grace_before: Duration::from_secs(
                raw.policy
                    .join_grace_before_seconds
                    .unwrap_or(DEFAULT_JOIN_GRACE_SECONDS),
            ),
            join_grace_after: Duration::from_secs(
                raw.policy
                    .join_grace_after_seconds
                    .unwrap_or(DEFAULT_JOIN_GRACE_SECONDS),
            ),
            ask_grace_after: Duration::from_secs(raw.policy.ask_grace_after_seconds.unwrap_or(0)),
            max_question_chars: raw
                .policy
                .max_question_chars
                .unwrap_or(DEFAULT_MAX_QUESTION_CHARS),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::from_raw(RawConfig {
            config_version: crate::CURRENT_CONFIG_VERSION,
            service: RawServiceConfig::default(),
            policy: RawPolicyConfig::default(),
        })
    }
}

/// Default join-listing grace: ten minutes on each side of the window
const DEFAULT_JOIN_GRACE_SECONDS: u64 = 600;

const DEFAULT_MAX_QUESTION_CHARS: usize = 2000;

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            data_dir: raw.data_dir.unwrap_or_else(lectern_util::default_data_dir),
            log_dir: raw.log_dir.unwrap_or_else(lectern_util::default_log_dir),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_absent() {
        let policy = Policy::default();

        assert_eq!(policy.join_grace_before, Duration::from_secs(600));
        assert_eq!(policy.join_grace_after, Duration::from_secs(600));
        assert_eq!(policy.ask_grace_after, Duration::ZERO);
        assert_eq!(policy.max_question_chars, 2000);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let raw: RawConfig = toml::from_str(
            r#"
            config_version = 1

            [policy]
            join_grace_before_seconds = 120
            ask_grace_after_seconds = 900
            "#,
        )
        .unwrap();

        let policy = Policy::from_raw(raw);
        assert_eq!(policy.join_grace_before, Duration::from_secs(120));
        assert_eq!(policy.join_grace_after, Duration::from_secs(600));
        assert_eq!(policy.ask_grace_after, Duration::from_secs(900));
    }
}
