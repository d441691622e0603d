//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Time and content policy knobs
    #[serde(default)]
    pub policy: RawPolicyConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the store
    pub data_dir: Option<PathBuf>,

    /// Log directory
    pub log_dir: Option<PathBuf>,
}

/// Policy knobs
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPolicyConfig {
    /// Margin before a lecture's start during which it already appears in
    /// the "joinable now" listing
    pub join_grace_before_seconds: Option<u64>,

    /// Margin after a lecture's natural end during which it still appears
    /// in the "joinable now" listing
    pub join_grace_after_seconds: Option<u64>,

    /// Margin after a lecture's natural end during which questions may
    /// still be submitted. 0 means strict live-only submission.
    pub ask_grace_after_seconds: Option<u64>,

    /// Maximum question length in characters
    pub max_question_chars: Option<usize>,
}
