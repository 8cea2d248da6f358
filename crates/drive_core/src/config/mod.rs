//! # Model Configuration
//!
//! 입력 컬럼 이름, 필터 마커, 플레이 키워드, zero-row 정책을 한 곳에서 관리.
//!
//! ## Usage
//!
//! ```rust
//! use drive_core::config::{ModelConfig, ZeroRowPolicy};
//!
//! let config = ModelConfig::default();
//! assert_eq!(config.zero_row_policy, ZeroRowPolicy::Reject);
//!
//! let yaml = "zero_row_policy: exclude\n";
//! let config = ModelConfig::from_yaml_str(yaml).unwrap();
//! assert_eq!(config.zero_row_policy, ZeroRowPolicy::Exclude);
//! ```
//!
//! ## Environment Variables
//!
//! - `DRIVE_MODEL_CONFIG`: path to a YAML config file

mod columns;
mod keywords;

pub use columns::{ColumnConfig, FilterConfig};
pub use keywords::KeywordConfig;

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;

pub const CONFIG_ENV_VAR: &str = "DRIVE_MODEL_CONFIG";

/// What to do with a transient state that is never the source of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroRowPolicy {
    /// Fail the run with `ZeroOutgoingMass`
    #[default]
    Reject,
    /// Drop the state (and edges into it) before normalizing
    Exclude,
}

impl fmt::Display for ZeroRowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ZeroRowPolicy::Reject => write!(f, "reject"),
            ZeroRowPolicy::Exclude => write!(f, "exclude"),
        }
    }
}

impl FromStr for ZeroRowPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(ZeroRowPolicy::Reject),
            "exclude" => Ok(ZeroRowPolicy::Exclude),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

/// 전체 모델 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Input column names
    pub columns: ColumnConfig,
    /// Rows excluded before classification
    pub filter: FilterConfig,
    /// Description keywords per play type
    pub keywords: KeywordConfig,
    pub zero_row_policy: ZeroRowPolicy,
    /// Exclude malformed records instead of failing the run
    pub allow_malformed: bool,
    /// Keep only drives run by this offense. Applied after segmentation.
    pub offense: Option<String>,
}

impl ModelConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Load from `DRIVE_MODEL_CONFIG` when set, otherwise defaults.
    pub fn from_env_or_default() -> Result<Self, ConfigError> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(path.trim()),
            _ => Ok(Self::default()),
        }
    }
}
