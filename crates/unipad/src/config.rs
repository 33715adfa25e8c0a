use std::path::{Path, PathBuf};

use ahash::AHashMap;
use serde::Deserialize;
use thiserror::Error;
use unipad_device::{ControllerClass, EmulatorButton, PlayerSlot};

use crate::registry::AutoAssign;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runtime settings of an [`InputSubsystem`](crate::InputSubsystem).
#[derive(Debug, Clone, PartialEq)]
pub struct SubsystemConfig {
    /// Bound of the ingress channel. Input beyond it is dropped.
    pub channel_capacity: usize,
    pub auto_assign: AutoAssign,
    /// Slots whose left stick also drives the digital D-pad.
    pub digital_emulation: Vec<PlayerSlot>,
    /// Directory of the persisted profiles. In-memory when `None`.
    pub profile_dir: Option<PathBuf>,
    /// Mapping overrides applied on top of the class defaults at startup.
    pub class_overrides: AHashMap<ControllerClass, AHashMap<String, EmulatorButton>>,
}

impl Default for SubsystemConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            auto_assign: AutoAssign::default(),
            digital_emulation: Vec::new(),
            profile_dir: None,
            class_overrides: AHashMap::new(),
        }
    }
}

impl SubsystemConfig {
    /// Parse yaml config.
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let version = parse_version(input)?;
        match version {
            1 => {
                let raw: ConfigV1 = serde_yaml::from_str(input)?;
                Ok(raw.into())
            }
            _ => Err(ConfigError::UnsupportedVersion(version)),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&input)
    }
}

/// A config with a version.
#[derive(Debug, Clone, Deserialize)]
struct VersionedConfig {
    version: u8,
}

fn parse_version(input: &str) -> Result<u8, ConfigError> {
    let raw: VersionedConfig = serde_yaml::from_str(input)?;
    Ok(raw.version)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    #[allow(dead_code)]
    version: u8,
    #[serde(default)]
    channel_capacity: Option<usize>,
    #[serde(default)]
    auto_assign: AutoAssign,
    #[serde(default)]
    digital_emulation: Vec<PlayerSlot>,
    #[serde(default)]
    profile_dir: Option<PathBuf>,
    #[serde(default)]
    class_overrides: AHashMap<ControllerClass, AHashMap<String, EmulatorButton>>,
}

impl From<ConfigV1> for SubsystemConfig {
    fn from(raw: ConfigV1) -> Self {
        Self {
            channel_capacity: raw
                .channel_capacity
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY)
                .max(1),
            auto_assign: raw.auto_assign,
            digital_emulation: raw.digital_emulation,
            profile_dir: raw.profile_dir,
            class_overrides: raw.class_overrides,
        }
    }
}
