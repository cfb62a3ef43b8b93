//! Node configuration
//!
//! Loaded from TOML. Every section is optional; missing values fall back to
//! the firmware defaults and the public channel.
//!
//! ```toml
//! nickname = "alice"
//!
//! [identity]
//! private_key = "<64 hex chars>"
//!
//! [[channels]]
//! name = "public"
//! key = "8b3387e9c5cdea6ac9e5edbaa115cd72"
//!
//! [radio]
//! frequency_hz = 869618000
//! spreading_factor = 8
//! bandwidth_khz = 62.5
//! coding_rate = 8
//! power_dbm = 22
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{CryptoError, Identity};
use crate::keyring::{ChannelKey, Keyring, PUBLIC_CHANNEL_KEY, PUBLIC_CHANNEL_NAME};
use crate::protocol::MAX_NAME_SIZE;
use crate::radio::{RadioError, RadioSettings};

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Document is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A channel key is not 16 bytes of hex
    #[error("invalid key for channel {name}: {source}")]
    ChannelKey {
        /// Channel name
        name: String,
        /// Key parsing failure
        source: CryptoError,
    },

    /// The identity seed is not 32 bytes of hex
    #[error("invalid identity key: {0}")]
    Identity(#[source] CryptoError),

    /// Nickname empty or too long
    #[error("nickname must be 1 to {max} bytes, got {len}")]
    Nickname {
        /// Nickname length
        len: usize,
        /// Maximum length
        max: usize,
    },

    /// Channel list is empty
    #[error("no channels configured")]
    NoChannels,

    /// Radio settings rejected
    #[error(transparent)]
    Radio(#[from] RadioError),
}

/// Device identity (`identity.*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Hex-encoded 32-byte Ed25519 seed. Without it the node cannot advertise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// One group channel (`[[channels]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Display name
    pub name: String,
    /// Hex-encoded 16-byte key
    pub key: String,
}

impl ChannelConfig {
    fn public() -> Self {
        Self {
            name: PUBLIC_CHANNEL_NAME.to_string(),
            key: hex::encode(PUBLIC_CHANNEL_KEY),
        }
    }
}

/// Top-level node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Name prefixed to outgoing group texts and used in adverts
    #[serde(default = "NodeConfig::default_nickname")]
    pub nickname: String,
    /// Signing identity
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Channels in priority order
    #[serde(default = "NodeConfig::default_channels")]
    pub channels: Vec<ChannelConfig>,
    /// Modem settings
    #[serde(default)]
    pub radio: RadioSettings,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            nickname: Self::default_nickname(),
            identity: IdentityConfig::default(),
            channels: Self::default_channels(),
            radio: RadioSettings::default(),
        }
    }
}

impl NodeConfig {
    fn default_nickname() -> String {
        "meshcore".to_string()
    }

    fn default_channels() -> Vec<ChannelConfig> {
        vec![ChannelConfig::public()]
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nickname.is_empty() || self.nickname.len() > MAX_NAME_SIZE {
            return Err(ConfigError::Nickname {
                len: self.nickname.len(),
                max: MAX_NAME_SIZE,
            });
        }
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        self.keyring()?;
        self.identity()?;
        self.radio.validate()?;
        Ok(())
    }

    /// Build the keyring from the configured channels, in order.
    pub fn keyring(&self) -> Result<Keyring, ConfigError> {
        self.channels
            .iter()
            .map(|channel| {
                ChannelKey::from_hex(channel.name.as_str(), &channel.key).map_err(|source| {
                    ConfigError::ChannelKey {
                        name: channel.name.clone(),
                        source,
                    }
                })
            })
            .collect()
    }

    /// Build the signing identity, if a private key is configured.
    pub fn identity(&self) -> Result<Option<Identity>, ConfigError> {
        self.identity
            .private_key
            .as_deref()
            .map(Identity::from_hex)
            .transpose()
            .map_err(ConfigError::Identity)
    }
}
