//! Sync configuration
//!
//! Stored as postcard binary data (`serde` feature), or loaded from TOML on
//! hosts (`std` feature).
//!
//! ```toml
//! version = 1
//! inbox_size = 124
//! outbox_size = 64
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Default inbound message limit in bytes
pub const DEFAULT_INBOX_SIZE: u16 = 124;

/// Default outbound message limit in bytes
pub const DEFAULT_OUTBOX_SIZE: u16 = 124;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// TOML parsing failed
    TomlParse,
    /// Config version mismatch
    VersionMismatch,
    /// A buffer size is zero or exceeds the available storage
    InvalidSize,
}

/// Message size limits for a sync session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncConfig {
    /// Format version
    pub version: u8,
    /// Largest incoming dictionary accepted, in bytes
    pub inbox_size: u16,
    /// Largest outgoing dictionary produced, in bytes
    pub outbox_size: u16,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            inbox_size: DEFAULT_INBOX_SIZE,
            outbox_size: DEFAULT_OUTBOX_SIZE,
        }
    }
}

impl SyncConfig {
    /// Check the configuration against a state buffer of `capacity` bytes
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if self.inbox_size == 0 || self.outbox_size == 0 {
            return Err(ConfigError::InvalidSize);
        }
        if self.outbox_size as usize > capacity {
            return Err(ConfigError::InvalidSize);
        }
        Ok(())
    }

    /// Serialize to postcard binary format
    ///
    /// Returns the number of bytes written.
    #[cfg(feature = "serde")]
    pub fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ConfigError> {
        postcard::to_slice(self, buf)
            .map(|used| used.len())
            .map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize from postcard binary format
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: SyncConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        if config.version != CONFIG_VERSION {
            warn!(
                "Config version mismatch: found {}, expected {}",
                config.version,
                CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }
        Ok(config)
    }

    /// Parse from TOML text; missing fields take their defaults
    #[cfg(feature = "std")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(text).map_err(|_| ConfigError::TomlParse)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        Ok(config)
    }
}
