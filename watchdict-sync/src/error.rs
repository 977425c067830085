//! Sync error type

use core::fmt;

use watchdict_codec::DictError;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Errors from sync operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Encoding, decoding or merge failed
    Dict(DictError),
    /// Outbox refused the message
    Transport(TransportError),
    /// Configuration rejected
    Config(ConfigError),
}

impl From<DictError> for SyncError {
    fn from(e: DictError) -> Self {
        SyncError::Dict(e)
    }
}

impl From<TransportError> for SyncError {
    fn from(e: TransportError) -> Self {
        SyncError::Transport(e)
    }
}

impl From<ConfigError> for SyncError {
    fn from(e: ConfigError) -> Self {
        SyncError::Config(e)
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Dict(e) => write!(f, "dictionary error: {}", e),
            SyncError::Transport(e) => write!(f, "transport error: {:?}", e),
            SyncError::Config(e) => write!(f, "config error: {:?}", e),
        }
    }
}
