//! Dictionary-backed state synchronization
//!
//! This crate keeps a set of application values in step with the peer on
//! the other end of the message link:
//!
//! - Incoming dictionaries are merged into the current state, updating only
//!   keys the application declared up front
//! - Local changes are serialized from tuplets, handed to an [`Outbox`], and
//!   applied to the current state
//! - Every applied change is reported through a [`SyncHandler`]
//!
//! The transport itself is outside this crate; it only has to deliver
//! received buffers to [`SyncState::on_received`] and implement [`Outbox`].

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod config;
pub mod error;
pub mod state;
pub mod transport;

pub use config::{ConfigError, SyncConfig};
pub use error::SyncError;
pub use state::{SyncHandler, SyncState};
pub use transport::{Outbox, TransportError};
