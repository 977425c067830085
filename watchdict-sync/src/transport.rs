//! Transport seam
//!
//! The message link (Bluetooth, serial, loopback in tests) lives outside
//! this crate. Received buffers are pushed into the sync state directly;
//! outbound dictionaries go through [`Outbox`].

/// Errors reported by the outbound side of a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// A previous message is still in flight
    Busy,
    /// No peer connected
    Disconnected,
    /// The peer refused the message
    Rejected,
}

/// Outbound message sink
pub trait Outbox {
    /// Send a finalized dictionary
    ///
    /// The buffer is only borrowed for the duration of the call;
    /// implementations copy what they need to keep.
    fn send(&mut self, dict: &[u8]) -> Result<(), TransportError>;

    /// Largest dictionary the link accepts in one message, in bytes
    fn capacity(&self) -> usize;
}
