//! Synchronized dictionary state
//!
//! [`SyncState`] owns the current dictionary and the scratch space merges
//! need, both sized by the `N` parameter. The set of keys is fixed when the
//! state is created: incoming and local updates only touch keys that were
//! part of the initial tuplets.

use watchdict_codec::{
    merge, serialize_tuplets_to_buffer, stm32_crc32, DictError, DictReader, Tuple, Tuplet,
};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::transport::Outbox;

/// Receives change notifications from a [`SyncState`]
pub trait SyncHandler {
    /// A tuple was set; `old` is `None` when the key had no previous value
    fn tuple_changed(&mut self, new: &Tuple<'_>, old: Option<&Tuple<'_>>);

    /// An update could not be applied or sent
    fn sync_error(&mut self, error: SyncError) {
        let _ = error;
    }
}

/// Current values of a synchronized key set
#[derive(Debug, Clone)]
pub struct SyncState<const N: usize> {
    config: SyncConfig,
    dict: [u8; N],
    size: usize,
    scratch: [u8; N],
    last_sent_crc: Option<u32>,
}

impl<const N: usize> SyncState<N> {
    /// Create the state from its initial values
    ///
    /// `handler` is notified once per initial tuple, with no previous value.
    pub fn new(
        initial: &[Tuplet<'_>],
        config: &SyncConfig,
        handler: &mut impl SyncHandler,
    ) -> Result<Self, SyncError> {
        config.validate(N)?;

        let mut dict = [0u8; N];
        let size = serialize_tuplets_to_buffer(initial, &mut dict)?;
        let state = Self {
            config: *config,
            dict,
            size,
            scratch: [0u8; N],
            last_sent_crc: None,
        };

        debug!("Sync started: {} tuples, {} bytes", initial.len(), size);
        for tuple in state.iter() {
            handler.tuple_changed(&tuple, None);
        }
        Ok(state)
    }

    /// Active configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The current dictionary bytes
    pub fn dictionary(&self) -> &[u8] {
        &self.dict[..self.size]
    }

    /// Number of tuples held
    pub fn len(&self) -> usize {
        self.dict[0] as usize
    }

    /// Returns true if no keys are synchronized
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current value for `key`
    pub fn get(&self, key: u32) -> Option<Tuple<'_>> {
        DictReader::new(self.dictionary()).ok()?.find(key)
    }

    /// Tuples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Tuple<'_>> {
        DictReader::new(self.dictionary()).into_iter().flatten()
    }

    /// Apply a dictionary received from the peer
    ///
    /// Keys that are not part of the state are ignored. Failures are also
    /// reported through `handler`.
    pub fn on_received(
        &mut self,
        message: &[u8],
        handler: &mut impl SyncHandler,
    ) -> Result<(), SyncError> {
        trace!("RX: {} bytes", message.len());

        let result = if message.len() > self.config.inbox_size as usize {
            Err(SyncError::Dict(DictError::NotEnoughStorage))
        } else {
            self.apply(message, handler)
        };

        match result {
            Ok(()) => {
                // The peer may have overwritten what we sent last
                self.last_sent_crc = None;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to apply received dictionary: {:?}", e);
                handler.sync_error(e);
                Err(e)
            }
        }
    }

    /// Send local changes to the peer and apply them to the state
    ///
    /// Nothing is sent if the serialized update is identical to the last one
    /// sent since the peer last wrote. Keys that are not part of the state
    /// are sent but not stored. An update that would not fit the local state
    /// is rejected before it reaches the outbox.
    pub fn set(
        &mut self,
        updates: &[Tuplet<'_>],
        outbox: &mut impl Outbox,
        handler: &mut impl SyncHandler,
    ) -> Result<(), SyncError> {
        let result = self.send_and_apply(updates, outbox, handler);
        if let Err(e) = result {
            warn!("Failed to set values: {:?}", e);
            handler.sync_error(e);
        }
        result
    }

    fn send_and_apply(
        &mut self,
        updates: &[Tuplet<'_>],
        outbox: &mut impl Outbox,
        handler: &mut impl SyncHandler,
    ) -> Result<(), SyncError> {
        let limit = (self.config.outbox_size as usize)
            .min(outbox.capacity())
            .min(N);
        let mut out = [0u8; N];
        let len = serialize_tuplets_to_buffer(updates, &mut out[..limit])?;
        let message = &out[..len];

        let crc = stm32_crc32(message);
        if self.last_sent_crc == Some(crc) {
            trace!("Update unchanged (crc {=u32:x}), not sending", crc);
            return Ok(());
        }

        // The update must fit the local state before it is sent
        let mut trial = self.dict;
        let mut trial_size = self.size;
        merge(
            &mut trial,
            &mut trial_size,
            message,
            true,
            &mut self.scratch,
            |_, _| {},
        )?;

        outbox.send(message)?;
        debug!("TX: {} tuples, {} bytes", updates.len(), len);

        self.apply(message, handler)?;
        self.last_sent_crc = Some(crc);
        Ok(())
    }

    fn apply(&mut self, message: &[u8], handler: &mut impl SyncHandler) -> Result<(), SyncError> {
        merge(
            &mut self.dict,
            &mut self.size,
            message,
            true,
            &mut self.scratch,
            |new, old| handler.tuple_changed(new, old),
        )?;
        Ok(())
    }
}
