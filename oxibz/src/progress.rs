//! Block completion events.
//!
//! Listeners are called synchronously, in registration order, on the thread
//! that is decoding, right after a block has been decoded and verified and
//! before the next block is started. A listener that returns an error stops
//! the remaining listeners and fails the read that triggered the block.

use oxibz_core::error::{OxiBzError, Result};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

/// Result returned by a progress listener.
pub type ListenerResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

/// Snapshot taken when a block finishes decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 1-based block number, continuing across concatenated members.
    pub block_number: u64,
    /// 1-based number of the member the block belongs to.
    pub member_number: u64,
    /// Decoded size of this block.
    pub block_len: usize,
    /// Decoded bytes produced so far, this block included.
    pub cumulative_bytes: u64,
    /// Whole compressed bytes consumed so far.
    pub compressed_bytes: u64,
}

/// Receiver of block completion events.
///
/// Implemented for any `FnMut(&ProgressEvent) -> ListenerResult + Send`.
pub trait ProgressListener: Send {
    /// Called once per completed block.
    fn on_block_complete(&mut self, event: &ProgressEvent) -> ListenerResult;
}

impl<F> ProgressListener for F
where
    F: FnMut(&ProgressEvent) -> ListenerResult + Send,
{
    fn on_block_complete(&mut self, event: &ProgressEvent) -> ListenerResult {
        self(event)
    }
}

/// Handle returned by [`ProgressNotifier::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Registry of progress listeners.
#[derive(Default)]
pub struct ProgressNotifier {
    /// Ids are handed out in increasing order, so map order is registration order.
    listeners: BTreeMap<ListenerId, Box<dyn ProgressListener>>,
    next_id: u64,
}

impl ProgressNotifier {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add_listener<L: ProgressListener + 'static>(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener in registration order.
    ///
    /// # Errors
    ///
    /// `ListenerAborted` with the first listener error; later listeners are
    /// not called.
    pub fn notify(&mut self, event: &ProgressEvent) -> Result<()> {
        for listener in self.listeners.values_mut() {
            listener
                .on_block_complete(event)
                .map_err(OxiBzError::ListenerAborted)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProgressNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressNotifier")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
