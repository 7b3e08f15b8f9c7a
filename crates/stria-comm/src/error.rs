//! Communication errors.

use thiserror::Error;

/// A collective operation that could not complete.
///
/// None of these are retried: once a step has partially executed, row state
/// cannot be re-synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommError {
    /// A peer dropped its end of the group.
    #[error("peer {peer} disconnected")]
    Disconnected {
        /// Rank of the peer.
        peer: usize,
    },

    /// Another worker aborted the group.
    #[error("group aborted by a failing worker")]
    Aborted,

    /// A peer sent a message other than the one the collective expects.
    #[error("protocol violation from peer {peer}: expected {expected}, received {received}")]
    Protocol {
        /// Rank of the peer.
        peer: usize,
        /// Expected message kind.
        expected: &'static str,
        /// Received message kind.
        received: &'static str,
    },

    /// The root rank is outside the group.
    #[error("root {root} is outside a group of {size}")]
    InvalidRoot {
        /// Requested root.
        root: usize,
        /// Group size.
        size: usize,
    },

    /// The scatter root supplied the wrong number of buffers.
    #[error("scatter root supplied {supplied} buffers for a group of {size}")]
    BufferCount {
        /// Buffers supplied.
        supplied: usize,
        /// Group size.
        size: usize,
    },

    /// A broadcast payload has the wrong length.
    #[error("broadcast payload holds {actual} values, expected {expected}")]
    LengthMismatch {
        /// Receiver's buffer length.
        expected: usize,
        /// Payload length.
        actual: usize,
    },
}

impl CommError {
    /// Returns true for errors that only echo a failure on another worker.
    #[must_use]
    pub fn is_cascade(&self) -> bool {
        matches!(self, Self::Aborted | Self::Disconnected { .. })
    }
}
