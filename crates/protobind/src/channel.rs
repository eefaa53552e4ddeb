//! Channel contract consumed by bindings
//!
//! A channel is either a whole connection or one multiplexed stream. Bindings
//! never create channels; the negotiation engine hands them a live one after
//! multistream-select agreed on a protocol.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

impl ChannelId {
    /// Allocate the next identifier
    pub fn next() -> Self {
        Self(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Layer a channel lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// A full connection (muxers, secure channels)
    Connection,
    /// One multiplexed stream (application protocols)
    Stream,
}

/// Events delivered by a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Inbound payload
    Data(Bytes),
    /// Channel closed (clean or error)
    Closed { reason: Option<String> },
    /// Error reported by the underlying transport
    Error(String),
}

/// A live connection or stream a protocol can be activated on
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel identifier, for logging and correlation
    fn id(&self) -> ChannelId;

    /// Whether this is a connection or a stream
    fn kind(&self) -> ChannelKind;

    /// True when the local side opened the channel
    fn is_initiator(&self) -> bool;

    /// Check if the channel is still open
    fn is_open(&self) -> bool;

    /// Claim the channel for `protocol`
    ///
    /// Succeeds at most once per channel; later calls fail with
    /// [`BindingError::AlreadyAttached`](crate::BindingError::AlreadyAttached).
    fn attach(&self, protocol: &str) -> Result<()>;

    /// Send data
    async fn send(&self, data: Bytes) -> Result<()>;

    /// Receive the next event, `None` once closed and drained
    async fn recv(&self) -> Option<ChannelEvent>;

    /// Close the channel
    async fn close(&self) -> Result<()>;

    /// Resolve once the channel is closed
    async fn closed(&self);
}

/// Channel handle passed to bindings
pub type SharedChannel = Arc<dyn Channel>;
