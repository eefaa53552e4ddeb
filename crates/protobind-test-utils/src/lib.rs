//! Common test helpers and utilities for protobind tests
//!
//! This crate provides:
//! - An in-memory [`MockChannel`] that records what bindings do to it
//! - Condition-based waiting (no hardcoded sleeps)
//! - Idempotent tracing setup

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use protobind::{BindingError, Channel, ChannelEvent, ChannelId, ChannelKind, Result};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Tracing
// ============================================================================

/// Install a fmt subscriber honoring `RUST_LOG`; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Condition-Based Waiting
// ============================================================================

/// Wait for a condition with timeout - condition-based, not time-based
pub async fn wait_for<F, Fut>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// Wait for an atomic counter to reach a target value
pub async fn wait_for_count(counter: &AtomicU32, target: u32, max_wait: Duration) -> bool {
    wait_for(
        || async { counter.load(Ordering::SeqCst) >= target },
        DEFAULT_CHECK_INTERVAL,
        max_wait,
    )
    .await
}

// ============================================================================
// Mock Channel
// ============================================================================

/// In-memory channel for driving bindings without a transport
///
/// Inbound data is injected with [`MockChannel::push_inbound`]; everything a
/// handler sends is captured and readable through [`MockChannel::sent`].
pub struct MockChannel {
    id: ChannelId,
    kind: ChannelKind,
    initiator: bool,
    open: AtomicBool,
    attached: Mutex<Option<String>>,
    attach_calls: AtomicU32,
    sent: Mutex<Vec<Bytes>>,
    send_failure: Mutex<Option<String>>,
    inbound_tx: mpsc::UnboundedSender<ChannelEvent>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
    closed_tx: watch::Sender<bool>,
}

impl MockChannel {
    pub fn new(kind: ChannelKind, initiator: bool) -> Arc<Self> {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (closed_tx, _) = watch::channel(false);
        Arc::new(Self {
            id: ChannelId::next(),
            kind,
            initiator,
            open: AtomicBool::new(true),
            attached: Mutex::new(None),
            attach_calls: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
            send_failure: Mutex::new(None),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            closed_tx,
        })
    }

    /// Inbound connection-level channel
    pub fn connection() -> Arc<Self> {
        Self::new(ChannelKind::Connection, false)
    }

    /// Inbound stream-level channel
    pub fn stream() -> Arc<Self> {
        Self::new(ChannelKind::Stream, false)
    }

    /// Deliver data as if the remote peer sent it
    pub fn push_inbound(&self, data: impl Into<Bytes>) {
        let _ = self.inbound_tx.send(ChannelEvent::Data(data.into()));
    }

    /// Deliver a transport error event
    pub fn push_error(&self, message: &str) {
        let _ = self.inbound_tx.send(ChannelEvent::Error(message.to_string()));
    }

    /// Make every later send fail with `reason`
    pub fn fail_sends(&self, reason: &str) {
        *self.send_failure.lock() = Some(reason.to_string());
    }

    /// Close the channel from the remote side
    pub fn close_remote(&self, reason: Option<&str>) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.inbound_tx.send(ChannelEvent::Closed {
                reason: reason.map(str::to_string),
            });
            self.closed_tx.send_replace(true);
        }
    }

    /// Everything sent on the channel so far
    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().clone()
    }

    /// Protocol the channel was claimed for, if any
    pub fn attached(&self) -> Option<String> {
        self.attached.lock().clone()
    }

    /// Number of attach attempts, successful or not
    pub fn attach_calls(&self) -> u32 {
        self.attach_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn is_initiator(&self) -> bool {
        self.initiator
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn attach(&self, protocol: &str) -> Result<()> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        let mut attached = self.attached.lock();
        if let Some(existing) = attached.as_ref() {
            return Err(BindingError::AlreadyAttached {
                channel: self.id,
                protocol: existing.clone(),
            });
        }
        *attached = Some(protocol.to_string());
        Ok(())
    }

    async fn send(&self, data: Bytes) -> Result<()> {
        if !self.is_open() {
            return Err(BindingError::ChannelClosed);
        }
        if let Some(reason) = self.send_failure.lock().clone() {
            return Err(BindingError::Channel(reason));
        }
        self.sent.lock().push(data);
        Ok(())
    }

    async fn recv(&self) -> Option<ChannelEvent> {
        let mut rx = self.inbound_rx.lock().await;
        if let Ok(event) = rx.try_recv() {
            return Some(event);
        }
        if !self.is_open() {
            return None;
        }
        tokio::select! {
            biased;
            event = rx.recv() => event,
            _ = self.closed() => None,
        }
    }

    async fn close(&self) -> Result<()> {
        self.close_remote(None);
        Ok(())
    }

    async fn closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        loop {
            let closed = *rx.borrow_and_update();
            if closed {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
