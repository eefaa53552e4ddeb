//! The protocol binding contract and its common implementations
//!
//! A binding is the entry point to one protocol. It tells the negotiation
//! engine which identifier to announce, which identifiers it claims on inbound
//! negotiation, and how to install the protocol on a channel once chosen.
//!
//! Most protocols only need exact matching and one handler; [`create_simple`]
//! and [`create_simple_with`] cover that case. Protocols with version ranges or
//! multi-stage activation implement [`ProtocolBinding`] by hand.

use protobind_core::ProtocolMatcher;
use std::sync::Arc;
use tracing::debug;

use crate::activation::Activation;
use crate::channel::SharedChannel;
use crate::error::BindingError;
use crate::handler::{ProtocolHandler, SessionHandler, SessionHandlerFactory};

/// Entry point to a protocol: metadata plus activation logic
///
/// A protocol may act on a connection (stream muxers, secure channels) or on a
/// single stream (application protocols). Both use this contract; the engine
/// hands over the appropriate channel.
pub trait ProtocolBinding: Send + Sync + 'static {
    /// Controller produced by a successful activation
    type Controller: Send + 'static;

    /// Identifier announced to peers during outbound negotiation
    fn announce(&self) -> &str;

    /// Matching rule applied on inbound negotiation
    fn matcher(&self) -> &ProtocolMatcher;

    /// Install the protocol on `channel`
    ///
    /// Returns without waiting; installation failures surface through the
    /// returned [`Activation`]. `selected` is the identifier the negotiation
    /// agreed on and must not be used to re-decide matching.
    fn activate(&self, channel: SharedChannel, selected: &str) -> Activation<Self::Controller>;

    /// Adapt the controller type, e.g. to a boxed trait object
    fn map_controller<U, F>(self, f: F) -> MapController<Self, F>
    where
        Self: Sized,
        U: Send + 'static,
        F: Fn(Self::Controller) -> U + Send + Sync + 'static,
    {
        MapController {
            inner: self,
            f: Arc::new(f),
        }
    }
}

/// Binding with an exact matcher delegating to a single handler
pub struct SimpleBinding<H> {
    announce: String,
    matcher: ProtocolMatcher,
    handler: Arc<H>,
}

impl<H: ProtocolHandler> SimpleBinding<H> {
    pub fn new(protocol: impl Into<String>, handler: H) -> Self {
        let announce = protocol.into();
        Self {
            matcher: ProtocolMatcher::exact(announce.clone()),
            announce,
            handler: Arc::new(handler),
        }
    }

    /// Get the wrapped handler
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: ProtocolHandler> ProtocolBinding for SimpleBinding<H> {
    type Controller = H::Controller;

    fn announce(&self) -> &str {
        &self.announce
    }

    fn matcher(&self) -> &ProtocolMatcher {
        &self.matcher
    }

    fn activate(&self, channel: SharedChannel, _selected: &str) -> Activation<H::Controller> {
        let handler = self.handler.clone();
        let protocol = self.announce.clone();
        let watched = channel.clone();

        Activation::new(async move {
            if !channel.is_open() {
                return Err(BindingError::ChannelClosed);
            }
            channel.attach(&protocol)?;
            debug!(channel = %channel.id(), protocol = %protocol, "installing handler");
            handler.init_channel(channel).await
        })
        .until_closed(watched)
    }
}

/// Wrap a handler instance as an exact-match binding
///
/// The handler is shared by every activation.
pub fn create_simple<H: ProtocolHandler>(
    protocol: impl Into<String>,
    handler: H,
) -> SimpleBinding<H> {
    SimpleBinding::new(protocol, handler)
}

/// Wrap a handler constructor as an exact-match binding
///
/// `ctor` runs once per activation, so session handlers never share state
/// across channels. The started handler is the controller.
pub fn create_simple_with<F, H>(
    protocol: impl Into<String>,
    ctor: F,
) -> SimpleBinding<SessionHandlerFactory<F>>
where
    F: Fn() -> H + Send + Sync + 'static,
    H: SessionHandler,
{
    SimpleBinding::new(protocol, SessionHandlerFactory::new(ctor))
}

/// Binding whose controller is transformed by `F`
///
/// Lets a binding of a concrete controller stand in wherever a binding of a
/// more general controller is expected.
pub struct MapController<B, F> {
    inner: B,
    f: Arc<F>,
}

impl<B, F> MapController<B, F> {
    /// Get the wrapped binding
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B, F, U> ProtocolBinding for MapController<B, F>
where
    B: ProtocolBinding,
    U: Send + 'static,
    F: Fn(B::Controller) -> U + Send + Sync + 'static,
{
    type Controller = U;

    fn announce(&self) -> &str {
        self.inner.announce()
    }

    fn matcher(&self) -> &ProtocolMatcher {
        self.inner.matcher()
    }

    fn activate(&self, channel: SharedChannel, selected: &str) -> Activation<U> {
        let f = self.f.clone();
        self.inner.activate(channel, selected).map(move |c| f(c))
    }
}
