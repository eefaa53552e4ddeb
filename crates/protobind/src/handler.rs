//! Handler contracts wrapped by simple bindings
//!
//! - [`ProtocolHandler`] is shared by every activation of its binding and
//!   produces a separate controller per channel.
//! - [`SessionHandler`] carries per-session state and becomes the controller
//!   itself; [`SessionHandlerFactory`] builds a fresh one per activation.

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

use crate::channel::SharedChannel;
use crate::error::Result;

/// Installs a protocol's processing logic on a channel
#[async_trait]
pub trait ProtocolHandler: Send + Sync + 'static {
    /// Controller handed to application code once installed
    type Controller: Send + 'static;

    /// Install on `channel` and produce the controller
    async fn init_channel(&self, channel: SharedChannel) -> Result<Self::Controller>;
}

/// Stateful handler that serves a single session
#[async_trait]
pub trait SessionHandler: Send + 'static {
    /// Take over `channel`; the handler is the controller afterwards
    async fn start(&mut self, channel: SharedChannel) -> Result<()>;
}

/// Handler backed by an async closure
pub struct HandlerFn<F, T> {
    f: F,
    _controller: PhantomData<fn() -> T>,
}

/// Build a [`ProtocolHandler`] from an async closure
pub fn handler_fn<F, Fut, T>(f: F) -> HandlerFn<F, T>
where
    F: Fn(SharedChannel) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    HandlerFn {
        f,
        _controller: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, T> ProtocolHandler for HandlerFn<F, T>
where
    F: Fn(SharedChannel) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Controller = T;

    async fn init_channel(&self, channel: SharedChannel) -> Result<T> {
        (self.f)(channel).await
    }
}

/// Builds a fresh [`SessionHandler`] for every channel
pub struct SessionHandlerFactory<F> {
    ctor: F,
}

impl<F, H> SessionHandlerFactory<F>
where
    F: Fn() -> H + Send + Sync + 'static,
    H: SessionHandler,
{
    pub fn new(ctor: F) -> Self {
        Self { ctor }
    }
}

#[async_trait]
impl<F, H> ProtocolHandler for SessionHandlerFactory<F>
where
    F: Fn() -> H + Send + Sync + 'static,
    H: SessionHandler,
{
    type Controller = H;

    async fn init_channel(&self, channel: SharedChannel) -> Result<H> {
        let mut handler = (self.ctor)();
        handler.start(channel).await?;
        Ok(handler)
    }
}
