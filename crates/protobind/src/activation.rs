//! Deferred controller produced by activating a binding
//!
//! `activate` returns immediately with an [`Activation`]; the protocol's
//! handler stack is installed when it is awaited (or driven by a spawned task,
//! see [`Activation::spawn`]). It resolves exactly once, to the controller or
//! to a [`BindingError`].

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use crate::channel::SharedChannel;
use crate::error::{BindingError, Result};

/// Single-resolution future of a protocol controller
#[must_use = "activations do nothing unless awaited or spawned"]
pub struct Activation<T> {
    inner: BoxFuture<'static, Result<T>>,
}

impl<T: Send + 'static> Activation<T> {
    /// Wrap a future producing the controller
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    /// An activation that has already succeeded
    pub fn ready(controller: T) -> Self {
        Self::new(futures::future::ready(Ok(controller)))
    }

    /// An activation that has already failed
    pub fn failed(error: BindingError) -> Self {
        Self::new(futures::future::ready(Err(error)))
    }

    /// Transform the controller once it resolves
    pub fn map<U, F>(self, f: F) -> Activation<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let inner = self.inner;
        Activation::new(async move { inner.await.map(f) })
    }

    /// Chain a fallible step after the controller resolves
    pub fn and_then<U, F>(self, f: F) -> Activation<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let inner = self.inner;
        Activation::new(async move { inner.await.and_then(f) })
    }

    /// Fail with [`BindingError::Timeout`] if not resolved within `duration`
    pub fn with_timeout(self, duration: Duration) -> Self {
        let inner = self.inner;
        Activation::new(async move {
            match tokio::time::timeout(duration, inner).await {
                Ok(result) => result,
                Err(_) => Err(BindingError::Timeout),
            }
        })
    }

    /// Fail with [`BindingError::ChannelClosed`] if `channel` closes first
    ///
    /// A channel already closed when the activation is first polled fails it
    /// without polling the install future.
    pub fn until_closed(self, channel: SharedChannel) -> Self {
        let inner = self.inner;
        Activation::new(async move {
            tokio::select! {
                biased;
                _ = channel.closed() => Err(BindingError::ChannelClosed),
                result = inner => result,
            }
        })
    }

    /// Drive the activation on the tokio runtime
    ///
    /// Installation proceeds even if the returned activation is never polled.
    /// Must be called from within a runtime.
    pub fn spawn(self) -> Self {
        let handle = tokio::spawn(self.inner);
        Activation::new(async move {
            match handle.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(BindingError::Install(
                    "activation task cancelled".to_string(),
                )),
                Err(e) => Err(BindingError::Install(format!(
                    "activation task panicked: {}",
                    e
                ))),
            }
        })
    }
}

impl<T> Future for Activation<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Activation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("controller", &std::any::type_name::<T>())
            .finish()
    }
}
