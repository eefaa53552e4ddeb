//! Type-erased bindings for heterogeneous registries
//!
//! Each protocol has its own controller type, yet a registry must iterate and
//! match all of them uniformly. [`ErasedBinding`] hides the controller behind
//! [`AnyController`]; callers that know which protocol they asked for recover
//! the concrete type with [`AnyController::downcast`].

use protobind_core::ProtocolMatcher;
use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::activation::Activation;
use crate::binding::ProtocolBinding;
use crate::channel::SharedChannel;
use crate::error::{BindingError, Result};

/// Controller with its concrete type erased
pub struct AnyController {
    protocol: String,
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl AnyController {
    pub fn new<T: Send + 'static>(protocol: impl Into<String>, value: T) -> Self {
        Self {
            protocol: protocol.into(),
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Identifier the controller was activated for
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Name of the concrete controller type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check the concrete controller type
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Recover the concrete controller
    pub fn downcast<T: 'static>(self) -> Result<T> {
        let protocol = self.protocol;
        self.value
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| BindingError::ControllerType {
                protocol,
                expected: type_name::<T>(),
            })
    }
}

impl fmt::Debug for AnyController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyController")
            .field("protocol", &self.protocol)
            .field("type", &self.type_name)
            .finish()
    }
}

/// Object-safe view of a [`ProtocolBinding`]
pub trait ErasedBinding: Send + Sync {
    fn announce(&self) -> &str;

    fn matcher(&self) -> &ProtocolMatcher;

    /// Name of the controller type the binding produces
    fn controller_type(&self) -> &'static str;

    fn activate(&self, channel: SharedChannel, selected: &str) -> Activation<AnyController>;

    /// The concrete binding, for downcasting
    fn as_any(&self) -> Arc<dyn Any + Send + Sync>;
}

/// Erasing wrapper around a shared concrete binding
pub struct Erased<B> {
    inner: Arc<B>,
}

impl<B: ProtocolBinding> Erased<B> {
    pub fn new(binding: Arc<B>) -> Self {
        Self { inner: binding }
    }

    /// Get the concrete binding
    pub fn inner(&self) -> &Arc<B> {
        &self.inner
    }
}

impl<B: ProtocolBinding> ErasedBinding for Erased<B> {
    fn announce(&self) -> &str {
        self.inner.announce()
    }

    fn matcher(&self) -> &ProtocolMatcher {
        self.inner.matcher()
    }

    fn controller_type(&self) -> &'static str {
        type_name::<B::Controller>()
    }

    fn activate(&self, channel: SharedChannel, selected: &str) -> Activation<AnyController> {
        let protocol = selected.to_string();
        self.inner
            .activate(channel, selected)
            .map(move |controller| AnyController::new(protocol, controller))
    }

    fn as_any(&self) -> Arc<dyn Any + Send + Sync> {
        self.inner.clone()
    }
}

/// Erase a binding for storage next to bindings of other controller types
pub fn erase<B: ProtocolBinding>(binding: B) -> Arc<dyn ErasedBinding> {
    Arc::new(Erased::new(Arc::new(binding)))
}
