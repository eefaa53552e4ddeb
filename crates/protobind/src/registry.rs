//! Protocol registry
//!
//! Holds the bindings of a stack in registration order. Configuration happens
//! up front through `&mut self`; afterwards the registry is read-only and can be
//! shared across negotiation tasks behind an `Arc` without locking.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::activation::Activation;
use crate::binding::ProtocolBinding;
use crate::channel::SharedChannel;
use crate::erased::{AnyController, Erased, ErasedBinding};
use crate::error::{BindingError, Result};

/// Default upper bound on a registry-driven activation
pub const DEFAULT_ACTIVATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Fail activations still pending after this long (None = wait forever)
    pub activation_timeout: Option<Duration>,
    /// Allow two bindings to announce the same identifier
    pub allow_duplicates: bool,
    /// Reject bindings whose matcher does not accept their own announce
    pub validate_bindings: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            activation_timeout: Some(DEFAULT_ACTIVATION_TIMEOUT),
            allow_duplicates: false,
            validate_bindings: true,
        }
    }
}

/// Ordered set of protocol bindings
pub struct ProtocolRegistry {
    config: RegistryConfig,
    bindings: Vec<Arc<dyn ErasedBinding>>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            bindings: Vec::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a binding, returning a typed handle to it
    pub fn register<B: ProtocolBinding>(&mut self, binding: B) -> Result<Arc<B>> {
        self.register_shared(Arc::new(binding))
    }

    /// Register a binding that is already shared elsewhere
    pub fn register_shared<B: ProtocolBinding>(&mut self, binding: Arc<B>) -> Result<Arc<B>> {
        let erased: Arc<dyn ErasedBinding> = Arc::new(Erased::new(binding.clone()));
        self.register_erased(erased)?;
        Ok(binding)
    }

    /// Register a type-erased binding
    pub fn register_erased(&mut self, binding: Arc<dyn ErasedBinding>) -> Result<()> {
        let announce = binding.announce();

        if self.config.validate_bindings {
            validate(binding.as_ref())?;
        }

        // Inert placeholders may repeat; they never compete for selection
        let duplicate = !binding.matcher().is_inert()
            && self
                .bindings
                .iter()
                .any(|b| !b.matcher().is_inert() && b.announce() == announce);
        if !self.config.allow_duplicates && duplicate {
            return Err(BindingError::DuplicateProtocol(announce.to_string()));
        }

        info!(
            protocol = %announce,
            mode = %binding.matcher().mode(),
            controller = binding.controller_type(),
            "registered protocol binding"
        );
        self.bindings.push(binding);
        Ok(())
    }

    /// First binding whose matcher accepts `identifier`
    pub fn select(&self, identifier: &str) -> Option<&Arc<dyn ErasedBinding>> {
        let found = self
            .bindings
            .iter()
            .find(|b| b.matcher().matches(identifier));

        match found {
            Some(b) => debug!(protocol = %identifier, binding = %b.announce(), "binding selected"),
            None => debug!(protocol = %identifier, "no binding matches"),
        }
        found
    }

    /// Binding announcing exactly `announce`
    pub fn get(&self, announce: &str) -> Option<&Arc<dyn ErasedBinding>> {
        self.bindings.iter().find(|b| b.announce() == announce)
    }

    /// Concrete binding announcing `announce`, if it is a `B`
    pub fn typed<B: ProtocolBinding>(&self, announce: &str) -> Option<Arc<B>> {
        self.bindings
            .iter()
            .filter(|b| b.announce() == announce)
            .find_map(|b| b.as_any().downcast::<B>().ok())
    }

    /// Identifiers to offer during outbound negotiation, in registration order
    ///
    /// Inert bindings are left out; nothing could ever select them.
    pub fn announced(&self) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|b| !b.matcher().is_inert())
            .map(|b| b.announce())
            .collect()
    }

    /// Select the binding for a negotiated identifier and activate it
    ///
    /// Fails synchronously with [`BindingError::NoMatch`] when no binding
    /// claims `identifier`; no activation runs in that case. Otherwise the
    /// returned activation fails if the channel closes first or the configured
    /// timeout elapses.
    pub fn activate(
        &self,
        channel: SharedChannel,
        identifier: &str,
    ) -> Result<Activation<AnyController>> {
        let binding = self
            .select(identifier)
            .ok_or_else(|| BindingError::NoMatch(identifier.to_string()))?;

        let channel_id = channel.id();
        let protocol = identifier.to_string();
        let mut activation = binding
            .activate(channel.clone(), identifier)
            .until_closed(channel);

        if let Some(timeout) = self.config.activation_timeout {
            activation = activation.with_timeout(timeout);
        }

        Ok(Activation::new(async move {
            let result = activation.await;
            match &result {
                Ok(_) => debug!(channel = %channel_id, protocol = %protocol, "protocol activated"),
                Err(e) => {
                    warn!(channel = %channel_id, protocol = %protocol, error = %e, "activation failed")
                }
            }
            result
        }))
    }

    /// Activate and downcast to the controller the caller expects
    pub fn activate_as<T: Send + 'static>(
        &self,
        channel: SharedChannel,
        identifier: &str,
    ) -> Result<Activation<T>> {
        Ok(self
            .activate(channel, identifier)?
            .and_then(AnyController::downcast::<T>))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ErasedBinding>> {
        self.bindings.iter()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the announce self-consistency invariant
fn validate(binding: &dyn ErasedBinding) -> Result<()> {
    let announce = binding.announce();

    if announce.is_empty() {
        return Err(BindingError::InvalidBinding(format!(
            "empty announce for {} binding",
            binding.controller_type()
        )));
    }

    protobind_core::ProtocolId::parse(announce)?;

    // Inert bindings are placeholders and may announce anything
    if !binding.matcher().is_inert() && !binding.matcher().matches(announce) {
        return Err(BindingError::InvalidBinding(format!(
            "{} is not accepted by its own {} matcher",
            announce,
            binding.matcher().mode()
        )));
    }

    Ok(())
}
