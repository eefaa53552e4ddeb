//! Inert placeholder binding
//!
//! [`NullBinding`] satisfies APIs that insist on a binding value without ever
//! being selected: its matcher rejects every identifier. Prefer `Option` over
//! it wherever the surrounding API allows; [`ProtocolRegistry`] lookups do.
//!
//! [`ProtocolRegistry`]: crate::ProtocolRegistry

use protobind_core::ProtocolMatcher;
use std::convert::Infallible;

use crate::activation::Activation;
use crate::binding::ProtocolBinding;
use crate::channel::SharedChannel;

/// Placeholder identifier announced by [`NullBinding`]
pub const NULL_PROTOCOL_ID: &str = "/dummy/0.0.0";

/// Shared placeholder instance
pub static NULL_BINDING: NullBinding = NullBinding::new();

/// Binding that never matches and must never be activated
#[derive(Debug, Clone)]
pub struct NullBinding {
    matcher: ProtocolMatcher,
}

impl NullBinding {
    pub const fn new() -> Self {
        Self {
            matcher: ProtocolMatcher::never(),
        }
    }
}

impl Default for NullBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolBinding for NullBinding {
    type Controller = Infallible;

    fn announce(&self) -> &str {
        NULL_PROTOCOL_ID
    }

    fn matcher(&self) -> &ProtocolMatcher {
        &self.matcher
    }

    /// # Panics
    ///
    /// Always. Reaching this means a negotiation engine activated a binding
    /// whose matcher rejected the identifier.
    fn activate(&self, channel: SharedChannel, selected: &str) -> Activation<Infallible> {
        panic!(
            "NullBinding activated on channel {} for {:?}; its matcher accepts nothing",
            channel.id(),
            selected
        )
    }
}
