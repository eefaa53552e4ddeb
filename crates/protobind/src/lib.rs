//! Protobind
//!
//! The extension point through which wire protocols plug into a
//! multistream-negotiated peer-to-peer stack.
//!
//! A negotiation engine (not part of this crate) agrees with the remote peer
//! on a protocol identifier, looks up the binding whose matcher claims it, and
//! activates that binding on the live channel. Activation installs the
//! protocol's handlers and eventually yields a typed controller.
//!
//! This crate provides:
//! - The binding contract ([`ProtocolBinding`]) and deferred result ([`Activation`])
//! - The channel contract bindings are activated on ([`Channel`])
//! - Factories wrapping plain handlers ([`create_simple`], [`create_simple_with`])
//! - An inert placeholder binding ([`NullBinding`])
//! - A heterogeneous, read-mostly registry ([`ProtocolRegistry`])
//!
//! # Example
//!
//! ```ignore
//! use protobind::{create_simple, handler_fn, ProtocolRegistry};
//!
//! let mut registry = ProtocolRegistry::new();
//! registry.register(create_simple("/chat/1.0.0", handler_fn(|ch| async move {
//!     Ok(ChatController::new(ch))
//! })))?;
//!
//! // After multistream-select agreed on an identifier:
//! let chat: ChatController = registry.activate_as(channel, "/chat/1.0.0")?.await?;
//! ```

pub mod activation;
pub mod binding;
pub mod channel;
pub mod erased;
pub mod error;
pub mod handler;
pub mod registry;
pub mod sentinel;

pub use activation::Activation;
pub use binding::{create_simple, create_simple_with, MapController, ProtocolBinding, SimpleBinding};
pub use channel::{Channel, ChannelEvent, ChannelId, ChannelKind, SharedChannel};
pub use erased::{erase, AnyController, Erased, ErasedBinding};
pub use error::{BindingError, Result};
pub use handler::{handler_fn, HandlerFn, ProtocolHandler, SessionHandler, SessionHandlerFactory};
pub use registry::{ProtocolRegistry, RegistryConfig, DEFAULT_ACTIVATION_TIMEOUT};
pub use sentinel::{NullBinding, NULL_BINDING, NULL_PROTOCOL_ID};

pub use protobind_core::{MatchMode, ProtocolId, ProtocolMatcher, Version};
