//! Protobind Core
//!
//! Pure, I/O-free building blocks shared by every protocol binding:
//! - Validated protocol identifiers ([`ProtocolId`], [`Version`])
//! - Matching rules evaluated against negotiated identifiers ([`ProtocolMatcher`], [`MatchMode`])
//!
//! Nothing in this crate touches a channel or a runtime. Matchers are built once
//! at registration time and may be shared freely between negotiation tasks.

pub mod error;
pub mod id;
pub mod matcher;

pub use error::{Error, Result};
pub use id::{ProtocolId, Version};
pub use matcher::{MatchMode, ProtocolMatcher};

/// Longest identifier multistream-select peers are expected to accept
pub const MAX_PROTOCOL_ID_LEN: usize = 140;

/// Line delimiter used by multistream-select; never valid inside an identifier
pub const PROTOCOL_ID_DELIMITER: char = '\n';
