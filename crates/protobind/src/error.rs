//! Binding error types

use thiserror::Error;

use crate::channel::ChannelId;

pub type Result<T> = std::result::Result<T, BindingError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("channel closed before activation completed")]
    ChannelClosed,

    #[error("handshake rejected: {0}")]
    Handshake(String),

    #[error("install failed: {0}")]
    Install(String),

    #[error("activation timed out")]
    Timeout,

    #[error("no binding matches protocol {0}")]
    NoMatch(String),

    #[error("protocol already registered: {0}")]
    DuplicateProtocol(String),

    #[error("invalid binding: {0}")]
    InvalidBinding(String),

    #[error("channel {channel} already carries protocol {protocol}")]
    AlreadyAttached { channel: ChannelId, protocol: String },

    #[error("controller of {protocol} is not a {expected}")]
    ControllerType {
        protocol: String,
        expected: &'static str,
    },

    #[error("channel error: {0}")]
    Channel(String),

    #[error(transparent)]
    Core(#[from] protobind_core::Error),
}
