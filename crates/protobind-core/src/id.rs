//! Protocol identifier parsing
//!
//! Identifiers are opaque tokens compared byte for byte. By convention they are
//! slash-separated paths ending in a version:
//! ```text
//! /chat/1.0.0
//! /ipfs/kad/1.0.0
//! /yamux/1.0.0
//! ```
//!
//! Parsing only rejects what can never travel over multistream-select (empty
//! strings, embedded newlines, oversized tokens). The segment and version views
//! are best-effort and used by version-aware matchers.

use std::fmt;

use crate::{Error, Result, MAX_PROTOCOL_ID_LEN, PROTOCOL_ID_DELIMITER};

/// A validated protocol identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolId {
    raw: String,
}

impl ProtocolId {
    /// Parse an identifier string
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidProtocolId("empty protocol id".to_string()));
        }

        if s.len() > MAX_PROTOCOL_ID_LEN {
            return Err(Error::InvalidProtocolId(format!(
                "protocol id too long: {} bytes (max {})",
                s.len(),
                MAX_PROTOCOL_ID_LEN
            )));
        }

        if s.contains(PROTOCOL_ID_DELIMITER) {
            return Err(Error::InvalidProtocolId(format!(
                "protocol id contains a newline: {:?}",
                s
            )));
        }

        Ok(Self { raw: s.to_string() })
    }

    /// Get the raw identifier string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Non-empty path segments, in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('/').filter(|s| !s.is_empty())
    }

    /// Parse the trailing segment as a version, if it is one
    pub fn version(&self) -> Option<Version> {
        self.segments().last().and_then(|s| Version::parse(s).ok())
    }

    /// The identifier with its trailing version segment removed
    ///
    /// `/ipfs/kad/1.0.0` has name `/ipfs/kad`. Identifiers without a version
    /// are their own name.
    pub fn name(&self) -> &str {
        if self.version().is_none() {
            return &self.raw;
        }
        match self.raw.trim_end_matches('/').rfind('/') {
            Some(idx) => &self.raw[..idx],
            None => &self.raw,
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl AsRef<str> for ProtocolId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<&str> for ProtocolId {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        ProtocolId::parse(s)
    }
}

impl TryFrom<String> for ProtocolId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        ProtocolId::parse(&s)
    }
}

/// A dotted numeric version: `major[.minor[.patch]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
}

impl Version {
    /// Parse a version segment
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split('.');
        let mut next = |required: bool| -> Result<Option<u64>> {
            match parts.next() {
                Some(p) => p
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| Error::InvalidVersion(s.to_string())),
                None if required => Err(Error::InvalidVersion(s.to_string())),
                None => Ok(None),
            }
        };

        let major = next(true)?.ok_or_else(|| Error::InvalidVersion(s.to_string()))?;
        let minor = next(false)?;
        let patch = if minor.is_some() { next(false)? } else { None };

        if parts.next().is_some() {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
        }
        if let Some(patch) = self.patch {
            write!(f, ".{}", patch)?;
        }
        Ok(())
    }
}
