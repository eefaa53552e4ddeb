//! Matching rules for negotiated protocol identifiers
//!
//! A [`ProtocolMatcher`] decides whether a binding claims the identifier a
//! negotiation settled on. Evaluation is a pure, total function: any string
//! yields a boolean and nothing else.
//!
//! Modes:
//! - `Exact` matches the reference identifier byte for byte
//! - `Prefix` matches any identifier starting with the reference
//! - `Major` matches the same protocol name at the same major version
//! - `Never` matches nothing, for inert placeholder bindings
//! - `Custom` delegates to a caller-supplied predicate

use std::fmt;
use std::sync::Arc;

use crate::{Error, ProtocolId, Result};

/// Matching strategy of a [`ProtocolMatcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum MatchMode {
    Exact,
    Prefix,
    Major,
    Never,
    Custom,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Prefix => "prefix",
            MatchMode::Major => "major",
            MatchMode::Never => "never",
            MatchMode::Custom => "custom",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
enum Rule {
    Exact(String),
    Prefix(String),
    Major {
        reference: String,
        name: String,
        major: u64,
    },
    Never,
    Custom(Predicate),
}

/// Predicate evaluated against a negotiated protocol identifier
///
/// Immutable once built. Cloning is cheap; custom predicates are shared.
#[derive(Clone)]
pub struct ProtocolMatcher {
    rule: Rule,
}

impl ProtocolMatcher {
    /// Build a matcher from a mode and an optional reference identifier
    ///
    /// `Never` ignores the reference. `Custom` cannot be built this way; use
    /// [`ProtocolMatcher::custom`].
    pub fn new(mode: MatchMode, reference: Option<&str>) -> Result<Self> {
        let require = |mode: MatchMode| reference.ok_or(Error::MissingReference(mode.as_str()));
        match mode {
            MatchMode::Exact => Ok(Self::exact(require(mode)?)),
            MatchMode::Prefix => Ok(Self::prefix(require(mode)?)),
            MatchMode::Major => Self::major(require(mode)?),
            MatchMode::Never => Ok(Self::never()),
            MatchMode::Custom => Err(Error::MissingPredicate(mode.as_str())),
        }
    }

    /// Match the reference identifier exactly (case-sensitive, no normalization)
    pub fn exact(reference: impl Into<String>) -> Self {
        Self {
            rule: Rule::Exact(reference.into()),
        }
    }

    /// Match any identifier starting with `prefix`
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            rule: Rule::Prefix(prefix.into()),
        }
    }

    /// Match the reference's protocol name at the reference's major version
    ///
    /// `/chat/1.0.0` accepts `/chat/1.4.2` but not `/chat/2.0.0` or `/chatter/1.0.0`.
    pub fn major(reference: &str) -> Result<Self> {
        let id = ProtocolId::parse(reference)?;
        let version = id
            .version()
            .ok_or_else(|| Error::InvalidVersion(format!("no version in {}", reference)))?;

        Ok(Self {
            rule: Rule::Major {
                reference: reference.to_string(),
                name: id.name().to_string(),
                major: version.major,
            },
        })
    }

    /// Match nothing
    pub const fn never() -> Self {
        Self { rule: Rule::Never }
    }

    /// Match with an arbitrary predicate
    ///
    /// The predicate must be pure; it may be called concurrently from many
    /// negotiation tasks.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            rule: Rule::Custom(Arc::new(predicate)),
        }
    }

    /// Get the matching mode
    pub fn mode(&self) -> MatchMode {
        match &self.rule {
            Rule::Exact(_) => MatchMode::Exact,
            Rule::Prefix(_) => MatchMode::Prefix,
            Rule::Major { .. } => MatchMode::Major,
            Rule::Never => MatchMode::Never,
            Rule::Custom(_) => MatchMode::Custom,
        }
    }

    /// Get the reference identifier, for modes that compare against one
    pub fn reference(&self) -> Option<&str> {
        match &self.rule {
            Rule::Exact(r) | Rule::Prefix(r) => Some(r),
            Rule::Major { reference, .. } => Some(reference),
            Rule::Never | Rule::Custom(_) => None,
        }
    }

    /// True when no identifier can ever match
    pub fn is_inert(&self) -> bool {
        matches!(self.rule, Rule::Never)
    }

    /// Check whether `candidate` is claimed by this matcher
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.rule {
            Rule::Exact(reference) => candidate == reference,
            Rule::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Rule::Major { name, major, .. } => match ProtocolId::parse(candidate) {
                Ok(id) => id.version().map(|v| v.major) == Some(*major) && id.name() == name,
                Err(_) => false,
            },
            Rule::Never => false,
            Rule::Custom(predicate) => predicate(candidate),
        }
    }
}

impl fmt::Debug for ProtocolMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolMatcher")
            .field("mode", &self.mode())
            .field("reference", &self.reference())
            .finish()
    }
}
