//! Caller-domain identifiers.
//!
//! A domain is the opaque identity of a requesting agent (an origin, an
//! agent id, whatever the host labels callers with). The engine trusts the
//! string; the only validation is structural, and it happens in exactly one
//! place: [`DomainId::try_new`].
//!
//! The string `"user"` is reserved as the root-granter sentinel and can
//! never name a caller. Accepting it as a domain would let a caller
//! impersonate the root of every delegation chain.

use crate::{ErrorCode, TryNew};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Reserved granter string marking a root (user-approved) permission.
///
/// [`DomainId::try_new`] rejects it, so a `DomainId` value is guaranteed
/// to never collide with the sentinel.
pub const USER_GRANTER: &str = "user";

/// Validation failure for a caller-supplied domain string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDomain {
    /// Domains are opaque but must be non-empty.
    #[error("domain identifier must not be empty")]
    Empty,

    /// The reserved root-granter sentinel cannot name a caller.
    #[error("domain identifier '{USER_GRANTER}' is reserved")]
    ReservedSentinel,
}

impl ErrorCode for InvalidDomain {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "DOMAIN_EMPTY",
            Self::ReservedSentinel => "DOMAIN_RESERVED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // The caller's identity will not change on retry.
        false
    }
}

/// Opaque identifier of a requesting domain, compared by exact equality.
///
/// Construction goes through [`TryNew`] (or the `TryFrom` impls, which
/// serde deserialization also uses), so every live `DomainId` is non-empty
/// and distinct from the reserved `"user"` sentinel.
///
/// # Example
///
/// ```
/// use capstan_types::{DomainId, InvalidDomain, TryNew};
///
/// let site = DomainId::try_new("https://site.example".to_string()).expect("valid domain");
/// assert_eq!(site.as_str(), "https://site.example");
///
/// assert_eq!(
///     DomainId::try_new("user".to_string()).unwrap_err(),
///     InvalidDomain::ReservedSentinel,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainId(String);

impl DomainId {
    /// Returns the domain as a borrowed string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryNew for DomainId {
    type Error = InvalidDomain;
    type Args = String;

    fn try_new(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InvalidDomain::Empty);
        }
        if value == USER_GRANTER {
            return Err(InvalidDomain::ReservedSentinel);
        }
        Ok(Self(value))
    }
}

impl TryFrom<String> for DomainId {
    type Error = InvalidDomain;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<&str> for DomainId {
    type Error = InvalidDomain;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value.to_string())
    }
}

impl From<DomainId> for String {
    fn from(domain: DomainId) -> Self {
        domain.0
    }
}

impl AsRef<str> for DomainId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_error_code;

    #[test]
    fn accepts_ordinary_domain() {
        let domain = DomainId::try_new("siteA".to_string()).expect("valid domain");
        assert_eq!(domain.as_str(), "siteA");
        assert_eq!(domain.to_string(), "siteA");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            DomainId::try_new(String::new()).unwrap_err(),
            InvalidDomain::Empty
        );
    }

    #[test]
    fn rejects_reserved_sentinel() {
        assert_eq!(
            DomainId::try_new(USER_GRANTER.to_string()).unwrap_err(),
            InvalidDomain::ReservedSentinel
        );
    }

    #[test]
    fn sentinel_check_is_exact() {
        // Only the exact sentinel is reserved; lookalikes are ordinary domains.
        assert!(DomainId::try_from("User").is_ok());
        assert!(DomainId::try_from("user2").is_ok());
    }

    #[test]
    fn serde_roundtrip() {
        let domain = DomainId::try_from("siteA").expect("valid domain");
        let json = serde_json::to_string(&domain).expect("serialize");
        assert_eq!(json, "\"siteA\"");
        let parsed: DomainId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, domain);
    }

    #[test]
    fn serde_rejects_sentinel() {
        let result: Result<DomainId, _> = serde_json::from_str("\"user\"");
        assert!(result.is_err());
    }

    #[test]
    fn error_codes_follow_convention() {
        assert_error_code(&InvalidDomain::Empty, "DOMAIN_");
        assert_error_code(&InvalidDomain::ReservedSentinel, "DOMAIN_");
    }
}
