//! Permission records and granter identities.
//!
//! A [`Permission`] is the unit of authority: it entitles one domain to
//! invoke one method, under optional caveats, and carries a backpointer to
//! whoever conferred it. Records are immutable after creation; lifecycle
//! changes happen by natural-key upsert or explicit removal, never by
//! mutation.
//!
//! # Natural key
//!
//! Within one domain's list, `(method, granter)` is unique. Two records
//! with the same pair describe the same authority edge, so an upsert with
//! a matching pair replaces rather than accumulates.
//!
//! # Granter
//!
//! The wire format is a flat string — either another domain or the
//! reserved `"user"` sentinel for root grants. In code that distinction is
//! a tagged enum so a match statement, not a string comparison, separates
//! root permissions from delegated ones.

use crate::Caveat;
use capstan_types::{DomainId, InvalidDomain, PermissionId, TryNew, USER_GRANTER};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Who conferred a permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Granter {
    /// Root grant, issued through user approval.
    User,
    /// Peer delegation from another domain.
    Domain(DomainId),
}

impl Granter {
    /// Returns `true` for the root sentinel.
    #[must_use]
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }

    /// Returns the delegating domain, if any.
    #[must_use]
    pub fn domain(&self) -> Option<&DomainId> {
        match self {
            Self::User => None,
            Self::Domain(domain) => Some(domain),
        }
    }

    /// Returns the wire form of the granter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => USER_GRANTER,
            Self::Domain(domain) => domain.as_str(),
        }
    }
}

impl TryFrom<String> for Granter {
    type Error = InvalidDomain;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == USER_GRANTER {
            return Ok(Self::User);
        }
        DomainId::try_new(value).map(Self::Domain)
    }
}

impl From<Granter> for String {
    fn from(granter: Granter) -> Self {
        granter.as_str().to_string()
    }
}

impl From<DomainId> for Granter {
    fn from(domain: DomainId) -> Self {
        Self::Domain(domain)
    }
}

impl fmt::Display for Granter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Milliseconds since the Unix epoch.
///
/// `as_millis` is u128, but wall clocks will not exceed u64 for another
/// 584 million years; saturate instead of panicking on a skewed clock.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// An immutable record authorizing one domain to invoke one method.
///
/// The constructors are the only way to mint a record, and they always
/// assign a fresh [`PermissionId`] and creation timestamp — a stored
/// permission can never lack either.
///
/// # Example
///
/// ```
/// use capstan_auth::{Caveat, Granter, Permission};
/// use capstan_types::DomainId;
/// use serde_json::json;
///
/// let root = Permission::root("write");
/// assert!(root.granter.is_user());
///
/// let granter = DomainId::try_from("siteA").expect("valid domain");
/// let delegated = Permission::delegated("write", granter)
///     .with_caveats(vec![Caveat::static_value(json!("ok"))]);
/// assert!(!delegated.granter.is_user());
/// assert!(delegated.shares_key(&delegated.clone()));
/// assert!(!delegated.shares_key(&root));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Unique record id, assigned at creation.
    pub id: PermissionId,
    /// The method this record authorizes.
    pub method: String,
    /// Who conferred it.
    pub granter: Granter,
    /// Creation time, milliseconds since the Unix epoch.
    pub date: u64,
    /// Optional ordered caveats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveats: Option<Vec<Caveat>>,
}

impl Permission {
    /// Mints a root permission (granter `"user"`).
    #[must_use]
    pub fn root(method: impl Into<String>) -> Self {
        Self {
            id: PermissionId::new(),
            method: method.into(),
            granter: Granter::User,
            date: now_ms(),
            caveats: None,
        }
    }

    /// Mints a peer-delegated permission.
    #[must_use]
    pub fn delegated(method: impl Into<String>, granter: DomainId) -> Self {
        Self {
            id: PermissionId::new(),
            method: method.into(),
            granter: Granter::Domain(granter),
            date: now_ms(),
            caveats: None,
        }
    }

    /// Attaches caveats. `None` is stored when the list is empty so the
    /// wire form omits the field entirely.
    #[must_use]
    pub fn with_caveats(mut self, caveats: Vec<Caveat>) -> Self {
        self.caveats = if caveats.is_empty() {
            None
        } else {
            Some(caveats)
        };
        self
    }

    /// Returns `true` if this record is a root permission.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.granter.is_user()
    }

    /// Natural-key comparison against explicit components.
    #[must_use]
    pub fn has_key(&self, method: &str, granter: &Granter) -> bool {
        self.method == method && self.granter == *granter
    }

    /// Natural-key comparison against another record.
    #[must_use]
    pub fn shares_key(&self, other: &Permission) -> bool {
        self.has_key(&other.method, &other.granter)
    }

    /// The last `static` caveat, which short-circuits execution.
    ///
    /// Later caveats override earlier ones, so the last match wins.
    #[must_use]
    pub fn last_static_caveat(&self) -> Option<&Caveat> {
        self.caveats
            .as_deref()
            .and_then(|caveats| caveats.iter().rev().find(|c| c.is_static()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn domain(s: &str) -> DomainId {
        DomainId::try_from(s).expect("valid test domain")
    }

    #[test]
    fn root_has_user_granter_and_fresh_identity() {
        let perm = Permission::root("write");
        assert!(perm.is_root());
        assert_eq!(perm.method, "write");
        assert!(perm.date > 0);
        assert!(perm.caveats.is_none());
    }

    #[test]
    fn delegated_points_at_granter() {
        let perm = Permission::delegated("write", domain("siteA"));
        assert!(!perm.is_root());
        assert_eq!(perm.granter.domain(), Some(&domain("siteA")));
    }

    #[test]
    fn ids_differ_per_record() {
        let a = Permission::root("write");
        let b = Permission::root("write");
        assert_ne!(a.id, b.id);
        // Same natural key regardless of id.
        assert!(a.shares_key(&b));
    }

    #[test]
    fn natural_key_distinguishes_granters() {
        let root = Permission::root("write");
        let delegated = Permission::delegated("write", domain("siteA"));
        assert!(!root.shares_key(&delegated));
        assert!(root.has_key("write", &Granter::User));
        assert!(!root.has_key("read", &Granter::User));
    }

    #[test]
    fn empty_caveats_normalize_to_none() {
        let perm = Permission::root("read").with_caveats(vec![]);
        assert!(perm.caveats.is_none());
    }

    #[test]
    fn last_static_caveat_wins() {
        let perm = Permission::root("read").with_caveats(vec![
            Caveat::static_value(json!(1)),
            Caveat::new("note", json!("ignored")),
            Caveat::static_value(json!(2)),
        ]);

        let caveat = perm.last_static_caveat().expect("static caveat present");
        assert_eq!(caveat.value, json!(2));
    }

    #[test]
    fn no_static_caveat_among_unknown_types() {
        let perm = Permission::root("read").with_caveats(vec![Caveat::new("expiry", json!(0))]);
        assert!(perm.last_static_caveat().is_none());
    }

    #[test]
    fn granter_serializes_as_flat_string() {
        assert_eq!(
            serde_json::to_value(Granter::User).expect("serialize"),
            json!("user")
        );
        assert_eq!(
            serde_json::to_value(Granter::Domain(domain("siteA"))).expect("serialize"),
            json!("siteA")
        );
    }

    #[test]
    fn granter_deserializes_sentinel() {
        let granter: Granter = serde_json::from_value(json!("user")).expect("deserialize");
        assert!(granter.is_user());

        let granter: Granter = serde_json::from_value(json!("siteB")).expect("deserialize");
        assert_eq!(granter.domain(), Some(&domain("siteB")));
    }

    #[test]
    fn granter_rejects_empty_string() {
        let result: Result<Granter, _> = serde_json::from_value(json!(""));
        assert!(result.is_err());
    }

    #[test]
    fn permission_serde_roundtrip() {
        let perm =
            Permission::delegated("write", domain("siteA")).with_caveats(vec![Caveat::new(
                "filter",
                json!(["a"]),
            )]);

        let value = serde_json::to_value(&perm).expect("serialize");
        assert_eq!(value["granter"], "siteA");
        assert_eq!(value["method"], "write");

        let parsed: Permission = serde_json::from_value(value).expect("deserialize");
        assert_eq!(parsed, perm);
    }
}
