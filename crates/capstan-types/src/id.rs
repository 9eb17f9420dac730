//! Identifier types.
//!
//! All identifiers are UUID v4 newtypes: globally unique without
//! coordination, safe to embed in snapshots, and serialized as plain
//! strings so the wire format stays opaque.
//!
//! `Display` adds a short prefix (`perm:`, `preq:`) so log lines stay
//! grep-able; serde stays prefix-free.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a single permission record.
///
/// Assigned once at creation by the `Permission` constructors and never
/// reused; a record overwritten by an upsert gets a new id.
///
/// No `Default` impl: a permission id must always be minted deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Mints a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "perm:{}", self.0)
    }
}

/// Identifier of a pending permissions request (approval ticket).
///
/// Unique across pending requests; the approval coordinator keys ticket
/// removal on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Mints a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preq:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_ids_are_unique() {
        assert_ne!(PermissionId::new(), PermissionId::new());
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn display_prefixes() {
        let perm = PermissionId::new();
        assert!(perm.to_string().starts_with("perm:"));
        assert!(perm.to_string().contains(&perm.uuid().to_string()));

        let req = RequestId::new();
        assert!(req.to_string().starts_with("preq:"));
    }

    #[test]
    fn serde_is_plain_uuid_string() {
        let perm = PermissionId::new();
        let json = serde_json::to_string(&perm).expect("serialize");
        assert_eq!(json, format!("\"{}\"", perm.uuid()));

        let parsed: PermissionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, perm);
    }
}
