//! Serializable engine state.
//!
//! [`EngineState`] is the single object the engine persists and restores:
//! the domain → permissions map, the pending approval tickets, and the
//! description list derived from the restricted-method registry. The wire
//! layout is camelCase JSON; a snapshot taken from one engine rehydrates
//! another via the engine's `init_state` configuration.
//!
//! The structural operations here (first-match lookup, natural-key upsert
//! and removal) are pure data manipulation; persistence and notification
//! stay in the runtime crate.

use crate::{Permission, PermissionsRequest};
use capstan_types::{DomainId, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One domain's slice of the permission map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEntry {
    /// Permissions in insertion order. Order is load-bearing: the
    /// delegation resolver follows the first record matching a method.
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl DomainEntry {
    /// First permission for `method`, in insertion order.
    #[must_use]
    pub fn permission_for(&self, method: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.method == method)
    }

    /// Natural-key upsert: drops any existing record whose
    /// `(method, granter)` matches an incoming one, then appends the
    /// incoming records. Within one batch the last record per natural
    /// key wins. Re-granting therefore moves a permission to the end of
    /// the list with a fresh id and date.
    pub fn upsert(&mut self, incoming: Vec<Permission>) {
        let mut deduped: Vec<Permission> = Vec::with_capacity(incoming.len());
        for permission in incoming {
            deduped.retain(|staged| !staged.shares_key(&permission));
            deduped.push(permission);
        }
        self.permissions
            .retain(|existing| !deduped.iter().any(|new| new.shares_key(existing)));
        self.permissions.extend(deduped);
    }

    /// Removes every record sharing a natural key with one of `targets`.
    pub fn remove(&mut self, targets: &[Permission]) {
        self.permissions
            .retain(|existing| !targets.iter().any(|t| t.shares_key(existing)));
    }
}

/// Registry-derived description of one governed method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescription {
    /// The governed method name.
    pub method: String,
    /// Human-readable description for approval surfaces.
    pub description: String,
}

/// The complete serializable state of a permission engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    /// Domain → permission list.
    #[serde(default)]
    pub domains: HashMap<DomainId, DomainEntry>,
    /// Pending approval tickets, in arrival order.
    #[serde(default)]
    pub permissions_requests: Vec<PermissionsRequest>,
    /// Derived from the restricted-method registry; immutable while the
    /// engine runs and rebuilt from the live registry on restore.
    #[serde(default)]
    pub permissions_descriptions: Vec<MethodDescription>,
}

impl EngineState {
    /// The permissions of `domain`, empty when unknown.
    #[must_use]
    pub fn permissions_of(&self, domain: &DomainId) -> &[Permission] {
        self.domains
            .get(domain)
            .map(|entry| entry.permissions.as_slice())
            .unwrap_or_default()
    }

    /// Position of a pending ticket by id.
    #[must_use]
    pub fn request_position(&self, id: RequestId) -> Option<usize> {
        self.permissions_requests.iter().position(|r| r.id() == id)
    }
}
