//! The permission engine.
//!
//! [`CapstanEngine`] ties the pieces together: the observable store, the
//! frozen method registry, the delegation resolver, and the four
//! meta-method flows. Per incoming request it plays one middleware step
//! in the host's chain:
//!
//! ```text
//!              ┌───────────────────────────────────────────┐
//!  (domain,    │ router:  safe? ── Next                    │
//!   req, res)──┤          meta? ── get/request/grant/revoke │
//!              │          else ─── resolve ──► executor     │
//!              └───────────────────────────────────────────┘
//! ```
//!
//! The engine is `Send + Sync` and all entry points take `&self`; any
//! number of requests and approval flows may be in flight concurrently.
//! Store writes serialize through the store's single commit path, and
//! conflicting writes resolve by commit order (last writer wins).

mod approval;
mod executor;
mod grants;
mod params;
mod router;

use crate::{
    CaveatPolicy, ConfigError, EngineConfig, MethodRegistry, PermissionStore,
    RejectedRequestPolicy,
};
use capstan_auth::{EngineState, Permission, PermissionsRequest, UserApprover};
use capstan_types::{DomainId, TryNew};
use std::collections::HashSet;
use std::sync::Arc;

/// Object-capability permission engine mediating RPC method invocations.
///
/// Constructed from an [`EngineConfig`] through [`TryNew`]; the only
/// fatal configuration error is a missing approver.
pub struct CapstanEngine {
    store: PermissionStore,
    registry: MethodRegistry,
    safe_methods: HashSet<String>,
    method_prefix: String,
    approver: Arc<dyn UserApprover>,
    max_delegation_depth: usize,
    rejected_request_policy: RejectedRequestPolicy,
    caveat_policy: CaveatPolicy,
}

impl TryNew for CapstanEngine {
    type Error = ConfigError;
    type Args = EngineConfig;

    fn try_new(config: EngineConfig) -> Result<Self, Self::Error> {
        let approver = config.approver.ok_or(ConfigError::MissingApprover)?;
        let registry = MethodRegistry::new(config.restricted_methods);

        // The description list is derived data; rebuild it from the live
        // registry rather than trusting a restored snapshot's copy.
        let mut initial = config.init_state.unwrap_or_default();
        initial.permissions_descriptions = registry.descriptions();

        Ok(Self {
            store: PermissionStore::new(initial),
            registry,
            safe_methods: config.safe_methods,
            method_prefix: config.method_prefix,
            approver,
            max_delegation_depth: config.max_delegation_depth,
            rejected_request_policy: config.rejected_request_policy,
            caveat_policy: config.caveat_policy,
        })
    }
}

impl CapstanEngine {
    /// The underlying observable store.
    ///
    /// Hosts use this to subscribe for persistence snapshots or to apply
    /// out-of-band state surgery ([`PermissionStore::set_domains`]).
    #[must_use]
    pub fn store(&self) -> &PermissionStore {
        &self.store
    }

    /// The frozen restricted-method registry.
    #[must_use]
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Current full state snapshot.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.store.snapshot()
    }

    /// The permissions currently held by `domain` (no chain validation).
    #[must_use]
    pub fn permissions_for(&self, domain: &DomainId) -> Vec<Permission> {
        self.store.permissions(domain)
    }

    /// The pending approval tickets.
    #[must_use]
    pub fn pending_requests(&self) -> Vec<PermissionsRequest> {
        self.store.pending_requests()
    }

    pub(crate) fn max_delegation_depth(&self) -> usize {
        self.max_delegation_depth
    }

    pub(crate) fn caveat_policy(&self) -> CaveatPolicy {
        self.caveat_policy
    }

    pub(crate) fn rejected_request_policy(&self) -> RejectedRequestPolicy {
        self.rejected_request_policy
    }

    pub(crate) fn approver(&self) -> &dyn UserApprover {
        self.approver.as_ref()
    }
}
