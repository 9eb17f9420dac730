//! Engine configuration.
//!
//! All options are supplied at construction and frozen; there is no
//! runtime reconfiguration surface. The only required option is the
//! approver — an engine that cannot ask the user is misconfigured, and
//! [`CapstanEngine::try_new`](crate::CapstanEngine) fails fast on it.

use crate::RestrictedMethod;
use capstan_auth::{EngineState, UserApprover};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Default bound on delegation-chain length.
///
/// Well-formed chains are short (every hop is a real grant issued by a
/// domain that held the capability); the bound only exists to stop a
/// corrupted snapshot from walking forever.
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 64;

/// What happens to a pending ticket when approval ends without grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectedRequestPolicy {
    /// Keep the ticket in the pending list (audit-trail reading).
    #[default]
    Retain,
    /// Remove the ticket, leaving no trace of the rejected ask.
    Discard,
}

/// How caveats travel across peer delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaveatPolicy {
    /// Delegated permissions copy the granter's resolved caveats
    /// verbatim, so a restriction on the granter binds the grantee too.
    #[default]
    InheritFromGranter,
    /// Delegated permissions carry no caveats.
    DropOnDelegation,
}

/// Construction-time options for a [`CapstanEngine`](crate::CapstanEngine).
///
/// # Example
///
/// ```
/// use capstan_engine::{handler_fn, EngineConfig, RestrictedMethod};
/// use capstan_types::Disposition;
/// use serde_json::json;
/// # use capstan_auth::{ApprovalError, PermissionsRequest, RequestedPermissions, UserApprover};
/// # use async_trait::async_trait;
/// # use std::sync::Arc;
/// # struct DenyAll;
/// # #[async_trait]
/// # impl UserApprover for DenyAll {
/// #     async fn request_user_approval(
/// #         &self,
/// #         _request: &PermissionsRequest,
/// #     ) -> Result<RequestedPermissions, ApprovalError> {
/// #         Ok(RequestedPermissions::new())
/// #     }
/// # }
///
/// let config = EngineConfig::new()
///     .safe_method("ping")
///     .restricted_method(
///         "write",
///         RestrictedMethod::new(
///             "Write to the notebook",
///             handler_fn(|_req, res| {
///                 res.set_result(json!("ok"));
///                 Disposition::End
///             }),
///         ),
///     )
///     .with_method_prefix("wallet_")
///     .with_approver(Arc::new(DenyAll));
/// # let _ = config;
/// ```
pub struct EngineConfig {
    /// Method names that bypass all permission checks.
    pub safe_methods: HashSet<String>,
    /// The governed method set.
    pub restricted_methods: HashMap<String, RestrictedMethod>,
    /// Namespace prefix for the four meta methods (default empty).
    pub method_prefix: String,
    /// The user-approval oracle. Required.
    pub approver: Option<Arc<dyn UserApprover>>,
    /// Snapshot to rehydrate from.
    pub init_state: Option<EngineState>,
    /// Resolver hop bound.
    pub max_delegation_depth: usize,
    /// Pending-ticket policy after a rejected approval.
    pub rejected_request_policy: RejectedRequestPolicy,
    /// Caveat propagation across peer delegation.
    pub caveat_policy: CaveatPolicy,
}

impl EngineConfig {
    /// Creates an empty configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            safe_methods: HashSet::new(),
            restricted_methods: HashMap::new(),
            method_prefix: String::new(),
            approver: None,
            init_state: None,
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
            rejected_request_policy: RejectedRequestPolicy::default(),
            caveat_policy: CaveatPolicy::default(),
        }
    }

    /// Adds one safe method.
    #[must_use]
    pub fn safe_method(mut self, method: impl Into<String>) -> Self {
        self.safe_methods.insert(method.into());
        self
    }

    /// Replaces the safe-method set.
    #[must_use]
    pub fn with_safe_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.safe_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one restricted method.
    #[must_use]
    pub fn restricted_method(mut self, name: impl Into<String>, method: RestrictedMethod) -> Self {
        self.restricted_methods.insert(name.into(), method);
        self
    }

    /// Sets the meta-method namespace prefix.
    #[must_use]
    pub fn with_method_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.method_prefix = prefix.into();
        self
    }

    /// Sets the required approval oracle.
    #[must_use]
    pub fn with_approver(mut self, approver: Arc<dyn UserApprover>) -> Self {
        self.approver = Some(approver);
        self
    }

    /// Rehydrates from a previously emitted snapshot.
    #[must_use]
    pub fn with_init_state(mut self, state: EngineState) -> Self {
        self.init_state = Some(state);
        self
    }

    /// Overrides the resolver hop bound.
    #[must_use]
    pub fn with_max_delegation_depth(mut self, depth: usize) -> Self {
        self.max_delegation_depth = depth;
        self
    }

    /// Sets the rejected-ticket policy.
    #[must_use]
    pub fn with_rejected_request_policy(mut self, policy: RejectedRequestPolicy) -> Self {
        self.rejected_request_policy = policy;
        self
    }

    /// Sets the delegation caveat policy.
    #[must_use]
    pub fn with_caveat_policy(mut self, policy: CaveatPolicy) -> Self {
        self.caveat_policy = policy;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("safe_methods", &self.safe_methods)
            .field(
                "restricted_methods",
                &self.restricted_methods.keys().collect::<Vec<_>>(),
            )
            .field("method_prefix", &self.method_prefix)
            .field("has_approver", &self.approver.is_some())
            .field("has_init_state", &self.init_state.is_some())
            .field("max_delegation_depth", &self.max_delegation_depth)
            .field("rejected_request_policy", &self.rejected_request_policy)
            .field("caveat_policy", &self.caveat_policy)
            .finish()
    }
}
