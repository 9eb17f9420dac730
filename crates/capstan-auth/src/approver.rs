//! The external approval oracle.
//!
//! The engine never decides on its own whether a user grants a requested
//! permission; it parks a ticket and asks the host's [`UserApprover`].
//! The approver is free to return a *different* map than was requested —
//! users may approve a subset, or a customized variant — and the engine
//! trusts the returned map verbatim.
//!
//! ```text
//! engine                       approver (host)              user
//!   │  request_user_approval(ticket)  │                      │
//!   ├────────────────────────────────►│  render prompt       │
//!   │                                 ├─────────────────────►│
//!   │                                 │      approve subset  │
//!   │         Ok(approved map)        │◄─────────────────────┤
//!   │◄────────────────────────────────┤                      │
//! ```
//!
//! An empty approved map means "the user granted nothing" and surfaces as
//! the user-rejected wire error; an `Err` carries the approver's own
//! reason (dialog dismissed, surface unavailable, ...).

use crate::{PermissionsRequest, RequestedPermissions};
use async_trait::async_trait;
use capstan_types::ErrorCode;
use thiserror::Error;

/// Why an approval flow did not produce grants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApprovalError {
    /// The approver refused or failed, with its own reason.
    #[error("{reason}")]
    Rejected {
        /// Host-provided explanation, forwarded to the caller.
        reason: String,
    },
}

impl ApprovalError {
    /// Creates a rejection with the given reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

impl ErrorCode for ApprovalError {
    fn code(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "APPROVAL_REJECTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // The user may well approve an identical request later.
        true
    }
}

/// Asynchronous user-approval oracle, implemented by the host.
///
/// Implementations must be `Send + Sync`: multiple approval flows may be
/// in flight at once, and their completions interleave arbitrarily.
///
/// There is no engine-imposed timeout. An approver that never resolves
/// leaves the ticket pending; hosts wanting timeouts should race the
/// prompt against their own timer and return a rejection on expiry.
#[async_trait]
pub trait UserApprover: Send + Sync {
    /// Presents `request` for decision and returns the approved map.
    ///
    /// The returned map is trusted verbatim and may differ from
    /// `request.options`. An empty map is a rejection.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError`] when the flow ends without a decision
    /// map (dismissed dialog, unavailable surface, host-side timeout).
    async fn request_user_approval(
        &self,
        request: &PermissionsRequest,
    ) -> Result<RequestedPermissions, ApprovalError>;
}
