//! Permission model for the Capstan permission engine.
//!
//! This crate defines the authority data model and the one trait hosts
//! must implement. It sits between the foundation types and the runtime:
//!
//! ```text
//! capstan-types   (DomainId, ids, RPC wire surface)
//!       ↑
//! capstan-auth    (Permission, Caveat, tickets, UserApprover)  ◄── HERE
//!       ↑
//! capstan-engine  (store, resolver, router, meta methods)
//! ```
//!
//! # The authority model
//!
//! A [`Permission`] entitles one domain to invoke one method. Its
//! [`Granter`] backpointer makes permissions form a forest rooted at
//! user-approved records:
//!
//! ```text
//! user ──► siteA:write ──► siteB:write ──► siteC:write
//!   (root grant)    (delegated)      (delegated)
//! ```
//!
//! A delegated record is only as good as its chain: validity is checked
//! lazily by the runtime's resolver walking `granter` links back to a
//! root. Revoking a link orphans everything behind it without touching
//! the stored records.
//!
//! [`Caveat`]s restrict a permission; the `"static"` type pins the RPC
//! result to a constant without running the method.
//!
//! # Design principles
//!
//! - **Records are immutable.** Change of authority is an upsert by the
//!   `(method, granter)` natural key or an explicit removal, never an
//!   in-place edit. Constructors assign id and timestamp, so incomplete
//!   records are unrepresentable.
//! - **Trait definitions here, implementations in consumers.** The
//!   [`UserApprover`] oracle is defined in this crate and implemented by
//!   the embedding host; the runtime crate only consumes it.

mod approver;
mod caveat;
mod permission;
mod request;
mod state;

pub use approver::{ApprovalError, UserApprover};
pub use caveat::{Caveat, STATIC_CAVEAT};
pub use permission::{Granter, Permission};
pub use request::{
    PermissionsRequest, RequestMetadata, RequestedPermission, RequestedPermissions,
};
pub use state::{DomainEntry, EngineState, MethodDescription};

// Re-export the boundary types hosts touch most, so `capstan_auth` alone
// is enough to implement an approver.
pub use capstan_types::{DomainId, PermissionId, RequestId, USER_GRANTER};
