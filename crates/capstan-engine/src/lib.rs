//! Capstan — an object-capability permission engine for RPC surfaces.
//!
//! The engine mediates method invocations on behalf of mutually-
//! distrusting domains. Per request it decides whether the caller holds
//! the capability, dispatches to the registered handler (or
//! short-circuits on a `static` caveat), and exposes a four-method meta
//! protocol for requesting, granting, revoking and listing permissions —
//! including user-mediated approval and peer-to-peer delegation with
//! granter-traceable chains.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Host middleware chain                     │
//! └──────────────────────────────────────────────────────────────┘
//!                  │ (domain, req, &mut res)
//!                  ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        CapstanEngine                          │
//! │  ┌──────────┐  ┌───────────┐  ┌──────────┐  ┌─────────────┐  │
//! │  │  Router   │─►│ Resolver  │─►│ Executor │  │  Approval   │  │
//! │  │ (classify)│  │ (chains)  │  │ (caveats)│  │ coordinator │  │
//! │  └──────────┘  └───────────┘  └──────────┘  └─────────────┘  │
//! │        │               ▲            ▲               │         │
//! │        ▼               │            │               ▼         │
//! │  ┌──────────────────────────┐  ┌──────────────────────────┐  │
//! │  │   PermissionStore        │  │   MethodRegistry (frozen) │  │
//! │  │   (observable state)     │  └──────────────────────────┘  │
//! │  └──────────────────────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//!                  │ watch::Receiver<EngineState>
//!                  ▼
//!          host persistence task
//! ```
//!
//! # Quick start
//!
//! ```
//! use capstan_engine::{handler_fn, CapstanEngine, EngineConfig, RestrictedMethod};
//! use capstan_auth::{ApprovalError, PermissionsRequest, RequestedPermissions, UserApprover};
//! use capstan_types::{Disposition, DomainId, RpcRequest, RpcResponse, TryNew};
//! use async_trait::async_trait;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! /// Approves exactly what was asked for.
//! struct ApproveAll;
//!
//! #[async_trait]
//! impl UserApprover for ApproveAll {
//!     async fn request_user_approval(
//!         &self,
//!         request: &PermissionsRequest,
//!     ) -> Result<RequestedPermissions, ApprovalError> {
//!         Ok(request.options.clone())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = CapstanEngine::try_new(
//!     EngineConfig::new()
//!         .restricted_method(
//!             "write",
//!             RestrictedMethod::new(
//!                 "Write to the notebook",
//!                 handler_fn(|_req, res| {
//!                     res.set_result(json!("ok"));
//!                     Disposition::End
//!                 }),
//!             ),
//!         )
//!         .with_approver(Arc::new(ApproveAll)),
//! )
//! .expect("approver configured");
//!
//! let site = DomainId::try_new("siteA".to_string()).expect("valid domain");
//!
//! // Ask for the capability, then use it.
//! let ask = RpcRequest::new("requestPermissions", json!([{ "write": {} }]));
//! let mut res = RpcResponse::new();
//! let disposition = engine.handle_request(&site, &ask, &mut res).await;
//! assert!(disposition.is_end());
//! assert!(res.error.is_none());
//!
//! let call = RpcRequest::new("write", json!([]));
//! let mut res = RpcResponse::new();
//! let disposition = engine.handle_request(&site, &call, &mut res).await;
//! assert!(disposition.is_end());
//! assert_eq!(res.result, Some(json!("ok")));
//! # }
//! ```
//!
//! # Trust model
//!
//! The engine trusts the host's domain labeling (authentication is the
//! host's job) and the approver's returned map (user customization is a
//! feature, not a spoof). What it enforces is the capability discipline
//! between domains: nobody grants what they cannot themselves resolve to
//! a user-approved root, and nobody revokes what they neither issued nor
//! hold.

mod config;
mod engine;
mod error;
mod registry;
mod resolver;
mod store;

pub use config::{
    CaveatPolicy, EngineConfig, RejectedRequestPolicy, DEFAULT_MAX_DELEGATION_DEPTH,
};
pub use engine::CapstanEngine;
pub use error::{ConfigError, ResolverError};
pub use registry::{handler_fn, MethodHandler, MethodRegistry, RestrictedMethod};
pub use resolver::{resolve_permission, resolve_untraversed};
pub use store::PermissionStore;

// The model and wire types hosts need alongside the engine.
pub use capstan_auth::{
    ApprovalError, Caveat, DomainEntry, EngineState, Granter, MethodDescription, Permission,
    PermissionsRequest, RequestMetadata, RequestedPermission, RequestedPermissions, UserApprover,
    STATIC_CAVEAT,
};
pub use capstan_types::{
    CallMetadata, Disposition, DomainId, PermissionId, RequestId, RpcError, RpcRequest,
    RpcResponse, TryNew,
};
