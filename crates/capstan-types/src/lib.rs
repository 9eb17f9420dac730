//! Foundation types for the Capstan permission engine.
//!
//! Capstan mediates RPC method invocations on behalf of mutually-
//! distrusting domains. This crate is the bottom of the dependency stack:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  capstan-types  : DomainId, ids, RPC wire types  ◄── HERE │
//! │  capstan-auth   : Permission, Caveat, UserApprover        │
//! └──────────────────────────────────────────────────────────┘
//!                             ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  capstan-engine : store, resolver, router, meta methods   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Hosts embedding the engine only need the types here (plus the
//! `UserApprover` trait from `capstan-auth`) to drive it: everything that
//! crosses the middleware boundary — [`RpcRequest`], [`RpcResponse`],
//! [`RpcError`], [`Disposition`] — lives in this crate.
//!
//! # Identifier design
//!
//! Domains are caller-supplied opaque strings validated once at the
//! boundary ([`DomainId`]); permission and request ids are UUID v4
//! newtypes minted by the engine ([`PermissionId`], [`RequestId`]).
//!
//! # Example
//!
//! ```
//! use capstan_types::{DomainId, RpcRequest, RpcResponse, TryNew};
//! use serde_json::json;
//!
//! let domain = DomainId::try_new("https://site.example".to_string()).expect("valid domain");
//! let req = RpcRequest::new("write", json!([{"path": "/notes"}]));
//! let res = RpcResponse::new();
//!
//! assert_eq!(domain.as_str(), "https://site.example");
//! assert_eq!(req.method, "write");
//! assert!(res.is_untouched());
//! ```

mod construct;
mod domain;
mod error;
mod id;
mod rpc;

pub use construct::TryNew;
pub use domain::{DomainId, InvalidDomain, USER_GRANTER};
pub use error::{assert_error_code, ErrorCode};
pub use id::{PermissionId, RequestId};
pub use rpc::{
    CallMetadata, Disposition, RpcError, RpcRequest, RpcResponse, INVALID_PARAMS_CODE,
    METHOD_NOT_FOUND_CODE, UNAUTHORIZED_CODE, USER_REJECTED_CODE,
};
