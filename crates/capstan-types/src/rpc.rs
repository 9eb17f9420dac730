//! RPC middleware wire surface.
//!
//! The engine sits in a host's middleware chain. Per request the host hands
//! it the caller's [`DomainId`](crate::DomainId), the [`RpcRequest`], and a
//! mutable [`RpcResponse`]; the engine answers with a [`Disposition`]:
//!
//! ```text
//! host ── (domain, req, &mut res) ──► engine
//!                                        │
//!                  Disposition::Next ◄───┤  safe method, res untouched
//!                  Disposition::End  ◄───┘  res.result or res.error set
//! ```
//!
//! `Disposition` replaces a callback-style `(next, end)` continuation pair:
//! returning it makes "exactly one of next/end, exactly once" a property of
//! the type system instead of a convention.
//!
//! Errors cross the wire as JSON-RPC 2.0 error objects with the engine's
//! fixed code set (see [`RpcError`]).

use crate::{DomainId, RequestId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a middleware invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the host must forward or terminate based on the disposition"]
pub enum Disposition {
    /// The request is not this engine's business; forward it unchanged.
    Next,
    /// The request was terminated; the response carries a result or error.
    End,
}

impl Disposition {
    /// Returns `true` for [`Disposition::Next`].
    #[must_use]
    pub fn is_next(&self) -> bool {
        matches!(self, Self::Next)
    }

    /// Returns `true` for [`Disposition::End`].
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

/// Caller-attached request metadata.
///
/// Hosts may stamp requests with an id, an origin override, or a display
/// title before they reach the engine. Anything absent is defaulted by the
/// approval coordinator from the authenticated domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMetadata {
    /// Pre-assigned ticket id; minted fresh when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Origin override; defaults to the authenticated domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<DomainId>,
    /// Human-readable title of the requesting site or agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
}

/// A single RPC method invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRequest {
    /// Method name; non-empty by host contract.
    pub method: String,
    /// Positional params, `Value::Null` when absent.
    #[serde(default)]
    pub params: Value,
    /// Optional host-stamped metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CallMetadata>,
}

impl RpcRequest {
    /// Creates a request with the given method and params.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
            metadata: None,
        }
    }

    /// Attaches caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: CallMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// The response being assembled for one request.
///
/// Within a request lifetime at most one of `result`/`error` is set, and
/// only by the party that answers [`Disposition::End`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcResponse {
    /// Successful result, if the request terminated successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure, if the request terminated with an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if neither result nor error has been set.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.result.is_none() && self.error.is_none()
    }

    /// Sets the successful result.
    pub fn set_result(&mut self, result: Value) {
        self.result = Some(result);
    }

    /// Sets the failure.
    pub fn set_error(&mut self, error: RpcError) {
        self.error = Some(error);
    }
}

/// Code for authorization failures (no permission resolves, or a
/// granter/revoker lacks the required authority). Also used for internal
/// resolver failures, which carry their own message.
pub const UNAUTHORIZED_CODE: i64 = 1;
/// Code for an approval flow the user declined.
pub const USER_REJECTED_CODE: i64 = 5;
/// JSON-RPC 2.0 "method not found".
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;
/// JSON-RPC 2.0 "invalid params".
pub const INVALID_PARAMS_CODE: i64 = -32602;

/// JSON-RPC 2.0 error object with the engine's fixed code set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcError {
    /// Numeric error code; see the `*_CODE` constants.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional payload, typically the offending request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Authorization failure. `data` carries the offending request so the
    /// caller can see exactly what was denied.
    #[must_use]
    pub fn unauthorized(data: Option<Value>) -> Self {
        Self {
            code: UNAUTHORIZED_CODE,
            message: "Unauthorized to perform action. Try requesting permission first \
                      using the `requestPermissions` method."
                .to_string(),
            data,
        }
    }

    /// The user declined the approval request.
    #[must_use]
    pub fn user_rejected() -> Self {
        Self {
            code: USER_REJECTED_CODE,
            message: "User rejected the request.".to_string(),
            data: None,
        }
    }

    /// The approver failed or refused, with its own reason.
    #[must_use]
    pub fn user_rejected_with_reason(reason: impl Into<String>) -> Self {
        Self {
            code: USER_REJECTED_CODE,
            message: reason.into(),
            data: None,
        }
    }

    /// A restricted method exists in state but not in the live registry.
    #[must_use]
    pub fn method_not_found() -> Self {
        Self {
            code: METHOD_NOT_FOUND_CODE,
            message: "Method not found".to_string(),
            data: None,
        }
    }

    /// Meta-method params did not have the documented shape.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_PARAMS_CODE,
            message: message.into(),
            data: None,
        }
    }

    /// Unexpected internal failure (e.g. the delegation resolver), with
    /// the original message propagated.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: UNAUTHORIZED_CODE,
            message: message.into(),
            data: None,
        }
    }
}
