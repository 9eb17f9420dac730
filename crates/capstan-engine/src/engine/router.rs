//! Request classification and dispatch.
//!
//! Classification precedence, deterministic for a given state:
//!
//! 1. Safe method → [`Disposition::Next`], response untouched.
//! 2. Meta method (prefix + `getPermissions` / `requestPermissions` /
//!    `grantPermissions` / `revokePermissions`) → dispatched internally.
//! 3. Anything else is restricted: resolve a permission for the caller
//!    and execute, or answer unauthorized.
//!
//! All authorization decisions are audit-logged: passes at `debug`,
//! denials at `warn`.

use super::CapstanEngine;
use crate::resolver::resolve_permission;
use capstan_types::{Disposition, DomainId, RpcError, RpcRequest, RpcResponse};
use serde_json::json;

impl CapstanEngine {
    /// Handles one RPC invocation on behalf of `domain`.
    ///
    /// Exactly one of the source contract's `next`/`end` continuations is
    /// expressed by the returned [`Disposition`]; the response carries a
    /// result or error if and only if the disposition is `End`.
    pub async fn handle_request(
        &self,
        domain: &DomainId,
        req: &RpcRequest,
        res: &mut RpcResponse,
    ) -> Disposition {
        if self.safe_methods.contains(&req.method) {
            tracing::debug!(domain = %domain, method = %req.method, "safe method, passing through");
            return Disposition::Next;
        }

        if let Some(meta) = req.method.strip_prefix(&self.method_prefix) {
            match meta {
                "getPermissions" => return self.get_permissions_meta(domain, res),
                "requestPermissions" => {
                    return self.request_permissions_meta(domain, req, res).await
                }
                "grantPermissions" => return self.grant_permissions_meta(domain, req, res),
                "revokePermissions" => return self.revoke_permissions_meta(domain, req, res),
                _ => {}
            }
        }

        let state = self.store().snapshot();
        match resolve_permission(&state, domain, &req.method, self.max_delegation_depth()) {
            Ok(Some(permission)) => self.execute_restricted(domain, &permission, req, res).await,
            Ok(None) => {
                tracing::warn!(domain = %domain, method = %req.method, "unauthorized invocation");
                res.set_error(RpcError::unauthorized(Some(json!(req))));
                Disposition::End
            }
            Err(err) => {
                tracing::warn!(
                    domain = %domain,
                    method = %req.method,
                    error = %err,
                    "delegation resolution failed"
                );
                res.set_error(RpcError::internal(err.to_string()));
                Disposition::End
            }
        }
    }
}
