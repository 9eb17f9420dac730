//! Execution of an authorized restricted call.
//!
//! Runs only after the router resolved a permission for the caller. The
//! order matters: the registry check precedes the caveat check, so a
//! stale snapshot referencing an unregistered method answers `-32601`
//! even if its record carries a `static` caveat.

use super::CapstanEngine;
use capstan_auth::Permission;
use capstan_types::{Disposition, DomainId, RpcError, RpcRequest, RpcResponse};

impl CapstanEngine {
    /// Executes `req` under a resolver-verified `permission`.
    pub(crate) async fn execute_restricted(
        &self,
        domain: &DomainId,
        permission: &Permission,
        req: &RpcRequest,
        res: &mut RpcResponse,
    ) -> Disposition {
        let Some(restricted) = self.registry().get(&req.method) else {
            // Only reachable when state was rehydrated from a snapshot
            // referencing a method the live registry no longer has.
            tracing::error!(
                domain = %domain,
                method = %req.method,
                "permission held for a method missing from the registry"
            );
            res.set_error(RpcError::method_not_found());
            return Disposition::End;
        };

        if let Some(caveat) = permission.last_static_caveat() {
            tracing::debug!(
                domain = %domain,
                method = %req.method,
                permission = %permission.id,
                "static caveat short-circuits execution"
            );
            res.set_result(caveat.value.clone());
            return Disposition::End;
        }

        tracing::debug!(
            domain = %domain,
            method = %req.method,
            permission = %permission.id,
            "invoking restricted method handler"
        );
        restricted.handler.handle(domain, req, res).await
    }
}
