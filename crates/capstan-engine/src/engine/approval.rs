//! The approval coordinator and the read-only meta method.
//!
//! `requestPermissions` is the one place where the synchronous middleware
//! contract meets an asynchronous human: the ticket is parked in the
//! store, the approver's future is awaited, and only then does the
//! request terminate. Interleaved flows are independent — each holds its
//! own ticket and resolves on its own schedule.
//!
//! Ticket lifecycle:
//!
//! ```text
//! open ──► approver decides ──┬─ approved map  → ticket removed, grants issued
//!                             ├─ empty map     → user-rejected (ticket per policy)
//!                             └─ rejection     → reason forwarded (ticket per policy)
//! ```

use super::{params, CapstanEngine};
use crate::RejectedRequestPolicy;
use capstan_auth::{PermissionsRequest, RequestMetadata, RequestedPermissions};
use capstan_types::{Disposition, DomainId, RequestId, RpcError, RpcRequest, RpcResponse};
use serde_json::json;

impl CapstanEngine {
    /// `getPermissions`: the caller's own permission list. Always
    /// succeeds; an unknown domain gets an empty list.
    pub(crate) fn get_permissions_meta(
        &self,
        domain: &DomainId,
        res: &mut RpcResponse,
    ) -> Disposition {
        res.set_result(json!(self.permissions_for(domain)));
        Disposition::End
    }

    /// `requestPermissions`: park a ticket, await the user, materialize
    /// the outcome.
    pub(crate) async fn request_permissions_meta(
        &self,
        domain: &DomainId,
        req: &RpcRequest,
        res: &mut RpcResponse,
    ) -> Disposition {
        let options: RequestedPermissions =
            match params::one(&req.params, "requested permissions") {
                Ok(options) => options,
                Err(err) => {
                    res.set_error(err);
                    return Disposition::End;
                }
            };

        let metadata = RequestMetadata::resolve(domain, req.metadata.as_ref());
        let ticket = PermissionsRequest {
            origin: domain.clone(),
            metadata,
            options,
        };
        let ticket_id = ticket.id();

        self.store().push_request(ticket.clone());
        tracing::info!(
            domain = %domain,
            ticket = %ticket_id,
            methods = ?ticket.options.keys().collect::<Vec<_>>(),
            "permissions requested, awaiting approval"
        );

        match self.approver().request_user_approval(&ticket).await {
            Ok(approved) if approved.is_empty() => {
                tracing::warn!(domain = %domain, ticket = %ticket_id, "user rejected the request");
                self.settle_rejected_ticket(ticket_id);
                res.set_error(RpcError::user_rejected());
                Disposition::End
            }
            Ok(approved) => {
                self.store().remove_request(ticket_id);
                let granted = self.grant_root_permissions(domain, approved);
                tracing::info!(
                    domain = %domain,
                    ticket = %ticket_id,
                    granted = granted.len(),
                    "approval materialized into grants"
                );
                res.set_result(json!(self.permissions_for(domain)));
                Disposition::End
            }
            Err(err) => {
                tracing::warn!(
                    domain = %domain,
                    ticket = %ticket_id,
                    reason = %err,
                    "approval flow failed"
                );
                self.settle_rejected_ticket(ticket_id);
                res.set_error(RpcError::user_rejected_with_reason(err.to_string()));
                Disposition::End
            }
        }
    }

    /// Applies the configured rejected-ticket policy.
    fn settle_rejected_ticket(&self, id: RequestId) {
        if self.rejected_request_policy() == RejectedRequestPolicy::Discard {
            self.store().remove_request(id);
        }
    }
}
