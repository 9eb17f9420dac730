//! Grant and revocation mechanics.
//!
//! Three layers, innermost first:
//!
//! - The store-level primitives [`add_permissions_for`] and
//!   [`remove_permissions_for`]: natural-key upsert and filter-out on one
//!   domain's entry.
//! - [`grant_root_permissions`]: turns an approved method → caveat map
//!   into user-rooted records (the approval coordinator's materializer,
//!   also usable by hosts driving grants from their own UI).
//! - The `grantPermissions` / `revokePermissions` meta methods:
//!   peer-to-peer delegation and granter-scoped revocation, both
//!   all-or-nothing — the first authorization failure aborts the batch
//!   before any mutation.
//!
//! Revoking a delegated permission does not cascade: records delegated
//! onward survive, and die lazily when the resolver fails to reach a
//! root through the gap.
//!
//! [`add_permissions_for`]: CapstanEngine::add_permissions_for
//! [`remove_permissions_for`]: CapstanEngine::remove_permissions_for
//! [`grant_root_permissions`]: CapstanEngine::grant_root_permissions

use super::{params, CapstanEngine};
use crate::resolver::{resolve_permission, resolve_untraversed};
use crate::CaveatPolicy;
use capstan_auth::{Granter, Permission, RequestedPermissions};
use capstan_types::{Disposition, DomainId, RpcError, RpcRequest, RpcResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;

/// A permission-shaped grant request: only the method matters, the rest
/// of the object is tolerated and ignored.
#[derive(Debug, Clone, Deserialize)]
struct GrantTarget {
    method: String,
}

/// `revokePermissions` accepts bare method names or permission-shaped
/// objects; normalize to the method name at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RevokeTarget {
    Method(String),
    Record(GrantTarget),
}

impl RevokeTarget {
    fn method_name(&self) -> &str {
        match self {
            Self::Method(method) => method,
            Self::Record(record) => &record.method,
        }
    }
}

impl CapstanEngine {
    /// Upserts `permissions` into `domain`'s entry by natural key:
    /// existing records matching an incoming `(method, granter)` pair are
    /// dropped, then all incoming records are appended.
    pub fn add_permissions_for(&self, domain: &DomainId, permissions: Vec<Permission>) {
        if permissions.is_empty() {
            return;
        }
        tracing::info!(
            domain = %domain,
            methods = ?permissions.iter().map(|p| p.method.as_str()).collect::<Vec<_>>(),
            "adding permissions"
        );
        let mut entry = self.store().domain_settings(domain);
        entry.upsert(permissions);
        self.store().set_domain(domain, entry);
    }

    /// Removes every record of `domain` sharing a natural key with one
    /// of `permissions`.
    pub fn remove_permissions_for(&self, domain: &DomainId, permissions: &[Permission]) {
        if permissions.is_empty() {
            return;
        }
        tracing::info!(
            domain = %domain,
            methods = ?permissions.iter().map(|p| p.method.as_str()).collect::<Vec<_>>(),
            "removing permissions"
        );
        let mut entry = self.store().domain_settings(domain);
        entry.remove(permissions);
        self.store().set_domain(domain, entry);
    }

    /// Issues user-rooted permissions to `domain` from an approved
    /// method → caveat map. Returns the records as issued.
    pub fn grant_root_permissions(
        &self,
        domain: &DomainId,
        approved: RequestedPermissions,
    ) -> Vec<Permission> {
        let granted: Vec<Permission> = approved
            .into_iter()
            .map(|(method, requested)| {
                let permission = Permission::root(method);
                match requested.caveats {
                    Some(caveats) => permission.with_caveats(caveats),
                    None => permission,
                }
            })
            .collect();
        self.add_permissions_for(domain, granted.clone());
        granted
    }

    /// `grantPermissions`: peer delegation. The caller may only delegate
    /// capabilities it can itself resolve to a root.
    pub(crate) fn grant_permissions_meta(
        &self,
        domain: &DomainId,
        req: &RpcRequest,
        res: &mut RpcResponse,
    ) -> Disposition {
        let (grantee, requested): (DomainId, Vec<GrantTarget>) =
            match params::two(&req.params, "grantee domain, requested permissions") {
                Ok(parsed) => parsed,
                Err(err) => {
                    res.set_error(err);
                    return Disposition::End;
                }
            };

        // Dedup by method, keeping the first occurrence.
        let mut seen = HashSet::new();
        let requested: Vec<GrantTarget> = requested
            .into_iter()
            .filter(|target| seen.insert(target.method.clone()))
            .collect();

        let state = self.store().snapshot();
        let mut staged = Vec::with_capacity(requested.len());
        for target in &requested {
            match resolve_permission(&state, domain, &target.method, self.max_delegation_depth()) {
                Ok(Some(own)) => {
                    let mut permission =
                        Permission::delegated(target.method.clone(), domain.clone());
                    if self.caveat_policy() == CaveatPolicy::InheritFromGranter {
                        if let Some(caveats) = own.caveats {
                            permission = permission.with_caveats(caveats);
                        }
                    }
                    staged.push(permission);
                }
                Ok(None) => {
                    tracing::warn!(
                        granter = %domain,
                        grantee = %grantee,
                        method = %target.method,
                        "delegation denied, granter holds no such capability"
                    );
                    res.set_error(RpcError::unauthorized(Some(json!(req))));
                    return Disposition::End;
                }
                Err(err) => {
                    res.set_error(RpcError::internal(err.to_string()));
                    return Disposition::End;
                }
            }
        }

        tracing::info!(
            granter = %domain,
            grantee = %grantee,
            methods = ?staged.iter().map(|p| p.method.as_str()).collect::<Vec<_>>(),
            "delegating permissions"
        );
        self.add_permissions_for(&grantee, staged.clone());
        res.set_result(json!(staged));
        Disposition::End
    }

    /// `revokePermissions`: granter-scoped revocation. A permission may
    /// be revoked by whoever delegated it, or by its holder.
    pub(crate) fn revoke_permissions_meta(
        &self,
        domain: &DomainId,
        req: &RpcRequest,
        res: &mut RpcResponse,
    ) -> Disposition {
        let (assigned, targets): (DomainId, Vec<RevokeTarget>) =
            match params::two(&req.params, "assigned domain, permissions to revoke") {
                Ok(parsed) => parsed,
                Err(err) => {
                    res.set_error(err);
                    return Disposition::End;
                }
            };

        let state = self.store().snapshot();
        let mut staged = Vec::with_capacity(targets.len());
        for target in &targets {
            let method = target.method_name();
            let found = resolve_untraversed(&state, &assigned, method, domain);
            let authorized = found.as_ref().is_some_and(|permission| {
                permission.granter == Granter::Domain(domain.clone()) || assigned == *domain
            });

            match found {
                Some(permission) if authorized => staged.push(permission),
                _ => {
                    tracing::warn!(
                        revoker = %domain,
                        assigned = %assigned,
                        method,
                        "revocation denied"
                    );
                    res.set_error(RpcError::unauthorized(Some(json!(req))));
                    return Disposition::End;
                }
            }
        }

        tracing::info!(
            revoker = %domain,
            assigned = %assigned,
            methods = ?staged.iter().map(|p| p.method.as_str()).collect::<Vec<_>>(),
            "revoking permissions"
        );
        self.remove_permissions_for(&assigned, &staged);
        res.set_result(json!(staged));
        Disposition::End
    }
}
