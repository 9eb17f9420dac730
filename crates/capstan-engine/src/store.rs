//! Observable in-memory permission store.
//!
//! [`PermissionStore`] owns the engine's [`EngineState`] behind a single
//! `RwLock` and funnels every mutation through one commit path, which
//! broadcasts a full-state snapshot on a `tokio::sync::watch` channel.
//! Hosts subscribe for persistence:
//!
//! ```text
//! mutation ──► commit ──► RwLock write ──► watch::send(snapshot)
//!                                               │
//!                               host persistence task (subscriber)
//! ```
//!
//! The watch channel keeps only the latest snapshot; a slow persister
//! skips intermediate states rather than queueing them, which is the
//! right behavior for whole-state snapshots.
//!
//! Reads clone out of the lock. The state is small (permission lists per
//! domain) and cloning keeps lock hold times trivial, so no read ever
//! blocks on a handler or an approval flow.

use capstan_auth::{DomainEntry, EngineState, MethodDescription, Permission, PermissionsRequest};
use capstan_types::{DomainId, RequestId};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::watch;

/// Thread-safe, observable map from domain to permission records, plus
/// the pending-ticket list.
#[derive(Debug)]
pub struct PermissionStore {
    state: RwLock<EngineState>,
    snapshot_tx: watch::Sender<EngineState>,
}

impl PermissionStore {
    /// Creates a store seeded with `initial`.
    #[must_use]
    pub fn new(initial: EngineState) -> Self {
        let (snapshot_tx, _) = watch::channel(initial.clone());
        Self {
            state: RwLock::new(initial),
            snapshot_tx,
        }
    }

    /// Clones the current full state.
    #[must_use]
    pub fn snapshot(&self) -> EngineState {
        self.state.read().clone()
    }

    /// Subscribes to post-mutation snapshots.
    ///
    /// The receiver observes the latest committed state; intermediate
    /// states may be skipped under write bursts.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.snapshot_tx.subscribe()
    }

    /// The full domain map.
    #[must_use]
    pub fn domains(&self) -> HashMap<DomainId, DomainEntry> {
        self.state.read().domains.clone()
    }

    /// Replaces the full domain map.
    pub fn set_domains(&self, domains: HashMap<DomainId, DomainEntry>) {
        tracing::debug!(domain_count = domains.len(), "replacing domain map");
        self.commit(|state| state.domains = domains);
    }

    /// The entry for `domain`, or an empty one if the domain is unknown.
    ///
    /// Pure read: the empty entry is not committed until a subsequent
    /// [`set_domain`](Self::set_domain).
    #[must_use]
    pub fn domain_settings(&self, domain: &DomainId) -> DomainEntry {
        self.state
            .read()
            .domains
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    /// Commits `entry` for `domain`.
    pub fn set_domain(&self, domain: &DomainId, entry: DomainEntry) {
        tracing::debug!(
            domain = %domain,
            permission_count = entry.permissions.len(),
            "committing domain entry"
        );
        self.commit(|state| {
            state.domains.insert(domain.clone(), entry);
        });
    }

    /// The permissions of `domain`, empty when unknown.
    #[must_use]
    pub fn permissions(&self, domain: &DomainId) -> Vec<Permission> {
        self.state.read().permissions_of(domain).to_vec()
    }

    /// The registry-derived method descriptions.
    #[must_use]
    pub fn descriptions(&self) -> Vec<MethodDescription> {
        self.state.read().permissions_descriptions.clone()
    }

    /// The pending approval tickets, in arrival order.
    #[must_use]
    pub fn pending_requests(&self) -> Vec<PermissionsRequest> {
        self.state.read().permissions_requests.clone()
    }

    /// Appends a pending ticket.
    pub fn push_request(&self, request: PermissionsRequest) {
        tracing::debug!(ticket = %request.id(), origin = %request.origin, "ticket opened");
        self.commit(|state| state.permissions_requests.push(request));
    }

    /// Removes a pending ticket by id. Returns whether it existed.
    pub fn remove_request(&self, id: RequestId) -> bool {
        self.commit(|state| match state.request_position(id) {
            Some(position) => {
                state.permissions_requests.remove(position);
                tracing::debug!(ticket = %id, "ticket closed");
                true
            }
            None => false,
        })
    }

    /// Runs a mutation under the write lock and broadcasts the resulting
    /// snapshot. The single funnel keeps mutation and notification
    /// atomic with respect to each other.
    fn commit<R>(&self, mutate: impl FnOnce(&mut EngineState) -> R) -> R {
        let mut state = self.state.write();
        let out = mutate(&mut state);
        self.snapshot_tx.send_replace(state.clone());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capstan_auth::{RequestMetadata, RequestedPermissions};

    fn domain(s: &str) -> DomainId {
        DomainId::try_from(s).expect("valid test domain")
    }

    fn ticket_for(d: &DomainId) -> PermissionsRequest {
        PermissionsRequest {
            origin: d.clone(),
            metadata: RequestMetadata::resolve(d, None),
            options: RequestedPermissions::new(),
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = PermissionStore::new(EngineState::default());
        assert!(store.domains().is_empty());
        assert!(store.pending_requests().is_empty());
        assert!(store.permissions(&domain("siteA")).is_empty());
    }

    #[test]
    fn domain_settings_does_not_commit() {
        let store = PermissionStore::new(EngineState::default());
        let entry = store.domain_settings(&domain("siteA"));
        assert!(entry.permissions.is_empty());
        // The lazy entry was a read-side default, not a write.
        assert!(store.domains().is_empty());
    }

    #[test]
    fn set_domain_then_read_back() {
        let store = PermissionStore::new(EngineState::default());
        let d = domain("siteA");

        let mut entry = store.domain_settings(&d);
        entry.permissions.push(Permission::root("write"));
        store.set_domain(&d, entry);

        let perms = store.permissions(&d);
        assert_eq!(perms.len(), 1);
        assert_eq!(perms[0].method, "write");
    }

    #[test]
    fn mutation_broadcasts_snapshot() {
        let store = PermissionStore::new(EngineState::default());
        let mut rx = store.subscribe();
        let d = domain("siteA");

        let mut entry = store.domain_settings(&d);
        entry.permissions.push(Permission::root("write"));
        store.set_domain(&d, entry);

        assert!(rx.has_changed().expect("sender alive"));
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.permissions_of(&d).len(), 1);
    }

    #[test]
    fn watch_keeps_latest_snapshot_only() {
        let store = PermissionStore::new(EngineState::default());
        let mut rx = store.subscribe();
        let d = domain("siteA");

        for method in ["a", "b", "c"] {
            let mut entry = store.domain_settings(&d);
            entry.permissions.push(Permission::root(method));
            store.set_domain(&d, entry);
        }

        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.permissions_of(&d).len(), 3);
    }

    #[test]
    fn push_and_remove_request() {
        let store = PermissionStore::new(EngineState::default());
        let d = domain("siteA");
        let ticket = ticket_for(&d);
        let id = ticket.id();

        store.push_request(ticket);
        assert_eq!(store.pending_requests().len(), 1);

        assert!(store.remove_request(id));
        assert!(store.pending_requests().is_empty());

        // Second removal is a no-op.
        assert!(!store.remove_request(id));
    }

    #[test]
    fn remove_request_targets_by_id() {
        let store = PermissionStore::new(EngineState::default());
        let first = ticket_for(&domain("siteA"));
        let second = ticket_for(&domain("siteB"));
        let second_id = second.id();

        store.push_request(first);
        store.push_request(second);

        assert!(store.remove_request(second_id));
        let remaining = store.pending_requests();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].origin, domain("siteA"));
    }

    #[test]
    fn set_domains_replaces_map() {
        let store = PermissionStore::new(EngineState::default());
        store.set_domain(&domain("old"), DomainEntry::default());

        let mut fresh = HashMap::new();
        fresh.insert(
            domain("new"),
            DomainEntry {
                permissions: vec![Permission::root("read")],
            },
        );
        store.set_domains(fresh);

        assert!(store.permissions(&domain("old")).is_empty());
        assert_eq!(store.permissions(&domain("new")).len(), 1);
    }

    #[test]
    fn seeded_store_serves_initial_state() {
        let d = domain("siteA");
        let mut initial = EngineState::default();
        initial.domains.insert(
            d.clone(),
            DomainEntry {
                permissions: vec![Permission::root("write")],
            },
        );

        let store = PermissionStore::new(initial);
        assert_eq!(store.permissions(&d).len(), 1);

        // Subscribers start from the seed snapshot.
        let rx = store.subscribe();
        assert_eq!(rx.borrow().permissions_of(&d).len(), 1);
    }
}
