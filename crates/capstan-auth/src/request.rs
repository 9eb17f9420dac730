//! Pending permission-request tickets.
//!
//! When a domain asks for permissions it does not hold, the engine parks a
//! [`PermissionsRequest`] ticket and hands it to the external approver.
//! The ticket carries everything an approval surface needs to render a
//! prompt: who is asking, a display title, and the requested method →
//! caveat map. Tickets are keyed by `metadata.id`.

use crate::Caveat;
use capstan_types::{CallMetadata, DomainId, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a domain asked for (or was granted) for a single method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedPermission {
    /// Caveats the requester proposes for the grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caveats: Option<Vec<Caveat>>,
}

/// Method-name → requested-permission map.
///
/// Ordered map so iteration (and therefore the order of issued grants) is
/// deterministic for a given request.
pub type RequestedPermissions = BTreeMap<String, RequestedPermission>;

/// Fully-populated metadata of a pending ticket.
///
/// Unlike the optional [`CallMetadata`] a host may stamp on a request,
/// every field here is resolved: absent values were defaulted from the
/// authenticated domain when the ticket was opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    /// Ticket id; unique across pending requests.
    pub id: RequestId,
    /// The requesting origin.
    pub origin: DomainId,
    /// Display title for the approval surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
}

impl RequestMetadata {
    /// Resolves ticket metadata from an authenticated domain and whatever
    /// the host attached to the call. Missing id is minted; missing origin
    /// and title default to the domain.
    #[must_use]
    pub fn resolve(domain: &DomainId, call: Option<&CallMetadata>) -> Self {
        Self {
            id: call.and_then(|m| m.id).unwrap_or_else(RequestId::new),
            origin: call
                .and_then(|m| m.origin.clone())
                .unwrap_or_else(|| domain.clone()),
            site_title: call
                .and_then(|m| m.site_title.clone())
                .or_else(|| Some(domain.to_string())),
        }
    }
}

/// A pending user-approval ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsRequest {
    /// The authenticated domain the grants would be issued to.
    pub origin: DomainId,
    /// Resolved display metadata; `metadata.id` keys the ticket.
    pub metadata: RequestMetadata,
    /// The requested method → caveat map.
    pub options: RequestedPermissions,
}

impl PermissionsRequest {
    /// The ticket id.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.metadata.id
    }
}
