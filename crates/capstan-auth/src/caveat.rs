//! Caveats: typed restrictions attached to a permission.
//!
//! A caveat is `{ type, value }`. The engine gives built-in semantics to a
//! single type, [`STATIC_CAVEAT`]: when a resolved permission carries one,
//! execution short-circuits and the caveat's value IS the RPC result —
//! the method handler never runs. Every other type is preserved verbatim
//! for host-defined interpretation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caveat type whose value short-circuits execution as the RPC result.
pub const STATIC_CAVEAT: &str = "static";

/// A typed restriction attached to a permission record.
///
/// # Example
///
/// ```
/// use capstan_auth::{Caveat, STATIC_CAVEAT};
/// use serde_json::json;
///
/// let pinned = Caveat::static_value(json!(42));
/// assert!(pinned.is_static());
/// assert_eq!(pinned.caveat_type, STATIC_CAVEAT);
///
/// // Unknown types are carried, not interpreted.
/// let custom = Caveat::new("filterParams", json!(["eth_accounts"]));
/// assert!(!custom.is_static());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caveat {
    /// Caveat discriminator; only [`STATIC_CAVEAT`] is interpreted here.
    #[serde(rename = "type")]
    pub caveat_type: String,
    /// Payload, meaning defined by the type.
    pub value: Value,
}

impl Caveat {
    /// Creates a caveat of an arbitrary type.
    #[must_use]
    pub fn new(caveat_type: impl Into<String>, value: Value) -> Self {
        Self {
            caveat_type: caveat_type.into(),
            value,
        }
    }

    /// Creates a `static` caveat pinning the RPC result to `value`.
    #[must_use]
    pub fn static_value(value: Value) -> Self {
        Self::new(STATIC_CAVEAT, value)
    }

    /// Returns `true` if this caveat short-circuits execution.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.caveat_type == STATIC_CAVEAT
    }
}
