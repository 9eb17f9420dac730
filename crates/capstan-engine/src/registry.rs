//! Restricted-method registry.
//!
//! The registry is the authoritative set of methods this engine governs.
//! It is built once from configuration and frozen: the governed surface
//! of a running engine never changes. A snapshot restored against a
//! different registry may reference methods that no longer exist — the
//! executor answers those with `-32601` at call time.

use async_trait::async_trait;
use capstan_auth::MethodDescription;
use capstan_types::{DomainId, Disposition, RpcRequest, RpcResponse};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler for one restricted method.
///
/// Handlers receive the already-authorized request — by the time a
/// handler runs, the router has resolved a permission for the calling
/// domain. A handler sets `res.result` (or `res.error`) and returns
/// [`Disposition::End`], or returns [`Disposition::Next`] to pass the
/// request further down the host's chain untouched.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Executes the method for an authorized caller.
    async fn handle(
        &self,
        domain: &DomainId,
        req: &RpcRequest,
        res: &mut RpcResponse,
    ) -> Disposition;
}

/// Adapter turning a plain closure into a [`MethodHandler`].
struct FnHandler<F>(F);

#[async_trait]
impl<F> MethodHandler for FnHandler<F>
where
    F: Fn(&RpcRequest, &mut RpcResponse) -> Disposition + Send + Sync,
{
    async fn handle(
        &self,
        _domain: &DomainId,
        req: &RpcRequest,
        res: &mut RpcResponse,
    ) -> Disposition {
        (self.0)(req, res)
    }
}

/// Wraps a synchronous closure as a [`MethodHandler`].
///
/// # Example
///
/// ```
/// use capstan_engine::handler_fn;
/// use capstan_types::Disposition;
/// use serde_json::json;
///
/// let handler = handler_fn(|_req, res| {
///     res.set_result(json!("ok"));
///     Disposition::End
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn MethodHandler>
where
    F: Fn(&RpcRequest, &mut RpcResponse) -> Disposition + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// A governed method: what it does, and the code that does it.
#[derive(Clone)]
pub struct RestrictedMethod {
    /// Human-readable description, surfaced to approval UIs through the
    /// engine state's description list.
    pub description: String,
    /// The method implementation.
    pub handler: Arc<dyn MethodHandler>,
}

impl RestrictedMethod {
    /// Creates a restricted method entry.
    #[must_use]
    pub fn new(description: impl Into<String>, handler: Arc<dyn MethodHandler>) -> Self {
        Self {
            description: description.into(),
            handler,
        }
    }
}

impl fmt::Debug for RestrictedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestrictedMethod")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Immutable method-name → [`RestrictedMethod`] map.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    methods: HashMap<String, RestrictedMethod>,
}

impl MethodRegistry {
    /// Freezes the given method map into a registry.
    #[must_use]
    pub fn new(methods: HashMap<String, RestrictedMethod>) -> Self {
        Self { methods }
    }

    /// Looks up a method by exact name.
    #[must_use]
    pub fn get(&self, method: &str) -> Option<&RestrictedMethod> {
        self.methods.get(method)
    }

    /// Returns `true` if the registry governs `method`.
    #[must_use]
    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Number of governed methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if nothing is governed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Derives the description list for the engine state, sorted by
    /// method name for a deterministic snapshot.
    #[must_use]
    pub fn descriptions(&self) -> Vec<MethodDescription> {
        let mut descriptions: Vec<MethodDescription> = self
            .methods
            .iter()
            .map(|(method, entry)| MethodDescription {
                method: method.clone(),
                description: entry.description.clone(),
            })
            .collect();
        descriptions.sort_by(|a, b| a.method.cmp(&b.method));
        descriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capstan_types::TryNew;
    use serde_json::json;

    fn noop() -> Arc<dyn MethodHandler> {
        handler_fn(|_req, res| {
            res.set_result(json!(null));
            Disposition::End
        })
    }

    fn registry_of(names: &[&str]) -> MethodRegistry {
        let methods = names
            .iter()
            .map(|name| {
                (
                    (*name).to_string(),
                    RestrictedMethod::new(format!("does {name}"), noop()),
                )
            })
            .collect();
        MethodRegistry::new(methods)
    }

    #[test]
    fn lookup_is_exact() {
        let registry = registry_of(&["write"]);
        assert!(registry.contains("write"));
        assert!(!registry.contains("Write"));
        assert!(!registry.contains("write2"));
    }

    #[test]
    fn descriptions_are_sorted() {
        let registry = registry_of(&["write", "read", "sign"]);
        let descriptions = registry.descriptions();
        let names: Vec<&str> = descriptions.iter().map(|d| d.method.as_str()).collect();
        assert_eq!(names, ["read", "sign", "write"]);
        assert_eq!(descriptions[0].description, "does read");
    }

    #[test]
    fn empty_registry() {
        let registry = MethodRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.descriptions().is_empty());
    }

    #[tokio::test]
    async fn handler_fn_adapts_closures() {
        let handler = handler_fn(|req, res| {
            res.set_result(req.params.clone());
            Disposition::End
        });

        let domain = DomainId::try_new("siteA".to_string()).expect("valid domain");
        let req = RpcRequest::new("echo", json!([1, 2, 3]));
        let mut res = RpcResponse::new();

        let disposition = handler.handle(&domain, &req, &mut res).await;
        assert!(disposition.is_end());
        assert_eq!(res.result, Some(json!([1, 2, 3])));
    }
}
