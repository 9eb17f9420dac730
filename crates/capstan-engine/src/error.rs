//! Engine-layer errors.
//!
//! Two error kinds live here, with very different audiences:
//!
//! - [`ConfigError`] is fatal and surfaces at construction time, to the
//!   embedding host.
//! - [`ResolverError`] is a per-request failure of the delegation walk;
//!   the router converts it to a wire error (code `1`, original message)
//!   and it never escapes the middleware as a Rust error.

use capstan_types::ErrorCode;
use thiserror::Error;

/// Fatal configuration problem detected at engine construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No [`UserApprover`](capstan_auth::UserApprover) was supplied. The
    /// engine cannot mediate `requestPermissions` without one, so this is
    /// a construction error rather than a deferred runtime failure.
    #[error("engine configuration requires a user-approval handler")]
    MissingApprover,
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingApprover => "CONFIG_MISSING_APPROVER",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Requires a code change in the host, not a retry.
        false
    }
}

/// Failure while walking a delegation chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// The granter chain did not reach a root within the configured
    /// bound. Well-formed states terminate quickly; this guards against
    /// pathological or corrupted snapshots.
    #[error("delegation chain for method '{method}' exceeded {max_depth} hops")]
    DepthExceeded {
        /// The method whose chain was being walked.
        method: String,
        /// The configured hop bound.
        max_depth: usize,
    },
}

impl ErrorCode for ResolverError {
    fn code(&self) -> &'static str {
        match self {
            Self::DepthExceeded { .. } => "RESOLVER_DEPTH_EXCEEDED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // The chain will not shorten on retry.
        false
    }
}
