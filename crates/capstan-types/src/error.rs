//! Unified error interface.
//!
//! Every error enum in the Capstan crates implements [`ErrorCode`] so that
//! hosts can branch on a stable machine-readable code instead of matching
//! display strings, and so retry logic can ask whether an error is worth
//! retrying at all.
//!
//! Codes are UPPER_SNAKE_CASE, prefixed by concern (`DOMAIN_`, `CONFIG_`,
//! `RESOLVER_`, ...), and stable once published.

/// Machine-readable error classification.
///
/// # Example
///
/// ```
/// use capstan_types::ErrorCode;
///
/// #[derive(Debug)]
/// enum StoreError {
///     Busy,
///     Corrupt,
/// }
///
/// impl ErrorCode for StoreError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::Busy => "STORE_BUSY",
///             Self::Corrupt => "STORE_CORRUPT",
///         }
///     }
///
///     fn is_recoverable(&self) -> bool {
///         matches!(self, Self::Busy)
///     }
/// }
///
/// assert_eq!(StoreError::Busy.code(), "STORE_BUSY");
/// assert!(StoreError::Busy.is_recoverable());
/// ```
pub trait ErrorCode {
    /// Stable UPPER_SNAKE_CASE code, prefixed by concern.
    fn code(&self) -> &'static str;

    /// Whether retrying (or user action) can succeed.
    ///
    /// Invalid input and configuration mismatches are not recoverable;
    /// transient conditions are.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows the crate conventions.
///
/// Intended for tests covering every variant of an error enum.
///
/// # Panics
///
/// Panics if the code is empty, lacks the expected prefix, or is not
/// UPPER_SNAKE_CASE.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();
    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
