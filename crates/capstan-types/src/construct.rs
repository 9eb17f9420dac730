//! Fallible construction for validated types.
//!
//! [`TryNew`] is the constructor counterpart of `TryFrom`: use it when a
//! type carries an invariant that plain field assignment cannot guarantee,
//! and there is no source type being converted from.
//!
//! | Pattern | Use when |
//! |---------|----------|
//! | `new()` | Construction cannot fail |
//! | [`TryNew`] | Construction validates an invariant |
//! | `TryFrom<T>` | Fallible conversion from another type |
//!
//! # Example
//!
//! ```
//! use capstan_types::TryNew;
//!
//! #[derive(Debug)]
//! struct Port(u16);
//!
//! #[derive(Debug, PartialEq)]
//! struct ZeroPort;
//!
//! impl TryNew for Port {
//!     type Error = ZeroPort;
//!     type Args = u16;
//!
//!     fn try_new(port: u16) -> Result<Self, Self::Error> {
//!         if port == 0 {
//!             return Err(ZeroPort);
//!         }
//!         Ok(Port(port))
//!     }
//! }
//!
//! assert!(Port::try_new(8080).is_ok());
//! assert_eq!(Port::try_new(0).unwrap_err(), ZeroPort);
//! ```

/// Trait for constructors that validate their input.
///
/// Types implementing `TryNew` should not also expose an unchecked `new()`
/// for the same arguments: the `try_` prefix is what signals fallibility at
/// the call site.
///
/// `Args` may be a single value, a tuple, or a config struct.
pub trait TryNew {
    /// Why construction failed. Prefer a dedicated error type over `String`.
    type Error;

    /// Arguments consumed by construction.
    type Args;

    /// Attempts to construct the value, validating invariants.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` describing the violated invariant.
    fn try_new(args: Self::Args) -> Result<Self, Self::Error>
    where
        Self: Sized;
}
