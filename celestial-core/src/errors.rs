//! Error types shared by the celestial crates.
//!
//! [`AstroError`] covers the numerical failures that low-level helpers can hit:
//! non-finite inputs, values outside their physical domain, and degenerate
//! geometry. Higher-level crates wrap it in their own error enums.
//!
//! | Kind | Use Case |
//! |------|----------|
//! | [`NotFinite`](MathErrorKind::NotFinite) | NaN or infinite input |
//! | [`OutOfRange`](MathErrorKind::OutOfRange) | Value outside its physical domain |
//! | [`DivisionByZero`](MathErrorKind::DivisionByZero) | Degenerate geometry |
//!
//! ```
//! use celestial_core::{AstroError, MathErrorKind};
//!
//! fn checked_sqrt(x: f64) -> Result<f64, AstroError> {
//!     if x < 0.0 {
//!         return Err(AstroError::math_error(
//!             "checked_sqrt",
//!             MathErrorKind::OutOfRange,
//!             "argument is negative",
//!         ));
//!     }
//!     Ok(x.sqrt())
//! }
//! ```

use thiserror::Error;

/// Classification of mathematical errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathErrorKind {
    /// Attempted division by zero or near-zero value.
    DivisionByZero,
    /// Input or result is NaN or infinity.
    NotFinite,
    /// Value outside valid domain (e.g., latitude > 90°).
    OutOfRange,
}

/// Unified error type for low-level astronomical helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstroError {
    /// Numerical computation failure.
    #[error("Math error in {operation} ({kind:?}): {message}")]
    MathError {
        operation: String,
        kind: MathErrorKind,
        message: String,
    },
}

/// Convenience alias for `Result<T, AstroError>`.
pub type AstroResult<T> = Result<T, AstroError>;

impl AstroError {
    /// Creates a [`MathError`](Self::MathError) with the given kind.
    pub fn math_error(operation: &str, kind: MathErrorKind, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    pub fn math_kind(&self) -> MathErrorKind {
        match self {
            Self::MathError { kind, .. } => *kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_error_with_kind() {
        let err = AstroError::math_error(
            "location_validation",
            MathErrorKind::OutOfRange,
            "latitude above 90 degrees",
        );
        assert!(err.to_string().contains("Math error in location_validation"));
        assert!(err.to_string().contains("OutOfRange"));
        assert_eq!(err.math_kind(), MathErrorKind::OutOfRange);
    }

    #[test]
    fn test_send_sync() {
        fn _assert_send<T: Send>() {}
        fn _assert_sync<T: Sync>() {}
        _assert_send::<AstroError>();
        _assert_sync::<AstroError>();
    }
}
