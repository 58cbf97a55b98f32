//! Success-or-degraded results.
//!
//! Classification, index derivation and rendering never fail past the engine
//! boundary: malformed input degrades to a safe default (an all-background
//! label raster, an empty index set, the untouched source image). [`Outcome`]
//! keeps that default usable while still telling the caller *why* it was
//! produced, so "genuinely all background" and "input was malformed" stay
//! distinguishable.

use crate::error::{Error, Result};

/// The value produced by an engine operation, plus whether it is a fallback.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The operation ran on well-formed input.
    Complete(T),
    /// The input was malformed or empty; `value` is the safe default.
    Degraded { value: T, reason: Error },
}

impl<T> Outcome<T> {
    /// Build a degraded outcome, logging the reason.
    pub fn degraded(value: T, reason: Error) -> Self {
        tracing::warn!("degrading to default output: {}", reason);
        Outcome::Degraded { value, reason }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// Why the operation degraded, if it did.
    pub fn reason(&self) -> Option<&Error> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Borrow the value regardless of how it was produced.
    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(v) | Outcome::Degraded { value: v, .. } => v,
        }
    }

    /// Take the value regardless of how it was produced.
    pub fn into_value(self) -> T {
        match self {
            Outcome::Complete(v) | Outcome::Degraded { value: v, .. } => v,
        }
    }

    /// Strict view: degradation becomes an error.
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Complete(v) => Ok(v),
            Outcome::Degraded { reason, .. } => Err(reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Complete(v) => Outcome::Complete(f(v)),
            Outcome::Degraded { value, reason } => Outcome::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_has_no_reason() {
        let o = Outcome::Complete(3);
        assert!(!o.is_degraded());
        assert!(o.reason().is_none());
        assert_eq!(o.into_result().unwrap(), 3);
    }

    #[test]
    fn degraded_keeps_value_and_reason() {
        let o = Outcome::degraded(0u8, Error::EmptyInput("raster"));
        assert!(o.is_degraded());
        assert_eq!(*o.value(), 0);
        assert!(matches!(o.reason(), Some(Error::EmptyInput(_))));
        assert!(o.into_result().is_err());
    }

    #[test]
    fn map_preserves_degradation() {
        let o = Outcome::degraded(2, Error::Other("x".into())).map(|v| v * 10);
        assert!(o.is_degraded());
        assert_eq!(o.into_value(), 20);
    }
}
