#![forbid(unsafe_code)]

//! Error taxonomy for property dispatch.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Validator type mismatch | Validator stored for `U` invoked as `T` | `set` panics, `try_set` returns `Err` |
//! | No callbacks for an offset | Nothing registered | Not an error; identity / no-op |
//! | Callback panics | User code | Propagates to the assignment call site |

use std::fmt;

/// Errors raised while dispatching validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A validator registered for one value type was invoked for another.
    ValidatorTypeMismatch {
        /// Offset of the property the validator is registered under.
        offset: usize,
        /// Value type requested by the assignment.
        expected: &'static str,
        /// Value type the validator was registered with.
        found: &'static str,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidatorTypeMismatch {
                offset,
                expected,
                found,
            } => write!(
                f,
                "validator at offset {offset} expects `{found}` but was invoked with `{expected}`"
            ),
        }
    }
}

impl std::error::Error for PropertyError {}

/// Result alias for fallible dispatch.
pub type PropertyResult<T> = Result<T, PropertyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_types() {
        let err = PropertyError::ValidatorTypeMismatch {
            offset: 8,
            expected: "i32",
            found: "f64",
        };
        let msg = err.to_string();
        assert!(msg.contains("offset 8"));
        assert!(msg.contains("`f64`"));
        assert!(msg.contains("`i32`"));
    }

    #[test]
    fn is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(PropertyError::ValidatorTypeMismatch {
            offset: 0,
            expected: "u8",
            found: "u16",
        });
        assert!(err.source().is_none());
    }
}
