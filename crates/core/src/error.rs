use std::fmt;

/// Errors raised while decoding a store from a raw response mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A declared field's target path is absent and the field carries no
    /// default.
    MissingField { target: String },
    /// The raw value at a target path cannot be coerced to the declared
    /// type.
    TypeMismatch {
        target: String,
        expected: &'static str,
        actual: String,
    },
    /// A polymorphic discriminant value is not in the registered set.
    UnsupportedVariant { discriminant: String, tag: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MissingField { target } => {
                write!(f, "missing field at '{}'", target)
            }
            StoreError::TypeMismatch {
                target,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "type mismatch at '{}': expected {}, got {}",
                    target, expected, actual
                )
            }
            StoreError::UnsupportedVariant { discriminant, tag } => {
                write!(f, "unsupported {} variant: '{}'", discriminant, tag)
            }
        }
    }
}

impl std::error::Error for StoreError {}
