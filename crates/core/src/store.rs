//! The `Store` trait: a schema-backed, read-only view over one raw
//! nested response mapping.

use serde_json::Value;

use crate::error::StoreError;

/// A typed entity schema decoded from a raw RPC response fragment.
///
/// Implementations read each declared field from its target path via
/// [`field`](crate::field) and never mutate the input. Decoding a store
/// twice from the same fragment yields equal values.
pub trait Store: Sized {
    /// Decode one instance from a raw response fragment.
    fn from_raw(raw: &Value) -> Result<Self, StoreError>;
}

/// Decode an ordered JSON sequence element-by-element, preserving order.
///
/// `target` names the sequence in errors; `decode` is usually
/// `T::from_raw` but may be a variant-registry dispatch for polymorphic
/// elements.
pub fn decode_array<T>(
    raw: &Value,
    target: &str,
    decode: impl Fn(&Value) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    match raw {
        Value::Array(items) => items.iter().map(decode).collect(),
        other => Err(StoreError::TypeMismatch {
            target: target.to_string(),
            expected: "array",
            actual: other.to_string(),
        }),
    }
}
