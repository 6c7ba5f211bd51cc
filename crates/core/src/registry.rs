//! Discriminant-keyed decoder registry for polymorphic fragments.
//!
//! Some response fragments carry a discriminant field naming their
//! concrete variant (a basket position's `itemType` is `DOCUMENT` or
//! `VOUCHER`). A `VariantRegistry` maps each known tag to one decoder and
//! fails with `UnsupportedVariant` for everything else. Registries are
//! built lazily at first use (typically behind a `OnceLock`), so
//! mutually-referencing schemas never depend on definition order.

use serde_json::Value;

use crate::error::StoreError;
use crate::field::field;

/// One variant decoder: raw fragment in, decoded variant out.
pub type DecodeFn<T> = fn(&Value) -> Result<T, StoreError>;

/// An ordered table of known variant tags and their decoders.
pub struct VariantRegistry<T> {
    discriminant: &'static str,
    variants: Vec<(&'static str, DecodeFn<T>)>,
}

impl<T> VariantRegistry<T> {
    /// A registry dispatching on the given discriminant field.
    pub fn new(discriminant: &'static str) -> Self {
        VariantRegistry {
            discriminant,
            variants: Vec::new(),
        }
    }

    /// Register a decoder for one discriminant tag.
    pub fn with(mut self, tag: &'static str, decode: DecodeFn<T>) -> Self {
        self.variants.push((tag, decode));
        self
    }

    /// Decode one fragment by dispatching on its discriminant value.
    ///
    /// A fragment without the discriminant field behaves as the tag
    /// `NONE`, which no variant registers.
    pub fn decode(&self, raw: &Value) -> Result<T, StoreError> {
        let tag = field(raw, self.discriminant).string_or("NONE")?;
        match self.variants.iter().find(|(known, _)| *known == tag) {
            Some((_, decode)) => decode(raw),
            None => Err(StoreError::UnsupportedVariant {
                discriminant: self.discriminant.to_string(),
                tag,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    enum Fruit {
        Apple(u8),
        Pear,
    }

    struct Apple(u8);

    impl Store for Apple {
        fn from_raw(raw: &Value) -> Result<Self, StoreError> {
            Ok(Apple(field(raw, "seeds").int_or(0)? as u8))
        }
    }

    fn registry() -> VariantRegistry<Fruit> {
        VariantRegistry::new("kind")
            .with("APPLE", |raw| Ok(Fruit::Apple(Apple::from_raw(raw)?.0)))
            .with("PEAR", |_| Ok(Fruit::Pear))
    }

    #[test]
    fn known_tags_reach_their_decoder() {
        let apple = registry().decode(&json!({"kind": "APPLE", "seeds": 5}));
        assert_eq!(apple.unwrap(), Fruit::Apple(5));
        let pear = registry().decode(&json!({"kind": "PEAR"}));
        assert_eq!(pear.unwrap(), Fruit::Pear);
    }

    #[test]
    fn unknown_tag_is_unsupported_variant() {
        let err = registry().decode(&json!({"kind": "BOGUS"})).unwrap_err();
        assert_eq!(
            err,
            StoreError::UnsupportedVariant {
                discriminant: "kind".to_string(),
                tag: "BOGUS".to_string(),
            }
        );
    }

    #[test]
    fn missing_discriminant_behaves_as_none_tag() {
        let err = registry().decode(&json!({})).unwrap_err();
        assert_eq!(
            err,
            StoreError::UnsupportedVariant {
                discriminant: "kind".to_string(),
                tag: "NONE".to_string(),
            }
        );
    }
}
