//! Declarative data-mapping primitives for the barrel client libraries.
//!
//! A reaktor RPC response is one nested JSON mapping. Entity schemas are
//! plain Rust structs that decode themselves from such a mapping through
//! the [`Store`] trait, reading each field from a declared target path
//! with [`field`]. Targets are ':'-separated key paths; coercions cover
//! the backend's loose typing (stringly booleans and numbers, two date
//! renditions, delimited list strings).
//!
//! Polymorphic fragments — where a discriminant field selects the concrete
//! variant — decode through a [`VariantRegistry`] built lazily at first
//! use.

pub mod error;
pub mod field;
pub mod path;
pub mod registry;
pub mod store;

pub use error::StoreError;
pub use field::{field, FieldRef};
pub use registry::VariantRegistry;
pub use store::{decode_array, Store};
