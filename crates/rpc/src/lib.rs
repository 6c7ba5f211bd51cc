//! RPC dispatch for barrel schemas: describing one call ([`Signature`]),
//! issuing it through the [`Transport`] boundary, and converting the raw
//! result into a typed store.
//!
//! This layer is a pure translation boundary. It performs no retries and
//! no suppression; every error propagates unchanged to the caller, and
//! retry policy is the caller's problem.

pub mod error;
pub mod signature;
pub mod transport;

pub use error::RpcError;
pub use signature::{Schema, Signature};
pub use transport::{CallRecord, HttpTransport, StaticTransport, Transport};
