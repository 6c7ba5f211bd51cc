//! Typed reaktor entity schemas built on the barrel mapping layer.
//!
//! Each module mirrors one backend entity: a struct decoding itself from
//! the raw response mapping (field targets correspond one-to-one to
//! backend key paths; a mismatch is backend/client version skew, not a
//! local bug) plus the RPC operations that fetch or mutate it. All
//! operations go through a [`Client`], which bundles the transport with
//! a cache store.

pub mod basket;
pub mod category;
pub mod client;
pub mod company;
pub mod content_presentation;
pub mod discussion;
pub mod document;
pub mod document_list;
pub mod models;
pub mod search;
pub mod shopping_list;
pub mod user;
pub mod voucher;

pub use client::Client;
pub use models::{Direction, Price};
