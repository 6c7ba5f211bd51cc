//! Memoization layer for idempotent barrel RPC reads.
//!
//! Three pieces: the [`CacheStore`] boundary (get/set/delete with a TTL,
//! backed in-process by [`MemoryCache`] or by nothing at all via
//! [`NoCache`]), key derivation from a call's identifying arguments
//! ([`call_key`], [`sliced_args`]), and the explicit higher-order
//! wrappers [`cached`] and [`evict`] that read operations and their
//! invalidating mutations are threaded through.
//!
//! The cache is a pure memoization of idempotent reads: concurrent
//! callers may race a miss and issue a redundant RPC, which is accepted;
//! no entry is ever corrupted by such a race.

pub mod cached;
pub mod key;
pub mod store;

pub use cached::{cached, evict};
pub use key::{call_key, sliced_args};
pub use store::{CacheStore, MemoryCache, NoCache};
