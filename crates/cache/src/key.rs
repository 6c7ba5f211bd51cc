//! Cache key derivation from RPC call shapes.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Derive the cache key for one read call.
///
/// `key_args` is the slice of positional arguments that identifies the
/// result. Volatile arguments — session tokens above all — must be
/// excluded by the caller, usually via [`sliced_args`]. A mutation that
/// invalidates this read rebuilds the same key from the same parts.
pub fn call_key(schema: &str, method: &str, key_args: &[Value]) -> String {
    let mut hasher = Sha256::new();
    for arg in key_args {
        // Canonical JSON rendering; serde_json object keys are ordered.
        hasher.update(arg.to_string().as_bytes());
        hasher.update([0x1f]);
    }
    format!("barrel:{}:{}:{:x}", schema, method, hasher.finalize())
}

/// Select the key-relevant slice of a call's positional arguments,
/// skipping the first `from` entries.
pub fn sliced_args(args: &[Value], from: usize) -> &[Value] {
    &args[from.min(args.len())..]
}
