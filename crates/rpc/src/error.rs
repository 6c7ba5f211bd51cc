use barrel_core::StoreError;

/// All errors that can surface from one RPC call.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The backend answered with a non-success result (stale entity,
    /// unknown id, rejected argument).
    #[error("reaktor error from {interface}.{method}: {message} (code {code})")]
    Api {
        interface: String,
        method: String,
        code: i64,
        message: String,
    },

    /// The backend returned nothing where the call contract requires a
    /// value (a lookup by id yielding `null`).
    #[error("{interface}.{method} returned no result")]
    Argument { interface: String, method: String },

    /// The transport failed before a backend result was produced.
    #[error("transport failure calling {interface}.{method}: {message}")]
    Transport {
        interface: String,
        method: String,
        message: String,
    },

    /// The raw result could not be decoded into the requested store.
    #[error(transparent)]
    Decode(#[from] StoreError),
}
