//! Building and issuing one RPC call: interface, method, ordered
//! arguments, and the conversion of its raw result.

use barrel_core::Store;
use serde_json::Value;

use crate::error::RpcError;
use crate::transport::Transport;

/// Binds a schema to its remote interface.
///
/// `signature` starts a call against the schema's own interface; calls
/// that route elsewhere build a [`Signature`] with an explicit interface
/// instead.
pub trait Schema {
    /// The named remote service group this schema's calls belong to.
    const INTERFACE: &'static str;
    /// The schema name as it appears in cache keys.
    const NAME: &'static str;

    fn signature(method: &str) -> Signature {
        Signature::new(Self::INTERFACE, method)
    }
}

/// One RPC call descriptor. Ephemeral: built, issued, dropped.
#[derive(Debug, Clone)]
pub struct Signature {
    interface: String,
    method: String,
    args: Vec<Value>,
}

impl Signature {
    pub fn new(interface: impl Into<String>, method: impl Into<String>) -> Self {
        Signature {
            interface: interface.into(),
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Append one positional argument.
    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(value);
        self
    }

    /// Append positional arguments in order.
    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(values);
        self
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Issue the call and return the raw result fragment.
    pub fn invoke_raw(&self, transport: &dyn Transport) -> Result<Value, RpcError> {
        transport.invoke(&self.interface, &self.method, &self.args)
    }

    /// Issue the call and decode the result as `T`.
    ///
    /// A `null` result violates the caller's contract here and maps to
    /// [`RpcError::Argument`]; callers that tolerate absence use
    /// [`invoke_optional`](Self::invoke_optional).
    pub fn invoke<T: Store>(&self, transport: &dyn Transport) -> Result<T, RpcError> {
        self.invoke_optional(transport)?
            .ok_or_else(|| self.missing_result())
    }

    /// Issue the call and decode the result as `T`, mapping a `null`
    /// result to `None`.
    pub fn invoke_optional<T: Store>(&self, transport: &dyn Transport) -> Result<Option<T>, RpcError> {
        match self.invoke_raw(transport)? {
            Value::Null => Ok(None),
            raw => Ok(Some(T::from_raw(&raw)?)),
        }
    }

    /// Issue the call and pass the raw result through an explicit
    /// converter.
    pub fn invoke_with<T>(
        &self,
        transport: &dyn Transport,
        convert: impl FnOnce(&Value) -> Result<T, RpcError>,
    ) -> Result<T, RpcError> {
        let raw = self.invoke_raw(transport)?;
        convert(&raw)
    }

    /// Issue the call for its side effect, discarding the result.
    pub fn invoke_unit(&self, transport: &dyn Transport) -> Result<(), RpcError> {
        self.invoke_raw(transport).map(|_| ())
    }

    /// The error for a required result the backend did not produce.
    pub fn missing_result(&self) -> RpcError {
        RpcError::Argument {
            interface: self.interface.clone(),
            method: self.method.clone(),
        }
    }
}
