//! The transport boundary: one blocking `invoke` per RPC call.
//!
//! [`HttpTransport`] speaks the reaktor JSON envelope over HTTP;
//! [`StaticTransport`] serves canned results and records every call, for
//! tests and offline use.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::RpcError;

/// Performs the actual RPC call.
///
/// The caller blocks until a raw result or a transport error; timeout and
/// cancellation semantics live behind this boundary, not above it.
pub trait Transport: Send + Sync {
    /// Issue one call against `interface.method` and return the raw
    /// result fragment (`Value::Null` when the backend returned nothing).
    fn invoke(&self, interface: &str, method: &str, args: &[Value]) -> Result<Value, RpcError>;
}

/// Shared transports forward; the caller keeps a handle for inspection.
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn invoke(&self, interface: &str, method: &str, args: &[Value]) -> Result<Value, RpcError> {
        (**self).invoke(interface, method, args)
    }
}

// ──────────────────────────────────────────────
// HttpTransport
// ──────────────────────────────────────────────

/// HTTP transport posting the reaktor call envelope
/// `{"method": "IFACE.method", "params": [...], "id": 1}` to one
/// endpoint and unwrapping the `result`/`error` members of the reply.
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpTransport {
    /// A transport for the given endpoint.
    ///
    /// The bearer token is taken from the `BARREL_AUTH_TOKEN` env var;
    /// [`with_token`](Self::with_token) overrides it.
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpTransport {
            agent: ureq::Agent::new_with_defaults(),
            endpoint: endpoint.into(),
            auth_token: std::env::var("BARREL_AUTH_TOKEN").ok(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn transport_error(&self, interface: &str, method: &str, message: String) -> RpcError {
        RpcError::Transport {
            interface: interface.to_string(),
            method: method.to_string(),
            message,
        }
    }
}

impl Transport for HttpTransport {
    fn invoke(&self, interface: &str, method: &str, args: &[Value]) -> Result<Value, RpcError> {
        let envelope = json!({
            "method": format!("{}.{}", interface, method),
            "params": args,
            "id": 1,
        });
        tracing::debug!(interface, method, "issuing rpc call");

        let mut request = self.agent.post(&self.endpoint);
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }
        let response = request
            .send_json(&envelope)
            .map_err(|e| self.transport_error(interface, method, e.to_string()))?;
        let reply: Value = response
            .into_body()
            .read_json()
            .map_err(|e| {
                self.transport_error(interface, method, format!("unreadable reply: {}", e))
            })?;

        if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
            return Err(RpcError::Api {
                interface: interface.to_string(),
                method: method.to_string(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-1),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unspecified backend error")
                    .to_string(),
            });
        }
        Ok(reply.get("result").cloned().unwrap_or(Value::Null))
    }
}

// ──────────────────────────────────────────────
// StaticTransport
// ──────────────────────────────────────────────

/// One recorded call through a [`StaticTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub interface: String,
    pub method: String,
    pub args: Vec<Value>,
}

/// A transport serving canned results and recording every call.
///
/// Useful for tests and for scenarios where all backend answers are
/// known ahead of time. Unconfigured methods answer `null`, the
/// backend's "nothing found".
#[derive(Default)]
pub struct StaticTransport {
    results: HashMap<String, Value>,
    calls: Mutex<Vec<CallRecord>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        StaticTransport::default()
    }

    /// Register the result served for `interface.method`.
    pub fn with_result(mut self, interface: &str, method: &str, result: Value) -> Self {
        self.results
            .insert(format!("{}.{}", interface, method), result);
        self
    }

    /// Every call issued so far, in order.
    pub fn calls(&self) -> Vec<CallRecord> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// How often `interface.method` has been invoked.
    pub fn call_count(&self, interface: &str, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.interface == interface && c.method == method)
            .count()
    }
}

impl Transport for StaticTransport {
    fn invoke(&self, interface: &str, method: &str, args: &[Value]) -> Result<Value, RpcError> {
        let record = CallRecord {
            interface: interface.to_string(),
            method: method.to_string(),
            args: args.to_vec(),
        };
        match self.calls.lock() {
            Ok(mut guard) => guard.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
        Ok(self
            .results
            .get(&format!("{}.{}", interface, method))
            .cloned()
            .unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_transport_serves_registered_results() {
        let transport =
            StaticTransport::new().with_result("WSDocMgmt", "getDocument", json!({"documentID": "42"}));
        let result = transport
            .invoke("WSDocMgmt", "getDocument", &[json!("token"), json!("42")])
            .unwrap();
        assert_eq!(result, json!({"documentID": "42"}));
    }

    #[test]
    fn unregistered_methods_answer_null() {
        let transport = StaticTransport::new();
        let result = transport.invoke("WSDocMgmt", "getDocument", &[]).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn every_call_is_recorded_in_order() {
        let transport = StaticTransport::new();
        let _ = transport.invoke("WSAuth", "getUser", &[json!("t")]);
        let _ = transport.invoke("WSDocMgmt", "getDocument", &[json!("t"), json!("1")]);

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "getUser");
        assert_eq!(calls[1].args, vec![json!("t"), json!("1")]);
        assert_eq!(transport.call_count("WSDocMgmt", "getDocument"), 1);
    }
}
