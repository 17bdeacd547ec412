//! The JSON envelopes that travel on the wire.
//!
//! Every request a client sends has the same outer shape, and every
//! response the server sends back has the same outer shape:
//!
//! ```text
//! → {"contextId": "...", "type": "CREATE_ROOM", "data": {...}}
//! ← {"contextId": "...", "type": "CREATE_ROOM_RESPONSE", "result": "OK", "data": {...}}
//! ```
//!
//! The `data` payload is kept as a raw [`Value`] here. Decoding it into a
//! concrete request type is the dispatcher's job, once it knows which
//! request the `type` tag names.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The response tag for a request tag: `CREATE_ROOM` → `CREATE_ROOM_RESPONSE`.
pub fn response_type(request_type: &str) -> String {
    format!("{request_type}_RESPONSE")
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A request from a client.
///
/// `context_id` is opaque: whatever the client put there is echoed back
/// unchanged on every response to this request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessage {
    pub context_id: String,

    /// The request tag, e.g. `"JOIN_ROOM"`. `type` is a Rust keyword, so
    /// the field is renamed on the wire.
    #[serde(rename = "type")]
    pub kind: String,

    /// Request-specific payload. Absent `data` decodes as `null`.
    #[serde(default)]
    pub data: Value,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Whether a request succeeded. Serialized as `"OK"` / `"FAILURE"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    Ok,
    Failure,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKind::Ok => f.write_str("OK"),
            ResultKind::Failure => f.write_str("FAILURE"),
        }
    }
}

/// Payload of every FAILURE response, for callers that want it typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    pub error: String,
}

/// A response from the server, correlated to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    pub context_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub result: ResultKind,
    pub data: Value,
}

impl ServerMessage {
    /// A successful response to a request of type `request_type`.
    pub fn ok(
        context_id: impl Into<String>,
        request_type: &str,
        data: Value,
    ) -> Self {
        Self {
            context_id: context_id.into(),
            kind: response_type(request_type),
            result: ResultKind::Ok,
            data,
        }
    }

    /// A failed response carrying `{"error": <message>}`.
    pub fn failure(
        context_id: impl Into<String>,
        request_type: &str,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            context_id: context_id.into(),
            kind: response_type(request_type),
            result: ResultKind::Failure,
            data: serde_json::json!({ "error": error.to_string() }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == ResultKind::Ok
    }

    /// The error message of a FAILURE response.
    pub fn error(&self) -> Option<&str> {
        match self.result {
            ResultKind::Failure => self.data.get("error")?.as_str(),
            ResultKind::Ok => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_message_json_format() {
        let raw = json!({
            "contextId": "80bdc250-5365-4caf-8dd9-a33e709a0116",
            "type": "CREATE_ROOM",
            "data": {"roomDTO": {"name": "TajnyPokoj"}}
        });

        let msg: UserMessage = serde_json::from_value(raw).unwrap();

        assert_eq!(msg.context_id, "80bdc250-5365-4caf-8dd9-a33e709a0116");
        assert_eq!(msg.kind, "CREATE_ROOM");
        assert_eq!(msg.data["roomDTO"]["name"], "TajnyPokoj");
    }

    #[test]
    fn test_user_message_data_is_optional() {
        let msg: UserMessage =
            serde_json::from_str(r#"{"contextId":"x","type":"PING"}"#).unwrap();
        assert_eq!(msg.data, Value::Null);
    }

    #[test]
    fn test_user_message_without_type_is_rejected() {
        let result: Result<UserMessage, _> =
            serde_json::from_str(r#"{"contextId":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_type_suffix() {
        assert_eq!(response_type("JOIN_ROOM"), "JOIN_ROOM_RESPONSE");
    }

    #[test]
    fn test_server_message_ok_json_format() {
        let msg = ServerMessage::ok("ctx", "CREATE_ROOM", json!({"a": 1}));

        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            value,
            json!({
                "contextId": "ctx",
                "type": "CREATE_ROOM_RESPONSE",
                "result": "OK",
                "data": {"a": 1}
            })
        );
        assert!(msg.is_ok());
        assert_eq!(msg.error(), None);
    }

    #[test]
    fn test_server_message_failure_json_format() {
        let msg = ServerMessage::failure(
            "ctx",
            "CREATE_ROOM",
            "Leave your current room before joining another.",
        );

        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["result"], "FAILURE");
        let data: ErrorData = serde_json::from_value(value["data"].clone()).unwrap();
        assert_eq!(data.error, "Leave your current room before joining another.");
        assert_eq!(
            msg.error(),
            Some("Leave your current room before joining another.")
        );
    }

    #[test]
    fn test_result_kind_display_matches_wire() {
        for kind in [ResultKind::Ok, ResultKind::Failure] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
