//! Named-event envelopes carried in WebSocket text frames
//!
//! Every frame is `{"event": <name>, "payload": <payload>}`. Payload is absent
//! for events that carry none (`requestData`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Snapshot;
use crate::error::{DashboardError, Result};

/// A serialized frame, shared between every connection it is delivered to
pub type Frame = Arc<str>;

/// Payload of an application-level `error` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Events sent from server to viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ServerMessage {
    /// New or catch-up telemetry sample
    Data(Snapshot),
    /// Application-level error
    Error(ErrorPayload),
}

/// Events sent from viewer to server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Resend the latest snapshot to this connection only
    RequestData,
}

// Borrowing twin of `ServerMessage` so published snapshots are encoded without a clone.
#[derive(Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
enum OutgoingRef<'a> {
    Data(&'a Snapshot),
    Error(&'a ErrorPayload),
}

impl ServerMessage {
    /// Encode a `data` frame
    pub fn encode_data(snapshot: &Snapshot) -> Result<Frame> {
        let json = serde_json::to_string(&OutgoingRef::Data(snapshot))?;
        Ok(Frame::from(json))
    }

    /// Encode an `error` frame
    pub fn encode_error(message: impl Into<String>) -> Result<Frame> {
        let payload = ErrorPayload {
            message: message.into(),
        };
        let json = serde_json::to_string(&OutgoingRef::Error(&payload))?;
        Ok(Frame::from(json))
    }

    /// Decode a frame received by a viewer
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DashboardError::InvalidMessage(e.to_string()))
    }
}

impl ClientMessage {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a frame received by the server
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DashboardError::InvalidMessage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, EventId, EventKind, Metrics};
    use chrono::Utc;
    use serde_json::Value;

    fn snapshot() -> Snapshot {
        let now = Utc::now();
        Snapshot {
            timestamp: now,
            metrics: Metrics {
                cpu: 50.0,
                memory: 60.0,
                network: 500.0,
                disk: 70.0,
            },
            events: vec![Event {
                id: EventId::Number(1),
                kind: EventKind::Info,
                message: "System event 1".to_string(),
                timestamp: now,
            }],
            users: 200,
            transactions: 2000,
        }
    }

    #[test]
    fn test_data_frame_envelope() {
        let frame = ServerMessage::encode_data(&snapshot()).unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();

        assert_eq!(value["event"], "data");
        assert_eq!(value["payload"]["users"], 200);
        assert_eq!(value["payload"]["events"][0]["type"], "info");
    }

    #[test]
    fn test_borrowed_encoding_matches_owned() {
        let snapshot = snapshot();
        let borrowed = ServerMessage::encode_data(&snapshot).unwrap();
        let owned = serde_json::to_string(&ServerMessage::Data(snapshot)).unwrap();
        assert_eq!(&*borrowed, owned.as_str());
    }

    #[test]
    fn test_error_frame_decodes() {
        let frame = ServerMessage::encode_error("generator offline").unwrap();
        assert_eq!(
            ServerMessage::decode(&frame).unwrap(),
            ServerMessage::Error(ErrorPayload {
                message: "generator offline".to_string()
            })
        );
    }

    #[test]
    fn test_request_data_wire_format() {
        assert_eq!(
            ClientMessage::RequestData.encode().unwrap(),
            r#"{"event":"requestData"}"#
        );
        assert_eq!(
            ClientMessage::decode(r#"{"event":"requestData"}"#).unwrap(),
            ClientMessage::RequestData
        );
    }

    #[test]
    fn test_invalid_client_message() {
        let err = ClientMessage::decode(r#"{"event":"shutdown"}"#).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidMessage(_)));

        let err = ClientMessage::decode("not json").unwrap_err();
        assert!(matches!(err, DashboardError::InvalidMessage(_)));
    }
}
