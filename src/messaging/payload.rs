use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat message pushed with `new_message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    /// `true` when the customer wrote it, `false` for bot or agent replies
    pub is_from_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Who currently answers a support channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Bot,
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Active,
    Waiting,
    Resolved,
    Closed,
}

/// Channel state pushed with `channel_updated`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelUpdate {
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub status: ChannelStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicator {
    pub channel_id: String,
    pub is_typing: bool,
}

/// A customer waiting for a human agent, pushed with `new_waiting_channel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingChannel {
    pub channel_id: String,
    pub requester_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reported by the server through an `error` event
    Server,
    /// A connection attempt failed on this side
    Connection,
}

/// Value handed to error listeners
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Value,
}

impl ErrorEvent {
    /// Builds an event from a server `error` payload. The payload may be a
    /// bare string or an object with a `message` field.
    pub fn from_server_payload(payload: Value) -> Self {
        let message = match &payload {
            Value::String(s) => s.clone(),
            other => other
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        };

        Self {
            kind: ErrorKind::Server,
            message,
            details: payload,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Connection,
            message: message.into(),
            details: Value::Null,
        }
    }
}

/// Outbound payload for join and control events
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelRef<'a> {
    pub channel_id: &'a str,
}

/// Outbound payload for `send_message`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OutgoingMessage<'a> {
    pub channel_id: &'a str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PingPayload {
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_from_wire() {
        let message: ChatMessage = serde_json::from_value(json!({
            "id": "m-1",
            "channelId": "c-9",
            "content": "Is this jacket available in M?",
            "isFromUser": true,
            "timestamp": "2024-03-01T10:15:00Z"
        }))
        .unwrap();

        assert_eq!(message.channel_id, "c-9");
        assert!(message.is_from_user);
        assert_eq!(message.metadata, None);
        assert_eq!(message.timestamp.to_rfc3339(), "2024-03-01T10:15:00+00:00");
    }

    #[test]
    fn test_channel_update_rejects_unknown_status() {
        let result = serde_json::from_value::<ChannelUpdate>(json!({
            "channelId": "c-1",
            "channelType": "human",
            "status": "archived"
        }));
        assert!(result.is_err());

        let update: ChannelUpdate = serde_json::from_value(json!({
            "channelId": "c-1",
            "channelType": "human",
            "status": "waiting"
        }))
        .unwrap();
        assert_eq!(update.channel_type, ChannelType::Human);
        assert_eq!(update.status, ChannelStatus::Waiting);
    }

    #[test]
    fn test_error_event_from_server_payload() {
        let event = ErrorEvent::from_server_payload(json!({ "message": "forbidden", "code": 403 }));
        assert_eq!(event.kind, ErrorKind::Server);
        assert_eq!(event.message, "forbidden");
        assert_eq!(event.details["code"], 403);

        let event = ErrorEvent::from_server_payload(json!("rate limited"));
        assert_eq!(event.message, "rate limited");
    }

    #[test]
    fn test_outgoing_message_wire_shape() {
        let payload = serde_json::to_value(OutgoingMessage {
            channel_id: "c-1",
            content: "hello".to_string(),
        })
        .unwrap();
        assert_eq!(payload, json!({ "channelId": "c-1", "content": "hello" }));
    }
}
