use serde_json::{Map, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;

use crate::normalized::{EventPayload, EventType, NormalizedEvent, DEFAULT_AGENT_ID};

/// Raw layouts the normalizer knows how to read.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SchemaVersion {
    /// Legacy flat records: `{"event": "tool_call", "session_id": .., "tool": ..}`.
    V1,
    /// Envelope records: `{"type": "tool.call", "session": .., "data": {..}}`.
    V2,
    /// Anything else; every known key of both layouts is tried.
    Generic,
}

/// Raw type strings (lower-cased) and their canonical kind, legacy aliases included.
const EVENT_TYPE_TABLE: &[(&str, EventType)] = &[
    ("message.in", EventType::MessageIn),
    ("message_in", EventType::MessageIn),
    ("message:in", EventType::MessageIn),
    ("message.received", EventType::MessageIn),
    ("message:received", EventType::MessageIn),
    ("message_received", EventType::MessageIn),
    ("user_message", EventType::MessageIn),
    ("user.message", EventType::MessageIn),
    ("msg.in", EventType::MessageIn),
    ("message.out", EventType::MessageOut),
    ("message_out", EventType::MessageOut),
    ("message:out", EventType::MessageOut),
    ("message.sent", EventType::MessageOut),
    ("message:sent", EventType::MessageOut),
    ("message_sent", EventType::MessageOut),
    ("message_sending", EventType::MessageOut),
    ("assistant_message", EventType::MessageOut),
    ("assistant.message", EventType::MessageOut),
    ("msg.out", EventType::MessageOut),
    ("tool.call", EventType::ToolCall),
    ("tool_call", EventType::ToolCall),
    ("tool:call", EventType::ToolCall),
    ("tool.start", EventType::ToolCall),
    ("tool_use", EventType::ToolCall),
    ("before_tool_call", EventType::ToolCall),
    ("tool.result", EventType::ToolResult),
    ("tool_result", EventType::ToolResult),
    ("tool:result", EventType::ToolResult),
    ("tool.end", EventType::ToolResult),
    ("after_tool_call", EventType::ToolResult),
    ("session.start", EventType::SessionStart),
    ("session_start", EventType::SessionStart),
    ("session:start", EventType::SessionStart),
    ("session.end", EventType::SessionEnd),
    ("session_end", EventType::SessionEnd),
    ("session:end", EventType::SessionEnd),
];

/// Timestamps at or above this magnitude are read as milliseconds, below as seconds.
const MILLIS_THRESHOLD: f64 = 1e11;

pub fn map_event_type(raw: &str) -> EventType {
    let lowered = raw.trim().to_ascii_lowercase();
    EVENT_TYPE_TABLE
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, kind)| *kind)
        .unwrap_or(EventType::Unknown)
}

pub fn detect_schema(raw: &Value) -> SchemaVersion {
    let Some(map) = raw.as_object() else {
        return SchemaVersion::Generic;
    };

    let declared = ["schema", "schema_version", "schemaVersion", "version"]
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(declared_version);
    match declared {
        Some(2) => return SchemaVersion::V2,
        Some(1) => return SchemaVersion::V1,
        _ => {}
    }

    let has_type = map.get("type").and_then(Value::as_str).is_some();
    if has_type && map.get("data").is_some_and(Value::is_object) {
        return SchemaVersion::V2;
    }
    if map.get("event").and_then(Value::as_str).is_some() {
        return SchemaVersion::V1;
    }
    SchemaVersion::Generic
}

fn declared_version(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().trim_start_matches('v').parse().ok(),
        _ => None,
    }
}

/// Converts one raw record into a [`NormalizedEvent`].
///
/// Returns `None` when the record is not an object or has no usable timestamp or session id;
/// every other shape problem degrades to an absent field.
pub fn normalize_event(raw: &Value, schema: SchemaVersion) -> Option<NormalizedEvent> {
    let Some(map) = raw.as_object() else {
        debug!("dropping non-object trace record");
        return None;
    };

    let layout = Layout::for_schema(schema);

    let raw_type = extract_str_from_keys(map, layout.type_keys);
    let event_type = raw_type.map(map_event_type).unwrap_or(EventType::Unknown);

    let Some(timestamp) = layout
        .timestamp_keys
        .iter()
        .find_map(|key| map.get(*key))
        .and_then(parse_timestamp)
    else {
        debug!(event_type = ?raw_type, "dropping trace record without a usable timestamp");
        return None;
    };

    let Some(session_id) = extract_str_from_keys(map, layout.session_keys) else {
        debug!(event_type = ?raw_type, "dropping trace record without a session id");
        return None;
    };

    let agent_id = extract_str_from_keys(map, layout.agent_keys).unwrap_or(DEFAULT_AGENT_ID);

    let body = match layout.data_key {
        Some(key) => map.get(key).and_then(Value::as_object).unwrap_or(map),
        None => map,
    };
    let payload = normalize_payload(event_type, body);

    Some(NormalizedEvent::new(
        timestamp,
        event_type,
        session_id,
        agent_id,
        payload,
    ))
}

/// Detects the schema of `raw` and normalizes it in one step.
pub fn normalize_raw(raw: &Value) -> Option<NormalizedEvent> {
    normalize_event(raw, detect_schema(raw))
}

/// Pulls the typed payload for `event_type` out of `body`.
pub fn normalize_payload(event_type: EventType, body: &Map<String, Value>) -> EventPayload {
    match event_type {
        EventType::MessageIn | EventType::MessageOut => EventPayload::Message {
            text: extract_text(body),
        },
        EventType::ToolCall => EventPayload::ToolCall {
            tool_name: extract_tool_name(body),
            params: ["params", "input", "args", "arguments"]
                .iter()
                .find_map(|key| body.get(*key))
                .and_then(Value::as_object)
                .cloned(),
        },
        EventType::ToolResult => EventPayload::ToolResult {
            tool_name: extract_tool_name(body),
            error: ["error", "err", "errorMessage", "error_message"]
                .iter()
                .find_map(|key| body.get(*key))
                .and_then(extract_error),
            success: ["success", "ok"]
                .iter()
                .find_map(|key| body.get(*key))
                .and_then(Value::as_bool),
            output: ["result", "output", "content"]
                .iter()
                .find_map(|key| body.get(*key))
                .and_then(extract_text_value),
        },
        EventType::SessionStart | EventType::SessionEnd => EventPayload::Lifecycle,
        EventType::Unknown => EventPayload::Unknown,
    }
}

struct Layout {
    type_keys: &'static [&'static str],
    timestamp_keys: &'static [&'static str],
    session_keys: &'static [&'static str],
    agent_keys: &'static [&'static str],
    data_key: Option<&'static str>,
}

impl Layout {
    fn for_schema(schema: SchemaVersion) -> Self {
        match schema {
            SchemaVersion::V1 => Self {
                type_keys: &["event", "type"],
                timestamp_keys: &["timestamp", "ts", "time"],
                session_keys: &["session_id", "sessionId", "session"],
                agent_keys: &["agent_id", "agentId", "agent"],
                data_key: None,
            },
            SchemaVersion::V2 => Self {
                type_keys: &["type", "event"],
                timestamp_keys: &["ts", "timestamp", "time"],
                session_keys: &["session", "sessionId", "session_id"],
                agent_keys: &["agent", "agentId", "agent_id"],
                data_key: Some("data"),
            },
            SchemaVersion::Generic => Self {
                type_keys: &["type", "event", "kind", "event_type", "eventType"],
                timestamp_keys: &["timestamp", "ts", "time", "created_at", "createdAt"],
                session_keys: &["session_id", "sessionId", "session", "conversation_id"],
                agent_keys: &["agent_id", "agentId", "agent"],
                data_key: Some("data"),
            },
        }
    }
}

fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            let raw = n.as_f64()?;
            if !raw.is_finite() || raw < 0.0 {
                return None;
            }
            if raw >= MILLIS_THRESHOLD {
                Some(raw as i64)
            } else {
                Some((raw * 1000.0) as i64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(parsed) = OffsetDateTime::parse(s, &Rfc3339) {
                return i64::try_from(parsed.unix_timestamp_nanos() / 1_000_000).ok();
            }
            s.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .and_then(|n| parse_timestamp(&Value::Number(n)))
        }
        _ => None,
    }
}

fn extract_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn extract_str_from_keys<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| extract_str(map, key))
}

fn extract_tool_name(body: &Map<String, Value>) -> Option<String> {
    extract_str_from_keys(body, &["toolName", "tool_name", "tool", "name"]).map(str::to_string)
}

fn extract_text(body: &Map<String, Value>) -> Option<String> {
    ["text", "content", "message", "body"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(extract_text_value)
}

/// Strings pass through; arrays of `{type: "text", text}` blocks are joined with newlines.
fn extract_text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(block) => {
                        let is_text = block
                            .get("type")
                            .and_then(Value::as_str)
                            .map_or(true, |t| t == "text");
                        if is_text {
                            block.get("text").and_then(Value::as_str)
                        } else {
                            None
                        }
                    }
                    _ => None,
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n"))
            }
        }
        _ => None,
    }
}

fn extract_error(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => extract_str_from_keys(map, &["message", "error", "msg"])
            .map(str::to_string),
        _ => None,
    }
}
