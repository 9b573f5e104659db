use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical event kinds. Anything the type table does not recognize lands in `Unknown`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    MessageIn,
    MessageOut,
    ToolCall,
    ToolResult,
    SessionStart,
    SessionEnd,
    Unknown,
}

impl EventType {
    pub fn is_message(self) -> bool {
        matches!(self, EventType::MessageIn | EventType::MessageOut)
    }
}

/// Payload of a normalized event, tagged by the event type it was extracted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Message {
        text: Option<String>,
    },
    ToolCall {
        tool_name: Option<String>,
        params: Option<Map<String, Value>>,
    },
    ToolResult {
        tool_name: Option<String>,
        error: Option<String>,
        success: Option<bool>,
        output: Option<String>,
    },
    Lifecycle,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub session_id: String,
    pub agent_id: String,
    pub payload: EventPayload,
}

impl NormalizedEvent {
    pub fn new(
        timestamp: i64,
        event_type: EventType,
        session_id: impl Into<String>,
        agent_id: impl Into<String>,
        payload: EventPayload,
    ) -> Self {
        Self {
            timestamp,
            event_type,
            session_id: session_id.into(),
            agent_id: agent_id.into(),
            payload,
        }
    }

    pub fn message_in(timestamp: i64, session_id: &str, text: &str) -> Self {
        Self::new(
            timestamp,
            EventType::MessageIn,
            session_id,
            DEFAULT_AGENT_ID,
            EventPayload::Message {
                text: Some(text.to_string()),
            },
        )
    }

    pub fn message_out(timestamp: i64, session_id: &str, text: &str) -> Self {
        Self::new(
            timestamp,
            EventType::MessageOut,
            session_id,
            DEFAULT_AGENT_ID,
            EventPayload::Message {
                text: Some(text.to_string()),
            },
        )
    }

    /// Builds a tool call; non-object `params` are treated as absent.
    pub fn tool_call(timestamp: i64, session_id: &str, tool: &str, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => Some(map),
            _ => None,
        };
        Self::new(
            timestamp,
            EventType::ToolCall,
            session_id,
            DEFAULT_AGENT_ID,
            EventPayload::ToolCall {
                tool_name: Some(tool.to_string()),
                params,
            },
        )
    }

    pub fn tool_error(timestamp: i64, session_id: &str, tool: &str, error: &str) -> Self {
        Self::new(
            timestamp,
            EventType::ToolResult,
            session_id,
            DEFAULT_AGENT_ID,
            EventPayload::ToolResult {
                tool_name: Some(tool.to_string()),
                error: Some(error.to_string()),
                success: Some(false),
                output: None,
            },
        )
    }

    pub fn tool_success(timestamp: i64, session_id: &str, tool: &str, output: &str) -> Self {
        Self::new(
            timestamp,
            EventType::ToolResult,
            session_id,
            DEFAULT_AGENT_ID,
            EventPayload::ToolResult {
                tool_name: Some(tool.to_string()),
                error: None,
                success: Some(true),
                output: Some(output.to_string()),
            },
        )
    }

    /// Replaces the agent id; handy when a fixture needs more than one agent per session.
    pub fn with_agent(mut self, agent_id: &str) -> Self {
        self.agent_id = agent_id.to_string();
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Message { text } => text.as_deref(),
            _ => None,
        }
    }

    pub fn tool_name(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::ToolCall { tool_name, .. } | EventPayload::ToolResult { tool_name, .. } => {
                tool_name.as_deref()
            }
            _ => None,
        }
    }

    pub fn params(&self) -> Option<&Map<String, Value>> {
        match &self.payload {
            EventPayload::ToolCall { params, .. } => params.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::ToolResult { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// True for tool results that carry an error or an explicit `success: false`.
    pub fn is_tool_error(&self) -> bool {
        match &self.payload {
            EventPayload::ToolResult { error, success, .. } => {
                self.event_type == EventType::ToolResult
                    && (error.is_some() || *success == Some(false))
            }
            _ => false,
        }
    }

    pub fn is_tool_success(&self) -> bool {
        self.event_type == EventType::ToolResult
            && matches!(self.payload, EventPayload::ToolResult { .. })
            && !self.is_tool_error()
    }
}

pub const DEFAULT_AGENT_ID: &str = "main";
