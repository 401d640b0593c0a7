//! Shared wire types: response mode, files, usage and metadata, and the
//! response/event shapes common to the chat and completion endpoints.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Response mode, `streaming` (recommended) or `blocking`.
///
/// Injected by the client based on which operation was called; request
/// records do not carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Blocking,
    Streaming,
}

/// A request record plus the response mode the client chose for it.
#[derive(Debug, Serialize)]
pub(crate) struct Invocation<'a, R: Serialize> {
    #[serde(flatten)]
    request: &'a R,
    response_mode: ResponseMode,
}

impl<'a, R: Serialize> Invocation<'a, R> {
    pub(crate) fn blocking(request: &'a R) -> Self {
        Self {
            request,
            response_mode: ResponseMode::Blocking,
        }
    }

    pub(crate) fn streaming(request: &'a R) -> Self {
        Self {
            request,
            response_mode: ResponseMode::Streaming,
        }
    }
}

/// A file attached to a request.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    /// Supported types, `image` only.
    #[serde(rename = "type")]
    pub file_type: String,
    /// Delivery method, `remote_url` or `local_file`.
    pub transfer_method: String,
    /// Image URL, for `remote_url`.
    pub url: Option<String>,
    /// Upload file ID, for `local_file`.
    pub upload_file_id: Option<String>,
}

/// Model usage and billing information.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: i64,
    pub prompt_unit_price: String,
    pub prompt_price_unit: String,
    pub prompt_price: String,
    pub completion_tokens: i64,
    pub completion_unit_price: String,
    pub completion_price_unit: String,
    pub completion_price: String,
    pub total_tokens: i64,
    pub total_price: String,
    pub currency: String,
    pub latency: f64,
}

/// A reference to a retrieved knowledge segment attributed in a message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrieverResource {
    pub position: i64,
    pub dataset_id: String,
    pub dataset_name: String,
    pub document_id: String,
    pub document_name: String,
    pub segment_id: String,
    pub score: f64,
    pub content: String,
}

/// Message metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub usage: Usage,
    pub retriever_resources: Vec<RetrieverResource>,
}

/// Response body of the chat-message and completion-message endpoints in
/// blocking mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatCompletionResponse {
    /// Agent thought ID; unique per agent iteration.
    pub id: String,
    pub event: String,
    pub message_id: String,
    /// Session ID.
    pub conversation_id: String,
    /// App mode, `chat` or `completion`.
    pub mode: String,
    /// Full answer content.
    pub answer: String,
    pub metadata: Metadata,
    /// Creation timestamp, seconds since the epoch.
    pub created_at: i64,
}

/// One streaming event from the chat-message or completion-message
/// endpoints.
///
/// The `event` discriminant decides which of the remaining fields are
/// populated: `message` carries an `answer` fragment, `agent_thought`
/// the agent fields, `node_started`/`node_finished` the [`data`] block,
/// `message_end` the usage metadata, `error` a code and message.
///
/// [`data`]: ChatStreamEvent::data
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatStreamEvent {
    /// SSE event name (discriminant).
    pub event: String,
    /// Task ID, for request tracking.
    pub task_id: String,
    /// Agent thought ID; unique per agent iteration.
    pub id: String,
    pub message_id: String,
    /// Session ID.
    pub conversation_id: String,
    /// Answer fragment for this block.
    pub answer: String,
    /// Position of the agent thought in the message, starting at 1.
    pub position: i64,
    /// The agent's thoughts.
    pub thought: String,
    /// The result returned by a tool call.
    pub observation: String,
    pub tool: String,
    /// Tool input as a JSON-formatted string.
    pub tool_input: String,
    /// File IDs associated with the current agent thought.
    pub message_files: Vec<String>,
    /// File type, currently only `image`.
    #[serde(rename = "type")]
    pub file_type: String,
    /// File owner, `user` or `assistant`.
    pub belongs_to: String,
    /// File access address.
    pub url: String,
    /// Node-execution details for workflow-backed chat apps.
    pub data: NodeData,
    pub metadata: Metadata,
    /// Base64-encoded audio block from speech synthesis.
    pub audio: String,
    /// HTTP status code, on `error` events.
    pub status: i64,
    /// Error code, on `error` events.
    pub code: String,
    /// Error message, on `error` events.
    pub message: String,
    /// Creation timestamp, seconds since the epoch.
    pub created_at: i64,
}

/// Node-execution details carried by chat stream events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeData {
    /// Workflow execution ID.
    pub id: String,
    pub node_id: String,
    pub node_type: String,
    /// Node title.
    pub title: String,
    /// Execution sequence number.
    pub index: i64,
    pub predecessor_node_id: String,
    pub inputs: Option<HashMap<String, serde_json::Value>>,
    pub outputs: Option<HashMap<String, serde_json::Value>>,
    /// Execution status.
    pub status: String,
    /// Execution time in seconds.
    pub elapsed_time: f64,
    pub created_at: i64,
    pub finished_at: i64,
}
