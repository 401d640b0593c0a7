//! Workflow-run invocations, blocking and streaming.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::{Client, ClientError};
use crate::http::{read_json, require_success, RequestBuilderExt};
use crate::stream::EventStream;
use crate::types::{File, Invocation};

const WORKFLOW_RUN_ENDPOINT: &str = "/v1/workflows/run";

/// Request body for the workflow-run endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunWorkflowRequest {
    /// Workflow input variables.
    pub inputs: HashMap<String, serde_json::Value>,
    /// Identity of the end user.
    pub user: String,
    /// Files attached to the run.
    pub files: Vec<File>,
}

/// Response body of the workflow-run endpoint in blocking mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowRunResponse {
    /// Workflow execution ID.
    pub workflow_run_id: String,
    /// Task ID, for request tracking.
    pub task_id: String,
    pub data: WorkflowRunData,
}

/// Execution details of a finished blocking workflow run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowRunData {
    /// Workflow execution ID.
    pub id: String,
    pub workflow_id: String,
    /// Execution status: `running`, `succeeded`, `failed` or `stopped`.
    pub status: String,
    pub outputs: Option<HashMap<String, serde_json::Value>>,
    /// Reason for the failure, if any.
    pub error: String,
    /// Time consumed, in seconds.
    pub elapsed_time: f64,
    pub total_tokens: i64,
    pub total_steps: i64,
    pub created_at: i64,
    pub finished_at: i64,
}

/// One streaming event from the workflow-run endpoint.
///
/// The `event` discriminant is one of `workflow_started`,
/// `node_started`, `node_finished`, `workflow_finished` (plus `tts`
/// audio events); [`data`] carries the matching run- or node-level
/// details.
///
/// [`data`]: WorkflowStreamEvent::data
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowStreamEvent {
    /// SSE event name (discriminant).
    pub event: String,
    /// Task ID, for request tracking.
    pub task_id: String,
    /// Workflow execution ID.
    pub workflow_run_id: String,
    pub message_id: String,
    /// Base64-encoded audio block from speech synthesis.
    pub audio: String,
    pub data: WorkflowEventData,
    /// Creation timestamp, seconds since the epoch.
    pub created_at: i64,
}

/// Run- or node-level details carried by workflow stream events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowEventData {
    /// Workflow execution ID or node execution ID, per the event kind.
    pub id: String,
    pub workflow_id: String,
    /// Sequence number, self-incrementing within the app from 1.
    pub sequence_number: i64,
    pub node_id: String,
    /// Node type, such as `chat`, `completion` or `tool`.
    pub node_type: String,
    /// Node name.
    pub title: String,
    /// Execution sequence number, for tracing display.
    pub index: i64,
    /// Predecessor node ID, for canvas path display.
    pub predecessor_node_id: String,
    /// Previous-node variables used by this node.
    pub inputs: Option<Vec<HashMap<String, serde_json::Value>>>,
    pub process_data: Option<HashMap<String, serde_json::Value>>,
    pub outputs: Option<HashMap<String, serde_json::Value>>,
    /// Execution status: `running`, `succeeded`, `failed` or `stopped`.
    pub status: String,
    /// Reason for the failure, if any.
    pub error: String,
    /// Time consumed, in seconds.
    pub elapsed_time: f64,
    pub execution_metadata: Option<HashMap<String, serde_json::Value>>,
    pub total_tokens: i64,
    pub total_price: f64,
    /// Currency, such as `USD`.
    pub currency: String,
    pub total_steps: i64,
    pub created_at: i64,
    pub finished_at: i64,
}

impl Client {
    /// Run a workflow and wait for it to finish.
    pub async fn run_workflow(
        &self,
        request: &RunWorkflowRequest,
    ) -> Result<WorkflowRunResponse, ClientError> {
        let response = self
            .post(WORKFLOW_RUN_ENDPOINT)
            .json_logged(&Invocation::blocking(request))
            .send()
            .await?;
        read_json(require_success(response).await?).await
    }

    /// Run a workflow and stream node-level progress.
    ///
    /// See [`Client::create_chat_message_stream`] for the stream
    /// lifecycle contract.
    pub async fn run_workflow_stream(
        &self,
        request: &RunWorkflowRequest,
    ) -> Result<EventStream<WorkflowStreamEvent>, ClientError> {
        let response = self
            .post(WORKFLOW_RUN_ENDPOINT)
            .json_logged(&Invocation::streaming(request))
            .send()
            .await?;
        let response = require_success(response).await?;
        Ok(EventStream::spawn(
            response.bytes_stream(),
            CancellationToken::new(),
        ))
    }
}
