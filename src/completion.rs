//! Completion-message invocations, blocking and streaming.
//!
//! Completion apps take only input variables — there is no conversation
//! state — but answer with the same response and event shapes as chat.

use std::collections::HashMap;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::client::{Client, ClientError};
use crate::http::{read_json, require_success, RequestBuilderExt};
use crate::stream::EventStream;
use crate::types::{ChatCompletionResponse, ChatStreamEvent, File, Invocation};

const COMPLETION_MESSAGES_ENDPOINT: &str = "/v1/completion-messages";

/// Request body for the completion-message endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompletionMessageRequest {
    /// App input variables.
    pub inputs: HashMap<String, serde_json::Value>,
    /// Identity of the end user.
    pub user: String,
    /// Files attached to the message.
    pub files: Vec<File>,
}

impl Client {
    /// Run a completion and wait for the complete answer.
    pub async fn create_completion_message(
        &self,
        request: &CompletionMessageRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let response = self
            .post(COMPLETION_MESSAGES_ENDPOINT)
            .json_logged(&Invocation::blocking(request))
            .send()
            .await?;
        read_json(require_success(response).await?).await
    }

    /// Run a completion and stream the answer incrementally.
    ///
    /// See [`Client::create_chat_message_stream`] for the stream
    /// lifecycle contract.
    pub async fn create_completion_message_stream(
        &self,
        request: &CompletionMessageRequest,
    ) -> Result<EventStream<ChatStreamEvent>, ClientError> {
        let response = self
            .post(COMPLETION_MESSAGES_ENDPOINT)
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
