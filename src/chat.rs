//! Chat-message invocations, blocking and streaming.

use std::collections::HashMap;

use serde::Serialize;
use serde_with::skip_serializing_none;
use tokio_util::sync::CancellationToken;

use crate::client::{Client, ClientError};
use crate::http::{read_json, require_success, RequestBuilderExt};
use crate::stream::EventStream;
use crate::types::{ChatCompletionResponse, ChatStreamEvent, File, Invocation};

const CHAT_MESSAGES_ENDPOINT: &str = "/v1/chat-messages";

/// Request body for the chat-message endpoints.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatMessageRequest {
    /// User input/question content.
    pub query: String,
    /// App input variables.
    pub inputs: HashMap<String, serde_json::Value>,
    /// Identity of the end user.
    pub user: String,
    /// Files attached to the message.
    pub files: Vec<File>,
    /// Continue an existing conversation.
    pub conversation_id: Option<String>,
    /// Let the server title new conversations; server default is `true`.
    pub auto_generate_name: Option<bool>,
}

impl Client {
    /// Send a chat message and wait for the complete answer.
    pub async fn create_chat_message(
        &self,
        request: &ChatMessageRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let response = self
            .post(CHAT_MESSAGES_ENDPOINT)
            .json_logged(&Invocation::blocking(request))
            .send()
            .await?;
        read_json(require_success(response).await?).await
    }

    /// Send a chat message and stream the answer incrementally.
    ///
    /// Events arrive in wire order. After the stream ends, read
    /// [`EventStream::end`] — or use [`EventStream::finish`] — to tell a
    /// completed stream from a faulted or cancelled one.
    pub async fn create_chat_message_stream(
        &self,
        request: &ChatMessageRequest,
    ) -> Result<EventStream<ChatStreamEvent>, ClientError> {
        let response = self
            .post(CHAT_MESSAGES_ENDPOINT)
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
