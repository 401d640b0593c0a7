//! # dify-client
//!
//! An async Rust client for the [Dify](https://dify.ai) application API.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Chat-message, completion-message and workflow-run invocations
//! - Blocking mode: one request, one JSON response
//! - Streaming mode: typed Server-Sent Events with explicit
//!   backpressure, cancellation and a separately-readable terminal status
//! - Per-client configuration — no global state
//!
//! ## Streaming model
//!
//! Each streaming call spawns a dedicated pump task that owns the HTTP
//! response body and publishes decoded events onto a bounded channel;
//! the caller consumes them through an [`EventStream`]. The event
//! sequence never carries errors — it simply ends, and the termination
//! cause (completed, transport failure, decode failure, cancelled) is
//! read afterwards from [`EventStream::end`] or [`EventStream::finish`].
//!
//! ## Example
//! ```no_run
//! use dify_client::{ChatMessageRequest, Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig {
//!         base_url: "https://api.dify.ai".to_string(),
//!         api_key: "app-...".to_string(),
//!     })?;
//!
//!     let request = ChatMessageRequest {
//!         query: "What are the specs of the iPhone 13 Pro Max?".to_string(),
//!         user: "abc-123".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let mut stream = client.create_chat_message_stream(&request).await?;
//!     while let Some(event) = stream.recv().await {
//!         print!("{}", event.answer);
//!     }
//!     stream.finish().await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod client;
pub mod completion;
pub mod http;
pub mod options;
pub mod sse;
pub mod stream;
pub mod types;
pub mod workflow;

pub use chat::ChatMessageRequest;
pub use client::{Client, ClientConfig, ClientError};
pub use completion::CompletionMessageRequest;
pub use options::TransportOptions;
pub use stream::{EventStream, StreamEnd};
pub use types::{
    ChatCompletionResponse, ChatStreamEvent, File, Metadata, NodeData, ResponseMode,
    RetrieverResource, Usage,
};
pub use workflow::{
    RunWorkflowRequest, WorkflowEventData, WorkflowRunData, WorkflowRunResponse,
    WorkflowStreamEvent,
};

// Re-export for callers that want to drive cancellation themselves.
pub use tokio_util::sync::CancellationToken;
