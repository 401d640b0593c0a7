//! End-to-end tests against a mock HTTP server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dify_client::{
    ChatMessageRequest, Client, ClientConfig, ClientError, CompletionMessageRequest,
    RunWorkflowRequest, StreamEnd,
};

/// Install a subscriber so the client's `tracing` output is visible
/// when running with `RUST_LOG=dify_client=debug`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(server: &MockServer) -> Client {
    init_tracing();
    Client::new(ClientConfig {
        base_url: server.uri(),
        api_key: "app-test-key".to_string(),
    })
    .expect("client config is valid")
}

#[tokio::test]
async fn blocking_chat_message_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(header("authorization", "Bearer app-test-key"))
        .and(body_partial_json(json!({
            "query": "hi",
            "user": "u1",
            "response_mode": "blocking"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": "m1",
            "conversation_id": "c1",
            "mode": "chat",
            "answer": "hello there",
            "metadata": {
                "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
            },
            "created_at": 1705395332
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = ChatMessageRequest {
        query: "hi".to_string(),
        user: "u1".to_string(),
        ..Default::default()
    };
    let response = client.create_chat_message(&request).await.unwrap();

    assert_eq!(response.answer, "hello there");
    assert_eq!(response.conversation_id, "c1");
    assert_eq!(response.metadata.usage.total_tokens, 5);
}

#[tokio::test]
async fn blocking_completion_message_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completion-messages"))
        .and(body_partial_json(json!({"response_mode": "blocking"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": "m1",
            "mode": "completion",
            "answer": "done",
            "created_at": 1705395332
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut request = CompletionMessageRequest {
        user: "u1".to_string(),
        ..Default::default()
    };
    request
        .inputs
        .insert("topic".to_string(), json!("weather"));
    let response = client.create_completion_message(&request).await.unwrap();

    assert_eq!(response.answer, "done");
}

#[tokio::test]
async fn blocking_workflow_run_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/workflows/run"))
        .and(body_partial_json(json!({"response_mode": "blocking"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflow_run_id": "w1",
            "task_id": "t1",
            "data": {
                "id": "w1",
                "workflow_id": "wf",
                "status": "succeeded",
                "outputs": {"answer": "42"},
                "elapsed_time": 1.5,
                "total_tokens": 10,
                "total_steps": 2,
                "created_at": 1705395332,
                "finished_at": 1705395334
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .run_workflow(&RunWorkflowRequest {
            user: "u1".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(response.workflow_run_id, "w1");
    assert_eq!(response.data.status, "succeeded");
}

#[tokio::test]
async fn api_errors_are_structured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": 400,
            "code": "invalid_param",
            "message": "query is required"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .create_chat_message(&ChatMessageRequest::default())
        .await;

    match result {
        Err(ClientError::Api {
            status,
            code,
            message,
        }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(code.as_deref(), Some("invalid_param"));
            assert_eq!(message, "query is required");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn streaming_chat_message_end_to_end() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"event\":\"message\",\"task_id\":\"t1\",\"answer\":\"Hel\"}\n\n",
        "data: {\"event\":\"message\",\"task_id\":\"t1\",\"answer\":\"lo\"}\n\n",
        "data: {\"event\":\"message_end\",\"task_id\":\"t1\"}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .and(body_partial_json(json!({"response_mode": "streaming"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = ChatMessageRequest {
        query: "hi".to_string(),
        user: "u1".to_string(),
        ..Default::default()
    };
    let mut stream = client.create_chat_message_stream(&request).await.unwrap();

    let mut answer = String::new();
    let mut last_event = String::new();
    while let Some(event) = stream.recv().await {
        answer.push_str(&event.answer);
        last_event = event.event;
    }

    assert_eq!(answer, "Hello");
    assert_eq!(last_event, "message_end");
    assert_eq!(stream.end(), Some(StreamEnd::Completed));
}

#[tokio::test]
async fn streaming_workflow_run_end_to_end() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"event\":\"workflow_started\",\"task_id\":\"t1\",\"workflow_run_id\":\"w1\",",
        "\"data\":{\"id\":\"w1\",\"sequence_number\":1}}\n\n",
        "data: {\"event\":\"node_finished\",\"task_id\":\"t1\",\"workflow_run_id\":\"w1\",",
        "\"data\":{\"id\":\"n1\",\"node_id\":\"start\",\"status\":\"succeeded\"}}\n\n",
        "data: {\"event\":\"workflow_finished\",\"task_id\":\"t1\",\"workflow_run_id\":\"w1\",",
        "\"data\":{\"id\":\"w1\",\"status\":\"succeeded\",\"outputs\":{\"answer\":\"42\"}}}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/workflows/run"))
        .and(body_partial_json(json!({"response_mode": "streaming"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut stream = client
        .run_workflow_stream(&RunWorkflowRequest {
            user: "u1".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Some(event) = stream.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event, "workflow_started");
    assert_eq!(events[1].data.node_id, "start");
    assert_eq!(events[2].event, "workflow_finished");
    assert_eq!(
        events[2].data.outputs.as_ref().unwrap()["answer"],
        json!("42")
    );
    assert_eq!(stream.end(), Some(StreamEnd::Completed));
}

#[tokio::test]
async fn streaming_call_rejects_error_status_before_spawning() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat-messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "unauthorized",
            "message": "invalid api key"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .create_chat_message_stream(&ChatMessageRequest::default())
        .await;

    assert!(matches!(
        result,
        Err(ClientError::Api { status, .. }) if status.as_u16() == 401
    ));
}
