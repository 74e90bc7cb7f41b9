use dial_chat::config::ClientConfig;
use dial_chat::llm::chat::dial::DialChatClient;
use dial_chat::llm::chat::{ new_client, ChatClient, ContentObserver };
use dial_chat::llm::LlmError;
use dial_chat::models::chat::{ Message, Role };
use httpmock::prelude::*;
use serde_json::json;
use std::sync::{ Arc, Mutex };
use std::time::Duration;

const API_KEY: &str = "TEST";
const COMPLETIONS_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";

fn client_for(server: &MockServer) -> DialChatClient {
    DialChatClient::new(ClientConfig::new(API_KEY, server.base_url())).expect("client builds")
}

fn history() -> Vec<Message> {
    vec![Message::system("You are a helpful assistant."), Message::user("Hello")]
}

fn history_json() -> serde_json::Value {
    json!([
        { "role": "system", "content": "You are a helpful assistant." },
        { "role": "user", "content": "Hello" }
    ])
}

fn recording_observer() -> (ContentObserver, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let observer: ContentObserver = Arc::new(move |text: &str| {
        sink.lock().unwrap().push(text.to_string());
    });
    (observer, seen)
}

#[tokio::test]
async fn completion_returns_first_choice() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST)
            .path(COMPLETIONS_PATH)
            .header("api-key", API_KEY)
            .header("content-type", "application/json")
            .json_body(json!({ "messages": history_json() }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }] }));
    }).await;

    let reply = client_for(&server).get_completion(&history()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(reply, Message::new(Role::Ai, "Hi there"));
}

#[tokio::test]
async fn completion_with_empty_choices_is_a_protocol_error() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(COMPLETIONS_PATH);
        then.status(200).json_body(json!({ "choices": [] }));
    }).await;

    let err = client_for(&server).get_completion(&history()).await.unwrap_err();
    assert!(matches!(err, LlmError::Protocol(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn completion_with_not_found_status_is_a_request_error() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(COMPLETIONS_PATH);
        then.status(404).body("deployment not found");
    }).await;

    let err = client_for(&server).get_completion(&history()).await.unwrap_err();
    match err {
        LlmError::Request { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "deployment not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn completion_mirrors_content_to_observer() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(COMPLETIONS_PATH);
        then.status(200).json_body(json!({ "choices": [{ "message": { "content": "Hi there" } }] }));
    }).await;

    let (observer, seen) = recording_observer();
    let client = client_for(&server).with_observer(observer);
    client.get_completion(&history()).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["Hi there".to_string()]);
}

#[tokio::test]
async fn stream_completion_concatenates_deltas() {
    let server = MockServer::start_async().await;
    let mock = server.mock_async(|when, then| {
        when.method(POST)
            .path(COMPLETIONS_PATH)
            .header("api-key", API_KEY)
            .json_body(json!({ "messages": history_json(), "stream": true }));
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(
                concat!(
                    "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n",
                    "data: [DONE]\n"
                )
            );
    }).await;

    let (observer, seen) = recording_observer();
    let client = client_for(&server).with_observer(observer);
    let reply = client.stream_completion(history()).wait().await.unwrap();

    mock.assert_async().await;
    assert_eq!(reply, Message::new(Role::Ai, "Hello"));
    assert_eq!(seen.lock().unwrap().concat(), "Hello");
}

#[tokio::test]
async fn stream_completion_tolerates_empty_choices() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(COMPLETIONS_PATH);
        then.status(200).body(
            concat!(
                ": keep-alive\n",
                "\n",
                "data: {\"choices\":[]}\n",
                "\n",
                "data: {\"choices\":[null]}\n",
                "\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
                "\n",
                "data: [DONE]\n"
            )
        );
    }).await;

    let reply = client_for(&server).stream_completion(history()).wait().await.unwrap();
    assert_eq!(reply.content(), "ok");
}

#[tokio::test]
async fn stream_completion_returns_before_the_reply_arrives() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(COMPLETIONS_PATH);
        then.status(200)
            .delay(Duration::from_millis(300))
            .body("data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\ndata: [DONE]\n");
    }).await;

    let pending = client_for(&server).stream_completion(history());
    assert!(!pending.is_finished());

    let reply = pending.wait().await.unwrap();
    assert_eq!(reply, Message::assistant("late"));
}

#[tokio::test]
async fn stream_completion_with_malformed_chunk_fails() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(COMPLETIONS_PATH);
        then.status(200).body(
            concat!(
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n",
                "data: {\"choices\":\n",
                "data: [DONE]\n"
            )
        );
    }).await;

    let err = client_for(&server).stream_completion(history()).wait().await.unwrap_err();
    assert!(matches!(err, LlmError::Protocol(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn stream_completion_surfaces_http_failures() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(COMPLETIONS_PATH);
        then.status(500).body("upstream exploded");
    }).await;

    let err = client_for(&server).stream_completion(history()).wait().await.unwrap_err();
    assert!(
        matches!(err, LlmError::Request { status: 500, ref body } if body == "upstream exploded"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let client = DialChatClient::new(ClientConfig::new(API_KEY, "http://127.0.0.1:1")).unwrap();

    let err = client.get_completion(&history()).await.unwrap_err();
    assert!(matches!(err, LlmError::Transport(_)), "unexpected error: {err:?}");

    let err = client.stream_completion(history()).wait().await.unwrap_err();
    assert!(matches!(err, LlmError::Transport(_)), "unexpected error: {err:?}");
}

#[test]
fn empty_credential_fails_at_construction() {
    let result = new_client(&ClientConfig::new("", "http://127.0.0.1:1"), None);
    assert!(matches!(result, Err(LlmError::Configuration(_))));

    let result = new_client(&ClientConfig::new(" \t", "http://127.0.0.1:1"), None);
    assert!(matches!(result, Err(LlmError::Configuration(_))));
}
