use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use textgen_gateway::error::ErrorKind;
use textgen_gateway::model::{
    cloud::CloudBackend, ollama::OllamaBackend, ChatBackend, ChatCall, ChatMessage, GenerateBackend,
    GenerateCall,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generate_call(prompt: &str) -> GenerateCall {
    GenerateCall { model: "qwen:0.5b".into(), prompt: prompt.into() }
}

fn chat_call(prompt: &str) -> ChatCall {
    ChatCall { model: "gpt-oss:120b".into(), messages: vec![ChatMessage::user(prompt)] }
}

/// An address nothing is listening on.
async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn client_with_timeout(ms: u64) -> reqwest::Client {
    reqwest::Client::builder().timeout(Duration::from_millis(ms)).build().unwrap()
}

/// Serves one response whose headers promise more body than is ever sent.
async fn stalled_body_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = sock.read(&mut buf).await;
        let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n";
        sock.write_all(head.as_bytes()).await.unwrap();
        sock.write_all(b"{\"resp").await.unwrap();
        sock.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn local_sends_non_streaming_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({"model": "qwen:0.5b", "prompt": "Hello world", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hello world, friend"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), server.uri());
    let text = backend.generate(generate_call("Hello world")).await.unwrap();
    assert_eq!(text, "Hello world, friend");
}

#[tokio::test]
async fn local_missing_response_is_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), format!("{}/", server.uri()));
    assert_eq!(backend.generate(generate_call("x")).await.unwrap(), "");
}

#[tokio::test]
async fn local_error_status_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "model 'qwen:0.5b' not found"})))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), server.uri());
    let err = backend.generate(generate_call("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    assert!(err.message().contains("500"), "{err}");
    assert!(err.message().contains("not found"), "{err}");
}

#[tokio::test]
async fn local_malformed_body_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), server.uri());
    let err = backend.generate(generate_call("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
}

#[tokio::test]
async fn local_connection_refused_is_unreachable() {
    let backend = OllamaBackend::new(reqwest::Client::new(), closed_port_url().await);
    let err = backend.generate(generate_call("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
    assert!(err.message().contains("is it running?"), "{err}");
}

#[tokio::test]
async fn cloud_sends_bearer_and_single_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("authorization", "Bearer secret-key"))
        .and(body_json(json!({
            "model": "gpt-oss:120b",
            "messages": [{"role": "user", "content": "Hello"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-oss:120b",
            "message": {"role": "assistant", "content": "Hi there"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = CloudBackend::new(reqwest::Client::new(), server.uri(), "secret-key");
    assert_eq!(backend.chat(chat_call("Hello")).await.unwrap(), "Hi there");
}

#[tokio::test]
async fn cloud_rejection_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .mount(&server)
        .await;

    let backend = CloudBackend::new(reqwest::Client::new(), server.uri(), "bad-key");
    let err = backend.chat(chat_call("Hello")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    assert!(err.message().contains("unauthorized"), "{err}");
}

#[tokio::test]
async fn cloud_reply_without_content_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&server)
        .await;

    let backend = CloudBackend::new(reqwest::Client::new(), server.uri(), "k");
    let err = backend.chat(chat_call("Hello")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
}

#[tokio::test]
async fn cloud_connection_refused_is_unreachable() {
    let backend = CloudBackend::new(reqwest::Client::new(), closed_port_url().await, "k");
    let err = backend.chat(chat_call("Hello")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
}

#[tokio::test]
async fn cloud_debug_redacts_key() {
    let backend = CloudBackend::new(reqwest::Client::new(), "https://example.test", "secret-key");
    assert!(!format!("{backend:?}").contains("secret-key"));
}

#[tokio::test]
async fn local_slow_response_times_out_as_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "too late"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(client_with_timeout(300), server.uri());
    let err = backend.generate(generate_call("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
    assert!(err.message().contains("timed out"), "{err}");
}

#[tokio::test]
async fn local_timeout_while_reading_body_is_unreachable() {
    let backend = OllamaBackend::new(client_with_timeout(300), stalled_body_url().await);
    let err = backend.generate(generate_call("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable, "{err}");
}

#[tokio::test]
async fn cloud_timeout_while_reading_body_is_unreachable() {
    let backend = CloudBackend::new(client_with_timeout(300), stalled_body_url().await, "k");
    let err = backend.chat(chat_call("Hello")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable, "{err}");
}
