//! TranslatorClient against a mock OpenAI-compatible server.

use gpt_ai_translator::{Error, TranslatorClient};
use mockito::{Matcher, Server};
use serde_json::json;

fn client(base_url: &str) -> TranslatorClient {
    TranslatorClient::builder()
        .api_key("sk-test")
        .base_url(base_url)
        .model("test-model")
        .temperature(0.2)
        .build()
        .expect("client builds")
}

#[tokio::test]
async fn test_translate_sends_instructions_and_reads_output() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/responses")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "input": "早安",
            "instructions": "Translate the provided sentence into the English, outputting only the translation.",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "output": [{
                    "type": "message",
                    "content": [{"type": "output_text", "text": "Good morning"}]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let text = client(&server.url()).translate("早安", "English").await.unwrap();
    assert_eq!(text, "Good morning");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_synthesize_returns_audio_bytes() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/audio/speech")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini-tts",
            "voice": "alloy",
            "input": "hello"
        })))
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body(b"ID3fake-mp3")
        .create_async()
        .await;

    let audio = client(&server.url()).synthesize("hello").await.unwrap();
    assert_eq!(&audio[..], b"ID3fake-mp3");
}

#[tokio::test]
async fn test_transcribe_reads_text() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/audio/transcriptions")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"text":"今天天氣很好"}"#)
        .create_async()
        .await;

    let text = client(&server.url())
        .transcribe(vec![0u8; 16], "voice.m4a")
        .await
        .unwrap();
    assert_eq!(text, "今天天氣很好");
}

#[tokio::test]
async fn test_api_error_carries_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/responses")
        .with_status(429)
        .with_body(r#"{"error":{"message":"rate limited"}}"#)
        .create_async()
        .await;

    match client(&server.url()).translate("hi", "Thai").await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 429);
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let err = client("http://127.0.0.1:1")
        .synthesize("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network { .. }));
}
