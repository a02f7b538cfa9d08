use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::to_contents;
use super::Gemini;
use crate::domain::models::AssistantError;
use crate::domain::models::Backend;
use crate::domain::models::ChatMessage;
use crate::domain::models::ChatRole;

impl Gemini {
    fn with_url(url: String) -> Gemini {
        return Gemini {
            url,
            token: "abc".to_string(),
            model: "model-1".to_string(),
            timeout: "200".to_string(),
        };
    }
}

fn assistant_message(content: &str) -> ChatMessage {
    return ChatMessage {
        role: ChatRole::Assistant,
        content: content.to_string(),
    };
}

#[test]
fn it_folds_system_instruction_into_first_user_turn() -> Result<()> {
    let contents = to_contents(vec![
        ChatMessage::system("You are a legal assistant."),
        ChatMessage::human("Summarize this case."),
        assistant_message("The appeal was denied."),
        ChatMessage::human("Why?"),
    ]);

    insta::assert_snapshot!(serde_json::to_string(&contents)?, @r###"[{"role":"user","parts":[{"text":"You are a legal assistant.\n\nSummarize this case."}]},{"role":"model","parts":[{"text":"The appeal was denied."}]},{"role":"user","parts":[{"text":"Why?"}]}]"###);

    return Ok(());
}

#[test]
fn it_merges_consecutive_turns_from_the_same_side() {
    let contents = to_contents(vec![
        ChatMessage::system("System"),
        ChatMessage::human("First"),
        ChatMessage::human("Second"),
    ]);

    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].role, "user");
    assert_eq!(contents[0].parts.len(), 2);
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/model-1?key=abc")
        .with_status(200)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/model-1?key=abc")
        .with_status(500)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks_without_token() {
    let mut backend = Gemini::with_url("http://localhost:1".to_string());
    backend.token = "".to_string();

    let res = backend.health_check().await;

    assert_eq!(res.unwrap_err().to_string(), "Gemini token is not defined");
}

#[tokio::test]
async fn it_gets_completions() -> Result<()> {
    let body = json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": "The court " }, { "text": "affirmed." }]
            },
            "finishReason": "STOP"
        }]
    });

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .match_body(Matcher::Json(json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": "You are a legal assistant.\n\nCase text" }]
            }]
        })))
        .with_status(200)
        .with_body(body.to_string())
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .get_completion(vec![
            ChatMessage::system("You are a legal assistant."),
            ChatMessage::human("Case text"),
        ])
        .await?;

    mock.assert();
    assert_eq!(res.content, "The court affirmed.");

    return Ok(());
}

#[tokio::test]
async fn it_fails_completions_on_error_status() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(403)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .get_completion(vec![ChatMessage::human("Case text")])
        .await;

    mock.assert();
    let err = res.unwrap_err();
    assert!(err.downcast_ref::<AssistantError>().is_none());
    assert_eq!(
        err.to_string(),
        "Failed to make completion request to Gemini, 403"
    );
}

#[tokio::test]
async fn it_fails_completions_without_candidates() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(200)
        .with_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string())
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .get_completion(vec![ChatMessage::human("Case text")])
        .await;

    mock.assert();
    assert!(matches!(
        res.unwrap_err().downcast_ref::<AssistantError>(),
        Some(AssistantError::UnexpectedResponseType(_))
    ));
}

#[tokio::test]
async fn it_fails_completions_on_unexpected_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(200)
        .with_body("<html>Service unavailable</html>")
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .get_completion(vec![ChatMessage::human("Case text")])
        .await;

    mock.assert();
    assert!(matches!(
        res.unwrap_err().downcast_ref::<AssistantError>(),
        Some(AssistantError::UnexpectedResponseType(_))
    ));
}
