use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendResponse;
use crate::domain::models::ChatMessage;
use crate::domain::models::Translator;

pub type Requests = Arc<Mutex<Vec<Vec<ChatMessage>>>>;

/// Chat backend answering from a script and recording every request.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String>>>,
    pub requests: Requests,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String>>) -> ScriptedBackend {
        return ScriptedBackend {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Arc::new(Mutex::new(vec![])),
        };
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    async fn get_completion(&self, messages: Vec<ChatMessage>) -> Result<BackendResponse> {
        self.requests.lock().unwrap().push(messages);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| return Ok("No further replies scripted.".to_string()))?;

        return Ok(BackendResponse { content: reply });
    }
}

pub type TranslationCalls = Arc<Mutex<Vec<(String, String, String)>>>;

/// Translator tagging text with its target language. Fails on the call
/// index given to `failing_on`.
pub struct TaggingTranslator {
    fail_on: Option<usize>,
    detected: Result<String, String>,
    pub calls: TranslationCalls,
}

impl TaggingTranslator {
    pub fn new() -> TaggingTranslator {
        return TaggingTranslator {
            fail_on: None,
            detected: Ok("en".to_string()),
            calls: Arc::new(Mutex::new(vec![])),
        };
    }

    pub fn failing_on(call: usize) -> TaggingTranslator {
        let mut translator = TaggingTranslator::new();
        translator.fail_on = Some(call);
        return translator;
    }

    pub fn detecting(code: &str) -> TaggingTranslator {
        let mut translator = TaggingTranslator::new();
        translator.detected = Ok(code.to_string());
        return translator;
    }

    pub fn failing_detection() -> TaggingTranslator {
        let mut translator = TaggingTranslator::new();
        translator.detected = Err("detection quota exceeded".to_string());
        return translator;
    }
}

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        let idx = calls.len();
        calls.push((text.to_string(), source.to_string(), target.to_string()));

        if self.fail_on == Some(idx) {
            return Err(anyhow!("Too many requests"));
        }

        return Ok(format!("<{target}>{text}"));
    }

    async fn detect(&self, _text: &str) -> Result<String> {
        return self.detected.clone().map_err(|err| return anyhow!(err));
    }
}
