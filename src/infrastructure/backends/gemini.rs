#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AssistantError;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendResponse;
use crate::domain::models::ChatMessage;
use crate::domain::models::ChatRole;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    contents: Vec<Content>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Gemini has no system role. The system instruction is folded into the
/// first user turn, and consecutive turns from the same side are merged since
/// the API expects user and model turns to alternate.
fn to_contents(messages: Vec<ChatMessage>) -> Vec<Content> {
    let mut contents: Vec<Content> = vec![];
    let mut pending_system: Vec<String> = vec![];

    for message in messages {
        let role = match message.role {
            ChatRole::System => {
                pending_system.push(message.content);
                continue;
            }
            ChatRole::Human => "user",
            ChatRole::Assistant => "model",
        };

        let mut text = message.content;
        if role == "user" && !pending_system.is_empty() {
            pending_system.push(text);
            text = pending_system.join("\n\n");
            pending_system.clear();
        }

        if let Some(last) = contents.last_mut() {
            if last.role == role {
                last.parts.push(Part { text: Some(text) });
                continue;
            }
        }

        contents.push(Content {
            role: role.to_string(),
            parts: vec![Part { text: Some(text) }],
        });
    }

    if !pending_system.is_empty() {
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: Some(pending_system.join("\n\n")),
            }],
        });
    }

    return contents;
}

fn normalize(res: GenerateContentResponse) -> Result<BackendResponse, AssistantError> {
    let candidate = match res.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            return Err(AssistantError::UnexpectedResponseType(
                "Gemini returned no candidates".to_string(),
            ))
        }
    };

    let texts = candidate
        .content
        .map(|content| return content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| return part.text)
        .collect::<Vec<String>>();

    if texts.is_empty() {
        return Err(AssistantError::UnexpectedResponseType(format!(
            "Gemini candidate has no text content (finish reason: {})",
            candidate.finish_reason.unwrap_or_else(|| return "unknown".to_string())
        )));
    }

    return Ok(BackendResponse {
        content: texts.join(""),
    });
}

pub struct Gemini {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        let mut model = Config::get(ConfigKey::Model);
        if model.is_empty() {
            model = DEFAULT_MODEL.to_string();
        }

        return Gemini {
            url: "https://generativelanguage.googleapis.com".to_string(),
            token: Config::get(ConfigKey::GeminiToken),
            model,
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini token is not defined");
        }

        let url = format!(
            "{url}/v1beta/models/{model}?key={key}",
            url = self.url,
            model = self.model,
            key = self.token
        );

        let res = reqwest::Client::new()
            .get(&url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "Gemini is not reachable");
                bail!("Gemini is not reachable");
            }
        };

        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!("Gemini health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, messages: Vec<ChatMessage>) -> Result<BackendResponse> {
        let req = CompletionRequest {
            contents: to_contents(messages),
        };

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1beta/models/{model}:generateContent?key={key}",
                url = self.url,
                model = self.model,
                key = self.token,
            ))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to make completion request to Gemini");
            bail!(format!(
                "Failed to make completion request to Gemini, {status}"
            ));
        }

        let body = res.text().await?;
        let ores: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| return AssistantError::UnexpectedResponseType(err.to_string()))?;
        tracing::debug!(body = ?ores, "Completion response");

        return Ok(normalize(ores)?);
    }
}
