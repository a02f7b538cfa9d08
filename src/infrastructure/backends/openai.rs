#[cfg(test)]
#[path = "openai_test.rs"]
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

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    role: String,
    content: String,
}

impl From<ChatMessage> for MessageRequest {
    fn from(message: ChatMessage) -> MessageRequest {
        let role = match message.role {
            ChatRole::System => "system",
            ChatRole::Human => "user",
            ChatRole::Assistant => "assistant",
        };

        return MessageRequest {
            role: role.to_string(),
            content: message.content,
        };
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<MessageRequest>,
    stream: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: CompletionMessageResponse,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoiceResponse>,
}

pub struct OpenAI {
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for OpenAI {
    fn default() -> OpenAI {
        let mut model = Config::get(ConfigKey::Model);
        if model.is_empty() {
            model = DEFAULT_MODEL.to_string();
        }

        return OpenAI {
            url: Config::get(ConfigKey::OpenAiURL),
            token: Config::get(ConfigKey::OpenAiToken),
            model,
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for OpenAI {
    fn name(&self) -> BackendName {
        return BackendName::OpenAI;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("OpenAI URL is not defined");
        }
        if self.token.is_empty() {
            bail!("OpenAI token is not defined");
        }

        // The official API answers its index with a 404 or a 418, only proxies
        // are worth checking.
        if self.url == "https://api.openai.com" {
            return Ok(());
        }

        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "OpenAI is not reachable");
                bail!("OpenAI is not reachable");
            }
        };

        if status >= 400 {
            tracing::error!(status = status, "OpenAI health check failed");
            bail!("OpenAI health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion(&self, messages: Vec<ChatMessage>) -> Result<BackendResponse> {
        let req = CompletionRequest {
            model: self.model.to_string(),
            messages: messages.into_iter().map(MessageRequest::from).collect(),
            stream: false,
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/chat/completions", url = self.url))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Failed to make completion request to OpenAI");
            bail!(format!(
                "Failed to make completion request to OpenAI, {status}"
            ));
        }

        let body = res.text().await?;
        let ores: CompletionResponse = serde_json::from_str(&body)
            .map_err(|err| return AssistantError::UnexpectedResponseType(err.to_string()))?;
        tracing::debug!(body = ?ores, "Completion response");

        let content = ores
            .choices
            .into_iter()
            .next()
            .and_then(|choice| return choice.message.content);

        match content {
            Some(content) => return Ok(BackendResponse { content }),
            None => {
                return Err(AssistantError::UnexpectedResponseType(
                    "OpenAI returned no message content".to_string(),
                )
                .into())
            }
        }
    }
}
