#[cfg(test)]
#[path = "google_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Translator;
use crate::domain::models::AUTO_LANGUAGE_CODE;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TranslateRequest {
    q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    target: String,
    format: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DetectRequest {
    q: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TranslationList {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Detection {
    language: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DetectionList {
    #[serde(default)]
    detections: Vec<Vec<Detection>>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Google Cloud Translation, basic edition (v2).
pub struct GoogleTranslate {
    url: String,
    token: String,
}

impl Default for GoogleTranslate {
    fn default() -> GoogleTranslate {
        return GoogleTranslate {
            url: Config::get(ConfigKey::TranslatorURL),
            token: Config::get(ConfigKey::TranslatorToken),
        };
    }
}

impl GoogleTranslate {
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        if self.token.is_empty() {
            bail!("Translator token is not defined");
        }

        let res = reqwest::Client::new()
            .post(format!("{url}{path}", url = self.url))
            .query(&[("key", &self.token)])
            .json(body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, path = path, "Translation request failed");
            bail!(format!("Translation request failed, {status}"));
        }

        let parsed = res.json::<ApiResponse<T>>().await?;
        return Ok(parsed.data);
    }
}

#[async_trait]
impl Translator for GoogleTranslate {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let source = if source == AUTO_LANGUAGE_CODE {
            None
        } else {
            Some(source.to_string())
        };

        let req = TranslateRequest {
            q: text.to_string(),
            source,
            target: target.to_string(),
            format: "text".to_string(),
        };

        let res: TranslationList = self.post("/language/translate/v2", &req).await?;
        match res.translations.into_iter().next() {
            Some(translation) => return Ok(translation.translated_text),
            None => bail!("Translation response had no translations"),
        }
    }

    async fn detect(&self, text: &str) -> Result<String> {
        let req = DetectRequest {
            q: text.to_string(),
        };

        let res: DetectionList = self.post("/language/translate/v2/detect", &req).await?;
        let language = res
            .detections
            .into_iter()
            .next()
            .and_then(|detections| return detections.into_iter().next())
            .map(|detection| return detection.language);

        match language {
            Some(language) => return Ok(language),
            None => bail!("Detection response had no detections"),
        }
    }
}
