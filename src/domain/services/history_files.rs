#[cfg(test)]
#[path = "history_files_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::History;
use crate::domain::models::AssistantError;
use crate::domain::models::HistoryRecord;

pub const DEFAULT_HISTORY_FILE: &str = "chat_history.json";

/// Reads and writes chat history files.
pub struct HistoryFiles {}

impl HistoryFiles {
    pub async fn export(file_path: &path::Path, history: &History) -> Result<()> {
        let payload = history.to_json()?;

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(file_path).await?;
        file.write_all(payload.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            path = %file_path.display(),
            turns = history.len(),
            "Exported chat history"
        );

        return Ok(());
    }

    pub async fn import(file_path: &path::Path) -> Result<Vec<HistoryRecord>, AssistantError> {
        let payload = fs::read_to_string(file_path).await.map_err(|err| {
            return AssistantError::HistoryLoad(format!("{}: {err}", file_path.display()));
        })?;

        let records = History::parse_json(&payload)?;

        tracing::debug!(
            path = %file_path.display(),
            records = records.len(),
            "Imported chat history"
        );

        return Ok(records);
    }
}
