pub mod gemini;
pub mod openai;

use anyhow::Result;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<BackendBox> {
        match name {
            BackendName::Gemini => return Ok(Box::<gemini::Gemini>::default()),
            BackendName::OpenAI => return Ok(Box::<openai::OpenAI>::default()),
        }
    }
}
