pub mod google;

use crate::domain::models::TranslatorBox;

pub struct TranslatorManager {}

impl TranslatorManager {
    pub fn get() -> TranslatorBox {
        return Box::<google::GoogleTranslate>::default();
    }
}
