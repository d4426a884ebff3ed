use serde::{Deserialize, Serialize};

use crate::utils::text::{char_len, word_count};

/// Character and word counts shown under the optimize boxes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub char_count: usize,
    pub word_count: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            char_count: char_len(text),
            word_count: word_count(text),
        }
    }
}
