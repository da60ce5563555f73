//! Common types used across the platform

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Unicode block used for Hindi (Devanagari)
pub const DEVANAGARI: RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Supported chat languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// Detect the language of a message from its script
    ///
    /// Any Devanagari character marks the message as Hindi.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| DEVANAGARI.contains(&c)) {
            Language::Hindi
        } else {
            Language::English
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }

    /// English name, used in prompts
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }
}
