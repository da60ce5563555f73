//! Farming chat assistant
//!
//! Replies come from the configured LLM when available. Without one, or when
//! the call fails, an ordered keyword table answers instead. Keywords match
//! English and Hindi (Devanagari) text.

use shared::Language;

use crate::external::llm::{ChatMessage, LlmClient};

/// Reply to an empty message
pub const EMPTY_MESSAGE_REPLY: &str = "Please type a question!";

/// System prompt sent with every LLM request
pub const SYSTEM_CONTEXT: &str = "You are FarmGuard AI, a multilingual (Hindi + English) agriculture assistant. Help with crops, disease detection, fertilizers, drone setup, irrigation, etc.";

/// Reply when no keyword matches
pub const DEFAULT_REPLY: &str = "🤖 Ask me about crops, disease, fertilizers or water.";

/// A fallback rule: any trigger found in the message selects the reply
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub triggers: &'static [&'static str],
    pub reply: &'static str,
}

/// Fallback rules, checked in order; the first match wins.
///
/// "खाद" (fertilizer) also appears in the crops rule, which is therefore
/// unreachable through it.
pub const RULES: &[KeywordRule] = &[
    KeywordRule {
        triggers: &["fertilizer", "खाद"],
        reply: "🌿 Use balanced NPK according to crop type.",
    },
    KeywordRule {
        triggers: &["crops", "खाद"],
        reply: "🌿Click on the crop type to know more about the crops",
    },
    KeywordRule {
        triggers: &["disease", "रोग"],
        reply: "🦠 Use Disease Detection tool and upload a leaf image.",
    },
    KeywordRule {
        triggers: &["weather", "मौसम"],
        reply: "🌦 Check Weather Forecast in dashboard.",
    },
];

/// Keyword reply for a message
pub fn offline_reply(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.triggers.iter().any(|t| lowered.contains(t)))
        .map(|rule| rule.reply)
        .unwrap_or(DEFAULT_REPLY)
}

/// Chat service
#[derive(Clone)]
pub struct ChatService {
    llm: Option<LlmClient>,
}

impl ChatService {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Answer a user message
    pub async fn reply(&self, message: &str) -> String {
        let message = message.trim();
        if message.is_empty() {
            return EMPTY_MESSAGE_REPLY.to_string();
        }

        let language = Language::detect(message);
        tracing::debug!("Chat message language: {}", language.code());

        if let Some(llm) = &self.llm {
            let messages = vec![
                ChatMessage::system(format!(
                    "{} Reply in {}.",
                    SYSTEM_CONTEXT,
                    language.name()
                )),
                ChatMessage::user(message),
            ];

            match llm.complete(messages).await {
                Ok(reply) => return reply,
                Err(e) => {
                    tracing::warn!("LLM unavailable, using keyword replies: {}", e);
                }
            }
        }

        offline_reply(message).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_in_order() {
        assert_eq!(
            offline_reply("Which fertilizer for wheat?"),
            "🌿 Use balanced NPK according to crop type."
        );
        assert_eq!(
            offline_reply("show me crops"),
            "🌿Click on the crop type to know more about the crops"
        );
        assert_eq!(
            offline_reply("My plant has a DISEASE"),
            "🦠 Use Disease Detection tool and upload a leaf image."
        );
        assert_eq!(
            offline_reply("Weather tomorrow?"),
            "🌦 Check Weather Forecast in dashboard."
        );
        assert_eq!(offline_reply("hello"), DEFAULT_REPLY);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            offline_reply("weather and fertilizer"),
            "🌿 Use balanced NPK according to crop type."
        );
        assert_eq!(
            offline_reply("disease in my crops"),
            "🌿Click on the crop type to know more about the crops"
        );
    }

    #[test]
    fn test_hindi_triggers() {
        assert_eq!(
            offline_reply("गेहूं के लिए कौन सी खाद?"),
            "🌿 Use balanced NPK according to crop type."
        );
        assert_eq!(
            offline_reply("पत्ते में रोग है"),
            "🦠 Use Disease Detection tool and upload a leaf image."
        );
        assert_eq!(
            offline_reply("आज मौसम कैसा है"),
            "🌦 Check Weather Forecast in dashboard."
        );
    }

    #[test]
    fn test_crops_rule_never_reached_through_hindi_trigger() {
        let hindi_in_both = RULES[1]
            .triggers
            .iter()
            .filter(|t| RULES[0].triggers.contains(*t))
            .count();
        assert_eq!(hindi_in_both, 1);
    }

    #[tokio::test]
    async fn test_blank_message() {
        let service = ChatService::new(None);
        assert_eq!(service.reply("").await, EMPTY_MESSAGE_REPLY);
        assert_eq!(service.reply("   \n\t").await, EMPTY_MESSAGE_REPLY);
        assert!(!service.llm_enabled());
    }
}
