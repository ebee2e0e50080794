use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::ChatMessage;

/// Sentinel the model uses for understanding fields it has not pinned
/// down yet. Merging never writes this value over a real one.
pub const NOT_YET_CLEAR: &str = "Not yet clear";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserIntent {
    OptimizeExisting,
    CreateNew,
    Unclear,
}

impl UserIntent {
    /// Total mapping from the model's intent label. Anything unrecognized
    /// falls back to `Unclear` rather than propagating a raw label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "optimize_existing" => UserIntent::OptimizeExisting,
            "create_new" => UserIntent::CreateNew,
            _ => UserIntent::Unclear,
        }
    }
}

impl fmt::Display for UserIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIntent::OptimizeExisting => write!(f, "optimize_existing"),
            UserIntent::CreateNew => write!(f, "create_new"),
            UserIntent::Unclear => write!(f, "unclear"),
        }
    }
}

/// What has been learned about the user's prompt so far. Fields only
/// ever move from unknown to known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextUnderstanding {
    pub context: String,
    pub goal: String,
    pub format: String,
    pub ai_role: String,
    pub additional_insights: String,
}

impl Default for ContextUnderstanding {
    fn default() -> Self {
        Self {
            context: NOT_YET_CLEAR.to_string(),
            goal: NOT_YET_CLEAR.to_string(),
            format: NOT_YET_CLEAR.to_string(),
            ai_role: NOT_YET_CLEAR.to_string(),
            additional_insights: String::new(),
        }
    }
}

impl ContextUnderstanding {
    /// Fold one turn's parsed analysis into the accumulated
    /// understanding. A field is overwritten only when the parsed value
    /// is non-empty and not the sentinel, so understanding never
    /// regresses to unknown.
    pub fn merge(&mut self, parsed: &HashMap<String, String>) {
        Self::apply(&mut self.context, parsed.get("extracted_context"));
        Self::apply(&mut self.goal, parsed.get("extracted_goal"));
        Self::apply(&mut self.format, parsed.get("extracted_format"));
        Self::apply(&mut self.ai_role, parsed.get("ai_role"));
        Self::apply(&mut self.additional_insights, parsed.get("additional_insights"));
    }

    fn apply(slot: &mut String, value: Option<&String>) {
        if let Some(value) = value {
            if !value.is_empty() && value != NOT_YET_CLEAR {
                *slot = value.clone();
            }
        }
    }
}

/// One optimization session's worth of conversation. Message history is
/// append-only within a refinement loop; a fresh session gets a fresh
/// state.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub context_understanding: ContextUnderstanding,
    pub original_input: String,
    pub user_intent: UserIntent,
}

impl ConversationState {
    pub fn new(original_input: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            context_understanding: ContextUnderstanding::default(),
            original_input: original_input.into(),
            user_intent: UserIntent::Unclear,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }
}

/// Output of a finalize pass. Empty strings mean the model's response
/// could not be parsed; finalization never fails outright.
#[derive(Debug, Clone, Default)]
pub struct OptimizationResult {
    pub optimized_prompt: String,
    pub improvements: String,
    /// Formatted test-case block, present once test generation has run.
    /// Folded into any later refinement context.
    pub test_cases: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub scenario: String,
    pub input: String,
    pub expected_behavior: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parsed(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn intent_label_mapping_is_total() {
        assert_eq!(UserIntent::from_label("optimize_existing"), UserIntent::OptimizeExisting);
        assert_eq!(UserIntent::from_label("create_new"), UserIntent::CreateNew);
        assert_eq!(UserIntent::from_label("unclear"), UserIntent::Unclear);
        assert_eq!(UserIntent::from_label(""), UserIntent::Unclear);
        assert_eq!(UserIntent::from_label("OPTIMIZE_EXISTING"), UserIntent::Unclear);
        assert_eq!(UserIntent::from_label("something else"), UserIntent::Unclear);
    }

    #[test]
    fn merge_fills_unknown_fields() {
        let mut understanding = ContextUnderstanding::default();
        understanding.merge(&parsed(&[
            ("extracted_context", "customer support emails"),
            ("extracted_goal", "draft polite replies"),
        ]));

        assert_eq!(understanding.context, "customer support emails");
        assert_eq!(understanding.goal, "draft polite replies");
        assert_eq!(understanding.format, NOT_YET_CLEAR);
        assert_eq!(understanding.ai_role, NOT_YET_CLEAR);
    }

    #[test]
    fn merge_never_regresses_to_unknown() {
        let mut understanding = ContextUnderstanding::default();
        understanding.merge(&parsed(&[("extracted_goal", "summarize articles")]));

        // Sentinel and empty values leave the learned value alone.
        understanding.merge(&parsed(&[("extracted_goal", NOT_YET_CLEAR)]));
        assert_eq!(understanding.goal, "summarize articles");

        understanding.merge(&parsed(&[("extracted_goal", "")]));
        assert_eq!(understanding.goal, "summarize articles");
    }

    #[test]
    fn merge_refines_known_values() {
        let mut understanding = ContextUnderstanding::default();
        understanding.merge(&parsed(&[("ai_role", "Task executor")]));
        understanding.merge(&parsed(&[("ai_role", "Playing a pirate captain")]));
        assert_eq!(understanding.ai_role, "Playing a pirate captain");
    }

    #[test]
    fn fresh_state_has_no_history() {
        let state = ConversationState::new("make this prompt better");
        assert!(state.messages.is_empty());
        assert_eq!(state.original_input, "make this prompt better");
        assert_eq!(state.user_intent, UserIntent::Unclear);
        assert_eq!(state.context_understanding, ContextUnderstanding::default());
    }
}
