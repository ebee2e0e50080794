// Library exports for the Promptforge CLI components

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod optimizer;
pub mod output;
pub mod parser;
pub mod prompts;
pub mod state;

// Re-export commonly used types
pub use api::{ApiClient, ChatMessage, ModelClient, Usage, UsageTracker};
pub use app::{App, MenuChoice};
pub use config::{AiConfig, Config};
pub use error::ModelError;
pub use input::{InputEvent, InputSource, LineEditor, ScriptedInput};
pub use optimizer::LoopOutcome;
pub use output::OutputHandler;
pub use state::{
    ContextUnderstanding, ConversationState, OptimizationResult, TestCase, UserIntent,
};
