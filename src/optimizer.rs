//! The conversation engine: intent classification, the turn-by-turn
//! refinement loop, finalization into an optimized prompt, and synthetic
//! test-case generation.

use anyhow::Result;
use tracing::debug;

use crate::api::{ChatMessage, ModelClient};
use crate::input::{InputEvent, InputSource};
use crate::output::OutputHandler;
use crate::parser;
use crate::prompts;
use crate::state::{
    ContextUnderstanding, ConversationState, OptimizationResult, TestCase, UserIntent,
};

/// Any of these (after trim + lowercase) ends the refinement loop.
pub const TERMINATION_KEYWORDS: &[&str] = &["finalize", "done", "finish", "end", "f"];

/// Safety cap on model turns per refinement loop. The original tool ran
/// unbounded; the cap keeps a runaway session from burning tokens
/// forever. Keyword termination remains the normal exit.
pub const MAX_REFINEMENT_TURNS: usize = 50;

const REFINEMENT_TEMPERATURE: f32 = 0.7;
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const TEST_GENERATION_TEMPERATURE: f32 = 0.5;

/// How a refinement loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// User typed a termination keyword (or the turn cap was reached).
    Finalized,
    /// User cancelled with Ctrl-C/Ctrl-D.
    Cancelled,
}

pub fn is_termination_command(input: &str) -> bool {
    TERMINATION_KEYWORDS.contains(&input.trim().to_lowercase().as_str())
}

/// Single-shot classification of the raw input into an intent bucket
/// plus the model's initial read on what the user needs.
pub async fn classify_intent(
    client: &dyn ModelClient,
    user_input: &str,
) -> Result<(UserIntent, String)> {
    let messages = vec![
        ChatMessage::system(prompts::ASSESSMENT_PROMPT),
        ChatMessage::user(user_input),
    ];
    let response = client.complete(&messages, ANALYSIS_TEMPERATURE).await?;

    let parsed = parser::parse_tagged(&response, parser::ASSESSMENT_TAGS);
    let intent = UserIntent::from_label(&parsed["intent"]);
    debug!(%intent, "classified user intent");

    Ok((intent, parsed["initial_understanding"].clone()))
}

/// Seed the message history according to intent. The creation path gets
/// the initial understanding folded into its opening message; anything
/// else (including unclear intent) takes the optimization path.
pub fn seed_conversation(state: &mut ConversationState) {
    let (system_prompt, opening) = match state.user_intent {
        UserIntent::CreateNew => (
            prompts::creation_prompt(),
            format!(
                "User's request: '{}'\n\n\
                 I understand you want to create a new prompt. {}\n\n\
                 Please begin helping them create an effective prompt.",
                state.original_input, state.context_understanding.additional_insights
            ),
        ),
        UserIntent::OptimizeExisting | UserIntent::Unclear => (
            prompts::optimization_prompt(),
            format!(
                "Initial prompt: '{}'\n\nPlease begin the refinement process.",
                state.original_input
            ),
        ),
    };

    state.messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(opening)];
}

/// The multi-turn refinement state machine: model turn, parse, merge,
/// display, user turn, repeat until a termination keyword, cancellation,
/// or the turn cap.
pub async fn refinement_loop(
    client: &dyn ModelClient,
    state: &mut ConversationState,
    output: &OutputHandler,
    input: &mut dyn InputSource,
) -> Result<LoopOutcome> {
    output.print_refinement_header()?;

    let mut turns = 0;
    loop {
        if turns >= MAX_REFINEMENT_TURNS {
            output.print_system("Refinement turn limit reached; moving on to the optimized prompt.")?;
            return Ok(LoopOutcome::Finalized);
        }
        turns += 1;

        let spinner = output.spinner("Assistant is thinking...");
        let response = client.complete(&state.messages, REFINEMENT_TEMPERATURE).await;
        spinner.finish_and_clear();
        let response = response?;

        state.push_assistant(response.clone());

        let parsed = parser::parse_tagged(&response, parser::REFINEMENT_TAGS);
        state.context_understanding.merge(&parsed);
        debug!(turn = turns, understanding = ?state.context_understanding, "merged turn analysis");

        let user_message = &parsed["user_message"];
        if !user_message.is_empty() {
            output.print_assistant_message(user_message)?;
        }

        if parsed["ready_to_finalize"] == "yes" {
            // An unparseable score suppresses the banner for this turn
            // only; the loop carries on either way.
            if let Ok(confidence) = parsed["score"].parse::<f64>() {
                output.print_ready_banner(confidence)?;
            }
        }

        match input.read_line("Your response (or 'finalize' to finish)")? {
            InputEvent::Cancelled => return Ok(LoopOutcome::Cancelled),
            InputEvent::Line(line) => {
                if is_termination_command(&line) {
                    return Ok(LoopOutcome::Finalized);
                }
                state.push_user(line);
            }
        }
    }
}

fn context_summary(state: &ConversationState) -> String {
    format!(
        "\nOriginal Prompt: \"{}\"\n\n\
         Understanding Gained:\n\
         - Context: {}\n\
         - Goal: {}\n\
         - Format: {}\n\
         - AI's Role: {}\n\
         - Additional Insights: {}\n",
        state.original_input,
        state.context_understanding.context,
        state.context_understanding.goal,
        state.context_understanding.format,
        state.context_understanding.ai_role,
        state.context_understanding.additional_insights,
    )
}

/// Turn the accumulated understanding into the final artifact. Total:
/// malformed model output yields empty fields, never an error.
pub async fn generate_optimized_prompt(
    client: &dyn ModelClient,
    state: &ConversationState,
    output: &OutputHandler,
) -> Result<OptimizationResult> {
    let messages = vec![
        ChatMessage::system(prompts::OPTIMIZATION_GENERATION_PROMPT),
        ChatMessage::user(context_summary(state)),
    ];

    let spinner = output.spinner("Analyzing conversation and crafting the optimized prompt...");
    let response = client.complete(&messages, ANALYSIS_TEMPERATURE).await;
    spinner.finish_and_clear();
    let response = response?;

    let parsed = parser::parse_tagged(&response, parser::OPTIMIZATION_TAGS);
    Ok(OptimizationResult {
        optimized_prompt: parsed["optimized_prompt"].clone(),
        improvements: parsed["improvement_summary"].clone(),
        test_cases: None,
    })
}

/// Generate scenario/input/expected triples for the optimized prompt.
/// Zero well-formed blocks in the response is an empty vec, not an error.
pub async fn generate_test_cases(
    client: &dyn ModelClient,
    optimized_prompt: &str,
    understanding: &ContextUnderstanding,
    output: &OutputHandler,
) -> Result<Vec<TestCase>> {
    let summary = format!(
        "\nOptimized Prompt:\n{}\n\n\
         Context Understanding:\n\
         - AI's Role: {}\n\
         - Goal: {}\n\
         - Format: {}\n",
        optimized_prompt, understanding.ai_role, understanding.goal, understanding.format,
    );

    let messages = vec![
        ChatMessage::system(prompts::TEST_GENERATION_PROMPT),
        ChatMessage::user(summary),
    ];

    let spinner = output.spinner("Creating diverse test scenarios...");
    let response = client.complete(&messages, TEST_GENERATION_TEMPERATURE).await;
    spinner.finish_and_clear();
    let response = response?;

    let cases = parser::extract_test_blocks(&response)
        .iter()
        .map(|block| TestCase {
            scenario: parser::extract_tag(block, "scenario"),
            input: parser::extract_tag(block, "input"),
            expected_behavior: parser::extract_tag(block, "expected_behavior"),
        })
        .collect();
    Ok(cases)
}

/// Format test cases as the text block that gets re-folded into the
/// refinement context.
pub fn format_test_cases(test_cases: &[TestCase]) -> String {
    test_cases
        .iter()
        .enumerate()
        .map(|(i, case)| {
            format!(
                "Test Case {}:\nScenario: {}\nInput: {}\nExpected: {}",
                i + 1,
                case.scenario,
                case.input,
                case.expected_behavior
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Append the user's refinement feedback, together with the current
/// artifact (and its test cases, when present), as a single user turn.
/// Re-entering the refinement loop afterwards picks up this richer seed.
pub fn add_refinement_feedback(
    state: &mut ConversationState,
    result: &OptimizationResult,
    feedback: &str,
) {
    let mut context = format!(
        "The user wants to refine the optimized prompt further.\n\n\
         Current optimized prompt:\n{}\n",
        result.optimized_prompt
    );

    if let Some(test_cases) = &result.test_cases {
        context.push_str(&format!("\nTest cases that were generated:\n{}\n", test_cases));
    }

    context.push_str(&format!("\nUser's feedback: {}", feedback));
    state.push_user(context);
}
