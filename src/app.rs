use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::api::ModelClient;
use crate::input::{InputEvent, InputSource};
use crate::optimizer::{
    add_refinement_feedback, classify_intent, format_test_cases, generate_optimized_prompt,
    generate_test_cases, refinement_loop, seed_conversation, LoopOutcome,
};
use crate::output::OutputHandler;
use crate::state::ConversationState;

/// Post-finalize menu. Anything unparseable is rejected and re-prompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    GenerateTests,
    RefineFurther,
    StartOver,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::GenerateTests),
            "2" => Some(MenuChoice::RefineFurther),
            "3" => Some(MenuChoice::StartOver),
            "4" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Outcome of one full session pass, used by `run` to decide whether to
/// start a fresh session.
enum SessionOutcome {
    StartOver,
    Done,
}

/// Session controller: owns the client handle and the I/O collaborators,
/// drives classification, refinement, finalization, and the menu.
pub struct App<I: InputSource> {
    client: Arc<dyn ModelClient>,
    output: OutputHandler,
    input: I,
}

impl<I: InputSource> App<I> {
    pub fn new(client: Arc<dyn ModelClient>, output: OutputHandler, input: I) -> Self {
        Self { client, output, input }
    }

    /// Run sessions until the user exits or cancels. "Start over" loops
    /// here rather than recursing, so long sessions cannot grow the
    /// stack.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.run_session().await? {
                SessionOutcome::StartOver => continue,
                SessionOutcome::Done => return Ok(()),
            }
        }
    }

    async fn run_session(&mut self) -> Result<SessionOutcome> {
        self.output.print_welcome()?;

        let original_input = match self
            .input
            .read_line("Enter your prompt or describe what you need help with")?
        {
            InputEvent::Cancelled => {
                self.output.print_cancellation()?;
                return Ok(SessionOutcome::Done);
            }
            InputEvent::Line(line) => line,
        };

        let mut state = ConversationState::new(original_input);

        let spinner = self.output.spinner("Understanding your request...");
        let classified = classify_intent(self.client.as_ref(), &state.original_input).await;
        spinner.finish_and_clear();
        let (intent, initial_understanding) = classified?;

        state.user_intent = intent;
        state.context_understanding.additional_insights = initial_understanding;
        seed_conversation(&mut state);

        match refinement_loop(self.client.as_ref(), &mut state, &self.output, &mut self.input)
            .await?
        {
            LoopOutcome::Cancelled => {
                self.output.print_cancellation()?;
                return Ok(SessionOutcome::Done);
            }
            LoopOutcome::Finalized => {}
        }

        let mut result =
            generate_optimized_prompt(self.client.as_ref(), &state, &self.output).await?;
        self.output.print_optimized_prompt(&result)?;

        loop {
            self.output.print_menu()?;
            let line = match self.input.read_line("Your choice (1-4)")? {
                InputEvent::Cancelled => {
                    self.output.print_cancellation()?;
                    return Ok(SessionOutcome::Done);
                }
                InputEvent::Line(line) => line,
            };

            let Some(choice) = MenuChoice::parse(&line) else {
                self.output.print_error("Invalid choice. Please enter 1-4.")?;
                continue;
            };
            debug!(?choice, "menu selection");

            match choice {
                MenuChoice::GenerateTests => {
                    let cases = generate_test_cases(
                        self.client.as_ref(),
                        &result.optimized_prompt,
                        &state.context_understanding,
                        &self.output,
                    )
                    .await?;
                    result.test_cases = Some(format_test_cases(&cases));
                    self.output.print_test_cases(&cases)?;
                }
                MenuChoice::RefineFurther => {
                    let feedback = match self
                        .input
                        .read_line("What would you like to change about the optimized prompt?")?
                    {
                        InputEvent::Cancelled => {
                            self.output.print_cancellation()?;
                            return Ok(SessionOutcome::Done);
                        }
                        InputEvent::Line(line) => line,
                    };

                    if result.test_cases.is_some() {
                        self.output.print_system(
                            "Note: test cases will be included in the refinement context.",
                        )?;
                    }

                    add_refinement_feedback(&mut state, &result, &feedback);
                    match refinement_loop(
                        self.client.as_ref(),
                        &mut state,
                        &self.output,
                        &mut self.input,
                    )
                    .await?
                    {
                        LoopOutcome::Cancelled => {
                            self.output.print_cancellation()?;
                            return Ok(SessionOutcome::Done);
                        }
                        LoopOutcome::Finalized => {}
                    }

                    result =
                        generate_optimized_prompt(self.client.as_ref(), &state, &self.output)
                            .await?;
                    self.output.print_optimized_prompt(&result)?;
                }
                MenuChoice::StartOver => return Ok(SessionOutcome::StartOver),
                MenuChoice::Exit => {
                    self.output.print_system("Thanks for using Promptforge!")?;
                    return Ok(SessionOutcome::Done);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_parse_accepts_only_the_four_choices() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::GenerateTests));
        assert_eq!(MenuChoice::parse(" 2 "), Some(MenuChoice::RefineFurther));
        assert_eq!(MenuChoice::parse("3"), Some(MenuChoice::StartOver));
        assert_eq!(MenuChoice::parse("4"), Some(MenuChoice::Exit));

        for invalid in ["", "5", "0", "one", "12", "exit"] {
            assert_eq!(MenuChoice::parse(invalid), None, "{invalid:?}");
        }
    }
}
