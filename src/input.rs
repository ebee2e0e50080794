use std::borrow::Cow;

use anyhow::Result;
use nu_ansi_term::Color;
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};

/// One read from the user. Ctrl-C/Ctrl-D arrive as `Cancelled`, which is
/// a clean end-of-session signal, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Cancelled,
}

/// Blocking source of user input lines. A trait so the refinement loop
/// and session controller can be driven by scripted input in tests.
pub trait InputSource {
    fn read_line(&mut self, label: &str) -> Result<InputEvent>;
}

/// Plain prompt for reedline; the styled label line is printed before
/// the editor takes over, so width math never has to deal with ANSI.
struct PlainPrompt;

impl Prompt for PlainPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("::: ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}reverse-search: {}) ", prefix, history_search.term))
    }
}

/// Reedline-backed line editor for interactive sessions.
pub struct LineEditor {
    editor: Reedline,
}

impl LineEditor {
    pub fn new() -> Self {
        Self { editor: Reedline::create() }
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for LineEditor {
    fn read_line(&mut self, label: &str) -> Result<InputEvent> {
        println!();
        println!("{}", Color::Yellow.bold().paint(label));
        match self.editor.read_line(&PlainPrompt)? {
            Signal::Success(line) => Ok(InputEvent::Line(line)),
            Signal::CtrlC | Signal::CtrlD => Ok(InputEvent::Cancelled),
        }
    }
}

/// Scripted input for tests: pops pre-canned lines, then cancels.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: std::collections::VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, _label: &str) -> Result<InputEvent> {
        Ok(match self.lines.pop_front() {
            Some(line) => InputEvent::Line(line),
            None => InputEvent::Cancelled,
        })
    }
}
