//! Line-by-line interpretation of ffmpeg's stderr.
//!
//! Every completed line goes through [`ParserContext::handle_line`], which moves the
//! context between the [`OutputState`]s and returns the [`Action`]s the caller has to
//! apply to its output stream and progress display. The context itself never prints.
use tracing::trace;

use crate::error::CallerError;
use crate::ffmpeg_progress::{is_status_line, parse_duration_line, parse_status_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputState {
    /// No invocation has started; handling a line is a bug in the caller.
    #[default]
    Uninitialized,
    /// Printing the banner and input description until `Duration:` shows up.
    BeforeDuration,
    /// Duration known, still printing stream mappings until the first status line.
    BeforeProgress,
    /// Status lines feed the progress display instead of being printed.
    DisplayProgress,
    /// Transcoding summary and anything else after the progress display.
    AfterProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write the line to the user as is.
    Print(String),
    SetTotal(f64),
    SetProgress(f64),
    /// Move the display to `total`, stop it and print the completion summary.
    Complete { total: Option<f64> },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParserContext {
    state: OutputState,
    total_duration: Option<f64>,
    current_progress: Option<f64>,
}

impl ParserContext {
    pub fn new() -> ParserContext {
        ParserContext::default()
    }

    /// Starts a fresh invocation.
    pub fn reset(&mut self) {
        self.state = OutputState::BeforeDuration;
        self.total_duration = None;
        self.current_progress = None;
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    pub fn total_duration(&self) -> Option<f64> {
        self.total_duration
    }

    pub fn current_progress(&self) -> Option<f64> {
        self.current_progress
    }

    pub fn handle_line(&mut self, line: &str) -> Result<Vec<Action>, CallerError> {
        let mut actions = Vec::new();
        let next = self.transition(self.state, line, &mut actions)?;
        if next != self.state {
            trace!(from = ?self.state, to = ?next, "output state changed");
        }
        self.state = next;
        Ok(actions)
    }

    fn transition(
        &mut self,
        state: OutputState,
        line: &str,
        actions: &mut Vec<Action>,
    ) -> Result<OutputState, CallerError> {
        match state {
            OutputState::Uninitialized => Err(CallerError::Uninitialized),
            OutputState::BeforeDuration => {
                actions.push(Action::Print(line.to_string()));
                match parse_duration_line(line) {
                    Some(duration) => {
                        self.total_duration = Some(duration);
                        actions.push(Action::SetTotal(duration));
                        Ok(OutputState::BeforeProgress)
                    }
                    None => Ok(OutputState::BeforeDuration),
                }
            }
            OutputState::BeforeProgress => match parse_status_line(line) {
                Some(progress) => {
                    self.current_progress = Some(progress);
                    actions.push(Action::SetProgress(progress));
                    Ok(OutputState::DisplayProgress)
                }
                None => {
                    actions.push(Action::Print(line.to_string()));
                    Ok(OutputState::BeforeProgress)
                }
            },
            OutputState::DisplayProgress => match parse_status_line(line) {
                Some(progress) => {
                    self.current_progress = Some(progress);
                    actions.push(Action::SetProgress(progress));
                    Ok(OutputState::DisplayProgress)
                }
                None => {
                    self.current_progress = self.total_duration;
                    actions.push(Action::Complete { total: self.total_duration });
                    self.transition(OutputState::AfterProgress, line, actions)
                }
            },
            OutputState::AfterProgress => {
                // ffmpeg repeats its last status line once the summary is out
                if !is_status_line(line) {
                    actions.push(Action::Print(line.to_string()));
                }
                Ok(OutputState::AfterProgress)
            }
        }
    }
}
