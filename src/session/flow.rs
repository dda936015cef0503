//! State machine for the post-session questions.
//!
//! `Flow::handle` is pure: it updates the stage and collected answers and
//! returns the effect the driver should carry out. All terminal and file I/O
//! lives in `cli::start`.

use std::path::PathBuf;
use std::time::Duration;

use crate::notes::record::EntryBody;

/// Focus quality recorded when the question is answered with an empty line.
pub const DEFAULT_FOCUS_QUALITY: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Timing,
    Milestone,
    FocusQuality,
    Interruptions,
    Reflection,
    Saving,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Stop { elapsed: Duration },
    Submit(String),
    Back,
    Quit,
    SaveSucceeded(PathBuf),
    SaveFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Show the question for this stage.
    Prompt(Stage),
    /// The answer was rejected; explain and ask the current question again.
    Reprompt(&'static str),
    /// Write the session. No further input is accepted until the result arrives.
    BeginSave(Answers),
    /// The save finished, successfully or not.
    Finished,
    /// The user quit before saving; nothing was written.
    Aborted,
}

/// Everything collected about the session so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub duration: Duration,
    pub milestone: String,
    pub focus_quality: u8,
    pub interruptions: String,
    pub reflection: String,
}

impl Default for Answers {
    fn default() -> Self {
        Self {
            duration: Duration::ZERO,
            milestone: String::new(),
            focus_quality: DEFAULT_FOCUS_QUALITY,
            interruptions: String::new(),
            reflection: String::new(),
        }
    }
}

impl Answers {
    pub fn into_body(self) -> EntryBody {
        EntryBody::Reflective {
            milestone: self.milestone,
            focus_quality: self.focus_quality,
            interruptions: self.interruptions,
            reflection: self.reflection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    stage: Stage,
    answers: Answers,
    outcome: Option<Result<PathBuf, String>>,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    pub fn new() -> Self {
        Self {
            stage: Stage::Timing,
            answers: Answers::default(),
            outcome: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Where the session was saved, or why it was not. `None` until `Done`.
    pub fn outcome(&self) -> Option<&Result<PathBuf, String>> {
        self.outcome.as_ref()
    }

    pub fn handle(&mut self, event: Event) -> Effect {
        match (self.stage, event) {
            // A save in flight cannot be cancelled; only its result moves on.
            (Stage::Saving, Event::SaveSucceeded(path)) => self.finish(Ok(path)),
            (Stage::Saving, Event::SaveFailed(reason)) => self.finish(Err(reason)),
            (Stage::Saving | Stage::Done, _) => Effect::None,
            (_, Event::SaveSucceeded(_) | Event::SaveFailed(_)) => Effect::None,

            (_, Event::Quit) => {
                self.stage = Stage::Done;
                Effect::Aborted
            }

            (Stage::Timing, Event::Stop { elapsed }) => {
                self.answers.duration = elapsed;
                self.advance(Stage::Milestone)
            }
            (Stage::Timing, _) => Effect::None,
            (_, Event::Stop { .. }) => Effect::None,

            (Stage::Milestone, Event::Submit(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Effect::Reprompt("A milestone is required.");
                }
                self.answers.milestone = text.to_string();
                self.advance(Stage::FocusQuality)
            }

            (Stage::FocusQuality, Event::Submit(text)) => match parse_focus_quality(&text) {
                Some(q) => {
                    self.answers.focus_quality = q;
                    self.advance(Stage::Interruptions)
                }
                None => Effect::Reprompt("Enter a number from 1 to 5, or leave empty for 3."),
            },

            (Stage::Interruptions, Event::Submit(text)) => {
                self.answers.interruptions = text.trim().to_string();
                self.advance(Stage::Reflection)
            }
            (Stage::Interruptions, Event::Back) => self.advance(Stage::FocusQuality),

            (Stage::Reflection, Event::Submit(text)) => {
                self.answers.reflection = text.trim().to_string();
                self.stage = Stage::Saving;
                Effect::BeginSave(self.answers.clone())
            }
            (Stage::Reflection, Event::Back) => self.advance(Stage::Interruptions),

            (Stage::Milestone | Stage::FocusQuality, Event::Back) => {
                Effect::Reprompt("Nothing to go back to.")
            }
        }
    }

    fn advance(&mut self, stage: Stage) -> Effect {
        self.stage = stage;
        Effect::Prompt(stage)
    }

    fn finish(&mut self, outcome: Result<PathBuf, String>) -> Effect {
        self.stage = Stage::Done;
        self.outcome = Some(outcome);
        Effect::Finished
    }
}

fn parse_focus_quality(text: &str) -> Option<u8> {
    let text = text.trim();
    if text.is_empty() {
        return Some(DEFAULT_FOCUS_QUALITY);
    }
    text.parse::<u8>().ok().filter(|q| (1..=5).contains(q))
}
