use crate::store::TestResult;
use chrono::Local;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Floor for the WPM division so a degenerate run never divides by zero.
const MIN_ELAPSED: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// One keystroke recorded at its target position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keystroke {
    pub char: char,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

/// How a target position should be drawn right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CharClass {
    Untyped,
    Correct,
    Incorrect,
    Cursor,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("target text must not be empty")]
    EmptyTarget,
}

/// Whitespace-delimited token count of the target text.
pub fn word_count(target: &str) -> usize {
    target.split_whitespace().count()
}

/// WPM and accuracy for a finished run.
///
/// Elapsed time is clamped to one second before the division, so the WPM
/// is always a finite number even if the run completed instantly.
pub fn score(target: &str, mistakes: u32, elapsed: Duration) -> (u32, u32) {
    let elapsed = elapsed.max(MIN_ELAPSED);
    let minutes = elapsed.as_secs_f64() / 60.0;
    let wpm = (word_count(target) as f64 / minutes).round() as u32;

    let len = target.chars().count() as f64;
    let accuracy = ((len - mistakes as f64) / len * 100.0).round() as u32;

    (wpm, accuracy)
}

/// One test attempt measured against a fixed target text.
///
/// Keystrokes advance a cursor one position at a time; a mismatch at entry
/// counts as a mistake and is never revisited. Reaching the end of the
/// target derives a [`TestResult`] exactly once.
#[derive(Debug)]
pub struct Session {
    pub target: String,
    target_chars: Vec<char>,
    entered: Vec<Keystroke>,
    mistakes: u32,
    started_at: Option<SystemTime>,
    finished_at: Option<SystemTime>,
    elapsed_display_secs: u64,
    result: Option<TestResult>,
}

impl Session {
    pub fn new(target: impl Into<String>) -> Result<Self, SessionError> {
        let target = target.into();
        let target_chars: Vec<char> = target.chars().collect();
        if target_chars.is_empty() {
            return Err(SessionError::EmptyTarget);
        }
        Ok(Self {
            target,
            target_chars,
            entered: vec![],
            mistakes: 0,
            started_at: None,
            finished_at: None,
            elapsed_display_secs: 0,
            result: None,
        })
    }

    pub fn phase(&self) -> Phase {
        if self.entered.len() == self.target_chars.len() {
            Phase::Completed
        } else if self.started_at.is_some() {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.phase() == Phase::Completed
    }

    /// Index of the next expected character.
    pub fn cursor(&self) -> usize {
        self.entered.len()
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn keystrokes(&self) -> &[Keystroke] {
        &self.entered
    }

    /// The derived result, present exactly when the session is completed.
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.target_chars.get(idx).copied()
    }

    pub fn classify(&self, idx: usize) -> CharClass {
        match self.entered.get(idx) {
            Some(k) if k.outcome == Outcome::Correct => CharClass::Correct,
            Some(_) => CharClass::Incorrect,
            None if idx == self.cursor() => CharClass::Cursor,
            None => CharClass::Untyped,
        }
    }

    /// Fraction of the target typed so far, in 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        self.entered.len() as f64 / self.target_chars.len() as f64
    }

    /// Process one keystroke. No-op once the session is completed.
    pub fn write(&mut self, c: char) {
        if self.has_finished() {
            return;
        }

        if self.started_at.is_none() {
            self.started_at = Some(SystemTime::now());
        }

        let idx = self.entered.len();
        let outcome = if Some(c) == self.expected_char(idx) {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        if outcome == Outcome::Incorrect {
            self.mistakes += 1;
        }
        self.entered.push(Keystroke { char: c, outcome });

        if self.entered.len() == self.target_chars.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let now = SystemTime::now();
        self.finished_at = Some(now);

        let elapsed = self
            .started_at
            .and_then(|started| now.duration_since(started).ok())
            .unwrap_or_default();
        self.elapsed_display_secs = elapsed.as_secs();

        let (wpm, accuracy) = score(&self.target, self.mistakes, elapsed);
        self.result = Some(TestResult {
            wpm,
            accuracy,
            mistakes: self.mistakes,
            timestamp: Local::now(),
        });
    }

    /// Wall-clock duration of a completed run.
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => finished.duration_since(started).ok(),
            _ => None,
        }
    }

    /// Advance the cosmetic elapsed-time counter. Only a running session
    /// reacts; the counter freezes on completion and clears on reset.
    pub fn on_tick(&mut self) {
        if self.phase() != Phase::Running {
            return;
        }
        if let Some(started) = self.started_at {
            self.elapsed_display_secs = started.elapsed().unwrap_or_default().as_secs();
        }
    }

    /// Elapsed time formatted as `m:ss` for display.
    pub fn elapsed_display(&self) -> String {
        let mins = self.elapsed_display_secs / 60;
        let secs = self.elapsed_display_secs % 60;
        format!("{}:{:02}", mins, secs)
    }

    /// Discard all transient state, keeping the same target text.
    pub fn reset(&mut self) {
        self.entered.clear();
        self.mistakes = 0;
        self.started_at = None;
        self.finished_at = None;
        self.elapsed_display_secs = 0;
        self.result = None;
    }
}
