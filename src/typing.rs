//! Typing progress state machine
//!
//! Tracks one player's typed words against the target text and derives
//! WPM and accuracy. Pure: no I/O, and time is passed in by the caller.
//! Every keystroke transition returns the effects the caller should act
//! on (re-render, broadcast progress, persist the result).

use std::fmt;
use std::time::{Duration, Instant};

/// A keystroke that edits the typed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// Printable single character
    Char(char),
    /// Word separator (space)
    Separator,
    Backspace,
}

/// Input decoded once at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Keystroke),
    /// Draw a fresh target and start over
    Reset,
    Quit,
}

impl InputEvent {
    /// Decode a key name (`"a"`, `" "`, `"backspace"`, `"ctrl+r"`, `"ctrl+c"`)
    ///
    /// Unrecognized keys decode to None and are ignored.
    pub fn decode(key: &str) -> Option<Self> {
        match key {
            " " => Some(InputEvent::Key(Keystroke::Separator)),
            "backspace" => Some(InputEvent::Key(Keystroke::Backspace)),
            "ctrl+r" => Some(InputEvent::Reset),
            "ctrl+c" => Some(InputEvent::Quit),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => {
                        Some(InputEvent::Key(Keystroke::Char(c)))
                    }
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Finished,
}

/// Snapshot of a player's metrics, sent as a plain text frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub word_index: usize,
    pub word_count: usize,
    pub wpm: u32,
    pub accuracy: f64,
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} words {} WPM {:.2}%",
            self.word_index, self.word_count, self.wpm, self.accuracy
        )
    }
}

/// Final metrics of a completed race
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceResult {
    pub wpm: u32,
    pub accuracy: f64,
    pub elapsed: Duration,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Render,
    /// Metrics a client may broadcast to its race
    Progress(ProgressReport),
    /// Completion; the result should be persisted
    Finished(RaceResult),
    Quit,
}

/// Per-player typing state
#[derive(Debug, Clone)]
pub struct TypingProgress {
    target_words: Vec<String>,
    typed_words: Vec<String>,
    current_word: usize,
    phase: Phase,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    incorrect_chars: usize,
    wpm: u32,
    accuracy: f64,
}

impl TypingProgress {
    pub fn new(target: &str) -> Self {
        let target_words: Vec<String> = target.split_whitespace().map(str::to_string).collect();
        let typed_words = vec![String::new(); target_words.len()];

        Self {
            target_words,
            typed_words,
            current_word: 0,
            phase: Phase::NotStarted,
            started_at: None,
            finished_at: None,
            incorrect_chars: 0,
            wpm: 0,
            accuracy: 0.0,
        }
    }

    /// Start over with a new target text
    pub fn reset(&mut self, target: &str) {
        *self = Self::new(target);
    }

    /// Apply one keystroke at time `now`
    ///
    /// Once finished, keystrokes are ignored and produce no effects.
    pub fn apply(&mut self, key: Keystroke, now: Instant) -> Vec<Effect> {
        if self.phase == Phase::Finished {
            return Vec::new();
        }

        if self.phase == Phase::NotStarted {
            self.phase = Phase::InProgress;
            self.started_at = Some(now);
        }

        match key {
            Keystroke::Char(c) => self.type_char(c),
            Keystroke::Separator => self.advance_word(),
            Keystroke::Backspace => self.backspace(),
        }

        self.recompute(now);

        let mut effects = vec![Effect::Render, Effect::Progress(self.report())];

        if self.completed() {
            self.phase = Phase::Finished;
            self.finished_at = Some(now);
            effects.push(Effect::Finished(RaceResult {
                wpm: self.wpm,
                accuracy: self.accuracy,
                elapsed: self.elapsed(now),
            }));
        }

        effects
    }

    fn type_char(&mut self, c: char) {
        let Some(target) = self.target_words.get(self.current_word) else {
            return;
        };
        let typed = &mut self.typed_words[self.current_word];

        // Overflow past the target word counts as incorrect too.
        let expected = target.chars().nth(typed.chars().count());
        if expected != Some(c) {
            self.incorrect_chars += 1;
        }

        typed.push(c);
    }

    fn advance_word(&mut self) {
        if self.current_word < self.target_words.len() {
            self.current_word += 1;
        }
    }

    fn backspace(&mut self) {
        match self.typed_words.get_mut(self.current_word) {
            Some(typed) if !typed.is_empty() => {
                typed.pop();
            }
            _ => {
                if self.current_word > 0 {
                    self.current_word -= 1;
                }
            }
        }
    }

    fn recompute(&mut self, now: Instant) {
        let mut correct_words = 0;
        let mut correct_chars = 0;
        let mut typed_chars = 0;

        for (typed, target) in self.typed_words.iter().zip(&self.target_words) {
            typed_chars += typed.chars().count();
            if typed == target {
                correct_words += 1;
                correct_chars += target.chars().count();
            } else {
                correct_chars += matching_prefix_len(typed, target);
            }
        }

        self.wpm = words_per_minute(correct_words, self.elapsed(now));
        self.accuracy = accuracy(correct_chars, typed_chars);
    }

    /// Started, and either past the last word or the last word matches
    fn completed(&self) -> bool {
        if self.phase == Phase::NotStarted {
            return false;
        }
        if self.current_word >= self.target_words.len() {
            return true;
        }
        matches!(
            (self.typed_words.last(), self.target_words.last()),
            (Some(typed), Some(target)) if typed == target
        )
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    pub fn report(&self) -> ProgressReport {
        ProgressReport {
            word_index: self.current_word,
            word_count: self.target_words.len(),
            wpm: self.wpm,
            accuracy: self.accuracy,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn target_words(&self) -> &[String] {
        &self.target_words
    }

    pub fn typed_words(&self) -> &[String] {
        &self.typed_words
    }

    pub fn current_word(&self) -> usize {
        self.current_word
    }

    pub fn incorrect_chars(&self) -> usize {
        self.incorrect_chars
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }
}

/// Correct words per minute
///
/// A zero elapsed time is treated as one second.
pub fn words_per_minute(correct_words: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    let minutes = if minutes > 0.0 { minutes } else { 1.0 / 60.0 };
    (correct_words as f64 / minutes).floor().max(0.0) as u32
}

/// Percentage of typed characters that were correct, clamped to [0, 100]
pub fn accuracy(correct_chars: usize, typed_chars: usize) -> f64 {
    if typed_chars == 0 {
        return 0.0;
    }
    (correct_chars as f64 / typed_chars as f64 * 100.0).clamp(0.0, 100.0)
}

/// Length of the common prefix of `typed` and `target`, in characters
pub fn matching_prefix_len(typed: &str, target: &str) -> usize {
    typed
        .chars()
        .zip(target.chars())
        .take_while(|(a, b)| a == b)
        .count()
}
