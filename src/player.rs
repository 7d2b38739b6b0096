//! Local player
//!
//! Drives one player's `TypingProgress` from decoded input events. Finished
//! races are recorded on the leaderboard here; the remaining effects
//! (render, progress broadcast, quit) are handed back to the caller.

use std::time::Instant;

use tracing::{error, info};

use crate::error::WordListError;
use crate::leaderboard::{Leaderboard, LeaderboardEntry, DEFAULT_TOP_ENTRIES};
use crate::typing::{Effect, InputEvent, RaceResult, TypingProgress};
use crate::words::{WordList, DEFAULT_WORD_COUNT};

pub struct LocalPlayer<L: Leaderboard> {
    name: String,
    progress: TypingProgress,
    words: WordList,
    word_count: usize,
    leaderboard: L,
}

impl<L: Leaderboard> LocalPlayer<L> {
    /// Create a player with a freshly drawn passage of `word_count` words
    pub fn new(
        name: impl Into<String>,
        words: WordList,
        word_count: usize,
        leaderboard: L,
    ) -> Result<Self, WordListError> {
        let passage = words.sentence(word_count, &mut rand::thread_rng())?;

        Ok(Self {
            name: name.into(),
            progress: TypingProgress::new(&passage),
            words,
            word_count,
            leaderboard,
        })
    }

    /// Create a player racing over the default passage length
    pub fn with_default_length(
        name: impl Into<String>,
        words: WordList,
        leaderboard: L,
    ) -> Result<Self, WordListError> {
        Self::new(name, words, DEFAULT_WORD_COUNT, leaderboard)
    }

    /// Handle one input event at time `now`
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Vec<Effect> {
        match event {
            InputEvent::Key(key) => {
                let effects = self.progress.apply(key, now);
                for effect in &effects {
                    if let Effect::Finished(result) = effect {
                        self.persist(result);
                    }
                }
                effects
            }
            InputEvent::Reset => match self.words.sentence(self.word_count, &mut rand::thread_rng()) {
                Ok(passage) => {
                    self.progress.reset(&passage);
                    vec![Effect::Render]
                }
                Err(e) => {
                    error!("Failed to draw a new passage: {}", e);
                    Vec::new()
                }
            },
            InputEvent::Quit => vec![Effect::Quit],
        }
    }

    fn persist(&self, result: &RaceResult) {
        match self
            .leaderboard
            .record(&self.name, result.wpm, result.accuracy)
        {
            Ok(()) => info!(
                "Recorded {} WPM ({:.2}%) for {}",
                result.wpm, result.accuracy, self.name
            ),
            Err(e) => error!("Failed to record result for {}: {}", self.name, e),
        }
    }

    /// Top leaderboard entries for the results screen
    ///
    /// Storage failures are logged and yield an empty list.
    pub fn standings(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard
            .top_entries(DEFAULT_TOP_ENTRIES)
            .unwrap_or_else(|e| {
                error!("Failed to fetch leaderboard: {}", e);
                Vec::new()
            })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn progress(&self) -> &TypingProgress {
        &self.progress
    }
}
