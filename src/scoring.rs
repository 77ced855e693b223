use crate::content::Mode;
use std::time::Duration;

/// Things that move the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvent {
    /// ORDERED: the expected word was clicked
    CorrectStep,
    /// POOL: a whole target was spelled
    TargetMatched,
    /// Out-of-order word or invalid guess
    Mistake,
    /// Session won inside the fast-completion window
    FastWin,
}

/// Per-mode score deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub correct_step: i64,
    pub target_matched: i64,
    pub mistake: i64,
    pub fast_win: i64,
}

impl ScoringPolicy {
    pub const ORDERED: Self = Self {
        correct_step: 100,
        target_matched: 0,
        mistake: -50,
        fast_win: 200,
    };

    pub const POOL: Self = Self {
        correct_step: 0,
        target_matched: 200,
        mistake: -25,
        fast_win: 500,
    };

    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Ordered => Self::ORDERED,
            Mode::Pool => Self::POOL,
        }
    }

    pub fn delta(&self, event: ScoreEvent) -> i64 {
        match event {
            ScoreEvent::CorrectStep => self.correct_step,
            ScoreEvent::TargetMatched => self.target_matched,
            ScoreEvent::Mistake => self.mistake,
            ScoreEvent::FastWin => self.fast_win,
        }
    }

    /// New score after `event`; never below zero
    pub fn apply(&self, score: u64, event: ScoreEvent) -> u64 {
        apply_delta(score, self.delta(event))
    }
}

pub fn apply_delta(score: u64, delta: i64) -> u64 {
    if delta >= 0 {
        score.saturating_add(delta.unsigned_abs())
    } else {
        score.saturating_sub(delta.unsigned_abs())
    }
}

/// Strictly inside the window: finishing exactly on the boundary earns nothing.
pub fn is_fast(elapsed: Duration, window: Duration) -> bool {
    elapsed < window
}
