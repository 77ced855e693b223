use crate::clock::Clock;
use crate::content::{generate_ordered, generate_pool, Mode, Tile, TileId, TileStatus};
use crate::error::Result;
use crate::evaluator::{classify, Classification};
use crate::scoring::{is_fast, ScoreEvent, ScoringPolicy};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};

/// Key under which the best winning score is persisted
pub const HIGH_SCORE_KEY: &str = "HighScore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

/// Outbound events for the presentation layer. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    CorrectStep(usize),
    WrongStep(usize),
    TileMatched {
        tile_ids: Vec<TileId>,
        target: String,
    },
    TileInvalid(Vec<TileId>),
    /// The delayed reset after an invalid guess fired; these tiles are clickable again
    TilesReset(Vec<TileId>),
    SessionWon {
        final_score: u64,
        bonus_applied: bool,
        new_high_score: bool,
    },
    SessionLost {
        final_score: u64,
    },
}

/// Timing and sizing knobs for a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub pool_target_count: usize,
    /// POOL countdown; ORDERED sessions are untimed
    pub session_duration: Duration,
    pub reset_delay: Duration,
    /// ORDERED fast-completion window
    pub speed_bonus_window: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            pool_target_count: 3,
            session_duration: Duration::from_secs(60),
            reset_delay: Duration::from_millis(500),
            speed_bonus_window: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
struct OrderedBoard {
    target_words: Vec<String>,
    progress_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReset {
    due: Duration,
    generation: u64,
}

#[derive(Debug, Clone)]
struct PoolBoard {
    remaining: Vec<String>,
    completed: Vec<String>,
    tiles: Vec<Tile>,
    guess: String,
    selected: Vec<TileId>,
    // bumped on every buffer clear and every invalid guess
    generation: u64,
    pending_reset: Option<PendingReset>,
}

impl PoolBoard {
    fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|t| t.id == id)
    }

    fn set_selected_status(&mut self, status: TileStatus) {
        for id in self.selected.clone() {
            if let Some(tile) = self.tile_mut(id) {
                if tile.status == TileStatus::Selected {
                    tile.status = status;
                }
            }
        }
    }

    /// Empties the guess and returns the tiles that formed it
    fn clear_guess(&mut self) -> Vec<TileId> {
        self.guess.clear();
        self.generation += 1;
        std::mem::take(&mut self.selected)
    }

    fn fire_due_reset(&mut self, now: Duration) -> Option<Notification> {
        let pending = self.pending_reset?;
        if now < pending.due {
            return None;
        }
        self.pending_reset = None;
        if pending.generation != self.generation {
            return None;
        }

        self.set_selected_status(TileStatus::Available);
        let ids = self.clear_guess();
        debug!(tiles = ids.len(), "invalid guess reset");
        Some(Notification::TilesReset(ids))
    }
}

#[derive(Debug, Clone)]
enum Board {
    Ordered(OrderedBoard),
    Pool(PoolBoard),
}

/// One play-through: target content, progress, score and timer
#[derive(Debug, Clone)]
pub struct Session {
    mode: Mode,
    board: Board,
    settings: SessionSettings,
    policy: ScoringPolicy,
    score: u64,
    high_score: u64,
    started_at: Duration,
    /// Clock reading at the WON/LOST transition; timers stop here
    ended_at: Option<Duration>,
    status: Status,
    bonus_applied: bool,
}

impl Session {
    /// Build a fresh session from `corpus`; `started_at` is taken from `clock`.
    pub fn new<R, C>(
        mode: Mode,
        corpus: &[String],
        settings: SessionSettings,
        rng: &mut R,
        clock: &C,
        high_score: u64,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        let board = match mode {
            Mode::Ordered => Board::Ordered(OrderedBoard {
                target_words: generate_ordered(corpus, rng)?,
                progress_index: 0,
            }),
            Mode::Pool => {
                let content = generate_pool(corpus, settings.pool_target_count, rng)?;
                Board::Pool(PoolBoard {
                    remaining: content.targets,
                    completed: Vec::new(),
                    tiles: content.tiles,
                    guess: String::new(),
                    selected: Vec::new(),
                    generation: 0,
                    pending_reset: None,
                })
            }
        };

        let session = Self {
            mode,
            board,
            settings,
            policy: ScoringPolicy::for_mode(mode),
            score: 0,
            high_score,
            started_at: clock.now(),
            ended_at: None,
            status: Status::Playing,
            bonus_applied: false,
        };
        info!(%mode, high_score, "session started");
        Ok(session)
    }

    /// ORDERED: a word was clicked. Emits at most one notification.
    pub fn on_click_word<C: Clock + ?Sized>(
        &mut self,
        index: usize,
        clock: &C,
    ) -> Vec<Notification> {
        if self.status != Status::Playing {
            return vec![];
        }
        let Board::Ordered(board) = &mut self.board else {
            debug!(index, "word click ignored outside ordered mode");
            return vec![];
        };

        let expected = board.progress_index;
        if index >= board.target_words.len() || index < expected {
            debug!(index, expected, "word click ignored");
            return vec![];
        }

        if index != expected {
            self.score = self.policy.apply(self.score, ScoreEvent::Mistake);
            debug!(index, expected, score = self.score, "wrong word");
            return vec![Notification::WrongStep(index)];
        }

        board.progress_index += 1;
        let finished = board.progress_index == board.target_words.len();
        self.score = self.policy.apply(self.score, ScoreEvent::CorrectStep);
        debug!(index, score = self.score, "correct word");

        if finished {
            vec![self.win(clock.now())]
        } else {
            vec![Notification::CorrectStep(index)]
        }
    }

    /// POOL: a letter tile was clicked
    pub fn on_click_tile<C: Clock + ?Sized>(
        &mut self,
        id: TileId,
        clock: &C,
    ) -> Vec<Notification> {
        if self.status != Status::Playing || self.mode != Mode::Pool {
            return vec![];
        }
        let now = clock.now();
        if let Some(lost) = self.check_timeout(now) {
            return vec![lost];
        }

        let Board::Pool(board) = &mut self.board else {
            return vec![];
        };
        let mut out: Vec<Notification> = board.fire_due_reset(now).into_iter().collect();

        let Some(tile) = board.tile_mut(id).filter(|t| t.is_available()) else {
            debug!(tile = %id, "tile click ignored");
            return out;
        };
        tile.status = TileStatus::Selected;
        let ch = tile.ch;
        board.guess.push(ch);
        board.selected.push(id);

        match classify(&board.guess, &board.remaining) {
            Classification::ExactMatch(pos) => {
                let target = board.remaining.remove(pos);
                board.completed.push(target.clone());
                board.set_selected_status(TileStatus::Consumed);
                board.pending_reset = None;
                let tile_ids = board.clear_guess();
                let all_done = board.remaining.is_empty();

                self.score = self.policy.apply(self.score, ScoreEvent::TargetMatched);
                info!(%target, score = self.score, "target matched");
                out.push(Notification::TileMatched { tile_ids, target });

                if all_done {
                    out.push(self.win(now));
                }
            }
            Classification::ValidPrefix => {
                debug!(guess = %board.guess, "valid prefix");
            }
            Classification::Invalid => {
                board.generation += 1;
                board.pending_reset = Some(PendingReset {
                    due: now + self.settings.reset_delay,
                    generation: board.generation,
                });
                let failed = board.selected.clone();
                debug!(guess = %board.guess, "invalid guess");

                self.score = self.policy.apply(self.score, ScoreEvent::Mistake);
                out.push(Notification::TileInvalid(failed));
            }
        }
        out
    }

    /// Advance timers: fire a due reset, then time the session out (POOL only).
    pub fn tick<C: Clock + ?Sized>(&mut self, clock: &C) -> Vec<Notification> {
        if self.status != Status::Playing {
            return vec![];
        }
        let now = clock.now();
        let Board::Pool(board) = &mut self.board else {
            return vec![];
        };

        let mut out: Vec<Notification> = board.fire_due_reset(now).into_iter().collect();
        out.extend(self.check_timeout(now));
        out
    }

    fn check_timeout(&mut self, now: Duration) -> Option<Notification> {
        if self.mode != Mode::Pool || self.remaining_at(now) > Duration::ZERO {
            return None;
        }
        self.status = Status::Lost;
        self.ended_at = Some(now);
        info!(score = self.score, "session lost");
        Some(Notification::SessionLost {
            final_score: self.score,
        })
    }

    fn win(&mut self, now: Duration) -> Notification {
        let window = match self.mode {
            Mode::Ordered => self.settings.speed_bonus_window,
            Mode::Pool => self.settings.session_duration / 2,
        };
        let elapsed = now.saturating_sub(self.started_at);
        if is_fast(elapsed, window) {
            self.score = self.policy.apply(self.score, ScoreEvent::FastWin);
            self.bonus_applied = true;
        }
        self.status = Status::Won;
        self.ended_at = Some(now);

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        info!(
            score = self.score,
            bonus = self.bonus_applied,
            new_high_score,
            elapsed_secs = elapsed.as_secs_f64(),
            "session won"
        );
        Notification::SessionWon {
            final_score: self.score,
            bonus_applied: self.bonus_applied,
            new_high_score,
        }
    }

    fn remaining_at(&self, now: Duration) -> Duration {
        self.settings
            .session_duration
            .saturating_sub(now.saturating_sub(self.started_at))
    }

    fn frozen_at(&self, now: Duration) -> Duration {
        self.ended_at.map_or(now, |end| end.min(now))
    }

    /// Time played; stops advancing once the session is over
    pub fn elapsed<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        self.frozen_at(clock.now()).saturating_sub(self.started_at)
    }

    /// Countdown for POOL sessions; `None` for untimed ORDERED sessions
    pub fn time_remaining<C: Clock + ?Sized>(&self, clock: &C) -> Option<Duration> {
        match self.mode {
            Mode::Pool => Some(self.remaining_at(self.frozen_at(clock.now()))),
            Mode::Ordered => None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != Status::Playing
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn bonus_applied(&self) -> bool {
        self.bonus_applied
    }

    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<Duration> {
        self.ended_at
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn target_words(&self) -> &[String] {
        match &self.board {
            Board::Ordered(b) => &b.target_words,
            Board::Pool(_) => &[],
        }
    }

    pub fn progress_index(&self) -> usize {
        match &self.board {
            Board::Ordered(b) => b.progress_index,
            Board::Pool(_) => 0,
        }
    }

    /// Words clicked so far, in sentence order
    pub fn progress_text(&self) -> String {
        match &self.board {
            Board::Ordered(b) => b.target_words[..b.progress_index].join(" "),
            Board::Pool(_) => String::new(),
        }
    }

    pub fn remaining_targets(&self) -> &[String] {
        match &self.board {
            Board::Pool(b) => &b.remaining,
            Board::Ordered(_) => &[],
        }
    }

    pub fn completed_targets(&self) -> &[String] {
        match &self.board {
            Board::Pool(b) => &b.completed,
            Board::Ordered(_) => &[],
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        match &self.board {
            Board::Pool(b) => &b.tiles,
            Board::Ordered(_) => &[],
        }
    }

    pub fn guess_buffer(&self) -> &str {
        match &self.board {
            Board::Pool(b) => &b.guess,
            Board::Ordered(_) => "",
        }
    }

    pub fn selected_tile_ids(&self) -> &[TileId] {
        match &self.board {
            Board::Pool(b) => &b.selected,
            Board::Ordered(_) => &[],
        }
    }

    pub fn has_pending_reset(&self) -> bool {
        matches!(&self.board, Board::Pool(b) if b.pending_reset.is_some())
    }

    /// First clickable tile showing `ch` (case-insensitive)
    pub fn first_available_tile(&self, ch: char) -> Option<TileId> {
        let wanted: Vec<char> = ch.to_lowercase().collect();
        self.tiles()
            .iter()
            .find(|t| t.is_available() && t.ch.to_lowercase().eq(wanted.iter().copied()))
            .map(|t| t.id)
    }

    /// Fraction of the session's targets completed, in `0.0..=1.0`
    pub fn completion_ratio(&self) -> f64 {
        let (done, total) = match &self.board {
            Board::Ordered(b) => (b.progress_index, b.target_words.len()),
            Board::Pool(b) => (b.completed.len(), b.completed.len() + b.remaining.len()),
        };
        if total == 0 {
            0.0
        } else {
            done as f64 / total as f64
        }
    }
}
