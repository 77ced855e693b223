use crate::clock::Clock;
use crate::config::Config;
use crate::content::{Mode, TileId};
use crate::corpus::Corpus;
use crate::error::Result;
use crate::session::{Notification, Session, SessionSettings, HIGH_SCORE_KEY};
use crate::store::{load_score, save_score, ScoreStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{error, info};

/// Discrete input delivered to the engine, one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    ClickWord(usize),
    ClickTile(TileId),
    Tick,
    Restart,
}

/// Owns the active session together with everything needed to rebuild it
pub struct Engine<C: Clock, S: ScoreStore> {
    corpus: Corpus,
    mode: Mode,
    settings: SessionSettings,
    rng: StdRng,
    clock: C,
    store: S,
    session: Session,
    sessions_started: usize,
}

impl<C: Clock, S: ScoreStore> Engine<C, S> {
    /// Validate `config` and start the first session
    pub fn new(config: &Config, clock: C, store: S) -> Result<Self> {
        config.validate()?;
        let corpus = config.resolved_corpus()?;
        let settings = config.session_settings();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let high_score = load_score(&store, HIGH_SCORE_KEY);
        let session = Session::new(
            config.mode,
            &corpus.entries,
            settings,
            &mut rng,
            &clock,
            high_score,
        )?;
        info!(corpus = %corpus.name, entries = corpus.len(), "engine ready");

        Ok(Self {
            corpus,
            mode: config.mode,
            settings,
            rng,
            clock,
            store,
            session,
            sessions_started: 1,
        })
    }

    pub fn handle(&mut self, event: InputEvent) -> Vec<Notification> {
        let out = match event {
            InputEvent::ClickWord(index) => self.session.on_click_word(index, &self.clock),
            InputEvent::ClickTile(id) => self.session.on_click_tile(id, &self.clock),
            InputEvent::Tick => self.session.tick(&self.clock),
            InputEvent::Restart => {
                if let Err(e) = self.restart() {
                    error!(error = %e, "restart failed, keeping current session");
                }
                vec![]
            }
        };
        self.persist_high_score(&out);
        out
    }

    /// Throw away the current session and start a fresh one
    pub fn restart(&mut self) -> Result<()> {
        let high_score = load_score(&self.store, HIGH_SCORE_KEY);
        self.session = Session::new(
            self.mode,
            &self.corpus.entries,
            self.settings,
            &mut self.rng,
            &self.clock,
            high_score,
        )?;
        self.sessions_started += 1;
        info!(sessions = self.sessions_started, "session restarted");
        Ok(())
    }

    fn persist_high_score(&mut self, out: &[Notification]) {
        for notification in out {
            if let Notification::SessionWon {
                final_score,
                new_high_score: true,
                ..
            } = notification
            {
                if save_score(&mut self.store, HIGH_SCORE_KEY, *final_score) {
                    info!(score = final_score, "new high score saved");
                }
            }
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sessions_started(&self) -> usize {
        self.sessions_started
    }

    pub fn elapsed(&self) -> Duration {
        self.session.elapsed(&self.clock)
    }

    pub fn time_remaining(&self) -> Option<Duration> {
        self.session.time_remaining(&self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::GameError;
    use crate::session::Status;
    use crate::store::MemoryScoreStore;
    use assert_matches::assert_matches;

    fn config(mode: Mode, entries: &[&str], k: usize) -> Config {
        Config {
            mode,
            corpus: Some(entries.iter().map(|s| s.to_string()).collect()),
            pool_target_count: k,
            seed: Some(1234),
            ..Config::default()
        }
    }

    fn spell(
        engine: &mut Engine<&ManualClock, MemoryScoreStore>,
        text: &str,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        for ch in text.chars() {
            let id = engine.session().first_available_tile(ch).unwrap();
            out.extend(engine.handle(InputEvent::ClickTile(id)));
        }
        out
    }

    #[test]
    fn empty_corpus_is_rejected_before_any_session() {
        let clock = ManualClock::new();
        let result = Engine::new(
            &config(Mode::Ordered, &[], 3),
            &clock,
            MemoryScoreStore::new(),
        );
        assert!(matches!(result, Err(GameError::EmptyCorpus)));
    }

    #[test]
    fn ordered_end_to_end() {
        let clock = ManualClock::new();
        let cfg = config(Mode::Ordered, &["I am going to the tree"], 3);
        let mut engine = Engine::new(&cfg, &clock, MemoryScoreStore::new()).unwrap();

        clock.advance_secs(3.0);
        let mut last = Vec::new();
        for i in 0..6 {
            last = engine.handle(InputEvent::ClickWord(i));
        }

        assert_matches!(
            last.as_slice(),
            [Notification::SessionWon {
                final_score: 800,
                ..
            }]
        );
        assert_eq!(engine.session().status(), Status::Won);
        assert_eq!(engine.store().get_int(HIGH_SCORE_KEY, 0).unwrap(), 800);
        assert_eq!(engine.store().flushes, 1);
    }

    #[test]
    fn high_score_written_only_when_beaten() {
        let clock = ManualClock::new();
        let cfg = config(Mode::Pool, &["game"], 1);
        let store = MemoryScoreStore::with_value(HIGH_SCORE_KEY, 10_000);
        let mut engine = Engine::new(&cfg, &clock, store).unwrap();
        assert_eq!(engine.session().high_score(), 10_000);

        spell(&mut engine, "game");

        assert_eq!(engine.session().status(), Status::Won);
        assert_eq!(engine.store().get_int(HIGH_SCORE_KEY, 0).unwrap(), 10_000);
        assert_eq!(engine.store().flushes, 0);
    }

    #[test]
    fn pool_end_to_end_with_bonus() {
        let clock = ManualClock::new();
        let cfg = config(Mode::Pool, &["game"], 1);
        let mut engine = Engine::new(&cfg, &clock, MemoryScoreStore::new()).unwrap();

        clock.advance_secs(12.0);
        let out = spell(&mut engine, "game");

        assert_matches!(
            out.last(),
            Some(Notification::SessionWon {
                final_score: 700,
                bonus_applied: true,
                new_high_score: true,
            })
        );
        assert!(engine.session().remaining_targets().is_empty());
    }

    #[test]
    fn tick_times_out_pool_session() {
        let clock = ManualClock::new();
        let cfg = Config {
            session_duration_secs: 5.0,
            ..config(Mode::Pool, &["word", "game"], 2)
        };
        let mut engine = Engine::new(&cfg, &clock, MemoryScoreStore::new()).unwrap();

        clock.advance_secs(4.0);
        assert!(engine.handle(InputEvent::Tick).is_empty());
        assert_eq!(engine.time_remaining(), Some(Duration::from_secs(1)));

        clock.advance_secs(1.0);
        assert_eq!(
            engine.handle(InputEvent::Tick),
            vec![Notification::SessionLost { final_score: 0 }]
        );
        assert!(engine.handle(InputEvent::Tick).is_empty());
        assert_eq!(engine.session().status(), Status::Lost);
    }

    #[test]
    fn restart_replaces_session_and_restarts_timer() {
        let clock = ManualClock::new();
        let cfg = config(Mode::Pool, &["game"], 1);
        let mut engine = Engine::new(&cfg, &clock, MemoryScoreStore::new()).unwrap();
        spell(&mut engine, "game");
        assert_eq!(engine.session().status(), Status::Won);

        clock.advance_secs(20.0);
        assert!(engine.handle(InputEvent::Restart).is_empty());

        let session = engine.session();
        assert_eq!(session.status(), Status::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score(), 700);
        assert_eq!(session.started_at(), Duration::from_secs(20));
        assert!(session.tiles().iter().all(|t| t.is_available()));
        assert_eq!(engine.sessions_started(), 2);
        assert_eq!(engine.elapsed(), Duration::ZERO);
    }

    #[test]
    fn same_seed_same_content() {
        let clock = ManualClock::new();
        let cfg = config(Mode::Pool, &["muhammed", "okbi", "beyza", "puzzle", "word", "game"], 3);

        let a = Engine::new(&cfg, &clock, MemoryScoreStore::new()).unwrap();
        let b = Engine::new(&cfg, &clock, MemoryScoreStore::new()).unwrap();
        assert_eq!(a.session().remaining_targets(), b.session().remaining_targets());
        assert_eq!(a.session().tiles(), b.session().tiles());
    }
}
