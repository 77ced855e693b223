use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::clock::Clock;
use crate::engine::{Engine, InputEvent};
use crate::input::{map_key, Action};
use crate::runtime::GameEvent;
use crate::session::Notification;
use crate::store::ScoreStore;

/// Terminal-side state wrapped around the engine
pub struct App<C: Clock, S: ScoreStore> {
    engine: Engine<C, S>,
    layout_rng: StdRng,
    word_order: Vec<usize>,
    last_notification: Option<Notification>,
    should_quit: bool,
}

impl<C: Clock, S: ScoreStore> App<C, S> {
    /// `seed` fixes the on-screen word order alongside the engine's content
    pub fn new(engine: Engine<C, S>, seed: Option<u64>) -> Self {
        let layout_rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let mut app = Self {
            engine,
            layout_rng,
            word_order: Vec::new(),
            last_notification: None,
            should_quit: false,
        };
        app.shuffle_words();
        app
    }

    pub fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Key(key) => self.on_key(key),
            GameEvent::Tick => {
                self.apply(InputEvent::Tick);
            }
            GameEvent::Resize => {}
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        match map_key(key, self.engine.session(), &self.word_order) {
            Some(Action::Quit) => self.should_quit = true,
            Some(Action::Game(event)) => {
                self.apply(event);
            }
            None => {}
        }
    }

    /// Feed one input to the engine and remember what it reported
    pub fn apply(&mut self, event: InputEvent) -> Vec<Notification> {
        let before = self.engine.sessions_started();
        let out = self.engine.handle(event);

        if self.engine.sessions_started() != before {
            self.last_notification = None;
            self.shuffle_words();
        }
        if let Some(last) = out.last() {
            self.last_notification = Some(last.clone());
        }
        out
    }

    fn shuffle_words(&mut self) {
        let mut order: Vec<usize> = (0..self.engine.session().target_words().len()).collect();
        order.shuffle(&mut self.layout_rng);
        self.word_order = order;
    }

    pub fn engine(&self) -> &Engine<C, S> {
        &self.engine
    }

    /// Sentence indices in on-screen order
    pub fn word_order(&self) -> &[usize] {
        &self.word_order
    }

    pub fn last_notification(&self) -> Option<&Notification> {
        self.last_notification.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
