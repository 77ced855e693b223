// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds the CLI and terminal setup.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod content;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod input;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod store;
pub mod ui;

pub use content::{Mode, TileId};
pub use engine::{Engine, InputEvent};
pub use error::{GameError, Result};
pub use session::{Notification, Session, Status};
