use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wordclick::{
    app::App,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    corpus::Corpus,
    runtime::{CrosstermEventSource, FixedTicker, GameEventSource, Runner, Ticker},
    store::{MemoryScoreStore, ScoreStore, SqliteScoreStore},
    Engine, GameError, Mode,
};

/// click scattered words back into order, or spell hidden words from a pool of letter tiles
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A small terminal word game. In ordered mode, place the words of a sentence back in order. In pool mode, spell the target words from a shared pool of shuffled letter tiles before the clock runs out."
)]
pub struct Cli {
    /// game mode; falls back to the saved config
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    /// read entries from a file (JSON array, JSON corpus object, or one entry per line)
    #[clap(short = 'f', long)]
    corpus_file: Option<PathBuf>,

    /// custom entry to play with; repeat for several
    #[clap(short = 'p', long = "sentence")]
    sentences: Vec<String>,

    /// number of target words in pool mode
    #[clap(short = 't', long)]
    targets: Option<usize>,

    /// pool mode countdown in seconds
    #[clap(short = 'd', long)]
    duration: Option<f64>,

    /// how long an invalid guess stays on screen before the tiles come back
    #[clap(long)]
    reset_delay_ms: Option<u64>,

    /// ordered mode speed bonus window in seconds
    #[clap(long)]
    bonus_window: Option<f64>,

    /// fixed seed for reproducible sessions
    #[clap(short, long)]
    seed: Option<u64>,

    /// store the resulting settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// write logs to this file (filtered by RUST_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// keep the high score in memory only
    #[clap(long)]
    no_persist: bool,
}

impl Cli {
    /// Layer the command line over a loaded config
    fn apply_to(&self, mut cfg: Config) -> Result<Config, GameError> {
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(path) = &self.corpus_file {
            cfg.corpus = Some(Corpus::from_file(path)?.entries);
        }
        if !self.sentences.is_empty() {
            cfg.corpus = Some(self.sentences.clone());
        }
        if let Some(k) = self.targets {
            cfg.pool_target_count = k;
        }
        if let Some(secs) = self.duration {
            cfg.session_duration_secs = secs;
        }
        if let Some(ms) = self.reset_delay_ms {
            cfg.reset_delay_ms = ms;
        }
        if let Some(secs) = self.bonus_window {
            cfg.speed_bonus_window_secs = secs;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let log_file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordclick=info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn open_store(no_persist: bool) -> Box<dyn ScoreStore> {
    if no_persist {
        return Box::new(MemoryScoreStore::new());
    }
    match SqliteScoreStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "score database unavailable, high scores will not persist");
            Box::new(MemoryScoreStore::new())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config_store = FileConfigStore::new();
    let config = match cli.apply_to(config_store.load()) {
        Ok(config) => config,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };
    if cli.save_config {
        config_store.save(&config)?;
        info!(path = %config_store.path().display(), "config saved");
    }

    let engine = Engine::new(&config, SystemClock::new(), open_store(cli.no_persist))?;
    let mut app = App::new(engine, config.seed);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B, C, S, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App<C, S>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    C: Clock,
    S: ScoreStore,
    E: GameEventSource,
    T: Ticker,
{
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit() {
        let event = runner.step();
        app.on_event(event);
        // ticks redraw too, the countdown moves
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    info!(sessions = app.engine().sessions_started(), "quitting");
    Ok(())
}
