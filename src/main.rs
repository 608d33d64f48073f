pub mod app_dirs;
pub mod history;
pub mod runtime;
pub mod session;
pub mod store;
pub mod typing_policy;
pub mod ui;
pub mod util;

use crate::{
    app_dirs::AppDirs,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{Phase, Session, SessionError},
    store::{JsonResultStore, ResultStore},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// The cosmetic elapsed-time counter advances once per second.
const TICK_RATE_MS: u64 = 1000;

/// The fixed paragraph every test measures against.
pub const SAMPLE_TEXT: &str = "The quick brown fox jumps over the lazy dog. \
Programming is both an art and a science, requiring creativity and logical thinking. \
Technology continues to evolve at a rapid pace, transforming the way we live and work.";

/// terminal typing speed test with local progress history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a fixed sample paragraph against the clock. Words per minute, accuracy, \
and mistakes are computed on completion and saved locally; a history view charts your progress \
over time."
)]
pub struct Cli {
    /// file to persist results to (defaults to the state directory)
    #[clap(long)]
    history_file: Option<PathBuf>,

    /// open on the history view instead of a new test
    #[clap(long)]
    history: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, strum_macros::Display)]
pub enum AppState {
    Typing,
    Results,
    History,
}

pub struct App {
    pub session: Session,
    pub store: Box<dyn ResultStore>,
    pub state: AppState,
    pub store_warning: Option<String>,
}

impl App {
    pub fn new(store: Box<dyn ResultStore>, target: &str) -> Result<Self, SessionError> {
        Ok(Self {
            session: Session::new(target)?,
            store,
            state: AppState::Typing,
            store_warning: None,
        })
    }

    /// Feed one printable keystroke to the session; on completion, persist
    /// the derived result and switch to the results view.
    pub fn keystroke(&mut self, c: char) {
        if self.session.has_finished() {
            return;
        }

        self.session.write(c);

        if self.session.has_finished() {
            self.record_result();
            self.state = AppState::Results;
        }
    }

    /// Single store-append site: runs once per completed session. A store
    /// failure becomes a warning on the results screen, never a crash.
    fn record_result(&mut self) {
        if let Some(result) = self.session.result().cloned() {
            if let Err(err) = self.store.append(&result) {
                self.store_warning = Some(format!("history not saved: {err}"));
            }
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.store_warning = None;
        self.state = AppState::Typing;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let history_path = cli
        .history_file
        .clone()
        .or_else(AppDirs::history_path)
        .unwrap_or_else(|| PathBuf::from("keyrate_history.json"));
    let store = JsonResultStore::open(history_path);

    // An empty target is a configuration error; it surfaces here, before
    // the terminal enters raw mode.
    let mut app = App::new(Box::new(store), SAMPLE_TEXT)?;
    if cli.history {
        app.state = AppState::History;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                // The counter only moves while a session is running, so
                // completed and reset sessions get no background updates.
                if app.session.phase() == Phase::Running {
                    app.session.on_tick();
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }

                match key.code {
                    KeyCode::Esc => {
                        break;
                    }
                    KeyCode::Tab => {
                        app.state = match app.state {
                            AppState::History if app.session.has_finished() => AppState::Results,
                            AppState::History => AppState::Typing,
                            _ => AppState::History,
                        };
                    }
                    _ => match app.state {
                        AppState::Typing => {
                            if let Some(c) = typing_policy::printable_char(&key) {
                                app.keystroke(c);
                            }
                        }
                        AppState::Results => match key.code {
                            KeyCode::Char('r') => app.reset(),
                            KeyCode::Char('h') => app.state = AppState::History,
                            _ => {}
                        },
                        AppState::History => match key.code {
                            KeyCode::Char('r') => app.reset(),
                            KeyCode::Char('b') => {
                                app.state = if app.session.has_finished() {
                                    AppState::Results
                                } else {
                                    AppState::Typing
                                };
                            }
                            _ => {}
                        },
                    },
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
