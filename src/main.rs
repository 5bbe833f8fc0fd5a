mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers},
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
    path::{Path, PathBuf},
    sync::mpsc::Sender,
};
use tracing::{info, warn};

use touchtype::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    exercise::{BundledSource, DirectorySource},
    input::LineInput,
    logging,
    runtime::{AppEvent, ChannelTickScheduler, EventHub, SystemClock},
    Catalog, InputOutcome, KeyboardLayout, SessionController, SessionError,
};

/// line-by-line touch typing trainer with an on-screen keyboard
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Type exercises one line at a time. Mistakes are tracked per key, and the keys you miss most are highlighted on the on-screen keyboard."
)]
pub struct Cli {
    /// directory with extra exercise files (*.txt)
    #[clap(short = 'd', long)]
    exercises_dir: Option<PathBuf>,

    /// start the exercise with this id (file name without .txt) right away
    #[clap(short = 'e', long)]
    exercise: Option<String>,

    /// keyboard layout for exercises that do not name one (english, norwegian)
    #[clap(short = 'l', long)]
    layout: Option<KeyboardLayout>,

    /// list the available exercises and exit
    #[clap(long)]
    list: bool,

    /// hide the on-screen keyboard
    #[clap(long)]
    no_keyboard: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.exercises_dir {
            config.exercises_dir = Some(dir.clone());
        }
        if let Some(layout) = self.layout {
            config.default_layout = layout;
        }
        if self.no_keyboard {
            config.show_keyboard = false;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Typing,
    Results,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub type LiveSession = SessionController<ChannelTickScheduler, SystemClock>;

#[derive(Debug)]
pub struct App {
    pub catalog: Catalog,
    pub config: Config,
    pub state: AppState,
    pub selected: usize,
    pub input: LineInput,
    /// Present while typing and on the results screen
    pub session: Option<LiveSession>,
    /// Shown under the exercise list
    pub status: Option<String>,
    tick_tx: Sender<AppEvent>,
}

impl App {
    pub fn new(catalog: Catalog, config: Config, tick_tx: Sender<AppEvent>) -> Self {
        Self {
            catalog,
            config,
            state: AppState::Menu,
            selected: 0,
            input: LineInput::new(),
            session: None,
            status: None,
            tick_tx,
        }
    }

    pub fn select_by_id(&mut self, id: &str) -> bool {
        match self.catalog.exercises().iter().position(|e| e.id == id) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    /// Start (or restart) the selected exercise
    pub fn start_selected(&mut self) -> Result<(), SessionError> {
        self.leave_session();

        let Some(exercise) = self.catalog.exercises().get(self.selected).cloned() else {
            self.status = Some("no exercise selected".to_string());
            self.state = AppState::Menu;
            return Ok(());
        };
        let session = SessionController::with_options(
            exercise,
            ChannelTickScheduler::new(self.tick_tx.clone()),
            SystemClock,
            self.config.session_options(),
        )?;

        self.session = Some(session);
        self.status = None;
        self.state = AppState::Typing;
        Ok(())
    }

    /// Drop the current session, cancelling its timer
    pub fn leave_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel();
        }
        self.input.clear();
    }

    pub fn on_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Tick => {
                if self.state == AppState::Typing {
                    if let Some(session) = self.session.as_mut() {
                        session.on_tick();
                    }
                }
                Control::Continue
            }
            AppEvent::Resize => Control::Continue,
            AppEvent::InputClosed(reason) => {
                warn!(%reason, "quitting without terminal input");
                self.leave_session();
                Control::Quit
            }
            AppEvent::Paste(text) => {
                if self.state == AppState::Typing {
                    let changed = self.input.on_paste(&text).map(str::to_owned);
                    if let Some(text) = changed {
                        self.feed(&text);
                    }
                }
                Control::Continue
            }
            AppEvent::Key(key) => self.on_key(key),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.leave_session();
            return Control::Quit;
        }

        match self.state {
            AppState::Menu => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected + 1 < self.catalog.len() {
                        self.selected += 1;
                    }
                }
                KeyCode::Enter => {
                    if let Err(err) = self.start_selected() {
                        warn!(error = %err, "could not start exercise");
                        self.status = Some(err.to_string());
                    }
                }
                KeyCode::Char('?') => self.state = AppState::Help,
                KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
                _ => {}
            },
            AppState::Typing => {
                if key.code == KeyCode::Esc {
                    self.leave_session();
                    self.state = AppState::Menu;
                } else {
                    let changed = self.input.on_key(key).map(str::to_owned);
                    if let Some(text) = changed {
                        self.feed(&text);
                    }
                }
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') => {
                    if let Err(err) = self.start_selected() {
                        self.status = Some(err.to_string());
                        self.state = AppState::Menu;
                    }
                }
                KeyCode::Enter | KeyCode::Esc => {
                    self.leave_session();
                    self.state = AppState::Menu;
                }
                KeyCode::Char('q') => {
                    self.leave_session();
                    return Control::Quit;
                }
                _ => {}
            },
            AppState::Help => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                    self.state = AppState::Menu;
                }
                _ => {}
            },
        }

        Control::Continue
    }

    fn feed(&mut self, text: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.on_input_changed(text) {
            InputOutcome::Ignored | InputOutcome::Updated => {}
            InputOutcome::LineAdvanced { .. } => self.input.clear(),
            InputOutcome::Completed(_) => {
                self.input.clear();
                self.state = AppState::Results;
            }
        }
    }
}

fn load_catalog(config: &Config) -> Result<Catalog, Box<dyn Error>> {
    let bundled = BundledSource;
    let Some(dir) = config.exercises_dir() else {
        return Ok(Catalog::load(&[&bundled])?);
    };
    let user = DirectorySource::new(dir).with_default_layout(config.default_layout);
    Ok(Catalog::load(&[&bundled, &user])?)
}

/// Install the file logger, returning a notice for stderr if that fails
fn init_logging(path: &Path) -> Option<String> {
    logging::init(path)
        .err()
        .map(|err| format!("touchtype: logging disabled ({}): {err}", path.display()))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        // logging is best effort; the app works without it
        if let Some(notice) = init_logging(&path) {
            eprintln!("{notice}");
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    let catalog = load_catalog(&config)?;

    if cli.list {
        for exercise in catalog.exercises() {
            println!(
                "{:<24} {} ({} lines, {})",
                exercise.id,
                exercise.title,
                exercise.line_count(),
                exercise.layout
            );
        }
        return Ok(());
    }

    if catalog.is_empty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "no exercises found").exit();
    }

    let hub = EventHub::new();
    let mut app = App::new(catalog, config, hub.sender());

    if let Some(id) = &cli.exercise {
        if !app.select_by_id(id) {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, format!("unknown exercise '{id}'"))
                .exit();
        }
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    hub.spawn_terminal_reader();
    if cli.exercise.is_some() {
        if let Err(err) = app.start_selected() {
            app.status = Some(err.to_string());
        }
    }
    let result = start_tui(&mut terminal, &mut app, &hub);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    hub: &EventHub,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| draw(app, f))?;

    loop {
        let event = hub.next()?;
        if app.on_event(event) == Control::Quit {
            break;
        }
        terminal.draw(|f| draw(app, f))?;
    }

    app.leave_session();
    Ok(())
}

fn draw(app: &App, f: &mut Frame) {
    ui::screen::current_screen(&app.state).render(app, f);
}
