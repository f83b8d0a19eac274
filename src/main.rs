mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
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
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

use trisense::{
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{ConfigStore, FileConfigStore},
    grade::{format_score, grade_record, legend},
    number::{NumberEngine, NumberPhase, CELL_COUNT},
    random::StdRandom,
    ranking::{best_scores, RankingGateway},
    record::{GameKind, GameRecord},
    runtime::{EventPump, LoopEvent, TerminalInput, TickGate},
    session::{conclude, GameSession, Outcome},
    store::SqliteRanking,
};

const TICK_RATE_MS: u64 = 100;

/// three timed reaction and precision games with a local leaderboard
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Train reaction speed, internal timing and visual search with three short games. Every finished round is graded and kept in a local leaderboard."
)]
pub struct Cli {
    /// records database to use instead of the default location
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// play a game directly, skipping the home screen
    Play {
        #[clap(value_enum)]
        game: GameArg,
    },
    /// print the best records for a game
    Ranking {
        #[clap(value_enum)]
        game: GameArg,

        /// number of records to show
        #[clap(short = 'n', long)]
        limit: Option<usize>,
    },
    /// print the grade bands for a game
    Grades {
        #[clap(value_enum)]
        game: GameArg,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
enum GameArg {
    Reflex,
    Timing,
    Number,
}

impl From<GameArg> for GameKind {
    fn from(arg: GameArg) -> Self {
        match arg {
            GameArg::Reflex => GameKind::Reflex,
            GameArg::Timing => GameKind::Timing,
            GameArg::Number => GameKind::Number,
        }
    }
}

pub type Session = GameSession<SystemClock, StdRandom>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Home,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub screen: Screen,
    pub selected: GameKind,
    pub session: Option<Session>,
    pub cell_input: String,
    pub last_outcome: Option<Outcome>,
    pub best: Vec<(GameKind, Option<GameRecord>)>,
    gateway: Box<dyn RankingGateway>,
}

impl App {
    pub fn new(gateway: Box<dyn RankingGateway>, selected: GameKind) -> Self {
        let best = best_scores(&gateway);
        Self {
            screen: Screen::Home,
            selected,
            session: None,
            cell_input: String::new(),
            last_outcome: None,
            best,
            gateway,
        }
    }

    pub fn play(&mut self, kind: GameKind) {
        self.leave_game();
        self.selected = kind;
        self.session = Some(GameSession::new(
            kind,
            SystemClock::new(),
            StdRandom::new(),
        ));
        self.screen = Screen::Playing;
        tracing::info!("playing {}", kind);
    }

    fn leave_game(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
        self.cell_input.clear();
        self.last_outcome = None;
        self.screen = Screen::Home;
        self.best = best_scores(&self.gateway);
    }

    fn tick_interval(&self) -> Duration {
        self.session
            .as_ref()
            .map_or(Duration::from_millis(TICK_RATE_MS), |s| s.tick_interval())
    }

    fn on_tick(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.on_tick();
        }
    }

    fn finish(&mut self, record: GameRecord) {
        self.last_outcome = Some(conclude(&mut self.gateway, record));
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        match self.screen {
            Screen::Home => self.on_home_key(key),
            Screen::Playing => {
                self.on_game_key(key);
                Flow::Continue
            }
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) -> Flow {
        let idx = GameKind::ALL
            .iter()
            .position(|k| *k == self.selected)
            .unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Up => self.selected = GameKind::ALL[idx.saturating_sub(1)],
            KeyCode::Down => self.selected = GameKind::ALL[(idx + 1).min(GameKind::ALL.len() - 1)],
            KeyCode::Enter | KeyCode::Char(' ') => self.play(self.selected),
            KeyCode::Char(c @ '1'..='3') => {
                let pick = c as usize - '1' as usize;
                self.play(GameKind::ALL[pick]);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn on_game_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.leave_game();
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let record = match session {
            GameSession::Number(engine) if engine.phase() == NumberPhase::Running => {
                on_cell_key(engine, &mut self.cell_input, key)
            }
            other => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.cell_input.clear();
                    other.primary_action()
                }
                _ => None,
            },
        };

        if let Some(record) = record {
            self.finish(record);
        }
    }
}

/// Cells are picked by typing their number and confirming with enter.
fn on_cell_key(
    engine: &mut NumberEngine<SystemClock, StdRandom>,
    input: &mut String,
    key: KeyEvent,
) -> Option<GameRecord> {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() && input.len() < 2 => {
            input.push(c);
            None
        }
        KeyCode::Backspace => {
            input.pop();
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let value = input.parse::<u8>().ok();
            input.clear();
            value
                .filter(|v| (1..=CELL_COUNT).contains(v))
                .and_then(|v| engine.on_cell_click(v))
        }
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Some(Command::Grades { game }) = cli.command {
        print_grades(game.into());
        return Ok(());
    }

    let config = FileConfigStore::new().load();
    let db_path = cli.db.clone().or_else(|| config.db_path.clone());
    let gateway: Box<dyn RankingGateway> = match db_path {
        Some(path) => Box::new(SqliteRanking::open(path)?),
        None => Box::new(SqliteRanking::open_default()?),
    };

    match cli.command {
        Some(Command::Ranking { game, limit }) => {
            print_ranking(&*gateway, game.into(), limit.unwrap_or(config.ranking_limit))
        }
        Some(Command::Play { game }) => run_tui(gateway, Some(game.into()), config.default_game_kind()),
        _ => run_tui(gateway, None, config.default_game_kind()),
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("TRISENSE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn print_ranking(gateway: &dyn RankingGateway, kind: GameKind, limit: usize) -> Result<(), Box<dyn Error>> {
    let records = gateway.top_records(kind, limit)?;

    println!("{} - top {}", kind, limit);
    if records.is_empty() {
        println!("  no records yet");
    }
    for (i, record) in records.iter().enumerate() {
        println!(
            "{:>3}. {:>10}  {:<2}  {}",
            i + 1,
            format_score(kind, record.score()),
            grade_record(record).label(),
            record.created_at().format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

fn print_grades(kind: GameKind) {
    println!("{} grades", kind);
    for (grade, range) in legend(kind) {
        println!("  {:<2}  {}", grade.label(), range);
    }
}

fn run_tui(
    gateway: Box<dyn RankingGateway>,
    game: Option<GameKind>,
    default_game: GameKind,
) -> Result<(), Box<dyn Error>> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(gateway, default_game);
    if let Some(kind) = game {
        app.play(kind);
    }
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let pump = EventPump::new(TerminalInput::spawn(), Duration::from_millis(TICK_RATE_MS));

    let mut gate = TickGate::new();

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match pump.step_within(gate.remaining(app.tick_interval())) {
            LoopEvent::Tick => {
                gate.mark();
                app.on_tick();
            }
            LoopEvent::Resize => {}
            LoopEvent::Key(key) => {
                // ctrl+c to quit
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
        }

        // a steady key stream never lets the pump time out
        if gate.due(app.tick_interval()) {
            app.on_tick();
        }
    }

    app.leave_game();
    Ok(())
}
