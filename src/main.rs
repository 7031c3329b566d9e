pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Position, Rect},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

use scrawl::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{Runner, SketchEvent, TerminalEvents},
    sketch::{Sketch, SketchParams},
    stats::OutcomeDb,
    store::{load_bundled, GestureStore},
    training::TrainingSet,
};

const TICK_RATE_MS: u64 = 100;
const AUTO_RESET_MS: u64 = 2000;

/// freehand symbol sketching tui with template matching and trainable gesture sets
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Draw symbols with the mouse, have them matched against a trainable gesture set after a quiet pause, and track per-symbol accuracy over time."
)]
pub struct Cli {
    /// minimum confidence a match must clear to count
    #[clap(short = 'c', long)]
    confidence: Option<f64>,

    /// symbol the next sketches are expected to be
    #[clap(short = 'e', long)]
    expected: Option<String>,

    /// quiet time in milliseconds before a sketch is committed
    #[clap(short = 'd', long)]
    delay_ms: Option<u64>,

    /// bundled gesture set to preload
    #[clap(short = 'g', long, value_enum, default_value_t = GestureSetArg::Numeric)]
    gesture_set: GestureSetArg,

    /// capture strokes everywhere, ignoring the canvas border
    #[clap(long)]
    unbounded: bool,

    /// keep the canvas as drawn until (r) is pressed
    #[clap(long)]
    manual_reset: bool,

    /// directory for saved gestures (defaults to the user data dir)
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// list the loaded gesture templates and exit
    #[clap(long)]
    list: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum GestureSetArg {
    Numeric,
}

impl GestureSetArg {
    fn as_set_name(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl Cli {
    /// Overlay explicit flags on top of the persisted config
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(confidence) = self.confidence {
            cfg.minimum_confidence = confidence;
        }
        if let Some(ref expected) = self.expected {
            cfg.expected_symbol = Some(expected.clone());
        }
        if let Some(delay_ms) = self.delay_ms {
            cfg.commit_delay_ms = delay_ms;
        }
        if self.unbounded {
            cfg.limited_area = false;
        }
        if self.manual_reset {
            cfg.auto_reset = false;
        }
        cfg.gesture_set = self.gesture_set.as_set_name();
        cfg
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Sketching,
    LabelEntry,
    ExpectedEntry,
    History,
}

#[derive(Debug)]
pub struct App {
    pub sketch: Sketch,
    pub store: GestureStore,
    pub config: Config,
    pub state: AppState,
    pub input_buf: String,
    pub status: String,
    pub frame_area: Rect,
    pub pointer_inside: bool,
    pub last_outcome_at: Option<Instant>,
}

impl App {
    pub fn new(config: Config, store: GestureStore, training: TrainingSet) -> Self {
        let params = SketchParams::from(&config);

        Self {
            sketch: Sketch::with_matcher(params, training),
            store,
            config,
            state: AppState::Sketching,
            input_buf: String::new(),
            status: String::new(),
            frame_area: Rect::default(),
            pointer_inside: false,
            last_outcome_at: None,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_app() -> App {
    let mut sketch = Sketch::with_matcher(SketchParams::default(), TrainingSet::new());
    sketch.gated = false;
    sketch.within_bounds = true;

    App {
        sketch,
        store: GestureStore::with_dir(std::env::temp_dir().join("scrawl-ui-tests")),
        config: Config::default(),
        state: AppState::Sketching,
        input_buf: String::new(),
        status: String::new(),
        frame_area: Rect::new(0, 0, 80, 24),
        pointer_inside: false,
        last_outcome_at: None,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load());

    let store = match cli.data_dir {
        Some(ref dir) => GestureStore::with_dir(dir),
        None => GestureStore::new(),
    };

    let mut training = TrainingSet::from_gestures(load_bundled(&config.gesture_set));
    training.extend(store.load_persisted()?);

    if cli.list {
        for (label, count) in training.label_counts() {
            println!("{label}: {count}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, store, training);
    app.sketch.outcome_db = OutcomeDb::new().ok();
    app.sketch.log_path = AppDirs::log_path();

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    let _ = config_store.save(&app.config);

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(TerminalEvents::spawn(), Duration::from_millis(TICK_RATE_MS));

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            SketchEvent::Tick => on_tick(app),
            SketchEvent::Resize => {}
            SketchEvent::Mouse(mouse) => handle_mouse(app, mouse),
            SketchEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn on_tick(app: &mut App) {
    let now = Instant::now();

    if app.sketch.on_tick(now).is_some() {
        app.status.clear();
        app.last_outcome_at = Some(now);
    }

    // wipe the canvas a moment after each verdict so the next symbol starts
    // clean, unless the user is already drawing it
    if app.config.auto_reset {
        if let Some(at) = app.last_outcome_at {
            if now.duration_since(at) >= Duration::from_millis(AUTO_RESET_MS)
                && !app.sketch.is_dragging()
                && !app.sketch.pending_commit()
            {
                app.sketch.reset();
                app.last_outcome_at = None;
            }
        }
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.state != AppState::Sketching {
        return;
    }

    let inner = ui::capture_rect(app.frame_area);
    let inside = inner.contains(Position::new(mouse.column, mouse.row));

    // crossing the canvas border flips the capture gate
    if inside != app.pointer_inside {
        app.pointer_inside = inside;
        if inside {
            app.sketch.area_enter();
        } else {
            app.sketch.area_exit();
        }
    }

    let x = f64::from(mouse.column) - f64::from(inner.x);
    let y = f64::from(mouse.row) - f64::from(inner.y);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if inside || !app.sketch.gated {
                app.status.clear();
                app.sketch.pointer_down(x, y);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.sketch.pointer_move(x, y);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.sketch.pointer_up(x, y, Instant::now());
        }
        _ => {}
    }
}

/// Returns true when the app should quit
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.state {
        AppState::Sketching => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('r') => {
                app.sketch.reset();
                app.status.clear();
                app.last_outcome_at = None;
            }
            KeyCode::Char('s') => {
                if app.sketch.has_capture() {
                    app.state = AppState::LabelEntry;
                    app.input_buf.clear();
                } else {
                    app.status = "nothing to save yet".to_string();
                }
            }
            KeyCode::Char('e') => {
                app.state = AppState::ExpectedEntry;
                app.input_buf = app.sketch.expected.clone().unwrap_or_default();
            }
            KeyCode::Char('h') => {
                app.state = AppState::History;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                app.sketch.adjust_confidence(0.01);
                app.config.minimum_confidence = app.sketch.minimum_confidence;
            }
            KeyCode::Char('-') => {
                app.sketch.adjust_confidence(-0.01);
                app.config.minimum_confidence = app.sketch.minimum_confidence;
            }
            _ => {}
        },
        AppState::LabelEntry => match key.code {
            KeyCode::Esc => {
                app.state = AppState::Sketching;
                app.input_buf.clear();
            }
            KeyCode::Enter => {
                let label = app.input_buf.clone();
                match app.sketch.save_current_capture(&label, &app.store) {
                    Ok(path) => {
                        app.status = format!("saved {}", path.display());
                    }
                    Err(err) => {
                        app.status = format!("save failed: {err}");
                    }
                }
                app.state = AppState::Sketching;
                app.input_buf.clear();
            }
            KeyCode::Backspace => {
                app.input_buf.pop();
            }
            KeyCode::Char(c) => app.input_buf.push(c),
            _ => {}
        },
        AppState::ExpectedEntry => match key.code {
            KeyCode::Esc => {
                app.state = AppState::Sketching;
                app.input_buf.clear();
            }
            KeyCode::Enter => {
                let trimmed = app.input_buf.trim();
                app.sketch.expected = if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                };
                app.config.expected_symbol = app.sketch.expected.clone();
                app.state = AppState::Sketching;
                app.input_buf.clear();
            }
            KeyCode::Backspace => {
                app.input_buf.pop();
            }
            KeyCode::Char(c) => app.input_buf.push(c),
            _ => {}
        },
        AppState::History => match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                app.state = AppState::Sketching;
            }
            KeyCode::Char('x') => {
                if let Some(ref db) = app.sketch.outcome_db {
                    let _ = db.clear_all();
                }
            }
            _ => {}
        },
    }

    false
}

fn render_history(app: &App, f: &mut Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Modifier, Style},
        widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    };
    use unicode_width::UnicodeWidthStr;

    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Summary table
            Constraint::Length(3), // Instructions
        ])
        .split(area);

    let summary = app
        .sketch
        .outcome_db
        .as_ref()
        .and_then(|db| db.label_summary().ok());
    let (commits, matched) = app
        .sketch
        .outcome_db
        .as_ref()
        .and_then(|db| db.totals().ok())
        .unwrap_or((0, 0));

    let title = Paragraph::new(format!(
        "Recognition History ({} commits, {} matched)",
        commits, matched
    ))
    .block(Block::default().borders(Borders::ALL).title("History"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    match summary {
        Some(rows) if !rows.is_empty() => {
            // labels can be wider than one column (multi-byte symbols)
            let label_width = rows
                .iter()
                .map(|row| UnicodeWidthStr::width(row.label.as_str()))
                .max()
                .unwrap_or(0)
                .max(5) as u16;

            let header = Row::new(vec![
                Cell::from("Label"),
                Cell::from("Attempts"),
                Cell::from("Matches"),
                Cell::from("Hit %"),
                Cell::from("Mean Score"),
            ])
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

            let table_rows: Vec<Row> = rows
                .iter()
                .map(|row| {
                    let hit_rate = if row.attempts > 0 {
                        100.0 * row.matches as f64 / row.attempts as f64
                    } else {
                        0.0
                    };

                    let rate_color = if hit_rate >= 90.0 {
                        Color::Green
                    } else if hit_rate >= 50.0 {
                        Color::Yellow
                    } else {
                        Color::Red
                    };

                    Row::new(vec![
                        Cell::from(row.label.clone()),
                        Cell::from(row.attempts.to_string()),
                        Cell::from(row.matches.to_string()),
                        Cell::from(format!("{:.0}", hit_rate))
                            .style(Style::default().fg(rate_color)),
                        Cell::from(format!("{:.3}", row.mean_score)),
                    ])
                })
                .collect();

            let table = Table::new(
                table_rows,
                &[
                    Constraint::Length(label_width.max(8)),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Length(8),
                    Constraint::Length(12),
                ],
            )
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Per-symbol results"),
            );

            f.render_widget(table, chunks[1]);
        }
        _ => {
            let no_data = Paragraph::new(
                "No recognition history yet.\nSketch a few symbols to populate it!",
            )
            .block(Block::default().borders(Borders::ALL).title("No Data"))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
            f.render_widget(no_data, chunks[1]);
        }
    }

    let instructions = Paragraph::new("(x) clear history | (b)ack (esc)ape")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

fn ui(app: &mut App, f: &mut Frame) {
    app.frame_area = f.area();
    match app.state {
        AppState::History => render_history(app, f),
        _ => f.render_widget(&*app, f.area()),
    }
}
