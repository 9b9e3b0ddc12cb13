//! keyroll - A piano keyboard and note roll in the terminal
//!
//! This is the main entry point for the application.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing_subscriber::EnvFilter;

use keyroll::config::{default_config_path, Config};
use keyroll::input::terminal::{translate, CellScale};
use keyroll::replay::{self, Summary};
use keyroll::ui;
use keyroll::view::PianoView;

/// Natural keys per arrow-key pan step
const PAN_STEP_KEYS: f64 = 7.0;

/// Frame budget while idle
const FRAME: Duration = Duration::from_millis(16);

/// keyroll - piano keyboard and note roll
#[derive(Parser, Debug)]
#[command(name = "keyroll")]
#[command(about = "A piano keyboard and note roll in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive keyboard (default)
    Run(RunArgs),
    /// Feed a JSON event script to a headless view and print the result
    Replay {
        /// Path to the script
        file: PathBuf,
        /// Config file to use instead of the default
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Config file to use instead of the default
    #[arg(long)]
    config: Option<PathBuf>,
    /// Pixels per terminal column
    #[arg(long, default_value_t = 8.0)]
    cell_width: f64,
    /// Pixels per terminal row
    #[arg(long, default_value_t = 16.0)]
    cell_height: f64,
    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => run_keyroll(args),
        Some(Commands::Replay { file, config }) => run_replay(&file, config.as_deref()),
        Some(Commands::Completions { shell }) => {
            print_completions(shell);
            Ok(())
        }
        None => run_keyroll(RunArgs {
            cell_width: 8.0,
            cell_height: 16.0,
            ..RunArgs::default()
        }),
    }
}

/// Print shell completions
fn print_completions(shell: clap_complete::Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "keyroll", &mut std::io::stdout());
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    Config::load(&path).with_context(|| format!("loading config from {}", path.display()))
}

/// Route tracing output to a file, filtered by RUST_LOG (default `keyroll=info`)
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyroll=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run a script headlessly and print the resulting state as JSON
fn run_replay(file: &Path, config: Option<&Path>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyroll=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config(config)?;
    let text = fs::read_to_string(file)
        .with_context(|| format!("reading script {}", file.display()))?;
    let steps = replay::parse(&text).context("parsing script")?;

    let mut view = PianoView::new(config, 1024.0, 600.0);
    replay::run(&mut view, &steps);

    println!("{}", serde_json::to_string_pretty(&Summary::of(&view))?);
    Ok(())
}

/// Run the interactive keyboard
fn run_keyroll(args: RunArgs) -> Result<()> {
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let config = load_config(args.config.as_deref())?;
    let scale = CellScale {
        cell_width: args.cell_width,
        cell_height: args.cell_height,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let area = ui::view_area(Rect::new(0, 0, size.width, size.height));
    let (width, height) = scale.pixel_size(area.width, area.height);
    let mut view = PianoView::new(config, width, height);
    tracing::info!(width, height, "keyroll started");

    // Run the main loop
    let result = run_app(&mut terminal, &mut view, scale);
    view.dispose();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

/// Main application loop
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    view: &mut PianoView,
    scale: CellScale,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut last_tick = Instant::now();
    let mut area = Rect::default();

    loop {
        // Draw the UI
        terminal.draw(|frame| {
            area = ui::view_area(frame.area());
            ui::render(frame, view, scale);
        })?;

        if event::poll(FRAME)? {
            // Drain all pending events (prevents input queue buildup during slow renders)
            loop {
                match event::read()? {
                    Event::Key(key_event) => {
                        if handle_key(key_event, view) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse_event) => {
                        if let Some(pointer) = translate(mouse_event, scale, (area.x, area.y)) {
                            let dispatch = view.handle_event(&pointer);
                            view.apply_key_actions(&dispatch.keys);
                        }
                    }
                    Event::Resize(cols, rows) => {
                        let resized = ui::view_area(Rect::new(0, 0, cols, rows));
                        let (width, height) = scale.pixel_size(resized.width, resized.height);
                        view.set_pixel_size(width, height);
                    }
                    _ => {}
                }
                if !event::poll(Duration::from_millis(0))? {
                    break;
                }
            }
        }

        // Calculate delta time for the animator and the roll
        let now = Instant::now();
        let delta = now - last_tick;
        last_tick = now;
        view.tick(delta.as_secs_f64() * 1000.0);
    }
}

/// Handle a key press. Returns true when the app should quit.
fn handle_key(key: KeyEvent, view: &mut PianoView) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('+') | KeyCode::Char('=') => view.zoom_by(-1.0),
        KeyCode::Char('-') => view.zoom_by(1.0),
        KeyCode::Left => view.pan_by_keys(-PAN_STEP_KEYS),
        KeyCode::Right => view.pan_by_keys(PAN_STEP_KEYS),
        KeyCode::Char('r') => view.reset_zoom(),
        _ => {}
    }
    false
}
