mod app;
mod domain;
mod error;
mod input;
mod logging;
mod persistence;
mod ticker;
mod tracker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::{duration, StatusFilter};
use persistence::{ensure_data_dir, init_local_data_dir, FileKv};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use tracker::Tracker;

#[derive(Parser)]
#[command(name = "tasktick")]
#[command(about = "A terminal task tracker with a single running stopwatch", long_about = None)]
struct Cli {
    /// Use this data directory instead of .tasktick / ~/.tasktick
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tasktick directory in the current directory
    Init,
    /// Print tasks with their tracked time
    List {
        /// Only show tasks with this status ("To Do", "In Progress", "Done" or "all")
        #[arg(short, long)]
        status: Option<String>,
        /// Comma-separated tags; a task matching any of them is shown
        #[arg(short, long)]
        tags: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let current_dir = std::env::current_dir().context("Could not determine current directory")?;
            let data_dir = init_local_data_dir(&current_dir)?;
            println!("Initialized tasktick directory: {}", data_dir.display());
            println!();
            println!("tasktick will now use this local directory for task storage.");
            println!("Run 'tasktick' to start tracking tasks.");
            Ok(())
        }
        Some(Commands::List { status, tags }) => {
            let data_dir = ensure_data_dir(cli.data_dir.as_deref())?;
            let _guard = logging::init_logging(&data_dir)?;
            list_tasks(&data_dir, status.as_deref(), tags.as_deref().unwrap_or(""))
        }
        None => run_tui(cli.data_dir.as_deref()),
    }
}

fn list_tasks(data_dir: &Path, status: Option<&str>, tags: &str) -> Result<()> {
    let status_filter = match status {
        Some(s) => s.parse::<StatusFilter>()?,
        None => StatusFilter::All,
    };

    let tracker = Tracker::with_system_clock(Box::new(FileKv::open(data_dir)?));
    let tasks = tracker.visible(status_filter, tags);
    tracing::debug!(shown = tasks.len(), total = tracker.all().len(), "listing tasks");

    for task in tasks {
        let mark = if task.completed { "✓" } else { " " };
        let mut line = format!(
            "[{}] {:<40} {:<12} {}",
            mark,
            task.text,
            task.status.label(),
            duration::encode(task.duration)
        );
        if !task.tags.is_empty() {
            line.push_str(&format!("  [{}]", task.tags_joined()));
        }
        println!("{}", line);
    }
    Ok(())
}

fn run_tui(data_dir_override: Option<&Path>) -> Result<()> {
    let data_dir = ensure_data_dir(data_dir_override)?;
    let _guard = logging::init_logging(&data_dir)?;

    // Show which directory we're using
    eprintln!("Using tasktick directory: {}", data_dir.display());
    tracing::info!(dir = %data_dir.display(), "starting tasktick");

    let tracker = Tracker::with_system_clock(Box::new(FileKv::open(&data_dir)?));
    let mut app = AppState::new(tracker, Box::new(FileKv::open(&data_dir)?));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Commit the running timer before exit
    app.shutdown();

    if let Err(e) = app.save() {
        eprintln!("Error saving preferences: {}", e);
    }

    // Print any errors
    if let Err(err) = result {
        tracing::error!(error = %err, "event loop failed");
        eprintln!("Error: {}", err);
    }

    tracing::info!("tasktick exited");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let tick_rate = ticker::tick_duration();

    loop {
        // Render
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        // Tick the stopwatch
        app.tick();

        // Autosave preferences if needed
        if app.needs_save {
            app.save()?;
        }
    }
}
