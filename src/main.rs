//! Skyscape - Entry Point
//!
//! Initializes logging and the terminal, builds the sky from its config,
//! and runs the main loop. `--headless` runs the simulation without a
//! terminal and logs a census every simulated second.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use skyscape::config::{default_config_path, export_config, load_config};
use skyscape::sky::{Sky, SkyEvent};
use skyscape::ui::App;
use skyscape::world::Viewport;

/// Target frames per second for the main loop
const TARGET_FPS: u64 = 60;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

/// Ambient sky simulation for the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Config file to load (RON). Defaults to the per-user config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Fixed RNG seed; overrides the seed in the config file.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
    /// Run without a terminal for this many simulated seconds.
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u32).range(1..))]
    headless: Option<u32>,
    /// Write the default config to PATH and exit.
    #[arg(long = "export-config", value_name = "PATH")]
    export_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.export_config {
        init_logging(None);
        export_config(&Default::default(), path)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    match cli.headless {
        Some(seconds) => {
            init_logging(None);
            let sky = build_sky(&cli, Viewport::default())?;
            run_headless(sky, seconds)
        }
        None => {
            // Log to file so output does not interfere with the TUI
            init_logging(Some("skyscape.log"));
            run_terminal(&cli)
        }
    }
}

fn init_logging(log_file: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(name) = log_file {
        match OpenOptions::new().create(true).write(true).truncate(true).open(name) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                // No log file, no logs: stderr would corrupt the screen
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    builder.init();
    log::info!("Starting Skyscape v{}", env!("CARGO_PKG_VERSION"));
}

fn build_sky(cli: &Cli, viewport: Viewport) -> Result<Sky> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    Ok(Sky::new(config, viewport)?)
}

/// Fixed-step simulation without a terminal
fn run_headless(mut sky: Sky, seconds: u32) -> Result<()> {
    let ticks_per_second = TARGET_FPS as u32;
    let step = Duration::from_secs(1) / ticks_per_second;
    let mut spawned = 0usize;
    let mut released = 0usize;

    for second in 1..=seconds {
        for _ in 0..ticks_per_second {
            for event in sky.update(step) {
                match event {
                    SkyEvent::Spawned { .. } => spawned += 1,
                    SkyEvent::Released { .. } => released += 1,
                    SkyEvent::PoolExhausted => log::debug!("Cloud pool exhausted"),
                    SkyEvent::BirdCooldownElapsed => log::debug!("Birds may spawn again"),
                }
            }
        }
        log::info!("t={}s {}", second, sky.census());
    }

    log::info!(
        "Headless run finished: {} spawned, {} released, {} live",
        spawned,
        released,
        sky.census().total()
    );
    Ok(())
}

fn run_terminal(cli: &Cli) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let result = build_sky(cli, App::viewport_for(Rect::new(0, 0, size.width, size.height)))
        .and_then(|mut sky| {
            let mut app = App::new();
            run_loop(&mut terminal, &mut app, &mut sky)
        });

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Skyscape exited with error: {:#}", e);
    }

    log::info!("Skyscape shut down cleanly");
    result
}

/// Main loop
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    sky: &mut Sky,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last_frame);
        last_frame = frame_start;

        // Handle input
        if event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match app.handle_input(key) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
                Event::Resize(width, height) => {
                    if let Err(e) = sky.resize(App::viewport_for(Rect::new(0, 0, width, height))) {
                        log::warn!("Ignoring resize: {}", e);
                    }
                }
                _ => {}
            }
        }

        if !app.is_paused() {
            sky.update(delta);
        }

        terminal.draw(|frame| {
            app.render(frame, sky);
        })?;

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }

    Ok(())
}
