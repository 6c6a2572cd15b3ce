use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::fs::File;
use std::io::{stdout, BufWriter, Stdout};
use std::sync::OnceLock;
use std::time::Instant;

mod app;
mod canvas;
mod config;
mod countdown;
mod effects;
mod error;
mod frame;
mod quote;

use app::App;
use chrono::{DateTime, Local};
use config::{Command, Options};
use error::Result;
use frame::FramePacer;
use quote::Quote;

static BG_COLOR: OnceLock<(u8, u8, u8)> = OnceLock::new();

pub fn get_bg_color() -> (u8, u8, u8) {
    *BG_COLOR.get().unwrap_or(&(0, 0, 0))
}

fn print_usage() {
    eprintln!("midnight - New Year countdown with a fireworks finale");
    eprintln!();
    eprintln!("Usage: midnight [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bg-color RRGGBB    Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --target DATETIME    Count down to \"YYYY-MM-DD HH:MM:SS\" local time");
    eprintln!("                       (default: next January 1st, 00:00:00)");
    eprintln!("  --quote-file PATH    JSON quote with \"english\", \"nepali\" and \"reference\"");
    eprintln!("  --test-midnight      Start with the celebration already running");
    eprintln!("  --fps N              Frames per second, 1-240 (default: {})", config::DEFAULT_FPS);
    eprintln!("  --scale N            Surface units per pixel (default: {})", config::DEFAULT_SCALE);
    eprintln!("  --log-file PATH      Write logs to PATH (filter with RUST_LOG)");
    eprintln!();
    eprintln!("Keys: t = test midnight effect, f = toggle fullscreen");
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

fn init_logging(options: &Options) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = &options.log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn is_quit(event: &Event) -> bool {
    let Event::Key(key_event) = event else {
        return false;
    };
    key_event.code == KeyCode::Char('q')
        || key_event.code == KeyCode::Esc
        || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
}

fn run(options: &Options) -> Result<()> {
    let target = match options.target {
        Some(target) => target,
        None => countdown::next_new_year(&Local::now())?,
    };
    let quote = quote::load(options.quote_file.as_deref());
    log::info!("counting down to {target}, {} fps, scale {}", options.fps, options.scale);

    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let result = run_app(&mut stdout, options, target, quote);

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn run_app(
    stdout: &mut BufWriter<Stdout>,
    options: &Options,
    target: DateTime<Local>,
    quote: Quote,
) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut pacer = FramePacer::new(options.fps, Instant::now());
    let mut app = App::new(cols, rows, options.scale, target, quote);
    log::debug!("terminal {cols}x{rows}, frame interval {:?}", pacer.interval());

    if options.test_midnight {
        app.celebrate(&mut pacer);
    }

    let result = frame_loop(stdout, &mut app, &mut pacer);
    app.shutdown(&mut pacer);
    result
}

fn frame_loop(stdout: &mut BufWriter<Stdout>, app: &mut App, pacer: &mut FramePacer) -> Result<()> {
    loop {
        if event::poll(pacer.time_until_next(Instant::now()))? {
            let event = event::read()?;
            if is_quit(&event) {
                return Ok(());
            }
            match event {
                Event::Resize(cols, rows) => {
                    app.resize(cols, rows);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => app.handle_event(&event, pacer),
            }
        }

        let Some(due) = pacer.take_due(Instant::now()) else {
            continue;
        };
        app.update(Local::now(), pacer);
        for request in due {
            app.on_frame(request, pacer);
        }
        app.render(stdout)?;
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let options = match config::parse_args(&args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    // Set background color if provided
    if let Some(color) = options.bg_color {
        let _ = BG_COLOR.set(color);
    }

    if let Err(e) = init_logging(&options) {
        eprintln!("Failed to open log file: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(&options) {
        log::error!("{e}");
        eprintln!("midnight: {e}");
        std::process::exit(1);
    }
}
