use crate::canvas::Rgb;
use crate::countdown;
use crate::error::{AppError, Result};
use chrono::{DateTime, Local};
use std::path::PathBuf;

pub const DEFAULT_FPS: u32 = 60;
pub const DEFAULT_SCALE: f32 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub bg_color: Option<Rgb>,
    pub target: Option<DateTime<Local>>,
    pub quote_file: Option<PathBuf>,
    pub test_midnight: bool,
    pub fps: u32,
    /// Surface units per pixel.
    pub scale: f32,
    pub log_file: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bg_color: None,
            target: None,
            quote_file: None,
            test_midnight: false,
            fps: DEFAULT_FPS,
            scale: DEFAULT_SCALE,
            log_file: None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Options),
    Help,
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| AppError::InvalidArgument(format!("{flag} requires a value")))
}

/// Parses the process arguments, `args[0]` being the program name.
pub fn parse_args(args: &[String]) -> Result<Command> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bg-color" => {
                let hex = value(args, i, "--bg-color")?;
                let color = parse_hex_color(hex).ok_or_else(|| AppError::InvalidColor(hex.to_string()))?;
                options.bg_color = Some(color);
                i += 2;
            }
            "--target" => {
                options.target = Some(countdown::parse_target(value(args, i, "--target")?)?);
                i += 2;
            }
            "--quote-file" => {
                options.quote_file = Some(PathBuf::from(value(args, i, "--quote-file")?));
                i += 2;
            }
            "--log-file" => {
                options.log_file = Some(PathBuf::from(value(args, i, "--log-file")?));
                i += 2;
            }
            "--fps" => {
                let raw = value(args, i, "--fps")?;
                options.fps = match raw.parse::<u32>() {
                    Ok(fps) if (1..=240).contains(&fps) => fps,
                    _ => return Err(AppError::InvalidArgument(format!("--fps expects 1-240, got {raw}"))),
                };
                i += 2;
            }
            "--scale" => {
                let raw = value(args, i, "--scale")?;
                options.scale = match raw.parse::<f32>() {
                    Ok(scale) if scale.is_finite() && scale > 0.0 => scale,
                    _ => return Err(AppError::InvalidArgument(format!("--scale expects a positive number, got {raw}"))),
                };
                i += 2;
            }
            "--test-midnight" => {
                options.test_midnight = true;
                i += 1;
            }
            "help" | "--help" | "-h" => return Ok(Command::Help),
            arg => return Err(AppError::InvalidArgument(format!("unknown option: {arg}"))),
        }
    }

    Ok(Command::Run(options))
}
