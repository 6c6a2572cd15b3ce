use crate::canvas::{Canvas, Label, Rgb, Surface};
use crate::countdown::TimeRemaining;
use crate::effects::fireworks::{FireworksConfig, FireworksEngine};
use crate::frame::{FrameRequest, FrameScheduler};
use crate::quote::Quote;
use chrono::{DateTime, Local};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use std::io::Write;

pub const CHURCH_NAME: &str = "Anugrah Church";
const GREETING_NEPALI: &str = "नयाँ वर्षको शुभकामना अनुग्रह चर्च";
const GREETING_ROMAN: &str = "Naya Barshako Shubhakamana Anugrah Church";
const GREETING_ENGLISH: &str = "Happy New Year Anugrah Church";
const TITLE: &str = "A New Beginning";
const SUBTITLE: &str = "Join us as we count down to a year of growth, grace, and new possibilities in the presence of God.";

const WHITE: Rgb = (255, 255, 255);
const DIM: Rgb = (153, 153, 153);
const FAINT: Rgb = (102, 102, 102);
const GRAY: Rgb = (156, 163, 175);
const PURPLE: Rgb = (147, 51, 234);
const LILAC: Rgb = (192, 132, 252);
const AMBER: Rgb = (251, 191, 36);
const RED: Rgb = (248, 113, 113);
const GLOW_PURPLE: Rgb = (88, 28, 135);
const GLOW_BLUE: Rgb = (30, 58, 138);

// 3x5 digit glyphs, one row per entry, high bit on the left
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const UNIT_LABELS: [&str; 4] = ["DAYS", "HOURS", "MINUTES", "SECONDS"];
const GROUP_GAP: usize = 3;

/// The countdown screen and its fireworks finale.
pub struct App {
    cols: usize,
    rows: usize,
    scale: f32,
    backdrop: Canvas,
    fireworks: FireworksEngine<Canvas>,
    target: DateTime<Local>,
    remaining: TimeRemaining,
    quote: Quote,
    celebrating: bool,
    header_visible: bool,
    test_available: bool,
    frame: u64,
    output_buf: Vec<u8>,
}

// Where the clock sits, in pixels.
struct ClockLayout {
    row: usize,
    dot: usize,
    left: usize,
    groups: Vec<(String, usize)>,
}

fn viewport(cols: usize, rows: usize, scale: f32) -> (u32, u32) {
    (
        (cols as f32 * scale).floor() as u32,
        (rows as f32 * 2.0 * scale).floor() as u32,
    )
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let len = line.chars().count();
        if len > 0 && len + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

impl App {
    pub fn new(cols: u16, rows: u16, scale: f32, target: DateTime<Local>, quote: Quote) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        let (width, height) = viewport(cols, rows, scale);

        let config = FireworksConfig {
            fade_color: crate::get_bg_color(),
            ..FireworksConfig::default()
        };
        let mut fireworks = FireworksEngine::new(config, fastrand::Rng::new());
        fireworks.initialize(Canvas::new(width, height, scale), width, height);

        Self {
            cols,
            rows,
            scale,
            backdrop: Canvas::new(width, height, scale),
            fireworks,
            target,
            remaining: TimeRemaining::default(),
            quote,
            celebrating: false,
            header_visible: true,
            test_available: true,
            frame: 0,
            output_buf: Vec::with_capacity(cols * rows * 25),
        }
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn remaining(&self) -> TimeRemaining {
        self.remaining
    }

    pub fn fireworks(&self) -> &FireworksEngine<Canvas> {
        &self.fireworks
    }

    pub fn update(&mut self, now: DateTime<Local>, scheduler: &mut impl FrameScheduler) {
        self.frame = self.frame.wrapping_add(1);
        self.remaining = TimeRemaining::until(&self.target, &now);
        if !self.celebrating && now >= self.target {
            self.celebrate(scheduler);
        }
    }

    pub fn celebrate(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.celebrating {
            return;
        }
        self.celebrating = true;
        self.test_available = false;
        log::info!("celebration started");
        self.fireworks.start(scheduler);
    }

    pub fn handle_event(&mut self, event: &Event, scheduler: &mut impl FrameScheduler) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('t') | KeyCode::Char('T') if self.test_available => {
                self.celebrate(scheduler);
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.header_visible = !self.header_visible;
            }
            _ => {}
        }
    }

    pub fn on_frame(&mut self, request: FrameRequest, scheduler: &mut impl FrameScheduler) -> bool {
        self.fireworks.on_frame(request, scheduler)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols as usize;
        self.rows = rows as usize;
        let (width, height) = viewport(self.cols, self.rows, self.scale);
        self.backdrop.set_size(width, height);
        self.fireworks.resize(width, height);
    }

    pub fn shutdown(&mut self, scheduler: &mut impl FrameScheduler) {
        self.fireworks.stop(scheduler);
    }

    pub fn render(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        let mut labels = self.chrome_labels();
        self.output_buf.clear();

        if self.celebrating {
            labels.extend(self.celebration_labels());
            let canvas = self.fireworks.surface().unwrap_or(&self.backdrop);
            canvas.encode(&mut self.output_buf, &labels)?;
        } else {
            let (clock, countdown) = self.countdown_scene();
            labels.extend(countdown);
            self.draw_backdrop(&clock);
            self.backdrop.encode(&mut self.output_buf, &labels)?;
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }

    fn centered(&self, text: &str) -> usize {
        self.cols.saturating_sub(text.chars().count()) / 2
    }

    fn text_width(&self) -> usize {
        self.cols.saturating_sub(4).clamp(10, 64)
    }

    fn content_top(&self, height: usize) -> usize {
        let header = if self.header_visible { 2 } else { 0 };
        (self.rows.saturating_sub(height) / 2).max(header)
    }

    fn chrome_labels(&self) -> Vec<Label> {
        let mut labels = Vec::new();
        let bottom = self.rows.saturating_sub(1);

        if self.header_visible {
            let name = format!("◆ {}", CHURCH_NAME.to_uppercase());
            labels.push(Label::new(0, 2, name, WHITE).bold());
            let hint = "[f] Enter Fullscreen  [q] Quit";
            let col = self.cols.saturating_sub(hint.chars().count() + 2);
            labels.push(Label::new(0, col, hint, DIM));
        } else {
            let hint = "[f] ✕";
            labels.push(Label::new(bottom, self.cols.saturating_sub(7), hint, FAINT));
        }

        if self.test_available && !self.celebrating {
            labels.push(Label::new(bottom, 2, "[t] TEST MIDNIGHT EFFECT", RED));
        }
        labels
    }

    fn clock_layout(&self) -> ClockLayout {
        let r = self.remaining;
        let groups: Vec<(String, usize)> = [r.days, r.hours, r.minutes, r.seconds]
            .iter()
            .map(|value| {
                let digits = format!("{value:02}");
                let width = digits.len() * 4 - 1;
                (digits, width)
            })
            .collect();
        let total: usize = groups.iter().map(|(_, w)| w).sum::<usize>() + GROUP_GAP * (groups.len() - 1);
        let dot = if self.cols >= total * 2 + 4 { 2 } else { 1 };

        ClockLayout {
            row: 0,
            dot,
            left: self.cols.saturating_sub(total * dot) / 2,
            groups,
        }
    }

    // Countdown text plus the clock position, centred vertically.
    fn countdown_scene(&self) -> (ClockLayout, Vec<Label>) {
        let mut clock = self.clock_layout();
        let width = self.text_width();
        let mut labels = Vec::new();
        let mut row = 0;

        let pill = "COUNTDOWN TO NEW YEAR";
        labels.push(Label::new(row, self.centered(pill), pill, LILAC).bold());
        row += 2;
        labels.push(Label::new(row, self.centered(TITLE), TITLE, WHITE).bold());
        row += 1;
        for line in wrap(SUBTITLE, width) {
            labels.push(Label::new(row, self.centered(&line), line, FAINT));
            row += 1;
        }
        row += 1;

        clock.row = row;
        row += (5 * clock.dot).div_ceil(2);
        let mut x = clock.left;
        for ((_, group_width), name) in clock.groups.iter().zip(UNIT_LABELS) {
            let centre = x + group_width * clock.dot / 2;
            let col = centre.saturating_sub(name.len() / 2);
            labels.push(Label::new(row, col, name, GRAY));
            x += (group_width + GROUP_GAP) * clock.dot;
        }
        row += 2;

        for line in wrap(&format!("\"{}\"", self.quote.english), width) {
            labels.push(Label::new(row, self.centered(&line), line, DIM).italic());
            row += 1;
        }
        for line in wrap(&format!("\"{}\"", self.quote.nepali), width) {
            labels.push(Label::new(row, self.centered(&line), line, DIM));
            row += 1;
        }
        let reference = format!("— {}", self.quote.reference.to_uppercase());
        labels.push(Label::new(row + 1, self.centered(&reference), reference, LILAC).bold());
        row += 2;

        let top = self.content_top(row);
        clock.row += top;
        for label in &mut labels {
            label.row += top;
        }
        (clock, labels)
    }

    fn celebration_labels(&self) -> Vec<Label> {
        let width = self.text_width();
        let mut labels = Vec::new();
        let mut row = 0;

        for line in wrap(GREETING_NEPALI, width) {
            labels.push(Label::new(row, self.centered(&line), line, AMBER).bold());
            row += 1;
        }
        row += 1;
        for line in wrap(GREETING_ENGLISH, width) {
            labels.push(Label::new(row, self.centered(&line), line, WHITE).bold());
            row += 1;
        }
        row += 1;
        for line in wrap(GREETING_ROMAN, width) {
            labels.push(Label::new(row, self.centered(&line), line, DIM).italic());
            row += 1;
        }
        row += 2;
        let divider = "────────────";
        labels.push(Label::new(row, self.centered(divider), divider, PURPLE));
        row += 2;
        let blessing = format!("BLESSINGS FROM {}", CHURCH_NAME.to_uppercase());
        labels.push(Label::new(row, self.centered(&blessing), blessing, LILAC).bold());
        row += 1;

        let top = self.content_top(row);
        for label in &mut labels {
            label.row += top;
        }
        labels
    }

    fn draw_backdrop(&mut self, clock: &ClockLayout) {
        let bg_color = crate::get_bg_color();
        let width = self.backdrop.width() as f32;
        let height = self.backdrop.height() as f32;
        let radius = width.min(height) * 0.3;
        let t = self.frame as f32 * 0.03;

        self.backdrop.clear(bg_color);
        self.backdrop
            .fill_circle(width * 0.25, height * 0.25, radius, GLOW_PURPLE, 0.18 + 0.06 * t.sin());
        self.backdrop
            .fill_circle(width * 0.75, height * 0.75, radius, GLOW_BLUE, 0.18 + 0.06 * (t + 2.0).sin());

        let mut x = clock.left;
        for (digits, group_width) in &clock.groups {
            for (i, digit) in digits.bytes().enumerate() {
                let glyph = &DIGITS[(digit - b'0') as usize];
                self.draw_glyph(glyph, x + i * 4 * clock.dot, clock.row * 2, clock.dot);
            }
            x += (group_width + GROUP_GAP) * clock.dot;
        }
    }

    fn draw_glyph(&mut self, glyph: &[u8; 5], px: usize, py: usize, dot: usize) {
        let scale = self.scale;
        // Inset keeps float rounding from bleeding into neighbouring pixels
        let size = (dot as f32 - 0.02) * scale;
        for (gy, bits) in glyph.iter().enumerate() {
            for gx in 0..3 {
                if bits & (0b100 >> gx) == 0 {
                    continue;
                }
                let x = ((px + gx * dot) as f32 + 0.01) * scale;
                let y = ((py + gy * dot) as f32 + 0.01) * scale;
                self.backdrop.fill_rect(x, y, size, size, WHITE, 1.0);
            }
        }
    }
}
