use crate::canvas::{Rgb, Surface};

pub const GRAVITY: f32 = 0.05;
pub const FRICTION: f32 = 0.98;
pub const FADE_PER_FRAME: f32 = 0.01;
pub const RADIUS: f32 = 2.0;
pub const MIN_SPEED: f32 = 2.0;
pub const SPEED_RANGE: f32 = 10.0;

/// One spark of an explosion. Velocities are in surface units per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: Rgb,
    pub alpha: f32,
    pub gravity: f32,
    pub friction: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, color: Rgb, rng: &mut fastrand::Rng) -> Self {
        let angle = rng.f32() * std::f32::consts::TAU;
        let speed = rng.f32() * SPEED_RANGE + MIN_SPEED; // 2 to 12

        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            color,
            alpha: 1.0,
            gravity: GRAVITY,
            friction: FRICTION,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.alpha <= 0.0
    }

    /// One frame of motion. Friction is applied before gravity.
    pub fn advance(&mut self) {
        self.vx *= self.friction;
        self.vy *= self.friction;
        self.vy += self.gravity;
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= FADE_PER_FRAME;
    }

    pub fn render<S: Surface>(&self, surface: &mut S) {
        if self.is_dead() {
            return;
        }
        surface.fill_circle(self.x, self.y, RADIUS, self.color, self.alpha);
    }
}
