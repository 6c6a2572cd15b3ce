use super::particle::Particle;
use crate::canvas::{Rgb, Surface};
use crate::frame::{FrameRequest, FrameScheduler};

pub const PALETTE: [Rgb; 7] = [
    (255, 0, 0),     // red
    (255, 215, 0),   // gold
    (0, 255, 0),     // green
    (0, 255, 255),   // cyan
    (255, 0, 255),   // magenta
    (255, 255, 255), // white
    (255, 140, 0),   // orange
];

#[derive(Debug, Clone, PartialEq)]
pub struct FireworksConfig {
    /// Particles per explosion.
    pub burst_size: usize,
    /// Chance of a new explosion on each tick.
    pub spawn_chance: f32,
    /// Opacity of the full-surface paint that leaves fading trails.
    pub trail_fade: f32,
    /// Explosions start within this top fraction of the surface height.
    pub spawn_band: f32,
    pub fade_color: Rgb,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            burst_size: 50,
            spawn_chance: 0.05,
            trail_fade: 0.1,
            spawn_band: 0.7,
            fade_color: (0, 0, 0),
        }
    }
}

/// Celebration animation. Owns its particles and the surface they are drawn
/// on; the host drives it through a [`FrameScheduler`].
pub struct FireworksEngine<S: Surface> {
    surface: Option<S>,
    particles: Vec<Particle>,
    config: FireworksConfig,
    rng: fastrand::Rng,
    pending: Option<FrameRequest>,
}

impl<S: Surface> FireworksEngine<S> {
    pub fn new(config: FireworksConfig, rng: fastrand::Rng) -> Self {
        Self {
            surface: None,
            particles: Vec::with_capacity(config.burst_size * 4),
            config,
            rng,
            pending: None,
        }
    }

    pub fn initialize(&mut self, mut surface: S, width: u32, height: u32) {
        surface.set_size(width, height);
        self.surface = Some(surface);
        self.particles.clear();
    }

    /// Read-only view for the host compositor.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Particle positions stay in surface coordinates; nothing is rescaled.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.set_size(width, height);
            log::debug!("fireworks surface resized to {width}x{height}");
        }
    }

    pub fn spawn_explosion(&mut self, x: f32, y: f32) {
        let color = PALETTE[self.rng.usize(0..PALETTE.len())];
        for _ in 0..self.config.burst_size {
            self.particles.push(Particle::new(x, y, color, &mut self.rng));
        }
        log::trace!("explosion at ({x:.1}, {y:.1}), {} live particles", self.particles.len());
    }

    /// One simulation step and one rendered frame.
    pub fn tick(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let width = surface.width() as f32;
        let height = surface.height() as f32;

        // Translucent paint instead of a clear leaves trails behind sparks
        surface.fill_rect(0.0, 0.0, width, height, self.config.fade_color, self.config.trail_fade);

        if self.rng.f32() < self.config.spawn_chance {
            let x = self.rng.f32() * width;
            let y = self.rng.f32() * height * self.config.spawn_band;
            self.spawn_explosion(x, y);
        }

        self.particles.retain(|particle| !particle.is_dead());

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        for particle in &mut self.particles {
            particle.advance();
            particle.render(surface);
        }
    }

    pub fn start(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.surface.is_none() {
            log::warn!("fireworks not started: no drawing surface bound");
            return;
        }
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
            log::debug!("fireworks started");
        }
    }

    /// Cancels the outstanding frame request. Frames delivered afterwards,
    /// including ones the host already collected, are ignored.
    pub fn stop(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(request) = self.pending.take() {
            scheduler.cancel_frame(request);
            log::debug!("fireworks stopped with {} live particles", self.particles.len());
        }
    }

    /// Frame callback. Returns whether a tick ran.
    pub fn on_frame(&mut self, request: FrameRequest, scheduler: &mut impl FrameScheduler) -> bool {
        if self.pending != Some(request) {
            return false;
        }
        self.tick();
        self.pending = Some(scheduler.request_frame());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::frame::FramePacer;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct ManualScheduler {
        issued: Vec<FrameRequest>,
        cancelled: Vec<FrameRequest>,
        inner: Option<FramePacer>,
    }

    impl FrameScheduler for ManualScheduler {
        fn request_frame(&mut self) -> FrameRequest {
            let pacer = self.inner.get_or_insert_with(|| FramePacer::new(60, Instant::now()));
            let request = pacer.request_frame();
            self.issued.push(request);
            request
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            self.cancelled.push(request);
        }
    }

    fn quiet() -> FireworksConfig {
        FireworksConfig {
            spawn_chance: 0.0,
            ..FireworksConfig::default()
        }
    }

    fn engine(config: FireworksConfig, seed: u64) -> FireworksEngine<Canvas> {
        let mut engine = FireworksEngine::new(config, fastrand::Rng::with_seed(seed));
        engine.initialize(Canvas::new(1, 1, 6.0), 800, 600);
        engine
    }

    fn snapshot(canvas: &Canvas) -> Vec<Rgb> {
        let mut pixels = Vec::new();
        for y in 0..canvas.pixel_height() {
            for x in 0..canvas.pixel_width() {
                pixels.extend(canvas.pixel(x, y));
            }
        }
        pixels
    }

    #[test]
    fn default_config_values() {
        let config = FireworksConfig::default();
        assert_eq!(config.burst_size, 50);
        assert_eq!(config.spawn_chance, 0.05);
        assert_eq!(config.trail_fade, 0.1);
        assert_eq!(config.spawn_band, 0.7);
        assert_eq!(config.fade_color, (0, 0, 0));
    }

    #[test]
    fn initialize_binds_surface_with_viewport_size() {
        let engine = engine(quiet(), 1);
        let surface = engine.surface().unwrap();
        assert_eq!((surface.width(), surface.height()), (800, 600));
        assert!(engine.particles().is_empty());
        assert!(!engine.is_running());
    }

    #[test]
    fn explosion_adds_one_colored_burst() {
        for seed in 0..20 {
            let mut engine = engine(quiet(), seed);
            engine.spawn_explosion(120.0, 80.0);
            let particles = engine.particles();
            assert_eq!(particles.len(), 50);
            let color = particles[0].color;
            assert!(PALETTE.contains(&color));
            for p in particles {
                assert_eq!(p.color, color);
                assert_eq!((p.x, p.y), (120.0, 80.0));
                assert_eq!(p.alpha, 1.0);
            }
        }
    }

    #[test]
    fn two_explosions_add_a_hundred_particles() {
        let mut engine = engine(quiet(), 3);
        engine.spawn_explosion(10.0, 10.0);
        engine.spawn_explosion(700.0, 50.0);
        assert_eq!(engine.particles().len(), 100);
    }

    #[test]
    fn palette_colors_are_all_reachable() {
        let mut engine = engine(quiet(), 11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            engine.spawn_explosion(0.0, 0.0);
            seen.insert(engine.particles().last().unwrap().color);
        }
        assert_eq!(seen.len(), PALETTE.len());
    }

    #[test]
    fn dead_particles_are_reaped_on_next_tick() {
        let mut engine = engine(quiet(), 5);
        engine.spawn_explosion(400.0, 300.0);
        engine.particles[0].alpha = 0.0;
        engine.particles[1].alpha = -1e-7;
        engine.tick();
        assert_eq!(engine.particles().len(), 48);
        assert!(engine.particles().iter().all(|p| p.alpha > 0.0));
    }

    #[test]
    fn tick_advances_every_live_particle_once() {
        let mut engine = engine(quiet(), 9);
        engine.spawn_explosion(400.0, 300.0);
        let before = engine.particles().to_vec();
        engine.tick();
        for (old, new) in before.iter().zip(engine.particles()) {
            let mut expected = old.clone();
            expected.advance();
            assert_eq!(&expected, new);
        }
    }

    #[test]
    fn burst_burns_out_without_respawn() {
        let mut engine = engine(quiet(), 42);
        engine.spawn_explosion(400.0, 300.0);
        for _ in 0..150 {
            engine.tick();
        }
        assert!(engine.particles().is_empty());
    }

    #[test]
    fn spawns_land_in_the_upper_band() {
        let config = FireworksConfig {
            spawn_chance: 1.0,
            ..FireworksConfig::default()
        };
        for seed in 0..20 {
            let mut engine = engine(config.clone(), seed);
            engine.tick();
            assert_eq!(engine.particles().len(), 50);
            for p in engine.particles() {
                // Undo the single advance to recover the launch point
                let (x0, y0) = (p.x - p.vx, p.y - p.vy);
                assert!((-1e-3..800.0 + 1e-3).contains(&x0), "x0 {x0}");
                assert!((-1e-3..420.0 + 1e-3).contains(&y0), "y0 {y0}");
            }
        }
    }

    #[test]
    fn tick_fades_the_whole_surface() {
        let mut engine = engine(quiet(), 2);
        engine.surface.as_mut().unwrap().clear((200, 200, 200));
        engine.tick();
        let canvas = engine.surface().unwrap();
        assert!(snapshot(canvas).iter().all(|&p| p == (180, 180, 180)));
    }

    #[test]
    fn tick_draws_particles() {
        let mut engine = engine(quiet(), 4);
        engine.spawn_explosion(400.0, 300.0);
        engine.tick();
        let canvas = engine.surface().unwrap();
        assert!(snapshot(canvas).iter().any(|&p| p != (0, 0, 0)));
    }

    #[test]
    fn resize_keeps_particle_positions() {
        let mut engine = engine(quiet(), 8);
        engine.spawn_explosion(400.0, 300.0);
        engine.tick();
        let before: Vec<(f32, f32)> = engine.particles().iter().map(|p| (p.x, p.y)).collect();

        engine.resize(320, 200);
        let surface = engine.surface().unwrap();
        assert_eq!((surface.width(), surface.height()), (320, 200));
        let after: Vec<(f32, f32)> = engine.particles().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn unbound_engine_is_inert() {
        let mut engine: FireworksEngine<Canvas> = FireworksEngine::new(quiet(), fastrand::Rng::with_seed(0));
        let mut scheduler = ManualScheduler::default();
        engine.resize(100, 100);
        engine.tick();
        engine.start(&mut scheduler);
        engine.stop(&mut scheduler);
        assert!(engine.surface().is_none());
        assert!(!engine.is_running());
        assert!(scheduler.issued.is_empty());
        assert!(scheduler.cancelled.is_empty());
    }

    #[test]
    fn frames_tick_and_reschedule_while_running() {
        let mut engine = engine(quiet(), 6);
        let mut scheduler = ManualScheduler::default();
        engine.start(&mut scheduler);
        engine.start(&mut scheduler);
        assert_eq!(scheduler.issued.len(), 1);

        engine.spawn_explosion(400.0, 300.0);
        let first = scheduler.issued[0];
        assert!(engine.on_frame(first, &mut scheduler));
        assert!((engine.particles()[0].alpha - 0.99).abs() < 1e-6);
        assert_eq!(scheduler.issued.len(), 2);

        // A request that has already been served doesn't tick again
        assert!(!engine.on_frame(first, &mut scheduler));
        assert!(engine.on_frame(scheduler.issued[1], &mut scheduler));
        assert!((engine.particles()[0].alpha - 0.98).abs() < 1e-6);
    }

    #[test]
    fn nothing_ticks_after_stop() {
        let mut engine = engine(quiet(), 12);
        let mut scheduler = ManualScheduler::default();
        engine.start(&mut scheduler);
        engine.spawn_explosion(400.0, 300.0);
        let last = scheduler.issued[0];
        engine.on_frame(last, &mut scheduler);
        let stale = *scheduler.issued.last().unwrap();

        engine.stop(&mut scheduler);
        engine.stop(&mut scheduler);
        assert_eq!(scheduler.cancelled, vec![stale]);
        assert!(!engine.is_running());

        let particles = engine.particles().to_vec();
        let pixels = snapshot(engine.surface().unwrap());
        for _ in 0..5 {
            assert!(!engine.on_frame(stale, &mut scheduler));
        }
        assert_eq!(engine.particles(), particles.as_slice());
        assert_eq!(snapshot(engine.surface().unwrap()), pixels);
    }

    #[test]
    fn stop_releases_the_pacer_registration() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(60, t0);
        let mut engine = engine(quiet(), 13);
        engine.spawn_explosion(400.0, 300.0);
        engine.start(&mut pacer);
        assert_eq!(pacer.pending(), 1);
        engine.stop(&mut pacer);
        assert_eq!(pacer.pending(), 0);

        let particles = engine.particles().to_vec();
        let mut now = t0;
        for _ in 0..5 {
            for request in pacer.take_due(now).unwrap_or_default() {
                engine.on_frame(request, &mut pacer);
            }
            now += Duration::from_millis(17);
        }
        assert_eq!(engine.particles(), particles.as_slice());
    }
}
