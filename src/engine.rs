use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{EngineConfig, Environment};
use crate::emitter::{BurstTimer, ScrollEmitter, SectionWatcher};
use crate::surface::{DrawSurface, SurfaceMetrics};
use crate::types::{Extent, Orientation, Particle, ParticleInstance};

/// Rotation velocities are expressed per 60 Hz frame.
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Maximum horizontal shear produced by a full roll.
const MAX_SHEAR: f32 = 0.35;

/// Farthest any drawn pixel can sit from the particle's centre.
fn reach(size: &Extent) -> f32 {
    let half_width = size.width * 0.5 * (1.0 + MAX_SHEAR) + size.depth + 1.0;
    let half_height = size.height * 0.5 + size.depth + 1.0;
    half_width.hypot(half_height)
}

/// Owns the live particles and every spawn trigger feeding them.
pub struct ParticleEngine {
    config: EngineConfig,
    metrics: SurfaceMetrics,
    particles: Vec<Particle>,
    rng: StdRng,
    scroll: ScrollEmitter,
    sections: SectionWatcher,
    burst: BurstTimer,
    last_frame_ms: Option<f64>,
}

impl ParticleEngine {
    /// Starts the engine, or returns `None` when drawing is unavailable
    /// (reduced motion requested, or no surface to draw into).
    pub fn start(config: EngineConfig, env: &Environment, metrics: Option<SurfaceMetrics>) -> Option<Self> {
        Self::start_with_rng(config, env, metrics, StdRng::from_entropy())
    }

    pub fn start_seeded(
        config: EngineConfig,
        env: &Environment,
        metrics: Option<SurfaceMetrics>,
        seed: u64,
    ) -> Option<Self> {
        Self::start_with_rng(config, env, metrics, StdRng::seed_from_u64(seed))
    }

    fn start_with_rng(
        config: EngineConfig,
        env: &Environment,
        metrics: Option<SurfaceMetrics>,
        rng: StdRng,
    ) -> Option<Self> {
        if !env.motion_allowed() {
            log::debug!("reduced motion preferred, particle engine not started");
            return None;
        }
        let Some(metrics) = metrics else {
            log::debug!("no drawing surface, particle engine not started");
            return None;
        };

        let mut engine = Self {
            scroll: ScrollEmitter::new(config.scroll.clone(), 0.0),
            sections: SectionWatcher::new(config.section_threshold),
            burst: BurstTimer::new(config.burst_interval_ms),
            particles: Vec::with_capacity(config.capacity),
            metrics,
            rng,
            last_frame_ms: None,
            config,
        };
        let spawned = engine.spawn(engine.config.initial_burst);
        log::info!(
            "💸 particle engine started: {:?}, capacity {}, {:.0}x{:.0} @{}x, initial burst {}",
            engine.config.style,
            engine.config.capacity,
            metrics.width,
            metrics.height,
            metrics.pixel_ratio,
            spawned,
        );
        Some(engine)
    }

    /// Cancels the periodic burst timer. Other triggers keep working.
    pub fn stop(&mut self) {
        if !self.burst.is_cancelled() {
            self.burst.cancel();
            log::info!("particle engine stopped with {} live particles", self.particles.len());
        }
    }

    pub fn resize(&mut self, metrics: SurfaceMetrics) {
        log::debug!("surface resized to {:.0}x{:.0} @{}x", metrics.width, metrics.height, metrics.pixel_ratio);
        self.metrics = metrics;
    }

    pub fn metrics(&self) -> SurfaceMetrics {
        self.metrics
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers a page section for a one-shot visibility burst.
    pub fn watch_section(&mut self, id: impl Into<String>) {
        self.sections.watch(id);
    }

    /// Spawns up to `requested` particles, truncated to remaining capacity.
    pub fn spawn(&mut self, requested: usize) -> usize {
        let room = self.config.capacity.saturating_sub(self.particles.len());
        let count = requested.min(room);
        for _ in 0..count {
            let particle = self.new_particle();
            self.particles.push(particle);
        }
        count
    }

    fn new_particle(&mut self) -> Particle {
        let cfg = &self.config;
        let rng = &mut self.rng;
        let width = self.metrics.width.max(1.0);

        let x = if rng.gen_bool(cfg.center_bias as f64) {
            let spread = (width * cfg.center_spread_ratio).min(cfg.center_spread_max);
            width * 0.5 + rng.gen_range(-1.0f32..=1.0) * spread
        } else {
            rng.gen_range(0.0..width)
        };
        let shape = cfg.style.shape();
        let w = rng.gen_range(cfg.width.clone());
        let size = Extent { width: w, height: w * shape.height_ratio, depth: w * shape.depth_ratio };
        // clear the top edge at any spin, shear included
        let y = -reach(&size) - rng.gen_range(cfg.spawn_height.clone());

        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::new(rng.gen_range(cfg.drift_speed.clone()), rng.gen_range(cfg.fall_speed.clone())),
            size,
            age: 0.0,
            time_to_live: rng.gen_range(cfg.time_to_live.clone()),
            orientation: Orientation {
                spin: rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI),
                spin_velocity: rng.gen_range(cfg.spin_speed.clone()),
                roll: rng.gen_range(0.0..std::f32::consts::TAU),
                roll_velocity: rng.gen_range(cfg.roll_speed.clone()),
            },
            seed: rng.gen::<f32>(),
        }
    }

    /// Advances every particle by `dt_ms` and evicts expired or fallen ones.
    pub fn update(&mut self, dt_ms: f32) {
        let dt_ms = dt_ms.max(0.0);
        let seconds = dt_ms / 1000.0;
        let frames = dt_ms / REFERENCE_FRAME_MS;
        let drag = self.config.drag;
        let floor = self.metrics.height;

        self.particles.retain_mut(|p| {
            p.age += dt_ms;
            if p.is_expired() {
                return false;
            }
            p.position += p.velocity * seconds;
            p.velocity.x *= drag;
            p.orientation.spin += p.orientation.spin_velocity * frames;
            p.orientation.roll += p.orientation.roll_velocity * frames;
            !p.is_below(floor)
        });
    }

    /// Clears the surface and paints every live particle in spawn order.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.clear();
        for particle in &self.particles {
            surface.draw_particle(&self.instance(particle));
        }
    }

    fn instance(&self, p: &Particle) -> ParticleInstance {
        let cfg = &self.config;
        let opacity = if cfg.appear_ms > 0.0 { (p.age / cfg.appear_ms).clamp(0.0, 1.0) } else { 1.0 };
        let sheen_strength = opacity * (1.0 - p.life_fraction());
        let sheen_offset = (p.age / cfg.sheen_period_ms + p.seed).fract();
        let shear = p.orientation.roll.sin() * MAX_SHEAR;
        let radius = p.size.width * cfg.style.shape().corner_ratio;

        ParticleInstance {
            center: p.position.to_array(),
            size: [p.size.width, p.size.height],
            shape: [p.size.depth, p.orientation.spin, shear, opacity],
            sheen: [sheen_offset, sheen_strength, radius, 0.0],
        }
    }

    /// Scroll listener entry point.
    pub fn on_scroll(&mut self, scroll_y: f32) -> usize {
        let due = self.scroll.accumulate(scroll_y);
        if due == 0 {
            return 0;
        }
        self.spawn(due)
    }

    /// Visibility notification for a watched section.
    pub fn on_section_visible(&mut self, id: &str, visible_fraction: f32) -> usize {
        if !self.sections.notify(id, visible_fraction) {
            return 0;
        }
        let size = self.rng.gen_range(self.config.section_burst.clone()) as usize;
        let spawned = self.spawn(size);
        log::debug!("section `{id}` revealed, burst of {spawned}");
        spawned
    }

    fn periodic_burst(&mut self) -> usize {
        let batch = self.rng.gen_range(self.config.burst_size.clone()) as f32;
        self.spawn((batch * self.config.burst_multiplier).round() as usize)
    }

    /// One display frame: timers, update, draw.
    pub fn frame(&mut self, now_ms: f64, surface: &mut dyn DrawSurface) {
        let dt = match self.last_frame_ms {
            Some(prev) => (now_ms - prev).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        for _ in 0..self.burst.advance(dt) {
            self.periodic_burst();
        }
        self.update(dt);
        self.draw(surface);
    }
}
