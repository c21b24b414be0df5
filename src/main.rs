//! Liquid Flock headless runner
//!
//! Usage: `liquid-flock [config.json] [frames]`
//!
//! Drives the simulation through a fixed-timestep accumulator paced at the
//! display rate and logs summary statistics. Set `RUST_LOG=info` (or `debug`
//! for per-tick event counts) to see output.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{Duration, Instant};

    use liquid_flock::consts::MAX_FRAME_TIME;
    use liquid_flock::render::{DEFAULT_POINT_SCALE, particle_vertices, wall_mesh};
    use liquid_flock::{SimConfig, Simulation};

    const DEFAULT_CONFIG_PATH: &str = "config.json";
    const DEFAULT_FRAMES: u32 = 600;
    /// Display rate the frame loop is paced at
    const FRAME_PERIOD: Duration = Duration::from_micros(16_667);
    /// Frames between stats lines
    const STATS_INTERVAL: u32 = 60;

    /// Fixed-step accumulator plus the optional spawn timer
    pub struct FrameClock {
        sim_dt: f32,
        max_substeps: u32,
        accumulator: f32,
        spawn_interval: Option<f32>,
        spawn_timer: f32,
    }

    impl FrameClock {
        pub fn new(config: &SimConfig) -> Self {
            Self {
                sim_dt: config.sim_dt,
                max_substeps: config.max_substeps,
                accumulator: 0.0,
                spawn_interval: config.spawn_interval,
                spawn_timer: 0.0,
            }
        }

        /// Run as many fixed steps as `frame_time` covers; returns the number
        /// of steps taken
        pub fn advance(&mut self, sim: &mut Simulation, frame_time: f32) -> u32 {
            let frame_time = frame_time.clamp(0.0, MAX_FRAME_TIME);
            self.accumulator += frame_time;

            let mut substeps = 0;
            while self.accumulator >= self.sim_dt && substeps < self.max_substeps {
                sim.update(self.sim_dt);
                self.accumulator -= self.sim_dt;
                substeps += 1;
            }
            // Drop time we could not catch up on
            if substeps == self.max_substeps {
                self.accumulator = self.accumulator.min(self.sim_dt);
            }

            if let Some(interval) = self.spawn_interval {
                self.spawn_timer += frame_time;
                while self.spawn_timer >= interval {
                    self.spawn_timer -= interval;
                    if !sim.spawn_random_particle() {
                        // At capacity
                        self.spawn_timer = 0.0;
                        break;
                    }
                }
            }
            substeps
        }
    }

    fn log_stats(frame: u32, sim: &Simulation) {
        let particles = sim.particles();
        let n = particles.len().max(1) as f32;
        let mean_speed = particles.iter().map(|p| p.velocity.length()).sum::<f32>() / n;
        let mean_amplitude = particles.iter().map(|p| p.wave_amplitude).sum::<f32>() / n;
        let (lo, hi) = particles.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
            (lo.min(p.color.min_element()), hi.max(p.color.max_element()))
        });
        log::info!(
            "frame {frame}: t={:.2}s ticks={} particles={} mean_speed={mean_speed:.3} mean_wave={mean_amplitude:.4} color=[{lo:.3}, {hi:.3}]",
            sim.elapsed(),
            sim.tick_count(),
            particles.len(),
        );
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let frames = match args.next().map(|s| s.parse::<u32>()) {
            Some(Ok(frames)) => frames,
            Some(Err(e)) => {
                log::warn!("Bad frame count ({e}), using {DEFAULT_FRAMES}");
                DEFAULT_FRAMES
            }
            None => DEFAULT_FRAMES,
        };

        let config = SimConfig::load_or_default(&path);
        let mut sim = Simulation::with_config(&config);
        let mut clock = FrameClock::new(&config);

        let wall_indices: usize = sim.walls().iter().map(|w| wall_mesh(w).1.len()).sum();
        log::info!("Wall geometry: {} walls, {wall_indices} indices", sim.walls().len());

        let mut last = Instant::now();
        for frame in 1..=frames {
            let now = Instant::now();
            let frame_time = now.duration_since(last).as_secs_f32();
            last = now;

            clock.advance(&mut sim, frame_time);

            // Stand-in for the GPU upload
            let points = particle_vertices(sim.particles(), DEFAULT_POINT_SCALE);
            debug_assert_eq!(points.len(), sim.particle_count());

            if frame % STATS_INTERVAL == 0 {
                log_stats(frame, &sim);
            }

            let spent = now.elapsed();
            if spent < FRAME_PERIOD {
                std::thread::sleep(FRAME_PERIOD - spent);
            }
        }

        log_stats(frames, &sim);
        log::info!("Done after {} ticks", sim.tick_count());
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Liquid Flock (native) starting...");
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm; nothing to run here
}
