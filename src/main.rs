//! Brickfall headless runner
//!
//! Usage: `brickfall [tuning.json] [ticks]`
//!
//! Generates a level, drives the paddle with a ball-tracking AI and steps the
//! simulation through a frame accumulator, logging gameplay events.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use brickfall::consts::*;
    use brickfall::sim::{
        GameEvent, GamePhase, GameState, LevelLayout, TickInput, generate_level, tick,
    };
    use brickfall::{ConfigError, SimError, Tuning};

    /// Simulated display refresh driving the accumulator
    const FRAME_DT: f32 = 1.0 / 60.0;
    const DEFAULT_TICKS: u64 = 3000;
    const DEFAULT_SEED: u64 = 0x00b1_0cc5;

    struct Runner {
        state: GameState,
        accumulator: f32,
        input: TickInput,
        bricks_removed: u32,
        coins_collected: u32,
        balls_lost: u32,
    }

    impl Runner {
        fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
            let mut state = GameState::new(seed, tuning)?;
            generate_level(&mut state, LevelLayout::default());
            Ok(Self {
                state,
                accumulator: 0.0,
                input: TickInput::default(),
                bricks_removed: 0,
                coins_collected: 0,
                balls_lost: 0,
            })
        }

        /// Run simulation ticks for one frame
        fn update(&mut self, dt: f32) -> Result<(), SimError> {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.input.paddle_x = Some(self.state.body.pos.x);
                tick(&mut self.state, &self.input, SIM_DT)?;
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.pause = false;
            }

            for event in self.state.take_events() {
                self.record(event);
            }
            Ok(())
        }

        fn record(&mut self, event: GameEvent) {
            match event {
                GameEvent::BrickLocked { id } => log::debug!("Brick {} hit", id),
                GameEvent::BrickRemoved { .. } => self.bricks_removed += 1,
                GameEvent::BallLost => self.balls_lost += 1,
                GameEvent::CoinsSpawned { count } => log::debug!("{} coins dropped", count),
                GameEvent::CoinCollected { .. } => self.coins_collected += 1,
                GameEvent::LevelComplete => {
                    log::info!("Level cleared at tick {}", self.state.time_ticks)
                }
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let mut args = std::env::args().skip(1);
        let tuning = match args.next() {
            Some(path) => {
                log::info!("Loading tuning from {}", path);
                Tuning::load(&path)?
            }
            None => Tuning::default(),
        };
        let max_ticks = match args.next() {
            Some(n) => n.parse::<u64>()?,
            None => DEFAULT_TICKS,
        };

        let mut runner = Runner::new(DEFAULT_SEED, tuning)?;
        while runner.state.time_ticks < max_ticks {
            runner.update(FRAME_DT)?;
            let coasting = runner
                .state
                .slowdown
                .is_some_and(|s| s.elapsed >= SLOWDOWN_SECS);
            if runner.state.phase == GamePhase::LevelComplete && coasting {
                break;
            }
        }

        let state = &runner.state;
        log::info!(
            "Finished after {} ticks ({:.1}s): phase {:?}, {} bricks removed, {} left, {} balls lost, {} coins collected",
            state.time_ticks,
            state.time,
            state.phase,
            runner.bricks_removed,
            state.bricks.len(),
            runner.balls_lost,
            runner.coins_collected
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Brickfall (headless) starting...");

    if let Err(e) = native::run() {
        log::error!("Simulation aborted: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No wasm front end; the library is the embedding surface
}
