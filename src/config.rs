use std::path::PathBuf;
use std::time::Duration;

/// All tunables in one place, passed explicitly to each component at
/// construction. Simulation values are in world units (a fixed 288x512
/// playfield), independent of the terminal size.
#[derive(Clone, Debug)]
pub struct Config {
    pub screen_w: f64,
    pub screen_h: f64,

    /// Per-tick downward acceleration.
    pub gravity: f64,
    /// Velocity assigned (not added) on a jump.
    pub jump_impulse: f64,

    /// Leftward pipe movement per tick.
    pub pipe_speed: f64,
    pub pipe_w: f64,
    /// Vertical clearance between a pipe's two segments.
    pub pipe_gap: f64,
    /// Minimum height kept for both segments so neither degenerates.
    pub gap_margin: f64,
    /// Simulated time between pipe spawns.
    pub spawn_interval: Duration,

    pub bird_x: f64,
    pub bird_w: f64,
    pub bird_h: f64,

    /// Gameplay tick (60 Hz).
    pub game_tick: Duration,
    /// Menu / high-score tick (30 Hz).
    pub menu_tick: Duration,

    pub scores_path: PathBuf,
    pub scores_limit: usize,
    pub name_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_w: 288.0,
            screen_h: 512.0,
            gravity: 0.25,
            jump_impulse: -7.0,
            pipe_speed: 3.0,
            pipe_w: 52.0,
            pipe_gap: 150.0,
            gap_margin: 100.0,
            spawn_interval: Duration::from_millis(1500),
            bird_x: 100.0,
            bird_w: 34.0,
            bird_h: 24.0,
            game_tick: Duration::from_micros(16_667),
            menu_tick: Duration::from_millis(33),
            scores_path: PathBuf::from("highscores.txt"),
            scores_limit: 10,
            name_limit: 12,
        }
    }
}
