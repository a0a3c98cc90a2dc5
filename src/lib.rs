//! Grid Glider - A five-lane endless runner
//!
//! Core modules:
//! - `sim`: Game state, input, spawning, per-frame update
//! - `session`: A running game (state + clock)
//! - `clock`: Frame delta clock
//! - `renderer`: WebGPU scene rendering
//! - `platform`: Browser/native asset access
//! - `settings`: Runtime configuration

pub mod clock;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod session;
pub mod sim;

pub use clock::FrameClock;
pub use session::Session;
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Lane x-coordinates, left to right
    pub const LANE_X: [f32; 5] = [-4.0, -2.0, 0.0, 2.0, 4.0];
    /// Lane the player starts in (center)
    pub const START_LANE: usize = 2;

    /// Player cube edge length
    pub const PLAYER_SIZE: f32 = 1.0;
    /// Player rests on the ground plane
    pub const PLAYER_Y: f32 = PLAYER_SIZE / 2.0;

    /// Obstacle cube edge length
    pub const OBSTACLE_SIZE: f32 = 1.5;
    /// Obstacles appear this far down the track
    pub const OBSTACLE_SPAWN_Z: f32 = -50.0;
    /// Number of obstacle textures (obstacle1.png .. obstacle5.png)
    pub const OBSTACLE_TEXTURE_COUNT: usize = 5;

    /// Spawn delay is uniform in [MIN, MIN + SPAN) milliseconds
    pub const SPAWN_DELAY_MIN_MS: f64 = 1000.0;
    pub const SPAWN_DELAY_SPAN_MS: f64 = 1000.0;

    /// Obstacle z increment per frame at the start of a run
    pub const BASE_SPEED: f32 = 0.10;
    /// Speed gained per second of play
    pub const SPEED_RAMP: f32 = 0.002;
    /// Points per second of play
    pub const SCORE_RATE: f32 = 10.0;
    /// Player/obstacle center distance that counts as a crash
    pub const COLLISION_DISTANCE: f32 = 1.0;

    /// Camera placement
    pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 5.0, 10.0);
    pub const CAMERA_TARGET: Vec3 = Vec3::ZERO;
    /// Obstacles past this z have gone behind the camera
    pub const CAMERA_Z: f32 = CAMERA_POSITION.z;
    pub const CAMERA_FOV_DEGREES: f32 = 75.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;

    /// White ambient light
    pub const AMBIENT_INTENSITY: f32 = 0.6;

    /// Ground grid: total width and number of divisions
    pub const GRID_SIZE: f32 = 100.0;
    pub const GRID_DIVISIONS: u32 = 20;
}

/// World-space position of a player standing in `lane`
#[inline]
pub fn lane_position(lane: usize) -> Vec3 {
    Vec3::new(consts::LANE_X[lane], consts::PLAYER_Y, 0.0)
}
