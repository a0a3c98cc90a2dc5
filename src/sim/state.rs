//! Game state and core simulation types
//!
//! Everything the frame loop, the input handler and the spawn timer share
//! lives in one `GameState` value owned by the driver.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::spawn::SpawnTicket;
use crate::consts::*;
use crate::lane_position;

/// Index into the obstacle texture set.
///
/// The texture behind a slot may still be loading when the obstacle is
/// spawned; the renderer resolves it every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSlot(pub usize);

impl TextureSlot {
    /// Asset file name for this slot (`obstacle1.png` for slot 0)
    pub fn file_name(&self) -> String {
        format!("obstacle{}.png", self.0 + 1)
    }
}

/// The player's cube
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Lane index, always within `0..LANE_X.len()`
    pub lane: usize,
    pub pos: Vec3,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: START_LANE,
            pos: lane_position(START_LANE),
        }
    }
}

impl Player {
    /// Snap to `lane` (clamped to the lane set)
    pub fn set_lane(&mut self, lane: usize) {
        self.lane = lane.min(LANE_X.len() - 1);
        self.pos.x = LANE_X[self.lane];
    }

    /// Move one lane left. Returns false when already leftmost.
    pub fn move_left(&mut self) -> bool {
        let from = self.lane;
        self.set_lane(self.lane.saturating_sub(1));
        self.lane != from
    }

    /// Move one lane right. Returns false when already rightmost.
    pub fn move_right(&mut self) -> bool {
        let from = self.lane;
        self.set_lane(self.lane + 1);
        self.lane != from
    }
}

/// An obstacle cube travelling toward the camera
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec3,
    pub size: f32,
    pub texture: TextureSlot,
}

impl Obstacle {
    pub fn new(id: u32, lane: usize, texture: TextureSlot) -> Self {
        Self {
            id,
            pos: Vec3::new(LANE_X[lane], OBSTACLE_SIZE / 2.0, OBSTACLE_SPAWN_Z),
            size: OBSTACLE_SIZE,
            texture,
        }
    }

    /// True once the obstacle has moved behind the camera
    pub fn passed_camera(&self) -> bool {
        self.pos.z > CAMERA_Z
    }
}

/// Things that happened during input handling or a frame update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Player snapped to a new lane
    LaneChanged { lane: usize },
    /// Obstacle went behind the camera and was removed
    ObstaclePassed { id: u32 },
    /// Player hit an obstacle; the run is over
    Crashed { obstacle_id: u32 },
    /// State was reset; the driver must run the new spawn chain
    Restarted { ticket: SpawnTicket },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub player: Player,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Score, floored for display
    pub score: f32,
    /// Obstacle z increment per frame
    pub speed: f32,
    pub game_over: bool,
    /// Generation of the live spawn chain (0 = never armed)
    pub(crate) spawn_generation: u64,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            player: Player::default(),
            obstacles: Vec::new(),
            score: 0.0,
            speed: BASE_SPEED,
            game_over: false,
            spawn_generation: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// HUD score line
    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score.floor() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7);
        assert_eq!(state.player.lane, START_LANE);
        assert_eq!(state.player.pos, Vec3::new(0.0, 0.5, 0.0));
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, 0.0);
        assert_eq!(state.speed, BASE_SPEED);
        assert!(!state.game_over);
    }

    #[test]
    fn test_player_clamps_at_edges() {
        let mut player = Player::default();
        assert!(player.move_left());
        assert!(player.move_left());
        assert!(!player.move_left());
        assert_eq!(player.lane, 0);
        assert_eq!(player.pos.x, -4.0);

        player.set_lane(4);
        assert!(!player.move_right());
        assert_eq!(player.pos.x, 4.0);
    }

    #[test]
    fn test_obstacle_spawn_position() {
        let obstacle = Obstacle::new(1, 0, TextureSlot(3));
        assert_eq!(obstacle.pos, Vec3::new(-4.0, 0.75, -50.0));
        assert_eq!(obstacle.texture.file_name(), "obstacle4.png");
        assert!(!obstacle.passed_camera());
    }

    #[test]
    fn test_score_text_floors() {
        let mut state = GameState::new(1);
        state.score = 12.97;
        assert_eq!(state.score_text(), "Score: 12");
    }
}
