//! Per-frame simulation update
//!
//! Advances obstacles, culls the ones behind the camera, checks for a crash
//! and ramps score and speed.

use super::collision::find_collision;
use super::spawn::SpawnTicket;
use super::state::{GameEvent, GameState, Player};
use crate::consts::*;

/// Advance the game by one rendered frame.
///
/// `dt` is the real time since the previous frame in seconds. Obstacle motion
/// is a raw per-frame step of `speed` and is not scaled by `dt`; score and
/// speed ramps are. Does nothing once the game is over.
pub fn tick(state: &mut GameState, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.game_over {
        return events;
    }

    // Move obstacles toward the camera
    for obstacle in &mut state.obstacles {
        obstacle.pos.z += state.speed;
    }

    // Remove obstacles that went behind the camera
    state.obstacles.retain(|o| {
        if o.passed_camera() {
            events.push(GameEvent::ObstaclePassed { id: o.id });
            false
        } else {
            true
        }
    });

    if let Some(obstacle_id) = find_collision(state.player.pos, &state.obstacles) {
        state.game_over = true;
        events.push(GameEvent::Crashed { obstacle_id });
    }

    // Ramp score and difficulty, including on the crash frame
    state.score += dt * SCORE_RATE;
    state.speed += dt * SPEED_RAMP;

    events
}

/// Put the state back to the start of a run.
///
/// Clears obstacles, score, speed and lane and arms a new spawn chain; the
/// returned ticket must be used for the first spawn of the new run.
pub fn reset(state: &mut GameState) -> SpawnTicket {
    state.obstacles.clear();
    state.score = 0.0;
    state.speed = BASE_SPEED;
    state.player = Player::default();
    state.game_over = false;
    state.arm_spawn_chain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane_position;
    use crate::sim::state::{Obstacle, TextureSlot};

    const FRAME_DT: f32 = 1.0 / 60.0;

    fn snapshot(state: &GameState) -> (f32, f32, bool, usize, Vec<Obstacle>) {
        (
            state.score,
            state.speed,
            state.game_over,
            state.player.lane,
            state.obstacles.clone(),
        )
    }

    #[test]
    fn test_obstacles_advance_by_speed_per_frame() {
        let mut state = GameState::new(1);
        state.obstacles.push(Obstacle::new(1, 0, TextureSlot(0)));
        let speed = state.speed;

        // A huge dt must not change how far obstacles move this frame
        tick(&mut state, 5.0);
        assert!((state.obstacles[0].pos.z - (OBSTACLE_SPAWN_Z + speed)).abs() < 1e-5);
    }

    #[test]
    fn test_obstacle_removed_after_passing_camera() {
        let mut state = GameState::new(1);
        state.player.set_lane(4);
        state.obstacles.push(Obstacle::new(1, 0, TextureSlot(0)));

        let mut frames = 0;
        let mut passed = false;
        while frames < 10_000 {
            let events = tick(&mut state, 0.0);
            frames += 1;
            if events.contains(&GameEvent::ObstaclePassed { id: 1 }) {
                passed = true;
                break;
            }
            assert!(state.obstacles[0].pos.z <= CAMERA_Z);
        }
        assert!(passed);
        assert!(state.obstacles.is_empty());
        assert!(!state.game_over);
        // 60 units at 0.1 per frame
        assert!((600..=602).contains(&frames), "frames {frames}");
    }

    #[test]
    fn test_obstacle_on_player_ends_game() {
        let mut state = GameState::new(1);
        let mut obstacle = Obstacle::new(9, 2, TextureSlot(0));
        // Account for the movement applied before the check
        obstacle.pos = state.player.pos - glam::Vec3::Z * state.speed;
        state.obstacles.push(obstacle);

        let events = tick(&mut state, FRAME_DT);
        assert!(state.game_over);
        assert!(events.contains(&GameEvent::Crashed { obstacle_id: 9 }));
    }

    #[test]
    fn test_obstacle_in_player_lane_crashes_on_arrival() {
        let mut state = GameState::new(1);
        state.obstacles.push(Obstacle::new(1, START_LANE, TextureSlot(0)));
        for _ in 0..1000 {
            tick(&mut state, FRAME_DT);
            if state.game_over {
                break;
            }
        }
        assert!(state.game_over);
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_one_second_ramps_score_and_speed() {
        let mut state = GameState::new(1);
        for _ in 0..60 {
            tick(&mut state, FRAME_DT);
        }
        assert!((state.score - 10.0).abs() < 1e-3, "score {}", state.score);
        assert!((state.speed - 0.102).abs() < 1e-6, "speed {}", state.speed);
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut state = GameState::new(1);
        state.obstacles.push(Obstacle::new(1, 0, TextureSlot(0)));
        state.score = 42.0;
        state.game_over = true;

        let before = snapshot(&state);
        for _ in 0..100 {
            assert!(tick(&mut state, FRAME_DT).is_empty());
        }
        assert_eq!(snapshot(&state), before);
    }

    #[test]
    fn test_reset_restores_start_of_run() {
        let mut state = GameState::new(1);
        state.obstacles.push(Obstacle::new(1, 0, TextureSlot(0)));
        state.score = 123.0;
        state.speed = 0.5;
        state.player.set_lane(0);
        state.game_over = true;

        let ticket = reset(&mut state);
        assert!(state.is_live(ticket));
        assert_eq!(state.score, 0.0);
        assert_eq!(state.speed, BASE_SPEED);
        assert_eq!(state.player.lane, 2);
        assert_eq!(state.player.pos, lane_position(2));
        assert!(!state.game_over);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_reset_twice_matches_reset_once() {
        let mut once = GameState::new(1);
        once.score = 10.0;
        once.game_over = true;
        reset(&mut once);

        let mut twice = once.clone();
        let first = reset(&mut twice);
        let second = reset(&mut twice);

        assert_eq!(snapshot(&once), snapshot(&twice));
        assert!(!twice.is_live(first));
        assert!(twice.is_live(second));
    }
}
