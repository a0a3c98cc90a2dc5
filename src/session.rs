//! A running game: simulation state plus its frame clock
//!
//! This is what the browser driver (and the native headless run) hold on
//! to. Timers and rendering stay outside; the session only tells the caller
//! when a new spawn chain has to be scheduled.

use crate::clock::FrameClock;
use crate::sim::{GameEvent, GameState, InputCommand, SpawnStep, SpawnTicket, handle_input, tick};

pub struct Session {
    pub state: GameState,
    pub clock: FrameClock,
}

impl Session {
    /// New run, clock started at `now_ms`.
    ///
    /// Returns the ticket of the first spawn chain; run it right away to get
    /// the initial obstacle.
    pub fn start(seed: u64, now_ms: f64) -> (Self, SpawnTicket) {
        let mut state = GameState::new(seed);
        let ticket = state.arm_spawn_chain();
        let mut clock = FrameClock::new();
        clock.start(now_ms);
        log::info!("Session started with seed {}", seed);
        (Self { state, clock }, ticket)
    }

    /// One display frame
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let dt = self.clock.delta(now_ms);
        let events = tick(&mut self.state, dt);
        for event in &events {
            match event {
                GameEvent::Crashed { obstacle_id } => log::info!(
                    "Crashed into obstacle {} with score {}",
                    obstacle_id,
                    self.state.score.floor()
                ),
                GameEvent::ObstaclePassed { id } => log::debug!("Obstacle {} passed", id),
                _ => {}
            }
        }
        events
    }

    /// Key press from the page
    pub fn key_down(&mut self, key: &str, code: &str, now_ms: f64) -> Option<GameEvent> {
        let command = InputCommand::from_key(key, code)?;
        let event = handle_input(&mut self.state, command);
        if let Some(GameEvent::Restarted { .. }) = event {
            self.clock.start(now_ms);
            log::info!("Game restarted");
        }
        event
    }

    /// Timer callback for a spawn chain
    pub fn spawn(&mut self, ticket: SpawnTicket) -> Option<SpawnStep> {
        let step = self.state.run_spawn_step(ticket);
        if step.is_none() {
            log::debug!("Dropping stale spawn chain {:?}", ticket);
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_start_spawns_first_obstacle() {
        let (mut session, ticket) = Session::start(11, 0.0);
        let step = session.spawn(ticket).expect("first spawn");
        assert_eq!(session.state.obstacles.len(), 1);
        assert!((1000.0..2000.0).contains(&step.next_delay_ms));
    }

    #[test]
    fn test_one_second_of_frames() {
        let (mut session, _) = Session::start(11, 0.0);
        let mut now = 0.0;
        for _ in 0..100 {
            now += 10.0;
            session.frame(now);
        }
        assert!((session.state.score - 10.0).abs() < 1e-3);
        assert!((session.state.speed - (BASE_SPEED + SPEED_RAMP)).abs() < 1e-6);
    }

    #[test]
    fn test_restart_key_restarts_clock_and_chain() {
        let (mut session, first) = Session::start(11, 0.0);
        session.spawn(first);
        session.state.game_over = true;

        // Left is ignored after a crash
        assert_eq!(session.key_down("ArrowLeft", "ArrowLeft", 5_000.0), None);

        let event = session.key_down("r", "KeyR", 10_000.0);
        let Some(GameEvent::Restarted { ticket }) = event else {
            panic!("expected restart, got {event:?}");
        };
        assert!(session.state.obstacles.is_empty());
        assert!(session.spawn(first).is_none());
        assert!(session.spawn(ticket).is_some());

        // Paused time is not counted
        session.frame(10_016.0);
        assert!((session.state.score - 0.16).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let (mut session, _) = Session::start(11, 0.0);
        assert_eq!(session.key_down("q", "KeyQ", 0.0), None);
        assert_eq!(session.state.player.lane, START_LANE);
    }
}
