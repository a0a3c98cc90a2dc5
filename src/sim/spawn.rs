//! Obstacle spawning
//!
//! Spawning is a self-rescheduling chain driven by an external timer. The
//! chain is identified by a `SpawnTicket`; arming a new chain (at start and on
//! every reset) invalidates the previous ticket, so a stale timer that still
//! fires does nothing and stops rescheduling.

use rand::Rng;

use super::state::{GameState, Obstacle, TextureSlot};
use crate::consts::*;

/// Handle carried by each scheduled spawn callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTicket {
    generation: u64,
}

/// Result of one live spawn step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnStep {
    pub obstacle_id: u32,
    /// Milliseconds until the chain should run again
    pub next_delay_ms: f64,
}

impl GameState {
    /// Start a fresh spawn chain, invalidating any earlier one
    pub fn arm_spawn_chain(&mut self) -> SpawnTicket {
        self.spawn_generation += 1;
        SpawnTicket {
            generation: self.spawn_generation,
        }
    }

    /// Whether `ticket` belongs to the live chain
    pub fn is_live(&self, ticket: SpawnTicket) -> bool {
        ticket.generation == self.spawn_generation
    }

    /// Run one step of the chain: spawn an obstacle and pick the next delay.
    ///
    /// Returns `None` for a stale ticket; the caller must not reschedule.
    /// Spawning does not look at `game_over`.
    pub fn run_spawn_step(&mut self, ticket: SpawnTicket) -> Option<SpawnStep> {
        if !self.is_live(ticket) {
            return None;
        }
        let obstacle_id = self.spawn_obstacle().id;
        let next_delay_ms = self.next_spawn_delay_ms();
        Some(SpawnStep {
            obstacle_id,
            next_delay_ms,
        })
    }

    /// Add one obstacle in a random lane with a random texture
    pub fn spawn_obstacle(&mut self) -> &Obstacle {
        let id = self.next_entity_id();
        let texture = TextureSlot(self.rng.random_range(0..OBSTACLE_TEXTURE_COUNT));
        let lane = self.rng.random_range(0..LANE_X.len());
        self.obstacles.push(Obstacle::new(id, lane, texture));
        log::debug!("Spawned obstacle {} in lane {} ({:?})", id, lane, texture);
        &self.obstacles[self.obstacles.len() - 1]
    }

    /// Uniform delay in [1000, 2000) ms
    pub fn next_spawn_delay_ms(&mut self) -> f64 {
        SPAWN_DELAY_MIN_MS + self.rng.random::<f64>() * SPAWN_DELAY_SPAN_MS
    }
}
