//! Player/obstacle collision
//!
//! A crash is a plain center-to-center distance test; cube extents are
//! ignored.

use glam::Vec3;

use super::state::Obstacle;
use crate::consts::COLLISION_DISTANCE;

/// True when two entity centers are closer than the crash distance
#[inline]
pub fn collides(a: Vec3, b: Vec3) -> bool {
    a.distance(b) < COLLISION_DISTANCE
}

/// Find the obstacle the player crashed into.
///
/// Every obstacle is checked; when several qualify the last one wins.
pub fn find_collision(player_pos: Vec3, obstacles: &[Obstacle]) -> Option<u32> {
    obstacles
        .iter()
        .rev()
        .find(|o| collides(o.pos, player_pos))
        .map(|o| o.id)
}
