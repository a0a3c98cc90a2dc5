//! Game simulation module
//!
//! All gameplay logic lives here, free of rendering and platform code:
//! - Input commands and lane movement
//! - Obstacle spawning chain
//! - Per-frame update, collision and reset

pub mod collision;
pub mod input;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{collides, find_collision};
pub use input::{InputCommand, handle_input};
pub use spawn::{SpawnStep, SpawnTicket};
pub use state::{GameEvent, GameState, Obstacle, Player, TextureSlot};
pub use tick::{reset, tick};
