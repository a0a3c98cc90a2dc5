//! Keyboard input
//!
//! Keys map to discrete commands. Lane moves snap the player instantly;
//! restart is the only command accepted after a crash.

use super::state::{GameEvent, GameState};
use super::tick::reset;

/// A recognized key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    MoveLeft,
    MoveRight,
    Restart,
}

impl InputCommand {
    /// Map a DOM `KeyboardEvent` (`key`, `code`) to a command
    pub fn from_key(key: &str, code: &str) -> Option<Self> {
        if key == "ArrowLeft" || key.eq_ignore_ascii_case("a") {
            Some(Self::MoveLeft)
        } else if key == "ArrowRight" || key.eq_ignore_ascii_case("d") {
            Some(Self::MoveRight)
        } else if key.eq_ignore_ascii_case("r") || code == "KeyR" {
            Some(Self::Restart)
        } else {
            None
        }
    }
}

/// Apply a command to the game state.
///
/// While the game is over only `Restart` does anything; while playing,
/// `Restart` is ignored. Returns the resulting event, if any.
pub fn handle_input(state: &mut GameState, command: InputCommand) -> Option<GameEvent> {
    if state.game_over {
        return match command {
            InputCommand::Restart => Some(GameEvent::Restarted {
                ticket: reset(state),
            }),
            _ => None,
        };
    }

    let moved = match command {
        InputCommand::MoveLeft => state.player.move_left(),
        InputCommand::MoveRight => state.player.move_right(),
        InputCommand::Restart => false,
    };
    moved.then_some(GameEvent::LaneChanged {
        lane: state.player.lane,
    })
}
