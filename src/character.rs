use glam::Vec2;

use crate::canvas::LOGICAL_WIDTH;

/// Running speed in logical pixels per second.
pub const VELOCITY: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    Sitting,
    RunningRight,
    RunningLeft,
}

impl MovementState {
    pub fn is_running(self) -> bool {
        matches!(self, MovementState::RunningRight | MovementState::RunningLeft)
    }

    /// Signed horizontal velocity for this state.
    pub fn velocity(self) -> f32 {
        match self {
            MovementState::RunningRight => VELOCITY,
            MovementState::RunningLeft => -VELOCITY,
            MovementState::Sitting => 0.0,
        }
    }
}

/// The cat. `pos.y` is the baseline the feet stand on and never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterState {
    pub pos: Vec2,
    pub movement: MovementState,
}

impl CharacterState {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x.clamp(0.0, LOGICAL_WIDTH as f32), y),
            movement: MovementState::Sitting,
        }
    }
}

/// Integrate one step of `dt` seconds. x stays within `[0, LOGICAL_WIDTH]`.
pub fn update(state: CharacterState, dt: f32) -> CharacterState {
    if !state.movement.is_running() {
        return state;
    }

    let mut next = state;
    next.pos.x += state.movement.velocity() * dt;
    next.pos.x = next.pos.x.clamp(0.0, LOGICAL_WIDTH as f32);
    next
}
