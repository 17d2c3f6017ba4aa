use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, NamedKey};

use crate::character::MovementState;

/// The two keys the cat listens to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKey {
    Left,
    Right,
    Other,
}

impl GameKey {
    pub fn from_logical(key: &Key) -> Self {
        match key {
            Key::Named(NamedKey::ArrowLeft) => GameKey::Left,
            Key::Named(NamedKey::ArrowRight) => GameKey::Right,
            _ => GameKey::Other,
        }
    }
}

/// A single keyboard transition, queued by the app until the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: GameKey,
    pub pressed: bool,
}

impl KeyInput {
    pub fn press(key: GameKey) -> Self {
        Self { key, pressed: true }
    }

    pub fn release(key: GameKey) -> Self {
        Self { key, pressed: false }
    }

    pub fn from_winit(event: &KeyEvent) -> Self {
        let key = GameKey::from_logical(&event.logical_key);
        match event.state {
            ElementState::Pressed => Self::press(key),
            ElementState::Released => Self::release(key),
        }
    }
}

/// Apply one key transition to the movement state.
///
/// The last press wins and any release sits the cat down, so letting go of
/// one arrow while the other is still held stops the run.
pub fn handle(movement: &mut MovementState, input: KeyInput) {
    let next = match (input.pressed, input.key) {
        (true, GameKey::Left) => MovementState::RunningLeft,
        (true, GameKey::Right) => MovementState::RunningRight,
        (true, GameKey::Other) => return,
        (false, _) => MovementState::Sitting,
    };
    if next != *movement {
        log::debug!("Movement {:?} -> {:?}", movement, next);
    }
    *movement = next;
}
