pub mod sheet;

use crate::character::{CharacterState, MovementState};

/// Distance in logical pixels between walk-cycle frame flips.
pub const FLIP_DISTANCE: f32 = 7.0;

/// Source rectangle inside the sprite sheet plus the anchor that lines the
/// frame up with the character's position (feet, horizontally centered-ish).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteFrame {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl SpriteFrame {
    pub const fn new(x: u32, y: u32, width: u32, height: u32, offset_x: i32, offset_y: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            offset_x,
            offset_y,
        }
    }
}

/// The three frames the cat can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritePose {
    pub run_a: SpriteFrame,
    pub run_b: SpriteFrame,
    pub sit: SpriteFrame,
}

/// Layout of `assets/texture.png`.
pub const CAT_POSE: SpritePose = SpritePose {
    run_a: SpriteFrame::new(0, 0, 16, 9, 9, 9),
    run_b: SpriteFrame::new(16, 0, 13, 10, 7, 10),
    sit: SpriteFrame::new(29, 0, 6, 9, 3, 9),
};

/// Where and how to draw one frame on the logical canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteDraw {
    pub frame: SpriteFrame,
    /// Top-left corner on the canvas. May lie outside it; the blit clips.
    pub x: i32,
    pub y: i32,
    /// Flip horizontally (running left).
    pub mirrored: bool,
}

/// Walk-cycle phase: even steps of `FLIP_DISTANCE` show frame A, odd show B.
/// Advances with distance traveled rather than wall-clock time.
fn uses_first_run_frame(x: f32) -> bool {
    ((x / FLIP_DISTANCE).floor() as i64).rem_euclid(2) == 0
}

/// Pick the frame for the character's current state and place it.
pub fn select(pose: &SpritePose, state: &CharacterState) -> SpriteDraw {
    let frame = match state.movement {
        MovementState::Sitting => pose.sit,
        _ if uses_first_run_frame(state.pos.x) => pose.run_a,
        _ => pose.run_b,
    };

    let px = state.pos.x as i32;
    let py = state.pos.y as i32;
    let mirrored = state.movement == MovementState::RunningLeft;

    // Mirrored frames hang off the anchor by their right edge.
    let x = if mirrored {
        px - frame.width as i32 + frame.offset_x
    } else {
        px - frame.offset_x
    };

    SpriteDraw {
        frame,
        x,
        y: py - frame.offset_y,
        mirrored,
    }
}
