use std::path::Path;

use instant::Instant;

use crate::canvas::{Canvas, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::character::{self, CharacterState};
use crate::clock::Clock;
use crate::input::{self, KeyInput};
use crate::sprite::sheet::SpriteSheet;
use crate::sprite::{self, SpritePose, CAT_POSE};

/// Sprite sheet, relative to the working directory.
pub const SPRITE_SHEET_PATH: &str = "assets/texture.png";
/// Canvas clear colour.
pub const BACKGROUND: [u8; 4] = [175, 38, 38, 255];
/// Where the cat starts, sitting.
pub const START_X: f32 = 10.0;

/// Receives the finished logical canvas once per frame (upscale + present).
pub trait Presenter {
    fn present(&mut self, canvas: &Canvas);
}

/// Drawing resources held while running. Released sheet first, canvas last.
struct Surfaces {
    sheet: SpriteSheet,
    canvas: Canvas,
}

enum Phase {
    Initializing,
    Running(Surfaces),
    ShuttingDown,
}

/// Owns all per-frame state. The host event loop calls `step` once per frame.
pub struct FrameDriver {
    phase: Phase,
    pose: SpritePose,
    character: CharacterState,
    clock: Clock,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            phase: Phase::Initializing,
            pose: CAT_POSE,
            character: CharacterState::new(START_X, LOGICAL_HEIGHT as f32),
            clock: Clock::new(),
        }
    }

    /// One-time setup: logical canvas, sprite sheet, clock seed.
    /// A missing or undecodable sheet is fatal; the driver stays uninitialized.
    pub fn initialize(&mut self, sheet_path: impl AsRef<Path>) -> anyhow::Result<()> {
        let sheet = SpriteSheet::load(sheet_path)?;
        self.start(sheet, Instant::now());
        Ok(())
    }

    /// Enter `Running` with an already decoded sheet, clock seeded at `now`.
    pub fn start(&mut self, sheet: SpriteSheet, now: Instant) {
        if !matches!(self.phase, Phase::Initializing) {
            log::warn!("Frame driver already started");
            return;
        }
        let canvas = Canvas::logical();
        self.clock = Clock::starting_at(now);
        self.phase = Phase::Running(Surfaces { sheet, canvas });
        log::info!(
            "Frame driver running: {}x{} canvas, cat at x={}",
            LOGICAL_WIDTH,
            LOGICAL_HEIGHT,
            self.character.pos.x
        );
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn character(&self) -> &CharacterState {
        &self.character
    }

    /// Run one frame, then advance the clock to the current monotonic time.
    pub fn step<P: Presenter>(
        &mut self,
        events: impl IntoIterator<Item = KeyInput>,
        presenter: &mut P,
    ) {
        if self.run_frame(events, presenter) {
            self.clock.tick();
        }
    }

    /// Like `step`, with the frame's end timestamp supplied by the caller.
    pub fn step_at<P: Presenter>(
        &mut self,
        events: impl IntoIterator<Item = KeyInput>,
        presenter: &mut P,
        now: Instant,
    ) {
        if self.run_frame(events, presenter) {
            self.clock.tick_at(now);
        }
    }

    /// Input, clear, update, draw, present. The update consumes the delta
    /// measured at the end of the previous frame. Returns false (and does
    /// nothing) unless running.
    fn run_frame<P: Presenter>(
        &mut self,
        events: impl IntoIterator<Item = KeyInput>,
        presenter: &mut P,
    ) -> bool {
        let Phase::Running(surfaces) = &mut self.phase else {
            return false;
        };

        for event in events {
            input::handle(&mut self.character.movement, event);
        }

        surfaces.canvas.clear(BACKGROUND);

        self.character = character::update(self.character, self.clock.delta());

        let draw = sprite::select(&self.pose, &self.character);
        surfaces.canvas.draw_sprite(&surfaces.sheet, &draw);

        presenter.present(&surfaces.canvas);
        true
    }

    /// Release drawing resources in reverse acquisition order. Idempotent.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::ShuttingDown) {
            Phase::Running(Surfaces { sheet, canvas }) => {
                drop(sheet);
                drop(canvas);
                log::info!("Frame driver resources released");
            }
            Phase::Initializing | Phase::ShuttingDown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::MovementState;
    use crate::input::GameKey;
    use crate::sprite::SpriteFrame;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    /// Counts frames and keeps the bottom canvas row of the last one.
    #[derive(Default)]
    struct Recorder {
        frames: usize,
        last_pixels: Vec<[u8; 4]>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, canvas: &Canvas) {
            self.frames += 1;
            self.last_pixels = (0..canvas.width())
                .filter_map(|x| canvas.pixel(x, canvas.height() - 1))
                .collect();
        }
    }

    fn solid_sheet() -> SpriteSheet {
        SpriteSheet::from_image(RgbaImage::from_pixel(35, 10, Rgba([0, 0, 0, 255])))
    }

    fn running_driver(t0: Instant) -> FrameDriver {
        let mut d = FrameDriver::new();
        d.start(solid_sheet(), t0);
        d
    }

    #[test]
    fn step_before_start_is_noop() {
        let mut d = FrameDriver::new();
        let mut rec = Recorder::default();
        d.step([KeyInput::press(GameKey::Right)], &mut rec);
        assert_eq!(rec.frames, 0);
        assert_eq!(d.character().movement, MovementState::Sitting);
        assert!(!d.is_running());
    }

    #[test]
    fn initialize_fails_on_missing_sheet() {
        let mut d = FrameDriver::new();
        assert!(d.initialize("assets/nope.png").is_err());
        assert!(!d.is_running());
    }

    #[test]
    fn first_step_uses_zero_delta() {
        let t0 = Instant::now();
        let mut d = running_driver(t0);
        let mut rec = Recorder::default();
        d.step_at(
            [KeyInput::press(GameKey::Right)],
            &mut rec,
            t0 + Duration::from_millis(50),
        );
        assert_eq!(rec.frames, 1);
        assert_eq!(d.character().pos.x, START_X);
        assert_eq!(d.character().movement, MovementState::RunningRight);
    }

    #[test]
    fn draws_cat_over_background() {
        let t0 = Instant::now();
        let mut d = running_driver(t0);
        let mut rec = Recorder::default();
        d.step_at(std::iter::empty(), &mut rec, t0);

        // Sit frame is 6 wide anchored 3 left of x=10, bottom row at y=63.
        assert_eq!(rec.last_pixels.len(), LOGICAL_WIDTH as usize);
        assert_eq!(rec.last_pixels[6], BACKGROUND);
        assert!((7..13).all(|x| rec.last_pixels[x] == [0, 0, 0, 255]));
        assert_eq!(rec.last_pixels[13], BACKGROUND);
    }

    #[test]
    fn run_right_scenario_clamps_at_width() {
        let t0 = Instant::now();
        let mut d = running_driver(t0);
        let mut rec = Recorder::default();
        let frame = Duration::from_millis(20);
        let pose = CAT_POSE;

        d.step_at([KeyInput::press(GameKey::Right)], &mut rec, t0 + frame);

        let mut seen: Vec<SpriteFrame> = Vec::new();
        let mut last_x = d.character().pos.x;
        for i in 2..=51u32 {
            d.step_at(std::iter::empty(), &mut rec, t0 + frame * i);
            let x = d.character().pos.x;
            assert!(x >= last_x);
            last_x = x;
            seen.push(sprite::select(&pose, d.character()).frame);
        }

        // 1.0s at 80px/s from x=10.
        assert!((d.character().pos.x - 90.0).abs() < 0.01);
        for i in 52..=80u32 {
            d.step_at(std::iter::empty(), &mut rec, t0 + frame * i);
        }
        assert_eq!(d.character().pos.x, LOGICAL_WIDTH as f32);
        assert_eq!(d.character().movement, MovementState::RunningRight);
        assert!(seen.contains(&pose.run_a));
        assert!(seen.contains(&pose.run_b));
        assert!(!seen.contains(&pose.sit));
    }

    #[test]
    fn stall_moves_at_most_max_delta() {
        let t0 = Instant::now();
        let mut d = running_driver(t0);
        let mut rec = Recorder::default();
        d.step_at([KeyInput::press(GameKey::Right)], &mut rec, t0 + Duration::from_secs(5));
        d.step_at(std::iter::empty(), &mut rec, t0 + Duration::from_secs(6));
        // 0.1s at 80px/s
        assert!((d.character().pos.x - (START_X + 8.0)).abs() < 1e-4);
    }

    #[test]
    fn release_sits_and_stops() {
        let t0 = Instant::now();
        let mut d = running_driver(t0);
        let mut rec = Recorder::default();
        let ms = Duration::from_millis;
        d.step_at([KeyInput::press(GameKey::Left)], &mut rec, t0 + ms(50));
        d.step_at(std::iter::empty(), &mut rec, t0 + ms(100));
        let x = d.character().pos.x;
        assert!(x < START_X);
        d.step_at([KeyInput::release(GameKey::Left)], &mut rec, t0 + ms(150));
        assert_eq!(d.character().movement, MovementState::Sitting);
        assert_eq!(d.character().pos.x, x);
    }

    #[test]
    fn shutdown_stops_stepping() {
        let t0 = Instant::now();
        let mut d = running_driver(t0);
        let mut rec = Recorder::default();
        d.step_at(std::iter::empty(), &mut rec, t0);
        d.shutdown();
        d.shutdown();
        d.step_at(std::iter::empty(), &mut rec, t0);
        assert_eq!(rec.frames, 1);
        assert!(!d.is_running());

        // Cannot restart after teardown.
        d.start(solid_sheet(), t0);
        assert!(!d.is_running());
    }
}
