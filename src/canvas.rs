//! Logical framebuffer. Everything is drawn here at low resolution, then the
//! presenter scales it up to the window.

use crate::sprite::sheet::SpriteSheet;
use crate::sprite::SpriteDraw;

pub const LOGICAL_WIDTH: u32 = 128;
pub const LOGICAL_HEIGHT: u32 = 64;
/// Window pixels per logical pixel.
pub const SCALE: u32 = 3;

pub struct Canvas {
    width: u32,
    height: u32,
    /// RGBA8, row-major.
    pixels: Vec<[u8; 4]>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0xFF]; (width * height) as usize],
        }
    }

    /// Canvas at the fixed logical resolution.
    pub fn logical() -> Self {
        Self::new(LOGICAL_WIDTH, LOGICAL_HEIGHT)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Raw bytes for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        self.pixels.fill(color);
    }

    /// Blit one sprite frame. Transparent sheet pixels are skipped, partial
    /// alpha is blended source-over, and anything off-canvas is clipped.
    pub fn draw_sprite(&mut self, sheet: &SpriteSheet, draw: &SpriteDraw) {
        let f = &draw.frame;
        for sy in 0..f.height {
            let dy = draw.y + sy as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..f.width {
                let col = if draw.mirrored { f.width - 1 - sx } else { sx };
                let dx = draw.x + col as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let Some(src) = sheet.pixel(f.x + sx, f.y + sy) else {
                    continue;
                };
                let idx = (dy as u32 * self.width + dx as u32) as usize;
                self.pixels[idx] = blend(src, self.pixels[idx]);
            }
        }
    }
}

fn blend(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match src[3] {
        0 => dst,
        0xFF => src,
        a => {
            let a = a as u32;
            let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
            [
                mix(src[0], dst[0]),
                mix(src[1], dst[1]),
                mix(src[2], dst[2]),
                0xFF,
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::SpriteFrame;
    use image::{Rgba, RgbaImage};

    const BG: [u8; 4] = [175, 38, 38, 255];
    const INK: [u8; 4] = [40, 30, 30, 255];

    /// 3x1 sheet: ink, white (keyed out), red.
    fn sheet() -> SpriteSheet {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba(INK));
        img.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(2, 0, Rgba([200, 0, 0, 255]));
        SpriteSheet::from_image(img)
    }

    fn draw_at(x: i32, y: i32, mirrored: bool) -> SpriteDraw {
        SpriteDraw {
            frame: SpriteFrame::new(0, 0, 3, 1, 0, 0),
            x,
            y,
            mirrored,
        }
    }

    #[test]
    fn logical_size() {
        let c = Canvas::logical();
        assert_eq!((c.width(), c.height()), (128, 64));
        assert_eq!(c.as_bytes().len(), 128 * 64 * 4);
    }

    #[test]
    fn clear_fills_everything() {
        let mut c = Canvas::new(4, 4);
        c.clear(BG);
        assert!((0..4).all(|y| (0..4).all(|x| c.pixel(x, y) == Some(BG))));
    }

    #[test]
    fn blit_skips_color_key() {
        let mut c = Canvas::new(8, 2);
        c.clear(BG);
        c.draw_sprite(&sheet(), &draw_at(2, 1, false));
        assert_eq!(c.pixel(2, 1), Some(INK));
        assert_eq!(c.pixel(3, 1), Some(BG));
        assert_eq!(c.pixel(4, 1), Some([200, 0, 0, 255]));
        assert_eq!(c.pixel(2, 0), Some(BG));
    }

    #[test]
    fn mirrored_blit_flips_columns() {
        let mut c = Canvas::new(8, 1);
        c.clear(BG);
        c.draw_sprite(&sheet(), &draw_at(2, 0, true));
        assert_eq!(c.pixel(2, 0), Some([200, 0, 0, 255]));
        assert_eq!(c.pixel(4, 0), Some(INK));
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut c = Canvas::new(2, 1);
        c.clear(BG);
        c.draw_sprite(&sheet(), &draw_at(-2, 0, false));
        assert_eq!(c.pixel(0, 0), Some([200, 0, 0, 255]));
        assert_eq!(c.pixel(1, 0), Some(BG));

        c.clear(BG);
        c.draw_sprite(&sheet(), &draw_at(1, 0, false));
        assert_eq!(c.pixel(1, 0), Some(INK));

        c.clear(BG);
        c.draw_sprite(&sheet(), &draw_at(0, 5, false));
        assert_eq!(c.pixel(0, 0), Some(BG));
    }

    #[test]
    fn half_alpha_blends() {
        assert_eq!(blend([255, 0, 0, 128], [0, 0, 255, 255]), [128, 0, 127, 255]);
        assert_eq!(blend([1, 2, 3, 0], BG), BG);
    }
}
