use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

/// Pixels of this colour in the sheet are treated as transparent.
pub const COLOR_KEY: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// Decoded sprite sheet, RGBA8 row-major, colour key already applied.
pub struct SpriteSheet {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl SpriteSheet {
    /// Decode a sheet from disk.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to load sprite sheet {}", path.display()))?
            .to_rgba8();
        let sheet = Self::from_image(img);
        log::info!(
            "Sprite sheet {} loaded: {}x{}",
            path.display(),
            sheet.width,
            sheet.height
        );
        Ok(sheet)
    }

    pub fn from_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                if [r, g, b] == COLOR_KEY {
                    [r, g, b, 0]
                } else {
                    [r, g, b, a]
                }
            })
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA at (x, y), or None outside the sheet.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }
}
