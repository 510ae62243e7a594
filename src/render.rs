//! Rendering seam and the headless software renderer.
//!
//! The game loop hands a [`RenderTarget`] the ordered list of
//! [`RenderItem`]s a world produced for this frame. [`HeadlessRenderer`]
//! draws each item as a solid rectangle into an in-memory `0xRRGGBB`
//! framebuffer, which is enough to take screenshots and to run the loop
//! without a display.

use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use image::{Rgb, RgbImage};
use log::{debug, info};
use rustc_hash::FxHasher;
use serde::Serialize;

/// One sprite to draw, in world pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub tex_key: String,
    pub frame: i32,
    pub x: f32,
    pub y: f32,
    pub width: u32,
    pub height: u32,
}

pub trait RenderTarget {
    /// Draw one frame. Items later in the slice are drawn on top.
    fn render(&mut self, items: &[RenderItem]);

    /// Save the last rendered frame and return where it was written.
    fn screenshot(&mut self) -> Result<PathBuf, String>;
}

const BACKGROUND: u32 = 0x10_10_18;

#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    screenshot_dir: PathBuf,
    next_shot: u32,
    frames: u64,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32, screenshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width as usize * height as usize],
            screenshot_dir: screenshot_dir.into(),
            next_shot: 0,
            frames: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Color at `(x, y)` of the last frame, `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    fn fill_rect(&mut self, item: &RenderItem) {
        let color = item_color(item);
        let x0 = (item.x.floor() as i64).clamp(0, self.width as i64) as u32;
        let y0 = (item.y.floor() as i64).clamp(0, self.height as i64) as u32;
        let x1 = (item.x.floor() as i64 + item.width as i64).clamp(0, self.width as i64) as u32;
        let y1 = (item.y.floor() as i64 + item.height as i64).clamp(0, self.height as i64) as u32;
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }
}

impl RenderTarget for HeadlessRenderer {
    fn render(&mut self, items: &[RenderItem]) {
        self.pixels.fill(BACKGROUND);
        for item in items {
            self.fill_rect(item);
        }
        self.frames += 1;
    }

    fn screenshot(&mut self) -> Result<PathBuf, String> {
        fs::create_dir_all(&self.screenshot_dir)
            .map_err(|e| format!("Failed to create {}: {}", self.screenshot_dir.display(), e))?;

        let path = loop {
            let candidate = self
                .screenshot_dir
                .join(format!("screenshot_{:04}.png", self.next_shot));
            self.next_shot += 1;
            if !candidate.exists() {
                break candidate;
            }
            debug!("Skipping existing {}", candidate.display());
        };

        let image = RgbImage::from_fn(self.width, self.height, |x, y| {
            let [_, r, g, b] = self.pixels[(y * self.width + x) as usize].to_be_bytes();
            Rgb([r, g, b])
        });
        image
            .save(&path)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

        info!("Screenshot saved to {}", path.display());
        Ok(path)
    }
}

/// Stable color per texture and frame, so animation is visible.
fn item_color(item: &RenderItem) -> u32 {
    let mut hasher = FxHasher::default();
    item.tex_key.hash(&mut hasher);
    item.frame.hash(&mut hasher);
    // Keep it bright enough to stand out from the background.
    (hasher.finish() as u32 & 0xFF_FF_FF) | 0x40_40_40
}
