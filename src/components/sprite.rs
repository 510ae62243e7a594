use bevy_ecs::prelude::Component;

/// Sprite identified by a texture key, with a frame cursor over a sheet of
/// `frame_count` equally sized frames of `width` x `height` pixels.
///
/// Image data is not held here; the renderer only needs the key, the current
/// frame and the size.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct AnimatedSprite {
    pub tex_key: String,
    frame: i32,
    frame_count: i32,
    width: u32,
    height: u32,
}

impl AnimatedSprite {
    /// `frame_count` below 1 is treated as a single still frame.
    pub fn new(tex_key: impl Into<String>, frame_count: i32, width: u32, height: u32) -> Self {
        Self {
            tex_key: tex_key.into(),
            frame: 0,
            frame_count: frame_count.max(1),
            width,
            height,
        }
    }

    /// A single-frame sprite.
    pub fn still(tex_key: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(tex_key, 1, width, height)
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    pub fn frame_count(&self) -> i32 {
        self.frame_count
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Advance one frame, wrapping to the first after the last.
    pub fn next(&mut self) {
        self.frame = (self.frame + 1) % self.frame_count;
    }

    /// Jump to `frame`, wrapped into the sheet.
    pub fn set_frame(&mut self, frame: i32) {
        self.frame = frame.rem_euclid(self.frame_count);
    }
}
