//! Axis-aligned hitboxes and the [`Physical`] capability.

use glam::Vec2;

/// Integer rectangle in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Hitbox rectangle whose offset is relative to the owner's exact position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hitbox {
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Hitbox {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            offset_x: 0,
            offset_y: 0,
            width,
            height,
        }
    }

    pub fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

/// Anything that occupies a hitbox in the world.
pub trait Physical {
    fn hitbox(&self) -> &Hitbox;

    /// Absolute bounds at `position`, with the position floored to whole pixels.
    fn bounds(&self, position: Vec2) -> IRect {
        let hitbox = self.hitbox();
        IRect {
            x: position.x.floor() as i32 + hitbox.offset_x,
            y: position.y.floor() as i32 + hitbox.offset_y,
            width: hitbox.width,
            height: hitbox.height,
        }
    }
}
