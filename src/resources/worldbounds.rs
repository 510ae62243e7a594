use bevy_ecs::prelude::Resource;

/// Extent of the playable world in pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldBounds {
    pub width: u32,
    pub height: u32,
}

impl WorldBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
