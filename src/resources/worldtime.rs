use bevy_ecs::prelude::Resource;

/// Simulation time as seen by systems.
///
/// Only advanced by world ticks, so `delta` is always one fixed tick long
/// regardless of how fast the loop is rendering.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub ticks: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            ticks: 0,
        }
    }
}
