//! Time update system.
//!
//! Advances the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per logical tick.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Add one tick of `dt` seconds to the `WorldTime` resource.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    wt.elapsed += dt;
    wt.delta = dt;
    wt.ticks += 1;
}
