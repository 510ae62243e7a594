use bevy_ecs::prelude::*;

use crate::components::mover::Mover;
use crate::components::transform::Transform;
use crate::resources::worldtime::WorldTime;

/// Integrate positions from velocities over one tick.
pub fn movement(mut query: Query<(&mut Transform, &Mover)>, time: Res<WorldTime>) {
    for (mut transform, mover) in query.iter_mut() {
        transform.position += mover.velocity * time.delta;
    }
}
