//! Keeps mobs inside the world.
//!
//! Runs after [`movement`](super::movement::movement) so a mob that moved
//! past an edge this tick is pulled back before anything renders it.
use bevy_ecs::prelude::*;

use crate::components::mob::Mob;
use crate::components::sprite::AnimatedSprite;
use crate::components::transform::Transform;
use crate::resources::worldbounds::WorldBounds;

pub fn correct_mobs_out_of_bounds(
    mut query: Query<(&mut Transform, &AnimatedSprite), With<Mob>>,
    bounds: Res<WorldBounds>,
) {
    for (mut transform, sprite) in query.iter_mut() {
        let size = (sprite.width(), sprite.height());
        Mob::correct_out_of_bounds(&mut transform.position, &bounds, size);
    }
}
