//! Mob animation system.
use bevy_ecs::prelude::*;

use crate::components::mob::Mob;
use crate::components::sprite::AnimatedSprite;

/// Step every mob's animation clock by one tick.
pub fn animate_mobs(mut query: Query<(&mut Mob, &mut AnimatedSprite)>) {
    for (mut mob, mut sprite) in query.iter_mut() {
        mob.animate(&mut sprite);
    }
}
