//! Owner/part queries for attached parts.
//!
//! Parts are entities holding a [`LocalTransform`] and, when attached, a
//! [`ChildOf`] pointing at the owner. Global placement is resolved here at
//! call time from the owner's current [`Transform`]; there is no propagation
//! pass and no cached global component.

use bevy_ecs::hierarchy::ChildOf;
use bevy_ecs::prelude::*;

use crate::components::localtransform::LocalTransform;
use crate::components::transform::Transform;

/// Spawn a part with `local` offset, attached to `owner` when given.
///
/// Bundles extra components (sprite, markers) along with the placement.
pub fn spawn_part<B: Bundle>(
    world: &mut World,
    owner: Option<Entity>,
    local: LocalTransform,
    bundle: B,
) -> Entity {
    let mut part = world.spawn((local, bundle));
    if let Some(owner) = owner {
        part.insert(ChildOf(owner));
    }
    part.id()
}

/// Transform of the entity that owns `part`, if it has one.
pub fn owner_transform(world: &World, part: Entity) -> Option<Transform> {
    let owner = world.get::<ChildOf>(part)?.parent();
    world.get::<Transform>(owner).copied()
}

/// Global placement of `part`.
///
/// Returns `None` if `part` has no [`LocalTransform`]. A part whose owner is
/// missing or has no `Transform` is treated as standalone.
pub fn global_transform(world: &World, part: Entity) -> Option<Transform> {
    let local = world.get::<LocalTransform>(part)?;
    let owner = owner_transform(world, part);
    Some(local.global_transform(owner.as_ref()))
}
