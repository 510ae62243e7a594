//! Placement of a part relative to the entity that owns it.
//!
//! A part is an entity spawned with [`ChildOf`](bevy_ecs::hierarchy::ChildOf)
//! pointing at its owner (or no parent at all, when standalone). Its
//! [`LocalTransform`] is an offset from the owner's
//! [`Transform`](super::transform::Transform).
//!
//! Unlike a propagated global transform, nothing here is cached: every view
//! is recomputed from the owner's current transform, so a part always follows
//! its owner without a propagation pass.

use bevy_ecs::prelude::Component;
use glam::Vec2;

use super::transform::Transform;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalTransform {
    pub transform: Transform,
}

impl LocalTransform {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::new(Transform::from_xy(x, y))
    }

    /// Owner position plus local position. Without an owner, the local position.
    pub fn global_position(&self, owner: Option<&Transform>) -> Vec2 {
        match owner {
            Some(owner) => owner.position + self.transform.position,
            None => self.transform.position,
        }
    }

    /// Owner scale times local scale, component-wise.
    pub fn global_scale(&self, owner: Option<&Transform>) -> Vec2 {
        match owner {
            Some(owner) => owner.scale * self.transform.scale,
            None => self.transform.scale,
        }
    }

    pub fn global_rotation(&self, owner: Option<&Transform>) -> f32 {
        match owner {
            Some(owner) => owner.rotation + self.transform.rotation,
            None => self.transform.rotation,
        }
    }

    /// The full composed placement, taken from a single read of `owner`.
    pub fn global_transform(&self, owner: Option<&Transform>) -> Transform {
        match owner {
            Some(owner) => Transform::compose(owner, &self.transform),
            None => self.transform,
        }
    }
}
