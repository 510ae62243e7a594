//! World-space placement of an entity.
//!
//! Every entity that lives in a [`Level`](crate::game::Level) carries exactly
//! one [`Transform`]. Attached parts carry a
//! [`LocalTransform`](super::localtransform::LocalTransform) instead, which is
//! composed with the owner's `Transform` on demand.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Position, scale and rotation (radians) of an entity.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Origin, unit scale, no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Compose a parent placement with a local offset.
    ///
    /// Positions and rotations add, scales multiply component-wise. The local
    /// position is not rotated or scaled by the parent: a rotated parent still
    /// places its parts along the world axes.
    pub fn compose(parent: &Transform, local: &Transform) -> Transform {
        Transform {
            position: parent.position + local.position,
            scale: parent.scale * local.scale,
            rotation: parent.rotation + local.rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn compose_adds_position_and_rotation_multiplies_scale() {
        let parent = Transform::from_xy(10.0, -4.0)
            .with_scale(Vec2::new(2.0, 3.0))
            .with_rotation(0.5);
        let local = Transform::from_xy(1.5, 2.0)
            .with_scale(Vec2::new(0.5, -1.0))
            .with_rotation(0.25);

        let global = Transform::compose(&parent, &local);
        assert_eq!(global.position, Vec2::new(11.5, -2.0));
        assert_eq!(global.scale, Vec2::new(1.0, -3.0));
        assert_eq!(global.rotation, 0.75);
    }

    #[test]
    fn compose_does_not_rotate_local_offset() {
        let parent = Transform::from_xy(100.0, 100.0).with_rotation(std::f32::consts::FRAC_PI_2);
        let local = Transform::from_xy(40.0, 0.0);

        let global = Transform::compose(&parent, &local);
        assert_eq!(global.position, Vec2::new(140.0, 100.0));
    }

    #[test]
    fn compose_with_identity_parent_is_local() {
        let local = Transform::from_xy(3.0, 4.0)
            .with_scale(Vec2::new(2.0, 2.0))
            .with_rotation(1.0);
        assert_eq!(Transform::compose(&Transform::IDENTITY, &local), local);
    }

    #[test]
    fn compose_scale_and_rotation_laws_hold_over_samples() {
        let samples = [-7.5_f32, -1.0, 0.0, 0.25, 3.0, 1024.0];
        for &a in &samples {
            for &b in &samples {
                let parent = Transform::from_xy(a, b)
                    .with_scale(Vec2::new(a, b))
                    .with_rotation(a);
                let local = Transform::from_xy(b, a)
                    .with_scale(Vec2::new(b, a))
                    .with_rotation(b);
                let global = Transform::compose(&parent, &local);
                assert_eq!(global.scale, Vec2::new(a * b, b * a));
                assert_eq!(global.rotation, a + b);
            }
        }
    }
}
