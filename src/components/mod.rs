//! ECS components for entities.
//!
//! This module groups the component types that make up the entities of a
//! level. Components are plain data plus the per-tick operations systems
//! call on them.
//!
//! Submodules overview:
//! - [`hitbox`] – axis-aligned hitbox and the `Physical` capability
//! - [`localtransform`] – placement of a part relative to its owner
//! - [`mob`] – animation clock, bounds correction and save record of mobs
//! - [`mover`] – velocity and the base save record of moving entities
//! - [`sprite`] – sprite sheet key and frame cursor
//! - [`transform`] – world-space position, scale and rotation

pub mod hitbox;
pub mod localtransform;
pub mod mob;
pub mod mover;
pub mod sprite;
pub mod transform;
