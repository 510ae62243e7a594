//! Mobs: moving, animated, hit-testable actors.
//!
//! A mob entity is assembled from plain components:
//!
//! - [`Transform`] for its exact (sub-pixel) position
//! - [`Mover`] for velocity and the base save record
//! - [`Mob`] for the animation timer, cadence and hitbox
//! - [`AnimatedSprite`] for the frame cursor and image size
//! - [`MobKind`] naming the [`Bestiary`](crate::resources::bestiary::Bestiary)
//!   template it was built from
//! - [`SpawnOrder`] fixing its place in draw and save order
//!
//! Systems in [`crate::systems`] call the methods here once per tick.

use std::io::{Read, Write};
use std::num::NonZeroU32;

use bevy_ecs::prelude::Component;
use glam::Vec2;

use super::hitbox::{Hitbox, Physical};
use super::mover::Mover;
use super::sprite::AnimatedSprite;
use super::transform::Transform;
use crate::resources::worldbounds::WorldBounds;
use crate::savegame::{PersistError, ReadExt, WriteExt};

/// Ticks between animation frames unless configured otherwise.
pub const DEFAULT_TICKS_PER_FRAME: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// Template key a mob was spawned from, written into savegames.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct MobKind(pub String);

/// Position of a mob in its level's spawn sequence.
///
/// Entity ids are recycled after despawns, so they say nothing about which
/// mob came first.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpawnOrder(pub u64);

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Mob {
    /// Ticks since the mob was spawned (or loaded), used as the animation clock.
    pub animation_timer: i32,
    /// How many ticks each animation frame is shown for.
    pub ticks_per_frame: NonZeroU32,
    pub hitbox: Hitbox,
}

impl Physical for Mob {
    fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }
}

impl Mob {
    pub fn new(hitbox: Hitbox, ticks_per_frame: NonZeroU32) -> Self {
        Self {
            animation_timer: 0,
            ticks_per_frame,
            hitbox,
        }
    }

    /// Advance the animation clock by one tick.
    ///
    /// The sprite steps forward whenever the timer is a multiple of the
    /// cadence, so the first call on a fresh mob advances immediately and
    /// every `ticks_per_frame` calls after that advance once more.
    pub fn animate(&mut self, sprite: &mut AnimatedSprite) {
        let cadence = i64::from(self.ticks_per_frame.get());
        if i64::from(self.animation_timer).rem_euclid(cadence) == 0 {
            sprite.next();
        }
        self.animation_timer = self.animation_timer.wrapping_add(1);
    }

    /// Keep an image of `image_size` pixels at `position` inside `world`.
    ///
    /// Each axis is checked on its own: at or past the far edge snaps to one
    /// pixel inside it, below zero snaps to zero. When the world is narrower
    /// than the image there is no valid position on that axis and the mob is
    /// pinned to zero.
    pub fn correct_out_of_bounds(position: &mut Vec2, world: &WorldBounds, image_size: (u32, u32)) {
        position.x = clamp_axis(position.x, world.width, image_size.0);
        position.y = clamp_axis(position.y, world.height, image_size.1);
    }

    /// Write this mob's record: the mover block, then the animation timer and
    /// the sprite frame as big-endian `i32`s.
    pub fn save<W: Write + ?Sized>(
        &self,
        transform: &Transform,
        mover: &Mover,
        sprite: &AnimatedSprite,
        out: &mut W,
    ) -> Result<(), PersistError> {
        mover.save(transform, out)?;
        out.write_i32_be(self.animation_timer)?;
        out.write_i32_be(sprite.frame())?;
        Ok(())
    }

    /// Read a record written by [`Mob::save`].
    ///
    /// Fields are applied as they are read, so a failure leaves the mob
    /// partially loaded and it should be thrown away.
    pub fn load<R: Read + ?Sized>(
        &mut self,
        transform: &mut Transform,
        mover: &mut Mover,
        sprite: &mut AnimatedSprite,
        input: &mut R,
        version: &str,
    ) -> Result<(), PersistError> {
        mover.load(transform, input, version)?;
        self.animation_timer = input.read_i32_be()?;
        sprite.set_frame(input.read_i32_be()?);
        Ok(())
    }
}

fn clamp_axis(value: f32, world_extent: u32, image_extent: u32) -> f32 {
    let limit = world_extent as f32 - image_extent as f32;
    if limit < 1.0 {
        0.0
    } else if value >= limit {
        limit - 1.0
    } else if value < 0.0 {
        0.0
    } else {
        value
    }
}
