//! Kinematic base shared by everything that moves.
//!
//! A [`Mover`] stores velocity in world pixels per second; the
//! [`movement`](crate::systems::movement::movement) system integrates it into
//! the entity's [`Transform`] each tick.
//!
//! The mover also owns the first block of every moving entity's save record:
//!
//! | field      | encoding |
//! |------------|----------|
//! | position.x | f64 BE   |
//! | position.y | f64 BE   |
//! | velocity.x | f64 BE   |
//! | velocity.y | f64 BE   |

use std::io::{Read, Write};

use bevy_ecs::prelude::Component;
use glam::Vec2;

use super::transform::Transform;
use crate::savegame::{PersistError, ReadExt, WriteExt};

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Mover {
    pub velocity: Vec2,
}

impl Mover {
    pub fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }

    pub fn save<W: Write + ?Sized>(
        &self,
        transform: &Transform,
        out: &mut W,
    ) -> Result<(), PersistError> {
        out.write_f64_be(f64::from(transform.position.x))?;
        out.write_f64_be(f64::from(transform.position.y))?;
        out.write_f64_be(f64::from(self.velocity.x))?;
        out.write_f64_be(f64::from(self.velocity.y))?;
        Ok(())
    }

    /// Inverse of [`Mover::save`]. Fields are applied as they are read.
    ///
    /// NaN or infinite values are rejected as corrupt.
    pub fn load<R: Read + ?Sized>(
        &mut self,
        transform: &mut Transform,
        input: &mut R,
        _version: &str,
    ) -> Result<(), PersistError> {
        transform.position.x = read_finite(input, "position.x")?;
        transform.position.y = read_finite(input, "position.y")?;
        self.velocity.x = read_finite(input, "velocity.x")?;
        self.velocity.y = read_finite(input, "velocity.y")?;
        Ok(())
    }
}

fn read_finite<R: Read + ?Sized>(input: &mut R, field: &str) -> Result<f32, PersistError> {
    let value = input.read_f64_be()? as f32;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PersistError::Corrupt(format!("{} is {}", field, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::savegame::SAVE_VERSION;
    use std::io::Cursor;

    #[test]
    fn save_writes_four_doubles() {
        let mover = Mover::new(Vec2::new(1.0, -2.0));
        let mut buf = Vec::new();
        mover.save(&Transform::from_xy(3.5, 4.25), &mut buf).unwrap();
        assert_eq!(buf.len(), 32);
        assert_eq!(&buf[..8], &3.5f64.to_be_bytes());
    }

    #[test]
    fn load_restores_position_and_velocity() {
        let mover = Mover::new(Vec2::new(-30.5, 12.0));
        let mut buf = Vec::new();
        mover.save(&Transform::from_xy(101.25, 7.0), &mut buf).unwrap();

        let mut loaded = Mover::default();
        let mut transform = Transform::default();
        loaded
            .load(&mut transform, &mut Cursor::new(buf), SAVE_VERSION)
            .unwrap();
        assert_eq!(loaded, mover);
        assert_eq!(transform.position, Vec2::new(101.25, 7.0));
    }

    #[test]
    fn load_rejects_non_finite_values() {
        let mut buf = Vec::new();
        buf.write_f64_be(f64::NAN).unwrap();
        buf.write_f64_be(10.0).unwrap();
        buf.write_f64_be(0.0).unwrap();
        buf.write_f64_be(0.0).unwrap();
        let result = Mover::default().load(
            &mut Transform::default(),
            &mut Cursor::new(buf),
            SAVE_VERSION,
        );
        assert!(matches!(result, Err(PersistError::Corrupt(_))));

        // Finite in f64 but too large for f32.
        let mut buf = Vec::new();
        for value in [1.0, 2.0, 1e300, 0.0] {
            buf.write_f64_be(value).unwrap();
        }
        let result = Mover::default().load(
            &mut Transform::default(),
            &mut Cursor::new(buf),
            SAVE_VERSION,
        );
        assert!(matches!(result, Err(PersistError::Corrupt(_))));
    }
}
