//! Gimbal runtime library.
//!
//! This module exposes the runtime's ECS components, resources, systems, and
//! events together with the fixed-timestep game loop, for use by the `gimbal`
//! binary and in integration tests.

pub mod components;
pub mod events;
pub mod game;
pub mod gameloop;
pub mod render;
pub mod resources;
pub mod savegame;
pub mod systems;
