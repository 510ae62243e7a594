//! Level systems.
//!
//! Submodules overview
//! - [`animation`] – step mob animation clocks
//! - [`bounds`] – pull mobs back inside the world
//! - [`hierarchy`] – spawn parts and resolve their global placement
//! - [`movement`] – integrate positions from velocities and time
//! - [`time`] – advance simulation time by one tick

pub mod animation;
pub mod bounds;
pub mod hierarchy;
pub mod movement;
pub mod time;
