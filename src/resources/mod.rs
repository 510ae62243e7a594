//! Long-lived state used by the level and the game loop.
//!
//! Overview
//! - `bestiary` – mob templates keyed by kind
//! - `commandlatch` – edge detection for screenshot, save and load keys
//! - `framestats` – per-second frame and tick counters
//! - `gameconfig` – settings loaded from `config.ini`
//! - `input` – lock-free key states, controls and key bindings
//! - `tickclock` – fixed-timestep accumulator with a catch-up cap
//! - `worldbounds` – playable area in pixels
//! - `worldtime` – simulation time and delta
pub mod bestiary;
pub mod commandlatch;
pub mod framestats;
pub mod gameconfig;
pub mod input;
pub mod tickclock;
pub mod worldbounds;
pub mod worldtime;
