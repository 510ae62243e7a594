//! Messages produced by the game loop.
//!
//! Submodules:
//! - [`framereport`] – once-per-second throughput report
//! - [`loopcommand`] – one-shot commands triggered from held keys
pub mod framereport;
pub mod loopcommand;
