//! One-shot commands the game loop dispatches between ticks.
//!
//! Produced by [`CommandLatches`](crate::resources::commandlatch::CommandLatches)
//! from held controls and executed by the loop before the world ticks.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopCommand {
    Screenshot,
    Save,
    Load,
}
