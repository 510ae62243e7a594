//! Edge detection for one-shot commands.
//!
//! Screenshot, save and load are bound to keys the player holds for many
//! ticks. A command fires on the tick its key goes down and not again until
//! the key has been released. Save and load share one latch: while either is
//! held, neither can fire, so a long press on save cannot be followed by a
//! load in the same press. Save wins if both go down on the same tick.

use arrayvec::ArrayVec;

use crate::events::loopcommand::LoopCommand;
use crate::resources::input::{Control, InputSource};

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLatches {
    screenshot: bool,
    io: bool,
}

impl CommandLatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample `input` once and return the commands that fire this tick.
    pub fn poll<I: InputSource + ?Sized>(&mut self, input: &I) -> ArrayVec<LoopCommand, 2> {
        let mut fired = ArrayVec::new();

        if input.held(Control::Screenshot) {
            if !self.screenshot {
                fired.push(LoopCommand::Screenshot);
                self.screenshot = true;
            }
        } else {
            self.screenshot = false;
        }

        if input.held(Control::Save) {
            if !self.io {
                fired.push(LoopCommand::Save);
                self.io = true;
            }
        } else if input.held(Control::Load) {
            if !self.io {
                fired.push(LoopCommand::Load);
                self.io = true;
            }
        } else {
            self.io = false;
        }

        fired
    }
}
