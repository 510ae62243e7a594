//! Keyboard state shared between the input thread and the game loop.
//!
//! The platform's input callbacks run on their own thread and call
//! [`KeyStates::press`] / [`KeyStates::release`]. The game loop samples
//! [`Keyboard::held`] once per tick. Each key is an independent
//! [`AtomicBool`] with a single writer, so neither side ever blocks the
//! other; a change may be seen one loop iteration late, which is harmless
//! because held keys stay set until released.
//!
//! Game code never looks at raw codes. It asks about a [`Control`], and
//! [`KeyBindings`] map each control to one or more key codes. Defaults use
//! the classic desktop codes (W/A/S/D, F1 screenshot, F5 save, F9 load).
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::error;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

/// Number of trackable key codes. Codes `0..KEY_COUNT` are valid.
pub const KEY_COUNT: usize = 255;

/// Key codes bound to a single control.
pub type KeyCodes = SmallVec<[u8; 4]>;

/// Game actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Up,
    Down,
    Left,
    Right,
    ThrottleUp,
    ThrottleDown,
    AddBaddie,
    Screenshot,
    Save,
    Load,
    DevMode,
    Fullscreen,
}

impl Control {
    pub const ALL: [Control; 12] = [
        Control::Up,
        Control::Down,
        Control::Left,
        Control::Right,
        Control::ThrottleUp,
        Control::ThrottleDown,
        Control::AddBaddie,
        Control::Screenshot,
        Control::Save,
        Control::Load,
        Control::DevMode,
        Control::Fullscreen,
    ];

    /// Lowercase name used in the `[keybindings]` config section.
    pub fn name(self) -> &'static str {
        match self {
            Control::Up => "up",
            Control::Down => "down",
            Control::Left => "left",
            Control::Right => "right",
            Control::ThrottleUp => "throttleup",
            Control::ThrottleDown => "throttledown",
            Control::AddBaddie => "addbaddie",
            Control::Screenshot => "screenshot",
            Control::Save => "save",
            Control::Load => "load",
            Control::DevMode => "devmode",
            Control::Fullscreen => "fullscreen",
        }
    }

    pub fn default_codes(self) -> KeyCodes {
        match self {
            Control::Up => smallvec![87],           // W
            Control::Down => smallvec![83],         // S
            Control::Left => smallvec![65],         // A
            Control::Right => smallvec![68],        // D
            Control::ThrottleUp => smallvec![16],   // Shift
            Control::ThrottleDown => smallvec![17], // Ctrl
            Control::AddBaddie => smallvec![71],    // G
            Control::Screenshot => smallvec![112],  // F1
            Control::Save => smallvec![116],        // F5
            Control::Load => smallvec![120],        // F9
            Control::DevMode => smallvec![114],     // F3
            Control::Fullscreen => smallvec![123],  // F12
        }
    }
}

/// A key code outside `0..KEY_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidKeyCode(pub u32);

impl fmt::Display for InvalidKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid key code {} (max {})", self.0, KEY_COUNT - 1)
    }
}

impl std::error::Error for InvalidKeyCode {}

/// Lock-free held/released flag per key code.
#[derive(Debug)]
pub struct KeyStates {
    keys: [AtomicBool; KEY_COUNT],
}

impl Default for KeyStates {
    fn default() -> Self {
        Self {
            keys: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }
}

impl KeyStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `code` as held. Out-of-range codes are logged and dropped.
    pub fn press(&self, code: u32) -> Result<(), InvalidKeyCode> {
        self.set(code, true)
    }

    /// Mark `code` as released. Out-of-range codes are logged and dropped.
    pub fn release(&self, code: u32) -> Result<(), InvalidKeyCode> {
        self.set(code, false)
    }

    pub fn is_held(&self, code: u8) -> bool {
        self.keys
            .get(code as usize)
            .is_some_and(|key| key.load(Ordering::Relaxed))
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn release_all(&self) {
        for key in &self.keys {
            key.store(false, Ordering::Relaxed);
        }
    }

    fn set(&self, code: u32, held: bool) -> Result<(), InvalidKeyCode> {
        match self.keys.get(code as usize) {
            Some(key) => {
                key.store(held, Ordering::Relaxed);
                Ok(())
            }
            None => {
                error!(
                    "Invalid key {}: code {}",
                    if held { "press" } else { "release" },
                    code
                );
                Err(InvalidKeyCode(code))
            }
        }
    }
}

/// Control to key-code mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    codes: FxHashMap<Control, KeyCodes>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            codes: Control::ALL
                .iter()
                .map(|&control| (control, control.default_codes()))
                .collect(),
        }
    }
}

impl KeyBindings {
    pub fn codes(&self, control: Control) -> &[u8] {
        self.codes.get(&control).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Replace the codes of `control`. Duplicates are removed, order kept.
    pub fn bind(&mut self, control: Control, codes: &[u8]) {
        let mut unique = KeyCodes::new();
        for &code in codes {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }
        self.codes.insert(control, unique);
    }
}

/// Something that can tell whether a control is currently held.
pub trait InputSource {
    fn held(&self, control: Control) -> bool;
}

/// Key states plus bindings: the loop-side view of the keyboard.
#[derive(Debug, Clone)]
pub struct Keyboard {
    states: Arc<KeyStates>,
    bindings: KeyBindings,
}

impl Keyboard {
    pub fn new(states: Arc<KeyStates>, bindings: KeyBindings) -> Self {
        Self { states, bindings }
    }

    /// Handle for the input thread to write to.
    pub fn states(&self) -> Arc<KeyStates> {
        Arc::clone(&self.states)
    }
}

impl InputSource for Keyboard {
    /// Held if any bound key is held.
    fn held(&self, control: Control) -> bool {
        self.bindings
            .codes(control)
            .iter()
            .any(|&code| self.states.is_held(code))
    }
}
