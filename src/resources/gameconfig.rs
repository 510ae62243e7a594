//! Game configuration.
//!
//! Manages game settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 800
//! height = 500
//! title = Gimbal
//!
//! [loop]
//! ticks_per_second = 60
//! max_catch_up_ticks = 10
//! target_fps = 120
//!
//! [animation]
//! ticks_per_frame = 5
//!
//! [savegame]
//! dir = ./saves
//! slot = quicksave
//!
//! [screenshot]
//! dir = ./screenshots
//!
//! [keybindings]
//! up = 87, 38
//! save = 116
//! ```
//!
//! Zero tick rates or animation cadences are configuration errors; they are
//! clamped to 1 with a warning rather than reaching the simulation.

use std::num::NonZeroU32;
use std::path::PathBuf;

use configparser::ini::Ini;
use log::{info, warn};

use crate::components::mob::DEFAULT_TICKS_PER_FRAME;
use crate::resources::input::{Control, KEY_COUNT, KeyBindings};

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 800;
const DEFAULT_WINDOW_HEIGHT: u32 = DEFAULT_WINDOW_WIDTH * 10 / 16;
const DEFAULT_TITLE: &str = "Gimbal";
const DEFAULT_TICKS_PER_SECOND: u32 = 60;
const DEFAULT_MAX_CATCH_UP_TICKS: u32 = 10;
const DEFAULT_TARGET_FPS: u32 = 120;
const DEFAULT_SAVE_DIR: &str = "./saves";
const DEFAULT_SAVE_SLOT: &str = "quicksave";
const DEFAULT_SCREENSHOT_DIR: &str = "./screenshots";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// World and render width in pixels.
    pub window_width: u32,
    /// World and render height in pixels.
    pub window_height: u32,
    pub title: String,
    /// Logical simulation rate.
    pub ticks_per_second: u32,
    /// Most ticks run in one loop iteration before backlog is dropped.
    pub max_catch_up_ticks: u32,
    /// Render cap; 0 renders as fast as possible.
    pub target_fps: u32,
    /// Ticks each animation frame is shown for.
    pub ticks_per_frame: NonZeroU32,
    pub save_dir: PathBuf,
    pub save_slot: String,
    pub screenshot_dir: PathBuf,
    pub keybindings: KeyBindings,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            title: DEFAULT_TITLE.to_string(),
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_catch_up_ticks: DEFAULT_MAX_CATCH_UP_TICKS,
            target_fps: DEFAULT_TARGET_FPS,
            ticks_per_frame: DEFAULT_TICKS_PER_FRAME,
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            save_slot: DEFAULT_SAVE_SLOT.to_string(),
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            keybindings: KeyBindings::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded config: {}x{} \"{}\", tps={}, catch-up={}, fps={}, ticks/frame={}",
            self.window_width,
            self.window_height,
            self.title,
            self.ticks_per_second,
            self.max_catch_up_ticks,
            self.target_fps,
            self.ticks_per_frame
        );

        Ok(())
    }

    /// Load configuration from INI text instead of a file.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(title) = config.get("window", "title") {
            self.title = title;
        }

        // [loop] section
        if let Some(tps) = config.getuint("loop", "ticks_per_second").ok().flatten() {
            self.ticks_per_second = at_least_one("loop.ticks_per_second", tps);
        }
        if let Some(max) = config.getuint("loop", "max_catch_up_ticks").ok().flatten() {
            self.max_catch_up_ticks = at_least_one("loop.max_catch_up_ticks", max);
        }
        if let Some(fps) = config.getuint("loop", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }

        // [animation] section
        if let Some(ticks) = config.getint("animation", "ticks_per_frame").ok().flatten() {
            let ticks = if ticks < 1 {
                warn!("animation.ticks_per_frame = {} is not positive, using 1", ticks);
                1
            } else {
                ticks.min(i64::from(i32::MAX)) as u32
            };
            self.ticks_per_frame = NonZeroU32::new(ticks).unwrap_or(NonZeroU32::MIN);
        }

        // [savegame] / [screenshot] sections
        if let Some(dir) = config.get("savegame", "dir") {
            self.save_dir = PathBuf::from(dir);
        }
        if let Some(slot) = config.get("savegame", "slot") {
            self.save_slot = slot;
        }
        if let Some(dir) = config.get("screenshot", "dir") {
            self.screenshot_dir = PathBuf::from(dir);
        }

        // [keybindings] section
        for control in Control::ALL {
            if let Some(value) = config.get("keybindings", control.name()) {
                let codes = parse_key_codes(control, &value);
                if codes.is_empty() {
                    warn!(
                        "keybindings.{} has no valid key codes, keeping defaults",
                        control.name()
                    );
                } else {
                    self.keybindings.bind(control, &codes);
                }
            }
        }
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "title", Some(self.title.clone()));

        // [loop] section
        config.set("loop", "ticks_per_second", Some(self.ticks_per_second.to_string()));
        config.set("loop", "max_catch_up_ticks", Some(self.max_catch_up_ticks.to_string()));
        config.set("loop", "target_fps", Some(self.target_fps.to_string()));

        // [animation] section
        config.set("animation", "ticks_per_frame", Some(self.ticks_per_frame.to_string()));

        // [savegame] / [screenshot] sections
        config.set("savegame", "dir", Some(self.save_dir.display().to_string()));
        config.set("savegame", "slot", Some(self.save_slot.clone()));
        config.set("screenshot", "dir", Some(self.screenshot_dir.display().to_string()));

        // [keybindings] section
        for control in Control::ALL {
            let codes: Vec<String> = self
                .keybindings
                .codes(control)
                .iter()
                .map(|code| code.to_string())
                .collect();
            config.set("keybindings", control.name(), Some(codes.join(", ")));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the world size.
    pub fn world_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

fn at_least_one(key: &str, value: u64) -> u32 {
    if value == 0 {
        warn!("{} = 0 is not allowed, using 1", key);
        1
    } else {
        value.min(u64::from(u32::MAX)) as u32
    }
}

/// Parse a comma separated list of key codes, skipping invalid entries.
fn parse_key_codes(control: Control, value: &str) -> Vec<u8> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<u32>() {
            Ok(code) if (code as usize) < KEY_COUNT => Some(code as u8),
            _ => {
                warn!("keybindings.{}: ignoring key code {:?}", control.name(), s);
                None
            }
        })
        .collect()
}
