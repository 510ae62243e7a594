//! Fixed-timestep game loop.
//!
//! A [`GameLoop`] owns a [`GameWorld`] and a [`RenderTarget`] and drives them
//! from a dedicated thread:
//!
//! 1. Measure the real time since the previous iteration and turn it into
//!    whole ticks with a [`TickClock`].
//! 2. For every tick: sample the keyboard for one-shot commands
//!    (screenshot, save, load) and run them, then tick the world.
//! 3. Render once.
//! 4. Once per second, send a [`FrameReport`] to the [`MetricsSink`].
//!
//! The simulation therefore advances at the configured tick rate no matter
//! how fast or slow frames are drawn. The world is only ever touched from
//! the loop thread; the outside talks to it through the shared
//! [`KeyStates`] and gets it back when the loop is stopped.

use std::fmt;
use std::io::{self, Read, Write};
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{debug, error, info};

use crate::events::framereport::FrameReport;
use crate::events::loopcommand::LoopCommand;
use crate::render::{RenderItem, RenderTarget};
use crate::resources::commandlatch::CommandLatches;
use crate::resources::framestats::FrameStats;
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::{KeyStates, Keyboard};
use crate::resources::tickclock::TickClock;
use crate::savegame::{PersistError, QuickSave};

/// A world the loop can simulate, draw and persist.
pub trait GameWorld {
    /// Advance world-level state (time) by one tick.
    fn tick(&mut self);
    /// Tick every entity once.
    fn call_tick(&mut self);
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Everything to draw this frame, in draw order.
    fn entities(&mut self) -> Vec<RenderItem>;
    fn save(&mut self, out: &mut dyn Write) -> Result<(), PersistError>;
    /// Replace the world's entities with those read from `input`.
    fn load(&mut self, input: &mut dyn Read, version: &str) -> Result<(), PersistError>;
}

/// Receiver of the once-per-second throughput report.
pub trait MetricsSink {
    fn report(&mut self, report: FrameReport);
}

impl MetricsSink for Sender<FrameReport> {
    fn report(&mut self, report: FrameReport) {
        if self.send(report).is_err() {
            debug!("Metrics receiver dropped, discarding {}", report);
        }
    }
}

/// Writes each report to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricsSink for LogSink {
    fn report(&mut self, report: FrameReport) {
        info!("{}", report);
    }
}

#[derive(Debug)]
pub enum LoopError {
    /// `start` was called on a running loop.
    AlreadyRunning,
    /// The loop thread could not be created. The loop is unusable afterwards.
    Spawn(io::Error),
    /// The loop thread panicked. The world was lost with it.
    Panicked,
    /// A previous spawn failure or panic left nothing to run.
    Poisoned,
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::AlreadyRunning => write!(f, "game loop is already running"),
            LoopError::Spawn(e) => write!(f, "failed to spawn game loop thread: {e}"),
            LoopError::Panicked => write!(f, "game loop thread panicked"),
            LoopError::Poisoned => write!(f, "game loop is unusable after an earlier failure"),
        }
    }
}

impl std::error::Error for LoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoopError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub ticks_per_second: u32,
    pub max_catch_up_ticks: u32,
    /// 0 renders as fast as possible.
    pub target_fps: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            max_catch_up_ticks: 10,
            target_fps: 0,
        }
    }
}

impl LoopSettings {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            ticks_per_second: config.ticks_per_second,
            max_catch_up_ticks: config.max_catch_up_ticks,
            target_fps: config.target_fps,
        }
    }

    fn frame_budget(&self) -> Option<Duration> {
        (self.target_fps > 0).then(|| Duration::from_secs_f64(1.0 / self.target_fps as f64))
    }
}

/// Everything the loop thread owns while running.
struct LoopCore<W, R> {
    world: W,
    renderer: R,
    input: Keyboard,
    metrics: Box<dyn MetricsSink + Send>,
    quicksave: QuickSave,
    settings: LoopSettings,
    latches: CommandLatches,
}

impl<W: GameWorld, R: RenderTarget> LoopCore<W, R> {
    fn run(&mut self, running: &AtomicBool) {
        let mut clock = TickClock::new(self.settings.ticks_per_second, self.settings.max_catch_up_ticks);
        let frame_budget = self.settings.frame_budget();
        let mut stats = FrameStats::new(Instant::now());
        let mut last = Instant::now();

        info!(
            "Game loop started: {} ticks/s, world {}x{}",
            clock.ticks_per_second(),
            self.world.width(),
            self.world.height()
        );

        while running.load(Ordering::Acquire) {
            let frame_start = Instant::now();
            let ticks = clock.advance(frame_start.duration_since(last));
            last = frame_start;

            for _ in 0..ticks {
                self.step();
                stats.record_tick();
            }

            self.render();
            if let Some(report) = stats.record_frame(Instant::now()) {
                self.metrics.report(report);
            }

            if let Some(budget) = frame_budget {
                let spent = frame_start.elapsed();
                if spent < budget {
                    thread::sleep(budget - spent);
                }
            }
        }

        info!(
            "Game loop stopped ({} ticks dropped by catch-up cap)",
            clock.dropped_ticks()
        );
    }

    /// One logical tick: commands first, then the world.
    fn step(&mut self) {
        for command in self.latches.poll(&self.input) {
            self.execute(command);
        }
        self.world.tick();
        self.world.call_tick();
    }

    fn render(&mut self) {
        let items = self.world.entities();
        self.renderer.render(&items);
    }

    fn execute(&mut self, command: LoopCommand) {
        debug!("Executing {:?}", command);
        match command {
            LoopCommand::Screenshot => {
                if let Err(e) = self.renderer.screenshot() {
                    error!("Screenshot failed: {}", e);
                }
            }
            LoopCommand::Save => {
                if let Err(e) = self.quicksave.save(&mut self.world) {
                    error!("Save to {} failed: {}", self.quicksave.path().display(), e);
                }
            }
            LoopCommand::Load => {
                if let Err(e) = self.quicksave.load(&mut self.world) {
                    error!("Load from {} failed: {}", self.quicksave.path().display(), e);
                }
            }
        }
    }
}

enum LoopState<W, R> {
    Stopped(Box<LoopCore<W, R>>),
    Running {
        running: Arc<AtomicBool>,
        handle: JoinHandle<Box<LoopCore<W, R>>>,
    },
    Poisoned,
}

/// Owns a world and runs it on its own thread between [`start`](Self::start)
/// and [`stop`](Self::stop).
pub struct GameLoop<W, R>
where
    W: GameWorld + Send + 'static,
    R: RenderTarget + Send + 'static,
{
    state: LoopState<W, R>,
    keys: Arc<KeyStates>,
}

impl<W, R> GameLoop<W, R>
where
    W: GameWorld + Send + 'static,
    R: RenderTarget + Send + 'static,
{
    pub fn new(
        world: W,
        renderer: R,
        input: Keyboard,
        metrics: Box<dyn MetricsSink + Send>,
        quicksave: QuickSave,
        settings: LoopSettings,
    ) -> Self {
        let keys = input.states();
        Self {
            state: LoopState::Stopped(Box::new(LoopCore {
                world,
                renderer,
                input,
                metrics,
                quicksave,
                settings,
                latches: CommandLatches::new(),
            })),
            keys,
        }
    }

    /// Key states for the input thread to write into.
    pub fn key_states(&self) -> Arc<KeyStates> {
        Arc::clone(&self.keys)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Spawn the loop thread.
    pub fn start(&mut self) -> Result<(), LoopError> {
        let mut core = match mem::replace(&mut self.state, LoopState::Poisoned) {
            LoopState::Stopped(core) => core,
            running @ LoopState::Running { .. } => {
                self.state = running;
                return Err(LoopError::AlreadyRunning);
            }
            LoopState::Poisoned => return Err(LoopError::Poisoned),
        };

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("gimbal-loop".into())
            .spawn(move || {
                core.run(&flag);
                core
            })
            .map_err(LoopError::Spawn)?;

        self.state = LoopState::Running { running, handle };
        Ok(())
    }

    /// Signal the loop to finish its current iteration and wait for it.
    ///
    /// Stopping a loop that is not running does nothing.
    pub fn stop(&mut self) -> Result<(), LoopError> {
        match mem::replace(&mut self.state, LoopState::Poisoned) {
            LoopState::Running { running, handle } => {
                running.store(false, Ordering::Release);
                match handle.join() {
                    Ok(core) => {
                        self.state = LoopState::Stopped(core);
                        Ok(())
                    }
                    Err(_) => {
                        error!("Game loop thread panicked");
                        Err(LoopError::Panicked)
                    }
                }
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    /// The world, while the loop is stopped.
    pub fn world(&self) -> Option<&W> {
        match &self.state {
            LoopState::Stopped(core) => Some(&core.world),
            _ => None,
        }
    }

    pub fn world_mut(&mut self) -> Option<&mut W> {
        match &mut self.state {
            LoopState::Stopped(core) => Some(&mut core.world),
            _ => None,
        }
    }

    /// The renderer, while the loop is stopped.
    pub fn renderer(&self) -> Option<&R> {
        match &self.state {
            LoopState::Stopped(core) => Some(&core.renderer),
            _ => None,
        }
    }
}

impl<W, R> Drop for GameLoop<W, R>
where
    W: GameWorld + Send + 'static,
    R: RenderTarget + Send + 'static,
{
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(e) = self.stop() {
                error!("Stopping game loop on drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::input::{Control, KeyBindings};
    use crate::savegame::{ReadExt, WriteExt};
    use std::path::PathBuf;

    #[derive(Default)]
    struct CountingWorld {
        ticks: i32,
        entity_ticks: i32,
        saves: u32,
        loads: u32,
    }

    impl GameWorld for CountingWorld {
        fn tick(&mut self) {
            self.ticks += 1;
        }
        fn call_tick(&mut self) {
            self.entity_ticks += 1;
        }
        fn width(&self) -> u32 {
            100
        }
        fn height(&self) -> u32 {
            100
        }
        fn entities(&mut self) -> Vec<RenderItem> {
            Vec::new()
        }
        fn save(&mut self, out: &mut dyn Write) -> Result<(), PersistError> {
            self.saves += 1;
            out.write_i32_be(self.ticks)?;
            Ok(())
        }
        fn load(&mut self, input: &mut dyn Read, _version: &str) -> Result<(), PersistError> {
            self.loads += 1;
            self.ticks = input.read_i32_be()?;
            Ok(())
        }
    }

    #[derive(Default)]
    struct NullRenderer {
        frames: u32,
        shots: u32,
    }

    impl RenderTarget for NullRenderer {
        fn render(&mut self, _items: &[RenderItem]) {
            self.frames += 1;
        }
        fn screenshot(&mut self) -> Result<PathBuf, String> {
            self.shots += 1;
            Err("no display".into())
        }
    }

    fn make_core(dir: &std::path::Path) -> (LoopCore<CountingWorld, NullRenderer>, Arc<KeyStates>) {
        let states = Arc::new(KeyStates::new());
        let core = LoopCore {
            world: CountingWorld::default(),
            renderer: NullRenderer::default(),
            input: Keyboard::new(states.clone(), KeyBindings::default()),
            metrics: Box::new(LogSink),
            quicksave: QuickSave::new(dir, "test"),
            settings: LoopSettings::default(),
            latches: CommandLatches::new(),
        };
        (core, states)
    }

    fn press(states: &KeyStates, control: Control) {
        for &code in KeyBindings::default().codes(control) {
            states.press(u32::from(code)).unwrap();
        }
    }

    fn release(states: &KeyStates, control: Control) {
        for &code in KeyBindings::default().codes(control) {
            states.release(u32::from(code)).unwrap();
        }
    }

    #[test]
    fn step_ticks_world_and_entities() {
        let dir = tempfile::tempdir().unwrap();
        let (mut core, _) = make_core(dir.path());
        core.step();
        core.step();
        assert_eq!(core.world.ticks, 2);
        assert_eq!(core.world.entity_ticks, 2);
    }

    #[test]
    fn held_save_key_saves_once() {
        let dir = tempfile::tempdir().unwrap();
        let (mut core, states) = make_core(dir.path());
        press(&states, Control::Save);
        for _ in 0..5 {
            core.step();
        }
        assert_eq!(core.world.saves, 1);
        assert!(core.quicksave.exists());

        release(&states, Control::Save);
        core.step();
        press(&states, Control::Save);
        core.step();
        assert_eq!(core.world.saves, 2);
    }

    #[test]
    fn load_restores_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut core, states) = make_core(dir.path());
        core.step();
        core.step();
        press(&states, Control::Save);
        core.step(); // saves ticks == 2, then ticks to 3
        release(&states, Control::Save);
        core.step();
        assert_eq!(core.world.ticks, 4);

        press(&states, Control::Load);
        core.step(); // loads 2, then ticks to 3
        assert_eq!(core.world.loads, 1);
        assert_eq!(core.world.ticks, 3);
    }

    #[test]
    fn failed_commands_do_not_stop_ticking() {
        let dir = tempfile::tempdir().unwrap();
        let (mut core, states) = make_core(dir.path());
        press(&states, Control::Load);
        press(&states, Control::Screenshot);
        core.step();
        assert_eq!(core.world.loads, 0);
        assert_eq!(core.renderer.shots, 1);
        assert_eq!(core.world.ticks, 1);
    }

    #[test]
    fn target_fps_sets_frame_budget() {
        let capped = LoopSettings {
            target_fps: 50,
            ..LoopSettings::default()
        };
        assert_eq!(capped.frame_budget(), Some(Duration::from_millis(20)));
        assert_eq!(LoopSettings::default().frame_budget(), None);
    }

    #[test]
    fn channel_sink_forwards_reports() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut sink: Box<dyn MetricsSink + Send> = Box::new(tx);
        let report = FrameReport {
            frames: 1,
            ticks: 2,
            average_frames: 1,
            seconds: 1,
        };
        sink.report(report);
        assert_eq!(rx.try_recv().unwrap(), report);
        drop(rx);
        sink.report(report);
    }
}
