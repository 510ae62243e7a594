//! Gimbal main entry point.
//!
//! Runs the sandbox level headless for a fixed number of seconds:
//!
//! 1. Load `config.ini` (defaults when missing)
//! 2. Populate a level with random mobs
//! 3. Start the game loop thread, printing one throughput line per second
//! 4. Optionally drive screenshot/save/load keys from a scripted input thread
//! 5. Stop the loop and report what the world looks like
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --seconds 5 --mobs 50 --demo-input
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{error, info, warn};

use gimbal::events::framereport::FrameReport;
use gimbal::game::Level;
use gimbal::gameloop::{GameLoop, LoopSettings};
use gimbal::render::HeadlessRenderer;
use gimbal::resources::gameconfig::GameConfig;
use gimbal::resources::input::{Control, KeyBindings, KeyStates, Keyboard};
use gimbal::savegame::QuickSave;

/// Gimbal 2D runtime
#[derive(Parser)]
#[command(version, about = "Headless fixed-timestep 2D game runtime")]
struct Cli {
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = "config.ini")]
    config: PathBuf,

    /// How long to run the loop.
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Mobs to spawn before starting.
    #[arg(long, default_value_t = 10)]
    mobs: usize,

    /// Seed for mob placement. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Print throughput reports as JSON lines.
    #[arg(long)]
    json: bool,

    /// Press screenshot, save and load from a scripted input thread.
    #[arg(long)]
    demo_input: bool,

    /// Write the effective configuration back to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{}, using defaults", e);
    }

    // Early-exit: write config and quit
    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Configuration written to {}", config.config_path.display());
        return;
    }

    info!("Hello, world! This is {}!", config.title);

    let mut level = Level::from_config(&config);
    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
    level.populate(cli.mobs, seed);

    let renderer = HeadlessRenderer::new(
        config.window_width,
        config.window_height,
        &config.screenshot_dir,
    );
    let keyboard = Keyboard::new(Arc::new(KeyStates::new()), config.keybindings.clone());
    let (report_tx, report_rx) = crossbeam_channel::unbounded::<FrameReport>();

    let mut game_loop = GameLoop::new(
        level,
        renderer,
        keyboard,
        Box::new(report_tx),
        QuickSave::new(&config.save_dir, &config.save_slot),
        LoopSettings::from_config(&config),
    );

    let title = config.title.clone();
    let json = cli.json;
    let printer = thread::spawn(move || print_reports(&report_rx, &title, json));

    let (stop_demo, demo_stopped) = crossbeam_channel::bounded::<()>(0);
    let demo = cli.demo_input.then(|| {
        let states = game_loop.key_states();
        let bindings = config.keybindings.clone();
        thread::spawn(move || demo_input(&states, &bindings, &demo_stopped))
    });

    if let Err(e) = game_loop.start() {
        error!("Failed to start game loop: {}", e);
        std::process::exit(1);
    }

    thread::sleep(Duration::from_secs_f64(cli.seconds.max(0.0)));

    drop(stop_demo);
    if let Some(demo) = demo {
        if demo.join().is_err() {
            warn!("Demo input thread panicked");
        }
    }

    if let Err(e) = game_loop.stop() {
        error!("Game loop ended badly: {}", e);
        std::process::exit(1);
    }

    if let Some(level) = game_loop.world_mut() {
        info!(
            "Stopped after {} ticks ({:.2}s simulated) with {} mobs",
            level.time().ticks,
            level.time().elapsed,
            level.mob_count()
        );
    }

    // Dropping the loop drops the report sender and ends the printer.
    drop(game_loop);
    if printer.join().is_err() {
        warn!("Report printer thread panicked");
    }
}

fn print_reports(reports: &Receiver<FrameReport>, title: &str, json: bool) {
    for report in reports.iter() {
        if json {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("Failed to encode report: {}", e),
            }
        } else {
            println!("{title} - {report}");
        }
    }
}

/// Scripted key presses, one control per second, until `stop` disconnects.
fn demo_input(states: &KeyStates, bindings: &KeyBindings, stop: &Receiver<()>) {
    let script = [
        Control::Screenshot,
        Control::Save,
        Control::Screenshot,
        Control::Load,
    ];
    for control in script.iter().cycle() {
        if wait(stop, Duration::from_secs(1)) {
            break;
        }
        let Some(&code) = bindings.codes(*control).first() else {
            continue;
        };
        info!("Demo input: {:?}", control);
        let _ = states.press(u32::from(code));
        let stopped = wait(stop, Duration::from_millis(150));
        let _ = states.release(u32::from(code));
        if stopped {
            break;
        }
    }
}

/// Sleep for `timeout`; true if asked to stop in the meantime.
fn wait(stop: &Receiver<()>, timeout: Duration) -> bool {
    !matches!(stop.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
}
