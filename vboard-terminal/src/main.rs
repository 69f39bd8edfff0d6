/// VBoard Terminal - gesture board in the terminal
///
/// Drives the board from a keyboard-controlled hand or a landmark recording.
/// Controls (keyboard hand):
///   - Arrows / WASD: Move the index fingertip
///   - 1 draw, 2 select, 3 shape edit, 0 place (fist), 5 clear (open hand)
///   - [ / ]: Pinch narrower / wider, I/J/K/L: Tilt the wrist
///   - H: Hide or show the hand, Q/ESC: Quit
use clap::Parser;
use std::path::PathBuf;
use vboard_core::{BoardConfig, InteractionMachine};
use vboard_terminal::{
    apply_shape_arg, replay_headless, AppError, InputSource, KeyboardHand, Recording, TerminalApp,
};

#[derive(Parser, Debug)]
#[command(name = "vboard-terminal", version, about = "Gesture-driven wireframe board in the terminal")]
struct Args {
    /// Landmark recording to play back instead of the keyboard hand
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// JSON board configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Play the recording without a terminal and print a summary
    #[arg(long, requires = "replay")]
    headless: bool,

    /// Save every frame fed to the board as a recording
    #[arg(long)]
    record: Option<PathBuf>,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Initial shape: cube, sphere, pyramid or cylinder
    #[arg(long)]
    shape: Option<String>,
}

fn main() -> Result<(), AppError> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    let machine = InteractionMachine::new(config);
    let mut state = machine.initial_state();

    if let Some(name) = &args.shape {
        apply_shape_arg(&mut state, name);
    }

    let recording = args.replay.as_ref().map(Recording::load).transpose()?;

    if args.headless {
        if let Some(recording) = &recording {
            let summary = replay_headless(&machine, &mut state, recording);
            println!("{summary}");
        }
        return Ok(());
    }

    let source = match recording {
        Some(recording) => {
            println!("Loaded {} frames", recording.len());
            InputSource::replay(recording)
        }
        None => {
            let config = machine.config();
            InputSource::Keyboard(KeyboardHand::new(config.frame_width, config.frame_height))
        }
    };

    println!("VBoard Terminal - starting (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(machine, state, source)?.with_fps(args.fps);
    if let Some(path) = args.record {
        app = app.record_to(path);
    }
    app.run()?;

    println!("Thank you for using VBoard!");
    Ok(())
}
