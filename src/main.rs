use std::collections::HashMap;
use std::env;
use std::io;
use std::time::Instant;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use log::{error, info};

use endless_space_shooter::clock::{FixedTicker, RealTimeTicker};
use endless_space_shooter::config::GameConfig;
use endless_space_shooter::constants::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use endless_space_shooter::game::Game;
use endless_space_shooter::input::{SimulatedInput, TerminalEvents};
use endless_space_shooter::rendering::{OutputTarget, ScreenBuffer, TerminalRenderer};
use endless_space_shooter::types::Playfield;

fn main() -> io::Result<()> {
    let process_start = Instant::now();
    let args: Vec<String> = env::args().collect();
    let config = GameConfig::from_args(&args);

    simple_logging::log_to_file(&config.log_file, log::LevelFilter::Info)?;
    info!("Starting Endless Space Shooter.");

    let playfield = Playfield::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
    let mut rng = rand::thread_rng();

    if config.debug_mode {
        info!("Debug mode enabled at {}x{}.", config.debug_width, config.debug_height);
        let target = OutputTarget::ScreenBuffer(ScreenBuffer::new(config.debug_width, config.debug_height));
        let renderer = TerminalRenderer::new(config.debug_width, config.debug_height, target, playfield);
        let mut game = Game::new(
            config.debug_width,
            config.debug_height,
            renderer,
            Box::new(scripted_session(config.debug_width, config.debug_height)),
            Box::new(FixedTicker::at_target_rate()),
            config.max_frames,
            false,
        );
        let summary = game.run(&mut rng)?;
        info!("Debug session finished: {:?}", summary);
        return Ok(());
    }

    info!("Attempting to enable raw mode.");
    enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide, EnableMouseCapture, SetTitle("Endless Space Shooter"))
        .map_err(|e| { error!("Failed to prepare terminal: {}", e); e })?;
    // Terminals without the kitty protocol never report key releases; they fall back to the hold window.
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
    info!("Raw mode enabled (key release events: {}).", keyboard_enhanced);

    let result = run_interactive(&config, playfield, process_start, keyboard_enhanced, &mut rng);

    if keyboard_enhanced {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let restored = execute!(stdout, DisableMouseCapture, Show, LeaveAlternateScreen)
        .and_then(|_| disable_raw_mode())
        .map_err(|e| { error!("Failed to restore terminal: {}", e); e });

    let summary = result?;
    restored?;
    println!("Final Score: {}", summary.score);
    info!("Exiting application.");
    Ok(())
}

fn run_interactive(
    config: &GameConfig,
    playfield: Playfield,
    process_start: Instant,
    reports_releases: bool,
    rng: &mut impl rand::Rng,
) -> io::Result<endless_space_shooter::game::RunSummary> {
    let (terminal_width, terminal_height) = size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })?;
    info!("Terminal size: {}x{}", terminal_width, terminal_height);
    let renderer = TerminalRenderer::new(terminal_width, terminal_height, OutputTarget::Stdout(io::stdout()), playfield);
    let mut game = Game::new(
        terminal_width,
        terminal_height,
        renderer,
        Box::new(TerminalEvents),
        Box::new(RealTimeTicker::new(process_start)),
        config.max_frames,
        reports_releases,
    );
    game.run(rng)
}

/// A short scripted flight: aim right, hold `d`, fire a few times, then quit.
fn scripted_session(width: u16, height: u16) -> SimulatedInput {
    let mut sim_events: HashMap<u64, Vec<Event>> = HashMap::new();
    let aim = Event::Mouse(MouseEvent {
        kind: MouseEventKind::Moved,
        column: width.saturating_sub(1),
        row: height / 2,
        modifiers: KeyModifiers::NONE,
    });
    let press = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
    sim_events.insert(1, vec![aim]);
    for frame in (2..60).step_by(4) {
        sim_events.insert(frame, vec![press(KeyCode::Char('d'))]);
    }
    for frame in [10, 30, 50] {
        sim_events.entry(frame).or_default().push(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: width.saturating_sub(1),
            row: height / 2,
            modifiers: KeyModifiers::NONE,
        }));
    }
    sim_events.insert(120, vec![press(KeyCode::Char('q'))]); // Quit after 120 frames
    SimulatedInput::new(sim_events)
}
