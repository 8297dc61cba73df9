use std::collections::HashMap;
use std::io::Write;

use endless_space_shooter::clock::{FixedTicker, FrameTicker, FrameTiming};
use endless_space_shooter::constants::*;
use endless_space_shooter::entities::{Enemy, PowerUp};
use endless_space_shooter::game::*;
use endless_space_shooter::input::{FrameInput, HeldDirections, SimulatedInput};
use endless_space_shooter::rendering::{OutputTarget, Renderer, ScreenBuffer, TerminalRenderer};
use endless_space_shooter::score::Score;
use endless_space_shooter::types::{Playfield, Vector2D};

use approx::assert_abs_diff_eq;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn playfield() -> Playfield {
    Playfield::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn fire_at(pointer: Vector2D) -> FrameInput {
    FrameInput {
        fire_presses: 1,
        ..FrameInput::idle(pointer)
    }
}

/// Records every draw call, in order.
#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<String>,
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, _now: f64) {
        self.calls.clear();
    }
    fn draw_player(&mut self, _position: Vector2D, _facing: f64, powered_up: bool) {
        self.calls.push(format!("player powered={}", powered_up));
    }
    fn draw_bullet(&mut self, _position: Vector2D) {
        self.calls.push("bullet".to_string());
    }
    fn draw_enemy(&mut self, _position: Vector2D, _facing: f64) {
        self.calls.push("enemy".to_string());
    }
    fn draw_powerup(&mut self, _position: Vector2D) {
        self.calls.push("powerup".to_string());
    }
    fn draw_text(&mut self, content: &str, _position: Vector2D) {
        self.calls.push(content.to_string());
    }
    fn present(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ── Score model ───────────────────────────────────────────────────────────────

#[test]
fn displayed_score_adds_time_and_kills() {
    let mut score = Score::new();
    assert_eq!(score.total(0.0), 0);
    assert_eq!(score.total(1.26), 12);
    score.add_kill();
    score.add_kill();
    assert_eq!(score.kill_score, 200);
    assert_eq!(score.total(3.05), 230);
    assert_eq!(score.total(-1.0), 200);
}

// ── Frame sequencing ──────────────────────────────────────────────────────────

#[test]
fn fresh_state_is_empty_and_playing() {
    let state = GameState::new(playfield());
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.player.position, Vector2D::new(400.0, 300.0));
    assert!(state.enemies.is_empty() && state.bullets.is_empty() && state.powerup.is_none());
    assert_eq!(state.total_score(), 0);
}

#[test]
fn fire_press_is_edge_triggered_and_movement_level_triggered() {
    let mut state = GameState::new(playfield());
    let mut ticker = FixedTicker::at_target_rate();
    let mut rng = seeded_rng();
    let pointer = Vector2D::new(400.0, 0.0);

    let mut input = fire_at(pointer);
    input.held = HeldDirections { left: true, ..HeldDirections::NONE };
    state.step(&input, ticker.tick(), &mut rng);
    assert_eq!(state.bullets.len(), 1);
    assert_eq!(state.player.position.x, 395.0);

    input.fire_presses = 0;
    for _ in 0..20 {
        state.step(&input, ticker.tick(), &mut rng);
    }
    assert_eq!(state.bullets.len(), 1);
    assert_eq!(state.player.position.x, 295.0);
}

#[test]
fn bullets_leaving_playfield_are_dropped() {
    let mut state = GameState::new(playfield());
    let mut ticker = FixedTicker::at_target_rate();
    let mut rng = seeded_rng();
    let idle = FrameInput::idle(Vector2D::new(800.0, 300.0));

    // Spawned at x=400 and moved to 410 on the firing tick.
    state.step(&fire_at(Vector2D::new(800.0, 300.0)), ticker.tick(), &mut rng);
    for _ in 0..39 {
        state.step(&idle, ticker.tick(), &mut rng);
    }
    assert_eq!(state.bullets.len(), 1);
    assert_abs_diff_eq!(state.bullets[0].position.x, 800.0, epsilon = 1e-9);
    state.step(&idle, ticker.tick(), &mut rng);
    assert!(state.bullets.is_empty());
}

#[test]
fn first_enemy_arrives_after_initial_interval() {
    let mut state = GameState::new(playfield());
    let mut ticker = FixedTicker::new(0.25);
    let mut rng = seeded_rng();
    let idle = FrameInput::idle(Vector2D::new(400.0, 0.0));
    for _ in 0..6 {
        state.step(&idle, ticker.tick(), &mut rng);
    }
    assert!(state.enemies.is_empty());
    state.step(&idle, ticker.tick(), &mut rng);
    assert_eq!(state.enemies.len(), 1);
}

#[test]
fn player_always_stays_in_bounds() {
    let mut state = GameState::new(playfield());
    let mut ticker = FixedTicker::at_target_rate();
    let mut rng = seeded_rng();
    state.player.apply_powerup(0.0);
    let patterns = [
        HeldDirections { up: true, left: true, ..HeldDirections::NONE },
        HeldDirections { down: true, ..HeldDirections::NONE },
        HeldDirections { right: true, up: true, ..HeldDirections::NONE },
    ];
    for (i, held) in patterns.iter().cycle().take(600).enumerate() {
        let input = FrameInput { held: *held, ..FrameInput::idle(Vector2D::new(0.0, 0.0)) };
        // Hold each pattern for a while so the walls are reached.
        for _ in 0..(i % 3 + 1) * 5 {
            state.step(&input, ticker.tick(), &mut rng);
            let p = state.player.position;
            assert!(p.x >= PLAYER_RADIUS && p.x <= PLAYFIELD_WIDTH - PLAYER_RADIUS);
            assert!(p.y >= PLAYER_RADIUS && p.y <= PLAYFIELD_HEIGHT - PLAYER_RADIUS);
        }
    }
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

#[test]
fn approaching_enemy_ends_game_once_inside_its_radius() {
    let mut state = GameState::new(playfield());
    let mut ticker = FixedTicker::at_target_rate();
    let mut rng = seeded_rng();
    let idle = FrameInput::idle(Vector2D::new(800.0, 300.0));
    state.enemies.push(Enemy::at(Vector2D::new(500.0, 300.0)));

    // Gap closes by 2 per tick: 100 - 2 * 42 = 16 is still safe, 14 is lethal.
    for tick in 1..=42 {
        assert_eq!(state.step(&idle, ticker.tick(), &mut rng), GameStatus::Playing, "tick {}", tick);
    }
    assert_abs_diff_eq!(state.player.position.distance_to(state.enemies[0].position), 16.0, epsilon = 1e-9);
    assert_eq!(state.step(&idle, ticker.tick(), &mut rng), GameStatus::GameOver);
    assert_abs_diff_eq!(state.player.position.distance_to(state.enemies[0].position), 14.0, epsilon = 1e-9);

    // A finished game no longer advances.
    let frame = state.frame;
    state.step(&idle, ticker.tick(), &mut rng);
    assert_eq!(state.frame, frame);
}

#[test]
fn powered_up_player_survives_contact() {
    let mut state = GameState::new(playfield());
    let mut ticker = FixedTicker::at_target_rate();
    let mut rng = seeded_rng();
    state.player.apply_powerup(0.0);
    state.enemies.push(Enemy::at(Vector2D::new(405.0, 300.0)));
    let idle = FrameInput::idle(Vector2D::new(800.0, 300.0));
    for _ in 0..60 {
        assert_eq!(state.step(&idle, ticker.tick(), &mut rng), GameStatus::Playing);
    }
    assert_eq!(state.enemies.len(), 1);
}

#[test]
fn five_quick_kills_spawn_a_powerup_and_score_five_hundred() {
    let mut state = GameState::new(playfield());
    // Bottom-left corner, more than a pickup radius away from anywhere a power-up can land.
    state.player.position = Vector2D::new(PLAYER_RADIUS, PLAYFIELD_HEIGHT - PLAYER_RADIUS);
    let origin = state.player.position;
    let pointer = Vector2D::new(PLAYFIELD_WIDTH, origin.y);
    let idle = FrameInput::idle(pointer);
    let mut ticker = FixedTicker::at_target_rate();
    let mut rng = seeded_rng();

    let mut first_powerup = None;
    for round in 0..6 {
        assert!(state.enemies.is_empty());
        state.enemies.push(Enemy::at(origin.add(Vector2D::new(40.0, 0.0))));
        if round < 5 {
            assert!(state.powerup.is_none(), "pending before kill {}", round + 1);
        }

        state.step(&fire_at(pointer), ticker.tick(), &mut rng);
        for _ in 0..12 {
            state.step(&idle, ticker.tick(), &mut rng);
        }
        assert!(state.enemies.is_empty(), "enemy {} survived", round + 1);

        if round == 4 {
            assert!(state.powerup.is_some());
            assert_eq!(state.score.kill_score, 500);
            first_powerup = state.powerup.clone().map(|p| p.position);
        }
    }
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.powerup.map(|p| p.position), first_powerup);
    assert_eq!(state.score.kill_score, 600);
}

#[test]
fn walking_onto_powerup_grants_boost_for_fifteen_seconds() {
    let mut state = GameState::new(playfield());
    let mut rng = seeded_rng();
    state.powerup = Some(PowerUp::at(Vector2D::new(460.0, 300.0)));
    let right = FrameInput {
        held: HeldDirections { right: true, ..HeldDirections::NONE },
        ..FrameInput::idle(Vector2D::new(800.0, 300.0))
    };
    let timing = |now: f64| FrameTiming { dt: 1.0 / 60.0, now, elapsed: now };

    let mut now = 100.0;
    while state.powerup.is_some() {
        now += 1.0 / 60.0;
        state.step(&right, timing(now), &mut rng);
        assert!(now < 101.0, "never reached the power-up");
    }
    assert!(state.player.is_powered_up());
    assert_abs_diff_eq!(state.player.powerup_end_time().unwrap_or_default(), now + 15.0, epsilon = 1e-9);
    assert_abs_diff_eq!(state.player.speed, 6.0, epsilon = 1e-12);

    let mut bullets = Vec::new();
    let mut shooter = state.player.clone();
    assert_eq!(shooter.shoot(Vector2D::new(800.0, 300.0), now + 1.0, &mut bullets), 3);

    let idle = FrameInput::idle(Vector2D::new(800.0, 300.0));
    state.step(&idle, timing(now + 15.5), &mut rng);
    assert!(!state.player.is_powered_up());
    assert_eq!(state.player.speed, PLAYER_BASE_SPEED);
}

// ── Rendering ─────────────────────────────────────────────────────────────────

#[test]
fn draw_emits_every_entity_then_score() {
    let mut state = GameState::new(playfield());
    state.enemies.push(Enemy::at(Vector2D::new(100.0, 100.0)));
    state.enemies.push(Enemy::at(Vector2D::new(700.0, 100.0)));
    state.powerup = Some(PowerUp::at(Vector2D::new(200.0, 200.0)));
    state.score.add_kill();
    state.elapsed = 2.0;

    let mut renderer = RecordingRenderer::default();
    state.draw(&mut renderer, 5.0);
    assert_eq!(
        renderer.calls,
        vec!["player powered=false", "enemy", "enemy", "powerup", "Score: 120"]
    );
}

#[test]
fn terminal_renderer_maps_playfield_onto_cells() {
    let target = OutputTarget::ScreenBuffer(ScreenBuffer::new(80, 24));
    let renderer = TerminalRenderer::new(80, 24, target, playfield());
    assert_eq!(renderer.to_cell(Vector2D::new(0.0, 0.0)), Some((0, 0)));
    assert_eq!(renderer.to_cell(Vector2D::new(400.0, 300.0)), Some((40, 12)));
    assert_eq!(renderer.to_cell(Vector2D::new(800.0, 600.0)), Some((79, 23)));
    assert_eq!(renderer.to_cell(Vector2D::new(-1.0, 10.0)), None);
    assert_eq!(renderer.to_cell(Vector2D::new(900.0, 10.0)), None);
}

#[test]
fn screen_target_clips_text_and_clears() {
    let mut target = OutputTarget::ScreenBuffer(ScreenBuffer::new(10, 3));
    target.move_to(6, 1).unwrap();
    write!(target, "GAME OVER").unwrap();
    target.move_to(0, 5).unwrap();
    write!(target, "offscreen").unwrap();
    target.flush().unwrap();

    let OutputTarget::ScreenBuffer(screen) = &target else { unreachable!() };
    assert_eq!(screen.row(1), "      GAME");
    assert!(!screen.contains_char('f'));

    target.clear().unwrap();
    let OutputTarget::ScreenBuffer(screen) = &target else { unreachable!() };
    assert_eq!(screen.row(1), " ".repeat(10));
}

#[test]
fn headless_frame_shows_score_and_ship() {
    let target = OutputTarget::ScreenBuffer(ScreenBuffer::new(80, 24));
    let mut renderer = TerminalRenderer::new(80, 24, target, playfield());
    let state = GameState::new(playfield());
    state.draw(&mut renderer, 0.0);
    renderer.present().expect("screen buffer never fails");

    let screen = renderer.screen().expect("headless target");
    assert!(screen.row(0).contains("Score: 0"));
    assert!(screen.contains_char('^'));
}

// ── Runner ────────────────────────────────────────────────────────────────────

fn headless_game(events: HashMap<u64, Vec<Event>>, max_frames: Option<u64>) -> Game {
    let target = OutputTarget::ScreenBuffer(ScreenBuffer::new(80, 24));
    let renderer = TerminalRenderer::new(80, 24, target, playfield());
    Game::new(
        80,
        24,
        renderer,
        Box::new(SimulatedInput::new(events)),
        Box::new(FixedTicker::at_target_rate()),
        max_frames,
        false,
    )
}

#[test]
fn quit_key_ends_the_loop() {
    let mut events = HashMap::new();
    events.insert(5, vec![Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))]);
    let mut game = headless_game(events, None);

    let summary = game.run(&mut seeded_rng()).expect("headless run");
    assert_eq!(summary.end, GameEnd::Quit);
    assert_eq!(summary.frames, 5);
    assert_eq!(game.state.frame, 5);
}

#[test]
fn frame_limit_ends_the_loop() {
    let mut game = headless_game(HashMap::new(), Some(33));
    let summary = game.run(&mut seeded_rng()).expect("headless run");
    assert_eq!(summary.end, GameEnd::FrameLimit);
    assert_eq!(summary.frames, 33);
    assert_eq!(summary.score, 5); // 0.55s of survival
}

#[test]
fn lethal_contact_ends_the_loop() {
    let mut game = headless_game(HashMap::new(), Some(600));
    game.state.enemies.push(Enemy::at(Vector2D::new(430.0, 300.0)));
    let summary = game.run(&mut seeded_rng()).expect("headless run");
    assert_eq!(summary.end, GameEnd::PlayerDestroyed);
    assert_eq!(summary.frames, 8);
}
