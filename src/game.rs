use std::io::{self, Write};
use crossterm::event::{self, Event, KeyEventKind};
use rand::Rng;
use log::{error, info};

use crate::clock::{FrameTicker, FrameTiming};
use crate::combat::{self, KillHistory};
use crate::constants::*;
use crate::entities::{Bullet, Enemy, Player, PowerUp};
use crate::input::{self, EventSource, FrameInput, InputState};
use crate::rendering::{Renderer, TerminalRenderer};
use crate::score::Score;
use crate::spawner::Spawner;
use crate::types::{Playfield, Vector2D};

const SCORE_TEXT_POSITION: Vector2D = Vector2D { x: 10.0, y: 10.0 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// All mutable simulation state. The frame loop is its only owner and mutator.
#[derive(Clone, Debug)]
pub struct GameState {
    pub playfield: Playfield,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    /// At most one pickup waits on the field at a time.
    pub powerup: Option<PowerUp>,
    pub kills: KillHistory,
    pub score: Score,
    pub spawner: Spawner,
    pub status: GameStatus,
    pub elapsed: f64,
    pub frame: u64,
}

impl GameState {
    pub fn new(playfield: Playfield) -> Self {
        GameState {
            playfield,
            player: Player::new(playfield.center()),
            bullets: Vec::new(),
            enemies: Vec::new(),
            powerup: None,
            kills: KillHistory::new(),
            score: Score::new(),
            spawner: Spawner::new(),
            status: GameStatus::Playing,
            elapsed: 0.0,
            frame: 0,
        }
    }

    pub fn total_score(&self) -> u32 {
        self.score.total(self.elapsed)
    }

    /// Advances one tick. Movement uses fixed per-tick steps; only the spawn timer reads `dt`.
    /// A finished game ignores further ticks.
    pub fn step(&mut self, input: &FrameInput, timing: FrameTiming, rng: &mut impl Rng) -> GameStatus {
        if self.status == GameStatus::GameOver {
            return self.status;
        }
        let now = timing.now;
        self.elapsed = timing.elapsed;
        self.frame += 1;

        self.player.aim(input.pointer);
        for _ in 0..input.fire_presses {
            self.player.shoot(input.pointer, now, &mut self.bullets);
        }
        self.player.update(input.held, now, self.playfield);

        let playfield = self.playfield;
        self.bullets.retain_mut(|bullet| {
            bullet.update();
            !bullet.off_screen(playfield)
        });

        let outcome = combat::resolve_enemies(self, now, rng);
        if outcome.player_struck {
            self.status = GameStatus::GameOver;
            info!(
                "Player destroyed at t={:.2} (frame {}); final score {}",
                now,
                self.frame,
                self.total_score()
            );
        }

        combat::resolve_pickup(self, now);

        if let Some(enemy) = self.spawner.update(timing.dt, timing.elapsed, playfield, rng) {
            self.enemies.push(enemy);
        }

        self.status
    }

    /// Draws the whole frame, score text last.
    pub fn draw(&self, renderer: &mut impl Renderer, now: f64) {
        renderer.begin_frame(now);
        renderer.draw_player(self.player.position, self.player.facing, self.player.is_powered_up());
        for bullet in &self.bullets {
            renderer.draw_bullet(bullet.position);
        }
        for enemy in &self.enemies {
            renderer.draw_enemy(enemy.position, enemy.facing(self.player.position));
        }
        if let Some(powerup) = &self.powerup {
            renderer.draw_powerup(powerup.position);
        }
        renderer.draw_text(&format!("Score: {}", self.total_score()), SCORE_TEXT_POSITION);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEnd {
    PlayerDestroyed,
    Quit,
    FrameLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub end: GameEnd,
    pub score: u32,
    pub frames: u64,
}

pub struct Game {
    pub renderer: TerminalRenderer,
    pub state: GameState,
    events: Box<dyn EventSource>,
    ticker: Box<dyn FrameTicker>,
    input: InputState,
    max_frames: Option<u64>,
}

impl Game {
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        renderer: TerminalRenderer,
        events: Box<dyn EventSource>,
        ticker: Box<dyn FrameTicker>,
        max_frames: Option<u64>,
        reports_releases: bool,
    ) -> Self {
        let playfield = Playfield::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT);
        Game {
            renderer,
            state: GameState::new(playfield),
            events,
            ticker,
            input: InputState::new(terminal_width, terminal_height, playfield, reports_releases),
            max_frames,
        }
    }

    pub fn run(&mut self, rng: &mut impl Rng) -> io::Result<RunSummary> {
        info!("Game loop starting.");
        let mut frame_count: u64 = 0;

        let end = loop {
            if self.max_frames.is_some_and(|max| frame_count >= max) {
                break GameEnd::FrameLimit;
            }

            let timing = self.ticker.tick();
            let input = self.input.collect(self.events.as_mut(), frame_count)?;
            if let Some((columns, rows)) = input.resized {
                self.renderer.resize(columns, rows);
            }
            if input.quit {
                info!("Quit requested at frame {}.", frame_count);
                break GameEnd::Quit;
            }

            let status = self.state.step(&input, timing, rng);

            self.state.draw(&mut self.renderer, timing.now);
            self.renderer.present().map_err(|e| { error!("Failed to present frame: {}", e); e })?;
            frame_count += 1;

            if status == GameStatus::GameOver {
                break GameEnd::PlayerDestroyed;
            }
        };

        let summary = RunSummary {
            end,
            score: self.state.total_score(),
            frames: frame_count,
        };
        info!("Game loop ended: {:?} after {} frames with score {}.", end, frame_count, summary.score);

        if end == GameEnd::PlayerDestroyed && !self.renderer.target.is_headless() {
            self.show_game_over_screen(summary.score, frame_count)?;
        }
        Ok(summary)
    }

    fn show_game_over_screen(&mut self, score: u32, frame: u64) -> io::Result<()> {
        let terminal_width = self.renderer.grid.width;
        let terminal_height = self.renderer.grid.height;
        let target = &mut self.renderer.target;
        target.clear()?;

        let game_over_msg = "GAME OVER!";
        let score_msg = format!("Final Score: {}", score);
        let exit_msg = "Press any key to exit...";

        let lines = [
            (game_over_msg, (terminal_height / 2).saturating_sub(2)),
            (score_msg.as_str(), terminal_height / 2),
            (exit_msg, (terminal_height / 2).saturating_add(2)),
        ];
        for (message, y) in lines {
            let x = (terminal_width / 2).saturating_sub(message.len() as u16 / 2);
            target.move_to(x, y)?;
            write!(target, "{}", message)?;
        }
        target.flush().map_err(|e| { error!("Failed to flush game over screen: {}", e); e })?;
        info!("Game over screen displayed. Waiting for final key press.");

        // Auto-repeats from keys held at the moment of death are still queued.
        let stale = input::discard_pending(self.events.as_mut(), frame)?;
        if stale > 0 {
            info!("Discarded {} queued events before the final key press.", stale);
        }
        loop {
            match event::read().map_err(|e| { error!("Failed to read event: {}", e); e })? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => break,
                _ => {}
            }
        }
        Ok(())
    }
}
