use crate::constants::*;
use crate::entities::{Bullet, Enemy, Player, PowerUp};
use crate::game::GameState;
use crate::types::Vector2D;
use log::info;
use rand::Rng;

/// Strict overlap: circles exactly touching do not collide.
pub fn circles_overlap(a: Vector2D, radius_a: f64, b: Vector2D, radius_b: f64) -> bool {
    a.distance_to(b) < radius_a + radius_b
}

pub fn bullet_hits_enemy(bullet: &Bullet, enemy: &Enemy) -> bool {
    circles_overlap(bullet.position, bullet.radius, enemy.position, enemy.radius)
}

/// Contact is measured against the enemy radius alone, and only an unprotected player dies.
pub fn is_lethal_contact(player: &Player, enemy: &Enemy) -> bool {
    !player.is_powered_up() && player.position.distance_to(enemy.position) < enemy.radius
}

pub fn collects(player: &Player, powerup: &PowerUp) -> bool {
    circles_overlap(player.position, player.radius, powerup.position, powerup.radius)
}

/// Timestamps of recent kills, trimmed to the trailing kill-streak window on every kill.
#[derive(Clone, Debug, Default)]
pub struct KillHistory {
    times: Vec<f64>,
}

impl KillHistory {
    pub fn new() -> Self {
        KillHistory { times: Vec::new() }
    }

    /// Appends `now`, prunes, and returns the number of kills left in the window.
    pub fn record(&mut self, now: f64) -> usize {
        self.times.push(now);
        self.times.retain(|&t| now - t < POWERUP_KILL_WINDOW);
        self.times.len()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatOutcome {
    pub kills: u32,
    pub player_struck: bool,
    pub powerup_spawned: bool,
}

/// Moves every enemy, then resolves its bullet hit and its contact with the player, in that
/// order. Each enemy dies at most once and each bullet is consumed at most once per tick.
pub fn resolve_enemies(state: &mut GameState, now: f64, rng: &mut impl Rng) -> CombatOutcome {
    let GameState {
        player,
        bullets,
        enemies,
        powerup,
        kills,
        score,
        playfield,
        ..
    } = state;
    let player: &Player = player;
    let playfield = *playfield;
    let mut outcome = CombatOutcome::default();

    enemies.retain_mut(|enemy| {
        enemy.update(player.position, playfield);
        let enemy: &Enemy = enemy;

        if let Some(index) = bullets.iter().position(|bullet| bullet_hits_enemy(bullet, enemy)) {
            bullets.remove(index);
            score.add_kill();
            outcome.kills += 1;
            let streak = kills.record(now);
            if streak >= POWERUP_KILL_COUNT && powerup.is_none() && !player.is_powered_up() {
                let spawned = PowerUp::spawn(playfield, rng);
                info!(
                    "Kill streak of {} - power-up spawned at ({:.0}, {:.0})",
                    streak, spawned.position.x, spawned.position.y
                );
                *powerup = Some(spawned);
                outcome.powerup_spawned = true;
            }
            return false;
        }

        if is_lethal_contact(player, enemy) {
            outcome.player_struck = true;
        }
        true
    });

    outcome
}

/// Consumes the pending power-up if the player is touching it.
pub fn resolve_pickup(state: &mut GameState, now: f64) -> bool {
    let touching = match &state.powerup {
        Some(powerup) => collects(&state.player, powerup),
        None => false,
    };
    if touching {
        state.player.apply_powerup(now);
        state.powerup = None;
        info!("Power-up collected at t={:.2}; active until t={:.2}", now, now + POWERUP_DURATION);
    }
    touching
}
