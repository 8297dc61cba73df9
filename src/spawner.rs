use crate::constants::*;
use crate::entities::{Enemy, SpawnEdge};
use crate::types::Playfield;
use log::debug;
use rand::Rng;

/// Seconds between enemy spawns after `elapsed` seconds of play.
pub fn spawn_interval(elapsed: f64) -> f64 {
    let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
    (INITIAL_SPAWN_INTERVAL - elapsed * SPAWN_INTERVAL_DECAY).max(MIN_SPAWN_INTERVAL)
}

/// Time-driven enemy creation. Unlike movement, the timer is scaled by frame delta.
#[derive(Clone, Debug)]
pub struct Spawner {
    pub timer: f64,
    pub interval: f64,
}

impl Spawner {
    pub fn new() -> Self {
        Spawner {
            timer: 0.0,
            interval: INITIAL_SPAWN_INTERVAL,
        }
    }

    pub fn update(&mut self, dt: f64, elapsed: f64, playfield: Playfield, rng: &mut impl Rng) -> Option<Enemy> {
        self.timer += dt;
        if self.timer <= self.interval {
            return None;
        }
        let edge = SpawnEdge::random(rng);
        let enemy = Enemy::spawn(edge, playfield, rng);
        self.timer = 0.0;
        self.interval = spawn_interval(elapsed);
        debug!(
            "Spawned enemy on {:?} edge at ({:.0}, {:.0}); next in {:.2}s",
            edge, enemy.position.x, enemy.position.y, self.interval
        );
        Some(enemy)
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Spawner::new()
    }
}
