use crate::constants::*;
use crate::input::HeldDirections;
use crate::powerup::PowerUpState;
use crate::types::{Playfield, Vector2D};
use log::info;
use rand::Rng;

// --- Player ship ---
#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vector2D,
    pub base_speed: f64,
    pub speed: f64,
    pub radius: f64,
    pub facing: f64, // Radians, toward the last aim target
    pub shot_cooldown: f64,
    pub last_shot: Option<f64>,
    pub power: PowerUpState,
}

impl Player {
    pub fn new(position: Vector2D) -> Self {
        Player {
            position,
            base_speed: PLAYER_BASE_SPEED,
            speed: PLAYER_BASE_SPEED,
            radius: PLAYER_RADIUS,
            facing: -std::f64::consts::FRAC_PI_2, // Facing upwards initially
            shot_cooldown: PLAYER_SHOT_COOLDOWN,
            last_shot: None,
            power: PowerUpState::Inactive,
        }
    }

    pub fn is_powered_up(&self) -> bool {
        self.power.is_active()
    }

    pub fn powerup_end_time(&self) -> Option<f64> {
        self.power.expires_at()
    }

    /// Expires the power-up if due, then moves one step per held direction and clamps.
    /// Diagonals are not normalized, so they cover more ground per tick.
    pub fn update(&mut self, held: HeldDirections, now: f64, playfield: Playfield) {
        if self.power.expire_if_due(now) {
            self.speed = self.base_speed;
            info!("Power-up expired at t={:.2}", now);
        }

        let mut velocity = Vector2D::ZERO;
        if held.up {
            velocity.y -= self.speed;
        }
        if held.down {
            velocity.y += self.speed;
        }
        if held.left {
            velocity.x -= self.speed;
        }
        if held.right {
            velocity.x += self.speed;
        }
        self.position = playfield.clamp(self.position.add(velocity), self.radius);
    }

    /// Turns the ship toward `target`. A target on top of the ship keeps the old facing.
    pub fn aim(&mut self, target: Vector2D) {
        if let Some(direction) = target.sub(self.position).try_normalize() {
            self.facing = direction.angle();
        }
    }

    pub fn aim_direction(&self, target: Vector2D) -> Vector2D {
        target
            .sub(self.position)
            .try_normalize()
            .unwrap_or_else(|| Vector2D::from_angle(self.facing))
    }

    pub fn can_shoot(&self, now: f64) -> bool {
        match self.last_shot {
            Some(last) => now - last > self.shot_cooldown,
            None => true,
        }
    }

    /// Fires the current shot pattern toward `target`. Returns the number of bullets added.
    pub fn shoot(&mut self, target: Vector2D, now: f64, bullets: &mut Vec<Bullet>) -> usize {
        if !self.can_shoot(now) {
            return 0;
        }
        let aim = self.aim_direction(target);
        let directions = self.power.shot_pattern().directions(aim);
        let fired = directions.len();
        bullets.extend(directions.into_iter().map(|d| Bullet::new(self.position, d)));
        self.last_shot = Some(now);
        fired
    }

    pub fn apply_powerup(&mut self, now: f64) {
        self.power.activate(now);
        self.speed = self.base_speed * self.power.speed_multiplier();
    }
}

// --- Bullet ---
#[derive(Clone, Debug)]
pub struct Bullet {
    pub position: Vector2D,
    pub direction: Vector2D,
    pub speed: f64,
    pub radius: f64,
}

impl Bullet {
    pub fn new(position: Vector2D, direction: Vector2D) -> Self {
        Bullet {
            position,
            direction,
            speed: BULLET_SPEED,
            radius: BULLET_RADIUS,
        }
    }

    pub fn update(&mut self) {
        self.position = self.position.add(self.direction.scale(self.speed));
    }

    pub fn off_screen(&self, playfield: Playfield) -> bool {
        !playfield.contains(self.position)
    }
}

// --- Enemy ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [SpawnEdge::Top, SpawnEdge::Bottom, SpawnEdge::Left, SpawnEdge::Right];

    pub fn random(rng: &mut impl Rng) -> Self {
        SpawnEdge::ALL[rng.gen_range(0..SpawnEdge::ALL.len())]
    }

    /// A whole-unit point somewhere along this edge.
    pub fn random_point(&self, playfield: Playfield, rng: &mut impl Rng) -> Vector2D {
        let width = playfield.width.max(0.0) as i32;
        let height = playfield.height.max(0.0) as i32;
        match self {
            SpawnEdge::Top => Vector2D::new(rng.gen_range(0..=width) as f64, 0.0),
            SpawnEdge::Bottom => Vector2D::new(rng.gen_range(0..=width) as f64, playfield.height),
            SpawnEdge::Left => Vector2D::new(0.0, rng.gen_range(0..=height) as f64),
            SpawnEdge::Right => Vector2D::new(playfield.width, rng.gen_range(0..=height) as f64),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub position: Vector2D,
    pub speed: f64,
    pub radius: f64,
}

impl Enemy {
    pub fn at(position: Vector2D) -> Self {
        Enemy {
            position,
            speed: ENEMY_SPEED,
            radius: ENEMY_RADIUS,
        }
    }

    pub fn spawn(edge: SpawnEdge, playfield: Playfield, rng: &mut impl Rng) -> Self {
        Enemy::at(edge.random_point(playfield, rng))
    }

    /// Homes in on the player. Standing exactly on the player yields no movement.
    pub fn update(&mut self, player_position: Vector2D, playfield: Playfield) {
        let direction = player_position.sub(self.position).normalize_or_zero();
        self.position = playfield.clamp(self.position.add(direction.scale(self.speed)), self.radius);
    }

    pub fn facing(&self, player_position: Vector2D) -> f64 {
        player_position.sub(self.position).angle()
    }
}

// --- Power-up pickup ---
#[derive(Clone, Debug)]
pub struct PowerUp {
    pub position: Vector2D,
    pub radius: f64,
}

impl PowerUp {
    pub fn at(position: Vector2D) -> Self {
        PowerUp {
            position,
            radius: POWERUP_RADIUS,
        }
    }

    /// Places the pickup at a whole-unit point at least `POWERUP_EDGE_INSET` from each edge.
    pub fn spawn(playfield: Playfield, rng: &mut impl Rng) -> Self {
        PowerUp::at(Vector2D::new(
            inset_coordinate(playfield.width, rng),
            inset_coordinate(playfield.height, rng),
        ))
    }
}

fn inset_coordinate(extent: f64, rng: &mut impl Rng) -> f64 {
    let high = extent as i32 - POWERUP_EDGE_INSET;
    if high < POWERUP_EDGE_INSET {
        extent / 2.0
    } else {
        rng.gen_range(POWERUP_EDGE_INSET..=high) as f64
    }
}
