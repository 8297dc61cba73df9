// --- Playfield ---
pub const PLAYFIELD_WIDTH: f64 = 800.0;
pub const PLAYFIELD_HEIGHT: f64 = 600.0;
pub const TARGET_FPS: u32 = 60;

// --- Player ---
pub const PLAYER_BASE_SPEED: f64 = 5.0; // Units per tick
pub const PLAYER_RADIUS: f64 = 20.0;
pub const PLAYER_SHOT_COOLDOWN: f64 = 0.2; // Seconds

// --- Bullets ---
pub const BULLET_SPEED: f64 = 10.0;
pub const BULLET_RADIUS: f64 = 4.0;

// --- Enemies ---
pub const ENEMY_SPEED: f64 = 2.0;
pub const ENEMY_RADIUS: f64 = 15.0;
pub const SCORE_PER_KILL: u32 = 100;

// --- Spawn ramp ---
pub const INITIAL_SPAWN_INTERVAL: f64 = 1.5; // Seconds
pub const MIN_SPAWN_INTERVAL: f64 = 0.3;
pub const SPAWN_INTERVAL_DECAY: f64 = 0.01; // Seconds shaved off per second of play

// --- Power-ups ---
pub const POWERUP_RADIUS: f64 = 20.0;
pub const POWERUP_DURATION: f64 = 15.0;
pub const POWERUP_KILL_WINDOW: f64 = 7.0;
pub const POWERUP_KILL_COUNT: usize = 5;
pub const POWERUP_SPEED_MULTIPLIER: f64 = 1.2;
pub const POWERUP_SPREAD_DEGREES: f64 = 15.0;
pub const POWERUP_EDGE_INSET: i32 = 50;

// --- Score ---
pub const TIME_SCORE_PER_SECOND: f64 = 10.0;

// --- Input ---
pub const HOLD_WINDOW_FRAMES: u64 = 8; // A key without release events stays held this long after its last repeat
