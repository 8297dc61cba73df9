pub mod clock;
pub mod combat;
pub mod config;
pub mod constants;
pub mod entities;
pub mod game;
pub mod input;
pub mod powerup;
pub mod rendering;
pub mod score;
pub mod spawner;
pub mod types;
