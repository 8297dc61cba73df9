use crate::constants::*;
use crate::types::Vector2D;

/// Shot layout fired by one trigger pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotPattern {
    Single,
    /// Center shot plus one on each side at `POWERUP_SPREAD_DEGREES`.
    Triple,
}

impl ShotPattern {
    /// Unit directions for each bullet, given a unit aim direction.
    pub fn directions(&self, aim: Vector2D) -> Vec<Vector2D> {
        match self {
            ShotPattern::Single => vec![aim],
            ShotPattern::Triple => {
                let offset = POWERUP_SPREAD_DEGREES.to_radians();
                vec![aim.rotate(-offset), aim, aim.rotate(offset)]
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PowerUpState {
    #[default]
    Inactive,
    Active { expires_at: f64 },
}

impl PowerUpState {
    pub fn is_active(&self) -> bool {
        matches!(self, PowerUpState::Active { .. })
    }

    pub fn expires_at(&self) -> Option<f64> {
        match self {
            PowerUpState::Active { expires_at } => Some(*expires_at),
            PowerUpState::Inactive => None,
        }
    }

    pub fn activate(&mut self, now: f64) {
        *self = PowerUpState::Active {
            expires_at: now + POWERUP_DURATION,
        };
    }

    /// Returns `true` on the tick the window closes.
    pub fn expire_if_due(&mut self, now: f64) -> bool {
        match *self {
            PowerUpState::Active { expires_at } if now > expires_at => {
                *self = PowerUpState::Inactive;
                true
            }
            _ => false,
        }
    }

    pub fn shot_pattern(&self) -> ShotPattern {
        match self {
            PowerUpState::Active { .. } => ShotPattern::Triple,
            PowerUpState::Inactive => ShotPattern::Single,
        }
    }

    pub fn speed_multiplier(&self) -> f64 {
        match self {
            PowerUpState::Active { .. } => POWERUP_SPEED_MULTIPLIER,
            PowerUpState::Inactive => 1.0,
        }
    }
}
