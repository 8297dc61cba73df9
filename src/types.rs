#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    /// Unit vector pointing along `angle` (radians, y grows downward).
    pub fn from_angle(angle: f64) -> Self {
        Vector2D::new(angle.cos(), angle.sin())
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x - other.x, self.y - other.y)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: Vector2D) -> f64 {
        self.sub(other).length()
    }

    /// Returns the unit vector, or `None` when the vector has no direction.
    pub fn try_normalize(&self) -> Option<Self> {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            Some(self.scale(1.0 / length))
        } else {
            None
        }
    }

    pub fn normalize_or_zero(&self) -> Self {
        self.try_normalize().unwrap_or(Vector2D::ZERO)
    }

    /// Rotates counter-clockwise in screen math terms (x toward y) by `radians`.
    pub fn rotate(&self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Vector2D::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

/// The rectangular arena every entity lives in. Origin is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
}

impl Playfield {
    pub fn new(width: f64, height: f64) -> Self {
        Playfield { width, height }
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamps `position` into `[margin, extent - margin]` on both axes. A margin wider
    /// than half the playfield pins the axis to its midpoint.
    pub fn clamp(&self, position: Vector2D, margin: f64) -> Vector2D {
        Vector2D::new(
            clamp_axis(position.x, margin, self.width),
            clamp_axis(position.y, margin, self.height),
        )
    }

    /// Inclusive on every edge.
    pub fn contains(&self, position: Vector2D) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}

fn clamp_axis(value: f64, margin: f64, extent: f64) -> f64 {
    let low = margin;
    let high = extent - margin;
    if low > high {
        return extent / 2.0;
    }
    if value.is_nan() {
        return low;
    }
    value.max(low).min(high)
}
