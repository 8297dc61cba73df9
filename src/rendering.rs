use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::constants::*;
use crate::types::{Playfield, Vector2D};

const PLAYER_COLOR: Color = Color::White;
const ENEMY_COLOR: Color = Color::Red;
const BULLET_COLOR: Color = Color::White;
const POWERUP_COLOR: Color = Color::White;
const TEXT_COLOR: Color = Color::White;

const POWERUP_GLYPH_SIZE: f64 = 20.0;
const RING_PADDING: f64 = 10.0;
const RING_AMPLITUDE: f64 = 5.0;
const RING_FREQUENCY: f64 = 0.005; // Per millisecond
const TRIANGLE_SPREAD: f64 = 2.5; // Radians from the nose to each rear corner

/// Side-effect-only drawing surface for one frame, addressed in playfield units.
pub trait Renderer {
    /// Clears the frame. `now` is the monotonic clock in seconds, used for animation.
    fn begin_frame(&mut self, now: f64);
    fn draw_player(&mut self, position: Vector2D, facing: f64, powered_up: bool);
    fn draw_bullet(&mut self, position: Vector2D);
    fn draw_enemy(&mut self, position: Vector2D, facing: f64);
    fn draw_powerup(&mut self, position: Vector2D);
    fn draw_text(&mut self, content: &str, position: Vector2D);
    fn present(&mut self) -> io::Result<()>;
}

/// Pulsing ring radius around a powered-up ship of `size` at `now` seconds.
pub fn pulse_ring_radius(size: f64, now: f64) -> f64 {
    let millis = now * 1000.0;
    size + RING_PADDING + (RING_AMPLITUDE * (millis * RING_FREQUENCY).sin()).trunc()
}

/// Corner points of a hollow ship triangle, nose first.
pub fn triangle_points(position: Vector2D, angle: f64, size: f64) -> [Vector2D; 3] {
    [
        position.add(Vector2D::from_angle(angle).scale(size)),
        position.add(Vector2D::from_angle(angle + TRIANGLE_SPREAD).scale(size)),
        position.add(Vector2D::from_angle(angle - TRIANGLE_SPREAD).scale(size)),
    ]
}

/// In-memory stand-in for the terminal, used in debug mode and tests.
pub struct ScreenBuffer {
    rows: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    cursor: (u16, u16),
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            rows: blank_rows(width, height, ' '),
            width,
            height,
            cursor: (0, 0),
        }
    }

    fn clear(&mut self) {
        self.rows = blank_rows(self.width, self.height, ' ');
        self.cursor = (0, 0);
    }

    pub fn row(&self, y: u16) -> String {
        self.rows
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn contains_char(&self, c: char) -> bool {
        self.rows.iter().any(|row| row.contains(&c))
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.rows {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

/// Text lands at the cursor and advances it; anything past the edges is dropped.
impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let (mut x, y) = self.cursor;
        for c in String::from_utf8_lossy(buf).chars() {
            if let Some(cell) = self.rows.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
                *cell = c;
            }
            x = x.saturating_add(1);
        }
        self.cursor.0 = x;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn blank_rows<T: Clone>(width: u16, height: u16, blank: T) -> Vec<Vec<T>> {
    vec![vec![blank; width as usize]; height as usize]
}

/// Where frames go. Commands are queued for stdout and applied on `flush`.
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn move_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, MoveTo(x, y)),
            OutputTarget::ScreenBuffer(sb) => {
                sb.cursor = (x, y);
                Ok(())
            }
        }
    }

    /// The screen buffer holds no colors.
    pub fn set_color(&mut self, color: Color) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, SetForegroundColor(color)),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }

    /// Blanks the surface and parks the cursor at the origin.
    pub fn clear(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, ResetColor, Clear(ClearType::All), MoveTo(0, 0)),
            OutputTarget::ScreenBuffer(sb) => {
                sb.clear();
                Ok(())
            }
        }
    }

    pub fn is_headless(&self) -> bool {
        matches!(self, OutputTarget::ScreenBuffer(_))
    }

    fn sink(&mut self) -> &mut dyn Write {
        match self {
            OutputTarget::Stdout(s) => s,
            OutputTarget::ScreenBuffer(sb) => sb,
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink().flush()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    pub const BLANK: Cell = Cell { ch: ' ', color: Color::Reset };
}

// --- GameGrid: one frame of terminal cells ---
pub struct GameGrid {
    pub grid: Vec<Vec<Cell>>,
    pub width: u16,
    pub height: u16,
}

impl GameGrid {
    pub fn new(width: u16, height: u16) -> Self {
        GameGrid {
            grid: blank_rows(width, height, Cell::BLANK),
            width,
            height,
        }
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char, color: Color) {
        if y < self.height && x < self.width {
            self.grid[y as usize][x as usize] = Cell { ch: c, color };
        }
    }

    pub fn clear(&mut self) {
        self.grid = blank_rows(self.width, self.height, Cell::BLANK);
    }

    /// Writes each row as runs of same-colored cells.
    pub fn render(&self, out: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height {
            out.move_to(0, y)?;
            let row = &self.grid[y as usize];
            let mut start = 0;
            while start < row.len() {
                let color = row[start].color;
                let end = row[start..]
                    .iter()
                    .position(|cell| cell.color != color)
                    .map_or(row.len(), |offset| start + offset);
                out.set_color(color)?;
                write!(out, "{}", row[start..end].iter().map(|cell| cell.ch).collect::<String>())?;
                start = end;
            }
        }
        out.set_color(Color::Reset)
    }

    pub fn copy_into(&self, sb: &mut ScreenBuffer) {
        sb.clear();
        for (target, source) in sb.rows.iter_mut().zip(&self.grid) {
            for (slot, cell) in target.iter_mut().zip(source) {
                *slot = cell.ch;
            }
        }
    }
}

/// Renders the playfield onto a character grid scaled to the terminal.
pub struct TerminalRenderer {
    pub grid: GameGrid,
    pub target: OutputTarget,
    playfield: Playfield,
    now: f64,
}

impl TerminalRenderer {
    pub fn new(columns: u16, rows: u16, target: OutputTarget, playfield: Playfield) -> Self {
        TerminalRenderer {
            grid: GameGrid::new(columns, rows),
            target,
            playfield,
            now: 0.0,
        }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.grid = GameGrid::new(columns, rows);
    }

    pub fn screen(&self) -> Option<&ScreenBuffer> {
        match &self.target {
            OutputTarget::ScreenBuffer(sb) => Some(sb),
            OutputTarget::Stdout(_) => None,
        }
    }

    /// Fractional cell coordinates of a playfield point.
    fn to_cell_space(&self, position: Vector2D) -> (f64, f64) {
        (
            position.x / self.playfield.width * self.grid.width as f64,
            position.y / self.playfield.height * self.grid.height as f64,
        )
    }

    /// Cell under a playfield point, if it lies on the grid.
    pub fn to_cell(&self, position: Vector2D) -> Option<(u16, u16)> {
        let (x, y) = self.to_cell_space(position);
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let (column, row) = (x.floor() as u64, y.floor() as u64);
        // The far edges belong to the last column and row.
        let column = if x == self.grid.width as f64 { column.saturating_sub(1) } else { column };
        let row = if y == self.grid.height as f64 { row.saturating_sub(1) } else { row };
        if column < self.grid.width as u64 && row < self.grid.height as u64 {
            Some((column as u16, row as u16))
        } else {
            None
        }
    }

    fn plot(&mut self, position: Vector2D, c: char, color: Color) {
        if let Some((x, y)) = self.to_cell(position) {
            self.grid.set_char(x, y, c, color);
        }
    }

    fn plot_segment(&mut self, from: Vector2D, to: Vector2D, c: char, color: Color) {
        let (fx, fy) = self.to_cell_space(from);
        let (tx, ty) = self.to_cell_space(to);
        let steps = (tx - fx).abs().max((ty - fy).abs()).ceil().clamp(1.0, 512.0) as u32;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.plot(from.add(to.sub(from).scale(t)), c, color);
        }
    }

    fn hollow_triangle(&mut self, position: Vector2D, angle: f64, size: f64, edge: char, color: Color) {
        let [nose, left, right] = triangle_points(position, angle, size);
        self.plot_segment(nose, left, edge, color);
        self.plot_segment(left, right, edge, color);
        self.plot_segment(right, nose, edge, color);
        self.plot(nose, nose_char(angle), color);
    }

    fn circle_outline(&mut self, center: Vector2D, radius: f64, c: char, color: Color) {
        const SEGMENTS: u32 = 32;
        for i in 0..SEGMENTS {
            let angle = i as f64 / SEGMENTS as f64 * std::f64::consts::TAU;
            self.plot(center.add(Vector2D::from_angle(angle).scale(radius)), c, color);
        }
    }
}

/// Arrow pointing along `angle`, split into four quadrants.
fn nose_char(angle: f64) -> char {
    use std::f64::consts::FRAC_PI_4;
    let normalized_angle = angle.rem_euclid(std::f64::consts::TAU);
    if normalized_angle >= 7.0 * FRAC_PI_4 || normalized_angle < FRAC_PI_4 {
        '>'
    } else if normalized_angle < 3.0 * FRAC_PI_4 {
        'v'
    } else if normalized_angle < 5.0 * FRAC_PI_4 {
        '<'
    } else {
        '^'
    }
}

impl Renderer for TerminalRenderer {
    fn begin_frame(&mut self, now: f64) {
        self.grid.clear();
        self.now = now;
    }

    fn draw_player(&mut self, position: Vector2D, facing: f64, powered_up: bool) {
        if powered_up {
            let radius = pulse_ring_radius(PLAYER_RADIUS, self.now);
            self.circle_outline(position, radius, '.', PLAYER_COLOR);
        }
        self.hollow_triangle(position, facing, PLAYER_RADIUS, '*', PLAYER_COLOR);
    }

    fn draw_bullet(&mut self, position: Vector2D) {
        self.plot(position, 'o', BULLET_COLOR);
    }

    fn draw_enemy(&mut self, position: Vector2D, facing: f64) {
        self.hollow_triangle(position, facing, ENEMY_RADIUS, 'x', ENEMY_COLOR);
    }

    fn draw_powerup(&mut self, position: Vector2D) {
        let half = POWERUP_GLYPH_SIZE / 2.0;
        let corners = [
            position.add(Vector2D::new(-half, -half)),
            position.add(Vector2D::new(half, -half)),
            position.add(Vector2D::new(half, half)),
            position.add(Vector2D::new(-half, half)),
        ];
        for i in 0..corners.len() {
            self.plot_segment(corners[i], corners[(i + 1) % corners.len()], '#', POWERUP_COLOR);
        }
        self.circle_outline(position, (POWERUP_GLYPH_SIZE / 3.0).floor(), 'o', POWERUP_COLOR);
        self.plot(position, '@', POWERUP_COLOR);
    }

    fn draw_text(&mut self, content: &str, position: Vector2D) {
        if let Some((x, y)) = self.to_cell(position) {
            for (i, c) in content.chars().enumerate() {
                self.grid.set_char(x.saturating_add(i as u16), y, c, TEXT_COLOR);
            }
        }
    }

    fn present(&mut self) -> io::Result<()> {
        match &mut self.target {
            OutputTarget::ScreenBuffer(sb) => {
                self.grid.copy_into(sb);
                sb.print_to_log();
            }
            out @ OutputTarget::Stdout(_) => {
                self.grid.render(out)?;
            }
        }
        self.target.flush()
    }
}
