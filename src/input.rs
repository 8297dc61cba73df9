use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use log::error;

use crate::constants::HOLD_WINDOW_FRAMES;
use crate::types::{Playfield, Vector2D};

/// Movement keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldDirections {
    pub const NONE: HeldDirections = HeldDirections {
        up: false,
        down: false,
        left: false,
        right: false,
    };
}

/// Everything the simulation reads from the player in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInput {
    pub held: HeldDirections,
    pub pointer: Vector2D,
    /// Discrete fire presses seen since the previous frame.
    pub fire_presses: u32,
    pub quit: bool,
    pub resized: Option<(u16, u16)>,
}

impl FrameInput {
    pub fn idle(pointer: Vector2D) -> Self {
        FrameInput {
            held: HeldDirections::NONE,
            pointer,
            fire_presses: 0,
            quit: false,
            resized: None,
        }
    }
}

pub trait EventSource {
    /// Next pending event for `frame`, or `None` once the frame's queue is drained.
    fn poll_event(&mut self, frame: u64) -> io::Result<Option<Event>>;
}

/// Drops every event already queued for `frame` and returns how many there were.
pub fn discard_pending(source: &mut dyn EventSource, frame: u64) -> io::Result<usize> {
    let mut discarded = 0;
    while source.poll_event(frame)?.is_some() {
        discarded += 1;
    }
    Ok(discarded)
}

/// Non-blocking reader over the real terminal.
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll_event(&mut self, _frame: u64) -> io::Result<Option<Event>> {
        if event::poll(Duration::ZERO).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
            let event = event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?;
            Ok(Some(event))
        } else {
            Ok(None)
        }
    }
}

// --- SimulatedInput for debugging and tests ---
pub struct SimulatedInput {
    events: HashMap<u64, VecDeque<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput {
            events: events.into_iter().map(|(frame, list)| (frame, list.into())).collect(),
        }
    }

    pub fn push(&mut self, frame: u64, event: Event) {
        self.events.entry(frame).or_default().push_back(event);
    }

    pub fn is_exhausted(&self) -> bool {
        self.events.values().all(VecDeque::is_empty)
    }
}

impl EventSource for SimulatedInput {
    fn poll_event(&mut self, frame: u64) -> io::Result<Option<Event>> {
        Ok(self.events.get_mut(&frame).and_then(VecDeque::pop_front))
    }
}

/// Turns raw terminal events into per-frame input. Movement is level-triggered through a
/// per-key "last seen" frame, firing is edge-triggered per press.
pub struct InputState {
    key_frame: HashMap<KeyCode, u64>,
    /// Set when the terminal sends release events; keys then stay held until released.
    reports_releases: bool,
    pointer: Vector2D,
    columns: u16,
    rows: u16,
    playfield: Playfield,
}

impl InputState {
    pub fn new(columns: u16, rows: u16, playfield: Playfield, reports_releases: bool) -> Self {
        InputState {
            key_frame: HashMap::new(),
            reports_releases,
            pointer: playfield.center(),
            columns,
            rows,
            playfield,
        }
    }

    pub fn pointer(&self) -> Vector2D {
        self.pointer
    }

    /// Drains every event queued for `frame`.
    pub fn collect(&mut self, source: &mut dyn EventSource, frame: u64) -> io::Result<FrameInput> {
        let mut input = FrameInput::idle(self.pointer);
        while let Some(event) = source.poll_event(frame)? {
            self.handle_event(event, frame, &mut input);
        }
        input.pointer = self.pointer;
        input.held = self.held(frame);
        Ok(input)
    }

    pub fn handle_event(&mut self, event: Event, frame: u64, input: &mut FrameInput) {
        match event {
            Event::Key(key_event) => self.handle_key(key_event, frame, input),
            Event::Mouse(mouse) => {
                self.pointer = self.cell_to_playfield(mouse.column, mouse.row);
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    input.fire_presses += 1;
                }
            }
            Event::Resize(columns, rows) => {
                self.columns = columns;
                self.rows = rows;
                input.resized = Some((columns, rows));
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key_event: KeyEvent, frame: u64, input: &mut FrameInput) {
        let code = normalize_key(key_event.code);
        match key_event.kind {
            KeyEventKind::Press => {
                self.key_frame.insert(code, frame);
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => input.quit = true,
                    KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => input.quit = true,
                    KeyCode::Char(' ') => input.fire_presses += 1,
                    _ => {}
                }
            }
            KeyEventKind::Repeat => {
                self.key_frame.insert(code, frame);
            }
            KeyEventKind::Release => {
                self.key_frame.remove(&code);
            }
        }
    }

    fn is_held(&self, key: KeyCode, frame: u64) -> bool {
        self.key_frame
            .get(&key)
            .is_some_and(|&seen| self.reports_releases || frame.saturating_sub(seen) < HOLD_WINDOW_FRAMES)
    }

    pub fn held(&self, frame: u64) -> HeldDirections {
        HeldDirections {
            up: self.is_held(KeyCode::Char('w'), frame) || self.is_held(KeyCode::Up, frame),
            down: self.is_held(KeyCode::Char('s'), frame) || self.is_held(KeyCode::Down, frame),
            left: self.is_held(KeyCode::Char('a'), frame) || self.is_held(KeyCode::Left, frame),
            right: self.is_held(KeyCode::Char('d'), frame) || self.is_held(KeyCode::Right, frame),
        }
    }

    /// Center of terminal cell (`column`, `row`) in playfield units.
    pub fn cell_to_playfield(&self, column: u16, row: u16) -> Vector2D {
        let columns = self.columns.max(1) as f64;
        let rows = self.rows.max(1) as f64;
        Vector2D::new(
            (column as f64 + 0.5) * self.playfield.width / columns,
            (row as f64 + 0.5) * self.playfield.height / rows,
        )
    }
}

fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
