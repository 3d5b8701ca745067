//! Pointer-driven particle source

use glam::Vec2;

use crate::rng::SimRng;

/// Phase of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Move,
    Release,
}

/// Pointer activity in domain coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, kind: PointerKind) -> Self {
        Self { x, y, kind }
    }

    pub fn press(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerKind::Press)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerKind::Move)
    }

    pub fn release(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerKind::Release)
    }
}

/// Messages from the window thread to the simulation thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    /// Drop every particle and clear both grids
    Reset,
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

/// Emitter state driven by pointer events
///
/// `previous` is updated on every pointer event, not every tick, so the
/// displacement used for emission spans the two most recent events.
#[derive(Debug, Clone)]
pub struct Source {
    previous: Vec2,
    current: Vec2,
    velocity: Vec2,
    active: bool,
    bounds: Vec2,
}

impl Source {
    /// Source for a `width` x `height` domain, idle at the origin
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            previous: Vec2::ZERO,
            current: Vec2::ZERO,
            velocity: Vec2::ZERO,
            active: false,
            bounds: Vec2::new(
                width.saturating_sub(1) as f32,
                height.saturating_sub(1) as f32,
            ),
        }
    }

    /// Fold one pointer event into the source
    ///
    /// A press activates, a release deactivates, and a move keeps the
    /// current activity.
    pub fn apply(&mut self, event: &PointerEvent) {
        self.previous = self.current;
        self.current = Vec2::new(event.x, event.y).clamp(Vec2::ZERO, self.bounds);
        self.active = (self.active || event.kind == PointerKind::Press)
            && event.kind != PointerKind::Release;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> Vec2 {
        self.current
    }

    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    /// Velocity handed to the most recently spawned particle
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Grid cell under the pointer
    pub fn cell(&self) -> (usize, usize) {
        (self.current.x as usize, self.current.y as usize)
    }

    /// Derive the emission velocity from pointer displacement plus jitter
    ///
    /// Both the displacement and the jitter are halved, so a still pointer
    /// emits at up to half a cell per tick in either direction on each axis.
    pub fn emit_velocity<R: SimRng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Vec2 {
        let displacement = self.current - self.previous;
        let jitter = Vec2::new(rng.jitter(), rng.jitter());
        self.velocity = (displacement + jitter) / dt / 2.0;
        self.velocity
    }

    /// Return to the idle state at the origin
    pub fn reset(&mut self) {
        self.previous = Vec2::ZERO;
        self.current = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.active = false;
    }
}
