//! Particle components

use bitflags::bitflags;
use glam::Vec2;

/// Sub-cell location in domain pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Grid cell containing this position (truncation, not rounding)
    #[inline]
    pub fn cell(&self) -> (usize, usize) {
        (self.x as usize, self.y as usize)
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// Velocity in px/s
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for Velocity {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

bitflags! {
    /// Which components an entity currently carries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ComponentSet: u8 {
        const POSITION = 1 << 0;
        const VELOCITY = 1 << 1;
        /// Presence-only tag: still in free motion
        const FALLING = 1 << 2;
    }
}

impl ComponentSet {
    /// Components of a freshly spawned particle
    pub const SPAWNED: ComponentSet = ComponentSet::POSITION
        .union(ComponentSet::VELOCITY)
        .union(ComponentSet::FALLING);
}

/// Motion state of a live particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleState {
    /// Integrated by the physics step every tick
    Falling,
    /// At rest; position is final
    Settled,
}

impl ParticleState {
    pub fn from_components(components: ComponentSet) -> Self {
        if components.contains(ComponentSet::FALLING) {
            ParticleState::Falling
        } else {
            ParticleState::Settled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_truncates() {
        assert_eq!(Position::new(3.99, 0.5).cell(), (3, 0));
        assert_eq!(Position::new(0.0, 799.9).cell(), (0, 799));
    }

    #[test]
    fn test_spawned_set() {
        let set = ComponentSet::SPAWNED;
        assert!(set.contains(ComponentSet::POSITION));
        assert!(set.contains(ComponentSet::VELOCITY));
        assert!(set.contains(ComponentSet::FALLING));
        assert_eq!(ParticleState::from_components(set), ParticleState::Falling);
        assert_eq!(
            ParticleState::from_components(ComponentSet::POSITION),
            ParticleState::Settled
        );
    }

    #[test]
    fn test_from_vec2() {
        let p: Position = Vec2::new(1.5, 2.5).into();
        assert_eq!(p, Position::new(1.5, 2.5));
        let v: Velocity = Vec2::new(-1.0, 4.0).into();
        assert_eq!(v, Velocity::new(-1.0, 4.0));
    }
}
