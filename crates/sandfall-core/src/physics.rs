//! Per-tick particle physics and pile settlement
//!
//! Falling particles integrate gravity and velocity, reflect off the side
//! walls and ceiling, and come to rest when they reach the floor or enter a
//! cell of the settlement field. Resting cells are resolved against the
//! settlement field only; the occupancy grid just follows particles around.

use crate::config::SimConfig;
use crate::ecs::{Entity, ParticleStore, Position, Velocity};
use crate::grid::Grid;
use crate::stats::SimStats;

/// What happened to one particle during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    /// Still falling, now at the given position
    Moved(Position),
    /// At rest in the given cell
    Settled(usize, usize),
    /// No free cell left in the landing column
    Discarded,
}

/// Totals for one physics step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub moved: usize,
    pub settled: usize,
    pub discarded: usize,
}

/// Physics step over every falling particle
///
/// Holds a scratch list of handles so the store can be mutated while
/// walking the falling set.
#[derive(Debug, Default)]
pub struct PhysicsStep {
    scratch: Vec<Entity>,
}

impl PhysicsStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every falling particle by one tick of `config.dt()`
    pub fn run(
        &mut self,
        store: &mut ParticleStore,
        occupancy: &mut Grid,
        settlement: &mut Grid,
        config: &SimConfig,
        stats: &mut dyn SimStats,
    ) -> StepReport {
        let mut report = StepReport::default();

        self.scratch.clear();
        self.scratch.extend(store.falling());

        for &entity in &self.scratch {
            let Some((old_cell, outcome)) = integrate(store, entity, settlement, config) else {
                continue;
            };

            // A settled cell is never released, even if a falling particle
            // passed through it on the same tick it was claimed.
            let (ox, oy) = old_cell;
            if !settlement.is_set(ox, oy) {
                occupancy.clear(ox, oy);
            }

            match outcome {
                Outcome::Moved(next) => {
                    let (nx, ny) = next.cell();
                    occupancy.set(nx, ny);
                    report.moved += 1;
                    stats.record_moved();
                }
                Outcome::Settled(x, y) => {
                    settlement.set(x, y);
                    occupancy.set(x, y);
                    store.settle(entity, Position::new(x as f32, y as f32));
                    report.settled += 1;
                    stats.record_settled();
                }
                Outcome::Discarded => {
                    log::debug!("{} found no rest cell in column {}", entity, ox);
                    store.despawn(entity);
                    report.discarded += 1;
                    stats.record_discarded();
                }
            }
        }

        report
    }
}

/// Integrate one falling particle and decide where it ends up
///
/// Commits position and velocity for a particle that keeps falling; for a
/// landing the caller settles the entity. Returns the particle's cell before
/// the tick along with the outcome.
fn integrate(
    store: &mut ParticleStore,
    entity: Entity,
    settlement: &Grid,
    config: &SimConfig,
) -> Option<((usize, usize), Outcome)> {
    let (position, velocity) = store.motion_mut(entity)?;
    let old_cell = position.cell();
    let dt = config.dt();
    let width = config.width as f32;
    let height = config.height as f32;

    velocity.y = (velocity.y + config.gravity * dt).min(config.max_velocity);

    let mut next_x = position.x + velocity.x * dt;
    let mut next_y = position.y + velocity.y * dt;

    if next_x < 0.0 {
        velocity.x = -velocity.x;
        next_x = 0.0;
    } else if next_x >= width {
        velocity.x = -velocity.x;
        next_x = width - 1.0;
    }

    if next_y < 0.0 {
        velocity.y = -velocity.y;
        next_y = 0.0;
    }

    let outcome = if next_y >= height {
        let x = next_x as usize;
        match floor_rest_cell(settlement, x) {
            Some((x, y)) => Outcome::Settled(x, y),
            None => Outcome::Discarded,
        }
    } else {
        let (x, y) = (next_x as usize, next_y as usize);
        if settlement.is_set(x, y) {
            match collision_rest_cell(settlement, x, y) {
                Some((x, y)) => Outcome::Settled(x, y),
                None => Outcome::Discarded,
            }
        } else {
            Outcome::Moved(Position::new(next_x, next_y))
        }
    };

    match outcome {
        Outcome::Moved(next) => *position = next,
        Outcome::Settled(..) | Outcome::Discarded => *velocity = Velocity::ZERO,
    }

    Some((old_cell, outcome))
}

/// Rest cell for a particle that hit the world floor in column `x`
///
/// Stacks on top of whatever has already settled at the bottom of the
/// column. `None` if the column is full.
pub fn floor_rest_cell(settlement: &Grid, x: usize) -> Option<(usize, usize)> {
    let bottom = settlement.height().checked_sub(1)?;
    climb(settlement, x, bottom).map(|y| (x, y))
}

/// Rest cell for a particle that entered the settled cell `(x, y)`
///
/// Looks at the left and right neighbours on row `y`:
/// both settled moves one row up, neither settled picks a side by the
/// parity of the left column (even goes left), and exactly one settled
/// goes to the other. From the chosen cell the particle then slides down
/// through free cells, or climbs if the chosen cell is itself settled.
/// `None` if the climb runs off the top of the domain.
pub fn collision_rest_cell(settlement: &Grid, x: usize, y: usize) -> Option<(usize, usize)> {
    let last_column = settlement.width() - 1;
    let left = x.saturating_sub(1);
    let right = (x + 1).min(last_column);

    let (column, row) = match (settlement.is_set(left, y), settlement.is_set(right, y)) {
        (true, true) => (x, y.checked_sub(1)?),
        (false, false) if left % 2 == 0 => (left, y),
        (false, false) => (right, y),
        (true, false) => (right, y),
        (false, true) => (left, y),
    };

    if settlement.is_set(column, row) {
        climb(settlement, column, row).map(|r| (column, r))
    } else {
        Some((column, slide_down(settlement, column, row)))
    }
}

/// First free row at or above `y` in column `x`
fn climb(settlement: &Grid, x: usize, mut y: usize) -> Option<usize> {
    while settlement.is_set(x, y) {
        y = y.checked_sub(1)?;
    }
    Some(y)
}

/// Lowest free row reachable from free cell `(x, y)` without crossing a settled cell
fn slide_down(settlement: &Grid, x: usize, mut y: usize) -> usize {
    while y + 1 < settlement.height() && !settlement.is_set(x, y + 1) {
        y += 1;
    }
    y
}
