//! Spawn decision and particle creation

use crate::ecs::{Entity, ParticleStore, Position, Velocity};
use crate::grid::Grid;
use crate::rng::SimRng;
use crate::source::Source;
use crate::stats::SimStats;

/// Whether the source may emit a particle this tick
///
/// Requires an active source, a free occupancy cell under the pointer, and
/// room below the particle ceiling.
pub fn should_spawn(source: &Source, occupancy: &Grid, live: usize, max_particles: usize) -> bool {
    if !source.is_active() || live >= max_particles {
        return false;
    }
    let (x, y) = source.cell();
    !occupancy.is_set(x, y)
}

/// Create one falling particle at the source position
///
/// Does not check occupancy or the ceiling; see [`try_spawn`].
pub fn spawn_sand<R: SimRng + ?Sized>(
    store: &mut ParticleStore,
    source: &mut Source,
    dt: f32,
    rng: &mut R,
) -> Entity {
    let velocity = source.emit_velocity(dt, rng);
    store.spawn(Position::from(source.position()), Velocity::from(velocity))
}

/// Run the spawn decision and, if it passes, create and register a particle
///
/// Marks the spawn cell in the occupancy grid and bumps `live`.
#[allow(clippy::too_many_arguments)]
pub fn try_spawn<R: SimRng + ?Sized>(
    store: &mut ParticleStore,
    occupancy: &mut Grid,
    source: &mut Source,
    live: &mut usize,
    max_particles: usize,
    dt: f32,
    rng: &mut R,
    stats: &mut dyn SimStats,
) -> Option<Entity> {
    if !should_spawn(source, occupancy, *live, max_particles) {
        return None;
    }

    let entity = spawn_sand(store, source, dt, rng);
    let (x, y) = source.cell();
    occupancy.set(x, y);
    *live += 1;
    stats.record_spawned();
    Some(entity)
}
