//! Column store for particles

use super::components::{ComponentSet, ParticleState, Position, Velocity};
use super::entity::Entity;

/// Particle store with one column per component kind
///
/// A slot is live while its presence mask is non-empty. Despawned slots go
/// on a free list and are reused with a bumped generation.
#[derive(Debug, Default)]
pub struct ParticleStore {
    generations: Vec<u32>,
    presence: Vec<ComponentSet>,
    positions: Vec<Position>,
    velocities: Vec<Velocity>,
    free_slots: Vec<u32>,
    live: usize,
    falling: usize,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a falling particle
    pub fn spawn(&mut self, position: Position, velocity: Velocity) -> Entity {
        self.live += 1;
        self.falling += 1;

        if let Some(index) = self.free_slots.pop() {
            let slot = index as usize;
            self.generations[slot] = self.generations[slot].wrapping_add(1);
            self.presence[slot] = ComponentSet::SPAWNED;
            self.positions[slot] = position;
            self.velocities[slot] = velocity;
            return Entity::new(index, self.generations[slot]);
        }

        // Generations outlive truncated slots so stale handles never resolve
        let slot = self.presence.len();
        if slot < self.generations.len() {
            self.generations[slot] = self.generations[slot].wrapping_add(1);
        } else {
            self.generations.push(0);
        }
        self.presence.push(ComponentSet::SPAWNED);
        self.positions.push(position);
        self.velocities.push(velocity);
        Entity::new(slot as u32, self.generations[slot])
    }

    /// Resolve a handle to its slot if it still refers to a live particle
    fn slot(&self, entity: Entity) -> Option<usize> {
        let slot = entity.index();
        (slot < self.presence.len()
            && self.generations[slot] == entity.generation()
            && !self.presence[slot].is_empty())
        .then_some(slot)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Components currently carried by `entity` (empty if dead)
    pub fn components(&self, entity: Entity) -> ComponentSet {
        self.slot(entity)
            .map(|slot| self.presence[slot])
            .unwrap_or_default()
    }

    pub fn state(&self, entity: Entity) -> Option<ParticleState> {
        self.slot(entity)
            .map(|slot| ParticleState::from_components(self.presence[slot]))
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.slot(entity).map(|slot| self.positions[slot])
    }

    /// Velocity, present only while the particle is falling
    pub fn velocity(&self, entity: Entity) -> Option<Velocity> {
        let slot = self.slot(entity)?;
        self.presence[slot]
            .contains(ComponentSet::VELOCITY)
            .then(|| self.velocities[slot])
    }

    /// Mutable position and velocity of a falling particle
    pub fn motion_mut(&mut self, entity: Entity) -> Option<(&mut Position, &mut Velocity)> {
        let slot = self.slot(entity)?;
        if !self.presence[slot].contains(ComponentSet::FALLING | ComponentSet::VELOCITY) {
            return None;
        }
        Some((&mut self.positions[slot], &mut self.velocities[slot]))
    }

    /// Pin a falling particle at `rest` and drop its velocity and falling tag
    ///
    /// Returns false if the entity is dead or already settled.
    pub fn settle(&mut self, entity: Entity, rest: Position) -> bool {
        let Some(slot) = self.slot(entity) else {
            return false;
        };
        if !self.presence[slot].contains(ComponentSet::FALLING) {
            return false;
        }
        self.positions[slot] = rest;
        self.velocities[slot] = Velocity::ZERO;
        self.presence[slot].remove(ComponentSet::FALLING | ComponentSet::VELOCITY);
        self.falling -= 1;
        true
    }

    /// Remove a particle and free its slot
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.slot(entity) else {
            return false;
        };
        if self.presence[slot].contains(ComponentSet::FALLING) {
            self.falling -= 1;
        }
        self.presence[slot] = ComponentSet::empty();
        self.free_slots.push(slot as u32);
        self.live -= 1;
        true
    }

    /// Handles of every falling particle, in slot order
    pub fn falling(&self) -> impl Iterator<Item = Entity> + '_ {
        self.presence
            .iter()
            .enumerate()
            .filter(|(_, set)| set.contains(ComponentSet::FALLING))
            .map(|(slot, _)| Entity::new(slot as u32, self.generations[slot]))
    }

    /// Handles of every settled particle, in slot order
    pub fn settled(&self) -> impl Iterator<Item = Entity> + '_ {
        self.presence
            .iter()
            .enumerate()
            .filter(|(_, set)| !set.is_empty() && !set.contains(ComponentSet::FALLING))
            .map(|(slot, _)| Entity::new(slot as u32, self.generations[slot]))
    }

    /// Despawn every settled particle, returning how many were reclaimed
    ///
    /// Settled particles stay visible through the grids, so this only frees
    /// bookkeeping. Trailing free slots are truncated off the columns.
    pub fn compact_settled(&mut self) -> usize {
        let settled: Vec<Entity> = self.settled().collect();
        for &entity in &settled {
            self.despawn(entity);
        }

        let keep = self
            .presence
            .iter()
            .rposition(|set| !set.is_empty())
            .map_or(0, |last| last + 1);
        if keep < self.presence.len() {
            self.presence.truncate(keep);
            self.positions.truncate(keep);
            self.velocities.truncate(keep);
            self.free_slots.retain(|&slot| (slot as usize) < keep);
        }

        settled.len()
    }

    /// Drop every particle; handles issued before the clear stay dead
    pub fn clear(&mut self) {
        self.presence.clear();
        self.positions.clear();
        self.velocities.clear();
        self.free_slots.clear();
        self.live = 0;
        self.falling = 0;
    }

    /// Live particles, falling and settled
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn falling_count(&self) -> usize {
        self.falling
    }

    pub fn settled_count(&self) -> usize {
        self.live - self.falling
    }

    /// Allocated slots, live or free
    pub fn slot_capacity(&self) -> usize {
        self.presence.len()
    }
}
