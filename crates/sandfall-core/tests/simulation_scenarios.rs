//! End-to-end scenarios for the simulation core
//!
//! These drive `Simulation` and the physics step through whole runs on the
//! default 800x800 domain and check the pile invariants tick by tick.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use sandfall_core::{
    Entity, Frame, Grid, InputEvent, NoopStats, ParticleState, ParticleStore, PhysicsStep,
    PointerEvent, Position, SimConfig, Simulation, Velocity,
};

fn seeded(config: SimConfig) -> Simulation<Xoshiro256StarStar> {
    Simulation::with_rng(config, Xoshiro256StarStar::seed_from_u64(2024)).unwrap()
}

/// Drop a single particle with no initial velocity and run until it lands
fn drop_particle(
    store: &mut ParticleStore,
    occupancy: &mut Grid,
    settlement: &mut Grid,
    config: &SimConfig,
    x: f32,
    y: f32,
) -> (Entity, usize) {
    let mut step = PhysicsStep::new();
    let entity = store.spawn(Position::new(x, y), Velocity::ZERO);
    occupancy.set(x as usize, y as usize);

    for ticks in 1..=2_000 {
        step.run(store, occupancy, settlement, config, &mut NoopStats);
        if store.state(entity) == Some(ParticleState::Settled) {
            return (entity, ticks);
        }
    }
    panic!("particle never settled");
}

// ============================================================================
// Landing scenarios
// ============================================================================

#[test]
fn test_particle_falls_to_floor_of_empty_column() {
    let config = SimConfig::default();
    let mut store = ParticleStore::new();
    let mut occupancy = Grid::new(config.width, config.height);
    let mut settlement = Grid::new(config.width, config.height);

    let (entity, ticks) = drop_particle(
        &mut store,
        &mut occupancy,
        &mut settlement,
        &config,
        400.0,
        0.0,
    );

    assert_eq!(store.position(entity), Some(Position::new(400.0, 799.0)));
    assert!(settlement.is_set(400, 799));
    assert!(occupancy.is_set(400, 799));
    assert_eq!(occupancy.count_set(), 1);
    // Terminal velocity after half a second, then 4 cells per tick
    assert!(ticks > 150 && ticks < 300, "settled after {ticks} ticks");
}

#[test]
fn test_followers_land_beside_first_particle() {
    let config = SimConfig::default();
    let mut store = ParticleStore::new();
    let mut occupancy = Grid::new(config.width, config.height);
    let mut settlement = Grid::new(config.width, config.height);

    let rests: Vec<Position> = (0..3)
        .map(|_| {
            let (entity, _) = drop_particle(
                &mut store,
                &mut occupancy,
                &mut settlement,
                &config,
                400.0,
                0.0,
            );
            store.position(entity).unwrap()
        })
        .collect();

    // The second enters the settled cell mid-fall; both neighbours are free
    // and column 399 is odd, so it goes right. The third finds 401 taken.
    assert_eq!(
        rests,
        vec![
            Position::new(400.0, 799.0),
            Position::new(401.0, 799.0),
            Position::new(399.0, 799.0),
        ]
    );
    assert_eq!(settlement.count_set(), 3);
}

#[test]
fn test_particle_crossing_floor_stacks_on_settled_bottom() {
    let config = SimConfig::default();
    let mut store = ParticleStore::new();
    let mut occupancy = Grid::new(config.width, config.height);
    let mut settlement = Grid::new(config.width, config.height);
    settlement.set(400, 799);
    occupancy.set(400, 799);

    // At terminal velocity from row 798 the next position is past the floor
    let entity = store.spawn(
        Position::new(400.0, 798.5),
        Velocity::new(0.0, config.max_velocity),
    );
    occupancy.set(400, 798);
    PhysicsStep::new().run(
        &mut store,
        &mut occupancy,
        &mut settlement,
        &config,
        &mut NoopStats,
    );

    assert_eq!(store.state(entity), Some(ParticleState::Settled));
    assert_eq!(store.position(entity), Some(Position::new(400.0, 798.0)));
    assert!(settlement.is_set(400, 798));
    assert!(settlement.is_set(400, 799));
}

// ============================================================================
// Spawn scenarios
// ============================================================================

#[test]
fn test_immediate_respawn_on_same_cell_is_rejected() {
    let mut sim = seeded(SimConfig::default());

    let first = sim.tick(Some(PointerEvent::press(400.0, 0.0).into()));
    assert!(first.spawned.is_some());

    // The first particle is still inside cell (400, 0) after one tick unless
    // it jittered out; either way the occupancy check decides.
    let occupied = sim.occupancy().is_set(400, 0);
    let second = sim.tick(None);
    assert_eq!(second.spawned.is_some(), !occupied);
}

#[test]
fn test_press_then_release_is_active_for_one_tick() {
    let mut sim = seeded(SimConfig::default());

    let press = sim.tick(Some(PointerEvent::press(100.0, 100.0).into()));
    assert!(sim.source().is_active());
    assert!(press.spawned.is_some());

    let release = sim.tick(Some(PointerEvent::release(100.0, 100.0).into()));
    assert!(!sim.source().is_active());
    assert!(release.spawned.is_none());
    assert_eq!(sim.live(), 1);
}

#[test]
fn test_spawn_ceiling_is_respected() {
    let config = SimConfig {
        max_particles: 5,
        ..SimConfig::default()
    };
    let mut sim = seeded(config);

    sim.tick(Some(PointerEvent::press(10.0, 10.0).into()));
    let mut x = 10.0;
    for _ in 0..200 {
        // Keep the pointer moving so the spawn cell is always fresh
        x += 3.0;
        sim.tick(Some(PointerEvent::moved(x, 10.0).into()));
    }

    assert_eq!(sim.live(), 5);
    assert_eq!(sim.counters().spawned, 5);
}

// ============================================================================
// Pile invariants
// ============================================================================

#[test]
fn test_pile_invariants_hold_every_tick() {
    let config = SimConfig {
        compact_interval_ticks: 0,
        ..SimConfig::with_domain(64, 64)
    };
    let mut sim = seeded(config);
    let mut rest_positions: HashMap<Entity, Position> = HashMap::new();

    sim.tick(Some(PointerEvent::press(32.0, 2.0).into()));
    for tick in 0..1_500 {
        // Sweep the pointer back and forth across the middle of the domain
        let x = 20.0 + (tick % 24) as f32;
        let event = if tick % 3 == 0 {
            Some(PointerEvent::moved(x, 2.0).into())
        } else {
            None
        };
        sim.tick(event);

        let store = sim.store();
        let mut settled_cells = HashMap::new();
        for entity in store.settled() {
            let p = store.position(entity).unwrap();
            let cell = p.cell();

            // Settled particles sit on a cell marked in both grids
            assert!(sim.settlement().is_set(cell.0, cell.1));
            assert!(sim.occupancy().is_set(cell.0, cell.1));
            assert!(store.velocity(entity).is_none());

            // No two settled particles share a cell
            assert!(settled_cells.insert(cell, entity).is_none());

            // Settlement is terminal
            let first_rest = *rest_positions.entry(entity).or_insert(p);
            assert_eq!(first_rest, p);
        }

        for entity in store.falling() {
            let v = store.velocity(entity).unwrap();
            assert!(v.y <= sim.config().max_velocity);
        }

        assert_eq!(sim.settlement().count_set(), store.settled_count());
    }

    assert!(sim.store().settled_count() > 50);

    // Once columns fill up to the spawn row, later landings are discarded
    let stats = sim.frame_stats();
    assert!(stats.discarded > 0);
    assert_eq!(stats.discarded, sim.counters().discarded);
    assert_eq!(stats.live as u64, stats.spawned - stats.discarded);
    assert_eq!(sim.store().len(), stats.live);
}

#[test]
fn test_reset_event_empties_world() {
    let mut sim = seeded(SimConfig::with_domain(32, 32));
    sim.tick(Some(PointerEvent::press(16.0, 4.0).into()));
    for _ in 0..100 {
        sim.tick(None);
    }
    assert!(sim.settlement().count_set() > 0);

    sim.tick(Some(InputEvent::Reset));
    assert_eq!(sim.live(), 0);
    assert_eq!(sim.occupancy().count_set(), 0);
    assert_eq!(sim.settlement().count_set(), 0);
}

// ============================================================================
// Threaded loop
// ============================================================================

#[test]
fn test_threaded_loop_publishes_frames() {
    let redraws = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&redraws);

    let handle = sandfall_core::spawn(
        SimConfig::with_domain(64, 64),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .unwrap();

    assert!(handle.sender().send(PointerEvent::press(32.0, 8.0)));

    let bridge = Arc::clone(handle.bridge());
    let mut frame = Frame::new(64, 64);
    let mut sequence = 0;
    for _ in 0..200 {
        std::thread::sleep(Duration::from_millis(10));
        sequence = bridge.read_into(&mut frame);
        if sequence > 3 && frame.stats.live > 0 {
            break;
        }
    }

    handle.shutdown().expect("simulation thread panicked");

    assert!(sequence > 0);
    assert!(frame.stats.live > 0);
    assert!(frame.grid.count_set() > 0);
    assert!(redraws.load(Ordering::SeqCst) as u64 >= sequence);
}
