//! Fixed-rate simulation loop
//!
//! [`Simulation`] holds the authoritative state and advances it one tick at
//! a time. [`spawn`] runs it on a dedicated thread that drains at most one
//! input event per tick, publishes the occupancy grid on a slower timer, and
//! sleeps until the next tick deadline.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use web_time::Instant;

use crate::bridge::{FrameStats, Publisher, RedrawSignal, RenderBridge};
use crate::config::SimConfig;
use crate::ecs::{Entity, ParticleStore};
use crate::error::{ConfigResult, SimError};
use crate::grid::Grid;
use crate::physics::{PhysicsStep, StepReport};
use crate::rng::SimRng;
use crate::source::{InputEvent, PointerEvent, Source};
use crate::spawn::try_spawn;
use crate::stats::TickCounters;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Option<Entity>,
    pub step: StepReport,
    /// Settled entities dropped from the store by compaction
    pub compacted: usize,
}

/// Authoritative simulation state
pub struct Simulation<R = StdRng> {
    config: SimConfig,
    store: ParticleStore,
    occupancy: Grid,
    settlement: Grid,
    source: Source,
    physics: PhysicsStep,
    rng: R,
    live: usize,
    tick: u64,
    counters: TickCounters,
}

impl Simulation<StdRng> {
    /// Create a simulation seeded from OS entropy
    pub fn new(config: SimConfig) -> ConfigResult<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: SimRng> Simulation<R> {
    /// Create a simulation with an explicit random source
    pub fn with_rng(config: SimConfig, rng: R) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            store: ParticleStore::new(),
            occupancy: Grid::new(config.width, config.height),
            settlement: Grid::new(config.width, config.height),
            source: Source::new(config.width, config.height),
            physics: PhysicsStep::new(),
            rng,
            live: 0,
            tick: 0,
            counters: TickCounters::default(),
            config,
        })
    }

    /// Apply one input event
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer(pointer) => self.source.apply(&pointer),
            InputEvent::Reset => self.reset(),
        }
    }

    /// Advance one tick: apply `event`, maybe spawn, then run physics
    pub fn tick(&mut self, event: Option<InputEvent>) -> TickReport {
        if let Some(event) = event {
            self.handle_event(event);
        }

        let spawned = try_spawn(
            &mut self.store,
            &mut self.occupancy,
            &mut self.source,
            &mut self.live,
            self.config.max_particles,
            self.config.dt(),
            &mut self.rng,
            &mut self.counters,
        );

        let step = self.physics.run(
            &mut self.store,
            &mut self.occupancy,
            &mut self.settlement,
            &self.config,
            &mut self.counters,
        );
        self.live -= step.discarded;

        self.tick += 1;

        let mut compacted = 0;
        let interval = self.config.compact_interval_ticks;
        if interval > 0 && self.tick % interval == 0 {
            compacted = self.store.compact_settled();
            if compacted > 0 {
                log::debug!(
                    "Compacted {} settled particles at tick {} ({} slots remain)",
                    compacted,
                    self.tick,
                    self.store.slot_capacity()
                );
            }
        }

        TickReport {
            spawned,
            step,
            compacted,
        }
    }

    /// Drop every particle and clear both grids and the source
    pub fn reset(&mut self) {
        log::info!("Resetting simulation ({} particles removed)", self.live);
        self.store.clear();
        self.occupancy.reset_all();
        self.settlement.reset_all();
        self.source.reset();
        self.live = 0;
        self.counters = TickCounters::default();
    }

    /// Counters for the render side
    pub fn frame_stats(&self) -> FrameStats {
        let falling = self.store.falling_count();
        FrameStats {
            tick: self.tick,
            live: self.live,
            falling,
            settled: self.live - falling,
            spawned: self.counters.spawned,
            discarded: self.counters.discarded,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Cells held by any particle, falling or settled
    pub fn occupancy(&self) -> &Grid {
        &self.occupancy
    }

    /// Cells held by settled particles
    pub fn settlement(&self) -> &Grid {
        &self.settlement
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Live particles, including settled ones compacted out of the store
    pub fn live(&self) -> usize {
        self.live
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn counters(&self) -> TickCounters {
        self.counters
    }
}

/// Deadline timer that skips missed periods instead of bursting
#[derive(Debug, Clone, Copy)]
struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    /// True once per elapsed period
    fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.advance(now);
        true
    }

    /// Sleep until the next deadline, then schedule the one after
    fn wait(&mut self) {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        }
        self.advance(Instant::now());
    }

    fn advance(&mut self, now: Instant) {
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
    }
}

/// Run the fixed-tick loop until `events` disconnects
pub fn run_loop<R: SimRng>(
    mut simulation: Simulation<R>,
    events: Receiver<InputEvent>,
    mut publisher: Publisher,
) {
    let config = simulation.config().clone();
    log::info!(
        "Simulation running: {}x{} cells, {} ticks/s, publishing {}/s",
        config.width,
        config.height,
        config.sim_rate,
        config.publish_rate
    );

    let start = Instant::now();
    let mut tick_timer = Ticker::new(config.tick_period(), start);
    let mut publish_timer = Ticker::new(config.publish_period(), start);

    loop {
        let event = match events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => break,
        };

        simulation.tick(event);

        if publish_timer.poll(Instant::now()) {
            let stats = simulation.frame_stats();
            let sequence = publisher.publish(simulation.occupancy(), stats);
            if sequence % u64::from(config.publish_rate) == 0 {
                log::debug!(
                    "Published frame {} at tick {}: {} live, {} falling",
                    sequence,
                    stats.tick,
                    stats.live,
                    stats.falling
                );
            }
        }

        tick_timer.wait();
    }

    log::info!("Simulation stopped after {} ticks", simulation.tick_count());
}

/// Window-side end of the input queue
#[derive(Debug, Clone)]
pub struct EventSender {
    events: SyncSender<InputEvent>,
}

impl EventSender {
    /// Queue an event without blocking; returns false if it was dropped
    pub fn send(&self, event: impl Into<InputEvent>) -> bool {
        match self.events.try_send(event.into()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Simulation thread is gone; input dropped");
                false
            }
        }
    }
}

/// Window-side forwarding that keeps press, release and reset in order
///
/// Edges that find the queue full are parked and retried before anything
/// newer is sent, so a release can never be overtaken by an older press.
/// Consecutive parked pointer edges collapse to the newest one, which
/// carries the latch state the user last chose.
#[derive(Debug, Default)]
pub struct InputForwarder {
    pending: VecDeque<InputEvent>,
}

impl InputForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a press, release or reset behind any parked edges
    pub fn send_edge(&mut self, sender: &EventSender, event: InputEvent) {
        let collapses = matches!(
            (self.pending.back(), &event),
            (Some(InputEvent::Pointer(_)), InputEvent::Pointer(_))
                | (Some(InputEvent::Reset), InputEvent::Reset)
        );
        if collapses {
            self.pending.pop_back();
        }
        self.pending.push_back(event);

        if self.flush(sender) > 0 {
            log::debug!("Input queue full, {} edge(s) parked", self.pending.len());
        }
    }

    /// Queue a move; dropped while edges are parked or the queue is full
    pub fn send_move(&mut self, sender: &EventSender, event: PointerEvent) -> bool {
        if self.flush(sender) > 0 {
            return false;
        }
        sender.send(event)
    }

    /// Send parked edges in order; returns how many are still parked
    pub fn flush(&mut self, sender: &EventSender) -> usize {
        while let Some(&event) = self.pending.front() {
            if !sender.send(event) {
                break;
            }
            self.pending.pop_front();
        }
        self.pending.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Handle to a running simulation thread
pub struct SimulationHandle {
    sender: EventSender,
    bridge: Arc<RenderBridge>,
    thread: JoinHandle<()>,
}

impl SimulationHandle {
    pub fn sender(&self) -> &EventSender {
        &self.sender
    }

    pub fn bridge(&self) -> &Arc<RenderBridge> {
        &self.bridge
    }

    /// Close the input queue and wait for the loop to exit
    pub fn shutdown(self) -> thread::Result<()> {
        drop(self.sender);
        self.thread.join()
    }
}

/// Start the simulation on its own thread
///
/// `signal` is invoked after every publish.
pub fn spawn(config: SimConfig, signal: Box<dyn RedrawSignal>) -> Result<SimulationHandle, SimError> {
    config.validate()?;

    let bridge = RenderBridge::new(config.width, config.height);
    let publisher = bridge.publisher(signal);
    let (tx, rx) = mpsc::sync_channel(config.event_queue_capacity);

    let thread = thread::Builder::new()
        .name("simulation".into())
        .spawn(move || match Simulation::new(config) {
            Ok(simulation) => run_loop(simulation, rx, publisher),
            Err(e) => log::error!("Simulation failed to start: {}", e),
        })?;

    Ok(SimulationHandle {
        sender: EventSender { events: tx },
        bridge,
        thread,
    })
}
