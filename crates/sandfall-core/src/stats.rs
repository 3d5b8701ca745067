//! Simulation statistics collection trait

/// Hooks invoked by the spawner and the physics step
pub trait SimStats {
    /// A particle was created at the source
    fn record_spawned(&mut self);

    /// A falling particle came to rest
    fn record_settled(&mut self);

    /// A particle found no rest cell in its column and was removed
    fn record_discarded(&mut self);

    /// A falling particle advanced one tick without landing
    fn record_moved(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_spawned(&mut self) {}
    fn record_settled(&mut self) {}
    fn record_discarded(&mut self) {}
    fn record_moved(&mut self) {}
}

/// Plain counters, reset by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickCounters {
    pub spawned: u64,
    pub settled: u64,
    pub discarded: u64,
    pub moved: u64,
}

impl SimStats for TickCounters {
    fn record_spawned(&mut self) {
        self.spawned += 1;
    }

    fn record_settled(&mut self) {
        self.settled += 1;
    }

    fn record_discarded(&mut self) {
        self.discarded += 1;
    }

    fn record_moved(&mut self) {
        self.moved += 1;
    }
}
