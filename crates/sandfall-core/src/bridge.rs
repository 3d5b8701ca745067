//! Grid handoff between the simulation thread and the render thread
//!
//! The simulation thread owns a back [`Frame`] and fills it outside any
//! lock; publishing swaps it with the shared front frame, so the lock is
//! held only for the swap. The render thread copies the front frame out
//! under the same lock. No live reference to the authoritative grids ever
//! crosses threads.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::grid::Grid;

/// Counters shown alongside a published grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Simulation tick the frame was taken at
    pub tick: u64,
    /// Live particles, falling and settled
    pub live: usize,
    pub falling: usize,
    pub settled: usize,
    /// Particles spawned since the last reset
    pub spawned: u64,
    /// Particles dropped because their landing column was full
    pub discarded: u64,
}

/// One published occupancy snapshot
#[derive(Debug, Clone)]
pub struct Frame {
    pub grid: Grid,
    pub stats: FrameStats,
    /// Publication number, 0 before the first publish
    pub sequence: u64,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            stats: FrameStats::default(),
            sequence: 0,
        }
    }

    /// Overwrite this frame with `other`
    pub fn copy_from(&mut self, other: &Frame) {
        self.grid.copy_from(&other.grid);
        self.stats = other.stats;
        self.sequence = other.sequence;
    }
}

/// Wakes the render side after a publish
pub trait RedrawSignal: Send {
    fn request_redraw(&self);
}

impl<F: Fn() + Send> RedrawSignal for F {
    fn request_redraw(&self) {
        self()
    }
}

/// Shared front frame
#[derive(Debug)]
pub struct RenderBridge {
    front: Mutex<Frame>,
    width: usize,
    height: usize,
}

impl RenderBridge {
    pub fn new(width: usize, height: usize) -> Arc<Self> {
        Arc::new(Self {
            front: Mutex::new(Frame::new(width, height)),
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn lock(&self) -> MutexGuard<'_, Frame> {
        self.front
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy the latest frame into `target`; returns its sequence number
    pub fn read_into(&self, target: &mut Frame) -> u64 {
        let front = self.lock();
        target.copy_from(&front);
        front.sequence
    }

    /// Sequence number of the latest frame
    pub fn sequence(&self) -> u64 {
        self.lock().sequence
    }

    /// Create the simulation-side writer
    pub fn publisher(self: &Arc<Self>, signal: Box<dyn RedrawSignal>) -> Publisher {
        Publisher {
            bridge: Arc::clone(self),
            back: Frame::new(self.width, self.height),
            signal,
        }
    }
}

/// Simulation-side writer holding the back buffer
pub struct Publisher {
    bridge: Arc<RenderBridge>,
    back: Frame,
    signal: Box<dyn RedrawSignal>,
}

impl Publisher {
    /// Publish `grid` and `stats` as the next frame and wake the renderer
    pub fn publish(&mut self, grid: &Grid, stats: FrameStats) -> u64 {
        self.back.grid.copy_from(grid);
        self.back.stats = stats;

        let sequence = {
            let mut front = self.bridge.lock();
            self.back.sequence = front.sequence + 1;
            std::mem::swap(&mut *front, &mut self.back);
            front.sequence
        };

        self.signal.request_redraw();
        sequence
    }

    pub fn bridge(&self) -> &Arc<RenderBridge> {
        &self.bridge
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("back_sequence", &self.back.sequence)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_initial_frame_is_empty() {
        let bridge = RenderBridge::new(4, 4);
        let mut frame = Frame::new(4, 4);
        assert_eq!(bridge.read_into(&mut frame), 0);
        assert_eq!(frame.grid.count_set(), 0);
    }

    #[test]
    fn test_publish_is_visible_to_reader() {
        let bridge = RenderBridge::new(4, 4);
        let mut publisher = bridge.publisher(Box::new(|| {}));

        let mut grid = Grid::new(4, 4);
        grid.set(1, 2);
        let stats = FrameStats {
            tick: 9,
            live: 1,
            falling: 1,
            settled: 0,
            spawned: 1,
            discarded: 0,
        };
        assert_eq!(publisher.publish(&grid, stats), 1);

        let mut frame = Frame::new(4, 4);
        assert_eq!(bridge.read_into(&mut frame), 1);
        assert!(frame.grid.is_set(1, 2));
        assert_eq!(frame.stats, stats);
    }

    #[test]
    fn test_sequence_increases_across_swaps() {
        let bridge = RenderBridge::new(2, 2);
        let mut publisher = bridge.publisher(Box::new(|| {}));
        let mut grid = Grid::new(2, 2);

        publisher.publish(&grid, FrameStats::default());
        grid.set(0, 0);
        publisher.publish(&grid, FrameStats::default());
        grid.clear(0, 0);
        grid.set(1, 1);
        assert_eq!(publisher.publish(&grid, FrameStats::default()), 3);

        // The reader sees the latest grid, not a stale back buffer
        let mut frame = Frame::new(2, 2);
        bridge.read_into(&mut frame);
        assert!(!frame.grid.is_set(0, 0));
        assert!(frame.grid.is_set(1, 1));
        assert_eq!(bridge.sequence(), 3);
    }

    #[test]
    fn test_signal_fires_once_per_publish() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let bridge = RenderBridge::new(2, 2);
        let mut publisher = bridge.publisher(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let grid = Grid::new(2, 2);
        for _ in 0..5 {
            publisher.publish(&grid, FrameStats::default());
        }
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_reader_on_other_thread() {
        let bridge = RenderBridge::new(8, 8);
        let mut publisher = bridge.publisher(Box::new(|| {}));

        let reader = {
            let bridge = Arc::clone(&bridge);
            std::thread::spawn(move || {
                let mut frame = Frame::new(8, 8);
                let mut last = 0;
                while last < 50 {
                    let seq = bridge.read_into(&mut frame);
                    assert!(seq >= last);
                    // Every frame has exactly one cell set
                    if seq > 0 {
                        assert_eq!(frame.grid.count_set(), 1);
                    }
                    last = seq;
                }
            })
        };

        let mut grid = Grid::new(8, 8);
        for i in 0..50 {
            grid.reset_all();
            grid.set(i % 8, i / 8 % 8);
            publisher.publish(&grid, FrameStats::default());
        }
        reader.join().expect("reader thread panicked");
    }
}
