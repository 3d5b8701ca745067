//! RNG abstraction for spawn jitter
//!
//! The physics step is deterministic; randomness only enters through the
//! emission velocity of freshly spawned particles.

/// Random source used by the spawner
pub trait SimRng {
    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Symmetric jitter in (-1.0, 1.0), the difference of two uniform draws
    fn jitter(&mut self) -> f32 {
        self.gen_f32() - self.gen_f32()
    }
}

// Covers ThreadRng in the app and seeded generators in tests
impl<T: ?Sized + rand::Rng> SimRng for T {
    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }
}
