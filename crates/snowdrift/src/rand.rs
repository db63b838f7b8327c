use rand::Rng;

/// A source of uniform random draws for sequence-start randomization.
///
/// The allocator draws one value per fresh millisecond window, so the source
/// sits on the ID hot path only when the clock ticks over.
pub trait RandSource {
    /// Returns a value drawn uniformly from `[0, bound)`.
    ///
    /// `bound` is always at least 1; the allocator skips the draw entirely
    /// when randomization is disabled.
    fn rand_below(&self, bound: u64) -> u64;
}

/// A [`RandSource`] backed by the thread-local RNG ([`rand::rng()`]).
///
/// This RNG is fast, cryptographically secure (ChaCha-based), and
/// automatically reseeded periodically.
///
/// Each OS thread has its own generator, so calls from multiple threads are
/// contention-free. This type does **not** store the RNG itself; it is a
/// zero-sized handle that accesses the thread-local generator on each call,
/// and may be freely shared across threads.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn rand_below(&self, bound: u64) -> u64 {
        rand::rng().random_range(0..bound)
    }
}
