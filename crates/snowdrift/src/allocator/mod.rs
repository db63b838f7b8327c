use core::time::Duration;
use std::thread;

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    DEFAULT_EPOCH_MS, Error, RandSource, Result, SnowflakeId, SystemClock, ThreadRandom,
    TimeSource,
};


/// Default exclusive upper bound for the randomized sequence start when a new
/// millisecond window begins. Powers of two perform best.
pub const DEFAULT_MAX_RAND_SEQUENCE: u64 = 64;

/// Default maximum backward clock step, in milliseconds, absorbed by waiting
/// instead of refusing to generate.
pub const DEFAULT_MAX_CLOCK_BACKWARD_MS: u64 = 10;

/// Mutable allocator state. Both fields are read-modify-written together, so
/// they live behind a single lock.
struct AllocatorState {
    /// Unix millisecond of the most recently issued ID. `None` until the
    /// first ID is issued.
    last_timestamp: Option<u64>,
    /// Sequence counter, scoped to `last_timestamp`.
    sequence: u64,
}

/// A thread-safe allocator of sortable, collision-resistant 64-bit IDs.
///
/// One allocator represents one ID-issuing authority, bound to exactly one
/// 10-bit worker id for its lifetime. Worker-id uniqueness across concurrently
/// running allocators sharing an epoch is an external invariant (static
/// configuration or a coordination service), not something this type
/// enforces.
///
/// The entire [`next_id`](Self::next_id) body runs under one mutex
/// acquisition per call: clock sampling, drift recovery, sequence update, and
/// any blocking waits. Blocking while holding the lock is deliberate;
/// correctness is prioritized over latency, and throughput is bounded by
/// wall-clock progression (4096 IDs per millisecond), not lock tuning.
///
/// ## Recommended When
/// - You need sortable unique keys without a coordination service
/// - Multiple threads share one instance (fair, serialized access)
///
/// # Example
///
/// ```
/// use snowdrift::SnowflakeAllocator;
///
/// let allocator = SnowflakeAllocator::new(0)?;
/// let id = allocator.next_id()?;
/// assert_eq!(id.worker_id(), 0);
/// # Ok::<(), snowdrift::Error>(())
/// ```
pub struct SnowflakeAllocator<C = SystemClock, R = ThreadRandom> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<AllocatorState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<AllocatorState>,
    worker_id: u64,
    epoch_ms: u64,
    max_rand_sequence: u64,
    max_clock_backward: u64,
    clock: C,
    rand: R,
}

impl SnowflakeAllocator {
    /// Creates an allocator for `worker_id` with the default randomization
    /// bound ([`DEFAULT_MAX_RAND_SEQUENCE`]), drift tolerance
    /// ([`DEFAULT_MAX_CLOCK_BACKWARD_MS`]), epoch
    /// ([`DEFAULT_EPOCH_MS`]), system clock, and thread-local secure RNG.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkerIdOutOfRange`] if `worker_id` exceeds the
    /// 10-bit field.
    pub fn new(worker_id: u64) -> Result<Self> {
        Self::with_config(
            worker_id,
            DEFAULT_MAX_RAND_SEQUENCE,
            DEFAULT_MAX_CLOCK_BACKWARD_MS,
        )
    }

    /// Creates an allocator with explicit randomization and drift-tolerance
    /// settings, over the system clock and thread-local secure RNG.
    ///
    /// - `max_rand_sequence`: exclusive upper bound for the randomized
    ///   sequence start on a fresh millisecond window; `0` disables
    ///   randomization. Randomized starts reduce ID predictability and
    ///   collision risk across process restarts.
    /// - `max_clock_backward`: largest backward clock step, in milliseconds,
    ///   absorbed by waiting; larger steps make [`next_id`](Self::next_id)
    ///   return [`Error::ClockMovedBackwards`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `worker_id` exceeds the 10-bit field
    /// or `max_rand_sequence` exceeds the 12-bit sequence space.
    pub fn with_config(
        worker_id: u64,
        max_rand_sequence: u64,
        max_clock_backward: u64,
    ) -> Result<Self> {
        Self::from_parts(
            worker_id,
            max_rand_sequence,
            max_clock_backward,
            DEFAULT_EPOCH_MS,
            SystemClock,
            ThreadRandom,
        )
    }
}

impl<C, R> SnowflakeAllocator<C, R>
where
    C: TimeSource,
    R: RandSource,
{
    /// Creates an allocator from explicit configuration and collaborators.
    ///
    /// This is the fully general constructor, useful for pinning a custom
    /// epoch or substituting the clock and randomness sources (e.g. mock
    /// clocks in tests). `epoch_ms` is milliseconds since the Unix epoch and
    /// must not lie in the clock's future; see
    /// [`year_epoch_millis`](crate::year_epoch_millis).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `worker_id` exceeds the 10-bit field
    /// or `max_rand_sequence` exceeds the 12-bit sequence space.
    pub fn from_parts(
        worker_id: u64,
        max_rand_sequence: u64,
        max_clock_backward: u64,
        epoch_ms: u64,
        clock: C,
        rand: R,
    ) -> Result<Self> {
        if worker_id > SnowflakeId::WORKER_ID_MASK {
            return Err(Error::WorkerIdOutOfRange {
                worker_id,
                max: SnowflakeId::WORKER_ID_MASK,
            });
        }
        if max_rand_sequence > SnowflakeId::SEQUENCE_MASK + 1 {
            return Err(Error::RandSequenceBoundOutOfRange {
                bound: max_rand_sequence,
                max: SnowflakeId::SEQUENCE_MASK + 1,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            worker_id,
            max_rand_sequence,
            max_clock_backward,
            epoch_ms,
            "snowflake allocator configured"
        );

        let state = Mutex::new(AllocatorState {
            last_timestamp: None,
            sequence: 0,
        });
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            worker_id,
            epoch_ms,
            max_rand_sequence,
            max_clock_backward,
            clock,
            rand,
        })
    }

    /// Generates the next ID.
    ///
    /// Returns a new, time-ordered ID, unique among all IDs from this
    /// instance and from any other instance with a distinct worker id. Callers
    /// exceeding 4096 IDs within one millisecond are throttled by a busy-wait
    /// until the clock ticks over; this is backpressure, not a fault.
    ///
    /// Blocks while holding the allocator's lock when the sequence is
    /// exhausted for the current tick, or for up to `max_clock_backward`
    /// milliseconds when the wall clock has stepped backward within
    /// tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockMovedBackwards`] when the clock has stepped back
    /// by at least `max_clock_backward` milliseconds. No ID is produced and
    /// internal state is untouched, so the instance stays valid; a later call
    /// re-evaluates against the then-current clock.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the configured epoch lies in the clock's
    /// future (see [`from_parts`](Self::from_parts)); release builds would
    /// produce a corrupt timestamp field instead.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.state.lock();
        let mut now = self.clock.current_millis();

        match state.last_timestamp {
            Some(last) if now < last => {
                self.wait_out_clock_drift(last - now)?;
                now = self.clock.current_millis();
                if now < last {
                    // Still behind after the bounded wait. Refuse outright
                    // rather than risk a duplicate or out-of-order ID.
                    return Err(Error::ClockMovedBackwards {
                        backwards_by: last - now,
                        tolerance_ms: self.max_clock_backward,
                    });
                }
                if now == last {
                    now = self.advance_within_tick(&mut state, last);
                } else {
                    state.sequence = self.fresh_sequence();
                }
            }
            Some(last) if now == last => {
                now = self.advance_within_tick(&mut state, last);
            }
            _ => {
                // Fresh millisecond window (or very first call).
                state.sequence = self.fresh_sequence();
            }
        }

        state.last_timestamp = Some(now);

        debug_assert!(now >= self.epoch_ms, "clock precedes the configured epoch");
        Ok(SnowflakeId::from_parts(
            now - self.epoch_ms,
            self.worker_id,
            state.sequence,
        ))
    }

    /// Increments the sequence within the current tick, spinning past the
    /// tick when the 4096-ID budget is exhausted. Returns the millisecond the
    /// ID should carry.
    fn advance_within_tick(&self, state: &mut AllocatorState, last: u64) -> u64 {
        state.sequence = (state.sequence + 1) & SnowflakeId::SEQUENCE_MASK;
        if state.sequence == 0 {
            self.spin_until_after(last)
        } else {
            last
        }
    }

    /// Re-samples the clock until it advances strictly past `last`.
    ///
    /// The wait terminates exactly when the clock value increases, not after
    /// a fixed delay. The spin hint keeps a coarse clock from pegging a core.
    #[cold]
    fn spin_until_after(&self, last: u64) -> u64 {
        loop {
            let now = self.clock.current_millis();
            if now > last {
                return now;
            }
            core::hint::spin_loop();
        }
    }

    /// Blocks for the observed backward step if it is within tolerance;
    /// otherwise fails without touching allocator state.
    #[cold]
    #[inline(never)]
    fn wait_out_clock_drift(&self, backwards_by: u64) -> Result<()> {
        if backwards_by >= self.max_clock_backward {
            return Err(Error::ClockMovedBackwards {
                backwards_by,
                tolerance_ms: self.max_clock_backward,
            });
        }
        thread::sleep(Duration::from_millis(backwards_by));
        Ok(())
    }

    /// Starting sequence for a fresh millisecond window.
    fn fresh_sequence(&self) -> u64 {
        if self.max_rand_sequence > 0 {
            self.rand.rand_below(self.max_rand_sequence)
        } else {
            0
        }
    }

    /// The worker id encoded into every ID this instance issues.
    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The configured epoch, in milliseconds since the Unix epoch.
    pub fn epoch_millis(&self) -> u64 {
        self.epoch_ms
    }

    /// Exclusive upper bound for randomized sequence starts; `0` when
    /// randomization is disabled.
    pub fn max_rand_sequence(&self) -> u64 {
        self.max_rand_sequence
    }

    /// Largest backward clock step, in milliseconds, absorbed by waiting.
    pub fn max_clock_backward(&self) -> u64 {
        self.max_clock_backward
    }
}
