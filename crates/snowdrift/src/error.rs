use core::fmt;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `snowdrift` can emit.
///
/// Only two fault kinds exist: configuration faults raised at construction
/// (the instance is never created; fix the configuration and reconstruct) and
/// the clock-backward fault raised from
/// [`next_id`](crate::SnowflakeAllocator::next_id) when a backward wall-clock
/// step exceeds the configured tolerance. The latter is per-call: allocator
/// state is left untouched and a later call may succeed once the clock
/// stabilizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Error {
    /// The worker id does not fit the 10-bit field.
    WorkerIdOutOfRange {
        /// The rejected worker id.
        worker_id: u64,
        /// The largest admissible worker id
        /// ([`SnowflakeId::WORKER_ID_MASK`](crate::SnowflakeId::WORKER_ID_MASK)).
        max: u64,
    },

    /// The randomized-sequence bound exceeds the 12-bit sequence space.
    ///
    /// A randomized sequence start is drawn from `[0, bound)`; any bound above
    /// `4096` could produce a draw that overflows the sequence field and
    /// corrupts the packed layout.
    RandSequenceBoundOutOfRange {
        /// The rejected bound.
        bound: u64,
        /// The largest admissible bound (the full sequence space, 4096).
        max: u64,
    },

    /// The wall clock moved backward by more than the configured tolerance.
    ///
    /// No ID was produced. The allocator refuses to issue rather than risk a
    /// duplicate or out-of-order ID.
    ClockMovedBackwards {
        /// Observed backward step, in milliseconds.
        backwards_by: u64,
        /// Configured tolerance (`max_clock_backward`), in milliseconds.
        tolerance_ms: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::WorkerIdOutOfRange { worker_id, max } => {
                write!(f, "worker id {worker_id} exceeds the maximum of {max}")
            }
            Self::RandSequenceBoundOutOfRange { bound, max } => {
                write!(
                    f,
                    "randomized sequence bound {bound} exceeds the maximum of {max}"
                )
            }
            Self::ClockMovedBackwards {
                backwards_by,
                tolerance_ms,
            } => {
                write!(
                    f,
                    "clock moved backwards; refusing to generate an id for \
                     {backwards_by}ms (tolerance: {tolerance_ms}ms)"
                )
            }
        }
    }
}

impl core::error::Error for Error {}
