//! Error type shared by construction and checked lookup.

/// Errors reported by [`OpenHashMap`](crate::OpenHashMap).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum TableError {
    /// `at`/`at_mut` was called with a key that is not present.
    #[error("key not found")]
    KeyNotFound,

    /// The table was constructed with an initial capacity of zero.
    #[error("initial capacity must be at least one slot")]
    ZeroCapacity,

    /// The maximum load factor is outside the open interval `(0, 1)`.
    ///
    /// A load factor of one or more would allow the slot array to fill up
    /// completely, and probing relies on at least one empty slot.
    #[error("max load factor {0} is outside (0, 1)")]
    InvalidLoadFactor(f32),

    /// The requested capacity cannot be rounded up to a power of two.
    #[error("requested capacity overflows usize")]
    CapacityOverflow,
}
