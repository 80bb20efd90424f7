//! Construction parameters.

use crate::error::TableError;

/// Slot count used by [`TableParams::default`].
pub const DEFAULT_CAPACITY: usize = 8;

/// Load factor used by [`TableParams::default`]; seven of every eight
/// slots may be occupied before the table doubles.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.875;

/// Capacity and growth configuration for an [`OpenHashMap`].
///
/// The policies (sentinel, hashing, equality) are configured at the type
/// level; these are the only runtime knobs.
///
/// ```
/// use sentinel_hashmap::{OpenHashMap, TableParams};
///
/// let params = TableParams::new().initial_capacity(100).max_load_factor(0.5);
/// let map: OpenHashMap<u32, u32> = OpenHashMap::with_params(params).unwrap();
/// assert_eq!(map.capacity(), 128);
/// ```
///
/// [`OpenHashMap`]: crate::OpenHashMap
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableParams {
    initial_capacity: usize,
    max_load_factor: f32,
}

impl TableParams {
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }

    /// Requested slot count; rounded up to a power of two on construction.
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub const fn max_load_factor(mut self, load_factor: f32) -> Self {
        self.max_load_factor = load_factor;
        self
    }

    pub const fn get_initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub const fn get_max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Check both knobs and return the power-of-two slot count to allocate.
    pub fn validate(&self) -> Result<usize, TableError> {
        let lf = self.max_load_factor;
        if !lf.is_finite() || lf <= 0.0 || lf >= 1.0 {
            return Err(TableError::InvalidLoadFactor(lf));
        }
        if self.initial_capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        self.initial_capacity
            .checked_next_power_of_two()
            .ok_or(TableError::CapacityOverflow)
    }
}

impl Default for TableParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest number of occupied slots a table of `capacity` slots may hold.
///
/// Always strictly below `capacity`, so a probe always meets an empty slot.
#[inline]
pub(crate) fn usable_slots(capacity: usize, max_load_factor: f32) -> usize {
    let usable = (capacity as f64 * max_load_factor as f64).floor() as usize;
    usable.min(capacity - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let p = TableParams::default();
        assert_eq!(p.get_initial_capacity(), 8);
        assert_eq!(p.get_max_load_factor(), 0.875);
        assert_eq!(p.validate(), Ok(8));
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        assert_eq!(TableParams::new().initial_capacity(1).validate(), Ok(1));
        assert_eq!(TableParams::new().initial_capacity(5).validate(), Ok(8));
        assert_eq!(TableParams::new().initial_capacity(1000).validate(), Ok(1024));
    }

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(
            TableParams::new().initial_capacity(0).validate(),
            Err(TableError::ZeroCapacity)
        );
    }

    #[test]
    fn overflowing_capacity_rejected() {
        assert_eq!(
            TableParams::new().initial_capacity(usize::MAX).validate(),
            Err(TableError::CapacityOverflow)
        );
    }

    #[test]
    fn load_factor_bounds() {
        for lf in [0.0, 1.0, 1.5, -0.25, f32::NAN, f32::INFINITY] {
            let res = TableParams::new().max_load_factor(lf).validate();
            assert!(
                matches!(res, Err(TableError::InvalidLoadFactor(_))),
                "load factor {} must be rejected",
                lf
            );
        }
        assert!(TableParams::new().max_load_factor(0.5).validate().is_ok());
        assert!(TableParams::new().max_load_factor(0.99).validate().is_ok());
    }

    #[test]
    fn usable_slots_leaves_one_empty() {
        assert_eq!(usable_slots(8, 0.875), 7);
        assert_eq!(usable_slots(16, 0.875), 14);
        assert_eq!(usable_slots(1, 0.875), 0);
        assert_eq!(usable_slots(2, 0.99), 1);
        assert_eq!(usable_slots(4, 0.5), 2);
    }
}
