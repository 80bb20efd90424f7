//! Debug-only guard against re-entering a table mid-probe.
//!
//! Probing calls user code (`Hash`, `Eq`, policy objects). If that code
//! reaches back into the same table through a shared reference, it would
//! observe slots in the middle of a backward shift or a rehash. Debug builds
//! panic on such nesting; release builds compile the guard away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table flag. Entry points call `let _g = self.guard.enter();`.
#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // !Sync in every build; moving a table between threads is fine.
    _nosync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _nosync: PhantomData,
        }
    }

    /// Mark the table busy until the returned guard drops.
    ///
    /// Panics in debug builds if the table is already busy.
    #[inline]
    pub fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: table accessed from inside its own hash/eq callback"
            );
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard { _z: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
