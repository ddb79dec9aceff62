// =============================================================================
// sfmm — Reentrancy Guard
// =============================================================================
//
// `GlobalAlloc` requires `Sync`, but the allocator's free-list walks and
// header writes are not reentrant — a nested call on the same thread (an
// allocation made from inside a signal handler, a panic hook, or a log
// formatter that itself allocates) would observe the heap mid-mutation.
//
// Modeled on `sync::spinlock::SpinLock`'s RAII guard, but this type never
// spins: a second concurrent entry is a bug in the embedder, not a timing
// race to wait out, so it fails stop instead of blocking. The
// `unchecked-reentrancy` feature compiles the check out entirely for
// embedders who have already proven single-threaded use of the allocator.
// =============================================================================

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// Wraps `T`, granting `&mut T` access guarded by a single `AtomicBool`.
/// Entering while already entered panics rather than blocking.
pub struct ReentrancyGuard<T> {
    entered: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: `enter()` is the only way to reach `data`, and it panics rather
// than hand out a second `&mut T` while one is already live.
unsafe impl<T: Send> Send for ReentrancyGuard<T> {}
unsafe impl<T: Send> Sync for ReentrancyGuard<T> {}

impl<T> ReentrancyGuard<T> {
    pub const fn new(value: T) -> Self {
        Self {
            entered: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires exclusive access to the protected data.
    ///
    /// # Panics
    /// If another `enter()` on this instance is already live on this or
    /// another thread. Compiled out entirely under the
    /// `unchecked-reentrancy` feature, where this always succeeds.
    pub fn enter(&self) -> ReentrancyGuardHandle<'_, T> {
        #[cfg(not(feature = "unchecked-reentrancy"))]
        {
            if self
                .entered
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
            {
                panic!("sfmm: reentrant call into the global allocator");
            }
        }
        ReentrancyGuardHandle { guard: self }
    }
}

pub struct ReentrancyGuardHandle<'a, T> {
    guard: &'a ReentrancyGuard<T>,
}

impl<T> Deref for ReentrancyGuardHandle<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: `enter()` guarantees no other handle on this instance is
        // live (checked, or the embedder has promised it via the feature).
        unsafe { &*self.guard.data.get() }
    }
}

impl<T> DerefMut for ReentrancyGuardHandle<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: see `deref`.
        unsafe { &mut *self.guard.data.get() }
    }
}

impl<T> Drop for ReentrancyGuardHandle<'_, T> {
    fn drop(&mut self) {
        #[cfg(not(feature = "unchecked-reentrancy"))]
        self.guard.entered.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_access_and_releases_on_drop() {
        let guard = ReentrancyGuard::new(0u32);
        {
            let mut h = guard.enter();
            *h += 1;
        }
        let h = guard.enter();
        assert_eq!(*h, 1);
    }

    #[test]
    #[cfg_attr(feature = "unchecked-reentrancy", ignore)]
    #[should_panic(expected = "reentrant call")]
    fn second_concurrent_entry_fails_stop() {
        let guard = ReentrancyGuard::new(0u32);
        let _first = guard.enter();
        let _second = guard.enter();
    }
}
