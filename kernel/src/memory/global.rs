// =============================================================================
// sfmm — GlobalAlloc Adapter
// =============================================================================
//
// Wraps an `Sfmm<S>` behind a `ReentrancyGuard` so it can be installed as
// `#[global_allocator]`. `GlobalAlloc::alloc`/`dealloc` take `&self`, but
// `Sfmm`'s façade methods take `&mut self` — the guard is what bridges that
// gap, the same role `SpinLock` plays for the teacher's `KernelAllocator`,
// except a concurrent second entry panics instead of spinning (see
// SPEC_FULL.md §5).
// =============================================================================

use core::alloc::{GlobalAlloc, Layout};

use crate::sync::reentrancy::ReentrancyGuard;

use super::heap::Sfmm;
use super::page_supplier::PageSupplier;

/// A `#[global_allocator]`-ready wrapper around [`Sfmm`].
///
/// # Example
/// ```ignore
/// #[global_allocator]
/// static ALLOCATOR: GlobalSfmm<MyPageSupplier> = GlobalSfmm::new(MyPageSupplier::new());
/// ```
pub struct GlobalSfmm<S: PageSupplier> {
    inner: ReentrancyGuard<Sfmm<S>>,
}

impl<S: PageSupplier> GlobalSfmm<S> {
    pub const fn new(supplier: S) -> Self {
        Self {
            inner: ReentrancyGuard::new(Sfmm::new(supplier)),
        }
    }
}

// SAFETY: every method routes through `ReentrancyGuard::enter`, which
// grants exclusive `&mut Sfmm<S>` access and fails stop rather than
// allowing a second concurrent caller to observe a half-mutated heap.
unsafe impl<S: PageSupplier> GlobalAlloc for GlobalSfmm<S> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let mut heap = self.inner.enter();
        // `malloc`'s own rounding already guarantees MIN_BLOCK_SIZE (64)
        // byte alignment, which covers every Layout this crate can be
        // asked to satisfy per SPEC_FULL.md §1 Non-goals.
        debug_assert!(layout.align() <= super::block::MIN_BLOCK_SIZE as usize);
        heap.malloc(layout.size())
            .unwrap_or(core::ptr::null_mut())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let mut heap = self.inner.enter();
        heap.free(ptr);
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        let mut heap = self.inner.enter();
        heap.realloc(ptr, new_size)
            .unwrap_or(core::ptr::null_mut())
    }
}
