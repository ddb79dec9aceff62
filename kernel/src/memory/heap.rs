// =============================================================================
// sfmm — Allocator Façade & Initialization (Components F & G)
// =============================================================================
//
// `Sfmm<S>` owns one heap built on top of a caller-supplied `PageSupplier`
// and wires components A–E together into malloc/free/realloc. It is the
// only type most embedders touch directly; `memory::global::GlobalSfmm`
// wraps it for use as a `#[global_allocator]`.
// =============================================================================

use super::block::{self, Header, HEADER_SIZE, MIN_BLOCK_SIZE};
use super::coalesce::coalesce;
use super::errno::{Errno, SfmmError};
use super::freelist::FreeListSet;
use super::grow::grow;
use super::page_supplier::PageSupplier;
use super::split::split;

/// Bytes of alignment padding reserved at the start of the heap so the
/// prologue's body lands 64-byte aligned.
const PAD_BYTES: u64 = 48;

/// Size of the synthetic allocated block placed after the padding.
const PROLOGUE_SIZE: u64 = 64;

fn round_up(n: u64, multiple: u64) -> u64 {
    n.div_ceil(multiple) * multiple
}

/// A boundary-tag, segregated-free-list heap built on top of `S`.
///
/// # Address stability
/// Must not move after its first `malloc`/`realloc`/`free` call — its
/// free-list sentinels store their own address as the self-loop target
/// (see [`FreeListSet`] docs). Place it in a `Box`, a `static`, or
/// otherwise pin it before first use.
pub struct Sfmm<S: PageSupplier> {
    supplier: S,
    lists: FreeListSet,
    errno: Errno,
    initialized: bool,
}

impl<S: PageSupplier> Sfmm<S> {
    pub const fn new(supplier: S) -> Self {
        Self {
            supplier,
            lists: FreeListSet::new(),
            errno: Errno::None,
            initialized: false,
        }
    }

    /// The façade's externally observable error sentinel (SPEC_FULL.md §6).
    pub fn errno(&self) -> Errno {
        self.errno
    }

    /// Total number of blocks currently sitting in the free-list index,
    /// across all nine classes. A diagnostic, not used by the allocator
    /// itself — mirrors the teacher's `allocated_bytes()`/`total_bytes()`
    /// kernel-heap statistics in spirit, just counting blocks instead of
    /// bytes.
    pub fn free_block_count(&self) -> usize {
        (0..super::freelist::NUM_FREE_LISTS)
            .map(|class| self.lists.count(class))
            .sum()
    }

    /// Number of free blocks currently in a specific size class.
    pub fn free_block_count_in_class(&self, class: usize) -> usize {
        self.lists.count(class)
    }

    /// Allocates a 64-byte-aligned payload of at least `size` bytes.
    /// `size == 0` returns `None` without touching `errno`.
    pub fn malloc(&mut self, size: usize) -> Option<*mut u8> {
        if size == 0 {
            return None;
        }
        log::trace!("sfmm: malloc({size})");

        let request_size = round_up(size as u64 + HEADER_SIZE, MIN_BLOCK_SIZE).max(MIN_BLOCK_SIZE);

        if !self.initialized {
            if let Err(e) = self.init() {
                log::error!("sfmm: heap init failed: {e:?}");
                self.errno = e.into();
                return None;
            }
            self.initialized = true;
        }

        let block = self.find(request_size)?;
        unsafe {
            block::mark_allocated(block);
            split(&mut self.lists, block, request_size);
            Some(block::payload(block))
        }
    }

    /// Returns `ptr` (previously returned by `malloc`/`realloc` on this
    /// heap) to the free-list index. Terminates the process if `ptr` does
    /// not address a currently-allocated block on this heap.
    pub fn free(&mut self, ptr: *mut u8) {
        log::trace!("sfmm: free({ptr:p})");
        let block = unsafe { block::block_from_payload(ptr) };
        if !unsafe { self.validate(block) } {
            self.fail_stop();
        }
        unsafe {
            block::mark_free(block);
            coalesce(&mut self.lists, block);
        }
    }

    /// Resizes the allocation at `ptr` to `size` bytes, in place when it
    /// shrinks or fits, by relocation when it grows. `size == 0` is
    /// equivalent to `free(ptr)` and returns `None`.
    pub fn realloc(&mut self, ptr: *mut u8, size: usize) -> Option<*mut u8> {
        log::trace!("sfmm: realloc({ptr:p}, {size})");
        if size == 0 {
            self.free(ptr);
            return None;
        }

        let block = unsafe { block::block_from_payload(ptr) };
        if !unsafe { self.validate(block) } {
            self.fail_stop();
        }

        let current_size = unsafe { block::read_header(block).size() };
        let request_size = round_up(size as u64 + HEADER_SIZE, MIN_BLOCK_SIZE).max(MIN_BLOCK_SIZE);

        if request_size < current_size {
            unsafe { split(&mut self.lists, block, request_size) };
            Some(ptr)
        } else if request_size == current_size {
            Some(ptr)
        } else {
            let new_ptr = self.malloc(size)?;
            let copy_len = core::cmp::min(size as u64, current_size - HEADER_SIZE) as usize;
            unsafe { core::ptr::copy_nonoverlapping(ptr, new_ptr, copy_len) };
            self.free(ptr);
            Some(new_ptr)
        }
    }

    /// First-use setup: one page, prologue, epilogue, sentinels, one
    /// initial free block (Component G).
    fn init(&mut self) -> Result<(), SfmmError> {
        self.supplier.mem_grow()?;
        self.lists.init();

        unsafe {
            let heap_start = self.supplier.mem_start();
            let prologue = heap_start.add(PAD_BYTES as usize);
            // Nothing ever reads the prologue's own PREV_ALLOC bit — there
            // is nothing before it — so its value here is arbitrary.
            block::write_header(prologue, Header::new(PROLOGUE_SIZE, true, true));

            let epilogue = self.supplier.mem_end().sub(8);
            let first_block = prologue.add(PROLOGUE_SIZE as usize);
            let first_size = (epilogue as usize - first_block as usize) as u64;

            block::write_header(first_block, Header::new(first_size, true, false));
            block::write_footer(first_block);
            block::write_header(epilogue, Header::new(0, false, true));

            self.lists.insert(first_block);
        }

        Ok(())
    }

    /// Scans the free-list index for a block `>= size`, growing the heap
    /// and retrying on exhaustion. Returns `None` only once growth itself
    /// fails.
    fn find(&mut self, size: u64) -> Option<*mut u8> {
        loop {
            if let Some(block) = unsafe { self.lists.find_and_remove(size) } {
                return Some(block);
            }
            log::warn!("sfmm: free lists exhausted, growing heap");
            match unsafe { grow(&mut self.lists, &mut self.supplier) } {
                Ok(()) => continue,
                Err(e) => {
                    self.errno = e.into();
                    return None;
                }
            }
        }
    }

    /// # Safety
    /// `block` must either be a live block header address or an arbitrary
    /// (possibly bogus) pointer handed back by a caller.
    unsafe fn validate(&self, block: *mut u8) -> bool {
        if block.is_null() {
            return false;
        }
        unsafe {
            let payload = block::payload(block);
            if (payload as usize) % MIN_BLOCK_SIZE as usize != 0 {
                return false;
            }

            let heap_start = self.supplier.mem_start();
            let first_legal = heap_start.add((PAD_BYTES + HEADER_SIZE) as usize);
            if payload < first_legal {
                return false;
            }

            let heap_end = self.supplier.mem_end();
            if payload > heap_end.sub(8) {
                return false;
            }

            let header = block::read_header(block);
            if header.is_free() {
                return false;
            }

            if !header.prev_alloc() && !block::read_header(block::prev_block(block)).is_free() {
                return false;
            }

            true
        }
    }

    fn fail_stop(&mut self) -> ! {
        self.errno = Errno::InvalidArgument;
        log::error!("sfmm: invalid pointer passed to free/realloc, terminating");
        panic!("sfmm: invalid free/realloc pointer");
    }
}
