// =============================================================================
// sfmm — Splitter (Component D)
// =============================================================================
//
// Cleaves an oversized, already-allocated block into exactly the requested
// size plus a free remainder, when that remainder would itself be a legal
// block (>= MIN_BLOCK_SIZE bytes). The remainder is immediately coalesced
// with whatever free block follows it — it can never merge backward, since
// its predecessor is the block that was just allocated.
// =============================================================================

use super::block::{self, Header, MIN_BLOCK_SIZE};
use super::coalesce::coalesce;
use super::freelist::FreeListSet;

/// Carves `block` down to exactly `size` bytes when the leftover would be
/// a legal block, inserting the leftover (coalesced with its successor if
/// free) into `lists`. Leaves `block` untouched otherwise.
///
/// # Safety
/// `block` must currently be allocated and its header must report its
/// full (pre-split) size; `size` must be a multiple of `MIN_BLOCK_SIZE`
/// no larger than that size.
pub unsafe fn split(lists: &mut FreeListSet, block: *mut u8, size: u64) {
    unsafe {
        let header = block::read_header(block);
        let total = header.size();
        debug_assert!(size <= total && size % MIN_BLOCK_SIZE == 0);
        if total - size < MIN_BLOCK_SIZE {
            return;
        }

        block::write_header(block, header.with_size(size));

        let remainder = block.add(size as usize);
        block::write_header(remainder, Header::new(total - size, true, false));
        block::write_footer(remainder);
        block::clear_next_prev_alloc(remainder);

        coalesce(lists, remainder);
    }
}
