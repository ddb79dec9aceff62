// =============================================================================
// sfmm — Coalescer (Component C)
// =============================================================================
//
// Merges a just-freed block with whichever of its neighbors are also free,
// then inserts the (possibly enlarged) result into the free-list index.
// Callers are responsible for having already marked the block free and
// fixed up its successor's `PREV_ALLOC` bit (`block::mark_free`) before
// calling in — coalesce only ever merges, it never flips an allocation
// bit on the block it was handed.
// =============================================================================

use super::block;
use super::freelist::FreeListSet;

/// Merges `block` with a free predecessor and/or a free successor, inserts
/// the result into `lists`, and returns its (possibly new) address.
///
/// # Safety
/// `block` must currently be free, with its header and footer already
/// written and its successor's `PREV_ALLOC` bit already cleared.
pub unsafe fn coalesce(lists: &mut FreeListSet, mut block: *mut u8) -> *mut u8 {
    unsafe {
        let header = block::read_header(block);
        if !header.prev_alloc() {
            let prev = block::prev_block(block);
            lists.remove(prev);
            let prev_header = block::read_header(prev);
            let merged = prev_header.with_size(prev_header.size() + header.size());
            block::write_header(prev, merged);
            block::write_footer(prev);
            block = prev;
        }

        let header = block::read_header(block);
        let next = block::next_block(block);
        let next_header = block::read_header(next);
        if next_header.is_free() {
            lists.remove(next);
            let merged = header.with_size(header.size() + next_header.size());
            block::write_header(block, merged);
            block::write_footer(block);
        }

        lists.insert(block);
        block
    }
}
