// =============================================================================
// sfmm — Heap Grower (Component E)
// =============================================================================
//
// Requests one more page from the page supplier and stitches it onto the
// heap at the seam left by the old epilogue. The epilogue's own header
// word carries a `PREV_ALLOC` bit like any other block — reading it before
// overwriting is how this module learns whether the block right before the
// old epilogue was free, without needing a separate "backward footer
// peek" helper.
// =============================================================================

use super::block::{self, Header};
use super::coalesce::coalesce;
use super::errno::SfmmError;
use super::freelist::FreeListSet;
use super::page_supplier::PageSupplier;

/// Grows the heap by exactly one page and folds the new region into the
/// free-list index.
///
/// # Safety
/// The heap must already be initialized (prologue, epilogue, and sentinels
/// in place) before the first call.
pub unsafe fn grow<S: PageSupplier>(
    lists: &mut FreeListSet,
    supplier: &mut S,
) -> Result<(), SfmmError> {
    unsafe {
        let old_epilogue = supplier.mem_end().sub(8);
        let old_epilogue_header = block::read_header(old_epilogue);

        supplier.mem_grow()?;

        let new_epilogue = supplier.mem_end().sub(8);
        // A free block now immediately precedes the new epilogue in every
        // case below, so its PREV_ALLOC bit is always clear.
        block::write_header(new_epilogue, Header::new(0, false, true));

        if !old_epilogue_header.prev_alloc() {
            let prev = block::prev_block(old_epilogue);
            lists.remove(prev);
            let prev_header = block::read_header(prev);
            let new_size = (new_epilogue as usize - prev as usize) as u64;
            let merged = prev_header.with_size(new_size);
            block::write_header(prev, merged);
            block::write_footer(prev);
            lists.insert(prev);
        } else {
            let size = (new_epilogue as usize - old_epilogue as usize) as u64;
            block::write_header(old_epilogue, Header::new(size, true, false));
            block::write_footer(old_epilogue);
            coalesce(lists, old_epilogue);
        }

        Ok(())
    }
}
