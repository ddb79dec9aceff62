// =============================================================================
// sfmm — Block Encoding (Component A)
// =============================================================================
//
// Every block is a packed 64-bit header word followed by a body. A free
// block duplicates its header into the last 8 bytes of its own body (the
// boundary-tag "footer"); an allocated block's trailing bytes carry no
// meaning. See SPEC_FULL.md §3 and §9 for why the header is a transparent
// newtype over `u64` rather than a `bitflags!` struct, and why it is 8
// bytes (not 16) wide in this crate.
//
// This module is the only place that does raw pointer arithmetic on block
// addresses. Every other module is built on top of these primitives and is
// `unsafe`-free.
// =============================================================================

/// Width of the header (and, for a free block, the footer) word.
pub const HEADER_SIZE: u64 = 8;

/// Every block occupies a whole multiple of this many bytes; it is also the
/// minimum block size and the unit ("M") the free-list class thresholds are
/// expressed in.
pub const MIN_BLOCK_SIZE: u64 = 64;

const THIS_ALLOC: u64 = 0b01;
const PREV_ALLOC: u64 = 0b10;
const SIZE_MASK: u64 = !0b11;

/// A packed `size | flags` header/footer word.
///
/// `#[repr(transparent)]` over a single `u64` — deliberately not a
/// `bitflags!`-generated type or a multi-field struct, per the design note
/// in SPEC_FULL.md §9 on keeping the boundary tag a transparent native word.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Header(u64);

impl Header {
    pub const fn from_raw(word: u64) -> Self {
        Self(word)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    pub const fn new(size: u64, prev_alloc: bool, this_alloc: bool) -> Self {
        let mut word = size & SIZE_MASK;
        if prev_alloc {
            word |= PREV_ALLOC;
        }
        if this_alloc {
            word |= THIS_ALLOC;
        }
        Self(word)
    }

    pub const fn size(self) -> u64 {
        self.0 & SIZE_MASK
    }

    pub const fn this_alloc(self) -> bool {
        self.0 & THIS_ALLOC != 0
    }

    pub const fn prev_alloc(self) -> bool {
        self.0 & PREV_ALLOC != 0
    }

    /// `THIS_ALLOC` clear and size large enough to be a real block — the
    /// second clause rejects the epilogue (size 0) and a corrupted header
    /// claiming to be free with too small a size. See SPEC_FULL.md §9 Open
    /// Questions: sizes below `MIN_BLOCK_SIZE` on an apparently-free header
    /// are treated as corruption, not as "not free, move along".
    pub const fn is_free(self) -> bool {
        !self.this_alloc() && self.size() >= MIN_BLOCK_SIZE
    }

    /// Rewrites the size, carrying the *old* `prev_alloc`/`this_alloc` bits
    /// forward explicitly. Every header rewrite in this crate goes through
    /// one of `with_size`/`with_this_alloc`/`with_prev_alloc`, which all
    /// route through this constructor — there is no code path that can
    /// silently drop `PREV_ALLOC` during a coalesce or split, resolving the
    /// open question in SPEC_FULL.md §9.
    pub const fn with_size(self, size: u64) -> Self {
        Self::new(size, self.prev_alloc(), self.this_alloc())
    }

    pub const fn with_this_alloc(self, this_alloc: bool) -> Self {
        Self::new(self.size(), self.prev_alloc(), this_alloc)
    }

    pub const fn with_prev_alloc(self, prev_alloc: bool) -> Self {
        Self::new(self.size(), prev_alloc, self.this_alloc())
    }
}

/// Reads the header word at `block`.
///
/// # Safety
/// `block` must point at a live, in-bounds, 8-byte-aligned block header.
pub unsafe fn read_header(block: *mut u8) -> Header {
    unsafe { Header::from_raw((block as *const u64).read()) }
}

/// Writes `header` at `block`.
///
/// # Safety
/// Same as [`read_header`].
pub unsafe fn write_header(block: *mut u8, header: Header) {
    unsafe {
        (block as *mut u64).write(header.as_raw());
    }
}

/// Duplicates `block`'s current header into the footer slot at the tail of
/// its own body. Only meaningful (and only ever called) while `block` is
/// free.
///
/// # Safety
/// `block`'s header must already reflect the size being written; `block`
/// must be at least `MIN_BLOCK_SIZE` bytes so the footer slot does not
/// overlap the header.
pub unsafe fn write_footer(block: *mut u8) {
    unsafe {
        let header = read_header(block);
        let footer = block.add((header.size() - HEADER_SIZE) as usize) as *mut u64;
        footer.write(header.as_raw());
    }
}

/// The address of the payload (allocated) or link fields (free) for this
/// block — `block + HEADER_SIZE`, guaranteed 64-byte aligned for a
/// correctly laid-out block.
///
/// # Safety
/// `block` must be a live block header address.
pub unsafe fn payload(block: *mut u8) -> *mut u8 {
    unsafe { block.add(HEADER_SIZE as usize) }
}

/// Inverse of [`payload`]: recovers a block's header address from a payload
/// pointer the caller handed back to `free`/`realloc`.
///
/// # Safety
/// `ptr` must have originated from [`payload`] on a live block.
pub unsafe fn block_from_payload(ptr: *mut u8) -> *mut u8 {
    unsafe { ptr.sub(HEADER_SIZE as usize) }
}

/// The next block's header address, `block + size(block)`.
///
/// # Safety
/// `block`'s header must be valid and `block + size(block)` must be in
/// bounds (true for every real block, since the epilogue always follows).
pub unsafe fn next_block(block: *mut u8) -> *mut u8 {
    unsafe { block.add(read_header(block).size() as usize) }
}

/// The previous block's header address, recovered by reading the footer
/// word immediately preceding `block` and subtracting its size.
///
/// # Safety
/// Caller must have already checked `!read_header(block).prev_alloc()` —
/// calling this when the predecessor is allocated reads meaningless bytes.
pub unsafe fn prev_block(block: *mut u8) -> *mut u8 {
    unsafe {
        let footer = (block.sub(HEADER_SIZE as usize) as *const u64).read();
        let prev_size = Header::from_raw(footer).size();
        block.sub(prev_size as usize)
    }
}

/// Clears `PREV_ALLOC` on the block following `block`, keeping that
/// neighbor's footer in sync if it is itself free (header and footer must
/// stay identical for a free block — Invariant 2).
///
/// # Safety
/// `block`'s header must be valid and reflect its final size.
pub unsafe fn clear_next_prev_alloc(block: *mut u8) {
    unsafe {
        let next = next_block(block);
        let next_header = read_header(next);
        write_header(next, next_header.with_prev_alloc(false));
        if next_header.is_free() {
            write_footer(next);
        }
    }
}

/// Flips `block`'s `THIS_ALLOC` bit off, rewrites its header and footer,
/// and clears `PREV_ALLOC` on its successor. Does not touch the free-list
/// index or attempt coalescing — callers chain those themselves.
///
/// # Safety
/// `block` must currently be allocated.
pub unsafe fn mark_free(block: *mut u8) {
    unsafe {
        let header = read_header(block).with_this_alloc(false);
        write_header(block, header);
        write_footer(block);
        clear_next_prev_alloc(block);
    }
}

/// Marks `block` allocated and sets `PREV_ALLOC` on its successor. The
/// distilled source also rewrites `block`'s own footer here; this crate
/// skips that write because only a *successor's* `PREV_ALLOC` bit is ever
/// read back, never an allocated block's own trailing bytes.
///
/// # Safety
/// `block` must currently be free.
pub unsafe fn mark_allocated(block: *mut u8) {
    unsafe {
        let header = read_header(block).with_this_alloc(true);
        write_header(block, header);
        let next = next_block(block);
        let next_header = read_header(next);
        write_header(next, next_header.with_prev_alloc(true));
        if next_header.is_free() {
            write_footer(next);
        }
    }
}
