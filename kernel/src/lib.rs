// =============================================================================
// sfmm — boundary-tag, segregated-free-list heap allocator
// =============================================================================
//
// `#![no_std]` library: the allocator owns no pages of its own and talks to
// the host only through the [`PageSupplier`] trait a caller provides. Use
// [`Sfmm`] directly for an explicit malloc/free/realloc façade, or wrap a
// [`GlobalSfmm`] in a `#[global_allocator]` static to back `alloc::boxed::Box`,
// `alloc::vec::Vec`, and friends.
//
// ```ignore
// struct MyPages { /* ... */ }
// impl sfmm::PageSupplier for MyPages { /* ... */ }
//
// #[global_allocator]
// static ALLOCATOR: sfmm::GlobalSfmm<MyPages> = sfmm::GlobalSfmm::new(MyPages::new());
// ```
// =============================================================================

#![no_std]

pub mod memory;
pub mod sync;

pub use memory::{Errno, GlobalSfmm, PageSupplier, SfmmError, Sfmm, PAGE_SIZE};
