// =============================================================================
// sfmm — Synchronization Primitives
// =============================================================================
//
// This crate has no std and, per its single-threaded concurrency model
// (see SPEC_FULL.md §5), no real lock to take. The one primitive here
// guards `GlobalSfmm` against reentrant calls rather than against genuine
// cross-core contention.
// =============================================================================

pub mod reentrancy;
