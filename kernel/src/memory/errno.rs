// =============================================================================
// sfmm — Error Taxonomy
// =============================================================================
//
// Two distinct error surfaces, deliberately kept separate:
//
//   SfmmError — an internal, `Result`-friendly error returned by the page
//               supplier seam. Used with `?` inside this crate.
//
//   Errno     — the façade's externally observable, C-ABI-style sentinel.
//               Mirrors the distilled source's `sf_errno` global, but lives
//               on the `Sfmm` instance rather than as process-wide state
//               (see SPEC_FULL.md §3 Lifecycles).
//
// Invalid-pointer failures never reach `Errno` as a value a caller can act
// on — `validate()` failures fail-stop before `free`/`realloc` return. The
// `InvalidArgument` variant exists for API parity with the distilled source.
// =============================================================================

/// Failure returned by a [`crate::memory::page_supplier::PageSupplier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SfmmError {
    /// The page supplier could not extend the heap by one more page.
    OutOfMemory,
}

/// The façade's externally observable error sentinel.
///
/// `None` is the default, successful state. Reading `errno()` after a
/// successful call leaves a prior value in place — callers should check it
/// only immediately after an operation that returned the "no allocation"
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Errno {
    #[default]
    None,
    OutOfMemory,
    InvalidArgument,
}

impl From<SfmmError> for Errno {
    fn from(e: SfmmError) -> Self {
        match e {
            SfmmError::OutOfMemory => Errno::OutOfMemory,
        }
    }
}
