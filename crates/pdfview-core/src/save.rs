//! Save options.

use bitflags::bitflags;

bitflags! {
    /// Options for saving the document back to disk.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SaveOptions: u32 {
        /// Include user changes (annotations, form values) in the saved file.
        const CHANGES = 1;
    }
}
