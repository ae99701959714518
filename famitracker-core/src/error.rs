//! Reasons an edit is refused before it reaches the history.

use famitracker_types::InstrumentIndex;
use thiserror::Error;

/// Why an action was discarded during construction or `save_state`.
///
/// None of these leave the document modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edit would not change anything
    #[error("edit does not change the document")]
    NoChange,
    #[error("instrument slot {0} is already in use")]
    SlotOccupied(InstrumentIndex),
    #[error("no instrument in slot {0}")]
    NoInstrument(InstrumentIndex),
    #[error("{what} {index} is out of range")]
    OutOfRange { what: &'static str, index: usize },
    #[error("{what} limit of {limit} reached")]
    CapacityExceeded { what: &'static str, limit: usize },
    #[error("no frames selected")]
    NoSelection,
    #[error("no free pattern on channel {0}")]
    NoFreePattern(usize),
    #[error("incompatible module: {0}")]
    IncompatibleModule(String),
    #[error("invalid target: {0}")]
    InvalidTarget(&'static str),
}

impl EditError {
    /// True for edits that were simply redundant rather than invalid.
    pub fn is_no_op(&self) -> bool {
        matches!(self, EditError::NoChange)
    }
}
