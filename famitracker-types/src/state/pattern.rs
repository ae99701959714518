//! Pattern contents: rows of note cells for a single channel.

use serde::{Deserialize, Serialize};

use crate::InstrumentIndex;

/// One effect column entry (command + parameter byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Effect {
    pub command: u8,
    pub param: u8,
}

/// A single row of a pattern. `Default` is the empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Note value (semitones from C-0), `None` = no note
    pub note: Option<u8>,
    pub instrument: Option<InstrumentIndex>,
    /// Channel volume 0-15
    pub volume: Option<u8>,
    pub effect: Option<Effect>,
}

impl Cell {
    pub fn note(note: u8, instrument: InstrumentIndex) -> Self {
        Self {
            note: Some(note),
            instrument: Some(instrument),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fixed-length grid of cells for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    rows: Vec<Cell>,
}

impl Pattern {
    pub fn new(length: usize) -> Self {
        Self {
            rows: vec![Cell::default(); length],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when every row is empty (a pattern of length zero is empty too).
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Cell::is_empty)
    }

    pub fn cell(&self, row: usize) -> Option<&Cell> {
        self.rows.get(row)
    }

    pub fn set_cell(&mut self, row: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(row) {
            *slot = cell;
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.rows
    }

    /// Rewrite instrument references through `table` (old slot -> new slot).
    /// References outside the table are left untouched.
    pub fn remap_instruments(&mut self, table: &[Option<InstrumentIndex>]) {
        for cell in &mut self.rows {
            if let Some(inst) = cell.instrument {
                if let Some(Some(mapped)) = table.get(inst.get()) {
                    cell.instrument = Some(*mapped);
                }
            }
        }
    }
}
