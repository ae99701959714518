//! Instruments and the fixed-size instrument table.

use serde::{Deserialize, Serialize};

use crate::{InstrumentIndex, MAX_INSTRUMENTS};

/// Number of sequence slots a sequenced instrument carries
/// (volume, arpeggio, pitch, hi-pitch, duty/noise).
pub const SEQUENCE_COUNT: usize = 5;

/// Sound chip an instrument targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipKind {
    Apu2A03,
    Vrc6,
    Vrc7,
    Fds,
    N163,
    S5b,
}

impl ChipKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChipKind::Apu2A03 => "2A03",
            ChipKind::Vrc6 => "VRC6",
            ChipKind::Vrc7 => "VRC7",
            ChipKind::Fds => "FDS",
            ChipKind::N163 => "N163",
            ChipKind::S5b => "5B",
        }
    }
}

/// Chip-specific instrument settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentBody {
    /// Envelope-sequence driven instruments (2A03, VRC6, N163, 5B)
    Sequenced {
        chip: ChipKind,
        sequences: [Option<u8>; SEQUENCE_COUNT],
    },
    /// FM patch: built-in patch number or custom (0) with 8 register bytes
    Vrc7 { patch: u8, custom_regs: [u8; 8] },
    Fds {
        wave: Vec<u8>,
        mod_speed: u16,
        mod_depth: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub body: InstrumentBody,
}

impl Instrument {
    pub fn new(chip: ChipKind) -> Self {
        let body = match chip {
            ChipKind::Vrc7 => InstrumentBody::Vrc7 {
                patch: 0,
                custom_regs: [0; 8],
            },
            ChipKind::Fds => InstrumentBody::Fds {
                wave: vec![0; 64],
                mod_speed: 0,
                mod_depth: 0,
            },
            other => InstrumentBody::Sequenced {
                chip: other,
                sequences: [None; SEQUENCE_COUNT],
            },
        };
        Self {
            name: "New instrument".to_string(),
            body,
        }
    }

    pub fn with_name(chip: ChipKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new(chip)
        }
    }

    pub fn chip(&self) -> ChipKind {
        match &self.body {
            InstrumentBody::Sequenced { chip, .. } => *chip,
            InstrumentBody::Vrc7 { .. } => ChipKind::Vrc7,
            InstrumentBody::Fds { .. } => ChipKind::Fds,
        }
    }
}

/// Fixed table of `MAX_INSTRUMENTS` slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentManager {
    slots: Vec<Option<Instrument>>,
}

impl Default for InstrumentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InstrumentManager {
    pub fn new() -> Self {
        Self {
            slots: vec![None; MAX_INSTRUMENTS],
        }
    }

    pub fn get(&self, index: InstrumentIndex) -> Option<&Instrument> {
        self.slots.get(index.get()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: InstrumentIndex) -> Option<&mut Instrument> {
        self.slots.get_mut(index.get()).and_then(Option::as_mut)
    }

    pub fn is_used(&self, index: InstrumentIndex) -> bool {
        self.get(index).is_some()
    }

    /// Place `instrument` in an empty slot. Returns false if the slot is
    /// taken or out of range; the table is left unchanged in that case.
    pub fn insert(&mut self, index: InstrumentIndex, instrument: Instrument) -> bool {
        match self.slots.get_mut(index.get()) {
            Some(slot) if slot.is_none() => {
                *slot = Some(instrument);
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, index: InstrumentIndex) -> Option<Instrument> {
        self.slots.get_mut(index.get()).and_then(Option::take)
    }

    /// First used slot strictly above `index`.
    pub fn next_used_after(&self, index: InstrumentIndex) -> Option<InstrumentIndex> {
        (index.get() + 1..MAX_INSTRUMENTS)
            .map(InstrumentIndex::new)
            .find(|&i| self.is_used(i))
    }

    pub fn first_free(&self) -> Option<InstrumentIndex> {
        self.free_slots().next()
    }

    pub fn free_slots(&self) -> impl Iterator<Item = InstrumentIndex> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| InstrumentIndex::new(i))
    }

    pub fn used_slots(&self) -> impl Iterator<Item = (InstrumentIndex, &Instrument)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|inst| (InstrumentIndex::new(i), inst)))
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> InstrumentIndex {
        InstrumentIndex::new(i)
    }

    #[test]
    fn insert_rejects_occupied_slot() {
        let mut mgr = InstrumentManager::new();
        assert!(mgr.insert(idx(3), Instrument::new(ChipKind::Apu2A03)));
        assert!(!mgr.insert(idx(3), Instrument::new(ChipKind::Vrc6)));
        assert_eq!(mgr.get(idx(3)).map(Instrument::chip), Some(ChipKind::Apu2A03));
        assert!(!mgr.insert(idx(MAX_INSTRUMENTS), Instrument::new(ChipKind::Apu2A03)));
    }

    #[test]
    fn next_used_after_skips_gaps() {
        let mut mgr = InstrumentManager::new();
        for i in [3, 5, 7] {
            mgr.insert(idx(i), Instrument::new(ChipKind::Apu2A03));
        }
        assert_eq!(mgr.next_used_after(idx(3)), Some(idx(5)));
        assert_eq!(mgr.next_used_after(idx(5)), Some(idx(7)));
        assert_eq!(mgr.next_used_after(idx(7)), None);
        assert_eq!(mgr.count(), 3);
    }

    #[test]
    fn free_slots_and_remove() {
        let mut mgr = InstrumentManager::new();
        mgr.insert(idx(0), Instrument::new(ChipKind::Vrc7));
        assert_eq!(mgr.first_free(), Some(idx(1)));
        assert!(mgr.remove(idx(0)).is_some());
        assert!(mgr.remove(idx(0)).is_none());
        assert_eq!(mgr.free_slots().count(), MAX_INSTRUMENTS);
    }

    #[test]
    fn chip_bodies() {
        assert!(matches!(
            Instrument::new(ChipKind::Vrc7).body,
            InstrumentBody::Vrc7 { patch: 0, .. }
        ));
        assert_eq!(Instrument::new(ChipKind::S5b).chip(), ChipKind::S5b);
        assert_eq!(Instrument::with_name(ChipKind::Fds, "Bass").name, "Bass");
    }
}
