pub mod clip;
pub mod instrument;
pub mod module;
pub mod pattern;
pub mod selection;
pub mod track;

pub use clip::FrameClipData;
pub use instrument::{ChipKind, Instrument, InstrumentBody, InstrumentManager, SEQUENCE_COUNT};
pub use module::{Module, ModuleMetadata};
pub use pattern::{Cell, Effect, Pattern};
pub use selection::{FrameCursor, FrameSelection, IntRange};
pub use track::{FrameRow, Track};
