//! JPEG (ISO/IEC 10918-1) marker structure: lexicon, segment decoder and stream walker.
//!
//! Structural scan only: entropy-coded data is skipped, never decoded.

mod lexicon;
mod parser;
mod walker;

pub use lexicon::{
    is_restart, sof_name, MarkerKind, APP0, APP1, APP15, COM, DAC, DHP, DHT, DNL, DQT, DRI, EOI,
    EXP, JPG, JPG0, JPG13, MARKER_PREFIX, RST0, RST7, SOF0, SOF1, SOF10, SOF11, SOF13, SOF14,
    SOF15, SOF2, SOF3, SOF5, SOF6, SOF7, SOF9, SOF_NAMES, SOI, SOS, TEM,
};
pub use parser::{decode_segment, next_marker_boundary};
pub use walker::{has_restart_markers, scan, scan_all, MarkerWalker};

/// Check if data starts with an SOI marker.
#[inline]
pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && u16::from_be_bytes([data[0], data[1]]) == SOI
}
