//! Scan result types: marker records and the per-buffer report.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::jpeg::is_restart;

/// One marker found in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Marker {
    /// Marker code, `0xFFxx` for every recognised marker. An unexpected-marker
    /// record (permissive scans only) carries the two raw bytes found at `offset`,
    /// so its high byte may be anything, e.g. `0x1234`.
    pub id: u16,
    /// Offset of the marker's first byte within the scanned buffer.
    pub offset: usize,
    /// Marker kind and decoded fields (dimensions, table ids, byte counts).
    pub description: String,
}

impl Marker {
    pub fn new(id: u16, description: impl Into<String>) -> Self {
        Self {
            id,
            offset: 0,
            description: description.into(),
        }
    }
}

/// Decoder output: a marker and the number of bytes it spans.
///
/// `consumed` covers the code, the length-prefixed payload and any trailing
/// entropy-coded data. It is 0 only for EOI.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Segment {
    pub consumed: usize,
    pub marker: Marker,
}

/// How a walk over one buffer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Termination {
    /// An EOI marker was reached.
    EndOfImage,
    /// The buffer ran out before any EOI marker.
    Exhausted,
}

/// Everything one scan of one buffer produced.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScanReport {
    /// Markers in stream order.
    pub markers: Vec<Marker>,
    pub termination: Termination,
    /// Non-fatal anomalies (unexpected markers, missing EOI).
    pub warnings: Vec<String>,
    /// Size of the scanned buffer in bytes.
    pub size_bytes: Option<usize>,
}

impl ScanReport {
    /// True if any RSTm marker was seen, i.e. the image was encoded with a restart interval.
    pub fn has_restart_markers(&self) -> bool {
        self.markers.iter().any(|m| is_restart(m.id))
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::EndOfImage
    }
}
