//! Stream walker: drives the segment decoder across a whole buffer.
//!
//! Single forward pass. Each step decodes the segment at the current offset, stamps
//! the offset on the record and advances by the consumed length. The walk ends at
//! EOI (consumed 0) or when the offset reaches the end of the buffer.

use log::{debug, warn};

use crate::error::ScanError;
use crate::jpeg::lexicon::{is_restart, MarkerKind};
use crate::jpeg::parser::decode_segment;
use crate::options::ScanOptions;
use crate::result::{Marker, ScanReport, Segment, Termination};

/// Iterator over the segments of one buffer.
///
/// Yields `Ok(segment)` with `segment.marker.offset` set to the absolute offset.
/// After EOI, an error, or the end of the buffer it yields `None` forever.
pub struct MarkerWalker<'a> {
    data: &'a [u8],
    options: ScanOptions,
    offset: usize,
    termination: Option<Termination>,
    failed: bool,
}

impl<'a> MarkerWalker<'a> {
    pub fn new(data: &'a [u8], options: ScanOptions) -> Self {
        Self {
            data,
            options,
            offset: 0,
            termination: None,
            failed: false,
        }
    }

    /// Offset of the next segment to decode.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// How the walk ended; `None` while it is still running or after an error.
    #[inline]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }
}

impl Iterator for MarkerWalker<'_> {
    type Item = Result<Segment, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.termination.is_some() {
            return None;
        }
        // Streams that never present EOI end here instead of indexing past the buffer.
        if self.offset >= self.data.len() {
            self.termination = Some(Termination::Exhausted);
            return None;
        }
        let mut segment = match decode_segment(&self.data[self.offset..], &self.options) {
            Ok(s) => s,
            Err(e) => {
                self.failed = true;
                return Some(Err(e.at(self.offset)));
            }
        };
        segment.marker.offset = self.offset;
        if segment.consumed == 0 {
            self.termination = Some(Termination::EndOfImage);
        } else {
            self.offset += segment.consumed;
        }
        Some(Ok(segment))
    }
}

impl std::iter::FusedIterator for MarkerWalker<'_> {}

/// Scan `data` and return every marker record in stream order (permissive policy).
///
/// A buffer that runs out before EOI still returns the records collected so far.
pub fn scan_all(data: &[u8]) -> Result<Vec<Marker>, ScanError> {
    MarkerWalker::new(data, ScanOptions::default())
        .map(|segment| segment.map(|s| s.marker))
        .collect()
}

/// Scan `data` with `options` and return the full report.
pub fn scan(data: &[u8], options: &ScanOptions) -> Result<ScanReport, ScanError> {
    let mut walker = MarkerWalker::new(data, options.clone());
    let mut markers = Vec::new();
    let mut warnings = Vec::new();
    for segment in walker.by_ref() {
        let marker = segment?.marker;
        if MarkerKind::from_code(marker.id).is_none() {
            warnings.push(format!(
                "unexpected marker 0x{:04X} at offset 0x{:x}",
                marker.id, marker.offset
            ));
        }
        markers.push(marker);
    }
    let termination = walker.termination().unwrap_or(Termination::Exhausted);
    if termination == Termination::Exhausted {
        warn!(
            "no end-of-image marker in {} bytes ({} markers)",
            data.len(),
            markers.len()
        );
        warnings.push("no end-of-image marker before end of data".to_string());
    }
    debug!("scanned {} bytes: {} markers", data.len(), markers.len());
    Ok(ScanReport {
        markers,
        termination,
        warnings,
        size_bytes: Some(data.len()),
    })
}

/// True if the stream contains any RSTm marker (the image uses a restart interval).
pub fn has_restart_markers(data: &[u8]) -> Result<bool, ScanError> {
    for segment in MarkerWalker::new(data, ScanOptions::default()) {
        if is_restart(segment?.marker.id) {
            return Ok(true);
        }
    }
    Ok(false)
}
