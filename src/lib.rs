//! # jpeg-markers
//!
//! Structural scanner for JPEG (ISO/IEC 10918-1) byte streams. Walks a buffer,
//! identifies every marker segment and reports its offset, span and decoded fields.
//!
//! Slice-based and allocation-light: the only allocations are the records
//! themselves. Entropy-coded data is skipped (honouring `FF 00` byte stuffing), never
//! decoded; there is no IDCT and no colour conversion.
//!
//! ## Recognised markers
//!
//! - **SOI / EOI / TEM**: two bytes, no payload.
//! - **APPn**: APP0 decoded as JFIF (identifier, version, density, thumbnail size);
//!   APP1 labelled EXIF when it carries the `Exif` identifier.
//! - **DQT / DHT / DAC**: table ids listed per segment.
//! - **SOF0..SOF15 / DHP**: precision, height, width, component count.
//! - **SOS / RST0..RST7**: header plus the byte count of the following entropy data.
//! - **DRI / DNL / EXP / COM / JPG / JPGn**: fields or length.
//!
//! ## Example
//!
//! ```no_run
//! use jpeg_markers::{scan, ScanOptions};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let report = scan(&bytes, &ScanOptions::default()).unwrap();
//! for m in &report.markers {
//!     println!("offset: {:6x} - {}", m.offset, m.description);
//! }
//! if report.has_restart_markers() {
//!     println!("encoded with a restart interval");
//! }
//! ```
//!
//! ## Errors
//!
//! Truncated segments always fail the scan ([`ScanError::Truncated`]). Unknown
//! marker codes are recorded and skipped by default; [`ScanOptions::strict`] turns
//! them into [`ScanError::UnknownMarker`].

mod error;
mod options;
mod result;
pub mod jpeg;
pub mod load;

pub use error::{LoadError, ScanError};
pub use jpeg::{decode_segment, has_restart_markers, is_jpeg, is_restart, scan, scan_all, MarkerWalker};
pub use options::{ScanOptions, UnknownMarkerPolicy};
pub use result::{Marker, ScanReport, Segment, Termination};

/// Result of scanning one item in a batch (path or index + scan outcome).
#[derive(Debug, Clone)]
pub struct BatchItem<T> {
    pub path_or_id: T,
    pub result: Result<ScanReport, ScanError>,
}

/// Scan many buffers in sequence.
pub fn scan_batch<I, B>(items: I, options: &ScanOptions) -> Vec<BatchItem<B>>
where
    I: IntoIterator<Item = (B, Vec<u8>)>,
{
    items
        .into_iter()
        .map(|(path_or_id, bytes)| BatchItem {
            path_or_id,
            result: scan(&bytes, options),
        })
        .collect()
}

/// Scan many buffers on the rayon thread pool; output keeps input order.
#[cfg(feature = "parallel")]
pub fn scan_batch_parallel<B>(items: Vec<(B, Vec<u8>)>, options: &ScanOptions) -> Vec<BatchItem<B>>
where
    B: Send,
{
    use rayon::prelude::*;

    items
        .into_par_iter()
        .map(|(path_or_id, bytes)| BatchItem {
            path_or_id,
            result: scan(&bytes, options),
        })
        .collect()
}
