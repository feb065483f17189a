//! Scan configuration.

#[cfg(feature = "serde")]
use serde::Serialize;

/// What the decoder does with a code that is not in the marker lexicon
/// (fill bytes `FF FF`, stuffing `FF 00` outside entropy data, RES codes, or a
/// first byte other than `0xFF`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnknownMarkerPolicy {
    /// Emit an "unexpected marker" record and resync on the next real marker.
    #[default]
    Permissive,
    /// Fail the scan with [`crate::ScanError::UnknownMarker`].
    Strict,
}

/// Options for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScanOptions {
    pub unknown_markers: UnknownMarkerPolicy,
}

impl ScanOptions {
    /// Permissive scan (the default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict scan: unknown markers are fatal.
    pub fn strict() -> Self {
        Self::default().with_unknown_markers(UnknownMarkerPolicy::Strict)
    }

    pub fn with_unknown_markers(mut self, policy: UnknownMarkerPolicy) -> Self {
        self.unknown_markers = policy;
        self
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.unknown_markers == UnknownMarkerPolicy::Strict
    }
}
