//! Error types for scanning and loading.

/// Errors returned by the segment decoder and the stream walker.
///
/// `offset` is always relative to the start of the scanned buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A length field, payload field or declared segment span reads past the end of
    /// the buffer or past the segment's own declared length.
    #[error("truncated segment 0x{code:04X} at offset 0x{offset:x}: needs {needed} bytes, {available} available")]
    Truncated {
        code: u16,
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Length field smaller than the two bytes it occupies.
    #[error("invalid length {length} in segment 0x{code:04X} at offset 0x{offset:x}")]
    InvalidLength { code: u16, offset: usize, length: u16 },
    /// Code outside the marker lexicon (only raised with the strict policy).
    #[error("unknown marker 0x{code:04X} at offset 0x{offset:x}")]
    UnknownMarker { code: u16, offset: usize },
}

impl ScanError {
    /// Shift the error's offset by `base` (decoder errors are relative to the segment).
    pub(crate) fn at(self, base: usize) -> Self {
        match self {
            ScanError::Truncated {
                code,
                offset,
                needed,
                available,
            } => ScanError::Truncated {
                code,
                offset: offset + base,
                needed,
                available,
            },
            ScanError::InvalidLength { code, offset, length } => ScanError::InvalidLength {
                code,
                offset: offset + base,
                length,
            },
            ScanError::UnknownMarker { code, offset } => ScanError::UnknownMarker {
                code,
                offset: offset + base,
            },
        }
    }
}

/// Errors from the file / URL loader.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error downloading {url}: status code is {status}")]
    Status { url: String, status: u16 },
    #[error("error downloading {url}: {message}")]
    Network { url: String, message: String },
    #[error("cannot download {0}: built without the `http` feature")]
    HttpDisabled(String),
}
