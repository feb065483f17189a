//! Segment decoder: given a buffer positioned at a marker, return the marker record
//! and the number of bytes the segment spans.
//!
//! Operates on slices only. Every field read is bounds-checked against both the
//! buffer and the segment's declared length; a read that falls outside either is
//! reported as [`ScanError::Truncated`].

use log::{debug, warn};

use crate::error::ScanError;
use crate::jpeg::lexicon::{
    sof_name, MarkerKind, APP0, APP1, COM, DAC, DHP, DHT, DNL, DQT, DRI, EOI, EXP, JPG, MARKER_PREFIX,
    SOF0, SOI, SOS, TEM,
};
use crate::options::ScanOptions;
use crate::result::{Marker, Segment};

/// Marker code size.
const CODE_LEN: usize = 2;
/// Marker code plus the length field.
const HEADER_LEN: usize = 4;
/// Minimal JFIF APP0 payload: identifier(5) version(2) units(1) density(2x2) thumbnail(2x1).
const JFIF_PAYLOAD_LEN: usize = 14;
const JFIF_IDENT: &[u8; 5] = b"JFIF\0";
const JFXX_IDENT: &[u8; 5] = b"JFXX\0";
const EXIF_IDENT: &[u8; 6] = b"Exif\0\0";
/// Longest comment excerpt placed in a COM description.
const MAX_COMMENT_PREVIEW: usize = 40;

#[inline]
fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let end = offset + 2;
    if end > data.len() {
        return None;
    }
    Some(u16::from_be_bytes([data[offset], data[offset + 1]]))
}

/// Position of the first real marker at or after `start`: a `0xFF` followed by
/// anything other than `0x00` (byte stuffing) or `0xFF` (fill). Entropy-coded data
/// that never hits one runs to the end of the buffer, so `data.len()` is returned.
///
/// A run of fill bytes resolves to its last `0xFF`, which is the one carrying the
/// marker code.
pub fn next_marker_boundary(data: &[u8], start: usize) -> usize {
    let mut i = start;
    while i + 1 < data.len() {
        if data[i] == MARKER_PREFIX && data[i + 1] != 0x00 && data[i + 1] != MARKER_PREFIX {
            return i;
        }
        i += 1;
    }
    data.len()
}

/// Payload of one length-prefixed segment (the bytes after the length field).
struct Payload<'a> {
    code: u16,
    length: u16,
    bytes: &'a [u8],
}

impl<'a> Payload<'a> {
    /// Read the length field and carve out the payload. Fails if the field itself or
    /// the declared span lies past the end of `data`.
    fn read(data: &'a [u8], code: u16) -> Result<Self, ScanError> {
        let length = read_u16_be(data, CODE_LEN).ok_or(ScanError::Truncated {
            code,
            offset: 0,
            needed: HEADER_LEN,
            available: data.len(),
        })?;
        if (length as usize) < 2 {
            return Err(ScanError::InvalidLength {
                code,
                offset: 0,
                length,
            });
        }
        let span = CODE_LEN + length as usize;
        if span > data.len() {
            return Err(ScanError::Truncated {
                code,
                offset: 0,
                needed: span,
                available: data.len(),
            });
        }
        Ok(Self {
            code,
            length,
            bytes: &data[HEADER_LEN..span],
        })
    }

    /// Bytes from the marker code to the end of the payload.
    #[inline]
    fn span(&self) -> usize {
        CODE_LEN + self.length as usize
    }

    fn slice(&self, at: usize, len: usize) -> Result<&'a [u8], ScanError> {
        let end = at + len;
        if end > self.bytes.len() {
            return Err(ScanError::Truncated {
                code: self.code,
                offset: 0,
                needed: HEADER_LEN + end,
                available: self.span(),
            });
        }
        Ok(&self.bytes[at..end])
    }

    #[inline]
    fn u8(&self, at: usize) -> Result<u8, ScanError> {
        Ok(self.slice(at, 1)?[0])
    }

    #[inline]
    fn u16(&self, at: usize) -> Result<u16, ScanError> {
        let b = self.slice(at, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Frame-header fields shared by SOFn and DHP.
struct FrameHeader {
    precision: u8,
    height: u16,
    width: u16,
    components: u8,
}

impl FrameHeader {
    fn read(payload: &Payload<'_>) -> Result<Self, ScanError> {
        Ok(Self {
            precision: payload.u8(0)?,
            height: payload.u16(1)?,
            width: payload.u16(3)?,
            components: payload.u8(5)?,
        })
    }

    fn fields(&self) -> String {
        format!(
            "[P:{}, Y:{}, X:{}, Nf:{}]",
            self.precision, self.height, self.width, self.components
        )
    }
}

/// Decode the segment starting at `data[0]`.
///
/// `data` must start at the marker's leading byte and hold at least two bytes. The
/// returned record's `offset` is 0; the walker stamps the real one.
pub fn decode_segment(data: &[u8], options: &ScanOptions) -> Result<Segment, ScanError> {
    let code = read_u16_be(data, 0).ok_or_else(|| ScanError::Truncated {
        code: data.first().map(|&b| u16::from(b) << 8).unwrap_or(0),
        offset: 0,
        needed: CODE_LEN,
        available: data.len(),
    })?;

    let Some(kind) = MarkerKind::from_code(code) else {
        return unexpected_marker(data, code, options);
    };

    let segment = match kind {
        MarkerKind::StartOfImage => make_segment(CODE_LEN, SOI, "0xFFD8: Start Of Image".to_string()),
        MarkerKind::EndOfImage => make_segment(0, EOI, "0xFFD9: End Of Image".to_string()),
        MarkerKind::Temporary => make_segment(
            CODE_LEN,
            TEM,
            "0xFF01: TEM (temporary private use in arithmetic coding)".to_string(),
        ),
        MarkerKind::StartOfScan => start_of_scan(data)?,
        MarkerKind::Restart(m) => {
            let end = next_marker_boundary(data, CODE_LEN);
            make_segment(
                end,
                code,
                format!("0x{:04X}: RST{} ({} bytes)", code, m, end - CODE_LEN),
            )
        }
        _ => {
            let payload = Payload::read(data, code)?;
            let description = describe(kind, &payload)?;
            make_segment(payload.span(), code, description)
        }
    };

    debug!(
        "decoded 0x{:04X} ({} bytes): {}",
        code, segment.consumed, segment.marker.description
    );
    Ok(segment)
}

#[inline]
fn make_segment(consumed: usize, id: u16, description: String) -> Segment {
    Segment {
        consumed,
        marker: Marker::new(id, description),
    }
}

fn start_of_scan(data: &[u8]) -> Result<Segment, ScanError> {
    let payload = Payload::read(data, SOS)?;
    let components = payload.u8(0)?;
    let header_end = payload.span();
    let end = next_marker_boundary(data, header_end);
    Ok(make_segment(
        end,
        SOS,
        format!(
            "0xFFDA: Start Of Scan [Ns: {}] ({} bytes)",
            components,
            end - header_end
        ),
    ))
}

fn unexpected_marker(data: &[u8], code: u16, options: &ScanOptions) -> Result<Segment, ScanError> {
    if options.is_strict() {
        return Err(ScanError::UnknownMarker { code, offset: 0 });
    }
    // A second byte of 0xFF may already be the prefix of the next real marker
    // (fill byte before a marker), so resync from there.
    let start = if data.get(1) == Some(&MARKER_PREFIX) { 1 } else { CODE_LEN };
    let end = next_marker_boundary(data, start);
    warn!("unexpected marker 0x{:04X}, skipping {} bytes", code, end);
    Ok(make_segment(
        end,
        code,
        format!(
            "0x{:04X}: unexpected marker ({} bytes)",
            code,
            end.saturating_sub(CODE_LEN)
        ),
    ))
}

/// Description of a length-prefixed segment; reads only inside `payload`.
fn describe(kind: MarkerKind, payload: &Payload<'_>) -> Result<String, ScanError> {
    let length = payload.length;
    let description = match kind {
        MarkerKind::Application(0) => app0(payload)?,
        MarkerKind::Application(1) => {
            if payload.bytes.starts_with(EXIF_IDENT) {
                format!("0x{:04X}: APP1 EXIF (length {})", APP1, length)
            } else {
                format!("0x{:04X}: APP1 (length {})", APP1, length)
            }
        }
        MarkerKind::Application(n) => {
            format!("0x{:04X}: APP{} (length {})", payload.code, n, length)
        }
        MarkerKind::QuantizationTables => format!(
            "0x{:04X}: Define Quantization Table(s) [Pq:Tq {}] (length {})",
            DQT,
            quantization_tables(payload)?.join(", "),
            length
        ),
        MarkerKind::HuffmanTables => format!(
            "0x{:04X}: Define Huffman Table(s) [Tc:Th {}] (length {})",
            DHT,
            huffman_tables(payload)?.join(", "),
            length
        ),
        MarkerKind::Frame(0) => format!(
            "0x{:04X}: Start Of Frame (baseline DCT) {}",
            SOF0,
            FrameHeader::read(payload)?.fields()
        ),
        MarkerKind::Frame(n) => format!(
            "0x{:04X}: Start Of Frame (SOF{}) ({}) {}",
            payload.code,
            n,
            sof_name(n).unwrap_or("reserved"),
            FrameHeader::read(payload)?.fields()
        ),
        MarkerKind::HierarchicalProgression => format!(
            "0x{:04X}: Define hierarchical progression {}",
            DHP,
            FrameHeader::read(payload)?.fields()
        ),
        MarkerKind::RestartInterval => format!(
            "0x{:04X}: Define Restart Interval [Ri: {}]",
            DRI,
            payload.u16(0)?
        ),
        MarkerKind::NumberOfLines => format!(
            "0x{:04X}: Define number of lines [NL: {}]",
            DNL,
            payload.u16(0)?
        ),
        MarkerKind::ExpandReference => {
            let e = payload.u8(0)?;
            format!(
                "0x{:04X}: Expand reference component(s) [Eh:{}, Ev:{}]",
                EXP,
                e >> 4,
                e & 0x0F
            )
        }
        MarkerKind::ArithmeticConditioning => format!(
            "0x{:04X}: Define arithmetic coding conditioning(s) [{}]",
            DAC,
            arithmetic_conditioning(payload)?.join(", ")
        ),
        MarkerKind::Comment => format!(
            "0x{:04X}: Comment \"{}\" (length {})",
            COM,
            comment_preview(payload.bytes),
            length
        ),
        MarkerKind::Extension(None) => format!(
            "0x{:04X}: Reserved for JPEG extensions (length {})",
            JPG, length
        ),
        MarkerKind::Extension(Some(n)) => {
            format!("0x{:04X}: JPG{} (length {})", payload.code, n, length)
        }
        MarkerKind::StartOfImage
        | MarkerKind::EndOfImage
        | MarkerKind::Temporary
        | MarkerKind::StartOfScan
        | MarkerKind::Restart(_) => {
            format!("0x{:04X} (length {})", payload.code, length)
        }
    };
    Ok(description)
}

/// APP0: JFIF header, JFXX extension, or anything else labelled by its identifier.
fn app0(payload: &Payload<'_>) -> Result<String, ScanError> {
    let bytes = payload.bytes;
    if bytes.starts_with(JFIF_IDENT) {
        // Every JFIF field must lie inside the declared length.
        payload.slice(0, JFIF_PAYLOAD_LEN)?;
        return Ok(format!(
            "0x{:04X}: JFIF [Identifier:{}, JFIF version:{}.{:02}, Density units:{}, Xdensity:{}, Ydensity:{}, Xthumbnail:{}, Ythumbnail:{}]",
            APP0,
            identifier(payload.slice(0, JFIF_IDENT.len())?),
            payload.u8(5)?,
            payload.u8(6)?,
            payload.u8(7)?,
            payload.u16(8)?,
            payload.u16(10)?,
            payload.u8(12)?,
            payload.u8(13)?,
        ));
    }
    if bytes.starts_with(JFXX_IDENT) {
        return Ok(format!(
            "0x{:04X}: JFIF extension [Identifier:JFXX, Thumbnail format:0x{:02X}] (length {})",
            APP0,
            payload.u8(5)?,
            payload.length
        ));
    }
    Ok(format!("0x{:04X}: APP0 (length {})", APP0, payload.length))
}

/// Null-terminated identifier as text.
fn identifier(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn comment_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(MAX_COMMENT_PREVIEW)
        .take_while(|&&b| b != 0)
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

/// `Pq:Tq` for every table in a DQT payload. Pq=0 tables carry 64 one-byte
/// elements, Pq=1 tables 64 two-byte elements.
fn quantization_tables(payload: &Payload<'_>) -> Result<Vec<String>, ScanError> {
    let mut tables = Vec::new();
    let mut pos = 0;
    while pos < payload.bytes.len() {
        let pq_tq = payload.u8(pos)?;
        let precision = pq_tq >> 4;
        let size = if precision == 0 { 64 } else { 128 };
        payload.slice(pos + 1, size)?;
        tables.push(format!("{}:{}", precision, pq_tq & 0x0F));
        pos += 1 + size;
    }
    Ok(tables)
}

/// `Tc:Th` for every table in a DHT payload: class/id byte, 16 code-length
/// counts, then as many symbol values as the counts add up to.
fn huffman_tables(payload: &Payload<'_>) -> Result<Vec<String>, ScanError> {
    let mut tables = Vec::new();
    let mut pos = 0;
    while pos < payload.bytes.len() {
        let tc_th = payload.u8(pos)?;
        let counts = payload.slice(pos + 1, 16)?;
        let symbols: usize = counts.iter().map(|&c| c as usize).sum();
        payload.slice(pos + 17, symbols)?;
        tables.push(format!("{}:{}", tc_th >> 4, tc_th & 0x0F));
        pos += 17 + symbols;
    }
    Ok(tables)
}

/// DAC entries: (Tc<<4 | Tb, Cs) pairs.
fn arithmetic_conditioning(payload: &Payload<'_>) -> Result<Vec<String>, ScanError> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < payload.bytes.len() {
        let tc_tb = payload.u8(pos)?;
        let cs = payload.u8(pos + 1)?;
        entries.push(format!("Tc:{}, Tb:{}, Cs:{}", tc_tb >> 4, tc_tb & 0x0F, cs));
        pos += 2;
    }
    Ok(entries)
}
