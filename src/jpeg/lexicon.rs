//! JPEG marker code space (ITU-T T.81, Table B.1).
//!
//! Every marker is a big-endian `u16` whose high byte is `0xFF`. Some markers are
//! just those two bytes; most are followed by a two-byte length that counts itself
//! plus the payload but not the marker. SOS and RSTm are followed by entropy-coded
//! data whose length is not recorded anywhere and has to be found by scanning.

/// All markers start with this byte.
pub const MARKER_PREFIX: u8 = 0xFF;

/// For temporary private use in arithmetic coding.
pub const TEM: u16 = 0xFF01;

/// Start of Frame: non-differential, Huffman coding.
pub const SOF0: u16 = 0xFFC0;
pub const SOF1: u16 = 0xFFC1;
pub const SOF2: u16 = 0xFFC2;
pub const SOF3: u16 = 0xFFC3;
/// Define Huffman Table(s). Occupies the SOF4 slot.
pub const DHT: u16 = 0xFFC4;
/// Start of Frame: differential, Huffman coding.
pub const SOF5: u16 = 0xFFC5;
pub const SOF6: u16 = 0xFFC6;
pub const SOF7: u16 = 0xFFC7;
/// Reserved for JPEG extensions. Occupies the SOF8 slot.
pub const JPG: u16 = 0xFFC8;
/// Start of Frame: non-differential, arithmetic coding.
pub const SOF9: u16 = 0xFFC9;
pub const SOF10: u16 = 0xFFCA;
pub const SOF11: u16 = 0xFFCB;
/// Define arithmetic coding conditioning(s). Occupies the SOF12 slot.
pub const DAC: u16 = 0xFFCC;
/// Start of Frame: differential, arithmetic coding.
pub const SOF13: u16 = 0xFFCD;
pub const SOF14: u16 = 0xFFCE;
pub const SOF15: u16 = 0xFFCF;

/// Restart markers. Inserted every Ri MCUs when a DRI segment set an interval;
/// the low three bits cycle from 0 to 7.
pub const RST0: u16 = 0xFFD0;
pub const RST7: u16 = 0xFFD7;

pub const SOI: u16 = 0xFFD8;
pub const EOI: u16 = 0xFFD9;
pub const SOS: u16 = 0xFFDA;
pub const DQT: u16 = 0xFFDB;
pub const DNL: u16 = 0xFFDC;
pub const DRI: u16 = 0xFFDD;
pub const DHP: u16 = 0xFFDE;
pub const EXP: u16 = 0xFFDF;

/// Application segments. APP0 carries JFIF, APP1 carries EXIF.
pub const APP0: u16 = 0xFFE0;
pub const APP1: u16 = 0xFFE1;
pub const APP15: u16 = 0xFFEF;

/// JPEG extension range JPG0..=JPG13.
pub const JPG0: u16 = 0xFFF0;
pub const JPG13: u16 = 0xFFFD;

pub const COM: u16 = 0xFFFE;

/// Structural category of a marker code; drives the segment decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MarkerKind {
    /// SOI: two bytes, no payload.
    StartOfImage,
    /// EOI: two bytes, terminates the stream.
    EndOfImage,
    /// TEM: two bytes, no payload.
    Temporary,
    /// SOFn frame header (never SOF4/SOF8/SOF12, which are DHT/JPG/DAC).
    Frame(u8),
    /// DHP: same payload layout as a frame header.
    HierarchicalProgression,
    /// SOS header plus entropy-coded data.
    StartOfScan,
    /// RSTm plus entropy-coded data.
    Restart(u8),
    /// APPn.
    Application(u8),
    QuantizationTables,
    HuffmanTables,
    ArithmeticConditioning,
    RestartInterval,
    NumberOfLines,
    ExpandReference,
    Comment,
    /// JPG (`None`) or JPGn (`Some(n)`).
    Extension(Option<u8>),
}

impl MarkerKind {
    /// Look up the category of a full 16-bit marker code. `None` for fill bytes,
    /// byte-stuffing, the reserved RES range and anything not starting with `0xFF`.
    pub fn from_code(code: u16) -> Option<MarkerKind> {
        let [prefix, low] = code.to_be_bytes();
        if prefix != MARKER_PREFIX {
            return None;
        }
        let kind = match low {
            0x01 => MarkerKind::Temporary,
            0xC4 => MarkerKind::HuffmanTables,
            0xC8 => MarkerKind::Extension(None),
            0xCC => MarkerKind::ArithmeticConditioning,
            0xC0..=0xCF => MarkerKind::Frame(low - 0xC0),
            0xD0..=0xD7 => MarkerKind::Restart(low - 0xD0),
            0xD8 => MarkerKind::StartOfImage,
            0xD9 => MarkerKind::EndOfImage,
            0xDA => MarkerKind::StartOfScan,
            0xDB => MarkerKind::QuantizationTables,
            0xDC => MarkerKind::NumberOfLines,
            0xDD => MarkerKind::RestartInterval,
            0xDE => MarkerKind::HierarchicalProgression,
            0xDF => MarkerKind::ExpandReference,
            0xE0..=0xEF => MarkerKind::Application(low - 0xE0),
            0xF0..=0xFD => MarkerKind::Extension(Some(low - 0xF0)),
            0xFE => MarkerKind::Comment,
            _ => return None,
        };
        Some(kind)
    }

    /// Markers made of the two code bytes only.
    #[inline]
    pub fn is_fixed(self) -> bool {
        matches!(
            self,
            MarkerKind::StartOfImage | MarkerKind::EndOfImage | MarkerKind::Temporary
        )
    }

    /// Markers followed by entropy-coded data of undetermined length.
    #[inline]
    pub fn has_entropy_data(self) -> bool {
        matches!(self, MarkerKind::StartOfScan | MarkerKind::Restart(_))
    }
}

/// Process name of each frame type (CCITT Rec. T.81, Table B.1), indexed by `n` in SOFn.
/// Slots 4, 8 and 12 belong to DHT, JPG and DAC.
pub const SOF_NAMES: [Option<&str>; 16] = [
    Some("Baseline DCT"),
    Some("Extended sequential DCT"),
    Some("Progressive DCT, Huffman coding"),
    Some("Lossless (sequential)"),
    None,
    Some("Differential sequential DCT"),
    Some("Differential progressive DCT"),
    Some("Differential lossless (sequential)"),
    None,
    Some("Extended sequential DCT, arithmetic coding"),
    Some("Progressive DCT, arithmetic coding"),
    Some("Lossless (sequential), arithmetic coding"),
    None,
    Some("Differential sequential DCT, arithmetic coding"),
    Some("Differential progressive DCT, arithmetic coding"),
    Some("Differential lossless (sequential), arithmetic coding"),
];

/// Name of the SOFn process, `None` for slots that are not frame markers.
#[inline]
pub fn sof_name(n: u8) -> Option<&'static str> {
    SOF_NAMES.get(n as usize).copied().flatten()
}

/// True for exactly the eight restart markers `0xFFD0..=0xFFD7`.
#[inline]
pub fn is_restart(id: u16) -> bool {
    (RST0..=RST7).contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_range_is_exact() {
        for id in RST0..=RST7 {
            assert!(is_restart(id), "{id:#06X}");
        }
        assert!(!is_restart(SOF15));
        assert!(!is_restart(SOI));
        assert!(!is_restart(0x00D0));
        assert!(!is_restart(0));
        assert!(!is_restart(u16::MAX));
    }

    #[test]
    fn table_slots_in_sof_range_are_not_frames() {
        assert_eq!(MarkerKind::from_code(DHT), Some(MarkerKind::HuffmanTables));
        assert_eq!(MarkerKind::from_code(JPG), Some(MarkerKind::Extension(None)));
        assert_eq!(MarkerKind::from_code(DAC), Some(MarkerKind::ArithmeticConditioning));
        assert_eq!(MarkerKind::from_code(SOF15), Some(MarkerKind::Frame(15)));
        for n in [4u8, 8, 12] {
            assert!(sof_name(n).is_none());
        }
    }

    #[test]
    fn fill_and_stuffing_are_unknown() {
        assert_eq!(MarkerKind::from_code(0xFF00), None);
        assert_eq!(MarkerKind::from_code(0xFFFF), None);
        assert_eq!(MarkerKind::from_code(0xFF02), None);
        assert_eq!(MarkerKind::from_code(0x00D8), None);
    }

    #[test]
    fn categories() {
        assert!(MarkerKind::from_code(TEM).unwrap().is_fixed());
        assert!(MarkerKind::from_code(EOI).unwrap().is_fixed());
        assert!(MarkerKind::from_code(SOS).unwrap().has_entropy_data());
        assert!(MarkerKind::from_code(0xFFD3).unwrap().has_entropy_data());
        assert_eq!(MarkerKind::from_code(APP15), Some(MarkerKind::Application(15)));
        assert_eq!(MarkerKind::from_code(JPG13), Some(MarkerKind::Extension(Some(13))));
    }
}
