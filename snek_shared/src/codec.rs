//! Width-negotiated unsigned integers.
//!
//! The metadata message fixes how many bytes each coordinate takes for the
//! rest of the connection. [`IntDecoder`] picks the matching conversion once
//! and every later coordinate goes through that one function.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    endian::ByteOrder,
    error::{ConfigFault, ProtocolViolation},
};

/// Bytes per coordinate magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IntWidth {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl IntWidth {
    pub fn from_bytes(n: u8) -> Result<Self, ConfigFault> {
        match n {
            1 => Ok(IntWidth::One),
            2 => Ok(IntWidth::Two),
            4 => Ok(IntWidth::Four),
            8 => Ok(IntWidth::Eight),
            other => Err(ConfigFault::UnsupportedWidth(other)),
        }
    }

    /// Width announced by the first metadata byte, which carries it in bits.
    pub fn from_header(byte0: u8) -> Result<Self, ConfigFault> {
        Self::from_bytes(byte0 / 8)
    }

    pub const fn bytes(self) -> usize {
        self as usize
    }

    /// The metadata header byte announcing this width.
    pub const fn header(self) -> u8 {
        (self as u8) * 8
    }
}

impl TryFrom<u8> for IntWidth {
    type Error = ConfigFault;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_bytes(n)
    }
}

impl From<IntWidth> for u8 {
    fn from(w: IntWidth) -> u8 {
        w as u8
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} byte(s)", self.bytes())
    }
}

type DecodeFn = fn(&[u8]) -> u64;

fn u8_any(b: &[u8]) -> u64 {
    u64::from(b[0])
}

fn u16_le(b: &[u8]) -> u64 {
    u64::from(u16::from_le_bytes([b[0], b[1]]))
}

fn u16_be(b: &[u8]) -> u64 {
    u64::from(u16::from_be_bytes([b[0], b[1]]))
}

fn u32_le(b: &[u8]) -> u64 {
    u64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn u32_be(b: &[u8]) -> u64 {
    u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn u64_le(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

fn u64_be(b: &[u8]) -> u64 {
    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Dispatch table indexed by `(width, order)`.
fn select(width: IntWidth, order: ByteOrder) -> DecodeFn {
    match (width, order) {
        (IntWidth::One, _) => u8_any,
        (IntWidth::Two, ByteOrder::Little) => u16_le,
        (IntWidth::Two, ByteOrder::Big) => u16_be,
        (IntWidth::Four, ByteOrder::Little) => u32_le,
        (IntWidth::Four, ByteOrder::Big) => u32_be,
        (IntWidth::Eight, ByteOrder::Little) => u64_le,
        (IntWidth::Eight, ByteOrder::Big) => u64_be,
    }
}

/// Decoder bound to one width and byte order.
#[derive(Clone, Copy)]
pub struct IntDecoder {
    width: IntWidth,
    order: ByteOrder,
    decode_fn: DecodeFn,
}

impl IntDecoder {
    pub fn new(width: IntWidth, order: ByteOrder) -> Self {
        Self {
            width,
            order,
            decode_fn: select(width, order),
        }
    }

    pub fn width(&self) -> IntWidth {
        self.width
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Decodes the first `width` bytes of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<u64, ProtocolViolation> {
        let need = self.width.bytes();
        if bytes.len() < need {
            return Err(ProtocolViolation::ShortInteger {
                need,
                got: bytes.len(),
            });
        }
        Ok((self.decode_fn)(&bytes[..need]))
    }

    /// Decodes three consecutive magnitudes, as used for positions and extents.
    pub fn decode_triple(&self, bytes: &[u8]) -> Result<[u64; 3], ProtocolViolation> {
        let w = self.width.bytes();
        Ok([
            self.decode(bytes)?,
            self.decode(bytes.get(w..).unwrap_or_default())?,
            self.decode(bytes.get(2 * w..).unwrap_or_default())?,
        ])
    }

    /// Appends `value` in this decoder's width and order, truncating high bits.
    pub fn encode_into(&self, value: u64, out: &mut Vec<u8>) {
        let w = self.width.bytes();
        match self.order {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()[..w]),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()[8 - w..]),
        }
    }
}

impl fmt::Debug for IntDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntDecoder")
            .field("width", &self.width)
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];

    #[test]
    fn width_from_header() {
        assert_eq!(IntWidth::from_header(8).unwrap(), IntWidth::One);
        assert_eq!(IntWidth::from_header(16).unwrap(), IntWidth::Two);
        assert_eq!(IntWidth::from_header(32).unwrap(), IntWidth::Four);
        assert_eq!(IntWidth::from_header(64).unwrap(), IntWidth::Eight);
        // Low bits are discarded by the division.
        assert_eq!(IntWidth::from_header(39).unwrap(), IntWidth::Four);
    }

    #[test]
    fn unsupported_widths_rejected() {
        for n in [0u8, 3, 5, 6, 7, 9, 16, 31] {
            assert_eq!(
                IntWidth::from_bytes(n),
                Err(ConfigFault::UnsupportedWidth(n))
            );
        }
        assert_eq!(
            IntWidth::from_header(24),
            Err(ConfigFault::UnsupportedWidth(3))
        );
    }

    #[test]
    fn width_one_ignores_order() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let d = IntDecoder::new(IntWidth::One, order);
            for b in 0..=u8::MAX {
                assert_eq!(d.decode(&[b]).unwrap(), u64::from(b));
            }
        }
    }

    #[test]
    fn decode_matches_std_for_both_orders() {
        let le = |w| IntDecoder::new(w, ByteOrder::Little);
        let be = |w| IntDecoder::new(w, ByteOrder::Big);

        let two = [SAMPLE[0], SAMPLE[1]];
        assert_eq!(le(IntWidth::Two).decode(&two).unwrap(), u64::from(u16::from_le_bytes(two)));
        assert_eq!(be(IntWidth::Two).decode(&two).unwrap(), u64::from(u16::from_be_bytes(two)));

        let four = [SAMPLE[0], SAMPLE[1], SAMPLE[2], SAMPLE[3]];
        assert_eq!(le(IntWidth::Four).decode(&four).unwrap(), u64::from(u32::from_le_bytes(four)));
        assert_eq!(be(IntWidth::Four).decode(&four).unwrap(), u64::from(u32::from_be_bytes(four)));

        assert_eq!(le(IntWidth::Eight).decode(&SAMPLE).unwrap(), u64::from_le_bytes(SAMPLE));
        assert_eq!(be(IntWidth::Eight).decode(&SAMPLE).unwrap(), u64::from_be_bytes(SAMPLE));
    }

    #[test]
    fn decode_extremes() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            assert_eq!(IntDecoder::new(IntWidth::Two, order).decode(&[0xFF; 2]).unwrap(), 0xFFFF);
            assert_eq!(IntDecoder::new(IntWidth::Four, order).decode(&[0; 4]).unwrap(), 0);
            assert_eq!(IntDecoder::new(IntWidth::Eight, order).decode(&[0xFF; 8]).unwrap(), u64::MAX);
        }
    }

    #[test]
    fn short_slice_is_an_error() {
        let d = IntDecoder::new(IntWidth::Four, ByteOrder::Big);
        assert_eq!(
            d.decode(&[1, 2, 3]),
            Err(ProtocolViolation::ShortInteger { need: 4, got: 3 })
        );
    }

    #[test]
    fn decode_triple_reads_consecutive_fields() {
        let d = IntDecoder::new(IntWidth::Two, ByteOrder::Big);
        assert_eq!(
            d.decode_triple(&[0, 1, 0, 2, 1, 0]).unwrap(),
            [1, 2, 256]
        );
        assert!(d.decode_triple(&[0, 1, 0, 2, 1]).is_err());
    }

    #[test]
    fn encode_into_is_read_back() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let d = IntDecoder::new(IntWidth::Four, order);
            let mut buf = Vec::new();
            d.encode_into(0xDEAD_BEEF, &mut buf);
            assert_eq!(buf.len(), 4);
            assert_eq!(d.decode(&buf).unwrap(), 0xDEAD_BEEF);
        }
    }
}
