//! Proof-of-Work descriptors and compact difficulty conversion.
//!
//! The network supports several PoW algorithms at once. A block header
//! commits to one algorithm and its target; a block template additionally
//! carries the targets for every supported algorithm so external miners can
//! pick a different one and rewrite the header.

use num_bigint::{BigInt, Sign};

/// Supported Proof-of-Work algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowType {
    /// Double Blake2b hashing.
    Blake2bD,
    /// X16R v3 chained hashing.
    X16Rv3,
    /// X8R16 chained hashing.
    X8r16,
    /// Keccak-256 hashing.
    Keccak256,
    /// Cuckaroo cycle finding.
    Cuckaroo,
    /// Cuckaroom cycle finding.
    Cuckaroom,
    /// Cuckatoo cycle finding.
    Cuckatoo,
}

impl PowType {
    /// Every supported algorithm, in wire-id order.
    pub const ALL: [PowType; 7] = [
        PowType::Blake2bD,
        PowType::X16Rv3,
        PowType::X8r16,
        PowType::Keccak256,
        PowType::Cuckaroo,
        PowType::Cuckaroom,
        PowType::Cuckatoo,
    ];

    /// Whether the algorithm is a cuckoo-cycle variant. Cuckoo targets are
    /// advertised as plain u64 base difficulties rather than compact bits.
    pub fn is_cuckoo(&self) -> bool {
        matches!(
            self,
            PowType::Cuckaroo | PowType::Cuckaroom | PowType::Cuckatoo
        )
    }

    /// Single-byte algorithm id used in the header encoding.
    pub fn wire_id(&self) -> u8 {
        match self {
            PowType::Blake2bD => 0,
            PowType::X16Rv3 => 1,
            PowType::X8r16 => 2,
            PowType::Keccak256 => 3,
            PowType::Cuckaroo => 4,
            PowType::Cuckaroom => 5,
            PowType::Cuckatoo => 6,
        }
    }
}

/// Expand a compact difficulty representation into the full target.
///
/// The compact form packs a big integer into 32 bits: the high byte is a
/// base-256 exponent, bit 23 is the sign and the low 23 bits are the
/// mantissa.
pub fn compact_to_big(compact: u32) -> BigInt {
    let mantissa = compact & 0x007f_ffff;
    let negative = compact & 0x0080_0000 != 0;
    let exponent = (compact >> 24) as usize;

    let mut target = if exponent <= 3 {
        BigInt::from(mantissa >> (8 * (3 - exponent)))
    } else {
        BigInt::from(mantissa) << (8 * (exponent - 3))
    };
    if negative {
        target = -target;
    }
    target
}

/// Pack a big integer target back into the compact representation.
pub fn big_to_compact(target: &BigInt) -> u32 {
    let (sign, bytes) = target.to_bytes_be();
    if sign == Sign::NoSign {
        return 0;
    }

    let mut exponent = bytes.len();
    let mut mantissa: u32 = if exponent <= 3 {
        let mut m = 0u32;
        for b in &bytes {
            m = (m << 8) | *b as u32;
        }
        m << (8 * (3 - exponent))
    } else {
        ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
    };

    // When the mantissa would set the sign bit, shift it down and bump the
    // exponent instead.
    if mantissa & 0x0080_0000 != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    let mut compact = ((exponent as u32) << 24) | mantissa;
    if sign == Sign::Minus {
        compact |= 0x0080_0000;
    }
    compact
}

/// Expand a compact difficulty into a u64 base difficulty, clamping targets
/// that exceed the u64 range. Used for the cuckoo-variant entries of the
/// per-algorithm difficulty bundle.
pub fn compact_to_u64(compact: u32) -> u64 {
    u64::try_from(compact_to_big(compact)).unwrap_or(u64::MAX)
}
