//! Proof-of-work targets: compact encoding, block work and hash checks
//!
//! Targets are unsigned 256-bit integers. Block headers carry them in the
//! lossy 32-bit "compact" form: the top byte is a byte-length exponent and
//! the low three bytes are a sign-magnitude mantissa.
//!
//! target = mantissa * 256^(exponent - 3)

use crate::error::{ConsensusError, Result};
use crate::types::BlockHeader;
use primitive_types::{U256, U512};

/// Compact sign bit.
const COMPACT_SIGN_BIT: u32 = 0x0080_0000;

/// Mantissa bits of a compact value, sign excluded.
const COMPACT_MANTISSA_MASK: u32 = 0x007f_ffff;

/// ExpandTarget: ℕ32 → ℕ256
///
/// Decode compact `bits` to the full target. Negative encodings and
/// encodings that do not fit in 256 bits are rejected.
pub fn decode_compact_bits(bits: u32) -> Result<U256> {
    let size = bits >> 24;
    let word = bits & COMPACT_MANTISSA_MASK;

    if word != 0 && bits & COMPACT_SIGN_BIT != 0 {
        return Err(ConsensusError::InvalidCompactBits(bits));
    }
    let overflow = word != 0
        && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));
    if overflow {
        return Err(ConsensusError::InvalidCompactBits(bits));
    }

    if size <= 3 {
        Ok(U256::from(word >> (8 * (3 - size))))
    } else {
        Ok(U256::from(word) << (8 * (size - 3)) as usize)
    }
}

/// CompressTarget: ℕ256 → ℕ32
///
/// Encode a target into compact form. The exponent counts the bytes needed
/// to hold the value plus a clear sign bit, so the mantissa never has its
/// top bit set. Precision beyond the three mantissa bytes is truncated.
pub fn encode_compact_bits(target: &U256) -> u32 {
    let mut size = (target.bits() / 8 + 1) as u32;
    let mut compact = if size <= 3 {
        target.low_u32() << (8 * (3 - size))
    } else {
        (*target >> (8 * (size - 3)) as usize).low_u32()
    };
    if compact & COMPACT_SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }
    compact | (size << 24)
}

/// Work: ℕ32 → ℕ256
///
/// Expected number of hashes to find a block at this target:
/// 2^256 / (target + 1), computed as (~target / (target + 1)) + 1.
pub fn block_work(bits: u32) -> Result<U256> {
    let target = decode_compact_bits(bits)?;
    if target.is_zero() {
        return Err(ConsensusError::InvalidCompactBits(bits));
    }
    match target.checked_add(U256::one()) {
        Some(divisor) => Ok((!target / divisor) + U256::one()),
        None => Ok(U256::one()),
    }
}

/// CheckProofOfWork: ℋ → {true, false}
///
/// The header hash, read as a little-endian 256-bit integer, must not
/// exceed the target encoded in `header.bits`.
pub fn check_proof_of_work(header: &BlockHeader) -> Result<bool> {
    let target = decode_compact_bits(header.bits)?;
    let hash_value = U256::from_little_endian(&header.hash());
    Ok(hash_value <= target)
}

pub(crate) fn widen(value: &U256) -> U512 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes[32..]);
    U512::from_big_endian(&bytes)
}

/// Narrow a 512-bit intermediate back to 256 bits, saturating on overflow.
pub(crate) fn narrow_saturating(value: &U512) -> U256 {
    let mut bytes = [0u8; 64];
    value.to_big_endian(&mut bytes);
    if bytes[..32].iter().any(|&b| b != 0) {
        return U256::MAX;
    }
    U256::from_big_endian(&bytes[32..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_u256(s: &str) -> U256 {
        U256::from_str_radix(s, 16).unwrap()
    }

    #[test]
    fn test_decode_mainnet_limit() {
        let target = decode_compact_bits(0x1d00ffff).unwrap();
        assert_eq!(
            target,
            hex_u256("ffff0000000000000000000000000000000000000000000000000000")
        );
    }

    #[test]
    fn test_decode_small_exponents() {
        assert_eq!(decode_compact_bits(0x01003456).unwrap(), U256::zero());
        assert_eq!(decode_compact_bits(0x02008000).unwrap(), U256::from(0x80u32));
        assert_eq!(decode_compact_bits(0x03123456).unwrap(), U256::from(0x123456u32));
        assert_eq!(decode_compact_bits(0x05009234).unwrap(), U256::from(0x92340000u32));
    }

    #[test]
    fn test_decode_rejects_negative() {
        assert_eq!(
            decode_compact_bits(0x04923456),
            Err(ConsensusError::InvalidCompactBits(0x04923456))
        );
    }

    #[test]
    fn test_decode_rejects_overflow() {
        assert!(decode_compact_bits(0xff123456).is_err());
        assert!(decode_compact_bits(0x23000001).is_err());
        // Zero mantissa never overflows
        assert_eq!(decode_compact_bits(0xff000000).unwrap(), U256::zero());
    }

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode_compact_bits(&U256::zero()), 0x01000000);
        assert_eq!(encode_compact_bits(&U256::from(0x80u32)), 0x02008000);
        assert_eq!(encode_compact_bits(&U256::from(0x12345600u32)), 0x04123456);
        assert_eq!(
            encode_compact_bits(&hex_u256(
                "7fffff0000000000000000000000000000000000000000000000000000000000"
            )),
            0x207fffff
        );
    }

    #[test]
    fn test_encode_decode_canonical_bits() {
        for bits in [0x1d00ffffu32, 0x1b0404cb, 0x207fffff, 0x1c0ffff0, 0x03123456] {
            let target = decode_compact_bits(bits).unwrap();
            assert_eq!(encode_compact_bits(&target), bits);
        }
    }

    #[test]
    fn test_encode_truncates_precision() {
        let target = hex_u256("ffff0000000000000000000000000000000000000000000000000001");
        assert_eq!(encode_compact_bits(&target), 0x1d00ffff);
    }

    #[test]
    fn test_block_work_mainnet_limit() {
        assert_eq!(block_work(0x1d00ffff).unwrap(), hex_u256("100010001"));
    }

    #[test]
    fn test_block_work_rejects_zero_target() {
        assert!(block_work(0x1d000000).is_err());
    }

    #[test]
    fn test_block_work_monotonic() {
        let easy = block_work(0x207fffff).unwrap();
        let hard = block_work(0x1b0404cb).unwrap();
        assert!(hard > easy);
    }

    #[test]
    fn test_check_proof_of_work_genesis() {
        let mut merkle_root = [0u8; 32];
        hex::decode_to_slice(
            "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a",
            &mut merkle_root,
        )
        .unwrap();
        let mut genesis = BlockHeader {
            version: 1,
            prev_block_hash: [0; 32],
            merkle_root,
            timestamp: 1231006505,
            bits: 0x1d00ffff,
            nonce: 2083236893,
        };
        assert!(check_proof_of_work(&genesis).unwrap());

        genesis.nonce = 0;
        assert!(!check_proof_of_work(&genesis).unwrap());
    }

    #[test]
    fn test_widen_narrow() {
        let v = hex_u256("ffff0000000000000000000000000000000000000000000000000001");
        assert_eq!(narrow_saturating(&widen(&v)), v);
        let big = widen(&U256::MAX) * U512::from(2u32);
        assert_eq!(narrow_saturating(&big), U256::MAX);
    }
}
