//! Regrouping of bit strings between symbol widths

use crate::error::AddressFormatError;

/// ConvertBits: [ℕ_from] × from × to × pad → [ℕ_to]
///
/// Repack a sequence of `from_bits`-wide symbols into `to_bits`-wide symbols,
/// most significant bit first. With `pad`, a trailing partial group is
/// zero-filled and emitted. Without it, a partial group of `from_bits` or more
/// bits is excess padding and any set bit in the remainder is rejected.
pub fn convert_bits(
    data: &[u8],
    from_bits: u32,
    to_bits: u32,
    pad: bool,
) -> Result<Vec<u8>, AddressFormatError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value: u32 = (1 << to_bits) - 1;
    let max_acc: u32 = (1 << (from_bits + to_bits - 1)) - 1;
    let mut result = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);

    for &value in data {
        if (value as u32) >> from_bits != 0 {
            return Err(AddressFormatError::SymbolOutOfRange(value));
        }
        acc = ((acc << from_bits) | value as u32) & max_acc;
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            result.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            result.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits {
        return Err(AddressFormatError::ExcessPadding);
    } else if (acc << (to_bits - bits)) & max_value != 0 {
        return Err(AddressFormatError::NonzeroPaddingBits);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_symbols_pads() {
        // 0xff -> 11111 111(00)
        assert_eq!(convert_bits(&[0xff], 8, 5, true).unwrap(), vec![31, 28]);
        assert_eq!(convert_bits(&[], 8, 5, true).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_symbols_to_bytes() {
        assert_eq!(convert_bits(&[31, 28], 5, 8, false).unwrap(), vec![0xff]);
        // 8 symbols are exactly 5 bytes
        let symbols = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let bytes = convert_bits(&symbols, 5, 8, false).unwrap();
        assert_eq!(bytes.len(), 5);
        assert_eq!(convert_bits(&bytes, 8, 5, false).unwrap(), symbols.to_vec());
    }

    #[test]
    fn test_nonzero_padding_rejected() {
        // 0xff followed by a padding bit set
        assert_eq!(
            convert_bits(&[31, 29], 5, 8, false),
            Err(AddressFormatError::NonzeroPaddingBits)
        );
    }

    #[test]
    fn test_excess_padding_rejected() {
        // 3 symbols = 15 bits: one byte plus 7 leftover bits
        assert_eq!(
            convert_bits(&[0, 0, 0], 5, 8, false),
            Err(AddressFormatError::ExcessPadding)
        );
    }

    #[test]
    fn test_symbol_out_of_range() {
        assert_eq!(
            convert_bits(&[32], 5, 8, false),
            Err(AddressFormatError::SymbolOutOfRange(32))
        );
    }
}
