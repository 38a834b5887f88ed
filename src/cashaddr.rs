//! CashAddr text format: prefix, 5-bit payload and 40-bit BCH checksum
//!
//! An address is `<prefix>:<payload><checksum>`. The payload is a version
//! byte followed by the hash, regrouped into 5-bit symbols and mapped through
//! a fixed 32-character alphabet. The checksum is eight more symbols holding
//! the 40-bit residue of a polynomial reduction over the lower five bits of
//! each prefix character, a zero separator, the payload and eight zero
//! symbols.

use crate::bits::convert_bits;
use crate::constants::*;
use crate::error::AddressFormatError;
use crate::types::{AddressPayload, AddressType};

/// Generator coefficients of the BCH code, one per bit of the top symbol.
const GENERATOR: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

/// PolyMod: [ℕ5] → ℕ40
///
/// Residue of the symbol sequence modulo the cashaddr generator polynomial.
/// A valid prefix/payload/checksum sequence yields zero.
pub fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        for (i, &g) in GENERATOR.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= g;
            }
        }
    }
    c ^ 1
}

/// Lower five bits of each prefix character followed by the zero separator.
fn expand_prefix(prefix: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(prefix.len() + 1);
    result.extend(prefix.bytes().map(|c| c & 0x1f));
    result.push(0);
    result
}

pub fn verify_checksum(prefix: &str, payload: &[u8]) -> bool {
    let mut values = expand_prefix(prefix);
    values.extend_from_slice(payload);
    polymod(&values) == 0
}

/// The eight checksum symbols for `payload` under `prefix`.
pub fn create_checksum(prefix: &str, payload: &[u8]) -> [u8; CASHADDR_CHECKSUM_LEN] {
    let mut values = expand_prefix(prefix);
    values.extend_from_slice(payload);
    values.extend_from_slice(&[0u8; CASHADDR_CHECKSUM_LEN]);
    let residue = polymod(&values);

    let mut checksum = [0u8; CASHADDR_CHECKSUM_LEN];
    for (i, symbol) in checksum.iter_mut().enumerate() {
        *symbol = ((residue >> (5 * (7 - i))) & 0x1f) as u8;
    }
    checksum
}

/// Encode 5-bit payload symbols under a prefix, appending the checksum.
pub fn encode_symbols(prefix: &str, payload: &[u8]) -> String {
    let checksum = create_checksum(prefix, payload);
    let mut text = String::with_capacity(prefix.len() + 1 + payload.len() + checksum.len());
    text.push_str(prefix);
    text.push(CASHADDR_SEPARATOR);
    for &symbol in payload.iter().chain(checksum.iter()) {
        text.push(CASHADDR_CHARSET[symbol as usize] as char);
    }
    text
}

/// Split an address into its lowercase prefix and checksum-verified payload symbols.
///
/// The prefix is whatever precedes the last separator, or `default_prefix`
/// when there is none. Case must be uniform across the whole input.
pub fn decode_symbols(
    text: &str,
    default_prefix: &str,
) -> Result<(String, Vec<u8>), AddressFormatError> {
    let has_lower = text.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = text.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressFormatError::MixedCase);
    }

    let (prefix, data) = match text.rfind(CASHADDR_SEPARATOR) {
        Some(pos) => (text[..pos].to_ascii_lowercase(), &text[pos + 1..]),
        None => (default_prefix.to_ascii_lowercase(), text),
    };

    let mut values = Vec::with_capacity(data.len());
    for c in data.chars() {
        let lower = c.to_ascii_lowercase();
        let index = CASHADDR_CHARSET
            .iter()
            .position(|&symbol| symbol as char == lower)
            .ok_or(AddressFormatError::UnknownAlphabetCharacter(c))?;
        values.push(index as u8);
    }

    if values.len() < CASHADDR_CHECKSUM_LEN || !verify_checksum(&prefix, &values) {
        return Err(AddressFormatError::InvalidChecksum);
    }

    values.truncate(values.len() - CASHADDR_CHECKSUM_LEN);
    Ok((prefix, values))
}

/// Version byte for a payload: type code in bits 3-6, size class in bits 0-2.
pub fn version_byte(payload: &AddressPayload) -> u8 {
    let len = payload.hash().len();
    // AddressPayload only admits lengths listed in CASHADDR_HASH_SIZES.
    let position = CASHADDR_HASH_SIZES.iter().position(|&size| size == len);
    debug_assert!(position.is_some(), "unsupported hash length {}", len);
    let size_class = position.unwrap_or_default() as u8;
    (payload.address_type().cashaddr_code() << 3) | size_class
}

/// Parse a version byte into the address type and the hash length it implies.
pub fn parse_version_byte(version: u8) -> Result<(AddressType, usize), AddressFormatError> {
    if version & VERSION_RESERVED_BIT != 0 {
        return Err(AddressFormatError::ReservedBitSet);
    }

    let code = (version >> 3) & 0x1f;
    let address_type =
        AddressType::from_cashaddr_code(code).ok_or(AddressFormatError::UnknownAddressType(code))?;

    let mut hash_size = 20 + 4 * (version & 0x03) as usize;
    if version & VERSION_SIZE_DOUBLING_BIT != 0 {
        hash_size *= 2;
    }
    Ok((address_type, hash_size))
}

/// Version byte and hash regrouped into 5-bit symbols.
pub fn pack_addr_data(payload: &AddressPayload) -> Vec<u8> {
    let mut data = Vec::with_capacity(payload.hash().len() + 1);
    data.push(version_byte(payload));
    data.extend_from_slice(payload.hash());
    // 8-bit input is always in range and padding is allowed.
    convert_bits(&data, 8, 5, true).unwrap_or_default()
}

/// Encode: prefix × AddressPayload → text
///
/// Output is always lowercase.
pub fn encode(prefix: &str, payload: &AddressPayload) -> String {
    encode_symbols(prefix, &pack_addr_data(payload))
}

/// Decode: text × prefix → prefix × (version ‖ hash)
///
/// Verifies case, alphabet, checksum, padding, the version byte and that
/// the hash length matches the size class. The returned prefix is the one
/// found in `text`; matching it against a network is the caller's job.
pub fn decode(text: &str, expected_prefix: &str) -> Result<(String, Vec<u8>), AddressFormatError> {
    let (prefix, symbols) = decode_symbols(text, expected_prefix)?;

    if symbols.is_empty() {
        return Err(AddressFormatError::EmptyPayload);
    }

    let extrabits = symbols.len() * 5 % 8;
    if extrabits >= 5 {
        return Err(AddressFormatError::ExcessPadding);
    }
    let last = symbols[symbols.len() - 1];
    let mask = (1u8 << extrabits) - 1;
    if last & mask != 0 {
        return Err(AddressFormatError::NonzeroPaddingBits);
    }

    let data = convert_bits(&symbols, 5, 8, false)?;
    let (_, hash_size) = parse_version_byte(data[0])?;
    if data.len() != hash_size + 1 {
        return Err(AddressFormatError::LengthMismatch {
            decoded: data.len() - 1,
            expected: hash_size,
        });
    }

    Ok((prefix, data))
}

/// Decode straight to a typed payload, also returning the prefix found.
pub fn decode_payload(
    text: &str,
    expected_prefix: &str,
) -> Result<(String, AddressPayload), AddressFormatError> {
    let (prefix, mut data) = decode(text, expected_prefix)?;
    let (address_type, _) = parse_version_byte(data[0])?;
    let hash = data.split_off(1);
    Ok((prefix, AddressPayload::new(address_type, hash)?))
}
