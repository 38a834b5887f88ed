//! Addresses bound to a network: cashaddr text form and legacy Base58Check interop

use crate::cashaddr;
use crate::constants::{BASE58_CHECKSUM_LEN, LEGACY_HASH_LEN};
use crate::error::AddressFormatError;
use crate::params::NetworkParams;
use crate::types::{AddressPayload, AddressType};
use bitcoin_hashes::{sha256d, Hash as _};
use ripemd::Ripemd160;
use secp256k1::PublicKey;
use sha2::{Digest, Sha256};
use std::fmt;

type Result<T> = std::result::Result<T, AddressFormatError>;

/// A cashaddr destination on one network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CashAddress {
    prefix: String,
    payload: AddressPayload,
}

impl CashAddress {
    pub fn new(params: &NetworkParams, address_type: AddressType, hash: &[u8]) -> Result<Self> {
        Ok(CashAddress {
            prefix: params.cash_addr_prefix.clone(),
            payload: AddressPayload::new(address_type, hash.to_vec())?,
        })
    }

    pub fn from_pubkey_hash(params: &NetworkParams, hash160: &[u8; 20]) -> Self {
        CashAddress {
            prefix: params.cash_addr_prefix.clone(),
            payload: AddressPayload::from_hash160(AddressType::PubKey, hash160),
        }
    }

    pub fn from_p2sh_hash(params: &NetworkParams, hash160: &[u8; 20]) -> Self {
        CashAddress {
            prefix: params.cash_addr_prefix.clone(),
            payload: AddressPayload::from_hash160(AddressType::Script, hash160),
        }
    }

    /// Pay-to-pubkey-hash address of the compressed serialization of `key`.
    pub fn from_public_key(params: &NetworkParams, key: &PublicKey) -> Self {
        Self::from_pubkey_hash(params, &hash160(&key.serialize()))
    }

    /// Parse `text` as an address of `params`' network.
    ///
    /// A missing prefix is taken to be the network's; any other prefix is
    /// rejected with `BadPrefix`.
    pub fn from_cash_addr(params: &NetworkParams, text: &str) -> Result<Self> {
        let (prefix, payload) = cashaddr::decode_payload(text, &params.cash_addr_prefix)?;
        if prefix != params.cash_addr_prefix {
            return Err(AddressFormatError::BadPrefix {
                found: prefix,
                expected: params.cash_addr_prefix.clone(),
            });
        }
        Ok(CashAddress { prefix, payload })
    }

    /// Parse `text` against each candidate network in order and return the
    /// first that accepts it.
    pub fn parse_with_candidates<'a>(
        text: &str,
        candidates: &'a [NetworkParams],
    ) -> Result<(Self, &'a NetworkParams)> {
        let mut last_error = None;
        for params in candidates {
            match Self::from_cash_addr(params, text) {
                Ok(address) => return Ok((address, params)),
                Err(e) => last_error = Some(e),
            }
        }
        match last_error {
            Some(AddressFormatError::BadPrefix { .. })
            | Some(AddressFormatError::InvalidChecksum)
            | None => Err(AddressFormatError::NoMatchingNetwork(text.to_string())),
            Some(e) => Err(e),
        }
    }

    /// Build from a Base58Check legacy address.
    ///
    /// With `params` set the version byte must belong to that network.
    /// Otherwise the first of `candidates` whose version bytes match wins.
    pub fn from_base58(
        params: Option<&NetworkParams>,
        candidates: &[NetworkParams],
        text: &str,
    ) -> Result<Self> {
        let legacy = LegacyAddress::from_base58(text)?;
        let network = match params {
            Some(params) => params,
            None => candidates
                .iter()
                .find(|p| AddressType::from_legacy_version(p, legacy.version).is_ok())
                .ok_or_else(|| AddressFormatError::NoMatchingNetwork(text.to_string()))?,
        };
        let address_type = AddressType::from_legacy_version(network, legacy.version)?;
        Ok(CashAddress {
            prefix: network.cash_addr_prefix.clone(),
            payload: AddressPayload::from_hash160(address_type, &legacy.hash),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn payload(&self) -> &AddressPayload {
        &self.payload
    }

    pub fn address_type(&self) -> AddressType {
        self.payload.address_type()
    }

    pub fn hash(&self) -> &[u8] {
        self.payload.hash()
    }

    pub fn is_p2sh(&self) -> bool {
        self.payload.address_type() == AddressType::Script
    }

    /// Base58Check form on `params`' network. Only 20-byte hashes have one.
    pub fn to_legacy(&self, params: &NetworkParams) -> Result<String> {
        let hash: [u8; LEGACY_HASH_LEN] = self
            .payload
            .hash()
            .try_into()
            .map_err(|_| AddressFormatError::UnsupportedHashLength(self.payload.hash().len()))?;
        let legacy = LegacyAddress {
            version: self.payload.address_type().legacy_version(params),
            hash,
        };
        Ok(legacy.to_base58())
    }
}

impl fmt::Display for CashAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&cashaddr::encode(&self.prefix, &self.payload))
    }
}

/// Version byte and hash160 of a Base58Check address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyAddress {
    pub version: u8,
    pub hash: [u8; LEGACY_HASH_LEN],
}

impl LegacyAddress {
    pub fn from_base58(text: &str) -> Result<Self> {
        let bytes = bs58::decode(text)
            .into_vec()
            .map_err(|e| AddressFormatError::InvalidBase58(e.to_string()))?;
        if bytes.len() != 1 + LEGACY_HASH_LEN + BASE58_CHECKSUM_LEN {
            return Err(AddressFormatError::InvalidBase58(format!(
                "expected {} bytes, got {}",
                1 + LEGACY_HASH_LEN + BASE58_CHECKSUM_LEN,
                bytes.len()
            )));
        }

        let (data, checksum) = bytes.split_at(1 + LEGACY_HASH_LEN);
        if checksum != base58_checksum(data) {
            return Err(AddressFormatError::InvalidBase58("checksum mismatch".to_string()));
        }

        let mut hash = [0u8; LEGACY_HASH_LEN];
        hash.copy_from_slice(&data[1..]);
        Ok(LegacyAddress {
            version: data[0],
            hash,
        })
    }

    pub fn to_base58(&self) -> String {
        let mut data = Vec::with_capacity(1 + LEGACY_HASH_LEN + BASE58_CHECKSUM_LEN);
        data.push(self.version);
        data.extend_from_slice(&self.hash);
        let checksum = base58_checksum(&data);
        data.extend_from_slice(&checksum);
        bs58::encode(data).into_string()
    }
}

fn base58_checksum(data: &[u8]) -> [u8; BASE58_CHECKSUM_LEN] {
    let digest = sha256d::Hash::hash(data).into_inner();
    let mut checksum = [0u8; BASE58_CHECKSUM_LEN];
    checksum.copy_from_slice(&digest[..BASE58_CHECKSUM_LEN]);
    checksum
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha256_hash = Sha256::digest(data);
    let ripemd160_hash = Ripemd160::digest(sha256_hash);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd160_hash);
    out
}
