//! Core types shared by the address codec and the difficulty engine

use crate::constants::*;
use crate::error::{AddressFormatError, Result};
use crate::params::NetworkParams;
use crate::pow::block_work;
use bitcoin_hashes::{sha256d, Hash as BitcoinHash};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash, internal byte order
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Block Header: version, parent, merkle root, time, compact target, nonce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Serialize to the 80-byte wire layout.
    pub fn serialize(&self) -> [u8; 80] {
        let mut bytes = [0u8; 80];
        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.prev_block_hash);
        bytes[36..68].copy_from_slice(&self.merkle_root);
        bytes[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.bits.to_le_bytes());
        bytes[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    /// Block hash: SHA256(SHA256(header))
    pub fn hash(&self) -> Hash {
        sha256d::Hash::hash(&self.serialize()).into_inner()
    }
}

/// A header as recorded by a block store, with its height and cumulative work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlock {
    pub height: u32,
    pub header: BlockHeader,
    pub chain_work: U256,
}

impl StoredBlock {
    pub fn new(header: BlockHeader, chain_work: U256, height: u32) -> Self {
        StoredBlock {
            height,
            header,
            chain_work,
        }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn prev_hash(&self) -> &Hash {
        &self.header.prev_block_hash
    }

    /// Build the stored form of a header that extends this block.
    ///
    /// The child's chain work is this block's chain work plus the work
    /// implied by the child's own compact target.
    pub fn build(&self, header: BlockHeader) -> Result<StoredBlock> {
        let work = block_work(header.bits)?;
        let chain_work = self.chain_work.saturating_add(work);
        Ok(StoredBlock::new(header, chain_work, self.height + 1))
    }
}

/// The two destinations a cashaddr can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    PubKey,
    Script,
}

impl AddressType {
    pub const ALL: [AddressType; 2] = [AddressType::PubKey, AddressType::Script];

    /// Type code stored in bits 3-6 of the cashaddr version byte.
    pub fn cashaddr_code(self) -> u8 {
        match self {
            AddressType::PubKey => 0,
            AddressType::Script => 1,
        }
    }

    pub fn from_cashaddr_code(code: u8) -> Option<AddressType> {
        match code {
            0 => Some(AddressType::PubKey),
            1 => Some(AddressType::Script),
            _ => None,
        }
    }

    /// Base58Check version byte for this type on the given network.
    pub fn legacy_version(self, params: &NetworkParams) -> u8 {
        match self {
            AddressType::PubKey => params.address_header,
            AddressType::Script => params.p2sh_header,
        }
    }

    pub fn from_legacy_version(
        params: &NetworkParams,
        version: u8,
    ) -> std::result::Result<AddressType, AddressFormatError> {
        if version == params.address_header {
            Ok(AddressType::PubKey)
        } else if version == params.p2sh_header {
            Ok(AddressType::Script)
        } else {
            Err(AddressFormatError::UnknownLegacyVersion(version))
        }
    }
}

/// Address type plus hash; the hash length is always one a version byte can express.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressPayload {
    address_type: AddressType,
    hash: ByteString,
}

impl AddressPayload {
    pub fn new(
        address_type: AddressType,
        hash: ByteString,
    ) -> std::result::Result<Self, AddressFormatError> {
        if !CASHADDR_HASH_SIZES.contains(&hash.len()) {
            return Err(AddressFormatError::UnsupportedHashLength(hash.len()));
        }
        Ok(AddressPayload { address_type, hash })
    }

    /// Payload of a hash160, always a supported length.
    pub fn from_hash160(address_type: AddressType, hash: &[u8; 20]) -> Self {
        AddressPayload {
            address_type,
            hash: hash.to_vec(),
        }
    }

    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn into_hash(self) -> ByteString {
        self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(timestamp: u32) -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_block_hash: [0; 32],
            merkle_root: [0; 32],
            timestamp,
            bits: 0x1d00ffff,
            nonce: 0,
        }
    }

    #[test]
    fn test_serialize_header_layout() {
        let h = BlockHeader {
            version: 2,
            prev_block_hash: [1; 32],
            merkle_root: [2; 32],
            timestamp: 0x01020304,
            bits: 0x1d00ffff,
            nonce: 0x12345678,
        };
        let bytes = h.serialize();
        assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
        assert_eq!(&bytes[68..72], &[4, 3, 2, 1]);
        assert_eq!(&bytes[72..76], &[0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(&bytes[76..80], &[0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_genesis_hash() {
        // Mainnet genesis header
        let mut merkle_root = [0u8; 32];
        hex::decode_to_slice(
            "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a",
            &mut merkle_root,
        )
        .unwrap();
        let genesis = BlockHeader {
            version: 1,
            prev_block_hash: [0; 32],
            merkle_root,
            timestamp: 1231006505,
            bits: 0x1d00ffff,
            nonce: 2083236893,
        };
        let mut hash = genesis.hash();
        hash.reverse();
        assert_eq!(
            hex::encode(hash),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
    }

    #[test]
    fn test_build_accumulates_work_and_height() {
        let genesis = StoredBlock::new(header(0), U256::zero(), 0);
        let mut next = header(600);
        next.prev_block_hash = genesis.hash();
        let child = genesis.build(next).unwrap();
        assert_eq!(child.height, 1);
        assert_eq!(child.chain_work, block_work(0x1d00ffff).unwrap());
        assert_eq!(child.prev_hash(), &genesis.hash());
    }

    #[test]
    fn test_address_type_codes_are_total() {
        for t in AddressType::ALL {
            assert_eq!(AddressType::from_cashaddr_code(t.cashaddr_code()), Some(t));
        }
        assert_eq!(AddressType::from_cashaddr_code(2), None);
        assert_eq!(AddressType::from_cashaddr_code(15), None);
    }

    #[test]
    fn test_legacy_version_mapping() {
        let params = NetworkParams::mainnet();
        for t in AddressType::ALL {
            let v = t.legacy_version(&params);
            assert_eq!(AddressType::from_legacy_version(&params, v), Ok(t));
        }
        assert_eq!(
            AddressType::from_legacy_version(&params, 0x6f),
            Err(AddressFormatError::UnknownLegacyVersion(0x6f))
        );
    }

    #[test]
    fn test_payload_rejects_unsupported_lengths() {
        for len in [0usize, 19, 21, 36, 44, 52, 60, 65] {
            assert_eq!(
                AddressPayload::new(AddressType::PubKey, vec![0; len]),
                Err(AddressFormatError::UnsupportedHashLength(len))
            );
        }
        for len in CASHADDR_HASH_SIZES {
            assert!(AddressPayload::new(AddressType::Script, vec![0; len]).is_ok());
        }
    }
}
