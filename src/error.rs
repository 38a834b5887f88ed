//! Error types for address parsing and consensus validation

use thiserror::Error;

/// Errors raised while parsing or constructing an address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressFormatError {
    #[error("Invalid prefix for network: {found} != {expected} (expected)")]
    BadPrefix { found: String, expected: String },

    #[error("No payload")]
    EmptyPayload,

    #[error("More than allowed padding")]
    ExcessPadding,

    #[error("Nonzero padding bits")]
    NonzeroPaddingBits,

    #[error("First bit of the version byte is reserved")]
    ReservedBitSet,

    #[error("Unknown address type: {0}")]
    UnknownAddressType(u8),

    #[error("Data length {decoded} != hash size {expected}")]
    LengthMismatch { decoded: usize, expected: usize },

    #[error("Mixed case address")]
    MixedCase,

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Character not in the cashaddr alphabet: {0:?}")]
    UnknownAlphabetCharacter(char),

    #[error("Symbol {0} does not fit in the source bit width")]
    SymbolOutOfRange(u8),

    #[error("Unsupported hash length: {0} bytes")]
    UnsupportedHashLength(usize),

    #[error("Invalid base58 data: {0}")]
    InvalidBase58(String),

    #[error("Unknown legacy version byte: {0}")]
    UnknownLegacyVersion(u8),

    #[error("No network found for {0}")]
    NoMatchingNetwork(String),
}

/// Errors reported by a block store backend.
///
/// A block that is simply not present is `Ok(None)`, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Block store backend failure: {0}")]
    Backend(String),

    #[error("Corrupt block {hash}: {reason}")]
    Corrupt { hash: String, reason: String },
}

/// Errors raised by the difficulty engine. Each one rejects the candidate block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Unexpected change in difficulty at height {height}: {received:x} vs {expected:x}")]
    UnexpectedDifficultyChange {
        height: u32,
        received: u32,
        expected: u32,
    },

    #[error("Network provided difficulty bits do not match what was calculated: {computed:x} vs {received:x}")]
    DifficultyMismatch { computed: u32, received: u32 },

    #[error("Difficulty transition point but we did not find a way back to the genesis block")]
    NoPathToGenesis,

    #[error("Not enough blocks in the block store to calculate difficulty: {0}")]
    InsufficientHistory(String),

    #[error("Height {height} is below the required {required}")]
    InsufficientHeight { height: u32, required: u32 },

    #[error("Chain work must increase between the first and last block")]
    InvalidChainWork,

    #[error("Timespan between first and last block must be positive, got {0}")]
    InvalidTimespan(i64),

    #[error("Invalid network parameters: {0}")]
    InvalidNetworkParams(String),

    #[error("Invalid compact target bits: {0:08x}")]
    InvalidCompactBits(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
