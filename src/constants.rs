//! Consensus and address-format constants

/// The 32-symbol cashaddr alphabet, indexed by 5-bit value.
pub const CASHADDR_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Separator between the prefix and the payload.
pub const CASHADDR_SEPARATOR: char = ':';

/// Number of 5-bit checksum symbols appended to a cashaddr payload.
pub const CASHADDR_CHECKSUM_LEN: usize = 8;

/// Hash lengths representable by the 3-bit size class of a version byte.
pub const CASHADDR_HASH_SIZES: [usize; 8] = [20, 24, 28, 32, 40, 48, 56, 64];

/// Version byte: reserved bit.
pub const VERSION_RESERVED_BIT: u8 = 0x80;

/// Version byte: flag doubling the base hash size.
pub const VERSION_SIZE_DOUBLING_BIT: u8 = 0x04;

/// Length of a legacy Base58Check hash160 payload.
pub const LEGACY_HASH_LEN: usize = 20;

/// Length of the sha256d checksum appended to Base58Check data.
pub const BASE58_CHECKSUM_LEN: usize = 4;

/// Target time between blocks: 10 minutes
pub const TARGET_SPACING: u32 = 10 * 60;

/// Legacy retarget timespan: 2 weeks
pub const TARGET_TIMESPAN: u32 = 14 * 24 * 60 * 60;

/// Legacy retarget interval: 2016 blocks
pub const DIFFICULTY_ADJUSTMENT_INTERVAL: u32 = TARGET_TIMESPAN / TARGET_SPACING;

/// Compact form of the mainnet proof-of-work limit
pub const MAINNET_POW_LIMIT_BITS: u32 = 0x1d00ffff;

/// Compact form of the regtest proof-of-work limit
pub const REGTEST_POW_LIMIT_BITS: u32 = 0x207fffff;

/// Number of blocks in the cash-DAA averaging window, independent of the legacy interval
pub const DAA_WINDOW: u32 = 144;

/// Lower clamp of the cash-DAA timespan, in units of target spacing
pub const DAA_MIN_TIMESPAN_BLOCKS: u32 = 72;

/// Upper clamp of the cash-DAA timespan, in units of target spacing
pub const DAA_MAX_TIMESPAN_BLOCKS: u32 = 288;

/// Number of ancestors compared by the emergency difficulty adjustment
pub const EDA_LOOKBACK: usize = 6;

/// Median-time-past span above which the emergency adjustment eases the target: 12 hours
pub const EDA_THRESHOLD_SECS: i64 = 12 * 3600;

/// Number of recent blocks used for the median timestamp
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Retarget traversals slower than this are logged
pub const SLOW_TRAVERSAL_MILLIS: u128 = 50;
