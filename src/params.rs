//! Per-network consensus parameters

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::pow::decode_compact_bits;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// How the difficulty engine treats ancestors missing from the block store.
///
/// Nodes started from a checkpoint do not hold the history needed to verify
/// some transitions. `TrustCheckpoint` accepts the declared difficulty of
/// such blocks unverified on the non-boundary legacy path and on the cash-DAA
/// 144-block walk. `Strict` rejects them instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    #[default]
    TrustCheckpoint,
    Strict,
}

/// Immutable consensus parameters of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub id: String,
    pub cash_addr_prefix: String,
    pub address_header: u8,
    pub p2sh_header: u8,
    /// Easiest allowed target.
    pub max_target: U256,
    /// Legacy retarget timespan in seconds.
    pub target_timespan: u32,
    /// Expected seconds between blocks.
    pub target_spacing: u32,
    /// Blocks between legacy retargets.
    pub interval: u32,
    /// First height whose successor is validated by the cash DAA.
    pub daa_height: u32,
    /// Height of the August 2017 fork block.
    pub uahf_height: u32,
    /// Every block must repeat its parent's bits.
    #[serde(default)]
    pub pow_no_retargeting: bool,
}

impl NetworkParams {
    pub fn mainnet() -> Self {
        NetworkParams {
            id: "mainnet".to_string(),
            cash_addr_prefix: "bitcoincash".to_string(),
            address_header: 0,
            p2sh_header: 5,
            max_target: pow_limit(MAINNET_POW_LIMIT_BITS),
            target_timespan: TARGET_TIMESPAN,
            target_spacing: TARGET_SPACING,
            interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
            daa_height: 504_031,
            uahf_height: 478_559,
            pow_no_retargeting: false,
        }
    }

    pub fn testnet() -> Self {
        NetworkParams {
            id: "testnet".to_string(),
            cash_addr_prefix: "bchtest".to_string(),
            address_header: 111,
            p2sh_header: 196,
            max_target: pow_limit(MAINNET_POW_LIMIT_BITS),
            target_timespan: TARGET_TIMESPAN,
            target_spacing: TARGET_SPACING,
            interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
            daa_height: 1_188_697,
            uahf_height: 1_155_876,
            pow_no_retargeting: false,
        }
    }

    pub fn regtest() -> Self {
        NetworkParams {
            id: "regtest".to_string(),
            cash_addr_prefix: "bchreg".to_string(),
            address_header: 111,
            p2sh_header: 196,
            max_target: pow_limit(REGTEST_POW_LIMIT_BITS),
            target_timespan: TARGET_TIMESPAN,
            target_spacing: TARGET_SPACING,
            interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
            daa_height: 0,
            uahf_height: 0,
            pow_no_retargeting: true,
        }
    }

    /// Look up a preset by id.
    pub fn by_id(id: &str) -> Option<Self> {
        match id {
            "mainnet" | "main" => Some(Self::mainnet()),
            "testnet" | "test" => Some(Self::testnet()),
            "regtest" => Some(Self::regtest()),
            _ => None,
        }
    }

    /// All built-in presets, for callers that detect the network of an address.
    pub fn presets() -> Vec<Self> {
        vec![Self::mainnet(), Self::testnet(), Self::regtest()]
    }

    /// Whether the block after `height` is a legacy retarget boundary.
    ///
    /// Never true for a zero interval.
    pub fn is_retarget_boundary(&self, height: u32) -> bool {
        (height as u64 + 1).checked_rem(self.interval as u64) == Some(0)
    }

    /// Reject parameters the difficulty arithmetic would divide by.
    pub fn validate(&self) -> Result<()> {
        let divisors = [
            ("interval", self.interval),
            ("target_timespan", self.target_timespan),
            ("target_spacing", self.target_spacing),
        ];
        for (name, value) in divisors {
            if value == 0 {
                return Err(ConsensusError::InvalidNetworkParams(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn pow_limit(bits: u32) -> U256 {
    // The preset limits are valid compact values.
    decode_compact_bits(bits).unwrap_or(U256::MAX)
}
