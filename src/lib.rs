//! # Cash-Consensus
//!
//! Consensus-critical encoding and validation for a Bitcoin Cash style chain.
//!
//! The crate covers two surfaces:
//! - the **cashaddr** address format, a prefix-bound, checksummed base32 text encoding
//! - the **difficulty engine**, which checks that a block declares the target the
//!   retargeting rules require: the legacy 2016-block retarget with the emergency
//!   adjustment, and the 144-block cash DAA after its activation height
//!
//! ## Design Principles
//!
//! 1. **Bit-exact formats**: checksums, compact bits and targets match the reference chain
//! 2. **No global state**: networks are passed in, never looked up in a registry
//! 3. **Narrow collaborators**: block storage and median-time are traits the caller provides
//!
//! ## Usage
//!
//! ```rust
//! use cash_consensus::CashConsensus;
//! use cash_consensus::params::NetworkParams;
//!
//! let consensus = CashConsensus::new(NetworkParams::mainnet());
//! let address = consensus
//!     .parse_address("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a")
//!     .unwrap();
//! assert!(!address.is_p2sh());
//! assert_eq!(address.to_string(), "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a");
//! ```

pub mod address;
pub mod bits;
pub mod cashaddr;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod error;
pub mod params;
pub mod pow;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use address::{CashAddress, LegacyAddress};
pub use config::ConsensusConfig;
pub use error::{AddressFormatError, ConsensusError, Result, StoreError};
pub use params::{HistoryPolicy, NetworkParams};
pub use store::{BlockStore, ChainHelper, MedianTimePast, MemoryBlockStore};
pub use types::*;

/// Validation entry point bound to one network.
///
/// # Examples
///
/// ```
/// use cash_consensus::{CashConsensus, ConsensusConfig, HistoryPolicy};
///
/// let config = ConsensusConfig::from_json(r#"{"network": "testnet", "history_policy": "strict"}"#).unwrap();
/// let consensus = CashConsensus::from_config(&config).unwrap();
/// assert_eq!(consensus.params().cash_addr_prefix, "bchtest");
/// assert_eq!(consensus.history_policy(), HistoryPolicy::Strict);
/// ```
#[derive(Debug, Clone)]
pub struct CashConsensus {
    params: NetworkParams,
    history_policy: HistoryPolicy,
}

impl CashConsensus {
    pub fn new(params: NetworkParams) -> Self {
        Self {
            params,
            history_policy: HistoryPolicy::default(),
        }
    }

    pub fn with_history_policy(mut self, history_policy: HistoryPolicy) -> Self {
        self.history_policy = history_policy;
        self
    }

    pub fn from_config(config: &ConsensusConfig) -> anyhow::Result<Self> {
        Ok(Self {
            params: config.network_params()?,
            history_policy: config.history_policy,
        })
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        self.history_policy
    }

    /// Parse a cashaddr for this network; the prefix may be omitted.
    pub fn parse_address(&self, text: &str) -> std::result::Result<CashAddress, AddressFormatError> {
        CashAddress::from_cash_addr(&self.params, text)
    }

    pub fn encode_address(
        &self,
        address_type: AddressType,
        hash: &[u8],
    ) -> std::result::Result<String, AddressFormatError> {
        Ok(CashAddress::new(&self.params, address_type, hash)?.to_string())
    }

    /// Convert a Base58Check address of this network to its cashaddr.
    pub fn legacy_to_cash_addr(&self, legacy: &str) -> std::result::Result<CashAddress, AddressFormatError> {
        CashAddress::from_base58(Some(&self.params), &[], legacy)
    }

    pub fn check_proof_of_work(&self, header: &BlockHeader) -> Result<bool> {
        pow::check_proof_of_work(header)
    }

    /// Check the difficulty declared by `next`, the child of `stored_prev`.
    ///
    /// Median time past comes from [`MedianTimePast`].
    pub fn check_difficulty_transitions(
        &self,
        stored_prev: &StoredBlock,
        next: &BlockHeader,
        store: &dyn BlockStore,
    ) -> Result<()> {
        self.check_difficulty_transitions_with(stored_prev, next, store, &MedianTimePast)
    }

    pub fn check_difficulty_transitions_with(
        &self,
        stored_prev: &StoredBlock,
        next: &BlockHeader,
        store: &dyn BlockStore,
        chain: &dyn ChainHelper,
    ) -> Result<()> {
        difficulty::check_difficulty_transitions(
            &self.params,
            self.history_policy,
            stored_prev,
            next,
            store,
            chain,
        )
    }
}

impl Default for CashConsensus {
    fn default() -> Self {
        Self::new(NetworkParams::mainnet())
    }
}
