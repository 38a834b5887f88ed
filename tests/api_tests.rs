//! Tests for the public CashConsensus API

mod common;

use cash_consensus::*;
use common::TestChain;

#[test]
fn test_cash_consensus_default() {
    let consensus = CashConsensus::default();
    assert_eq!(consensus.params(), &NetworkParams::mainnet());
    assert_eq!(consensus.history_policy(), HistoryPolicy::TrustCheckpoint);
}

#[test]
fn test_parse_and_encode_address() {
    let consensus = CashConsensus::new(NetworkParams::mainnet());
    let address = consensus
        .parse_address("qr95sy3j9xwd2ap32xkykttr4cvcu7as4y0qverfuy")
        .unwrap();
    assert_eq!(
        consensus.encode_address(address.address_type(), address.hash()).unwrap(),
        "bitcoincash:qr95sy3j9xwd2ap32xkykttr4cvcu7as4y0qverfuy"
    );
}

#[test]
fn test_parse_address_wrong_network() {
    let consensus = CashConsensus::new(NetworkParams::testnet());
    assert!(matches!(
        consensus.parse_address("bitcoincash:qr95sy3j9xwd2ap32xkykttr4cvcu7as4y0qverfuy"),
        Err(AddressFormatError::BadPrefix { .. })
    ));
}

#[test]
fn test_encode_address_unsupported_length() {
    let consensus = CashConsensus::default();
    assert_eq!(
        consensus.encode_address(AddressType::PubKey, &[0u8; 21]),
        Err(AddressFormatError::UnsupportedHashLength(21))
    );
}

#[test]
fn test_legacy_to_cash_addr() {
    let consensus = CashConsensus::default();
    let address = consensus
        .legacy_to_cash_addr("3LDsS579y7sruadqu11beEJoTjdFiFCdX4")
        .unwrap();
    assert!(address.is_p2sh());
    assert_eq!(
        address.to_string(),
        "bitcoincash:pr95sy3j9xwd2ap32xkykttr4cvcu7as4yc93ky28e"
    );
}

#[test]
fn test_check_proof_of_work_genesis() {
    let consensus = CashConsensus::default();
    let genesis = BlockHeader {
        version: 1,
        prev_block_hash: [0; 32],
        merkle_root: hex_hash("3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a"),
        timestamp: 1231006505,
        bits: 0x1d00ffff,
        nonce: 2083236893,
    };
    assert!(consensus.check_proof_of_work(&genesis).unwrap());

    let mut tampered = genesis;
    tampered.nonce += 1;
    assert!(!consensus.check_proof_of_work(&tampered).unwrap());
}

#[test]
fn test_difficulty_check_through_facade() {
    let chain = TestChain::uniform(504_100, 150, 1_500_000_000, 600, 0x1803c0f0);
    let consensus = CashConsensus::new(NetworkParams::mainnet()).with_history_policy(HistoryPolicy::Strict);
    let next = chain.next_header(0x1803c0f0);
    assert!(consensus
        .check_difficulty_transitions(chain.tip(), &next, &chain.store)
        .is_ok());

    let next = chain.next_header(0x1801e078);
    assert!(matches!(
        consensus.check_difficulty_transitions(chain.tip(), &next, &chain.store),
        Err(ConsensusError::DifficultyMismatch { .. })
    ));
}

/// Median time past source that never has an answer.
struct NoMedian;

impl ChainHelper for NoMedian {
    fn median_timestamp_of_recent_blocks(
        &self,
        _block: &StoredBlock,
        _store: &dyn BlockStore,
    ) -> std::result::Result<Option<u32>, StoreError> {
        Ok(None)
    }
}

#[test]
fn test_custom_chain_helper() {
    let chain = TestChain::uniform(480_000, 20, 1_500_000_000, 600, 0x1803c0f0);
    let next = chain.next_header(0x1804b12c);

    let trusting = CashConsensus::default();
    assert!(trusting
        .check_difficulty_transitions_with(chain.tip(), &next, &chain.store, &NoMedian)
        .is_ok());

    let strict = CashConsensus::default().with_history_policy(HistoryPolicy::Strict);
    assert!(matches!(
        strict.check_difficulty_transitions_with(chain.tip(), &next, &chain.store, &NoMedian),
        Err(ConsensusError::InsufficientHistory(_))
    ));
}

/// Store whose backend always fails.
struct BrokenStore;

impl BlockStore for BrokenStore {
    fn get(&self, _hash: &Hash) -> std::result::Result<Option<StoredBlock>, StoreError> {
        Err(StoreError::Backend("disk offline".to_string()))
    }
}

#[test]
fn test_store_errors_propagate() {
    let chain = TestChain::uniform(480_000, 20, 1_500_000_000, 600, 0x1803c0f0);
    let consensus = CashConsensus::default();
    let next = chain.next_header(0x1803c0f0);
    assert_eq!(
        consensus.check_difficulty_transitions(chain.tip(), &next, &BrokenStore),
        Err(ConsensusError::Store(StoreError::Backend("disk offline".to_string())))
    );
}

fn hex_hash(internal_hex: &str) -> Hash {
    hex::decode(internal_hex).unwrap().try_into().unwrap()
}
