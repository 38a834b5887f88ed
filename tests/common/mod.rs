//! Shared chain-building helpers for integration tests

#![allow(dead_code)]

use cash_consensus::*;
use primitive_types::U256;

/// In-memory chain whose first block sits at an arbitrary height, like a
/// node started from a checkpoint.
pub struct TestChain {
    pub store: MemoryBlockStore,
    pub blocks: Vec<StoredBlock>,
}

impl TestChain {
    /// `count` blocks from `start_height`, `spacing` seconds apart, all with `bits`.
    pub fn uniform(start_height: u32, count: usize, start_time: u32, spacing: u32, bits: u32) -> Self {
        let timestamps: Vec<u32> = (0..count as u32).map(|i| start_time + i * spacing).collect();
        Self::with_timestamps(start_height, &timestamps, bits)
    }

    pub fn with_timestamps(start_height: u32, timestamps: &[u32], bits: u32) -> Self {
        let mut store = MemoryBlockStore::new();
        let mut blocks: Vec<StoredBlock> = Vec::with_capacity(timestamps.len());
        for &timestamp in timestamps {
            let block = match blocks.last() {
                Some(parent) => parent.build(header(parent.hash(), timestamp, bits)).unwrap(),
                None => StoredBlock::new(header([0; 32], timestamp, bits), U256::zero(), start_height),
            };
            store.put(block.clone());
            blocks.push(block);
        }
        TestChain { store, blocks }
    }

    pub fn tip(&self) -> &StoredBlock {
        self.blocks.last().unwrap()
    }

    /// Header of a candidate child of the tip.
    pub fn next_header(&self, bits: u32) -> BlockHeader {
        header(self.tip().hash(), self.tip().header.timestamp + 600, bits)
    }
}

pub fn header(prev_block_hash: Hash, timestamp: u32, bits: u32) -> BlockHeader {
    BlockHeader {
        version: 1,
        prev_block_hash,
        merkle_root: [0; 32],
        timestamp,
        bits,
        nonce: 0,
    }
}
