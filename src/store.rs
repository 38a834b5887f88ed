//! Read-only block store contract and the median-timestamp chain helper

use crate::constants::MEDIAN_TIME_SPAN;
use crate::error::StoreError;
use crate::types::{Hash, StoredBlock};
use std::collections::HashMap;

/// Lookup of stored blocks by hash.
///
/// Stored blocks are immutable once written, so walking backwards from a
/// fixed hash gives the same answer even while the store is being extended.
pub trait BlockStore {
    /// `Ok(None)` when the block is not present.
    fn get(&self, hash: &Hash) -> Result<Option<StoredBlock>, StoreError>;
}

impl StoredBlock {
    /// The parent of this block, if the store has it.
    pub fn get_prev(&self, store: &dyn BlockStore) -> Result<Option<StoredBlock>, StoreError> {
        store.get(self.prev_hash())
    }
}

/// Source of the median timestamp of recent blocks.
pub trait ChainHelper {
    /// Median timestamp of `block` and its recent ancestors.
    ///
    /// `Ok(None)` means the store lacks the data to answer.
    fn median_timestamp_of_recent_blocks(
        &self,
        block: &StoredBlock,
        store: &dyn BlockStore,
    ) -> Result<Option<u32>, StoreError>;
}

/// Median of the timestamps of a block and up to ten ancestors.
///
/// Short histories use whatever ancestors exist; with an even count the
/// lower of the two middle values is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianTimePast;

impl ChainHelper for MedianTimePast {
    fn median_timestamp_of_recent_blocks(
        &self,
        block: &StoredBlock,
        store: &dyn BlockStore,
    ) -> Result<Option<u32>, StoreError> {
        let mut timestamps = Vec::with_capacity(MEDIAN_TIME_SPAN);
        timestamps.push(block.header.timestamp);

        let mut cursor = block.get_prev(store)?;
        while let Some(current) = cursor {
            if timestamps.len() == MEDIAN_TIME_SPAN {
                break;
            }
            timestamps.push(current.header.timestamp);
            cursor = current.get_prev(store)?;
        }

        timestamps.sort_unstable();
        Ok(Some(timestamps[(timestamps.len() - 1) / 2]))
    }
}

/// Block store held in memory, keyed by block hash.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    blocks: HashMap<Hash, StoredBlock>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, block: StoredBlock) {
        self.blocks.insert(block.hash(), block);
    }

    pub fn remove(&mut self, hash: &Hash) -> Option<StoredBlock> {
        self.blocks.remove(hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockStore for MemoryBlockStore {
    fn get(&self, hash: &Hash) -> Result<Option<StoredBlock>, StoreError> {
        Ok(self.blocks.get(hash).cloned())
    }
}
