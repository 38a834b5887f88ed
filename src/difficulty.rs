//! Difficulty transition checks: legacy 2016-block retarget, emergency
//! adjustment and the post-fork cash DAA
//!
//! The path taken is a pure function of the parent's height:
//! - `prev.height >= daa_height`: cash DAA over a 144-block window
//! - retarget boundary: legacy 2016-block retarget
//! - otherwise: bits unchanged, unless the emergency adjustment applies
//!
//! Missing history is treated differently per path. On the non-boundary
//! legacy path and on the 144-block walk of the cash DAA, a store that lacks
//! the ancestors (a node started from a checkpoint) cannot verify the
//! transition and, under `HistoryPolicy::TrustCheckpoint`, the declared bits
//! are ACCEPTED UNVERIFIED. At a legacy retarget boundary and when picking a
//! suitable block, missing ancestors reject the block.

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::params::{HistoryPolicy, NetworkParams};
use crate::pow::{decode_compact_bits, encode_compact_bits, narrow_saturating, widen};
use crate::store::{BlockStore, ChainHelper};
use crate::types::{BlockHeader, StoredBlock};
use primitive_types::{U256, U512};
use std::time::Instant;
use tracing::{debug, info, warn};

/// CheckDifficultyTransitions: StoredBlock × ℋ × Store × Chain → {ok, reject}
///
/// Verify that `next`, the child of `stored_prev`, declares the target the
/// retargeting rules require.
pub fn check_difficulty_transitions(
    params: &NetworkParams,
    policy: HistoryPolicy,
    stored_prev: &StoredBlock,
    next: &BlockHeader,
    store: &dyn BlockStore,
    chain: &dyn ChainHelper,
) -> Result<()> {
    params.validate()?;

    if params.pow_no_retargeting {
        return require_unchanged_bits(stored_prev, next);
    }

    if stored_prev.height >= params.daa_height {
        debug!(height = stored_prev.height, "checking cash DAA difficulty");
        return check_next_cash_work_required(params, policy, stored_prev, next, store);
    }

    if !is_difficulty_transition_point(params, stored_prev) {
        return check_between_retargets(params, policy, stored_prev, next, store, chain);
    }

    check_legacy_retarget(params, stored_prev, next, store)
}

/// Whether the child of `stored_prev` starts a new legacy retarget interval.
pub fn is_difficulty_transition_point(params: &NetworkParams, stored_prev: &StoredBlock) -> bool {
    params.is_retarget_boundary(stored_prev.height)
}

fn require_unchanged_bits(stored_prev: &StoredBlock, next: &BlockHeader) -> Result<()> {
    if next.bits != stored_prev.header.bits {
        return Err(ConsensusError::UnexpectedDifficultyChange {
            height: stored_prev.height,
            received: next.bits,
            expected: stored_prev.header.bits,
        });
    }
    Ok(())
}

/// Accept the declared bits unverified, or reject under the strict policy.
fn accept_unverified(policy: HistoryPolicy, height: u32, reason: &str) -> Result<()> {
    match policy {
        HistoryPolicy::TrustCheckpoint => {
            warn!(height, reason, "difficulty not verified: insufficient history in block store");
            Ok(())
        }
        HistoryPolicy::Strict => Err(ConsensusError::InsufficientHistory(format!(
            "{} at height {}",
            reason, height
        ))),
    }
}

/// Between retarget boundaries the bits stay the same, except that when the
/// last six blocks took twelve hours or more (by median time past) the target
/// is eased by a quarter.
fn check_between_retargets(
    params: &NetworkParams,
    policy: HistoryPolicy,
    stored_prev: &StoredBlock,
    next: &BlockHeader,
    store: &dyn BlockStore,
    chain: &dyn ChainHelper,
) -> Result<()> {
    let prev_target = decode_compact_bits(stored_prev.header.bits)?;
    if prev_target == params.max_target {
        return require_unchanged_bits(stored_prev, next);
    }

    let mut cursor = store.get(&stored_prev.hash())?;
    for _ in 0..EDA_LOOKBACK {
        match cursor {
            Some(block) => cursor = block.get_prev(store)?,
            None => return accept_unverified(policy, stored_prev.height, "fewer than 6 ancestors"),
        }
    }
    let ancestor = match cursor {
        Some(block) => block,
        None => return accept_unverified(policy, stored_prev.height, "fewer than 6 ancestors"),
    };

    let prev_mtp = chain.median_timestamp_of_recent_blocks(stored_prev, store)?;
    let ancestor_mtp = chain.median_timestamp_of_recent_blocks(&ancestor, store)?;
    let (prev_mtp, ancestor_mtp) = match (prev_mtp, ancestor_mtp) {
        (Some(a), Some(b)) => (a, b),
        _ => return accept_unverified(policy, stored_prev.height, "median time past unavailable"),
    };

    let mtp_6_blocks = prev_mtp as i64 - ancestor_mtp as i64;
    if mtp_6_blocks >= EDA_THRESHOLD_SECS {
        let eased = prev_target.saturating_add(prev_target >> 2usize);
        let eased = eased.min(params.max_target);
        let expected = encode_compact_bits(&truncate_to_received_precision(eased, next.bits));
        if next.bits != expected {
            return Err(ConsensusError::UnexpectedDifficultyChange {
                height: stored_prev.height,
                received: next.bits,
                expected,
            });
        }
        return Ok(());
    }

    require_unchanged_bits(stored_prev, next)
}

/// Legacy retarget: scale the parent's target by the time the last interval
/// took, clamped to a factor of four either way.
fn check_legacy_retarget(
    params: &NetworkParams,
    stored_prev: &StoredBlock,
    next: &BlockHeader,
    store: &dyn BlockStore,
) -> Result<()> {
    let watch = Instant::now();
    let mut cursor = store.get(&stored_prev.hash())?;
    for _ in 0..params.interval.saturating_sub(1) {
        match cursor {
            Some(block) => cursor = block.get_prev(store)?,
            None => return Err(ConsensusError::NoPathToGenesis),
        }
    }
    let elapsed = watch.elapsed();
    if elapsed.as_millis() > SLOW_TRAVERSAL_MILLIS {
        info!("Difficulty transition traversal took {:?}", elapsed);
    }
    let interval_ago = cursor.ok_or(ConsensusError::NoPathToGenesis)?;

    let target_timespan = params.target_timespan as i64;
    let timespan = (stored_prev.header.timestamp as i64 - interval_ago.header.timestamp as i64)
        .clamp(target_timespan / 4, target_timespan * 4);

    let prev_target = decode_compact_bits(stored_prev.header.bits)?;
    let new_target =
        widen(&prev_target) * U512::from(timespan as u64) / U512::from(target_timespan as u64);

    verify_difficulty(params, narrow_saturating(&new_target), next)
}

/// Cash DAA: target from the work done and time taken between two suitable
/// blocks 144 blocks apart.
pub fn check_next_cash_work_required(
    params: &NetworkParams,
    policy: HistoryPolicy,
    stored_prev: &StoredBlock,
    next: &BlockHeader,
    store: &dyn BlockStore,
) -> Result<()> {
    if stored_prev.height < params.interval {
        return Err(ConsensusError::InsufficientHeight {
            height: stored_prev.height,
            required: params.interval,
        });
    }

    let last_block = get_suitable_block(stored_prev, store)?;

    let mut first_block = stored_prev.clone();
    for _ in 0..DAA_WINDOW {
        match first_block.get_prev(store)? {
            Some(parent) => first_block = parent,
            None => {
                return accept_unverified(policy, stored_prev.height, "fewer than 144 ancestors")
            }
        }
    }
    let first_block = get_suitable_block(&first_block, store)?;

    let next_target = compute_target(params, &first_block, &last_block)?;
    verify_difficulty(params, next_target, next)
}

/// Median-timestamp block among `block`, its parent and its grandparent.
///
/// A single block with a skewed timestamp then cannot move the window edge.
pub fn get_suitable_block(block: &StoredBlock, store: &dyn BlockStore) -> Result<StoredBlock> {
    if block.height < 3 {
        return Err(ConsensusError::InsufficientHeight {
            height: block.height,
            required: 3,
        });
    }

    let parent = block.get_prev(store)?.ok_or_else(|| {
        ConsensusError::InsufficientHistory(format!("parent of block at height {}", block.height))
    })?;
    let grandparent = parent.get_prev(store)?.ok_or_else(|| {
        ConsensusError::InsufficientHistory(format!(
            "grandparent of block at height {}",
            block.height
        ))
    })?;

    let mut blocks = [grandparent, parent, block.clone()];

    // Sorting network.
    if blocks[0].header.timestamp > blocks[2].header.timestamp {
        blocks.swap(0, 2);
    }
    if blocks[0].header.timestamp > blocks[1].header.timestamp {
        blocks.swap(0, 1);
    }
    if blocks[1].header.timestamp > blocks[2].header.timestamp {
        blocks.swap(1, 2);
    }

    let [_, median, _] = blocks;
    Ok(median)
}

/// ComputeTarget: StoredBlock × StoredBlock → ℕ256
///
/// 1. work = (last.chainWork - first.chainWork) × spacing
/// 2. timespan = last.time - first.time, clamped to [72, 288] × spacing
/// 3. work = work / timespan
/// 4. return 2^256 / work - 1
pub fn compute_target(
    params: &NetworkParams,
    first_block: &StoredBlock,
    last_block: &StoredBlock,
) -> Result<U256> {
    params.validate()?;
    if last_block.height <= first_block.height {
        return Err(ConsensusError::InsufficientHeight {
            height: last_block.height,
            required: first_block.height + 1,
        });
    }
    if last_block.chain_work <= first_block.chain_work {
        return Err(ConsensusError::InvalidChainWork);
    }

    let spacing = params.target_spacing as i64;
    let mut work = widen(&(last_block.chain_work - first_block.chain_work));
    work = work * U512::from(spacing as u64);

    let actual_timespan =
        last_block.header.timestamp as i64 - first_block.header.timestamp as i64;
    if actual_timespan <= 0 {
        return Err(ConsensusError::InvalidTimespan(actual_timespan));
    }
    let actual_timespan = actual_timespan.clamp(
        DAA_MIN_TIMESPAN_BLOCKS as i64 * spacing,
        DAA_MAX_TIMESPAN_BLOCKS as i64 * spacing,
    );

    work = work / U512::from(actual_timespan as u64);
    if work.is_zero() {
        return Err(ConsensusError::InvalidChainWork);
    }

    let largest_hash = U512::one() << 256usize;
    Ok(narrow_saturating(&(largest_hash / work - U512::one())))
}

/// VerifyDifficulty: ℕ256 × ℋ → {ok, reject}
///
/// The computed target is clamped to the proof-of-work limit and truncated
/// to the precision of the received compact bits before the comparison.
pub fn verify_difficulty(params: &NetworkParams, new_target: U256, next: &BlockHeader) -> Result<()> {
    let mut new_target = new_target;
    if new_target > params.max_target {
        info!("Difficulty hit proof of work limit: {:x}", new_target);
        new_target = params.max_target;
    }

    let received = next.bits;
    let computed = encode_compact_bits(&truncate_to_received_precision(new_target, received));
    if computed != received {
        return Err(ConsensusError::DifficultyMismatch { computed, received });
    }
    Ok(())
}

/// Drop the bits of `target` below the mantissa of the received compact bits.
fn truncate_to_received_precision(target: U256, received: u32) -> U256 {
    let accuracy_bytes = (received >> 24) as i64 - 3;
    target & precision_mask(accuracy_bytes)
}

/// 0xffffff shifted to cover the mantissa bytes of an exponent.
fn precision_mask(accuracy_bytes: i64) -> U256 {
    let mantissa = U256::from(0x00ff_ffffu32);
    let shift = accuracy_bytes.unsigned_abs() * 8;
    if shift >= 256 {
        return U256::zero();
    }
    if accuracy_bytes >= 0 {
        mantissa << shift as usize
    } else {
        mantissa >> shift as usize
    }
}
