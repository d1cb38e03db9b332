//! Reward-per-share accounting.
//!
//! Every pool keeps one accumulator per reward token: the cumulative amount
//! of that token credited per unit of stake, scaled by [`SCALE`]. A position
//! remembers how much of the accumulator it has already been paid for
//! (`reward_debt`), so its entitlement is always
//!
//! ```text
//! pending = amount × acc / SCALE − reward_debt
//! ```
//!
//! Entitlements round down and debts round up. Both directions leave the
//! remainder in vault custody, so the sum of all entitlements never exceeds
//! what was actually harvested.

use crate::{ContractError, RewardPair, UserPosition};

/// Fixed-point scaling factor for `acc_reward_per_share`.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

// ── Accumulator ─────────────────────────────────────────────────────────────

/// Fold `reward` freshly pulled into custody into the accumulator.
///
/// ```text
/// acc' = acc + reward × SCALE / total_staked
/// ```
///
/// With nothing staked the reward has no eligible owner and is left
/// undistributed; `acc` is returned unchanged.
pub fn accumulate(acc: i128, reward: i128, total_staked: i128) -> Result<i128, ContractError> {
    if total_staked <= 0 || reward <= 0 {
        return Ok(acc);
    }
    let delta = reward
        .checked_mul(SCALE)
        .ok_or(ContractError::MathOverflow)?
        / total_staked;
    acc.checked_add(delta).ok_or(ContractError::MathOverflow)
}

pub fn accumulate_pair(
    acc: &RewardPair,
    reward: &RewardPair,
    total_staked: i128,
) -> Result<RewardPair, ContractError> {
    Ok(RewardPair {
        primary: accumulate(acc.primary, reward.primary, total_staked)?,
        secondary: accumulate(acc.secondary, reward.secondary, total_staked)?,
    })
}

// ── Per-position math ───────────────────────────────────────────────────────

/// `amount × acc / SCALE`, rounded down.
pub fn accrued(amount: i128, acc: i128) -> Result<i128, ContractError> {
    Ok(amount.checked_mul(acc).ok_or(ContractError::MathOverflow)? / SCALE)
}

/// `amount × acc / SCALE`, rounded up. Used for reward debt.
pub fn accrued_ceil(amount: i128, acc: i128) -> Result<i128, ContractError> {
    let product = amount.checked_mul(acc).ok_or(ContractError::MathOverflow)?;
    let floor = product / SCALE;
    if product % SCALE == 0 {
        Ok(floor)
    } else {
        floor.checked_add(1).ok_or(ContractError::MathOverflow)
    }
}

/// Rewards earned by `amount` since the debt was last set. Never negative.
pub fn pending(amount: i128, acc: i128, debt: i128) -> Result<i128, ContractError> {
    Ok(accrued(amount, acc)?.saturating_sub(debt).max(0))
}

/// Move everything pending into the position's holding area and advance the
/// debt to `acc`. Must run before `amount` changes.
pub fn settle(position: &mut UserPosition, acc: &RewardPair) -> Result<(), ContractError> {
    let primary = pending(position.amount, acc.primary, position.reward_debt.primary)?;
    let secondary = pending(position.amount, acc.secondary, position.reward_debt.secondary)?;

    position.pending_rewards.primary = position
        .pending_rewards
        .primary
        .checked_add(primary)
        .ok_or(ContractError::MathOverflow)?;
    position.pending_rewards.secondary = position
        .pending_rewards
        .secondary
        .checked_add(secondary)
        .ok_or(ContractError::MathOverflow)?;

    reset_debt(position, acc)
}

/// Price the position's current `amount` in at `acc`, so it only earns
/// from future accumulator growth.
pub fn reset_debt(position: &mut UserPosition, acc: &RewardPair) -> Result<(), ContractError> {
    position.reward_debt = RewardPair {
        primary: accrued_ceil(position.amount, acc.primary)?,
        secondary: accrued_ceil(position.amount, acc.secondary)?,
    };
    Ok(())
}

/// Held rewards plus whatever is pending against `acc`, without mutating.
pub fn earned(position: &UserPosition, acc: &RewardPair) -> Result<RewardPair, ContractError> {
    let mut snapshot = position.clone();
    settle(&mut snapshot, acc)?;
    Ok(snapshot.pending_rewards)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure math, no Soroban environment required.
