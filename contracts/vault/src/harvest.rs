//! Pulling rewards out of the external protocol.
//!
//! The booster's reported amounts are never used for accounting: the vault
//! measures its own reward-token balances before and after the calls and
//! credits only the observed increase.

use common::BoosterClient;
use soroban_sdk::{log, token, Env};

use crate::{events, rewards, ContractError, Pool, RewardPair, VaultConfig};

fn custody(env: &Env, config: &VaultConfig) -> RewardPair {
    let this = env.current_contract_address();
    RewardPair {
        primary: token::Client::new(env, &config.primary_reward_token).balance(&this),
        secondary: token::Client::new(env, &config.secondary_reward_token).balance(&this),
    }
}

/// Realize all rewards accrued externally for `pool` and fold the measured
/// deltas into its accumulators. The updated pool is left for the caller to
/// persist.
///
/// Fails with `HarvestFailed` if either booster call fails; `pool` is not
/// modified in that case.
pub fn realize_rewards(
    env: &Env,
    config: &VaultConfig,
    pool: &mut Pool,
) -> Result<RewardPair, ContractError> {
    let this = env.current_contract_address();
    let booster = BoosterClient::new(env, &config.booster);
    let before = custody(env, config);

    if !matches!(booster.try_earmark_rewards(&pool.external_pool_id), Ok(Ok(()))) {
        log!(env, "earmark_rewards failed", pool.id, pool.external_pool_id);
        return Err(ContractError::HarvestFailed);
    }
    let reported = match booster.try_get_reward(&this, &pool.external_pool_id) {
        Ok(Ok(reported)) => reported,
        _ => {
            log!(env, "get_reward failed", pool.id, pool.external_pool_id);
            return Err(ContractError::HarvestFailed);
        }
    };

    let after = custody(env, config);
    let harvested = RewardPair {
        primary: after.primary.saturating_sub(before.primary).max(0),
        secondary: after.secondary.saturating_sub(before.secondary).max(0),
    };
    if reported != (harvested.primary, harvested.secondary) {
        log!(
            env,
            "booster report differs from custody delta",
            reported.0,
            reported.1,
            harvested.primary,
            harvested.secondary
        );
    }
    if harvested.is_zero() {
        return Ok(harvested);
    }

    let discarded = pool.total_staked == 0;
    if discarded {
        log!(env, "harvest with no stake, left undistributed", pool.id);
    }
    pool.acc_reward_per_share =
        rewards::accumulate_pair(&pool.acc_reward_per_share, &harvested, pool.total_staked)?;

    events::publish_harvested(
        env,
        pool.id,
        harvested.clone(),
        pool.acc_reward_per_share.clone(),
        discarded,
    );

    Ok(harvested)
}

/// Accumulator values `pool` would reach if it were harvested right now.
///
/// Read-only: asks the booster what the vault could collect and applies it
/// to a copy of the accumulators. Falls back to the stored values when the
/// booster cannot answer.
pub fn estimate_accumulator(env: &Env, config: &VaultConfig, pool: &Pool) -> RewardPair {
    let booster = BoosterClient::new(env, &config.booster);
    let outstanding = match booster.try_earned(&env.current_contract_address(), &pool.external_pool_id)
    {
        Ok(Ok((primary, secondary))) => RewardPair {
            primary: primary.max(0),
            secondary: secondary.max(0),
        },
        _ => return pool.acc_reward_per_share.clone(),
    };
    rewards::accumulate_pair(&pool.acc_reward_per_share, &outstanding, pool.total_staked)
        .unwrap_or_else(|_| pool.acc_reward_per_share.clone())
}
