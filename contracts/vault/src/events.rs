#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::RewardPair;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the vault is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub booster: Address,
    pub primary_reward_token: Address,
    pub secondary_reward_token: Address,
    pub timestamp: u64,
}

/// Fired when a pool is appended to the registry.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolRegisteredEvent {
    pub pool_id: u32,
    pub stake_token: Address,
    pub external_pool_id: u32,
    pub allocation_weight: u32,
    pub timestamp: u64,
}

/// Fired when a user stakes into a pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a user takes stake back out of a pool.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a harvest pulled a non-zero amount into custody.
///
/// `discarded` is set when the pool had no stake, in which case the amounts
/// stay in custody without being credited to anyone.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestedEvent {
    pub pool_id: u32,
    pub harvested: RewardPair,
    pub acc_reward_per_share: RewardPair,
    pub discarded: bool,
    pub timestamp: u64,
}

/// Fired when held rewards are paid out.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimedEvent {
    pub user: Address,
    pub pool_id: u32,
    pub recipient: Address,
    pub primary: i128,
    pub secondary: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AutoHarvestSetEvent {
    pub enabled: bool,
    pub timestamp: u64,
}

/// Fired when an admin transfer is proposed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferProposedEvent {
    pub current_admin: Address,
    pub proposed_admin: Address,
    pub timestamp: u64,
}

/// Fired when an admin transfer is accepted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferAcceptedEvent {
    pub old_admin: Address,
    pub new_admin: Address,
    pub timestamp: u64,
}

/// Fired when a pending admin transfer is cancelled.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferCancelledEvent {
    pub admin: Address,
    pub cancelled_proposed: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    booster: Address,
    primary_reward_token: Address,
    secondary_reward_token: Address,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            booster,
            primary_reward_token,
            secondary_reward_token,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_registered(
    env: &Env,
    pool_id: u32,
    stake_token: Address,
    external_pool_id: u32,
    allocation_weight: u32,
) {
    env.events().publish(
        (symbol_short!("POOL_ADD"), pool_id),
        PoolRegisteredEvent {
            pool_id,
            stake_token,
            external_pool_id,
            allocation_weight,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposit(
    env: &Env,
    user: Address,
    pool_id: u32,
    amount: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), user.clone(), pool_id),
        DepositEvent {
            user,
            pool_id,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdraw(
    env: &Env,
    user: Address,
    pool_id: u32,
    amount: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), user.clone(), pool_id),
        WithdrawEvent {
            user,
            pool_id,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_harvested(
    env: &Env,
    pool_id: u32,
    harvested: RewardPair,
    acc_reward_per_share: RewardPair,
    discarded: bool,
) {
    env.events().publish(
        (symbol_short!("HARVEST"), pool_id),
        HarvestedEvent {
            pool_id,
            harvested,
            acc_reward_per_share,
            discarded,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_claimed(
    env: &Env,
    user: Address,
    pool_id: u32,
    recipient: Address,
    primary: i128,
    secondary: i128,
) {
    env.events().publish(
        (symbol_short!("CLAIM"), user.clone(), pool_id),
        ClaimedEvent {
            user,
            pool_id,
            recipient,
            primary,
            secondary,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_auto_harvest_set(env: &Env, enabled: bool) {
    env.events().publish(
        (symbol_short!("AUTO_HRV"),),
        AutoHarvestSetEvent {
            enabled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_proposed(env: &Env, current_admin: Address, proposed_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_PROP"), current_admin.clone()),
        AdminTransferProposedEvent {
            current_admin,
            proposed_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_accepted(env: &Env, old_admin: Address, new_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_ACPT"), new_admin.clone()),
        AdminTransferAcceptedEvent {
            old_admin,
            new_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_cancelled(env: &Env, admin: Address, cancelled_proposed: Address) {
    env.events().publish(
        (symbol_short!("ADM_CNCL"), admin.clone()),
        AdminTransferCancelledEvent {
            admin,
            cancelled_proposed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
