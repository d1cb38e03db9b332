//! Storage layout: configuration in instance storage, the pool registry and
//! the user ledger in persistent storage under tuple keys.

use common::ttl;
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::{ContractError, Pool, UserPosition, VaultConfig};

// ── Storage key constants ────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const PENDING_ADMIN: Symbol = symbol_short!("PEND_ADM");
const POOL_COUNT: Symbol = symbol_short!("POOL_CTR");

// Persistent keys: (POOL, pool_id), (EXTERNAL, external_pool_id) and
// (POSITION, pool_id, user).
const POOL: Symbol = symbol_short!("POOL");
const EXTERNAL: Symbol = symbol_short!("EXT");
const POSITION: Symbol = symbol_short!("POS");

// ── Configuration ────────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn load_config(env: &Env) -> Result<VaultConfig, ContractError> {
    let config = env
        .storage()
        .instance()
        .get(&CONFIG)
        .ok_or(ContractError::NotInitialized)?;
    ttl::extend_instance(env);
    Ok(config)
}

pub fn save_config(env: &Env, config: &VaultConfig) {
    env.storage().instance().set(&CONFIG, config);
    ttl::extend_instance(env);
}

pub fn pending_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&PENDING_ADMIN)
}

pub fn set_pending_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&PENDING_ADMIN, admin);
}

pub fn clear_pending_admin(env: &Env) {
    env.storage().instance().remove(&PENDING_ADMIN);
}

// ── Pool registry ────────────────────────────────────────────────────────────

pub fn pool_count(env: &Env) -> u32 {
    env.storage().instance().get(&POOL_COUNT).unwrap_or(0)
}

/// Reserve the next sequential pool id. Ids are never reused.
pub fn next_pool_id(env: &Env) -> Result<u32, ContractError> {
    let id = pool_count(env);
    let next = id.checked_add(1).ok_or(ContractError::MathOverflow)?;
    env.storage().instance().set(&POOL_COUNT, &next);
    Ok(id)
}

pub fn load_pool(env: &Env, pool_id: u32) -> Result<Pool, ContractError> {
    let key = (POOL, pool_id);
    let pool = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::NotFound)?;
    ttl::extend_persistent(env, &key);
    Ok(pool)
}

pub fn save_pool(env: &Env, pool: &Pool) {
    let key = (POOL, pool.id);
    env.storage().persistent().set(&key, pool);
    ttl::extend_persistent(env, &key);
}

/// Vault pool already staking into booster pool `external_pool_id`, if any.
pub fn pool_for_external(env: &Env, external_pool_id: u32) -> Option<u32> {
    let key = (EXTERNAL, external_pool_id);
    let pool_id = env.storage().persistent().get(&key);
    if pool_id.is_some() {
        ttl::extend_persistent(env, &key);
    }
    pool_id
}

/// The booster keeps one balance per (vault, external pool), so each external
/// pool backs at most one vault pool.
pub fn bind_external(env: &Env, external_pool_id: u32, pool_id: u32) {
    let key = (EXTERNAL, external_pool_id);
    env.storage().persistent().set(&key, &pool_id);
    ttl::extend_persistent(env, &key);
}

// ── User ledger ──────────────────────────────────────────────────────────────

/// Positions are created lazily: an absent entry reads as all zeroes.
pub fn load_position(env: &Env, pool_id: u32, user: &Address) -> UserPosition {
    let key = (POSITION, pool_id, user.clone());
    match env.storage().persistent().get(&key) {
        Some(position) => {
            ttl::extend_persistent(env, &key);
            position
        }
        None => UserPosition::default(),
    }
}

/// Positions are never removed, even at zero stake.
pub fn save_position(env: &Env, pool_id: u32, user: &Address, position: &UserPosition) {
    let key = (POSITION, pool_id, user.clone());
    env.storage().persistent().set(&key, position);
    ttl::extend_persistent(env, &key);
}
