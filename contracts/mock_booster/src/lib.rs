//! Reference implementation of the external yield protocol.
//!
//! Each pool emits two reward tokens at a fixed per-second rate, shared
//! between depositors pro rata. Rewards are paid out of the contract's own
//! reward-token balances, so tests fund it by minting into its address.
//!
//! Fault switches (`set_halted`, `set_misreport`, `set_shutdown`) let tests
//! exercise the vault's failure handling.

#![no_std]

use common::booster::{BoosterInterface, ExternalPool};
use common::ttl;
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, panic_with_error, symbol_short, token,
    Address, Env, Symbol,
};

const ADMIN: Symbol = symbol_short!("ADMIN");
const RWD_TOKENS: Symbol = symbol_short!("RWD_TOKS");
const POOL_CTR: Symbol = symbol_short!("POOL_CTR");
const HALTED: Symbol = symbol_short!("HALTED");
const MISREPORT: Symbol = symbol_short!("MISREP");

const PRECISION: i128 = 1_000_000_000_000_000_000;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MockError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    UnknownPool = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
    Halted = 6,
    PoolShutdown = 7,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Pool(u32),
    Account(u32, Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub stake_token: Address,
    pub shutdown: bool,
    /// Reward units emitted per second across all depositors.
    pub primary_rate: i128,
    pub secondary_rate: i128,
    pub total_supply: i128,
    pub last_update: u64,
    pub rpt_primary: i128,
    pub rpt_secondary: i128,
    pub earmarks: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountState {
    pub balance: i128,
    pub rpt_paid_primary: i128,
    pub rpt_paid_secondary: i128,
    pub earned_primary: i128,
    pub earned_secondary: i128,
}

#[contract]
pub struct MockBooster;

#[contractimpl]
impl MockBooster {
    pub fn initialize(env: Env, admin: Address, primary: Address, secondary: Address) {
        if env.storage().instance().has(&ADMIN) {
            panic_with_error!(&env, MockError::AlreadyInitialized);
        }
        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&RWD_TOKENS, &(primary, secondary));
        ttl::extend_instance(&env);
    }

    /// Register a pool accepting `stake_token`, returning its pid.
    pub fn add_pool(
        env: Env,
        stake_token: Address,
        primary_rate: i128,
        secondary_rate: i128,
    ) -> u32 {
        require_admin(&env);
        if primary_rate < 0 || secondary_rate < 0 {
            panic_with_error!(&env, MockError::InvalidAmount);
        }
        let pid: u32 = env.storage().instance().get(&POOL_CTR).unwrap_or(0);
        let pool = PoolState {
            stake_token,
            shutdown: false,
            primary_rate,
            secondary_rate,
            total_supply: 0,
            last_update: env.ledger().timestamp(),
            rpt_primary: 0,
            rpt_secondary: 0,
            earmarks: 0,
        };
        save_pool(&env, pid, &pool);
        env.storage().instance().set(&POOL_CTR, &(pid + 1));
        pid
    }

    /// Make every reward entry point panic while `halted` is set.
    pub fn set_halted(env: Env, halted: bool) {
        require_admin(&env);
        env.storage().instance().set(&HALTED, &halted);
    }

    /// Report twice the paid amount from `get_reward` while set.
    pub fn set_misreport(env: Env, misreport: bool) {
        require_admin(&env);
        env.storage().instance().set(&MISREPORT, &misreport);
    }

    pub fn set_shutdown(env: Env, pid: u32, shutdown: bool) {
        require_admin(&env);
        let mut pool = load_pool(&env, pid);
        pool.shutdown = shutdown;
        save_pool(&env, pid, &pool);
    }

    pub fn balance_of(env: Env, account: Address, pid: u32) -> i128 {
        load_account(&env, pid, &account).balance
    }

    pub fn pool_state(env: Env, pid: u32) -> PoolState {
        load_pool(&env, pid)
    }
}

#[contractimpl]
impl BoosterInterface for MockBooster {
    fn pool_info(env: Env, pid: u32) -> ExternalPool {
        let pool = load_pool(&env, pid);
        ExternalPool {
            stake_token: pool.stake_token,
            shutdown: pool.shutdown,
        }
    }

    fn reward_tokens(env: Env) -> (Address, Address) {
        env.storage()
            .instance()
            .get(&RWD_TOKENS)
            .unwrap_or_else(|| panic_with_error!(&env, MockError::NotInitialized))
    }

    fn deposit(env: Env, from: Address, pid: u32, amount: i128) {
        from.require_auth();
        if amount <= 0 {
            panic_with_error!(&env, MockError::InvalidAmount);
        }
        let mut pool = load_pool(&env, pid);
        if pool.shutdown {
            panic_with_error!(&env, MockError::PoolShutdown);
        }
        checkpoint(&env, &mut pool);
        let mut account = load_account(&env, pid, &from);
        settle(&pool, &mut account);

        let this = env.current_contract_address();
        token::Client::new(&env, &pool.stake_token).transfer_from(&this, &from, &this, &amount);

        account.balance += amount;
        pool.total_supply += amount;
        save_account(&env, pid, &from, &account);
        save_pool(&env, pid, &pool);
    }

    fn withdraw(env: Env, to: Address, pid: u32, amount: i128) {
        to.require_auth();
        if amount <= 0 {
            panic_with_error!(&env, MockError::InvalidAmount);
        }
        let mut pool = load_pool(&env, pid);
        checkpoint(&env, &mut pool);
        let mut account = load_account(&env, pid, &to);
        settle(&pool, &mut account);
        if account.balance < amount {
            panic_with_error!(&env, MockError::InsufficientBalance);
        }

        account.balance -= amount;
        pool.total_supply -= amount;
        save_account(&env, pid, &to, &account);
        save_pool(&env, pid, &pool);

        token::Client::new(&env, &pool.stake_token).transfer(
            &env.current_contract_address(),
            &to,
            &amount,
        );
    }

    fn earmark_rewards(env: Env, pid: u32) {
        require_running(&env);
        let mut pool = load_pool(&env, pid);
        checkpoint(&env, &mut pool);
        pool.earmarks += 1;
        save_pool(&env, pid, &pool);
    }

    fn get_reward(env: Env, account: Address, pid: u32) -> (i128, i128) {
        require_running(&env);
        let mut pool = load_pool(&env, pid);
        checkpoint(&env, &mut pool);
        let mut state = load_account(&env, pid, &account);
        settle(&pool, &mut state);

        let primary = state.earned_primary;
        let secondary = state.earned_secondary;
        state.earned_primary = 0;
        state.earned_secondary = 0;
        save_account(&env, pid, &account, &state);
        save_pool(&env, pid, &pool);

        let (primary_token, secondary_token) = Self::reward_tokens(env.clone());
        let this = env.current_contract_address();
        if primary > 0 {
            token::Client::new(&env, &primary_token).transfer(&this, &account, &primary);
        }
        if secondary > 0 {
            token::Client::new(&env, &secondary_token).transfer(&this, &account, &secondary);
        }

        if env.storage().instance().get(&MISREPORT).unwrap_or(false) {
            (primary * 2, secondary * 2)
        } else {
            (primary, secondary)
        }
    }

    fn earned(env: Env, account: Address, pid: u32) -> (i128, i128) {
        require_running(&env);
        let mut pool = load_pool(&env, pid);
        checkpoint(&env, &mut pool);
        let mut state = load_account(&env, pid, &account);
        settle(&pool, &mut state);
        (state.earned_primary, state.earned_secondary)
    }
}

fn require_admin(env: &Env) {
    let admin: Address = env
        .storage()
        .instance()
        .get(&ADMIN)
        .unwrap_or_else(|| panic_with_error!(env, MockError::NotInitialized));
    admin.require_auth();
}

fn require_running(env: &Env) {
    if env.storage().instance().get(&HALTED).unwrap_or(false) {
        panic_with_error!(env, MockError::Halted);
    }
}

fn load_pool(env: &Env, pid: u32) -> PoolState {
    env.storage()
        .persistent()
        .get(&DataKey::Pool(pid))
        .unwrap_or_else(|| panic_with_error!(env, MockError::UnknownPool))
}

fn save_pool(env: &Env, pid: u32, pool: &PoolState) {
    let key = DataKey::Pool(pid);
    env.storage().persistent().set(&key, pool);
    ttl::extend_persistent(env, &key);
}

fn load_account(env: &Env, pid: u32, account: &Address) -> AccountState {
    env.storage()
        .persistent()
        .get(&DataKey::Account(pid, account.clone()))
        .unwrap_or_default()
}

fn save_account(env: &Env, pid: u32, account: &Address, state: &AccountState) {
    let key = DataKey::Account(pid, account.clone());
    env.storage().persistent().set(&key, state);
    ttl::extend_persistent(env, &key);
}

/// Advance the pool's reward-per-token values to the current timestamp.
fn checkpoint(env: &Env, pool: &mut PoolState) {
    let now = env.ledger().timestamp();
    let elapsed = now.saturating_sub(pool.last_update) as i128;
    if pool.total_supply > 0 && elapsed > 0 {
        pool.rpt_primary += pool.primary_rate * elapsed * PRECISION / pool.total_supply;
        pool.rpt_secondary += pool.secondary_rate * elapsed * PRECISION / pool.total_supply;
    }
    pool.last_update = now;
}

fn settle(pool: &PoolState, account: &mut AccountState) {
    account.earned_primary +=
        account.balance * (pool.rpt_primary - account.rpt_paid_primary) / PRECISION;
    account.earned_secondary +=
        account.balance * (pool.rpt_secondary - account.rpt_paid_secondary) / PRECISION;
    account.rpt_paid_primary = pool.rpt_primary;
    account.rpt_paid_secondary = pool.rpt_secondary;
}
