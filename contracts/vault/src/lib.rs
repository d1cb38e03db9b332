#![no_std]

//! Multi-pool staking vault.
//!
//! Users stake pool tokens into the vault; the vault forwards them to an
//! external yield protocol (the "booster"), harvests the two reward tokens
//! that protocol pays, and distributes them to stakers pro rata through a
//! per-pool reward-per-share accumulator.

pub mod events;
pub mod harvest;
pub mod rewards;
pub mod storage;

use common::BoosterClient;
use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env};

/// Ledgers the booster's allowance stays valid for after a deposit.
const APPROVAL_LEDGERS: u32 = 1;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    TokensIdentical = 5,
    NotFound = 6,
    ConfigurationMismatch = 7,
    InsufficientAllowance = 8,
    TransferFailed = 9,
    InsufficientStake = 10,
    HarvestFailed = 11,
    /// Custody cannot cover what the ledger owes. Never expected; indicates
    /// broken accounting rather than a user mistake.
    InsufficientVaultBalance = 12,
    MathOverflow = 13,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// One value per reward token.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardPair {
    pub primary: i128,
    pub secondary: i128,
}

impl RewardPair {
    pub fn is_zero(&self) -> bool {
        self.primary == 0 && self.secondary == 0
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultConfig {
    pub admin: Address,
    pub booster: Address,
    pub primary_reward_token: Address,
    pub secondary_reward_token: Address,
    /// Harvest before every deposit and withdrawal.
    pub auto_harvest: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub id: u32,
    pub stake_token: Address,
    pub external_pool_id: u32,
    /// Recorded for reporting; distribution is per pool and ignores it.
    pub allocation_weight: u32,
    pub total_staked: i128,
    /// Cumulative reward per unit of stake, scaled by [`rewards::SCALE`].
    pub acc_reward_per_share: RewardPair,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserPosition {
    pub amount: i128,
    pub reward_debt: RewardPair,
    /// Settled rewards waiting for `claim`.
    pub pending_rewards: RewardPair,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingVault;

#[contractimpl]
impl StakingVault {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the vault.
    ///
    /// * `booster` – the external protocol stake is forwarded to.
    /// * `primary_reward_token`, `secondary_reward_token` – must match what
    ///   the booster reports it pays, in that order.
    pub fn initialize(
        env: Env,
        admin: Address,
        booster: Address,
        primary_reward_token: Address,
        secondary_reward_token: Address,
    ) -> Result<(), ContractError> {
        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if primary_reward_token == secondary_reward_token {
            return Err(ContractError::TokensIdentical);
        }

        match BoosterClient::new(&env, &booster).try_reward_tokens() {
            Ok(Ok((primary, secondary)))
                if primary == primary_reward_token && secondary == secondary_reward_token => {}
            _ => return Err(ContractError::ConfigurationMismatch),
        }

        storage::save_config(
            &env,
            &VaultConfig {
                admin: admin.clone(),
                booster: booster.clone(),
                primary_reward_token: primary_reward_token.clone(),
                secondary_reward_token: secondary_reward_token.clone(),
                auto_harvest: true,
            },
        );

        events::publish_initialized(
            &env,
            admin,
            booster,
            primary_reward_token,
            secondary_reward_token,
        );

        Ok(())
    }

    // ── Pool registry ───────────────────────────────────────────────────────

    /// Append a pool staking `stake_token` into booster pool
    /// `external_pool_id`. Returns the new pool id.
    ///
    /// The booster must report the same stake token for that pool, the pool
    /// must be open and no other vault pool may already stake into it;
    /// anything else is a `ConfigurationMismatch` and no pool is created.
    pub fn register_pool(
        env: Env,
        caller: Address,
        allocation_weight: u32,
        stake_token: Address,
        external_pool_id: u32,
    ) -> Result<u32, ContractError> {
        let config = storage::load_config(&env)?;
        caller.require_auth();
        Self::require_admin(&config, &caller)?;

        if stake_token == config.primary_reward_token || stake_token == config.secondary_reward_token
        {
            return Err(ContractError::ConfigurationMismatch);
        }
        let external = match BoosterClient::new(&env, &config.booster)
            .try_pool_info(&external_pool_id)
        {
            Ok(Ok(external)) => external,
            _ => return Err(ContractError::ConfigurationMismatch),
        };
        if external.stake_token != stake_token || external.shutdown {
            return Err(ContractError::ConfigurationMismatch);
        }
        if let Some(existing) = storage::pool_for_external(&env, external_pool_id) {
            log!(&env, "external pool already registered", external_pool_id, existing);
            return Err(ContractError::ConfigurationMismatch);
        }

        let pool_id = storage::next_pool_id(&env)?;
        storage::bind_external(&env, external_pool_id, pool_id);
        storage::save_pool(
            &env,
            &Pool {
                id: pool_id,
                stake_token: stake_token.clone(),
                external_pool_id,
                allocation_weight,
                total_staked: 0,
                acc_reward_per_share: RewardPair::default(),
            },
        );

        events::publish_pool_registered(
            &env,
            pool_id,
            stake_token,
            external_pool_id,
            allocation_weight,
        );

        Ok(pool_id)
    }

    pub fn pool_count(env: Env) -> u32 {
        storage::pool_count(&env)
    }

    pub fn pool_info(env: Env, pool_id: u32) -> Result<Pool, ContractError> {
        storage::load_config(&env)?;
        storage::load_pool(&env, pool_id)
    }

    /// The user's position in `pool_id`; all zeroes if they never staked.
    pub fn user_info(env: Env, pool_id: u32, user: Address) -> Result<UserPosition, ContractError> {
        storage::load_config(&env)?;
        storage::load_pool(&env, pool_id)?;
        Ok(storage::load_position(&env, pool_id, &user))
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Stake `amount` of the pool's token. The user must have approved the
    /// vault for at least `amount`.
    ///
    /// Pending rewards are settled against the pre-deposit stake first, so
    /// the new tokens only earn from accrual that happens after this call.
    pub fn deposit(env: Env, user: Address, pool_id: u32, amount: i128) -> Result<(), ContractError> {
        let config = storage::load_config(&env)?;
        user.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        let mut pool = storage::load_pool(&env, pool_id)?;

        let this = env.current_contract_address();
        let stake_token = token::Client::new(&env, &pool.stake_token);
        if stake_token.allowance(&user, &this) < amount {
            return Err(ContractError::InsufficientAllowance);
        }

        // 1. Bring the accumulator up to date and settle the existing stake.
        if config.auto_harvest {
            harvest::realize_rewards(&env, &config, &mut pool)?;
        }
        let mut position = storage::load_position(&env, pool_id, &user);
        rewards::settle(&mut position, &pool.acc_reward_per_share)?;

        // 2. Pull the tokens into custody and forward them to the booster.
        if !matches!(
            stake_token.try_transfer_from(&this, &user, &this, &amount),
            Ok(Ok(()))
        ) {
            return Err(ContractError::TransferFailed);
        }
        Self::stake_external(&env, &config, &pool, amount)?;

        // 3. Commit.
        position.amount = position
            .amount
            .checked_add(amount)
            .ok_or(ContractError::MathOverflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::MathOverflow)?;
        rewards::reset_debt(&mut position, &pool.acc_reward_per_share)?;

        storage::save_position(&env, pool_id, &user, &position);
        storage::save_pool(&env, &pool);

        events::publish_deposit(&env, user, pool_id, amount, pool.total_staked);

        Ok(())
    }

    /// Unstake `amount` and return it to the user.
    ///
    /// Rewards earned up to this point stay claimable after the stake is
    /// gone. If the pre-withdraw harvest fails the withdrawal still goes
    /// through; only `get_vault_rewards` reports `HarvestFailed`.
    pub fn withdraw(env: Env, user: Address, pool_id: u32, amount: i128) -> Result<(), ContractError> {
        let config = storage::load_config(&env)?;
        user.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        let mut pool = storage::load_pool(&env, pool_id)?;
        let mut position = storage::load_position(&env, pool_id, &user);
        if amount > position.amount {
            return Err(ContractError::InsufficientStake);
        }

        // Principal stays withdrawable while the booster's reward side fails;
        // the unharvested accrual is picked up by the next harvest.
        if config.auto_harvest {
            match harvest::realize_rewards(&env, &config, &mut pool) {
                Ok(_) => {}
                Err(ContractError::HarvestFailed) => {
                    log!(&env, "withdraw without harvest", pool_id, amount);
                }
                Err(e) => return Err(e),
            }
        }
        rewards::settle(&mut position, &pool.acc_reward_per_share)?;

        Self::unstake_external(&env, &config, &pool, amount)?;
        if !matches!(
            token::Client::new(&env, &pool.stake_token).try_transfer(
                &env.current_contract_address(),
                &user,
                &amount
            ),
            Ok(Ok(()))
        ) {
            return Err(ContractError::TransferFailed);
        }

        position.amount = position
            .amount
            .checked_sub(amount)
            .ok_or(ContractError::MathOverflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::MathOverflow)?;
        rewards::reset_debt(&mut position, &pool.acc_reward_per_share)?;

        storage::save_position(&env, pool_id, &user, &position);
        storage::save_pool(&env, &pool);

        events::publish_withdraw(&env, user, pool_id, amount, pool.total_staked);

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Harvest the pool's external rewards into custody and credit them to
    /// the pool's stakers. Returns the measured `(primary, secondary)`
    /// amounts; `(0, 0)` when nothing new had accrued.
    ///
    /// Anyone may call this.
    pub fn get_vault_rewards(env: Env, pool_id: u32) -> Result<(i128, i128), ContractError> {
        let config = storage::load_config(&env)?;
        let mut pool = storage::load_pool(&env, pool_id)?;

        let harvested = harvest::realize_rewards(&env, &config, &mut pool)?;
        if !harvested.is_zero() {
            storage::save_pool(&env, &pool);
        }

        Ok((harvested.primary, harvested.secondary))
    }

    /// Estimate of what `user` could claim from `pool_id` after the next
    /// harvest, as `(primary, secondary)`.
    ///
    /// Includes rewards still sitting in the booster. Advisory only: `claim`
    /// pays what has actually been harvested.
    pub fn calculate_rewards_earned(
        env: Env,
        user: Address,
        pool_id: u32,
    ) -> Result<(i128, i128), ContractError> {
        let config = storage::load_config(&env)?;
        let pool = storage::load_pool(&env, pool_id)?;
        let position = storage::load_position(&env, pool_id, &user);

        let acc = harvest::estimate_accumulator(&env, &config, &pool);
        let earned = rewards::earned(&position, &acc)?;

        Ok((earned.primary, earned.secondary))
    }

    /// Pay `user`'s harvested rewards from `pool_id` to `recipient`.
    ///
    /// Returns the `(primary, secondary)` amounts transferred. Does not
    /// harvest; call `get_vault_rewards` first to include fresh accrual.
    pub fn claim(
        env: Env,
        user: Address,
        pool_id: u32,
        recipient: Address,
    ) -> Result<(i128, i128), ContractError> {
        let config = storage::load_config(&env)?;
        user.require_auth();

        let pool = storage::load_pool(&env, pool_id)?;
        let mut position = storage::load_position(&env, pool_id, &user);
        rewards::settle(&mut position, &pool.acc_reward_per_share)?;

        let owed = position.pending_rewards.clone();
        if owed.is_zero() {
            return Ok((0, 0));
        }

        let this = env.current_contract_address();
        let primary = token::Client::new(&env, &config.primary_reward_token);
        let secondary = token::Client::new(&env, &config.secondary_reward_token);
        if primary.balance(&this) < owed.primary || secondary.balance(&this) < owed.secondary {
            log!(&env, "custody below owed rewards", pool_id, owed.primary, owed.secondary);
            return Err(ContractError::InsufficientVaultBalance);
        }

        position.pending_rewards = RewardPair::default();
        storage::save_position(&env, pool_id, &user, &position);

        for (client, amount) in [(&primary, owed.primary), (&secondary, owed.secondary)] {
            if amount > 0
                && !matches!(client.try_transfer(&this, &recipient, &amount), Ok(Ok(())))
            {
                return Err(ContractError::TransferFailed);
            }
        }

        events::publish_claimed(&env, user, pool_id, recipient, owed.primary, owed.secondary);

        Ok((owed.primary, owed.secondary))
    }

    // ── Configuration ───────────────────────────────────────────────────────

    /// Toggle harvesting before deposits and withdrawals.
    pub fn set_auto_harvest(env: Env, caller: Address, enabled: bool) -> Result<(), ContractError> {
        let mut config = storage::load_config(&env)?;
        caller.require_auth();
        Self::require_admin(&config, &caller)?;

        config.auto_harvest = enabled;
        storage::save_config(&env, &config);

        events::publish_auto_harvest_set(&env, enabled);

        Ok(())
    }

    pub fn get_config(env: Env) -> Result<VaultConfig, ContractError> {
        storage::load_config(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        Ok(storage::load_config(&env)?.admin)
    }

    // ── Admin transfer (two-step) ──────────────────────────────────────────

    /// Propose a new admin address. Only the current admin can call this.
    /// The new admin must call `accept_admin` to complete the transfer.
    pub fn propose_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        let config = storage::load_config(&env)?;
        current_admin.require_auth();
        Self::require_admin(&config, &current_admin)?;

        storage::set_pending_admin(&env, &new_admin);

        events::publish_admin_transfer_proposed(&env, current_admin, new_admin);

        Ok(())
    }

    /// Accept the pending admin transfer. Only the proposed new admin can call this.
    pub fn accept_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        let mut config = storage::load_config(&env)?;
        new_admin.require_auth();

        let pending = storage::pending_admin(&env).ok_or(ContractError::InvalidInput)?;
        if new_admin != pending {
            return Err(ContractError::Unauthorized);
        }

        let old_admin = config.admin.clone();
        config.admin = new_admin.clone();
        storage::save_config(&env, &config);
        storage::clear_pending_admin(&env);

        events::publish_admin_transfer_accepted(&env, old_admin, new_admin);

        Ok(())
    }

    /// Cancel a pending admin transfer. Only the current admin can call this.
    pub fn cancel_admin_transfer(env: Env, current_admin: Address) -> Result<(), ContractError> {
        let config = storage::load_config(&env)?;
        current_admin.require_auth();
        Self::require_admin(&config, &current_admin)?;

        let pending = storage::pending_admin(&env).ok_or(ContractError::InvalidInput)?;
        storage::clear_pending_admin(&env);

        events::publish_admin_transfer_cancelled(&env, current_admin, pending);

        Ok(())
    }

    pub fn get_pending_admin(env: Env) -> Option<Address> {
        storage::pending_admin(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_admin(config: &VaultConfig, caller: &Address) -> Result<(), ContractError> {
        if *caller != config.admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Approve the booster for exactly `amount` and have it pull the stake.
    /// Succeeds only if custody dropped by exactly `amount`.
    fn stake_external(
        env: &Env,
        config: &VaultConfig,
        pool: &Pool,
        amount: i128,
    ) -> Result<(), ContractError> {
        let this = env.current_contract_address();
        let stake_token = token::Client::new(env, &pool.stake_token);
        let before = stake_token.balance(&this);

        let expiration = env.ledger().sequence().saturating_add(APPROVAL_LEDGERS);
        if !matches!(
            stake_token.try_approve(&this, &config.booster, &amount, &expiration),
            Ok(Ok(()))
        ) {
            return Err(ContractError::TransferFailed);
        }
        if !matches!(
            BoosterClient::new(env, &config.booster).try_deposit(
                &this,
                &pool.external_pool_id,
                &amount
            ),
            Ok(Ok(()))
        ) {
            log!(env, "booster deposit failed", pool.id, amount);
            return Err(ContractError::TransferFailed);
        }

        if before.saturating_sub(stake_token.balance(&this)) != amount {
            return Err(ContractError::TransferFailed);
        }
        Ok(())
    }

    /// Ask the booster for `amount` back. Succeeds only if custody grew by
    /// exactly `amount`.
    fn unstake_external(
        env: &Env,
        config: &VaultConfig,
        pool: &Pool,
        amount: i128,
    ) -> Result<(), ContractError> {
        let this = env.current_contract_address();
        let stake_token = token::Client::new(env, &pool.stake_token);
        let before = stake_token.balance(&this);

        if !matches!(
            BoosterClient::new(env, &config.booster).try_withdraw(
                &this,
                &pool.external_pool_id,
                &amount
            ),
            Ok(Ok(()))
        ) {
            log!(env, "booster withdraw failed", pool.id, amount);
            return Err(ContractError::TransferFailed);
        }

        if stake_token.balance(&this).saturating_sub(before) != amount {
            return Err(ContractError::TransferFailed);
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
