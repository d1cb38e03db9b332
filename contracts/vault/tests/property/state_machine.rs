#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based state machine tests for the staking vault.
//!
//! Random sequences of deposits, withdrawals, harvests, claims and time
//! jumps are replayed against a vault wired to the mock booster. After every
//! step the following must hold:
//!
//! - Users' stakes sum to the pool's `total_staked`, which matches what the
//!   booster holds for the vault
//! - Per-share accumulators never decrease
//! - Rewards owed to users never exceed what the vault holds in custody
//! - Custody plus everything claimed equals what left the booster
//! - A second harvest in the same ledger finds nothing

use mock_booster::{MockBooster, MockBoosterClient};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use vault::{rewards, ContractError, RewardPair, StakingVault, StakingVaultClient};

const USERS: usize = 3;
const FUNDING: i128 = 1_000_000_000_000_000;
const USER_FUNDING: i128 = 1_000_000_000;

#[derive(Arbitrary, Clone, Debug)]
enum Action {
    Deposit {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..1_000_000")]
        amount: i128,
    },
    Withdraw {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
        #[proptest(strategy = "1i128..1_000_000")]
        amount: i128,
    },
    Harvest,
    Claim {
        #[proptest(strategy = "0usize..USERS")]
        user: usize,
    },
    Advance {
        #[proptest(strategy = "1u64..600")]
        seconds: u64,
    },
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct Harness {
    env: Env,
    vault: StakingVaultClient<'static>,
    vault_id: Address,
    booster: MockBoosterClient<'static>,
    booster_id: Address,
    primary: Address,
    secondary: Address,
    external_pid: u32,
    users: std::vec::Vec<Address>,
    claimed: RewardPair,
}

impl Harness {
    fn new(primary_rate: i128, secondary_rate: i128, auto_harvest: bool) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(0);

        let new_token = |env: &Env| {
            env.register_stellar_asset_contract_v2(Address::generate(env))
                .address()
        };
        let stake_token = new_token(&env);
        let primary = new_token(&env);
        let secondary = new_token(&env);

        let booster_id = env.register(MockBooster, ());
        let booster = MockBoosterClient::new(&env, &booster_id);
        booster.initialize(&Address::generate(&env), &primary, &secondary);
        let external_pid = booster.add_pool(&stake_token, &primary_rate, &secondary_rate);
        StellarAssetClient::new(&env, &primary).mint(&booster_id, &FUNDING);
        StellarAssetClient::new(&env, &secondary).mint(&booster_id, &FUNDING);

        let vault_id = env.register(StakingVault, ());
        let vault = StakingVaultClient::new(&env, &vault_id);
        let admin = Address::generate(&env);
        vault.initialize(&admin, &booster_id, &primary, &secondary);
        vault.register_pool(&admin, &100, &stake_token, &external_pid);
        vault.set_auto_harvest(&admin, &auto_harvest);

        let users = (0..USERS)
            .map(|_| {
                let user = Address::generate(&env);
                StellarAssetClient::new(&env, &stake_token).mint(&user, &USER_FUNDING);
                TokenClient::new(&env, &stake_token).approve(
                    &user,
                    &vault_id,
                    &USER_FUNDING,
                    &1_000_000,
                );
                user
            })
            .collect();

        Harness {
            env,
            vault,
            vault_id,
            booster,
            booster_id,
            primary,
            secondary,
            external_pid,
            users,
            claimed: RewardPair::default(),
        }
    }

    fn custody(&self) -> RewardPair {
        RewardPair {
            primary: TokenClient::new(&self.env, &self.primary).balance(&self.vault_id),
            secondary: TokenClient::new(&self.env, &self.secondary).balance(&self.vault_id),
        }
    }

    fn paid_by_booster(&self) -> RewardPair {
        RewardPair {
            primary: FUNDING - TokenClient::new(&self.env, &self.primary).balance(&self.booster_id),
            secondary: FUNDING
                - TokenClient::new(&self.env, &self.secondary).balance(&self.booster_id),
        }
    }

    fn apply(&mut self, action: &Action) -> Result<(), TestCaseError> {
        match *action {
            Action::Deposit { user, amount } => {
                let who = self.users[user].clone();
                self.vault.deposit(&who, &0, &amount);
            }
            Action::Withdraw { user, amount } => {
                let who = self.users[user].clone();
                let staked = self.vault.user_info(&0, &who).amount;
                if amount > staked {
                    match self.vault.try_withdraw(&who, &0, &amount) {
                        Err(Ok(e)) => prop_assert_eq!(e, ContractError::InsufficientStake),
                        _ => prop_assert!(false, "Expected InsufficientStake error"),
                    }
                    prop_assert_eq!(self.vault.user_info(&0, &who).amount, staked);
                } else {
                    self.vault.withdraw(&who, &0, &amount);
                }
            }
            Action::Harvest => {
                self.vault.get_vault_rewards(&0);
                prop_assert_eq!(self.vault.get_vault_rewards(&0), (0, 0));
            }
            Action::Claim { user } => {
                let who = self.users[user].clone();
                let (primary, secondary) = self.vault.claim(&who, &0, &who);
                self.claimed.primary += primary;
                self.claimed.secondary += secondary;
            }
            Action::Advance { seconds } => {
                let now = self.env.ledger().timestamp();
                self.env.ledger().set_timestamp(now + seconds);
            }
        }
        Ok(())
    }

    fn check_invariants(&self, previous_acc: &RewardPair) -> Result<RewardPair, TestCaseError> {
        let pool = self.vault.pool_info(&0);

        let mut staked = 0i128;
        let mut owed = RewardPair::default();
        for user in self.users.iter() {
            let position = self.vault.user_info(&0, user);
            prop_assert!(position.amount >= 0);
            staked += position.amount;
            let earned = rewards::earned(&position, &pool.acc_reward_per_share).unwrap();
            owed.primary += earned.primary;
            owed.secondary += earned.secondary;
        }
        prop_assert_eq!(staked, pool.total_staked);
        prop_assert_eq!(
            self.booster.balance_of(&self.vault_id, &self.external_pid),
            pool.total_staked
        );

        prop_assert!(pool.acc_reward_per_share.primary >= previous_acc.primary);
        prop_assert!(pool.acc_reward_per_share.secondary >= previous_acc.secondary);

        let custody = self.custody();
        prop_assert!(owed.primary <= custody.primary);
        prop_assert!(owed.secondary <= custody.secondary);

        let paid = self.paid_by_booster();
        prop_assert_eq!(custody.primary + self.claimed.primary, paid.primary);
        prop_assert_eq!(custody.secondary + self.claimed.secondary, paid.secondary);

        Ok(pool.acc_reward_per_share)
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every reachable state keeps stake, accumulator and custody consistent.
    #[test]
    fn prop_random_operations_preserve_invariants(
        primary_rate in 0i128..1_000,
        secondary_rate in 0i128..100,
        auto_harvest in any::<bool>(),
        actions in prop::collection::vec(any::<Action>(), 1..24),
    ) {
        let mut harness = Harness::new(primary_rate, secondary_rate, auto_harvest);
        let mut acc = RewardPair::default();
        for action in actions.iter() {
            harness.apply(action)?;
            acc = harness.check_invariants(&acc)?;
        }
    }

    /// Once everyone has withdrawn and claimed after a final harvest, the
    /// vault holds only rounding dust and discarded rewards, never a deficit.
    #[test]
    fn prop_full_exit_leaves_no_debt(
        primary_rate in 1i128..1_000,
        secondary_rate in 1i128..100,
        actions in prop::collection::vec(any::<Action>(), 1..16),
    ) {
        let mut harness = Harness::new(primary_rate, secondary_rate, true);
        for action in actions.iter() {
            harness.apply(action)?;
        }

        harness.vault.get_vault_rewards(&0);
        for user in harness.users.clone().iter() {
            let staked = harness.vault.user_info(&0, user).amount;
            if staked > 0 {
                harness.vault.withdraw(user, &0, &staked);
            }
            let (primary, secondary) = harness.vault.claim(user, &0, user);
            harness.claimed.primary += primary;
            harness.claimed.secondary += secondary;
        }

        prop_assert_eq!(harness.vault.pool_info(&0).total_staked, 0);
        for user in harness.users.iter() {
            prop_assert_eq!(harness.vault.user_info(&0, user).pending_rewards, RewardPair::default());
        }
        let custody = harness.custody();
        prop_assert!(custody.primary >= 0 && custody.secondary >= 0);
        let paid = harness.paid_by_booster();
        prop_assert_eq!(custody.primary + harness.claimed.primary, paid.primary);
    }
}
