#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mock_booster::{MockBooster, MockBoosterClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use vault::{rewards, RewardPair, StakingVault, StakingVaultClient};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { user: u8, amount: u64 },
    Withdraw { user: u8, amount: u64 },
    Harvest,
    Claim { user: u8 },
    Advance { seconds: u16 },
    ToggleAutoHarvest,
    BoosterHalted(bool),
}

const FUNDING: i128 = i64::MAX as i128;

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let stake_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let primary = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let secondary = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let booster_id = env.register(MockBooster, ());
    let booster = MockBoosterClient::new(&env, &booster_id);
    booster.initialize(&Address::generate(&env), &primary, &secondary);
    let external_pid = booster.add_pool(&stake_token, &1_000, &37);
    StellarAssetClient::new(&env, &primary).mint(&booster_id, &FUNDING);
    StellarAssetClient::new(&env, &secondary).mint(&booster_id, &FUNDING);

    let vault_id = env.register(StakingVault, ());
    let client = StakingVaultClient::new(&env, &vault_id);
    let admin = Address::generate(&env);
    client.initialize(&admin, &booster_id, &primary, &secondary);
    client.register_pool(&admin, &100, &stake_token, &external_pid);

    let mut users = vec![];
    for _ in 0..4 {
        let user = Address::generate(&env);
        StellarAssetClient::new(&env, &stake_token).mint(&user, &(u64::MAX as i128));
        TokenClient::new(&env, &stake_token).approve(&user, &vault_id, &(u64::MAX as i128), &1_000_000);
        users.push(user);
    }

    let mut auto_harvest = true;
    for action in actions.into_iter().take(64) {
        // Failures are expected for out-of-range input; only panics and
        // broken invariants are findings.
        match action {
            FuzzAction::Deposit { user, amount } => {
                let user = &users[user as usize % users.len()];
                let _ = client.try_deposit(user, &0, &(amount as i128));
            }
            FuzzAction::Withdraw { user, amount } => {
                let user = &users[user as usize % users.len()];
                let _ = client.try_withdraw(user, &0, &(amount as i128));
            }
            FuzzAction::Harvest => {
                let _ = client.try_get_vault_rewards(&0);
            }
            FuzzAction::Claim { user } => {
                let user = &users[user as usize % users.len()];
                let _ = client.try_claim(user, &0, user);
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + seconds as u64);
            }
            FuzzAction::ToggleAutoHarvest => {
                auto_harvest = !auto_harvest;
                client.set_auto_harvest(&admin, &auto_harvest);
            }
            FuzzAction::BoosterHalted(halted) => {
                booster.set_halted(&halted);
            }
        }

        let pool = client.pool_info(&0);
        let mut staked = 0i128;
        let mut owed = RewardPair::default();
        for user in users.iter() {
            let position = client.user_info(&0, user);
            staked += position.amount;
            if let Ok(earned) = rewards::earned(&position, &pool.acc_reward_per_share) {
                owed.primary += earned.primary;
                owed.secondary += earned.secondary;
            }
        }
        assert_eq!(staked, pool.total_staked);
        assert!(owed.primary <= TokenClient::new(&env, &primary).balance(&vault_id));
        assert!(owed.secondary <= TokenClient::new(&env, &secondary).balance(&vault_id));
    }
});
