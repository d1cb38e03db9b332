use soroban_sdk::{contractclient, contracttype, Address, Env};

/// Descriptor of a pool inside the external protocol.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExternalPool {
    /// Token the external pool accepts as stake.
    pub stake_token: Address,
    /// A shut-down pool no longer accepts deposits.
    pub shutdown: bool,
}

/// Minimum surface of the external staking protocol.
///
/// The vault treats the implementation as a black box: it never trusts the
/// amounts returned by `get_reward` and instead measures its own custody
/// balances around the call.
#[contractclient(name = "BoosterClient")]
pub trait BoosterInterface {
    /// Describe external pool `pid`. Fails for an unknown pid.
    fn pool_info(env: Env, pid: u32) -> ExternalPool;

    /// The two reward tokens the protocol pays out, `(primary, secondary)`.
    fn reward_tokens(env: Env) -> (Address, Address);

    /// Pull `amount` of the pool's stake token from `from` (which must have
    /// approved the protocol) and credit it to `from`'s external balance.
    fn deposit(env: Env, from: Address, pid: u32, amount: i128);

    /// Return `amount` of previously deposited stake token to `to`.
    fn withdraw(env: Env, to: Address, pid: u32, amount: i128);

    /// Realize accrued pool rewards into a claimable state.
    fn earmark_rewards(env: Env, pid: u32);

    /// Transfer everything `account` has earned in `pid` to `account`.
    /// Returns the amounts the protocol *claims* it paid.
    fn get_reward(env: Env, account: Address, pid: u32) -> (i128, i128);

    /// Rewards `account` could collect right now with `get_reward`.
    fn earned(env: Env, account: Address, pid: u32) -> (i128, i128);
}
