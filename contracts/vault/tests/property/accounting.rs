#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Properties of the reward-per-share arithmetic in isolation.
//!
//! Invariants tested:
//! - Splitting a reward between stakers never hands out more than the reward
//! - Rounded-up debt never exceeds the rounded-down entitlement by more than 1
//! - Settling twice against the same accumulator adds nothing

use proptest::prelude::*;
use vault::{rewards, RewardPair, UserPosition};

proptest! {
    #[test]
    fn prop_split_never_exceeds_reward(
        stakes in prop::collection::vec(1i128..1_000_000_000_000, 1..8),
        reward in 0i128..1_000_000_000_000_000,
    ) {
        let total: i128 = stakes.iter().sum();
        let acc = rewards::accumulate(0, reward, total).unwrap();

        let paid: i128 = stakes
            .iter()
            .map(|stake| rewards::accrued(*stake, acc).unwrap())
            .sum();
        prop_assert!(paid <= reward);
        // Floor loses less than one unit per staker.
        prop_assert!(reward - paid <= stakes.len() as i128);
    }

    #[test]
    fn prop_ceil_within_one_of_floor(
        amount in 0i128..1_000_000_000_000_000,
        acc in 0i128..100_000_000_000_000_000_000,
    ) {
        let floor = rewards::accrued(amount, acc).unwrap();
        let ceil = rewards::accrued_ceil(amount, acc).unwrap();
        prop_assert!(floor <= ceil);
        prop_assert!(ceil - floor <= 1);
    }

    #[test]
    fn prop_settle_is_idempotent(
        amount in 0i128..1_000_000_000_000,
        first in 0i128..1_000_000_000_000_000_000_000,
        step in 0i128..1_000_000_000_000_000_000_000,
    ) {
        let start = RewardPair { primary: first, secondary: first / 3 };
        let mut position = UserPosition { amount, ..Default::default() };
        rewards::reset_debt(&mut position, &start).unwrap();

        let later = RewardPair {
            primary: first + step,
            secondary: first / 3 + step / 7,
        };
        rewards::settle(&mut position, &later).unwrap();
        let after_first = position.clone();
        rewards::settle(&mut position, &later).unwrap();

        prop_assert_eq!(position, after_first);
    }

    #[test]
    fn prop_accumulator_never_decreases(
        acc in 0i128..1_000_000_000_000_000_000_000,
        reward in -1_000i128..1_000_000_000_000,
        total in -10i128..1_000_000_000,
    ) {
        let next = rewards::accumulate(acc, reward, total).unwrap();
        prop_assert!(next >= acc);
        if total <= 0 || reward <= 0 {
            prop_assert_eq!(next, acc);
        }
    }
}
