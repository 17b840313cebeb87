// Property-based tests for the pool math
// Run with: cargo test -p margin-math --test test_proptest

use margin_math::*;
use margin_types::{Position, FUNDING_PERIOD, HEALTH_UNIT, Q96, TICK_CUMULATIVE_RATE_MAX};
use proptest::prelude::*;
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, Env};

fn sqrt_price_strategy() -> impl Strategy<Value = u128> {
    (Q96 / 1_000)..(Q96 * 1_000)
}

fn position(
    env: &Env,
    zero_for_one: bool,
    size: u128,
    debt: u128,
    margin: u128,
) -> Position {
    Position {
        owner: Address::generate(env),
        zero_for_one,
        size,
        debt0: if zero_for_one { debt } else { 0 },
        debt1: if zero_for_one { 0 } else { debt },
        insurance0: 0,
        insurance1: 0,
        margin,
        liquidity_locked: 0,
        tick: 0,
        tick_cumulative_delta: 0,
        block_timestamp: 0,
        rewards: 0,
        liquidated: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: reserves after a swap rebuild the same curve
    #[test]
    fn prop_swap_preserves_curve(
        liquidity in 1_000_000_000_000u128..1_000_000_000_000_000_000_000_000u128,
        sqrt_price_x96 in sqrt_price_strategy(),
        zero_for_one in any::<bool>(),
        exact_input in any::<bool>(),
        fraction in 1u128..1_000u128,
    ) {
        let env = Env::default();
        env.cost_estimate().budget().reset_unlimited();

        let (reserve0, reserve1) = to_amounts(&env, liquidity, sqrt_price_x96, false);
        let reserve_in = if zero_for_one { reserve0 } else { reserve1 };
        let reserve_out = if zero_for_one { reserve1 } else { reserve0 };
        let amount = if exact_input {
            (reserve_in * fraction / 10_000) as i128
        } else {
            -((reserve_out * fraction / 10_000) as i128)
        };
        prop_assume!(amount != 0);

        let next = sqrt_price_x96_next_swap(&env, liquidity, sqrt_price_x96, zero_for_one, amount);
        if zero_for_one {
            prop_assert!(next <= sqrt_price_x96);
        } else {
            prop_assert!(next >= sqrt_price_x96);
        }

        let (amount0, amount1) = swap_amounts(&env, liquidity, sqrt_price_x96, next);
        let reserve0_after = (reserve0 as i128 + amount0) as u128;
        let reserve1_after = (reserve1 as i128 + amount1) as u128;
        let (liquidity_after, _) = liquidity_sqrt_price_x96_next(&env, reserve0_after, reserve1_after);

        prop_assert!(liquidity_after.abs_diff(liquidity) <= liquidity / 1_000_000);
    }

    /// Property: exact input never charges more than specified
    #[test]
    fn prop_exact_input_bounded(
        liquidity in 1_000_000_000_000u128..1_000_000_000_000_000_000_000u128,
        sqrt_price_x96 in sqrt_price_strategy(),
        zero_for_one in any::<bool>(),
        amount_in in 1i128..1_000_000_000_000i128,
    ) {
        let env = Env::default();
        env.cost_estimate().budget().reset_unlimited();

        let next = sqrt_price_x96_next_swap(&env, liquidity, sqrt_price_x96, zero_for_one, amount_in);
        let (amount0, amount1) = swap_amounts(&env, liquidity, sqrt_price_x96, next);
        let paid = if zero_for_one { amount0 } else { amount1 };
        prop_assert!(paid <= amount_in);
    }

    /// Property: depositing then withdrawing the same shares never returns more
    #[test]
    fn prop_mint_burn_round_trip(
        total_liquidity in 1_000_000u128..1_000_000_000_000_000_000u128,
        supply_ratio in 500u128..2_000u128,
        liquidity_delta in 1u128..1_000_000_000_000_000u128,
        sqrt_price_x96 in sqrt_price_strategy(),
    ) {
        let env = Env::default();
        let total_supply = total_liquidity * supply_ratio / 1_000;

        let (in0, in1) = to_amounts(&env, liquidity_delta, sqrt_price_x96, true);
        let shares = shares_for_liquidity(&env, liquidity_delta, total_liquidity, total_supply);
        let liquidity_back = liquidity_for_shares(
            &env,
            shares,
            total_liquidity + liquidity_delta,
            total_supply + shares,
        );
        let (out0, out1) = to_amounts(&env, liquidity_back, sqrt_price_x96, false);

        prop_assert!(liquidity_back <= liquidity_delta);
        prop_assert!(out0 <= in0);
        prop_assert!(out1 <= in1);
    }

    /// Property: with shares at par the round trip loses at most rounding dust
    #[test]
    fn prop_mint_burn_at_par_loses_only_dust(
        total_liquidity in 1_000_000u128..1_000_000_000_000_000_000u128,
        liquidity_delta in 1u128..1_000_000_000_000_000u128,
        sqrt_price_x96 in sqrt_price_strategy(),
    ) {
        let env = Env::default();
        let (in0, in1) = to_amounts(&env, liquidity_delta, sqrt_price_x96, true);
        let shares = shares_for_liquidity(&env, liquidity_delta, total_liquidity, total_liquidity);
        let liquidity_back = liquidity_for_shares(
            &env,
            shares,
            total_liquidity + liquidity_delta,
            total_liquidity + shares,
        );
        let (out0, out1) = to_amounts(&env, liquidity_back, sqrt_price_x96, false);

        prop_assert_eq!(liquidity_back, liquidity_delta);
        prop_assert!(in0 - out0 <= 1);
        prop_assert!(in1 - out1 <= 1);
    }

    /// Property: safe <=> health >= 1e18 <=> margin >= margin minimum
    #[test]
    fn prop_health_boundary_is_exact(
        zero_for_one in any::<bool>(),
        size in 1_000u128..1_000_000_000_000_000u128,
        debt in 1_000u128..1_000_000_000_000_000u128,
        margin in 0u128..1_000_000_000_000_000u128,
        oracle_sqrt_price_x96 in (Q96 / 100)..(Q96 * 100),
        maintenance in prop::sample::select(vec![250_000u32, 500_000, 1_000_000]),
    ) {
        let env = Env::default();
        env.cost_estimate().budget().reset_unlimited();
        let position = position(&env, zero_for_one, size, debt, margin);

        let is_safe = safe(&env, &position, maintenance, oracle_sqrt_price_x96);
        let health = health_factor(&env, &position, maintenance, oracle_sqrt_price_x96);
        let minimum = margin_minimum(&env, &position, maintenance, oracle_sqrt_price_x96);

        prop_assert_eq!(is_safe, health >= HEALTH_UNIT);
        prop_assert_eq!(is_safe, margin >= minimum);
    }

    /// Property: funding over any window stays within the rate clamp
    #[test]
    fn prop_funding_ratio_bounded(
        delta_latest in -(1i64 << 50)..(1i64 << 50),
        delta_last in -(1i64 << 50)..(1i64 << 50),
        elapsed in 1u64..(4 * FUNDING_PERIOD as u64),
    ) {
        let env = Env::default();
        env.cost_estimate().budget().reset_unlimited();

        let (ticks, _) = funding_tick(delta_latest, delta_last, elapsed);
        let max = (TICK_CUMULATIVE_RATE_MAX * elapsed as i64 / FUNDING_PERIOD) as i32;
        prop_assert!(ticks.abs() <= max);

        let ratio = funding_ratio_x96(&env, ticks);
        prop_assert!(ratio >= funding_ratio_x96(&env, -max));
        prop_assert!(ratio <= funding_ratio_x96(&env, max));
    }
}
