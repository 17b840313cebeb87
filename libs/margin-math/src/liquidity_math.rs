use crate::full_math::{mul_div, mul_div_rounding_up, sqrt, u128_from_u256};
use margin_types::Q96;
use soroban_sdk::{Env, U256};

/// Curve reserves backing `liquidity` at `sqrt_price_x96`.
/// amount0 = L / sqrt(P), amount1 = L * sqrt(P)
pub fn to_amounts(env: &Env, liquidity: u128, sqrt_price_x96: u128, round_up: bool) -> (u128, u128) {
    if round_up {
        (
            mul_div_rounding_up(env, liquidity, Q96, sqrt_price_x96),
            mul_div_rounding_up(env, liquidity, sqrt_price_x96, Q96),
        )
    } else {
        (
            mul_div(env, liquidity, Q96, sqrt_price_x96),
            mul_div(env, liquidity, sqrt_price_x96, Q96),
        )
    }
}

/// Rebuild (liquidity, sqrt price) from raw reserves:
/// L = sqrt(reserve0 * reserve1), sqrt(P) = L / reserve0
pub fn liquidity_sqrt_price_x96_next(env: &Env, reserve0: u128, reserve1: u128) -> (u128, u128) {
    if reserve0 == 0 || reserve1 == 0 {
        panic!("Invalid reserves");
    }
    let product = U256::from_u128(env, reserve0).mul(&U256::from_u128(env, reserve1));
    let liquidity = u128_from_u256(&sqrt(env, &product));
    let sqrt_price_x96 = mul_div(env, liquidity, Q96, reserve0);
    (liquidity, sqrt_price_x96)
}

/// Shares minted for adding `liquidity_delta` on top of `total_liquidity`
pub fn shares_for_liquidity(
    env: &Env,
    liquidity_delta: u128,
    total_liquidity: u128,
    total_supply: u128,
) -> u128 {
    if total_supply == 0 {
        return liquidity_delta;
    }
    mul_div(env, liquidity_delta, total_supply, total_liquidity)
}

/// Liquidity redeemed by burning `shares`, rounded down
pub fn liquidity_for_shares(env: &Env, shares: u128, total_liquidity: u128, total_supply: u128) -> u128 {
    if total_supply == 0 {
        panic!("No shares outstanding");
    }
    mul_div(env, shares, total_liquidity, total_supply)
}
