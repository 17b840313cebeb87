use crate::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output, try_get_amount0_delta, try_get_amount1_delta,
};
use margin_types::FEE_UNIT;
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::Env;

/// Sqrt price after swapping `amount_specified` against the whole curve.
///
/// Positive amounts are exact input, negative exact output. Rounding always
/// favors the pool.
pub fn sqrt_price_x96_next_swap(
    env: &Env,
    liquidity: u128,
    sqrt_price_x96: u128,
    zero_for_one: bool,
    amount_specified: i128,
) -> u128 {
    if amount_specified == 0 {
        return sqrt_price_x96;
    }
    if amount_specified > 0 {
        get_next_sqrt_price_from_input(
            env,
            sqrt_price_x96,
            liquidity,
            amount_specified as u128,
            zero_for_one,
        )
    } else {
        get_next_sqrt_price_from_output(
            env,
            sqrt_price_x96,
            liquidity,
            amount_specified.unsigned_abs(),
            zero_for_one,
        )
    }
}

/// Exact-input sqrt price, stopping at `sqrt_price_limit_x96`.
///
/// When `amount_in` covers the move to the limit the limit is returned
/// without solving the curve for the full input. The flag reports whether
/// the swap was stopped there.
pub fn sqrt_price_x96_next_exact_input(
    env: &Env,
    liquidity: u128,
    sqrt_price_x96: u128,
    zero_for_one: bool,
    amount_in: u128,
    sqrt_price_limit_x96: u128,
) -> (u128, bool) {
    let amount_to_limit = if zero_for_one {
        try_get_amount0_delta(env, sqrt_price_limit_x96, sqrt_price_x96, liquidity, true)
    } else {
        try_get_amount1_delta(env, sqrt_price_x96, sqrt_price_limit_x96, liquidity, true)
    };
    match amount_to_limit {
        Some(amount) if amount_in >= amount => (sqrt_price_limit_x96, true),
        // Past u128 the limit is out of reach of any input
        _ => (
            get_next_sqrt_price_from_input(env, sqrt_price_x96, liquidity, amount_in, zero_for_one),
            false,
        ),
    }
}

/// Signed token deltas for moving the curve from `sqrt_price_x96` to
/// `sqrt_price_x96_next`. Positive flows into the pool (rounded up),
/// negative flows out (rounded down).
pub fn swap_amounts(
    env: &Env,
    liquidity: u128,
    sqrt_price_x96: u128,
    sqrt_price_x96_next: u128,
) -> (i128, i128) {
    if sqrt_price_x96_next < sqrt_price_x96 {
        let amount0 = get_amount0_delta(env, sqrt_price_x96_next, sqrt_price_x96, liquidity, true);
        let amount1 = get_amount1_delta(env, sqrt_price_x96_next, sqrt_price_x96, liquidity, false);
        (to_i128(amount0), -to_i128(amount1))
    } else if sqrt_price_x96_next > sqrt_price_x96 {
        let amount0 = get_amount0_delta(env, sqrt_price_x96, sqrt_price_x96_next, liquidity, false);
        let amount1 = get_amount1_delta(env, sqrt_price_x96, sqrt_price_x96_next, liquidity, true);
        (-to_i128(amount0), to_i128(amount1))
    } else {
        (0, 0)
    }
}

/// Fee on a swap input.
///
/// With `fee_included` the fee is already part of `amount`, so
/// `amount * fee / (1e6 + fee)`. Otherwise it is charged on top:
/// `amount * fee / 1e6`.
pub fn swap_fees(amount: u128, fee: i128, fee_included: bool) -> u128 {
    let denominator = if fee_included { FEE_UNIT + fee } else { FEE_UNIT };
    let fees = to_i128(amount)
        .fixed_mul_floor(fee, denominator)
        .unwrap_or_else(|| panic!("Fee overflow"));
    fees as u128
}

pub fn to_i128(amount: u128) -> i128 {
    if amount > i128::MAX as u128 {
        panic!("Amount exceeds i128");
    }
    amount as i128
}
