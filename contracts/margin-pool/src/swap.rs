use crate::callback::{self, Payment};
use crate::error::PoolError;
use crate::events;
use crate::invariants;
use crate::oracle::accumulate;
use crate::storage::{get_config, get_initialized_state, set_state};
use margin_math::{
    get_tick_at_sqrt_ratio, liquidity_sqrt_price_x96_next, sqrt_price_x96_next_exact_input,
    sqrt_price_x96_next_swap, swap_amounts, swap_fees, to_amounts, to_i128,
};
use margin_types::{PoolState, FEE, MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use soroban_sdk::{panic_with_error, Address, Bytes, Env};

/// Execute a swap against the whole curve
///
/// # Arguments
/// * `zero_for_one` - True if swapping token0 for token1
/// * `amount_specified` - Positive for exact input, negative for exact output
/// * `sqrt_price_limit_x96` - The swap stops at this price; the unfilled
///   remainder stays with the caller
///
/// # Returns
/// (amount0, amount1) - Positive amounts were paid in, negative paid out
pub fn execute_swap(
    env: &Env,
    sender: Address,
    recipient: Address,
    zero_for_one: bool,
    amount_specified: i128,
    sqrt_price_limit_x96: u128,
    callback: Address,
    data: Bytes,
) -> (i128, i128) {
    let config = get_config(env);
    let mut state = get_initialized_state(env);

    if zero_for_one {
        if sqrt_price_limit_x96 >= state.sqrt_price_x96 || sqrt_price_limit_x96 <= MIN_SQRT_RATIO {
            panic_with_error!(env, PoolError::InvalidSqrtPriceLimit);
        }
    } else if sqrt_price_limit_x96 <= state.sqrt_price_x96
        || sqrt_price_limit_x96 >= MAX_SQRT_RATIO
    {
        panic_with_error!(env, PoolError::InvalidSqrtPriceLimit);
    }
    if state.liquidity == 0 {
        panic_with_error!(env, PoolError::InsufficientLiquidity);
    }

    accumulate(&mut state, env.ledger().timestamp());

    let exact_input = amount_specified > 0;
    let liquidity = state.liquidity;
    let sqrt_price_x96 = state.sqrt_price_x96;

    let (target, capped) = if exact_input {
        // Fees come off the top; only the rest moves the curve
        let fees = swap_fees(amount_specified as u128, FEE, true);
        let amount_net = amount_specified as u128 - fees;
        sqrt_price_x96_next_exact_input(
            env,
            liquidity,
            sqrt_price_x96,
            zero_for_one,
            amount_net,
            sqrt_price_limit_x96,
        )
    } else {
        let (reserve0, reserve1) = to_amounts(env, liquidity, sqrt_price_x96, false);
        let reserve_out = if zero_for_one { reserve1 } else { reserve0 };
        if amount_specified.unsigned_abs() >= reserve_out {
            panic_with_error!(env, PoolError::InsufficientLiquidity);
        }
        let target =
            sqrt_price_x96_next_swap(env, liquidity, sqrt_price_x96, zero_for_one, amount_specified);
        (target, false)
    };

    let truncated = capped
        || if zero_for_one {
            target < sqrt_price_limit_x96
        } else {
            target > sqrt_price_limit_x96
        };
    let sqrt_price_x96_next = if truncated {
        sqrt_price_limit_x96
    } else {
        target
    };

    let (amount0_curve, amount1_curve) =
        swap_amounts(env, liquidity, sqrt_price_x96, sqrt_price_x96_next);
    let amount_in_curve = (if zero_for_one {
        amount0_curve
    } else {
        amount1_curve
    }) as u128;
    let fees = if exact_input && !truncated {
        (amount_specified as u128).saturating_sub(amount_in_curve)
    } else {
        swap_fees(amount_in_curve, FEE, false)
    };
    let (amount0, amount1) = if zero_for_one {
        (amount0_curve + to_i128(fees), amount1_curve)
    } else {
        (amount0_curve, amount1_curve + to_i128(fees))
    };
    debug_assert!(invariants::swap_direction_consistent(zero_for_one, amount0, amount1));
    debug_assert!(invariants::swap_respects_limit(
        zero_for_one,
        sqrt_price_x96_next,
        sqrt_price_limit_x96
    ));

    state.sqrt_price_x96 = sqrt_price_x96_next;
    state.tick = get_tick_at_sqrt_ratio(env, sqrt_price_x96_next);

    let (reserve0, reserve1) = to_amounts(env, liquidity, sqrt_price_x96_next, false);
    if zero_for_one {
        fold_reserves(env, &mut state, reserve0 + fees, reserve1);
    } else {
        fold_reserves(env, &mut state, reserve0, reserve1 + fees);
    }

    // Optimistic payout, then collect the input
    if zero_for_one {
        callback::pay(env, &config.token1, &recipient, -amount1);
    } else {
        callback::pay(env, &config.token0, &recipient, -amount0);
    }
    callback::collect(
        env,
        &config,
        &callback,
        Payment::Swap,
        &sender,
        amount0,
        amount1,
        &data,
    );

    debug_assert!(invariants::price_in_bounds(&state));
    debug_assert!(invariants::tick_in_bounds(&state));
    set_state(env, &state);

    events::emit_swap(
        env,
        &sender,
        &recipient,
        amount0,
        amount1,
        state.sqrt_price_x96,
        state.liquidity,
        state.tick,
    );

    (amount0, amount1)
}

/// Rebuild the curve from reserves that include retained fees.
/// The curve only ever deepens; rounding that would shrink it is ignored.
pub fn fold_reserves(env: &Env, state: &mut PoolState, reserve0: u128, reserve1: u128) {
    if reserve0 == 0 || reserve1 == 0 {
        return;
    }
    let (liquidity, sqrt_price_x96) = liquidity_sqrt_price_x96_next(env, reserve0, reserve1);
    if liquidity > state.liquidity {
        state.liquidity = liquidity;
        state.sqrt_price_x96 = sqrt_price_x96;
        state.tick = get_tick_at_sqrt_ratio(env, sqrt_price_x96);
    }
}
