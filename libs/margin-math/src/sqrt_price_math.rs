use crate::full_math::{
    checked_add_u256, checked_mul_u256, div_rounding_up, div_rounding_up_u256, mul_div,
    mul_div_rem, mul_div_rounding_up, u128_from_u256,
};
use margin_types::Q96;
use soroban_sdk::{Env, U256};

/// Token0 needed to move between two prices at constant liquidity
/// delta_x = L * (sqrt_pb - sqrt_pa) / (sqrt_pa * sqrt_pb)
pub fn get_amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    u128_from_u256(&amount0_delta(env, sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity, round_up))
}

/// `get_amount0_delta`, or None when the amount does not fit in u128
pub fn try_get_amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Option<u128> {
    amount0_delta(env, sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity, round_up).to_u128()
}

fn amount0_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> U256 {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower == 0 {
        panic!("sqrt_ratio_lower cannot be zero");
    }

    // (L << 96) * (upper - lower) needs up to 352 bits. Split L * (upper - lower)
    // by upper first: quotient << 96 plus (remainder << 96) / upper stays
    // below L << 96, and the nested division equals the single one.
    let spread = U256::from_u128(env, liquidity).mul(&U256::from_u128(env, upper - lower));
    let upper = U256::from_u128(env, upper);
    let lower = U256::from_u128(env, lower);
    let quotient = spread.div(&upper).shl(96);
    let remainder = spread.rem_euclid(&upper).shl(96);

    if round_up {
        let step = quotient.add(&div_rounding_up_u256(env, &remainder, &upper));
        div_rounding_up_u256(env, &step, &lower)
    } else {
        quotient.add(&remainder.div(&upper)).div(&lower)
    }
}

/// Token1 needed to move between two prices at constant liquidity
/// delta_y = L * (sqrt_pb - sqrt_pa)
pub fn get_amount1_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if round_up {
        mul_div_rounding_up(env, liquidity, upper - lower, Q96)
    } else {
        mul_div(env, liquidity, upper - lower, Q96)
    }
}

/// `get_amount1_delta`, or None when the amount does not fit in u128
pub fn try_get_amount1_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> Option<u128> {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let (quotient, remainder) = mul_div_rem(env, liquidity, upper - lower, Q96);
    let quotient = quotient.to_u128()?;
    if round_up && remainder > U256::from_u32(env, 0) {
        quotient.checked_add(1)
    } else {
        Some(quotient)
    }
}

fn sorted(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Next sqrt price after `amount_in` of the input token enters the curve
pub fn get_next_sqrt_price_from_input(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_in: u128,
    zero_for_one: bool,
) -> u128 {
    if sqrt_price_x96 == 0 || liquidity == 0 {
        panic!("Invalid inputs");
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(env, sqrt_price_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(env, sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price after `amount_out` of the output token leaves the curve
pub fn get_next_sqrt_price_from_output(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_out: u128,
    zero_for_one: bool,
) -> u128 {
    if sqrt_price_x96 == 0 || liquidity == 0 {
        panic!("Invalid inputs");
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(env, sqrt_price_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(env, sqrt_price_x96, liquidity, amount_out, false)
    }
}

/// sqrt_price_next = L * sqrt_price / (L +- amount * sqrt_price), rounded up
fn get_next_sqrt_price_from_amount0_rounding_up(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> u128 {
    if amount == 0 {
        return sqrt_price_x96;
    }

    let numerator = U256::from_u128(env, liquidity).shl(96);
    let sqrt_price = U256::from_u128(env, sqrt_price_x96);
    let amount = U256::from_u128(env, amount);
    let product = checked_mul_u256(env, &amount, &sqrt_price);

    if !add {
        let fits = match &product {
            Some(product) => numerator > *product,
            None => false,
        };
        if !fits {
            panic!("Denominator underflow");
        }
    }

    // Exact when (L << 96) * sqrt_price fits in 256 bits
    if let (Some(product), Some(scaled)) = (&product, checked_mul_u256(env, &numerator, &sqrt_price)) {
        let denominator = if add {
            checked_add_u256(env, &numerator, product)
        } else {
            Some(numerator.sub(product))
        };
        if let Some(denominator) = denominator {
            return u128_from_u256(&div_rounding_up_u256(env, &scaled, &denominator));
        }
    }

    // (L << 96) / ((L << 96) / sqrt_price +- amount); flooring the inner
    // quotient can only raise the result
    let base = numerator.div(&sqrt_price);
    let denominator = if add {
        base.add(&amount)
    } else {
        if base <= amount {
            panic!("Denominator underflow");
        }
        base.sub(&amount)
    };
    u128_from_u256(&div_rounding_up_u256(env, &numerator, &denominator))
}

/// sqrt_price_next = sqrt_price +- amount / L, rounded down
fn get_next_sqrt_price_from_amount1_rounding_down(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount: u128,
    add: bool,
) -> u128 {
    if add {
        let quotient = if amount <= u128::MAX >> 96 {
            (amount << 96) / liquidity
        } else {
            mul_div(env, amount, Q96, liquidity)
        };
        match sqrt_price_x96.checked_add(quotient) {
            Some(next) => next,
            None => panic!("sqrt_price overflow"),
        }
    } else {
        let quotient = if amount <= u128::MAX >> 96 {
            div_rounding_up(amount << 96, liquidity)
        } else {
            mul_div_rounding_up(env, amount, Q96, liquidity)
        };
        if sqrt_price_x96 <= quotient {
            panic!("sqrt_price underflow");
        }
        sqrt_price_x96 - quotient
    }
}
