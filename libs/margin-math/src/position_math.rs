use crate::full_math::{mul_div, mul_div_rounding_up, sqrt, u128_from_u256};
use crate::liquidity_math::to_amounts;
use crate::oracle_math::{apply_funding, funding_tick};
use crate::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use crate::swap_math::to_i128;
use margin_types::{
    Position, PositionAmounts, BASE_FEE_MIN, FEE_UNIT, FUNDING_PERIOD, GAS_LIQUIDATE,
    HEALTH_UNIT, MAINTENANCE_UNIT, MAX_SQRT_RATIO, MIN_SQRT_RATIO, Q96, REWARD_PREMIUM,
};
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{Env, U256};

/// Liquidity to lock so that the position's size is `size` at the current price.
/// zero_for_one sizes are in token1 (L * sqrt(P)), otherwise token0 (L / sqrt(P)).
pub fn liquidity_for_size(env: &Env, sqrt_price_x96: u128, size: u128, zero_for_one: bool) -> u128 {
    if zero_for_one {
        mul_div(env, size, Q96, sqrt_price_x96)
    } else {
        mul_div(env, size, sqrt_price_x96, Q96)
    }
}

/// Sqrt price after removing `liquidity_delta` from the curve for a position.
///
/// The token being borrowed keeps its reserve on the curve, so the price
/// moves against the position's direction by the fraction of liquidity locked.
pub fn sqrt_price_x96_next_open(
    env: &Env,
    liquidity: u128,
    sqrt_price_x96: u128,
    liquidity_delta: u128,
    zero_for_one: bool,
) -> u128 {
    if liquidity_delta >= liquidity {
        panic!("Liquidity delta exceeds liquidity");
    }
    let liquidity_after = liquidity - liquidity_delta;
    if zero_for_one {
        mul_div_rounding_up(env, sqrt_price_x96, liquidity_after, liquidity)
    } else {
        mul_div(env, sqrt_price_x96, liquidity, liquidity_after)
    }
}

/// Size, debt and insurance for a position that moved the curve from
/// `sqrt_price_x96` to `sqrt_price_x96_next` by locking `liquidity_delta`.
pub fn assemble(
    env: &Env,
    liquidity: u128,
    sqrt_price_x96: u128,
    sqrt_price_x96_next: u128,
    liquidity_delta: u128,
    zero_for_one: bool,
) -> PositionAmounts {
    let (size, debt0, debt1) = if zero_for_one {
        (
            get_amount1_delta(env, sqrt_price_x96_next, sqrt_price_x96, liquidity, false),
            get_amount0_delta(env, sqrt_price_x96_next, sqrt_price_x96, liquidity, true),
            0,
        )
    } else {
        (
            get_amount0_delta(env, sqrt_price_x96, sqrt_price_x96_next, liquidity, false),
            0,
            get_amount1_delta(env, sqrt_price_x96, sqrt_price_x96_next, liquidity, true),
        )
    };

    // Whatever the old curve held beyond the new curve and the size
    let (reserve0, reserve1) = to_amounts(env, liquidity, sqrt_price_x96, false);
    let (reserve0_next, reserve1_next) =
        to_amounts(env, liquidity - liquidity_delta, sqrt_price_x96_next, true);
    let (insurance0, insurance1) = if zero_for_one {
        (
            reserve0.saturating_sub(reserve0_next),
            reserve1.saturating_sub(reserve1_next + size),
        )
    } else {
        (
            reserve0.saturating_sub(reserve0_next + size),
            reserve1.saturating_sub(reserve1_next),
        )
    };

    PositionAmounts {
        size,
        debt0,
        debt1,
        insurance0,
        insurance1,
    }
}

/// Position fee charged on size, rounded up
pub fn fees(size: u128, fee: i128) -> u128 {
    to_i128(size)
        .fixed_mul_ceil(fee, FEE_UNIT)
        .unwrap_or_else(|| panic!("Fee overflow")) as u128
}

/// debt * (1 + maintenance), rounded up
pub fn debt_adjusted(debt: u128, maintenance: u32) -> u128 {
    to_i128(debt)
        .fixed_mul_ceil(MAINTENANCE_UNIT + maintenance as i128, MAINTENANCE_UNIT)
        .unwrap_or_else(|| panic!("Debt overflow")) as u128
}

/// Maintenance-adjusted debt valued in the size token at the oracle price
pub fn debt_adjusted_in_margin_token(
    env: &Env,
    debt: u128,
    maintenance: u32,
    oracle_sqrt_price_x96: u128,
    zero_for_one: bool,
) -> u128 {
    let debt_adjusted = debt_adjusted(debt, maintenance);
    if zero_for_one {
        let step = mul_div_rounding_up(env, debt_adjusted, oracle_sqrt_price_x96, Q96);
        mul_div_rounding_up(env, step, oracle_sqrt_price_x96, Q96)
    } else {
        let step = mul_div_rounding_up(env, debt_adjusted, Q96, oracle_sqrt_price_x96);
        mul_div_rounding_up(env, step, Q96, oracle_sqrt_price_x96)
    }
}

/// Least margin keeping the position solvent at the oracle price
pub fn margin_minimum(
    env: &Env,
    position: &Position,
    maintenance: u32,
    oracle_sqrt_price_x96: u128,
) -> u128 {
    debt_adjusted_in_margin_token(
        env,
        position.debt(),
        maintenance,
        oracle_sqrt_price_x96,
        position.zero_for_one,
    )
    .saturating_sub(position.size)
}

/// (size + margin) / adjusted debt, scaled by 1e18. One means on the boundary.
pub fn health_factor(
    env: &Env,
    position: &Position,
    maintenance: u32,
    oracle_sqrt_price_x96: u128,
) -> u128 {
    let debt = debt_adjusted_in_margin_token(
        env,
        position.debt(),
        maintenance,
        oracle_sqrt_price_x96,
        position.zero_for_one,
    );
    if debt == 0 {
        return u128::MAX;
    }
    let collateral = U256::from_u128(env, position.size + position.margin);
    let health = collateral
        .mul(&U256::from_u128(env, HEALTH_UNIT))
        .div(&U256::from_u128(env, debt));
    health.to_u128().unwrap_or(u128::MAX)
}

/// Whether margin covers the margin minimum, equivalently health >= 1e18
pub fn safe(env: &Env, position: &Position, maintenance: u32, oracle_sqrt_price_x96: u128) -> bool {
    let debt = debt_adjusted_in_margin_token(
        env,
        position.debt(),
        maintenance,
        oracle_sqrt_price_x96,
        position.zero_for_one,
    );
    position.size + position.margin >= debt
}

/// Rewards a position escrows for whoever liquidates it
pub fn liquidation_rewards(base_fee: i128) -> u128 {
    base_fee
        .max(BASE_FEE_MIN)
        .checked_mul(GAS_LIQUIDATE)
        .and_then(|cost| cost.fixed_mul_floor(REWARD_PREMIUM, FEE_UNIT))
        .unwrap_or_else(|| panic!("Rewards overflow")) as u128
}

/// Oracle sqrt price at which the position's health is exactly one.
/// zero_for_one positions are liquidated above it, the others below it.
pub fn liquidation_sqrt_price_x96(env: &Env, position: &Position, maintenance: u32) -> u128 {
    let collateral = position.size + position.margin;
    let debt = debt_adjusted(position.debt(), maintenance);
    let (numerator, denominator) = if position.zero_for_one {
        (collateral, debt)
    } else {
        (debt, collateral)
    };
    if denominator == 0 {
        return if position.zero_for_one {
            MAX_SQRT_RATIO
        } else {
            MIN_SQRT_RATIO
        };
    }

    let numerator = U256::from_u128(env, numerator);
    let denominator = U256::from_u128(env, denominator);
    // price * 2^192 overflows U256 once the numerator passes 2^64
    let price_x192 = if numerator <= U256::from_u128(env, u64::MAX as u128) {
        numerator.shl(192).div(&denominator)
    } else {
        let price_x96 = numerator.shl(96).div(&denominator);
        if price_x96 >= U256::from_u32(env, 1).shl(160) {
            return MAX_SQRT_RATIO;
        }
        price_x96.shl(96)
    };

    match sqrt(env, &price_x192).to_u128() {
        Some(sqrt_price) => sqrt_price.clamp(MIN_SQRT_RATIO, MAX_SQRT_RATIO),
        None => MAX_SQRT_RATIO,
    }
}

/// Accrue funding on the debt since the position's last sync.
///
/// A second sync in the same ledger second is a no-op. When the divergence
/// was not clamped the sub-tick remainder carries to the next sync.
pub fn sync(env: &Env, position: &mut Position, tick_cumulative_delta_latest: i64, block_timestamp: u64) {
    let elapsed = block_timestamp.saturating_sub(position.block_timestamp);
    if elapsed == 0 {
        return;
    }

    let (ticks, clamped) = funding_tick(
        tick_cumulative_delta_latest,
        position.tick_cumulative_delta,
        elapsed,
    );
    if position.zero_for_one {
        position.debt0 = apply_funding(env, position.debt0, ticks);
    } else {
        position.debt1 = apply_funding(env, position.debt1, -ticks);
    }

    position.tick_cumulative_delta = if clamped {
        tick_cumulative_delta_latest
    } else {
        position.tick_cumulative_delta + ticks as i64 * FUNDING_PERIOD
    };
    position.block_timestamp = block_timestamp;
}

/// Reserves to fold back into the curve when a position is settled:
/// the curve, the position's insurance, and the repaid debt.
pub fn settle_reserves(
    env: &Env,
    liquidity: u128,
    sqrt_price_x96: u128,
    position: &Position,
) -> (u128, u128) {
    let (reserve0, reserve1) = to_amounts(env, liquidity, sqrt_price_x96, false);
    (
        reserve0 + position.insurance0 + position.debt0,
        reserve1 + position.insurance1 + position.debt1,
    )
}

/// Reserves to fold back into the curve when a position is liquidated:
/// the curve, the position's insurance, and its seized size and margin.
pub fn liquidate_reserves(
    env: &Env,
    liquidity: u128,
    sqrt_price_x96: u128,
    position: &Position,
) -> (u128, u128) {
    let (reserve0, reserve1) = to_amounts(env, liquidity, sqrt_price_x96, false);
    let seized = position.size + position.margin;
    if position.zero_for_one {
        (
            reserve0 + position.insurance0,
            reserve1 + position.insurance1 + seized,
        )
    } else {
        (
            reserve0 + position.insurance0 + seized,
            reserve1 + position.insurance1,
        )
    }
}
