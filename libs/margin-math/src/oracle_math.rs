use crate::full_math::mul_div_rounding_up;
use crate::tick_math::get_sqrt_ratio_at_tick;
use margin_types::{FUNDING_PERIOD, MAX_TICK, MIN_TICK, Q96, TICK_CUMULATIVE_RATE_MAX};
use soroban_sdk::Env;

/// Arithmetic mean tick between two cumulatives, rounded toward negative infinity
pub fn average_tick(tick_cumulative_start: i64, tick_cumulative_end: i64, seconds: u32) -> i32 {
    if seconds == 0 {
        panic!("Zero oracle window");
    }
    let delta = tick_cumulative_end - tick_cumulative_start;
    let seconds = seconds as i64;
    let mut tick = delta / seconds;
    if delta < 0 && delta % seconds != 0 {
        tick -= 1;
    }
    tick.clamp(MIN_TICK as i64, MAX_TICK as i64) as i32
}

/// Oracle-minus-pool tick cumulative used as the funding reference
pub fn tick_cumulative_delta(oracle_tick_cumulative: i64, pool_tick_cumulative: i64) -> i64 {
    oracle_tick_cumulative - pool_tick_cumulative
}

/// Funding exponent accrued since the last sync.
///
/// Returns the whole ticks to charge and whether the divergence hit the rate
/// clamp of `TICK_CUMULATIVE_RATE_MAX` ticks per elapsed second.
pub fn funding_tick(delta_latest: i64, delta_last: i64, elapsed: u64) -> (i32, bool) {
    let elapsed = elapsed.min(i64::MAX as u64 / TICK_CUMULATIVE_RATE_MAX as u64) as i64;
    let max = TICK_CUMULATIVE_RATE_MAX * elapsed;
    let delta = delta_latest.saturating_sub(delta_last);
    let clamped = delta > max || delta < -max;
    let delta = delta.clamp(-max, max);
    let ticks = (delta / FUNDING_PERIOD).clamp(MIN_TICK as i64, MAX_TICK as i64);
    (ticks as i32, clamped)
}

/// Pool-minus-oracle tick divergence, clamped to the funding rate cap
pub fn funding_ratio_tick(pool_tick: i32, oracle_tick: i32) -> i32 {
    let max = TICK_CUMULATIVE_RATE_MAX as i32;
    pool_tick.saturating_sub(oracle_tick).clamp(-max, max)
}

/// 1.0001^tick in Q96, rounded up
pub fn funding_ratio_x96(env: &Env, tick: i32) -> u128 {
    let sqrt_ratio = get_sqrt_ratio_at_tick(env, tick);
    mul_div_rounding_up(env, sqrt_ratio, sqrt_ratio, Q96)
}

/// debt * 1.0001^tick, rounded up against the borrower
pub fn apply_funding(env: &Env, debt: u128, tick: i32) -> u128 {
    if tick == 0 || debt == 0 {
        return debt;
    }
    let sqrt_ratio = get_sqrt_ratio_at_tick(env, tick);
    let step = mul_div_rounding_up(env, debt, sqrt_ratio, Q96);
    mul_div_rounding_up(env, step, sqrt_ratio, Q96)
}
