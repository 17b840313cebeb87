// ============================================================================
// INVARIANTS MODULE
// ============================================================================
//
// Predicates over pool state that must hold after every committed operation.
// Operations check them with debug_assert! so they run in tests and in the
// release-with-logs profile.
//
// INVARIANT CATEGORIES:
//
// 1. PRICE INVARIANTS
//    - Price is always within valid bounds
//    - Tick is consistent with sqrt price
//
// 2. LIQUIDITY INVARIANTS
//    - Locked liquidity is exactly what live positions hold
//    - The free curve keeps its minimum once seeded
//
// 3. SWAP INVARIANTS
//    - Amounts flow in the direction of the swap
//    - The curve price never passes the caller's limit
//
// ============================================================================

use margin_types::{PoolState, MAX_SQRT_RATIO, MAX_TICK, MINIMUM_LIQUIDITY, MIN_SQRT_RATIO, MIN_TICK};

// ============================================================================
// PRICE INVARIANTS
// ============================================================================

/// Invariant: sqrt_price is always within valid bounds
///
/// Property:
///   MIN_SQRT_RATIO <= sqrt_price_x96 < MAX_SQRT_RATIO
pub fn price_in_bounds(state: &PoolState) -> bool {
    state.sqrt_price_x96 >= MIN_SQRT_RATIO && state.sqrt_price_x96 < MAX_SQRT_RATIO
}

/// Invariant: tick is within valid bounds
pub fn tick_in_bounds(state: &PoolState) -> bool {
    state.tick >= MIN_TICK && state.tick <= MAX_TICK
}

/// Invariant: tick is the greatest tick at or below the sqrt price
///
/// Property:
///   ratio(tick) <= sqrt_price_x96 < ratio(tick + 1)
pub fn tick_consistent_with_price(
    sqrt_price_x96: u128,
    sqrt_ratio_at_tick: u128,
    sqrt_ratio_at_next_tick: u128,
) -> bool {
    sqrt_ratio_at_tick <= sqrt_price_x96 && sqrt_price_x96 < sqrt_ratio_at_next_tick
}

// ============================================================================
// LIQUIDITY INVARIANTS
// ============================================================================

/// Invariant: pool-wide locked liquidity is what the stored positions hold.
/// Settled positions are removed and tombstones hold nothing.
///
/// Property:
///   liquidity_locked == sum(position.liquidity_locked)
pub fn liquidity_locked_matches_positions(state: &PoolState, positions_locked: u128) -> bool {
    state.liquidity_locked == positions_locked
}

/// Invariant: once seeded, the free curve never drops below the minimum
///
/// Property:
///   liquidity == 0 || liquidity >= MINIMUM_LIQUIDITY
pub fn curve_keeps_minimum(state: &PoolState) -> bool {
    state.liquidity == 0 || state.liquidity >= MINIMUM_LIQUIDITY
}

// ============================================================================
// SWAP INVARIANTS
// ============================================================================

/// Invariant: the input token flows in and the output token flows out
///
/// Property:
///   zero_for_one  => amount0 >= 0 && amount1 <= 0
///   !zero_for_one => amount0 <= 0 && amount1 >= 0
pub fn swap_direction_consistent(zero_for_one: bool, amount0: i128, amount1: i128) -> bool {
    if zero_for_one {
        amount0 >= 0 && amount1 <= 0
    } else {
        amount0 <= 0 && amount1 >= 0
    }
}

/// Invariant: the curve price stops at the caller's limit.
/// Fees folded in afterwards may deepen the curve past it.
pub fn swap_respects_limit(zero_for_one: bool, sqrt_price_x96: u128, sqrt_price_limit_x96: u128) -> bool {
    if zero_for_one {
        sqrt_price_x96 >= sqrt_price_limit_x96
    } else {
        sqrt_price_x96 <= sqrt_price_limit_x96
    }
}
