use crate::callback::{self, Payment};
use crate::error::PoolError;
use crate::events;
use crate::invariants;
use crate::oracle::{self, accumulate, OracleReading};
use crate::storage::{
    get_config, get_initialized_state, get_owned_position, get_position, remove_position,
    set_position, set_state,
};
use crate::swap::fold_reserves;
use margin_math::{
    assemble, fees as position_fees, get_tick_at_sqrt_ratio, health_factor as position_health,
    liquidate_reserves, liquidation_rewards, liquidation_sqrt_price_x96 as position_liquidation_price,
    liquidity_for_size, liquidity_sqrt_price_x96_next, margin_minimum, safe, settle_reserves,
    sqrt_price_x96_next_open, sync, tick_cumulative_delta, to_amounts, to_i128,
};
use margin_types::{
    OpenParams, OpenResult, PoolConfig, PoolState, Position, SettleResult, FEE, MAX_SQRT_RATIO,
    MINIMUM_LIQUIDITY, MIN_SQRT_RATIO,
};
use soroban_sdk::{panic_with_error, token, Address, Bytes, Env};

/// Token a position's size and margin are held in
fn size_token(config: &PoolConfig, zero_for_one: bool) -> &Address {
    if zero_for_one {
        &config.token1
    } else {
        &config.token0
    }
}

/// Signed (amount0, amount1) with `amount` on the size side
fn on_size_side(zero_for_one: bool, amount: i128) -> (i128, i128) {
    if zero_for_one {
        (0, amount)
    } else {
        (amount, 0)
    }
}

/// Charge funding accrued since the position's last sync.
/// `state` must already be accumulated to the current ledger time.
fn sync_funding(env: &Env, state: &PoolState, position: &mut Position, reading: &OracleReading) {
    let delta = tick_cumulative_delta(reading.tick_cumulative, state.tick_cumulative);
    sync(env, position, delta, state.block_timestamp);
}

/// Locked liquidity summed over every stored position
fn positions_locked(env: &Env, state: &PoolState) -> u128 {
    (0..state.total_positions)
        .filter_map(|id| get_position(env, id))
        .map(|position| position.liquidity_locked)
        .sum()
}

/// Replace the curve with the one rebuilt from `reserves` and release the
/// position's locked liquidity
fn release(env: &Env, state: &mut PoolState, position: &Position, reserves: (u128, u128)) {
    let (liquidity, sqrt_price_x96) = liquidity_sqrt_price_x96_next(env, reserves.0, reserves.1);
    state.liquidity = liquidity;
    state.sqrt_price_x96 = sqrt_price_x96;
    state.tick = get_tick_at_sqrt_ratio(env, sqrt_price_x96);
    state.liquidity_locked -= position.liquidity_locked;
}

/// Open a leveraged position of `params.size` for `sender`.
///
/// Locks the liquidity backing the size, charges margin plus fees in the size
/// token through the open callback, and escrows the liquidation rewards in the
/// native token.
pub fn open(
    env: &Env,
    sender: Address,
    callback: Address,
    params: OpenParams,
    data: Bytes,
) -> OpenResult {
    let config = get_config(env);
    let mut state = get_initialized_state(env);
    let now = env.ledger().timestamp();
    accumulate(&mut state, now);

    let zero_for_one = params.zero_for_one;
    let limit = params.sqrt_price_limit_x96;
    let limit_valid = if zero_for_one {
        limit < state.sqrt_price_x96 && limit > MIN_SQRT_RATIO
    } else {
        limit > state.sqrt_price_x96 && limit < MAX_SQRT_RATIO
    };
    if !limit_valid {
        panic_with_error!(env, PoolError::InvalidSqrtPriceLimit);
    }

    let liquidity_delta =
        liquidity_for_size(env, state.sqrt_price_x96, params.size, zero_for_one);
    if liquidity_delta == 0 || liquidity_delta + MINIMUM_LIQUIDITY >= state.liquidity {
        panic_with_error!(env, PoolError::InvalidLiquidityDelta);
    }

    let sqrt_price_x96_next = sqrt_price_x96_next_open(
        env,
        state.liquidity,
        state.sqrt_price_x96,
        liquidity_delta,
        zero_for_one,
    );
    let crosses_limit = if zero_for_one {
        sqrt_price_x96_next < limit
    } else {
        sqrt_price_x96_next > limit
    };
    if crosses_limit {
        panic_with_error!(env, PoolError::InvalidSqrtPriceLimit);
    }
    let amounts = assemble(
        env,
        state.liquidity,
        state.sqrt_price_x96,
        sqrt_price_x96_next,
        liquidity_delta,
        zero_for_one,
    );

    if amounts.size < params.size_min {
        panic_with_error!(env, PoolError::SizeLessThanMin);
    }
    let debt = if zero_for_one {
        amounts.debt0
    } else {
        amounts.debt1
    };
    if debt > params.debt_max {
        panic_with_error!(env, PoolError::DebtGreaterThanMax);
    }
    let fees = position_fees(amounts.size, FEE);
    let amount_in = params.margin + fees;
    if amount_in > params.amount_in_max {
        panic_with_error!(env, PoolError::AmountInGreaterThanMax);
    }

    let reading = oracle::read(env, &config.oracle);
    let tick_next = get_tick_at_sqrt_ratio(env, sqrt_price_x96_next);
    let position = Position {
        owner: sender.clone(),
        zero_for_one,
        size: amounts.size,
        debt0: amounts.debt0,
        debt1: amounts.debt1,
        insurance0: amounts.insurance0,
        insurance1: amounts.insurance1,
        margin: params.margin,
        liquidity_locked: liquidity_delta,
        tick: tick_next,
        tick_cumulative_delta: tick_cumulative_delta(reading.tick_cumulative, state.tick_cumulative),
        block_timestamp: now,
        rewards: params.rewards,
        liquidated: false,
    };

    if params.margin < margin_minimum(env, &position, config.maintenance, reading.sqrt_price_x96) {
        panic_with_error!(env, PoolError::MarginLessThanMin);
    }
    if params.rewards < liquidation_rewards(config.reward_base_fee) {
        panic_with_error!(env, PoolError::RewardsLessThanMin);
    }

    state.liquidity -= liquidity_delta;
    state.liquidity_locked += liquidity_delta;
    state.sqrt_price_x96 = sqrt_price_x96_next;
    state.tick = tick_next;

    // Position fee deepens what is left of the curve
    let (reserve0, reserve1) = to_amounts(env, state.liquidity, state.sqrt_price_x96, false);
    if zero_for_one {
        fold_reserves(env, &mut state, reserve0, reserve1 + fees);
    } else {
        fold_reserves(env, &mut state, reserve0 + fees, reserve1);
    }

    let id = state.total_positions;
    state.total_positions += 1;
    debug_assert!(id < state.total_positions);

    let (amount0, amount1) = on_size_side(zero_for_one, to_i128(amount_in));
    callback::collect(
        env,
        &config,
        &callback,
        Payment::Open,
        &sender,
        amount0,
        amount1,
        &data,
    );
    token::Client::new(env, &config.native).transfer(
        &sender,
        &env.current_contract_address(),
        &to_i128(params.rewards),
    );

    debug_assert!(invariants::curve_keeps_minimum(&state));
    set_state(env, &state);
    set_position(env, id, &position);
    debug_assert!(invariants::liquidity_locked_matches_positions(
        &state,
        positions_locked(env, &state)
    ));

    events::emit_open(
        env,
        &sender,
        id,
        zero_for_one,
        liquidity_delta,
        position.size,
        debt,
        position.margin,
        fees,
        position.rewards,
    );

    OpenResult {
        id,
        size: position.size,
        debt,
        margin: position.margin,
        fees,
        rewards: position.rewards,
        amount0,
        amount1,
    }
}

/// Top up margin on an open position through the lock callback
pub fn lock(
    env: &Env,
    sender: Address,
    id: u32,
    margin_in: u128,
    callback: Address,
    data: Bytes,
) -> u128 {
    let config = get_config(env);
    let mut state = get_initialized_state(env);
    accumulate(&mut state, env.ledger().timestamp());
    let mut position = get_owned_position(env, &sender, id);

    if margin_in == 0 {
        panic_with_error!(env, PoolError::InvalidMarginIn);
    }

    let reading = oracle::read(env, &config.oracle);
    sync_funding(env, &state, &mut position, &reading);

    let (amount0, amount1) = on_size_side(position.zero_for_one, to_i128(margin_in));
    callback::collect(
        env,
        &config,
        &callback,
        Payment::Lock,
        &sender,
        amount0,
        amount1,
        &data,
    );

    position.margin += margin_in;
    set_state(env, &state);
    set_position(env, id, &position);
    events::emit_lock(env, &sender, id, margin_in, position.margin);
    position.margin
}

/// Withdraw margin; what stays must still cover the margin minimum
pub fn free(
    env: &Env,
    sender: Address,
    recipient: Address,
    id: u32,
    margin_out: u128,
) -> u128 {
    let config = get_config(env);
    let mut state = get_initialized_state(env);
    accumulate(&mut state, env.ledger().timestamp());
    let mut position = get_owned_position(env, &sender, id);

    let reading = oracle::read(env, &config.oracle);
    sync_funding(env, &state, &mut position, &reading);

    if margin_out == 0 || margin_out > position.margin {
        panic_with_error!(env, PoolError::InvalidMarginOut);
    }
    position.margin -= margin_out;
    if position.margin < margin_minimum(env, &position, config.maintenance, reading.sqrt_price_x96) {
        panic_with_error!(env, PoolError::MarginLessThanMin);
    }

    set_state(env, &state);
    set_position(env, id, &position);
    callback::pay(
        env,
        size_token(&config, position.zero_for_one),
        &recipient,
        to_i128(margin_out),
    );

    events::emit_free(env, &sender, id, &recipient, margin_out, position.margin);
    position.margin
}

/// Close a solvent position: pay out size plus margin, collect the debt
/// through the settle callback, and refund the rewards escrow
pub fn settle(
    env: &Env,
    sender: Address,
    recipient: Address,
    id: u32,
    callback: Address,
    data: Bytes,
) -> SettleResult {
    let config = get_config(env);
    let mut state = get_initialized_state(env);
    accumulate(&mut state, env.ledger().timestamp());
    let mut position = get_owned_position(env, &sender, id);

    let reading = oracle::read(env, &config.oracle);
    sync_funding(env, &state, &mut position, &reading);
    if !safe(env, &position, config.maintenance, reading.sqrt_price_x96) {
        panic_with_error!(env, PoolError::PositionNotSafe);
    }

    // Owed to the pool: the debt. Paid out: size plus margin.
    let payout = to_i128(position.size + position.margin);
    let (amount0, amount1) = if position.zero_for_one {
        (to_i128(position.debt0), -payout)
    } else {
        (-payout, to_i128(position.debt1))
    };

    callback::pay(
        env,
        size_token(&config, position.zero_for_one),
        &recipient,
        payout,
    );
    callback::collect(
        env,
        &config,
        &callback,
        Payment::Settle,
        &sender,
        amount0,
        amount1,
        &data,
    );

    let reserves = settle_reserves(env, state.liquidity, state.sqrt_price_x96, &position);
    release(env, &mut state, &position, reserves);
    set_state(env, &state);
    remove_position(env, id);
    debug_assert!(invariants::liquidity_locked_matches_positions(
        &state,
        positions_locked(env, &state)
    ));

    callback::pay(env, &config.native, &recipient, to_i128(position.rewards));

    events::emit_settle(
        env,
        &sender,
        id,
        &recipient,
        amount0,
        amount1,
        position.rewards,
    );

    SettleResult {
        amount0,
        amount1,
        rewards: position.rewards,
    }
}

/// Seize an unsafe position. Size and margin go back to the curve and the
/// escrowed rewards go to `recipient`. The record stays behind as a tombstone.
pub fn liquidate(
    env: &Env,
    sender: Address,
    recipient: Address,
    owner: Address,
    id: u32,
) -> u128 {
    let config = get_config(env);
    let mut state = get_initialized_state(env);
    accumulate(&mut state, env.ledger().timestamp());
    let mut position = get_owned_position(env, &owner, id);

    let reading = oracle::read(env, &config.oracle);
    sync_funding(env, &state, &mut position, &reading);
    if safe(env, &position, config.maintenance, reading.sqrt_price_x96) {
        panic_with_error!(env, PoolError::PositionSafe);
    }

    let reserves = liquidate_reserves(env, state.liquidity, state.sqrt_price_x96, &position);
    release(env, &mut state, &position, reserves);
    set_state(env, &state);

    let rewards = position.rewards;
    callback::pay(env, &config.native, &recipient, to_i128(rewards));

    position.size = 0;
    position.debt0 = 0;
    position.debt1 = 0;
    position.insurance0 = 0;
    position.insurance1 = 0;
    position.margin = 0;
    position.liquidity_locked = 0;
    position.rewards = 0;
    position.liquidated = true;
    set_position(env, id, &position);
    debug_assert!(invariants::liquidity_locked_matches_positions(
        &state,
        positions_locked(env, &state)
    ));

    events::emit_liquidate(env, &owner, id, &sender, &recipient, rewards);
    rewards
}

/// Stored record for `(owner, id)`, tombstones included
pub fn view(env: &Env, owner: &Address, id: u32) -> Position {
    let position =
        get_position(env, id).unwrap_or_else(|| panic_with_error!(env, PoolError::PositionNotFound));
    if position.owner != *owner {
        panic_with_error!(env, PoolError::Unauthorized);
    }
    position
}

/// Position with funding charged up to now, without writing it back
fn view_synced(env: &Env, config: &PoolConfig, owner: &Address, id: u32) -> (Position, OracleReading) {
    let mut state = get_initialized_state(env);
    accumulate(&mut state, env.ledger().timestamp());
    let mut position = get_owned_position(env, owner, id);
    let reading = oracle::read(env, &config.oracle);
    sync_funding(env, &state, &mut position, &reading);
    (position, reading)
}

pub fn health_factor(env: &Env, owner: &Address, id: u32) -> u128 {
    let config = get_config(env);
    let (position, reading) = view_synced(env, &config, owner, id);
    position_health(env, &position, config.maintenance, reading.sqrt_price_x96)
}

pub fn liquidation_sqrt_price_x96(env: &Env, owner: &Address, id: u32) -> u128 {
    let config = get_config(env);
    let (position, _) = view_synced(env, &config, owner, id);
    position_liquidation_price(env, &position, config.maintenance)
}
