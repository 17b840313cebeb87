use crate::callback::{self, Payment};
use crate::error::PoolError;
use crate::events;
use crate::invariants;
use crate::oracle::accumulate;
use crate::storage::{
    get_balance, get_config, get_initialized_state, get_total_supply, set_balance, set_state,
    set_total_supply,
};
use margin_math::{liquidity_for_shares, shares_for_liquidity, to_amounts, to_i128};
use margin_types::{BurnResult, MintResult, MINIMUM_LIQUIDITY};
use soroban_sdk::{panic_with_error, Address, Bytes, Env};

/// Add `liquidity_delta` to the curve, funded through the mint callback.
///
/// The first deposit locks `MINIMUM_LIQUIDITY` shares on the pool's own
/// address so the share price can never be reset.
pub fn mint(
    env: &Env,
    sender: Address,
    recipient: Address,
    liquidity_delta: u128,
    callback: Address,
    data: Bytes,
) -> MintResult {
    let config = get_config(env);
    let mut state = get_initialized_state(env);
    accumulate(&mut state, env.ledger().timestamp());

    let total_supply = get_total_supply(env);
    if liquidity_delta == 0 || (total_supply == 0 && liquidity_delta <= MINIMUM_LIQUIDITY) {
        panic_with_error!(env, PoolError::InvalidLiquidityDelta);
    }

    let (amount0, amount1) = to_amounts(env, liquidity_delta, state.sqrt_price_x96, true);
    let amount0 = to_i128(amount0);
    let amount1 = to_i128(amount1);

    let minted = to_i128(shares_for_liquidity(
        env,
        liquidity_delta,
        state.liquidity_total(),
        total_supply as u128,
    ));
    let shares = if total_supply == 0 {
        mint_shares(env, &env.current_contract_address(), MINIMUM_LIQUIDITY as i128);
        minted - MINIMUM_LIQUIDITY as i128
    } else {
        minted
    };
    if shares <= 0 {
        panic_with_error!(env, PoolError::InvalidLiquidityDelta);
    }

    callback::collect(
        env,
        &config,
        &callback,
        Payment::Mint,
        &sender,
        amount0,
        amount1,
        &data,
    );

    state.liquidity += liquidity_delta;
    debug_assert!(invariants::curve_keeps_minimum(&state));
    set_state(env, &state);
    mint_shares(env, &recipient, shares);

    events::emit_mint(
        env,
        &sender,
        &recipient,
        liquidity_delta,
        shares,
        amount0,
        amount1,
    );

    MintResult {
        shares,
        amount0,
        amount1,
    }
}

/// Redeem `shares` for free curve liquidity, paid to `recipient`
pub fn burn(env: &Env, sender: Address, recipient: Address, shares: i128) -> BurnResult {
    let config = get_config(env);
    let mut state = get_initialized_state(env);
    accumulate(&mut state, env.ledger().timestamp());

    if shares <= 0 {
        panic_with_error!(env, PoolError::InvalidLiquidityDelta);
    }
    if get_balance(env, &sender) < shares {
        panic_with_error!(env, PoolError::InsufficientShares);
    }

    let liquidity_delta = liquidity_for_shares(
        env,
        shares as u128,
        state.liquidity_total(),
        get_total_supply(env) as u128,
    );
    // Locked liquidity backs positions and cannot leave the pool
    if liquidity_delta == 0 || liquidity_delta + MINIMUM_LIQUIDITY > state.liquidity {
        panic_with_error!(env, PoolError::InvalidLiquidityDelta);
    }

    let (amount0, amount1) = to_amounts(env, liquidity_delta, state.sqrt_price_x96, false);
    let amount0 = to_i128(amount0);
    let amount1 = to_i128(amount1);

    burn_shares(env, &sender, shares);
    state.liquidity -= liquidity_delta;
    debug_assert!(invariants::curve_keeps_minimum(&state));
    set_state(env, &state);

    callback::pay(env, &config.token0, &recipient, amount0);
    callback::pay(env, &config.token1, &recipient, amount1);

    events::emit_burn(
        env,
        &sender,
        &recipient,
        liquidity_delta,
        shares,
        amount0,
        amount1,
    );

    BurnResult {
        liquidity_delta,
        amount0,
        amount1,
    }
}

/// Move shares between holders
pub fn transfer(env: &Env, from: Address, to: Address, amount: i128) {
    if amount < 0 {
        panic_with_error!(env, PoolError::InsufficientShares);
    }
    let balance = get_balance(env, &from);
    if balance < amount {
        panic_with_error!(env, PoolError::InsufficientShares);
    }
    set_balance(env, &from, balance - amount);
    set_balance(env, &to, get_balance(env, &to) + amount);
    events::emit_transfer(env, &from, &to, amount);
}

fn mint_shares(env: &Env, to: &Address, amount: i128) {
    set_balance(env, to, get_balance(env, to) + amount);
    set_total_supply(env, get_total_supply(env) + amount);
}

fn burn_shares(env: &Env, from: &Address, amount: i128) {
    set_balance(env, from, get_balance(env, from) - amount);
    set_total_supply(env, get_total_supply(env) - amount);
}
