// Pool events
// Every state change publishes one event keyed by its operation name

use soroban_sdk::{Address, Env, Symbol};

/// Topics: ("initialize",)
/// Data: (sqrt_price_x96, tick)
pub fn emit_initialize(env: &Env, sqrt_price_x96: u128, tick: i32) {
    env.events()
        .publish((Symbol::new(env, "initialize"),), (sqrt_price_x96, tick));
}

/// Topics: ("mint", recipient)
/// Data: (sender, liquidity_delta, shares, amount0, amount1)
pub fn emit_mint(
    env: &Env,
    sender: &Address,
    recipient: &Address,
    liquidity_delta: u128,
    shares: i128,
    amount0: i128,
    amount1: i128,
) {
    env.events().publish(
        (Symbol::new(env, "mint"), recipient.clone()),
        (sender.clone(), liquidity_delta, shares, amount0, amount1),
    );
}

/// Topics: ("burn", sender)
/// Data: (recipient, liquidity_delta, shares, amount0, amount1)
pub fn emit_burn(
    env: &Env,
    sender: &Address,
    recipient: &Address,
    liquidity_delta: u128,
    shares: i128,
    amount0: i128,
    amount1: i128,
) {
    env.events().publish(
        (Symbol::new(env, "burn"), sender.clone()),
        (recipient.clone(), liquidity_delta, shares, amount0, amount1),
    );
}

/// Topics: ("swap", sender, recipient)
/// Data: (amount0, amount1, sqrt_price_x96, liquidity, tick)
pub fn emit_swap(
    env: &Env,
    sender: &Address,
    recipient: &Address,
    amount0: i128,
    amount1: i128,
    sqrt_price_x96: u128,
    liquidity: u128,
    tick: i32,
) {
    env.events().publish(
        (Symbol::new(env, "swap"), sender.clone(), recipient.clone()),
        (amount0, amount1, sqrt_price_x96, liquidity, tick),
    );
}

/// Topics: ("open", owner, id)
/// Data: (zero_for_one, liquidity_delta, size, debt, margin, fees, rewards)
pub fn emit_open(
    env: &Env,
    owner: &Address,
    id: u32,
    zero_for_one: bool,
    liquidity_delta: u128,
    size: u128,
    debt: u128,
    margin: u128,
    fees: u128,
    rewards: u128,
) {
    env.events().publish(
        (Symbol::new(env, "open"), owner.clone(), id),
        (zero_for_one, liquidity_delta, size, debt, margin, fees, rewards),
    );
}

/// Topics: ("lock", owner, id)
/// Data: (margin_in, margin_after)
pub fn emit_lock(env: &Env, owner: &Address, id: u32, margin_in: u128, margin_after: u128) {
    env.events().publish(
        (Symbol::new(env, "lock"), owner.clone(), id),
        (margin_in, margin_after),
    );
}

/// Topics: ("free", owner, id)
/// Data: (recipient, margin_out, margin_after)
pub fn emit_free(
    env: &Env,
    owner: &Address,
    id: u32,
    recipient: &Address,
    margin_out: u128,
    margin_after: u128,
) {
    env.events().publish(
        (Symbol::new(env, "free"), owner.clone(), id),
        (recipient.clone(), margin_out, margin_after),
    );
}

/// Topics: ("settle", owner, id)
/// Data: (recipient, amount0, amount1, rewards)
pub fn emit_settle(
    env: &Env,
    owner: &Address,
    id: u32,
    recipient: &Address,
    amount0: i128,
    amount1: i128,
    rewards: u128,
) {
    env.events().publish(
        (Symbol::new(env, "settle"), owner.clone(), id),
        (recipient.clone(), amount0, amount1, rewards),
    );
}

/// Topics: ("liquidate", owner, id)
/// Data: (sender, recipient, rewards)
pub fn emit_liquidate(
    env: &Env,
    owner: &Address,
    id: u32,
    sender: &Address,
    recipient: &Address,
    rewards: u128,
) {
    env.events().publish(
        (Symbol::new(env, "liquidate"), owner.clone(), id),
        (sender.clone(), recipient.clone(), rewards),
    );
}

/// Topics: ("transfer", from, to)
/// Data: amount
pub fn emit_transfer(env: &Env, from: &Address, to: &Address, amount: i128) {
    env.events()
        .publish((Symbol::new(env, "transfer"), from.clone(), to.clone()), amount);
}
