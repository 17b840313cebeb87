#![no_std]

mod callback;
mod error;
mod events;
mod invariants;
mod liquidity;
mod oracle;
mod position;
mod storage;
mod swap;

pub use error::PoolError;

use margin_math::{
    funding_ratio_tick, funding_ratio_x96, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio,
    liquidation_rewards,
};
use margin_types::{
    BurnResult, MintResult, OpenParams, OpenResult, OraclePrices, PoolConfig, PoolState, Position,
    SettleResult, MAX_SQRT_RATIO, MIN_SQRT_RATIO,
};
use soroban_sdk::{contract, contractimpl, panic_with_error, Address, Bytes, Env};
use storage::{
    check_deadline, enter, exit, get_balance, get_config, get_initialized_state, get_state,
    get_total_supply, set_config, set_state,
};

#[contract]
pub struct MarginPool;

#[contractimpl]
impl MarginPool {
    /// Deploy-time configuration. The pool stays unusable until `initialize`.
    pub fn __constructor(env: Env, config: PoolConfig) {
        set_config(&env, &config);
        set_state(&env, &PoolState::new());
        exit(&env);
    }

    /// Set the starting price and start the tick accumulator clock
    pub fn initialize(env: Env, sqrt_price_x96: u128) {
        enter(&env);
        let mut state = get_state(&env);
        if state.initialized {
            panic_with_error!(&env, PoolError::AlreadyInitialized);
        }
        if !(MIN_SQRT_RATIO..MAX_SQRT_RATIO).contains(&sqrt_price_x96) {
            panic_with_error!(&env, PoolError::InvalidSqrtPrice);
        }

        state.sqrt_price_x96 = sqrt_price_x96;
        state.tick = get_tick_at_sqrt_ratio(&env, sqrt_price_x96);
        state.block_timestamp = env.ledger().timestamp();
        state.initialized = true;
        debug_assert!(invariants::tick_consistent_with_price(
            sqrt_price_x96,
            get_sqrt_ratio_at_tick(&env, state.tick),
            get_sqrt_ratio_at_tick(&env, state.tick + 1),
        ));
        set_state(&env, &state);
        exit(&env);

        events::emit_initialize(&env, sqrt_price_x96, state.tick);
    }

    /// Add liquidity to the curve, paid through `callback`
    ///
    /// # Returns
    /// Shares minted to `recipient` and the token amounts collected
    pub fn mint(
        env: Env,
        sender: Address,
        recipient: Address,
        liquidity_delta: u128,
        callback: Address,
        data: Bytes,
        deadline: u64,
    ) -> MintResult {
        sender.require_auth();
        check_deadline(&env, deadline);
        enter(&env);
        let result = liquidity::mint(&env, sender, recipient, liquidity_delta, callback, data);
        exit(&env);
        result
    }

    /// Burn `shares` for their slice of the free curve
    pub fn burn(
        env: Env,
        sender: Address,
        recipient: Address,
        shares: i128,
        deadline: u64,
    ) -> BurnResult {
        sender.require_auth();
        check_deadline(&env, deadline);
        enter(&env);
        let result = liquidity::burn(&env, sender, recipient, shares);
        exit(&env);
        result
    }

    /// Execute a swap
    ///
    /// # Arguments
    /// * `recipient` - Address to receive output tokens
    /// * `zero_for_one` - True if swapping token0 for token1
    /// * `amount_specified` - Positive for exact input, negative for exact output
    /// * `sqrt_price_limit_x96` - Price limit for the swap
    /// * `callback` - Contract paying the input through `margin_swap_callback`
    ///
    /// # Returns
    /// (amount0, amount1) - Negative values are amounts paid out
    pub fn swap(
        env: Env,
        sender: Address,
        recipient: Address,
        zero_for_one: bool,
        amount_specified: i128,
        sqrt_price_limit_x96: u128,
        callback: Address,
        data: Bytes,
        deadline: u64,
    ) -> (i128, i128) {
        sender.require_auth();
        check_deadline(&env, deadline);
        get_initialized_state(&env);
        if amount_specified == 0 {
            return (0, 0);
        }
        enter(&env);
        let amounts = swap::execute_swap(
            &env,
            sender,
            recipient,
            zero_for_one,
            amount_specified,
            sqrt_price_limit_x96,
            callback,
            data,
        );
        exit(&env);
        amounts
    }

    /// Open a leveraged position owned by `sender`
    pub fn open(
        env: Env,
        sender: Address,
        callback: Address,
        params: OpenParams,
        data: Bytes,
    ) -> OpenResult {
        sender.require_auth();
        check_deadline(&env, params.deadline);
        enter(&env);
        let result = position::open(&env, sender, callback, params, data);
        exit(&env);
        result
    }

    /// Add margin to a position
    ///
    /// # Returns
    /// Margin after the top-up
    pub fn lock(
        env: Env,
        sender: Address,
        id: u32,
        margin_in: u128,
        callback: Address,
        data: Bytes,
        deadline: u64,
    ) -> u128 {
        sender.require_auth();
        check_deadline(&env, deadline);
        enter(&env);
        let margin = position::lock(&env, sender, id, margin_in, callback, data);
        exit(&env);
        margin
    }

    /// Withdraw margin from a position
    ///
    /// # Returns
    /// Margin left on the position
    pub fn free(
        env: Env,
        sender: Address,
        recipient: Address,
        id: u32,
        margin_out: u128,
        deadline: u64,
    ) -> u128 {
        sender.require_auth();
        check_deadline(&env, deadline);
        enter(&env);
        let margin = position::free(&env, sender, recipient, id, margin_out);
        exit(&env);
        margin
    }

    /// Close a solvent position, repaying its debt through `callback`
    pub fn settle(
        env: Env,
        sender: Address,
        recipient: Address,
        id: u32,
        callback: Address,
        data: Bytes,
        deadline: u64,
    ) -> SettleResult {
        sender.require_auth();
        check_deadline(&env, deadline);
        enter(&env);
        let result = position::settle(&env, sender, recipient, id, callback, data);
        exit(&env);
        result
    }

    /// Liquidate `owner`'s position `id` once it is unsafe
    ///
    /// # Returns
    /// Rewards paid to `recipient`
    pub fn liquidate(
        env: Env,
        sender: Address,
        recipient: Address,
        owner: Address,
        id: u32,
        deadline: u64,
    ) -> u128 {
        sender.require_auth();
        check_deadline(&env, deadline);
        enter(&env);
        let rewards = position::liquidate(&env, sender, recipient, owner, id);
        exit(&env);
        rewards
    }

    // === Share Token ===

    pub fn total_supply(env: Env) -> i128 {
        get_total_supply(&env)
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        get_balance(&env, &id)
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        from.require_auth();
        enter(&env);
        liquidity::transfer(&env, from, to, amount);
        exit(&env);
    }

    // === View Functions ===

    /// Get current pool state
    pub fn state(env: Env) -> PoolState {
        get_state(&env)
    }

    /// Get pool configuration
    pub fn config(env: Env) -> PoolConfig {
        get_config(&env)
    }

    /// Get position `id`, which must belong to `owner`
    pub fn position(env: Env, owner: Address, id: u32) -> Position {
        position::view(&env, &owner, id)
    }

    /// Health of a position at the oracle price, with funding charged to now.
    /// 1e18 is the liquidation boundary.
    pub fn health_factor(env: Env, owner: Address, id: u32) -> u128 {
        position::health_factor(&env, &owner, id)
    }

    /// Oracle sqrt price at which the position becomes liquidatable
    pub fn liquidation_sqrt_price_x96(env: Env, owner: Address, id: u32) -> u128 {
        position::liquidation_sqrt_price_x96(&env, &owner, id)
    }

    /// Time-weighted sqrt price of the reference feed
    pub fn oracle_sqrt_price_x96(env: Env) -> u128 {
        oracle::read(&env, &get_config(&env).oracle).sqrt_price_x96
    }

    /// Pool and oracle prices with the funding ratio between them
    pub fn sqrt_prices_x96(env: Env) -> OraclePrices {
        let state = get_initialized_state(&env);
        let reading = oracle::read(&env, &get_config(&env).oracle);
        OraclePrices {
            sqrt_price_x96: state.sqrt_price_x96,
            oracle_sqrt_price_x96: reading.sqrt_price_x96,
            funding_ratio_x96: funding_ratio_x96(&env, funding_ratio_tick(state.tick, reading.tick)),
        }
    }

    /// Least rewards deposit `open` accepts
    pub fn rewards_minimum(env: Env) -> u128 {
        liquidation_rewards(get_config(&env).reward_base_fee)
    }

    /// Get current sqrt price
    pub fn sqrt_price_x96(env: Env) -> u128 {
        get_state(&env).sqrt_price_x96
    }

    /// Get current tick
    pub fn tick(env: Env) -> i32 {
        get_state(&env).tick
    }

    /// Get free curve liquidity
    pub fn liquidity(env: Env) -> u128 {
        get_state(&env).liquidity
    }

    /// Get token0 address
    pub fn token0(env: Env) -> Address {
        get_config(&env).token0
    }

    /// Get token1 address
    pub fn token1(env: Env) -> Address {
        get_config(&env).token1
    }

    /// Get maintenance requirement in ppm
    pub fn maintenance(env: Env) -> u32 {
        get_config(&env).maintenance
    }
}
