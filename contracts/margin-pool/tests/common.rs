#![allow(dead_code)]

use margin_math::get_sqrt_ratio_at_tick;
use margin_pool::{MarginPool, MarginPoolClient};
use margin_types::{
    FeedObservation, FeedSlot0, OpenParams, OpenResult, PaymentCallback, PoolConfig,
    MAX_SQRT_RATIO, MIN_SQRT_RATIO, SECONDS_AGO,
};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::token::{StellarAssetClient, TokenClient};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, panic_with_error, token, Address, Bytes,
    Env, Vec,
};

// Test constants
pub const START_TIMESTAMP: u64 = 1_700_000_000;
pub const MAINTENANCE: u32 = 250_000;
pub const REWARD_BASE_FEE: i128 = 100;
pub const LIQUIDITY: u128 = 1_000_000_000_000_000_000;
pub const FUNDS: i128 = 100_000_000_000_000_000_000_000_000_000_000;
pub const DEADLINE: u64 = u64::MAX;

// ============================================================================
// Mock reference feed
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FeedError {
    /// Requested time is older than the oldest observation
    Old = 1,
}

#[contracttype]
#[derive(Clone)]
enum FeedKey {
    Slot0,
    Observation(u32),
    Frozen,
}

/// Ring buffer of tick cumulatives, written whenever the tick changes
#[contract]
pub struct MockFeed;

#[contractimpl]
impl MockFeed {
    pub fn __constructor(env: Env, tick: i32) {
        let now = env.ledger().timestamp();
        env.storage().instance().set(
            &FeedKey::Observation(0),
            &FeedObservation {
                timestamp: now,
                tick_cumulative: 0,
                initialized: true,
            },
        );
        env.storage().instance().set(
            &FeedKey::Slot0,
            &FeedSlot0 {
                sqrt_price_x96: get_sqrt_ratio_at_tick(&env, tick),
                tick,
                observation_index: 0,
                observation_cardinality: 1,
                observation_cardinality_next: 1,
            },
        );
    }

    /// Record an observation for the old tick at the current time, then move the tick
    pub fn set_tick(env: Env, tick: i32) {
        let mut slot0 = Self::slot0(env.clone());
        let now = env.ledger().timestamp();
        let last = Self::observation(env.clone(), slot0.observation_index);
        if last.timestamp != now {
            let cardinality = if slot0.observation_cardinality_next > slot0.observation_cardinality
                && slot0.observation_index == slot0.observation_cardinality - 1
            {
                slot0.observation_cardinality_next
            } else {
                slot0.observation_cardinality
            };
            let index = (slot0.observation_index + 1) % cardinality;
            env.storage().instance().set(
                &FeedKey::Observation(index),
                &FeedObservation {
                    timestamp: now,
                    tick_cumulative: last.tick_cumulative
                        + slot0.tick as i64 * (now - last.timestamp) as i64,
                    initialized: true,
                },
            );
            slot0.observation_index = index;
            slot0.observation_cardinality = cardinality;
        }
        slot0.tick = tick;
        slot0.sqrt_price_x96 = get_sqrt_ratio_at_tick(&env, tick);
        env.storage().instance().set(&FeedKey::Slot0, &slot0);
    }

    /// Ignore cardinality growth requests
    pub fn set_frozen(env: Env, frozen: bool) {
        env.storage().instance().set(&FeedKey::Frozen, &frozen);
    }

    pub fn slot0(env: Env) -> FeedSlot0 {
        env.storage()
            .instance()
            .get(&FeedKey::Slot0)
            .unwrap_or_else(|| panic_with_error!(&env, FeedError::Old))
    }

    pub fn observe(env: Env, seconds_agos: Vec<u32>) -> Vec<i64> {
        let slot0 = Self::slot0(env.clone());
        let now = env.ledger().timestamp();
        let mut cumulatives = Vec::new(&env);
        for seconds_ago in seconds_agos.iter() {
            let target = now
                .checked_sub(seconds_ago as u64)
                .unwrap_or_else(|| panic_with_error!(&env, FeedError::Old));
            cumulatives.push_back(Self::cumulative_at(&env, &slot0, target));
        }
        cumulatives
    }

    pub fn observation(env: Env, index: u32) -> FeedObservation {
        env.storage()
            .instance()
            .get(&FeedKey::Observation(index))
            .unwrap_or(FeedObservation {
                timestamp: 0,
                tick_cumulative: 0,
                initialized: false,
            })
    }

    pub fn increase_cardinality_next(env: Env, observation_cardinality_next: u32) {
        let frozen: bool = env.storage().instance().get(&FeedKey::Frozen).unwrap_or(false);
        let mut slot0 = Self::slot0(env.clone());
        if !frozen && observation_cardinality_next > slot0.observation_cardinality_next {
            slot0.observation_cardinality_next = observation_cardinality_next;
            env.storage().instance().set(&FeedKey::Slot0, &slot0);
        }
    }
}

impl MockFeed {
    fn cumulative_at(env: &Env, slot0: &FeedSlot0, target: u64) -> i64 {
        let last = Self::observation(env.clone(), slot0.observation_index);
        if target >= last.timestamp {
            return last.tick_cumulative + slot0.tick as i64 * (target - last.timestamp) as i64;
        }

        // Walk back through the ring until an observation at or before target
        let cardinality = slot0.observation_cardinality;
        let mut index = slot0.observation_index;
        let mut after = last;
        for _ in 1..cardinality {
            index = if index == 0 { cardinality - 1 } else { index - 1 };
            let before = Self::observation(env.clone(), index);
            if !before.initialized {
                break;
            }
            if before.timestamp <= target {
                let span = (after.timestamp - before.timestamp) as i64;
                let rate = (after.tick_cumulative - before.tick_cumulative) / span;
                return before.tick_cumulative + rate * (target - before.timestamp) as i64;
            }
            after = before;
        }
        panic_with_error!(env, FeedError::Old)
    }
}

// ============================================================================
// Paying callee
// ============================================================================

#[contracttype]
#[derive(Clone)]
enum CalleeKey {
    Pool,
    Token0,
    Token1,
    Underpay,
}

/// Pays whatever the pool asks for out of its own balances
#[contract]
pub struct TestCallee;

#[contractimpl]
impl TestCallee {
    pub fn __constructor(env: Env, pool: Address, token0: Address, token1: Address) {
        env.storage().instance().set(&CalleeKey::Pool, &pool);
        env.storage().instance().set(&CalleeKey::Token0, &token0);
        env.storage().instance().set(&CalleeKey::Token1, &token1);
    }

    /// Pay one unit less than owed
    pub fn set_underpay(env: Env, underpay: bool) {
        env.storage().instance().set(&CalleeKey::Underpay, &underpay);
    }
}

impl TestCallee {
    fn pay(env: &Env, amount0: i128, amount1: i128) {
        let storage = env.storage().instance();
        let pool: Address = storage.get(&CalleeKey::Pool).unwrap();
        let underpay: bool = storage.get(&CalleeKey::Underpay).unwrap_or(false);
        let shortfall = if underpay { 1 } else { 0 };
        let me = env.current_contract_address();
        if amount0 > 0 {
            let token0: Address = storage.get(&CalleeKey::Token0).unwrap();
            token::Client::new(env, &token0).transfer(&me, &pool, &(amount0 - shortfall));
        }
        if amount1 > 0 {
            let token1: Address = storage.get(&CalleeKey::Token1).unwrap();
            token::Client::new(env, &token1).transfer(&me, &pool, &(amount1 - shortfall));
        }
    }
}

#[contractimpl]
impl PaymentCallback for TestCallee {
    fn margin_mint_callback(env: Env, _sender: Address, amount0: i128, amount1: i128, _data: Bytes) {
        Self::pay(&env, amount0, amount1);
    }

    fn margin_swap_callback(env: Env, _sender: Address, amount0: i128, amount1: i128, _data: Bytes) {
        Self::pay(&env, amount0, amount1);
    }

    fn margin_open_callback(env: Env, _sender: Address, amount0: i128, amount1: i128, _data: Bytes) {
        Self::pay(&env, amount0, amount1);
    }

    fn margin_lock_callback(env: Env, _sender: Address, amount0: i128, amount1: i128, _data: Bytes) {
        Self::pay(&env, amount0, amount1);
    }

    fn margin_settle_callback(env: Env, _sender: Address, amount0: i128, amount1: i128, _data: Bytes) {
        Self::pay(&env, amount0, amount1);
    }
}

// ============================================================================
// Setup
// ============================================================================

pub struct Setup<'a> {
    pub env: &'a Env,
    pub pool: MarginPoolClient<'a>,
    pub feed: MockFeedClient<'a>,
    pub callee: TestCalleeClient<'a>,
    pub token0: TokenClient<'a>,
    pub token1: TokenClient<'a>,
    pub native: TokenClient<'a>,
    pub user: Address,
}

impl<'a> Setup<'a> {
    pub fn data(&self) -> Bytes {
        Bytes::new(self.env)
    }

    /// Provide `liquidity_delta` from the callee's funds, shares to the user
    pub fn mint(&self, liquidity_delta: u128) -> i128 {
        self.pool
            .mint(
                &self.user,
                &self.user,
                &liquidity_delta,
                &self.callee.address,
                &self.data(),
                &DEADLINE,
            )
            .shares
    }

    pub fn open_params(&self, zero_for_one: bool, size: u128, margin: u128) -> OpenParams {
        OpenParams {
            zero_for_one,
            size,
            size_min: 0,
            debt_max: u128::MAX,
            amount_in_max: u128::MAX,
            sqrt_price_limit_x96: if zero_for_one {
                MIN_SQRT_RATIO + 1
            } else {
                MAX_SQRT_RATIO - 1
            },
            margin,
            rewards: self.pool.rewards_minimum(),
            deadline: DEADLINE,
        }
    }

    pub fn open(&self, zero_for_one: bool, size: u128, margin: u128) -> OpenResult {
        self.pool.open(
            &self.user,
            &self.callee.address,
            &self.open_params(zero_for_one, size, margin),
            &self.data(),
        )
    }

    /// Move ledger time forward by `seconds`
    pub fn advance(&self, seconds: u64) {
        let now = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(now + seconds);
    }
}

pub fn create_token<'a>(env: &'a Env, admin: &Address) -> TokenClient<'a> {
    let token_id = env.register_stellar_asset_contract_v2(admin.clone());
    TokenClient::new(env, &token_id.address())
}

pub fn mint_tokens(env: &Env, token: &Address, to: &Address, amount: i128) {
    StellarAssetClient::new(env, token).mint(to, &amount);
}

/// Pool at price 1 with a feed that has a full window of history at tick 0
pub fn setup(env: &Env) -> Setup<'_> {
    setup_with_feed_age(env, SECONDS_AGO as u64 + 1)
}

/// Pool whose feed was created `feed_age` seconds ago
pub fn setup_with_feed_age(env: &Env, feed_age: u64) -> Setup<'_> {
    setup_with(env, feed_age, 0)
}

/// Pool and feed both starting at `tick`, with a full window of history
pub fn setup_at_tick(env: &Env, tick: i32) -> Setup<'_> {
    setup_with(env, SECONDS_AGO as u64 + 1, tick)
}

pub fn setup_with(env: &Env, feed_age: u64, tick: i32) -> Setup<'_> {
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();
    env.ledger().set_timestamp(START_TIMESTAMP);

    let admin = Address::generate(env);
    let token_a = create_token(env, &admin);
    let token_b = create_token(env, &admin);
    let (token0, token1) = if token_a.address < token_b.address {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    let native = create_token(env, &admin);

    let feed_id = env.register(MockFeed, (tick,));
    env.ledger().set_timestamp(START_TIMESTAMP + feed_age);

    let config = PoolConfig {
        factory: admin.clone(),
        token0: token0.address.clone(),
        token1: token1.address.clone(),
        maintenance: MAINTENANCE,
        oracle: feed_id.clone(),
        native: native.address.clone(),
        reward_base_fee: REWARD_BASE_FEE,
    };
    let pool_id = env.register(MarginPool, (config,));
    let pool = MarginPoolClient::new(env, &pool_id);
    pool.initialize(&get_sqrt_ratio_at_tick(env, tick));

    let callee_id = env.register(
        TestCallee,
        (pool_id.clone(), token0.address.clone(), token1.address.clone()),
    );
    mint_tokens(env, &token0.address, &callee_id, FUNDS);
    mint_tokens(env, &token1.address, &callee_id, FUNDS);

    let user = Address::generate(env);
    mint_tokens(env, &native.address, &user, FUNDS);

    Setup {
        env,
        pool,
        feed: MockFeedClient::new(env, &feed_id),
        callee: TestCalleeClient::new(env, &callee_id),
        token0,
        token1,
        native,
        user,
    }
}
