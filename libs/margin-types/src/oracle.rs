use soroban_sdk::{contractclient, contracttype, Address, Env, Vec};

/// Spot state of the reference feed
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeedSlot0 {
    pub sqrt_price_x96: u128,
    pub tick: i32,
    pub observation_index: u32,
    pub observation_cardinality: u32,
    pub observation_cardinality_next: u32,
}

/// One entry of the feed's observation ring buffer
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeedObservation {
    pub timestamp: u64,
    pub tick_cumulative: i64,
    pub initialized: bool,
}

/// Pool spot price next to the time-weighted oracle price, with the funding
/// ratio they imply
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OraclePrices {
    pub sqrt_price_x96: u128,
    pub oracle_sqrt_price_x96: u128,
    /// 1.0001^(pool tick - oracle tick) in Q96, the divergence capped at
    /// `TICK_CUMULATIVE_RATE_MAX` ticks
    pub funding_ratio_x96: u128,
}

/// Spot market the pool reads time-weighted prices from
#[contractclient(name = "ReferenceFeedClient")]
pub trait ReferenceFeed {
    fn slot0(env: Env) -> FeedSlot0;

    /// Tick cumulatives at each `seconds_agos` offset from now
    fn observe(env: Env, seconds_agos: Vec<u32>) -> Vec<i64>;

    fn observation(env: Env, index: u32) -> FeedObservation;

    fn increase_cardinality_next(env: Env, observation_cardinality_next: u32);
}

/// Directory of reference feeds keyed by token pair and fee tier
#[contractclient(name = "OracleRegistryClient")]
pub trait OracleRegistry {
    fn get_pool(env: Env, token0: Address, token1: Address, fee: u32) -> Option<Address>;
}
