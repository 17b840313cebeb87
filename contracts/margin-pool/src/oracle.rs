use crate::error::PoolError;
use margin_math::{average_tick, get_sqrt_ratio_at_tick};
use margin_types::{FeedObservation, PoolState, ReferenceFeedClient, SECONDS_AGO};
use soroban_sdk::{log, panic_with_error, vec, Address, Env};

/// Time-weighted price and current tick cumulative read from the reference feed
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleReading {
    /// Mean tick over the window read
    pub tick: i32,
    pub sqrt_price_x96: u128,
    pub tick_cumulative: i64,
}

impl OracleReading {
    fn averaged(env: &Env, start: i64, end: i64, window: u32) -> Self {
        let tick = average_tick(start, end, window);
        Self {
            tick,
            sqrt_price_x96: get_sqrt_ratio_at_tick(env, tick),
            tick_cumulative: end,
        }
    }
}

/// Advance the pool's own tick accumulator to `now`
pub fn accumulate(state: &mut PoolState, now: u64) {
    let elapsed = now.saturating_sub(state.block_timestamp);
    if elapsed > 0 {
        state.tick_cumulative += state.tick as i64 * elapsed as i64;
        state.block_timestamp = now;
    }
}

/// Read the feed over the full `SECONDS_AGO` window, shrinking the window to
/// the age of the oldest observation when the feed cannot serve it
pub fn read(env: &Env, oracle: &Address) -> OracleReading {
    let feed = ReferenceFeedClient::new(env, oracle);
    if let Ok(Ok(cumulatives)) = feed.try_observe(&vec![env, SECONDS_AGO, 0u32]) {
        if let (Some(start), Some(end)) = (cumulatives.get(0), cumulatives.get(1)) {
            return OracleReading::averaged(env, start, end, SECONDS_AGO);
        }
    }
    read_degraded(env, &feed)
}

fn read_degraded(env: &Env, feed: &ReferenceFeedClient) -> OracleReading {
    let slot0 = match feed.try_slot0() {
        Ok(Ok(slot0)) => slot0,
        _ => panic_with_error!(env, PoolError::InvalidOracle),
    };
    if slot0.observation_cardinality == 0 {
        panic_with_error!(env, PoolError::InvalidOracle);
    }

    let oldest_index = (slot0.observation_index + 1) % slot0.observation_cardinality;
    let mut oldest = observation(env, feed, oldest_index);
    if !oldest.initialized {
        // Ring buffer not yet full: slot 0 is the oldest written
        oldest = observation(env, feed, 0);
    }

    let now = env.ledger().timestamp();
    let window = now.saturating_sub(oldest.timestamp).min(SECONDS_AGO as u64) as u32;
    log!(env, "oracle window degraded", window, SECONDS_AGO);

    if window == 0 {
        return OracleReading {
            tick: slot0.tick,
            sqrt_price_x96: get_sqrt_ratio_at_tick(env, slot0.tick),
            tick_cumulative: oldest.tick_cumulative,
        };
    }

    match feed.try_observe(&vec![env, window, 0u32]) {
        Ok(Ok(cumulatives)) => match (cumulatives.get(0), cumulatives.get(1)) {
            (Some(start), Some(end)) => OracleReading::averaged(env, start, end, window),
            _ => panic_with_error!(env, PoolError::InvalidOracle),
        },
        _ => panic_with_error!(env, PoolError::InvalidOracle),
    }
}

fn observation(env: &Env, feed: &ReferenceFeedClient, index: u32) -> FeedObservation {
    match feed.try_observation(&index) {
        Ok(Ok(observation)) => observation,
        _ => panic_with_error!(env, PoolError::InvalidOracle),
    }
}
