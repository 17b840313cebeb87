#![no_std]

mod callback;
mod oracle;
mod pool;
mod position;

pub use callback::*;
pub use oracle::*;
pub use pool::*;
pub use position::*;

/// Q96 constant (2^96) for fixed-point math
pub const Q96: u128 = 1 << 96;

/// Minimum tick index
/// Limited by u128 representation (originally -887272 for uint160)
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
/// Limited by u128 representation (originally 887272 for uint160)
pub const MAX_TICK: i32 = 443636;

/// Minimum sqrt price (at MIN_TICK)
pub const MIN_SQRT_RATIO: u128 = 18446743374134;

/// Maximum sqrt price (at MAX_TICK), bounded by u128::MAX
pub const MAX_SQRT_RATIO: u128 = 340275971719517849884101479065584693834;

/// Liquidity permanently held by the pool after the first deposit.
/// Also the floor the free curve liquidity may never drop below.
pub const MINIMUM_LIQUIDITY: u128 = 10_000;

/// Parts-per-million denominator shared by fees, maintenance and reward premium
pub const FEE_UNIT: i128 = 1_000_000;
pub const MAINTENANCE_UNIT: i128 = 1_000_000;

/// Swap and position fee: 0.1%
pub const FEE: i128 = 1_000;

/// Liquidation reward premium over the expected liquidation cost (2x)
pub const REWARD_PREMIUM: i128 = 2_000_000;

/// Floor on the configured network base fee used for liquidation rewards (stroops)
pub const BASE_FEE_MIN: i128 = 100;

/// Expected resource cost of a liquidation, in base fee units
pub const GAS_LIQUIDATE: i128 = 50_000;

/// Health factor of exactly one: a position at the liquidation boundary
pub const HEALTH_UNIT: u128 = 1_000_000_000_000_000_000;

/// Maximum oracle-vs-pool tick divergence charged per second of funding
pub const TICK_CUMULATIVE_RATE_MAX: i64 = 920;

/// Funding period in seconds (7 days)
pub const FUNDING_PERIOD: i64 = 604_800;

/// TWAP window read from the reference feed (12 hours)
pub const SECONDS_AGO: u32 = 43_200;

/// Observation buffer size the reference feed must support by default
pub const OBSERVATION_CARDINALITY_MIN: u32 = 7_200;

/// Allowed maintenance requirements in ppm: 4x, 3x and 2x max leverage
pub fn is_valid_maintenance(maintenance: u32) -> bool {
    matches!(maintenance, 250_000 | 500_000 | 1_000_000)
}
