use soroban_sdk::{contracttype, Address};

/// Current pool state - stored in Instance storage for frequent access
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    /// Current sqrt(price) as Q64.96
    pub sqrt_price_x96: u128,
    /// Current tick index
    pub tick: i32,
    /// Free liquidity on the swappable curve
    pub liquidity: u128,
    /// Liquidity reserved against open leveraged positions
    pub liquidity_locked: u128,
    /// Running sum of tick * seconds
    pub tick_cumulative: i64,
    /// Ledger timestamp the accumulator was last advanced to
    pub block_timestamp: u64,
    /// Number of positions ever opened, doubles as the next position id
    pub total_positions: u32,
    /// Set once by `initialize`
    pub initialized: bool,
}

impl PoolState {
    pub fn new() -> Self {
        Self {
            sqrt_price_x96: 0,
            tick: 0,
            liquidity: 0,
            liquidity_locked: 0,
            tick_cumulative: 0,
            block_timestamp: 0,
            total_positions: 0,
            initialized: false,
        }
    }

    /// Free plus locked liquidity: the base for share accounting
    pub fn liquidity_total(&self) -> u128 {
        self.liquidity + self.liquidity_locked
    }
}

impl Default for PoolState {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool configuration - immutable after creation
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Factory contract address
    pub factory: Address,
    /// Token0 address (lower address)
    pub token0: Address,
    /// Token1 address (higher address)
    pub token1: Address,
    /// Maintenance requirement in ppm
    pub maintenance: u32,
    /// Reference feed the pool prices funding and liquidations against
    pub oracle: Address,
    /// Token liquidation rewards are escrowed in
    pub native: Address,
    /// Network base fee used to size liquidation rewards
    pub reward_base_fee: i128,
}

/// Key identifying a pool in the factory registry
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub maintenance: u32,
    pub oracle: Address,
}

/// Result of a liquidity deposit
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintResult {
    pub shares: i128,
    pub amount0: i128,
    pub amount1: i128,
}

/// Result of a liquidity withdrawal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BurnResult {
    pub liquidity_delta: u128,
    pub amount0: i128,
    pub amount1: i128,
}
