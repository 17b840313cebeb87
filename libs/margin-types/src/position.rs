use soroban_sdk::{contracttype, Address};

/// Leveraged position stored in the pool's position arena
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Account that opened the position and may mutate it
    pub owner: Address,
    /// True: long token1, debt in token0. False: long token0, debt in token1
    pub zero_for_one: bool,
    /// Notional held as collateral, in the size token
    pub size: u128,
    pub debt0: u128,
    pub debt1: u128,
    /// Reserves of the locked liquidity kept outside the curve
    pub insurance0: u128,
    pub insurance1: u128,
    /// Posted collateral, in the size token
    pub margin: u128,
    /// Curve liquidity reserved for this position
    pub liquidity_locked: u128,
    /// Pool tick after the open
    pub tick: i32,
    /// Oracle minus pool tick cumulative at the last funding sync
    pub tick_cumulative_delta: i64,
    /// Ledger timestamp of the last funding sync
    pub block_timestamp: u64,
    /// Liquidation incentive escrowed in the native token
    pub rewards: u128,
    pub liquidated: bool,
}

impl Position {
    /// Debt in whichever token was borrowed
    pub fn debt(&self) -> u128 {
        if self.zero_for_one {
            self.debt0
        } else {
            self.debt1
        }
    }
}

/// Amounts that make up a freshly opened position, before margin
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionAmounts {
    pub size: u128,
    pub debt0: u128,
    pub debt1: u128,
    pub insurance0: u128,
    pub insurance1: u128,
}

/// Caller limits and payments for opening a position.
/// The pool derives the locked liquidity from `size`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpenParams {
    pub zero_for_one: bool,
    pub size: u128,
    pub size_min: u128,
    pub debt_max: u128,
    pub amount_in_max: u128,
    /// The open may not move the pool price past this
    pub sqrt_price_limit_x96: u128,
    pub margin: u128,
    pub rewards: u128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpenResult {
    pub id: u32,
    pub size: u128,
    pub debt: u128,
    pub margin: u128,
    pub fees: u128,
    pub rewards: u128,
    pub amount0: i128,
    pub amount1: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettleResult {
    pub amount0: i128,
    pub amount1: i128,
    pub rewards: u128,
}
