use soroban_sdk::contracterror;

/// Errors surfaced by pool entry points.
/// Entry points panic with these; `try_` client methods surface them as
/// `Err(Ok(soroban_sdk::Error))`, comparable with `PoolError::X.into()`.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    // Lifecycle (100-199)
    AlreadyInitialized = 100,
    NotInitialized = 101,
    InvalidSqrtPrice = 102,
    Locked = 103,
    DeadlinePassed = 104,
    Unauthorized = 105,
    InvalidOracle = 106,

    // Liquidity and shares (200-299)
    InvalidLiquidityDelta = 200,
    InsufficientShares = 201,
    InsufficientLiquidity = 202,

    // Swap (300-399)
    InvalidSqrtPriceLimit = 300,

    // Position limits (400-499)
    SizeLessThanMin = 400,
    DebtGreaterThanMax = 401,
    AmountInGreaterThanMax = 402,
    MarginLessThanMin = 403,
    RewardsLessThanMin = 404,
    InvalidMarginIn = 405,
    InvalidMarginOut = 406,

    // Position lifecycle (500-599)
    PositionNotFound = 500,
    PositionLiquidated = 501,
    PositionNotSafe = 502,
    PositionSafe = 503,

    // Payments (600-699)
    InsufficientPayment0 = 600,
    InsufficientPayment1 = 601,
}
