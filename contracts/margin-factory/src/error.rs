use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FactoryError {
    // Initialization errors (1000-1099)
    AlreadyInitialized = 1000,
    NotInitialized = 1001,

    // Pool creation errors (1100-1199)
    PoolAlreadyExists = 1100,
    IdenticalTokens = 1101,
    InvalidMaintenance = 1102,
    /// No reference feed registered for the pair and fee tier
    InvalidOracle = 1103,
    /// Feed could not grow its observation buffer far enough
    InvalidObservationCardinality = 1104,
}
