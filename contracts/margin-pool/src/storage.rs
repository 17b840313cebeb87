use crate::error::PoolError;
use margin_types::{PoolConfig, PoolState, Position};
use soroban_sdk::{contracttype, panic_with_error, Address, Env};

// ============================================================================
// SOROBAN RESOURCE LIMITS - Constraints shaping the pool's storage layout:
// ============================================================================
// - Ledger entry size: 128 KiB max per entry
// - Read entries per tx: 100 entries / 200 KB
// - Write entries per tx: 50 entries / 132 KB
//
// Storage design considerations:
// - Config, state, guard and share supply live in Instance storage since
//   every operation touches them
// - Each position (~250 bytes) is its own Persistent entry keyed by id, so
//   the arena grows without a single unbounded entry
// - Share balances are Persistent entries per holder; empty balances are
//   removed
// - An operation touches at most one position, so footprints stay constant
// ============================================================================

/// Storage keys for the pool contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Pool configuration (Instance storage)
    Config,
    /// Current pool state (Instance storage)
    State,
    /// Reentrancy flag, true while no operation is running (Instance storage)
    Unlocked,
    /// Outstanding LP shares (Instance storage)
    TotalSupply,
    /// LP share balance per holder (Persistent storage)
    Balance(Address),
    /// Position id -> Position (Persistent storage)
    Position(u32),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

/// Extend instance storage TTL
pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

/// Extend persistent storage TTL for a key
pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

// === Config ===

pub fn get_config(env: &Env) -> PoolConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, PoolError::NotInitialized))
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

// === State ===

pub fn get_state(env: &Env) -> PoolState {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_default()
}

/// State of a pool that has been given its starting price
pub fn get_initialized_state(env: &Env) -> PoolState {
    let state = get_state(env);
    if !state.initialized {
        panic_with_error!(env, PoolError::NotInitialized);
    }
    state
}

pub fn set_state(env: &Env, state: &PoolState) {
    env.storage().instance().set(&DataKey::State, state);
    extend_instance_ttl(env);
}

// === Guard ===

/// Fail if the ledger is past the caller's deadline
pub fn check_deadline(env: &Env, deadline: u64) {
    if env.ledger().timestamp() > deadline {
        panic_with_error!(env, PoolError::DeadlinePassed);
    }
}

/// Clear the unlocked flag for the duration of an operation
pub fn enter(env: &Env) {
    let unlocked: bool = env
        .storage()
        .instance()
        .get(&DataKey::Unlocked)
        .unwrap_or(false);
    if !unlocked {
        panic_with_error!(env, PoolError::Locked);
    }
    env.storage().instance().set(&DataKey::Unlocked, &false);
}

pub fn exit(env: &Env) {
    env.storage().instance().set(&DataKey::Unlocked, &true);
    extend_instance_ttl(env);
}

// === Shares ===

pub fn get_total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply)
        .unwrap_or(0)
}

pub fn set_total_supply(env: &Env, total_supply: i128) {
    env.storage()
        .instance()
        .set(&DataKey::TotalSupply, &total_supply);
}

pub fn get_balance(env: &Env, owner: &Address) -> i128 {
    let key = DataKey::Balance(owner.clone());
    env.storage().persistent().get(&key).unwrap_or(0)
}

pub fn set_balance(env: &Env, owner: &Address, balance: i128) {
    let key = DataKey::Balance(owner.clone());
    if balance == 0 {
        // Remove empty balance
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &balance);
        extend_persistent_ttl(env, &key);
    }
}

// === Position ===

pub fn get_position(env: &Env, id: u32) -> Option<Position> {
    env.storage().persistent().get(&DataKey::Position(id))
}

pub fn set_position(env: &Env, id: u32, position: &Position) {
    let key = DataKey::Position(id);
    env.storage().persistent().set(&key, position);
    extend_persistent_ttl(env, &key);
}

pub fn remove_position(env: &Env, id: u32) {
    env.storage().persistent().remove(&DataKey::Position(id));
}

/// Position `id` as seen by `owner`: it must exist, belong to `owner`
/// and not have been liquidated
pub fn get_owned_position(env: &Env, owner: &Address, id: u32) -> Position {
    let position =
        get_position(env, id).unwrap_or_else(|| panic_with_error!(env, PoolError::PositionNotFound));
    if position.owner != *owner {
        panic_with_error!(env, PoolError::Unauthorized);
    }
    if position.liquidated {
        panic_with_error!(env, PoolError::PositionLiquidated);
    }
    position
}
