use margin_types::PoolKey;
use soroban_sdk::{Address, BytesN, Env, Symbol};

/// Emitted once when the factory is configured
pub fn emit_initialize(env: &Env, admin: &Address, pool_wasm_hash: &BytesN<32>) {
    env.events().publish(
        (Symbol::new(env, "initialize"), admin.clone()),
        pool_wasm_hash.clone(),
    );
}

/// Emitted when a pool is deployed
///
/// Topics: ("pool_created", token0, token1)
/// Data: (maintenance, oracle, pool)
pub fn emit_pool_created(env: &Env, key: &PoolKey, pool: &Address) {
    env.events().publish(
        (
            Symbol::new(env, "pool_created"),
            key.token0.clone(),
            key.token1.clone(),
        ),
        (key.maintenance, key.oracle.clone(), pool.clone()),
    );
}
