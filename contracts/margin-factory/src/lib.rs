#![no_std]

mod error;
mod events;

pub use error::FactoryError;

use margin_types::{
    is_valid_maintenance, OracleRegistryClient, PoolConfig, PoolKey, ReferenceFeedClient,
};
use soroban_sdk::xdr::ToXdr;
use soroban_sdk::{
    contract, contractimpl, contracttype, panic_with_error, Address, BytesN, Env, TryFromVal, Val,
    Vec,
};

#[contract]
pub struct MarginFactory;

/// Storage keys for Factory contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Admin address
    Admin,
    /// Pool WASM hash for deployment
    PoolWasmHash,
    /// Registry the reference feeds are looked up in
    OracleRegistry,
    /// Observation buffer every reference feed must be able to hold
    ObservationCardinalityMin,
    /// Token liquidation rewards are escrowed in
    Native,
    /// Base fee pools size liquidation rewards from
    RewardBaseFee,
    /// Pool key -> pool address
    Pool(PoolKey),
    /// Marks addresses deployed by this factory
    IsPool(Address),
    /// Total number of pools created (counter for indexed storage)
    PoolCount,
    /// Pool address at index (indexed storage to avoid unbounded Vec)
    PoolAt(u32),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

/// Most pools returned by one paginated read
const PAGE_LIMIT: u32 = 50;

// ============================================================================
// SOROBAN RESOURCE LIMITS - Important constraints to be aware of:
// ============================================================================
// - Ledger entry size: 128 KiB max
// - Storage key size: 250 bytes max
// - Read entries per tx: 100 entries / 200 KB
// - Write entries per tx: 50 entries / 132 KB
//
// Design choices to stay within limits:
// - Pool list uses indexed storage (PoolCount + PoolAt) instead of Vec
//   to avoid a single unbounded ledger entry
// - Each pool address is stored separately, keyed by its PoolKey
// - Pagination is capped at PAGE_LIMIT reads
// ============================================================================

#[contractimpl]
impl MarginFactory {
    /// Register the deployment parameters every pool is created with
    pub fn initialize(
        env: Env,
        admin: Address,
        pool_wasm_hash: BytesN<32>,
        oracle_registry: Address,
        observation_cardinality_min: u32,
        native: Address,
        reward_base_fee: i128,
    ) {
        if env.storage().instance().has(&DataKey::Admin) {
            panic_with_error!(&env, FactoryError::AlreadyInitialized);
        }

        admin.require_auth();

        let storage = env.storage().instance();
        storage.set(&DataKey::Admin, &admin);
        storage.set(&DataKey::PoolWasmHash, &pool_wasm_hash);
        storage.set(&DataKey::OracleRegistry, &oracle_registry);
        storage.set(&DataKey::ObservationCardinalityMin, &observation_cardinality_min);
        storage.set(&DataKey::Native, &native);
        storage.set(&DataKey::RewardBaseFee, &reward_base_fee);
        storage.set(&DataKey::PoolCount, &0u32);

        extend_instance_ttl(&env);
        events::emit_initialize(&env, &admin, &pool_wasm_hash);
    }

    /// Deploy a pool for the pair at `maintenance`, priced against the
    /// registry's feed for `oracle_fee`.
    /// Returns the pool contract address
    pub fn create_pool(
        env: Env,
        token_a: Address,
        token_b: Address,
        maintenance: u32,
        oracle_fee: u32,
    ) -> Address {
        let (token0, token1) = sort_tokens(&env, token_a, token_b);

        if !is_valid_maintenance(maintenance) {
            panic_with_error!(&env, FactoryError::InvalidMaintenance);
        }

        let registry: Address = get_instance(&env, &DataKey::OracleRegistry);
        let oracle = OracleRegistryClient::new(&env, &registry)
            .get_pool(&token0, &token1, &oracle_fee)
            .unwrap_or_else(|| panic_with_error!(&env, FactoryError::InvalidOracle));

        // Feed must be able to serve the full averaging window
        let cardinality_min: u32 = get_instance(&env, &DataKey::ObservationCardinalityMin);
        let feed = ReferenceFeedClient::new(&env, &oracle);
        if feed.slot0().observation_cardinality_next < cardinality_min {
            feed.increase_cardinality_next(&cardinality_min);
            if feed.slot0().observation_cardinality_next < cardinality_min {
                panic_with_error!(&env, FactoryError::InvalidObservationCardinality);
            }
        }

        let key = PoolKey {
            token0,
            token1,
            maintenance,
            oracle,
        };
        let pool_key = DataKey::Pool(key.clone());
        if env.storage().persistent().has(&pool_key) {
            panic_with_error!(&env, FactoryError::PoolAlreadyExists);
        }

        let config = PoolConfig {
            factory: env.current_contract_address(),
            token0: key.token0.clone(),
            token1: key.token1.clone(),
            maintenance,
            oracle: key.oracle.clone(),
            native: get_instance(&env, &DataKey::Native),
            reward_base_fee: get_instance(&env, &DataKey::RewardBaseFee),
        };
        let pool_wasm_hash: BytesN<32> = get_instance(&env, &DataKey::PoolWasmHash);
        let pool_address = env
            .deployer()
            .with_current_contract(salt(&env, &key))
            .deploy_v2(pool_wasm_hash, (config,));

        // Store pool address by key
        env.storage().persistent().set(&pool_key, &pool_address);
        extend_persistent_ttl(&env, &pool_key);

        let is_pool_key = DataKey::IsPool(pool_address.clone());
        env.storage().persistent().set(&is_pool_key, &true);
        extend_persistent_ttl(&env, &is_pool_key);

        // Store pool at index (indexed storage - O(1) append)
        let pool_count = Self::get_pool_count(env.clone());
        let pool_at_key = DataKey::PoolAt(pool_count);
        env.storage().persistent().set(&pool_at_key, &pool_address);
        extend_persistent_ttl(&env, &pool_at_key);

        env.storage()
            .instance()
            .set(&DataKey::PoolCount, &(pool_count + 1));

        events::emit_pool_created(&env, &key, &pool_address);

        extend_instance_ttl(&env);
        pool_address
    }

    /// Get pool address for the key, in either token order
    pub fn get_pool(
        env: Env,
        token_a: Address,
        token_b: Address,
        maintenance: u32,
        oracle: Address,
    ) -> Option<Address> {
        let (token0, token1) = sort_tokens(&env, token_a, token_b);
        let key = PoolKey {
            token0,
            token1,
            maintenance,
            oracle,
        };
        env.storage().persistent().get(&DataKey::Pool(key))
    }

    /// Address the pool for this key is (or would be) deployed at
    pub fn pool_address(
        env: Env,
        token_a: Address,
        token_b: Address,
        maintenance: u32,
        oracle: Address,
    ) -> Address {
        let (token0, token1) = sort_tokens(&env, token_a, token_b);
        let key = PoolKey {
            token0,
            token1,
            maintenance,
            oracle,
        };
        env.deployer()
            .with_current_contract(salt(&env, &key))
            .deployed_address()
    }

    /// Whether `pool` was deployed by this factory
    pub fn is_pool(env: Env, pool: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::IsPool(pool))
            .unwrap_or(false)
    }

    /// Get total number of pools created
    pub fn get_pool_count(env: Env) -> u32 {
        extend_instance_ttl(&env);
        env.storage()
            .instance()
            .get(&DataKey::PoolCount)
            .unwrap_or(0)
    }

    /// Get pool address at specific index
    pub fn get_pool_at(env: Env, index: u32) -> Option<Address> {
        env.storage().persistent().get(&DataKey::PoolAt(index))
    }

    /// Get up to `limit` pools starting from `start_index`
    pub fn get_pools_paginated(env: Env, start_index: u32, limit: u32) -> Vec<Address> {
        let pool_count = Self::get_pool_count(env.clone());
        let end_index = start_index
            .saturating_add(limit.min(PAGE_LIMIT))
            .min(pool_count);

        let mut pools: Vec<Address> = Vec::new(&env);
        for i in start_index..end_index {
            if let Some(pool) = env.storage().persistent().get(&DataKey::PoolAt(i)) {
                pools.push_back(pool);
            }
        }
        pools
    }

    pub fn get_admin(env: Env) -> Address {
        get_instance(&env, &DataKey::Admin)
    }

    pub fn get_pool_wasm_hash(env: Env) -> BytesN<32> {
        get_instance(&env, &DataKey::PoolWasmHash)
    }

    pub fn get_oracle_registry(env: Env) -> Address {
        get_instance(&env, &DataKey::OracleRegistry)
    }

    pub fn get_observation_cardinality_min(env: Env) -> u32 {
        get_instance(&env, &DataKey::ObservationCardinalityMin)
    }
}

fn sort_tokens(env: &Env, token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a == token_b {
        panic_with_error!(env, FactoryError::IdenticalTokens);
    }
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// Deployment salt: sha256 of the XDR-encoded pool key
fn salt(env: &Env, key: &PoolKey) -> BytesN<32> {
    env.crypto().sha256(&key.clone().to_xdr(env)).into()
}

fn get_instance<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> V {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(key)
        .unwrap_or_else(|| panic_with_error!(env, FactoryError::NotInitialized))
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    fn setup_factory(env: &Env) -> (Address, MarginFactoryClient<'_>) {
        env.mock_all_auths();
        let admin = Address::generate(env);
        let contract_id = env.register(MarginFactory, ());
        let client = MarginFactoryClient::new(env, &contract_id);
        client.initialize(
            &admin,
            &BytesN::from_array(env, &[1u8; 32]),
            &Address::generate(env),
            &7_200,
            &Address::generate(env),
            &100,
        );
        (admin, client)
    }

    #[test]
    fn test_initialize_factory() {
        let env = Env::default();
        let (admin, client) = setup_factory(&env);

        assert_eq!(client.get_admin(), admin);
        assert_eq!(client.get_pool_wasm_hash(), BytesN::from_array(&env, &[1u8; 32]));
        assert_eq!(client.get_observation_cardinality_min(), 7_200);
        assert_eq!(client.get_pool_count(), 0);
    }

    #[test]
    fn test_initialize_twice_fails() {
        let env = Env::default();
        let (admin, client) = setup_factory(&env);

        let result = client.try_initialize(
            &admin,
            &BytesN::from_array(&env, &[2u8; 32]),
            &Address::generate(&env),
            &7_200,
            &Address::generate(&env),
            &100,
        );
        assert_eq!(result, Err(Ok(FactoryError::AlreadyInitialized.into())));
    }

    #[test]
    fn test_uninitialized_reads_fail() {
        let env = Env::default();
        let contract_id = env.register(MarginFactory, ());
        let client = MarginFactoryClient::new(&env, &contract_id);

        assert_eq!(client.try_get_admin(), Err(Ok(FactoryError::NotInitialized.into())));
        assert_eq!(client.get_pool_count(), 0);
    }

    #[test]
    fn test_empty_registry_queries() {
        let env = Env::default();
        let (_, client) = setup_factory(&env);
        let token_a = Address::generate(&env);
        let token_b = Address::generate(&env);
        let oracle = Address::generate(&env);

        assert!(client.get_pool(&token_a, &token_b, &250_000, &oracle).is_none());
        assert!(client.get_pool_at(&0).is_none());
        assert_eq!(client.get_pools_paginated(&0, &10).len(), 0);
        assert!(!client.is_pool(&oracle));
    }

    #[test]
    fn test_identical_tokens_rejected() {
        let env = Env::default();
        let (_, client) = setup_factory(&env);
        let token = Address::generate(&env);

        let result = client.try_create_pool(&token, &token, &250_000, &3_000);
        assert_eq!(result, Err(Ok(FactoryError::IdenticalTokens.into())));
    }

    #[test]
    fn test_maintenance_tiers() {
        let env = Env::default();
        let (_, client) = setup_factory(&env);
        let token_a = Address::generate(&env);
        let token_b = Address::generate(&env);

        for maintenance in [0u32, 100_000, 250_001, 2_000_000] {
            let result = client.try_create_pool(&token_a, &token_b, &maintenance, &3_000);
            assert_eq!(result, Err(Ok(FactoryError::InvalidMaintenance.into())));
        }
    }
}
