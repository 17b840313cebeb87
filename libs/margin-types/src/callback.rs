use soroban_sdk::{contractclient, Address, Bytes, Env};

/// Implemented by contracts that fund pool operations.
///
/// Positive amounts are owed to the pool. Anything the pool owes the caller
/// has already been transferred when the callback runs. After the callback
/// returns, the pool checks its own balances.
#[contractclient(name = "PaymentCallbackClient")]
pub trait PaymentCallback {
    fn margin_mint_callback(env: Env, sender: Address, amount0: i128, amount1: i128, data: Bytes);

    fn margin_swap_callback(env: Env, sender: Address, amount0: i128, amount1: i128, data: Bytes);

    fn margin_open_callback(env: Env, sender: Address, amount0: i128, amount1: i128, data: Bytes);

    fn margin_lock_callback(env: Env, sender: Address, amount0: i128, amount1: i128, data: Bytes);

    fn margin_settle_callback(env: Env, sender: Address, amount0: i128, amount1: i128, data: Bytes);
}
