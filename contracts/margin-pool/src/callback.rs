use crate::error::PoolError;
use margin_types::{PaymentCallbackClient, PoolConfig};
use soroban_sdk::{panic_with_error, token, Address, Bytes, Env};

/// Which pool operation is asking the caller to pay
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Payment {
    Mint,
    Swap,
    Open,
    Lock,
    Settle,
}

/// Collect what the pool is owed through the caller's callback contract.
///
/// Positive amounts are owed to the pool. Whatever the pool pays out has to be
/// transferred before this runs. Fails unless the pool's balance of every owed
/// token rose by at least the amount owed.
pub fn collect(
    env: &Env,
    config: &PoolConfig,
    callback: &Address,
    payment: Payment,
    sender: &Address,
    amount0: i128,
    amount1: i128,
    data: &Bytes,
) {
    let pool = env.current_contract_address();
    let token0 = token::Client::new(env, &config.token0);
    let token1 = token::Client::new(env, &config.token1);
    let balance0_before = if amount0 > 0 { token0.balance(&pool) } else { 0 };
    let balance1_before = if amount1 > 0 { token1.balance(&pool) } else { 0 };

    let client = PaymentCallbackClient::new(env, callback);
    match payment {
        Payment::Mint => client.margin_mint_callback(sender, &amount0, &amount1, data),
        Payment::Swap => client.margin_swap_callback(sender, &amount0, &amount1, data),
        Payment::Open => client.margin_open_callback(sender, &amount0, &amount1, data),
        Payment::Lock => client.margin_lock_callback(sender, &amount0, &amount1, data),
        Payment::Settle => client.margin_settle_callback(sender, &amount0, &amount1, data),
    }

    if amount0 > 0 && token0.balance(&pool) < balance0_before + amount0 {
        panic_with_error!(env, PoolError::InsufficientPayment0);
    }
    if amount1 > 0 && token1.balance(&pool) < balance1_before + amount1 {
        panic_with_error!(env, PoolError::InsufficientPayment1);
    }
}

/// Pay `amount` of `token` out of the pool, skipping empty transfers
pub fn pay(env: &Env, token: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        token::Client::new(env, token).transfer(&env.current_contract_address(), to, &amount);
    }
}
