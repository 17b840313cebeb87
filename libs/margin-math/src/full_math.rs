use soroban_sdk::{Env, U256};

/// (a * b) / denominator with a 256-bit intermediate, rounded down
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    let (quotient, _) = mul_div_rem(env, a, b, denominator);
    u128_from_u256(&quotient)
}

/// ceil((a * b) / denominator) with a 256-bit intermediate
pub fn mul_div_rounding_up(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    let (quotient, remainder) = mul_div_rem(env, a, b, denominator);
    let quotient = u128_from_u256(&quotient);
    if remainder > U256::from_u32(env, 0) {
        match quotient.checked_add(1) {
            Some(v) => v,
            None => panic!("U256 overflow when converting to u128"),
        }
    } else {
        quotient
    }
}

/// Floor quotient and remainder of (a * b) / denominator
pub fn mul_div_rem(env: &Env, a: u128, b: u128, denominator: u128) -> (U256, U256) {
    if denominator == 0 {
        panic!("Division by zero");
    }
    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    let denominator = U256::from_u128(env, denominator);
    (product.div(&denominator), product.rem_euclid(&denominator))
}

fn u256_max(env: &Env) -> U256 {
    U256::from_parts(env, u64::MAX, u64::MAX, u64::MAX, u64::MAX)
}

/// a * b, or None past 2^256 - 1
pub fn checked_mul_u256(env: &Env, a: &U256, b: &U256) -> Option<U256> {
    let zero = U256::from_u32(env, 0);
    if *a == zero || *b <= u256_max(env).div(a) {
        Some(a.mul(b))
    } else {
        None
    }
}

/// a + b, or None past 2^256 - 1
pub fn checked_add_u256(env: &Env, a: &U256, b: &U256) -> Option<U256> {
    if *b <= u256_max(env).sub(a) {
        Some(a.add(b))
    } else {
        None
    }
}

/// Convert U256 to u128, panics if overflow
pub fn u128_from_u256(value: &U256) -> u128 {
    match value.to_u128() {
        Some(v) => v,
        None => panic!("U256 overflow when converting to u128"),
    }
}

/// Unsigned division with rounding up
pub fn div_rounding_up(a: u128, b: u128) -> u128 {
    if b == 0 {
        panic!("Division by zero");
    }
    if a == 0 {
        return 0;
    }
    (a - 1) / b + 1
}

/// U256 division with rounding up
pub fn div_rounding_up_u256(env: &Env, a: &U256, b: &U256) -> U256 {
    let zero = U256::from_u32(env, 0);
    if *b == zero {
        panic!("Division by zero");
    }
    let quotient = a.div(b);
    if a.rem_euclid(b) > zero {
        quotient.add(&U256::from_u32(env, 1))
    } else {
        quotient
    }
}

/// floor(sqrt(x)) by Newton's method, seeded above the root
pub fn sqrt(env: &Env, x: &U256) -> U256 {
    let zero = U256::from_u32(env, 0);
    if *x == zero {
        return zero;
    }

    let mut bits = 0u32;
    let mut rest = x.clone();
    while rest > zero {
        rest = rest.shr(1);
        bits += 1;
    }

    // 2^ceil(bits / 2) >= sqrt(x)
    let mut z = U256::from_u32(env, 1).shl((bits + 1) / 2);
    loop {
        let y = z.add(&x.div(&z)).shr(1);
        if y >= z {
            return z;
        }
        z = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::Env;

    #[test]
    fn test_mul_div_rounds_down() {
        let env = Env::default();
        assert_eq!(mul_div(&env, 10, 20, 5), 40);
        assert_eq!(mul_div(&env, 3, 1, 2), 1);
        assert_eq!(mul_div(&env, 0, 100, 50), 0);
    }

    #[test]
    fn test_mul_div_phantom_overflow() {
        let env = Env::default();
        // a * b overflows u128 but the quotient fits
        let q96 = 1u128 << 96;
        assert_eq!(mul_div(&env, q96, q96, q96), q96);
        assert_eq!(mul_div(&env, u128::MAX, u128::MAX, u128::MAX), u128::MAX);
    }

    #[test]
    fn test_mul_div_rounding_up_adds_one_on_remainder() {
        let env = Env::default();
        assert_eq!(mul_div_rounding_up(&env, 10, 20, 5), 40);
        assert_eq!(mul_div(&env, 7, 11, 13), 5);
        assert_eq!(mul_div_rounding_up(&env, 7, 11, 13), 6);
    }

    #[test]
    #[should_panic(expected = "Division by zero")]
    fn test_mul_div_zero_denominator() {
        let env = Env::default();
        mul_div(&env, 10, 20, 0);
    }

    #[test]
    #[should_panic(expected = "U256 overflow when converting to u128")]
    fn test_mul_div_result_overflow() {
        let env = Env::default();
        mul_div(&env, u128::MAX, 2, 1);
    }

    #[test]
    fn test_checked_u256_ops_stop_at_the_boundary() {
        let env = Env::default();
        let half = U256::from_u32(&env, 1).shl(128);
        assert!(checked_mul_u256(&env, &half, &half).is_none());
        let below = U256::from_u128(&env, u128::MAX);
        assert_eq!(
            checked_mul_u256(&env, &below, &half),
            Some(below.mul(&half))
        );
        assert_eq!(
            checked_mul_u256(&env, &U256::from_u32(&env, 0), &half),
            Some(U256::from_u32(&env, 0))
        );

        let max = below.mul(&half).add(&below);
        let one = U256::from_u32(&env, 1);
        assert!(checked_add_u256(&env, &max, &one).is_none());
        assert_eq!(checked_add_u256(&env, &max.sub(&one), &one), Some(max));
    }

    #[test]
    fn test_div_rounding_up() {
        assert_eq!(div_rounding_up(9, 3), 3);
        assert_eq!(div_rounding_up(10, 3), 4);
        assert_eq!(div_rounding_up(0, 5), 0);
        assert_eq!(div_rounding_up(u128::MAX, 1), u128::MAX);
    }

    #[test]
    fn test_div_rounding_up_u256() {
        let env = Env::default();
        let a = U256::from_u32(&env, 10);
        let b = U256::from_u32(&env, 3);
        assert_eq!(div_rounding_up_u256(&env, &a, &b), U256::from_u32(&env, 4));
        let a = U256::from_u32(&env, 9);
        assert_eq!(div_rounding_up_u256(&env, &a, &b), U256::from_u32(&env, 3));
    }

    #[test]
    fn test_sqrt_small_values() {
        let env = Env::default();
        for (x, root) in [(0u32, 0u32), (1, 1), (2, 1), (3, 1), (4, 2), (15, 3), (16, 4), (99, 9)] {
            assert_eq!(
                sqrt(&env, &U256::from_u32(&env, x)),
                U256::from_u32(&env, root)
            );
        }
    }

    #[test]
    fn test_sqrt_of_square_is_exact() {
        let env = Env::default();
        let root = U256::from_u128(&env, u128::MAX);
        let square = root.mul(&root);
        assert_eq!(sqrt(&env, &square), root);
        let one = U256::from_u32(&env, 1);
        assert_eq!(sqrt(&env, &square.sub(&one)), root.sub(&one));
    }
}
