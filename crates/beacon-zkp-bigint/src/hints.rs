//! Native witness-computation helpers ("hints", per the design notes: they live next to the
//! constraint emitters but are NOT part of the constraint set themselves; every value they
//! produce is re-checked by downstream constraints).

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer as _;
use num_traits::Zero as _;

/// Packs `K` little-endian `N`-bit limbs into a single non-negative [`BigUint`].
#[must_use]
pub fn limbs_to_biguint(limbs: &[u64], n_bits: u32) -> BigUint {
    let mut acc = BigUint::zero();
    for (i, &limb) in limbs.iter().enumerate() {
        acc += BigUint::from(limb) << (n_bits * u32::try_from(i).unwrap_or(u32::MAX));
    }
    acc
}

/// Splits a non-negative integer into `k` little-endian `n_bits`-bit limbs, left-padding with
/// zero limbs if the value is shorter than `k` limbs.
///
/// # Panics
/// Panics if `value` does not fit in `k * n_bits` bits.
#[must_use]
pub fn biguint_to_limbs(value: &BigUint, k: usize, n_bits: u32) -> Vec<u64> {
    let mask = (BigUint::from(1_u8) << n_bits) - BigUint::from(1_u8);
    let mut remaining = value.clone();
    let mut limbs = Vec::with_capacity(k);
    for _ in 0..k {
        let limb = &remaining & &mask;
        limbs.push(
            limb.iter_u64_digits().next().unwrap_or(0), // a single N<=126-bit limb fits in u64 only up to 64 bits; callers with N<=55 are safe
        );
        remaining >>= n_bits;
    }
    assert!(remaining.is_zero(), "value does not fit in k*n_bits bits");
    limbs
}

/// Native long division: returns `(quotient, remainder)` such that `a = quotient * b +
/// remainder` and `0 <= remainder < b`. This is the unconstrained hint consumed by `BigMod`;
/// the caller is responsible for constraining the identity afterward.
///
/// # Panics
/// Panics if `b` is zero.
#[must_use]
pub fn long_div(a: &BigUint, b: &BigUint) -> (BigUint, BigUint) {
    assert!(!b.is_zero(), "division by zero");
    a.div_rem(b)
}

/// Native modular inverse hint for `BigModInv`: returns `a^{-1} mod p`, or `None` if `a` is
/// not invertible mod `p` (i.e. `gcd(a, p) != 1`).
#[must_use]
pub fn mod_inv(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a_signed = BigInt::from_biguint(Sign::Plus, a.clone());
    let p_signed = BigInt::from_biguint(Sign::Plus, p.clone());
    let (gcd, x, _y) = extended_gcd(&a_signed, &p_signed);
    if gcd != BigInt::from(1) {
        return None;
    }
    let p_i = BigInt::from_biguint(Sign::Plus, p.clone());
    let inv = ((x % &p_i) + &p_i) % &p_i;
    inv.to_biguint()
}

/// Textbook extended Euclidean algorithm, returning `(gcd, x, y)` with `a*x + b*y = gcd`.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        return (a.clone(), BigInt::from(1), BigInt::from(0));
    }
    let (quotient, remainder) = a.div_rem(b);
    let (gcd, x1, y1) = extended_gcd(b, &remainder);
    let y = x1 - quotient * &y1;
    (gcd, y1, y)
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use num_traits::Num as _;

    use super::{biguint_to_limbs, limbs_to_biguint, long_div, mod_inv};

    #[test]
    fn limb_round_trip() {
        let value = BigUint::from(0x1234_5678_9abc_u64);
        let limbs = biguint_to_limbs(&value, 7, 16);
        let restored = limbs_to_biguint(&limbs, 16);
        assert_eq!(restored, value);
    }

    #[test]
    fn long_div_identity_holds() {
        let a = BigUint::from(123_456_789_u64);
        let b = BigUint::from(4_567_u64);
        let (q, r) = long_div(&a, &b);
        assert_eq!(&q * &b + &r, a);
        assert!(r < b);
    }

    #[test]
    fn mod_inv_round_trips() {
        let p = BigUint::from_str_radix(
            "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaaab",
            16,
        )
        .expect("valid hex prime");
        let a = BigUint::from(7_u64);
        let inv = mod_inv(&a, &p).expect("7 is invertible mod a prime");
        assert_eq!((&a * &inv) % &p, BigUint::from(1_u8));
    }
}
