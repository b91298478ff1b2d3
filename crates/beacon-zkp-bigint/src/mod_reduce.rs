//! `BigMod`/`BigModInv`/`PrimeReduce`/`SignedFpCarryModP`/`CheckCarryToZero`: reduction modulo
//! the BLS12-381 base prime. These gadgets all follow the same shape: compute an
//! unconstrained witness hint (quotient, remainder, or inverse) natively via
//! [`crate::hints`], allocate it, and then re-derive the identity it must satisfy inside the
//! constraint system so the hint cannot be forged.

use bellman::gadgets::boolean::Boolean;
use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;

use crate::add_sub::{BigIntCanonical, big_less_than, big_sub};
use crate::hints::{biguint_to_limbs, limbs_to_biguint, long_div, mod_inv};
use crate::mult::big_mult_short_long;
use crate::num_codec::assert_signed_range;
use crate::params::N;

/// Bound (in bits) used to range-check the small quotient produced while folding a multiple of
/// `p` out of a signed limb array. `K` limbs of `N` bits each easily bound any quotient that
/// arises from subtracting at most a handful of `p`-sized terms.
const QUOTIENT_BOUND_BITS: u32 = 16;

/// Reads a limb back as a signed 128-bit integer. Every limb this module allocates is built
/// from an explicit signed hint (never from field wraparound), so the field element's own
/// canonical byte encoding never needs sign-flipping here: the negative case is produced by
/// [`scalar_from_signed`] constructing `-Scalar::from(magnitude)` directly, and `to_bytes`
/// on that value round-trips through `bls12_381::Scalar`'s `Neg` impl, not two's complement.
fn native_limb_value(limb: &AllocatedNum<Scalar>) -> Option<i128> {
    limb.get_value().map(|value| {
        let neg = -value;
        let neg_bytes = neg.to_bytes();
        let mut neg_buf = [0_u8; 16];
        neg_buf.copy_from_slice(&neg_bytes[..16]);
        let neg_magnitude = u128::from_le_bytes(neg_buf);

        let pos_bytes = value.to_bytes();
        let mut pos_buf = [0_u8; 16];
        pos_buf.copy_from_slice(&pos_bytes[..16]);
        let pos_magnitude = u128::from_le_bytes(pos_buf);

        if pos_magnitude <= neg_magnitude {
            pos_magnitude as i128
        } else {
            -(neg_magnitude as i128)
        }
    })
}

/// Proves that a sequence of signed `N`-bit-ish limbs represents the integer `0`, by propagating
/// carries (which may go negative) left to right and requiring the final carry to vanish.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn check_carry_to_zero<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    signed_limbs: &[AllocatedNum<Scalar>],
    carry_bound_bits: u32,
) -> Result<(), SynthesisError> {
    let shift = Scalar::from(1_u64 << N);
    let mut carry = AllocatedNum::alloc(cs.namespace(|| "initial carry"), || Ok(Scalar::ZERO))?;
    cs.enforce(
        || "initial carry is zero",
        |lc| lc + carry.get_variable(),
        |lc| lc + CS::one(),
        |lc| lc,
    );

    for (i, limb) in signed_limbs.iter().enumerate() {
        let mut cs = cs.namespace(|| format!("fold limb {i}"));

        let current = native_limb_value(limb).zip(native_limb_value(&carry)).map(|(l, c)| l + c);
        let next_carry_value = current.map(|v| {
            // `v` must be divisible by 2^N once the low bits settle to zero; this gadget is
            // only ever invoked on limb arrays constructed so that low-order bits cancel
            // exactly, which the constraint below verifies.
            div_floor_pow2(v, N)
        });

        let is_last = i + 1 == signed_limbs.len();
        let next_carry = if is_last {
            AllocatedNum::alloc(cs.namespace(|| "final carry"), || Ok(Scalar::ZERO))?
        } else {
            AllocatedNum::alloc(cs.namespace(|| "next carry"), || {
                next_carry_value
                    .map(scalar_from_signed)
                    .ok_or(SynthesisError::AssignmentMissing)
            })?
        };

        cs.enforce(
            || "limb + carry = next_carry * 2^N",
            |lc| lc + limb.get_variable() + carry.get_variable(),
            |lc| lc + CS::one(),
            |lc| lc + (shift, next_carry.get_variable()),
        );

        if !is_last {
            assert_signed_range(cs.namespace(|| "range check carry"), &next_carry, carry_bound_bits)?;
        }
        carry = next_carry;
    }

    cs.enforce(
        || "final carry vanishes",
        |lc| lc + carry.get_variable(),
        |lc| lc + CS::one(),
        |lc| lc,
    );
    Ok(())
}

fn div_floor_pow2(value: i128, n: u32) -> i128 {
    let divisor = 1_i128 << n;
    value.div_euclid(divisor)
}

fn scalar_from_signed(value: i128) -> Scalar {
    if value >= 0 {
        Scalar::from(u64::try_from(value).unwrap_or(0))
    } else {
        -Scalar::from(u64::try_from(-value).unwrap_or(0))
    }
}

/// Proves that the big integer represented by `signed_limbs` is congruent to `0 mod p`, by
/// folding out a small quotient `q` (`signed_limbs - q * p`) and reducing the remainder to
/// literal zero with [`check_carry_to_zero`].
///
/// The folded value must stay within `2^QUOTIENT_BOUND_BITS` multiples of `p`; the quotient is
/// range-checked to that bound, so a value further from zero is unsatisfiable by construction.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn signed_fp_carry_mod_p<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    signed_limbs: &[AllocatedNum<Scalar>],
    prime_limbs: &[u64],
) -> Result<(), SynthesisError> {
    use num_bigint::BigInt;
    use num_integer::Integer as _;

    let value = signed_limbs
        .iter()
        .enumerate()
        .try_fold(BigInt::from(0), |acc, (i, limb)| {
            native_limb_value(limb).map(|v| acc + (BigInt::from(v) << (N as usize * i)))
        });
    let prime_value = prime_limbs
        .iter()
        .enumerate()
        .fold(BigInt::from(0), |acc, (i, &limb)| acc + (BigInt::from(limb) << (N as usize * i)));

    // Floor division matches Euclidean division here because the modulus is positive.
    let quotient_value = value
        .map(|v| v.div_floor(&prime_value))
        .map(|q| i128::try_from(&q).unwrap_or(0));
    let quotient = AllocatedNum::alloc(cs.namespace(|| "quotient"), || {
        quotient_value.map(scalar_from_signed).ok_or(SynthesisError::AssignmentMissing)
    })?;
    assert_signed_range(cs.namespace(|| "range check quotient"), &quotient, QUOTIENT_BOUND_BITS)?;

    let mut adjusted = Vec::with_capacity(signed_limbs.len());
    for (i, limb) in signed_limbs.iter().enumerate() {
        let mut cs = cs.namespace(|| format!("adjust limb {i}"));
        let prime_limb = prime_limbs.get(i).copied().unwrap_or(0);

        let term_value = quotient
            .get_value()
            .map(|q| -(q * Scalar::from(prime_limb)));
        let term = AllocatedNum::alloc(cs.namespace(|| "minus q*p_i"), || {
            term_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        cs.enforce(
            || "term = -(q * p_i)",
            |lc| lc + quotient.get_variable(),
            |lc| lc - (Scalar::from(prime_limb), CS::one()),
            |lc| lc + term.get_variable(),
        );

        let adjusted_value = limb.get_value().zip(term.get_value()).map(|(l, t)| l + t);
        let adjusted_limb = AllocatedNum::alloc(cs.namespace(|| "adjusted limb"), || {
            adjusted_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        cs.enforce(
            || "adjusted = limb + term",
            |lc| lc + limb.get_variable() + term.get_variable(),
            |lc| lc + CS::one(),
            |lc| lc + adjusted_limb.get_variable(),
        );
        adjusted.push(adjusted_limb);
    }

    check_carry_to_zero(cs.namespace(|| "fold to zero"), &adjusted, QUOTIENT_BOUND_BITS + N)
}

/// Reduces a `K+1`-limb value known to be smaller than `2p` to its canonical `K`-limb
/// representative, by a single conditional subtraction of `p`.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn prime_reduce<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &BigIntCanonical,
    prime: &BigIntCanonical,
) -> Result<BigIntCanonical, SynthesisError> {
    let k = prime.len();
    assert!(value.len() >= k, "value must have at least as many limbs as the modulus");

    let padded_prime = BigIntCanonical {
        limbs: {
            let mut limbs = prime.limbs.clone();
            for pad_idx in 0..value.len().saturating_sub(prime.len()) {
                limbs.push(AllocatedNum::alloc(cs.namespace(|| format!("zero pad {pad_idx}")), || {
                    Ok(Scalar::ZERO)
                })?);
            }
            limbs
        },
    };

    let less_than_p = big_less_than(cs.namespace(|| "value < p"), value, &padded_prime)?;
    let (diff, _underflow) = big_sub(cs.namespace(|| "value - p"), value, &padded_prime)?;

    let mut result_limbs = Vec::with_capacity(k);
    for i in 0..k {
        let mut cs = cs.namespace(|| format!("select limb {i}"));
        let selected = conditionally_select(
            cs.namespace(|| "select"),
            &less_than_p,
            &value.limbs[i],
            &diff.limbs[i],
        )?;
        result_limbs.push(selected);
    }

    Ok(BigIntCanonical { limbs: result_limbs })
}

fn conditionally_select<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    condition: &Boolean,
    if_true: &AllocatedNum<Scalar>,
    if_false: &AllocatedNum<Scalar>,
) -> Result<AllocatedNum<Scalar>, SynthesisError> {
    let result_value = match condition.get_value() {
        Some(true) => if_true.get_value(),
        Some(false) => if_false.get_value(),
        None => None,
    };
    let result = AllocatedNum::alloc(cs.namespace(|| "selected"), || {
        result_value.ok_or(SynthesisError::AssignmentMissing)
    })?;

    // result = if_false + condition * (if_true - if_false)
    cs.enforce(
        || "select via condition * (true - false)",
        |_| condition.lc(CS::one(), Scalar::ONE),
        |lc| lc + if_true.get_variable() - if_false.get_variable(),
        |lc| lc + result.get_variable() - if_false.get_variable(),
    );
    Ok(result)
}

/// Computes `a mod p` for a `2K`-limb value `a` (typically the output of [`crate::mult::big_mult`])
/// and a `K`-limb prime `p`, returning the canonical `K`-limb remainder.
///
/// The quotient and remainder are computed natively via [`long_div`] and then re-checked inside
/// the circuit by constructing `a - quotient * p - remainder` as a signed limb array and folding
/// it to zero.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn big_mod<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &BigIntCanonical,
    prime: &BigIntCanonical,
    prime_limbs_native: &[u64],
) -> Result<BigIntCanonical, SynthesisError> {
    let a_native: Option<Vec<u64>> = a
        .limbs
        .iter()
        .map(|limb| limb.get_value().map(|v| u64::from_le_bytes(v.to_bytes()[..8].try_into().unwrap_or([0; 8]))))
        .collect();

    let (quotient_native, remainder_native) = match a_native {
        Some(limbs) => {
            let a_big = limbs_to_biguint(&limbs, N);
            let p_big = limbs_to_biguint(prime_limbs_native, N);
            let (q, r) = long_div(&a_big, &p_big);
            (Some(q), Some(r))
        }
        None => (None, None),
    };

    let k = prime.len();
    let quotient_limbs = quotient_native.as_ref().map(|q| biguint_to_limbs(q, k, N));
    let remainder_limbs = remainder_native.as_ref().map(|r| biguint_to_limbs(r, k, N));

    let quotient = BigIntCanonical {
        limbs: (0..k)
            .map(|i| {
                AllocatedNum::alloc(cs.namespace(|| format!("quotient limb {i}")), || {
                    quotient_limbs
                        .as_ref()
                        .map(|limbs| Scalar::from(limbs[i]))
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<_, _>>()?,
    };
    for (i, limb) in quotient.limbs.iter().enumerate() {
        crate::num_codec::num_to_bits(
            cs.namespace(|| format!("range check quotient limb {i}")),
            limb,
            N as usize,
        )?;
    }
    let remainder = BigIntCanonical {
        limbs: (0..k)
            .map(|i| {
                AllocatedNum::alloc(cs.namespace(|| format!("remainder limb {i}")), || {
                    remainder_limbs
                        .as_ref()
                        .map(|limbs| Scalar::from(limbs[i]))
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<_, _>>()?,
    };

    let qp_long = big_mult_short_long(cs.namespace(|| "quotient * p"), &quotient, prime)?;

    let len = a.len().max(qp_long.len()).max(remainder.len());
    let mut signed_limbs = Vec::with_capacity(len);
    for i in 0..len {
        let mut cs = cs.namespace(|| format!("combine limb {i}"));
        let a_i = a.limbs.get(i);
        let qp_i = qp_long.get(i);
        let r_i = remainder.limbs.get(i);

        let mut acc_value = Some(Scalar::ZERO);
        let mut lc = bellman::LinearCombination::<Scalar>::zero();
        if let Some(a_i) = a_i {
            lc = lc + a_i.get_variable();
            acc_value = acc_value.zip(a_i.get_value()).map(|(acc, v)| acc + v);
        }
        if let Some(qp_i) = qp_i {
            lc = lc - qp_i.get_variable();
            acc_value = acc_value.zip(qp_i.get_value()).map(|(acc, v)| acc - v);
        }
        if let Some(r_i) = r_i {
            lc = lc - r_i.get_variable();
            acc_value = acc_value.zip(r_i.get_value()).map(|(acc, v)| acc - v);
        }

        let combined = AllocatedNum::alloc(cs.namespace(|| "combined"), || {
            acc_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        cs.enforce(
            || "combined = a - q*p - r (per limb)",
            |_| lc,
            |lc| lc + CS::one(),
            |lc| lc + combined.get_variable(),
        );
        signed_limbs.push(combined);
    }

    check_carry_to_zero(cs.namespace(|| "a - q*p - r folds to zero"), &signed_limbs, QUOTIENT_BOUND_BITS + N)?;

    for (i, limb) in remainder.limbs.iter().enumerate() {
        crate::num_codec::num_to_bits(
            cs.namespace(|| format!("range check remainder limb {i}")),
            limb,
            N as usize,
        )?;
    }
    let below_modulus = big_less_than(cs.namespace(|| "remainder < p"), &remainder, prime)?;
    Boolean::enforce_equal(
        cs.namespace(|| "remainder is canonical"),
        &below_modulus,
        &Boolean::constant(true),
    )?;

    Ok(remainder)
}

/// Computes the modular inverse `a^{-1} mod p`, verified by reducing the full product
/// `a * result` back modulo `p` with [`big_mod`] and requiring the remainder to be the literal
/// constant `1`.
///
/// # Errors
/// Returns [`SynthesisError`] if `a` has no inverse mod `p`, or on constraint failure.
pub fn big_mod_inv<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &BigIntCanonical,
    prime_limbs_native: &[u64],
) -> Result<BigIntCanonical, SynthesisError> {
    let k = a.len();
    let a_native: Option<Vec<u64>> = a
        .limbs
        .iter()
        .map(|limb| limb.get_value().map(|v| u64::from_le_bytes(v.to_bytes()[..8].try_into().unwrap_or([0; 8]))))
        .collect();

    let inverse_native = a_native.map(|limbs| {
        let a_big = limbs_to_biguint(&limbs, N);
        let p_big = limbs_to_biguint(prime_limbs_native, N);
        mod_inv(&a_big, &p_big).expect("input must be invertible mod p")
    });
    let inverse_limbs = inverse_native.as_ref().map(|v| biguint_to_limbs(v, k, N));

    let inverse = BigIntCanonical {
        limbs: (0..k)
            .map(|i| {
                AllocatedNum::alloc(cs.namespace(|| format!("inverse limb {i}")), || {
                    inverse_limbs
                        .as_ref()
                        .map(|limbs| Scalar::from(limbs[i]))
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<_, _>>()?,
    };
    for (i, limb) in inverse.limbs.iter().enumerate() {
        crate::num_codec::num_to_bits(
            cs.namespace(|| format!("range check inverse limb {i}")),
            limb,
            N as usize,
        )?;
    }

    let product = crate::mult::big_mult(cs.namespace(|| "a * inverse"), a, &inverse)?;

    let prime = BigIntCanonical {
        limbs: (0..k)
            .map(|i| {
                let value = prime_limbs_native.get(i).copied().unwrap_or(0);
                AllocatedNum::alloc(cs.namespace(|| format!("prime limb {i}")), || {
                    Ok(Scalar::from(value))
                })
            })
            .collect::<Result<_, _>>()?,
    };
    let remainder = big_mod(cs.namespace(|| "a*inverse mod p"), &product, &prime, prime_limbs_native)?;

    for (i, limb) in remainder.limbs.iter().enumerate() {
        let mut cs = cs.namespace(|| format!("remainder limb {i}"));
        if i == 0 {
            cs.enforce(
                || "low remainder limb is one",
                |lc| lc + limb.get_variable(),
                |lc| lc + CS::one(),
                |lc| lc + CS::one(),
            );
        } else {
            cs.enforce(
                || "high remainder limb is zero",
                |lc| lc + limb.get_variable(),
                |lc| lc + CS::one(),
                |lc| lc,
            );
        }
    }

    Ok(inverse)
}

#[cfg(test)]
mod tests {
    use bellman::ConstraintSystem;
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bls12_381::Scalar;
    use num_bigint::BigUint;

    use super::{big_mod, big_mod_inv, prime_reduce, signed_fp_carry_mod_p};
    use crate::add_sub::BigIntCanonical;
    use crate::hints::biguint_to_limbs;
    use crate::mult::big_mult_short_long;
    use crate::params::N;

    const SMALL_PRIME: u64 = 97;

    fn small_prime_limbs() -> Vec<u64> {
        // A tiny standalone prime, decomposed into the same K=7/N=55 limb shape used
        // elsewhere, to keep these tests fast while exercising the real gadget plumbing.
        biguint_to_limbs(&BigUint::from(SMALL_PRIME), 7, N)
    }

    fn alloc_bigint<CS: ConstraintSystem<Scalar>>(mut cs: CS, value: u64, k: usize) -> BigIntCanonical {
        let limbs = biguint_to_limbs(&BigUint::from(value), k, N);
        let allocated = limbs
            .iter()
            .enumerate()
            .map(|(i, limb)| {
                AllocatedNum::alloc(cs.namespace(|| format!("limb {i}")), || Ok(Scalar::from(*limb)))
                    .expect("alloc limb")
            })
            .collect();
        BigIntCanonical { limbs: allocated }
    }

    #[test]
    fn big_mod_matches_native_remainder() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let prime_limbs = small_prime_limbs();
        let prime = alloc_bigint(cs.namespace(|| "p"), SMALL_PRIME, 7);

        let a = alloc_bigint(cs.namespace(|| "a"), 250, 7);
        let b = alloc_bigint(cs.namespace(|| "b"), 5, 7);
        let product_long = big_mult_short_long(cs.namespace(|| "a*b"), &a, &b).expect("convolution");
        let product = crate::mult::long_to_short_no_end_carry(cs.namespace(|| "compress"), &product_long)
            .expect("compress");

        let remainder =
            big_mod(cs.namespace(|| "mod"), &product, &prime, &prime_limbs).expect("mod reduce");
        assert!(cs.is_satisfied());
        assert_eq!(remainder.limbs[0].get_value(), Some(Scalar::from((250 * 5) % SMALL_PRIME)));
    }

    #[test]
    fn big_mod_inv_round_trips() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let prime_limbs = small_prime_limbs();
        let a = alloc_bigint(cs.namespace(|| "a"), 7, 7);

        let inverse = big_mod_inv(cs.namespace(|| "inv"), &a, &prime_limbs).expect("mod inv");
        assert!(cs.is_satisfied());

        let inverse_value: u64 = inverse.limbs[0]
            .get_value()
            .map(|v| u64::from_le_bytes(v.to_bytes()[..8].try_into().expect("8 bytes")))
            .expect("value");
        assert_eq!((7 * inverse_value) % SMALL_PRIME, 1);
    }

    #[test]
    fn prime_reduce_subtracts_modulus_when_needed() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let prime_limbs = small_prime_limbs();
        let prime = alloc_bigint(cs.namespace(|| "p"), SMALL_PRIME, 7);

        // 150 >= 97 and 150 < 2*97, so PrimeReduce should subtract once.
        let value = alloc_bigint(cs.namespace(|| "value"), 150, 7);
        let reduced = prime_reduce(cs.namespace(|| "reduce"), &value, &prime).expect("reduce");
        assert!(cs.is_satisfied());
        assert_eq!(reduced.limbs[0].get_value(), Some(Scalar::from(150 - SMALL_PRIME)));

        // 50 < 97, so PrimeReduce should leave it untouched.
        let mut cs2 = TestConstraintSystem::<Scalar>::new();
        let prime2 = alloc_bigint(cs2.namespace(|| "p"), SMALL_PRIME, 7);
        let small_value = alloc_bigint(cs2.namespace(|| "value"), 50, 7);
        let reduced2 =
            prime_reduce(cs2.namespace(|| "reduce"), &small_value, &prime2).expect("reduce");
        assert!(cs2.is_satisfied());
        assert_eq!(reduced2.limbs[0].get_value(), Some(Scalar::from(50_u64)));
    }

    #[test]
    fn signed_carry_mod_p_accepts_a_small_multiple_of_the_modulus() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let prime_limbs = small_prime_limbs();

        let multiple = alloc_bigint(cs.namespace(|| "3p"), 3 * SMALL_PRIME, 7);
        signed_fp_carry_mod_p(cs.namespace(|| "fold"), &multiple.limbs, &prime_limbs).expect("fold");
        assert!(cs.is_satisfied());
    }

    #[test]
    fn signed_carry_mod_p_rejects_a_non_multiple() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let prime_limbs = small_prime_limbs();

        let value = alloc_bigint(cs.namespace(|| "value"), 5, 7);
        signed_fp_carry_mod_p(cs.namespace(|| "fold"), &value.limbs, &prime_limbs).expect("fold");
        assert!(!cs.is_satisfied());
    }
}
