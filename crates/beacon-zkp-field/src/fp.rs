//! `Fp`: the BLS12-381 base field, represented as a canonical `K`-limb [`BigIntCanonical`] and
//! built entirely on `beacon-zkp-bigint` primitives: "multiply without reducing, reduce
//! once per boundary".

use beacon_zkp_bigint::add_sub::{BigIntCanonical, big_add, big_less_than, big_sub};
use beacon_zkp_bigint::mod_reduce::{big_mod, big_mod_inv, prime_reduce};
use beacon_zkp_bigint::mult::big_mult;
use beacon_zkp_bigint::num_codec::num_to_bits;
use beacon_zkp_core::constants::{BLS12381_PRIME, K, N};
use bellman::gadgets::boolean::Boolean;
use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;

/// A single BLS12-381 base-field element, as a canonical `K`-limb representation.
#[derive(Clone)]
pub struct Fp(pub BigIntCanonical);

fn prime_as_bigint<CS: ConstraintSystem<Scalar>>(mut cs: CS) -> Result<BigIntCanonical, SynthesisError> {
    let limbs = (0..K)
        .map(|i| {
            AllocatedNum::alloc(cs.namespace(|| format!("prime limb {i}")), || {
                Ok(Scalar::from(BLS12381_PRIME[i]))
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(BigIntCanonical { limbs })
}

/// `Fp` addition: `BigAdd` then a single conditional `PrimeReduce`.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn fp_add<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp, b: &Fp) -> Result<Fp, SynthesisError> {
    let sum = big_add(cs.namespace(|| "add"), &a.0, &b.0)?;
    let prime = prime_as_bigint(cs.namespace(|| "p"))?;
    let reduced = prime_reduce(cs.namespace(|| "reduce"), &sum, &prime)?;
    Ok(Fp(reduced))
}

/// `Fp` subtraction: computes `a - b`, or `p - (b - a)` when `a < b`, so the result always
/// lands back in `[0, p)` without ever forming a value near `2^(K*N)` that would need a second
/// modular correction.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn fp_subtract<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp,
    b: &Fp,
) -> Result<Fp, SynthesisError> {
    let prime = prime_as_bigint(cs.namespace(|| "p"))?;
    let a_lt_b = big_less_than(cs.namespace(|| "a < b"), &a.0, &b.0)?;

    let (diff_ab, _) = big_sub(cs.namespace(|| "a - b"), &a.0, &b.0)?;
    let (diff_ba, _) = big_sub(cs.namespace(|| "b - a"), &b.0, &a.0)?;
    let (p_minus_diff_ba, _) = big_sub(cs.namespace(|| "p - (b - a)"), &prime, &diff_ba)?;

    let mut out_limbs = Vec::with_capacity(K);
    for i in 0..K {
        let mut cs = cs.namespace(|| format!("select limb {i}"));
        let selected = conditionally_select(
            cs.namespace(|| "select"),
            &a_lt_b,
            &p_minus_diff_ba.limbs[i],
            &diff_ab.limbs[i],
        )?;
        out_limbs.push(selected);
    }
    Ok(Fp(BigIntCanonical { limbs: out_limbs }))
}

/// `Fp` negation: `p - a`, collapsing to `0` when `a = 0`.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn fp_negate<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp) -> Result<Fp, SynthesisError> {
    let zero = Fp(BigIntCanonical {
        limbs: (0..K)
            .map(|i| {
                AllocatedNum::alloc(cs.namespace(|| format!("zero limb {i}")), || Ok(Scalar::ZERO))
            })
            .collect::<Result<_, _>>()?,
    });
    fp_subtract(cs.namespace(|| "p_as_fp - a via 0 - a"), &zero, a)
}

/// `Fp` multiplication: `BigMultShortLong` composed with `BigMod` against the base prime.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn fp_multiply<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp,
    b: &Fp,
) -> Result<Fp, SynthesisError> {
    let product = big_mult(cs.namespace(|| "a*b convolution"), &a.0, &b.0)?;
    let prime = prime_as_bigint(cs.namespace(|| "p"))?;
    let remainder = big_mod(cs.namespace(|| "mod p"), &product, &prime, &BLS12381_PRIME)?;
    Ok(Fp(remainder))
}

/// `Fp` equality test.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn fp_is_equal<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp,
    b: &Fp,
) -> Result<Boolean, SynthesisError> {
    // a == b  <=>  !(a < b) && !(b < a), for canonical representations.
    let a_lt_b = big_less_than(cs.namespace(|| "a < b"), &a.0, &b.0)?;
    let b_lt_a = big_less_than(cs.namespace(|| "b < a"), &b.0, &a.0)?;
    Boolean::and(cs.namespace(|| "neither strictly less"), &a_lt_b.not(), &b_lt_a.not())
}

/// `Fp` zero test.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn fp_is_zero<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp) -> Result<Boolean, SynthesisError> {
    let zero = Fp(BigIntCanonical {
        limbs: (0..K)
            .map(|i| {
                AllocatedNum::alloc(cs.namespace(|| format!("zero limb {i}")), || Ok(Scalar::ZERO))
            })
            .collect::<Result<_, _>>()?,
    });
    fp_is_equal(cs.namespace(|| "a == 0"), a, &zero)
}

/// `Fp` inversion: delegates the quotient/inverse witness to `BigModInv` and range-checks the
/// result, which `BigModInv` already binds to `a * result \equiv 1 \pmod p`.
///
/// # Errors
/// Returns [`SynthesisError`] if `a` is zero (no inverse), or on constraint failure.
pub fn fp_invert<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp) -> Result<Fp, SynthesisError> {
    let inverse = big_mod_inv(cs.namespace(|| "invert"), &a.0, &BLS12381_PRIME)?;
    Ok(Fp(inverse))
}

/// `FpSgn0`: the sign of a field element, defined (per draft-irtf-cfrg-hash-to-curve) as the
/// least-significant bit of its canonical integer representation.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn fp_sgn0<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp) -> Result<Boolean, SynthesisError> {
    let bits = num_to_bits(cs.namespace(|| "decompose low limb"), &a.0.limbs[0], N as usize)?;
    Ok(bits[0].clone())
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
    cs.enforce(
        || "select via condition * (true - false)",
        |_| condition.lc(CS::one(), Scalar::ONE),
        |lc| lc + if_true.get_variable() - if_false.get_variable(),
        |lc| lc + result.get_variable() - if_false.get_variable(),
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{Fp, fp_add, fp_is_zero, fp_multiply, fp_negate, fp_subtract};
    use beacon_zkp_bigint::add_sub::BigIntCanonical;
    use beacon_zkp_bigint::hints::biguint_to_limbs;
    use beacon_zkp_core::constants::N;
    use num_bigint::BigUint;

    fn alloc_fp<CS: bellman::ConstraintSystem<Scalar>>(mut cs: CS, value: u64) -> Fp {
        let limbs = biguint_to_limbs(&BigUint::from(value), 7, N);
        let allocated = limbs
            .iter()
            .enumerate()
            .map(|(i, limb)| {
                AllocatedNum::alloc(cs.namespace(|| format!("limb {i}")), || Ok(Scalar::from(*limb)))
                    .expect("alloc")
            })
            .collect();
        Fp(BigIntCanonical { limbs: allocated })
    }

    #[test]
    fn add_then_subtract_round_trips() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp(cs.namespace(|| "a"), 123);
        let b = alloc_fp(cs.namespace(|| "b"), 456);

        let sum = fp_add(cs.namespace(|| "add"), &a, &b).expect("add");
        let back = fp_subtract(cs.namespace(|| "sub"), &sum, &b).expect("sub");

        assert!(cs.is_satisfied());
        assert_eq!(back.0.limbs[0].get_value(), Some(Scalar::from(123_u64)));
    }

    #[test]
    fn negate_of_zero_is_zero() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let zero = alloc_fp(cs.namespace(|| "zero"), 0);
        let negated = fp_negate(cs.namespace(|| "neg"), &zero).expect("negate");
        assert!(cs.is_satisfied());
        let is_zero = fp_is_zero(cs.namespace(|| "is_zero"), &negated).expect("is_zero");
        assert_eq!(is_zero.get_value(), Some(true));
    }

    #[test]
    fn multiply_matches_native_product_mod_p() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp(cs.namespace(|| "a"), 17);
        let b = alloc_fp(cs.namespace(|| "b"), 19);
        let product = fp_multiply(cs.namespace(|| "mul"), &a, &b).expect("mul");
        assert!(cs.is_satisfied());
        assert_eq!(product.0.limbs[0].get_value(), Some(Scalar::from(17_u64 * 19)));
    }
}
