//! `BigMultShortLong`/`LongToShortNoEndCarry`/`BigMult`: schoolbook multiplication of canonical
//! `K`-limb values, with the carry-propagation pass that brings an unreduced convolution result
//! back to canonical form.

use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;

use crate::add_sub::BigIntCanonical;
use crate::num_codec::num_to_bits;
use crate::params::N;

/// Width used to range-check intermediate carries produced while compressing a convolution
/// result back to `N`-bit limbs. Large enough to hold `log2(K)` accumulation bits on top of any
/// single limb product.
const CARRY_BITS: usize = 64;

/// Schoolbook convolution: multiplies two canonical `K`-limb values and returns `2K - 1`
/// "long" limbs (each up to roughly `2N + log2(K)` bits, not yet range-checked or
/// carry-propagated). This is the soundness-critical step: every output limb is constrained by
/// a genuine quadratic combination of input limbs, following the evaluate-at-integer-points
/// approach rather than trusting a witness-only convolution.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn big_mult_short_long<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &BigIntCanonical,
    b: &BigIntCanonical,
) -> Result<Vec<AllocatedNum<Scalar>>, SynthesisError> {
    assert_eq!(a.len(), b.len(), "BigMultShortLong operands must have the same limb count");
    let k = a.len();
    let mut out = Vec::with_capacity(2 * k - 1);

    for t in 0..(2 * k - 1) {
        let mut cs = cs.namespace(|| format!("output limb {t}"));

        let lo = t.saturating_sub(k - 1);
        let hi = t.min(k - 1);

        let value = (lo..=hi).try_fold(Scalar::ZERO, |acc, i| {
            let j = t - i;
            let a_v = a.limbs[i].get_value()?;
            let b_v = b.limbs[j].get_value()?;
            Some(acc + a_v * b_v)
        });

        let limb = AllocatedNum::alloc(cs.namespace(|| "convolution term"), || {
            value.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // Enforce limb = sum_{i+j=t} a_i * b_j as a single constraint using an auxiliary
        // variable per product term, summed via a linear combination on the right.
        let mut rhs_terms: Vec<AllocatedNum<Scalar>> = Vec::with_capacity(hi - lo + 1);
        for i in lo..=hi {
            let j = t - i;
            let product_value = a.limbs[i]
                .get_value()
                .zip(b.limbs[j].get_value())
                .map(|(a, b)| a * b);
            let product = AllocatedNum::alloc(cs.namespace(|| format!("a{i}*b{j}")), || {
                product_value.ok_or(SynthesisError::AssignmentMissing)
            })?;
            cs.enforce(
                || format!("a{i}*b{j} product"),
                |lc| lc + a.limbs[i].get_variable(),
                |lc| lc + b.limbs[j].get_variable(),
                |lc| lc + product.get_variable(),
            );
            rhs_terms.push(product);
        }

        cs.enforce(
            || "limb equals sum of cross terms",
            |lc| {
                let mut lc = lc;
                for term in &rhs_terms {
                    lc = lc + term.get_variable();
                }
                lc
            },
            |lc| lc + CS::one(),
            |lc| lc + limb.get_variable(),
        );

        out.push(limb);
    }

    Ok(out)
}

/// Carry-propagates an unreduced `2K - 1`-limb convolution result (as produced by
/// [`big_mult_short_long`]) into a canonical `2K - 1`-limb value with every limb range-checked
/// to `N` bits, plus a final nonzero-only-if-needed top carry limb.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn long_to_short_no_end_carry<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    long_limbs: &[AllocatedNum<Scalar>],
) -> Result<BigIntCanonical, SynthesisError> {
    let shift = Scalar::from(1_u64 << N);
    let mut short_limbs = Vec::with_capacity(long_limbs.len() + 1);
    let mut carry = AllocatedNum::alloc(cs.namespace(|| "initial carry"), || Ok(Scalar::ZERO))?;
    cs.enforce(
        || "initial carry is zero",
        |lc| lc + carry.get_variable(),
        |lc| lc + CS::one(),
        |lc| lc,
    );

    for (i, long_limb) in long_limbs.iter().enumerate() {
        let mut cs = cs.namespace(|| format!("compress limb {i}"));

        let current = long_limb.get_value().zip(carry.get_value()).map(|(l, c)| l + c);
        let current_int = current.map(field_to_u128);

        let short_value = current_int.map(|v| Scalar::from(u64::try_from(v & ((1_u128 << N) - 1)).unwrap_or(0)));
        let carry_value = current_int.map(|v| Scalar::from(u64::try_from(v >> N).unwrap_or(0)));

        let short_limb = AllocatedNum::alloc(cs.namespace(|| "short limb"), || {
            short_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let next_carry = AllocatedNum::alloc(cs.namespace(|| "next carry"), || {
            carry_value.ok_or(SynthesisError::AssignmentMissing)
        })?;

        cs.enforce(
            || "long_limb + carry = short_limb + next_carry * 2^N",
            |lc| lc + long_limb.get_variable() + carry.get_variable(),
            |lc| lc + CS::one(),
            |lc| lc + short_limb.get_variable() + (shift, next_carry.get_variable()),
        );

        num_to_bits(cs.namespace(|| "range check short limb"), &short_limb, N as usize)?;
        num_to_bits(cs.namespace(|| "range check next carry"), &next_carry, CARRY_BITS)?;

        short_limbs.push(short_limb);
        carry = next_carry;
    }
    short_limbs.push(carry);

    Ok(BigIntCanonical { limbs: short_limbs })
}

fn field_to_u128(value: Scalar) -> u128 {
    let bytes = value.to_bytes();
    let mut buf = [0_u8; 16];
    buf.copy_from_slice(&bytes[..16]);
    u128::from_le_bytes(buf)
}

/// Composes [`big_mult_short_long`] and [`long_to_short_no_end_carry`]: the full `K`-limb times
/// `K`-limb multiplication gadget, producing a canonical `2K`-limb product.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn big_mult<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &BigIntCanonical,
    b: &BigIntCanonical,
) -> Result<BigIntCanonical, SynthesisError> {
    let long = big_mult_short_long(cs.namespace(|| "convolution"), a, b)?;
    long_to_short_no_end_carry(cs.namespace(|| "compress"), &long)
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;
    use num_bigint::BigUint;

    use super::big_mult;
    use crate::add_sub::BigIntCanonical;
    use crate::hints::{biguint_to_limbs, limbs_to_biguint};

    fn alloc_bigint<CS: bellman::ConstraintSystem<Scalar>>(
        mut cs: CS,
        value: &BigUint,
        k: usize,
    ) -> BigIntCanonical {
        let limbs = biguint_to_limbs(value, k, 55);
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
    fn big_mult_matches_native_product() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a_val = BigUint::from(123_456_789_u64);
        let b_val = BigUint::from(987_654_321_u64);

        let a = alloc_bigint(cs.namespace(|| "a"), &a_val, 7);
        let b = alloc_bigint(cs.namespace(|| "b"), &b_val, 7);

        let product = big_mult(cs.namespace(|| "mult"), &a, &b).expect("mult");
        assert!(cs.is_satisfied());

        let limb_values: Vec<u64> = product
            .limbs
            .iter()
            .map(|limb| {
                let bytes = limb.get_value().expect("value").to_bytes();
                u64::from_le_bytes(bytes[..8].try_into().expect("8 bytes"))
            })
            .collect();
        let restored = limbs_to_biguint(&limb_values, 55);
        assert_eq!(restored, a_val * b_val);
    }
}
