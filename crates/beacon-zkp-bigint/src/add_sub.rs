//! `BigAdd`/`BigSub`/`BigLessThan`: limb-wise addition, subtraction, and comparison over
//! canonical `K`-limb values.

use bellman::gadgets::boolean::{AllocatedBit, Boolean};
use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;

use crate::num_codec::num_to_bits;
use crate::params::N;

/// A canonical `K`-limb value: every limb is range-checked to `[0, 2^N)` by its producing
/// gadget.
#[derive(Clone)]
pub struct BigIntCanonical {
    /// Little-endian limbs.
    pub limbs: Vec<AllocatedNum<Scalar>>,
}

impl BigIntCanonical {
    /// Number of limbs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    /// Whether this value has no limbs (always false for well-formed values; kept for clippy).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }
}

fn two_pow_n() -> Scalar {
    Scalar::from(1_u64 << N)
}

/// Adds two canonical `K`-limb values limb-wise with carry propagation.
///
/// Output has `K + 1` limbs (the top limb carries any final overflow) and is itself canonical:
/// every output limb, including the final carry limb, is range-checked.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn big_add<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &BigIntCanonical,
    b: &BigIntCanonical,
) -> Result<BigIntCanonical, SynthesisError> {
    assert_eq!(a.len(), b.len(), "BigAdd operands must have the same limb count");
    let shift = two_pow_n();

    let mut out_limbs = Vec::with_capacity(a.len() + 1);
    let mut carry = AllocatedNum::alloc(cs.namespace(|| "initial carry"), || Ok(Scalar::ZERO))?;
    cs.enforce(
        || "initial carry is zero",
        |lc| lc + carry.get_variable(),
        |lc| lc + CS::one(),
        |lc| lc,
    );

    for i in 0..a.len() {
        let mut cs = cs.namespace(|| format!("limb {i}"));

        let sum_value = match (a.limbs[i].get_value(), b.limbs[i].get_value(), carry.get_value())
        {
            (Some(a), Some(b), Some(c)) => Some(a + b + c),
            _ => None,
        };

        let (new_limb_value, new_carry_value) = match sum_value {
            Some(sum) => {
                let sum_int = u128::from_le_bytes({
                    let mut bytes = [0_u8; 16];
                    bytes[..8].copy_from_slice(&sum.to_bytes()[..8]);
                    bytes
                });
                let carry_bit = sum_int >> N;
                let limb_part = sum_int - (carry_bit << N);
                (Some(Scalar::from(u64::try_from(limb_part).unwrap_or(0))), Some(carry_bit))
            }
            None => (None, None),
        };

        let new_limb = AllocatedNum::alloc(cs.namespace(|| "new limb"), || {
            new_limb_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let new_carry = AllocatedBit::alloc(
            cs.namespace(|| "new carry"),
            new_carry_value.map(|c| c == 1),
        )?;

        cs.enforce(
            || "sum = new_limb + new_carry * 2^N",
            |lc| lc + a.limbs[i].get_variable() + b.limbs[i].get_variable() + carry.get_variable(),
            |lc| lc + CS::one(),
            |lc| lc + new_limb.get_variable() + (shift, new_carry.get_variable()),
        );
        num_to_bits(cs.namespace(|| "range check new limb"), &new_limb, N as usize)?;

        out_limbs.push(new_limb);
        carry = AllocatedNum::alloc(cs.namespace(|| "carry as num"), || {
            new_carry.get_value().map(|b| if b { Scalar::ONE } else { Scalar::ZERO }).ok_or(
                SynthesisError::AssignmentMissing,
            )
        })?;
        cs.enforce(
            || "carry num matches carry bit",
            |lc| lc + carry.get_variable(),
            |lc| lc + CS::one(),
            |_| Boolean::from(new_carry).lc(CS::one(), Scalar::ONE),
        );
    }
    out_limbs.push(carry);

    Ok(BigIntCanonical { limbs: out_limbs })
}

/// Subtracts `b` from `a` limb-wise with borrow propagation.
///
/// Returns the `K`-limb difference (meaningful only when `underflow = 0`) and an `underflow`
/// boolean that is `1` exactly when `a < b`.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn big_sub<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &BigIntCanonical,
    b: &BigIntCanonical,
) -> Result<(BigIntCanonical, Boolean), SynthesisError> {
    assert_eq!(a.len(), b.len(), "BigSub operands must have the same limb count");
    let shift = two_pow_n();

    let mut out_limbs = Vec::with_capacity(a.len());
    let mut borrow_value = Some(false);
    let mut borrow_bit: Option<AllocatedBit> = None;

    for i in 0..a.len() {
        let mut cs = cs.namespace(|| format!("limb {i}"));

        let a_v = a.limbs[i].get_value();
        let b_v = b.limbs[i].get_value();
        let prev_borrow = borrow_value;

        let (diff_value, next_borrow) = match (a_v, b_v, prev_borrow) {
            (Some(a_v), Some(b_v), Some(prev)) => {
                let a_int = field_to_u128(a_v);
                let b_int = field_to_u128(b_v) + u128::from(prev);
                if a_int >= b_int {
                    (Some(Scalar::from(u64::try_from(a_int - b_int).unwrap_or(0))), Some(false))
                } else {
                    let diff = (1_u128 << N) + a_int - b_int;
                    (Some(Scalar::from(u64::try_from(diff).unwrap_or(0))), Some(true))
                }
            }
            _ => (None, None),
        };

        let diff = AllocatedNum::alloc(cs.namespace(|| "diff limb"), || {
            diff_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let next_borrow_bit =
            AllocatedBit::alloc(cs.namespace(|| "next borrow"), next_borrow)?;

        let prev_borrow_lc = match &borrow_bit {
            Some(bit) => Boolean::from(bit.clone()).lc(CS::one(), Scalar::ONE),
            None => bellman::LinearCombination::zero(),
        };

        cs.enforce(
            || "a - b - prev_borrow = diff - next_borrow*2^N",
            |lc| lc + a.limbs[i].get_variable() - b.limbs[i].get_variable() - &prev_borrow_lc,
            |lc| lc + CS::one(),
            |lc| lc + diff.get_variable() - (shift, next_borrow_bit.get_variable()),
        );
        num_to_bits(cs.namespace(|| "range check diff"), &diff, N as usize)?;

        out_limbs.push(diff);
        borrow_value = next_borrow;
        borrow_bit = Some(next_borrow_bit);
    }

    let underflow = borrow_bit.map_or_else(|| Boolean::constant(false), Boolean::from);
    Ok((BigIntCanonical { limbs: out_limbs }, underflow))
}

fn field_to_u128(value: Scalar) -> u128 {
    let bytes = value.to_bytes();
    let mut buf = [0_u8; 16];
    buf.copy_from_slice(&bytes[..16]);
    u128::from_le_bytes(buf)
}

/// Lexicographic (most-significant-limb-first) comparison: proves `a < b`.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation or constraint failure.
pub fn big_less_than<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &BigIntCanonical,
    b: &BigIntCanonical,
) -> Result<Boolean, SynthesisError> {
    assert_eq!(a.len(), b.len(), "BigLessThan operands must have the same limb count");

    let mut lt = Boolean::constant(false);
    let mut eq = Boolean::constant(true);

    for i in (0..a.len()).rev() {
        let mut cs = cs.namespace(|| format!("limb {i}"));

        let limb_eq = num_equal(cs.namespace(|| "limb eq"), &a.limbs[i], &b.limbs[i])?;
        let limb_lt = num_less_than(cs.namespace(|| "limb lt"), &a.limbs[i], &b.limbs[i])?;

        let eq_and_lt = Boolean::and(cs.namespace(|| "eq & limb_lt"), &eq, &limb_lt)?;
        lt = bool_or(cs.namespace(|| "lt | (eq & limb_lt)"), &lt, &eq_and_lt)?;
        eq = Boolean::and(cs.namespace(|| "eq & limb_eq"), &eq, &limb_eq)?;
    }

    Ok(lt)
}

fn bool_or<CS: ConstraintSystem<Scalar>>(
    cs: CS,
    a: &Boolean,
    b: &Boolean,
) -> Result<Boolean, SynthesisError> {
    Boolean::and(cs, &a.not(), &b.not()).map(|not_or| not_or.not())
}

fn num_equal<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &AllocatedNum<Scalar>,
    b: &AllocatedNum<Scalar>,
) -> Result<Boolean, SynthesisError> {
    let diff = AllocatedNum::alloc(cs.namespace(|| "diff"), || {
        let (a, b) = (a.get_value(), b.get_value());
        a.zip(b).map(|(a, b)| a - b).ok_or(SynthesisError::AssignmentMissing)
    })?;
    cs.enforce(
        || "diff = a - b",
        |lc| lc + a.get_variable() - b.get_variable(),
        |lc| lc + CS::one(),
        |lc| lc + diff.get_variable(),
    );
    let is_zero = diff.get_value().map(|v| v == Scalar::ZERO);
    let is_zero_bit = AllocatedBit::alloc(cs.namespace(|| "is_zero"), is_zero)?;

    // `diff * inv = 1 - is_zero`, and `diff * is_zero = 0`, the standard is-zero gadget.
    let inv_value = diff.get_value().map(|v| Option::<Scalar>::from(v.invert()).unwrap_or(Scalar::ZERO));
    let inv = AllocatedNum::alloc(cs.namespace(|| "inverse"), || {
        inv_value.ok_or(SynthesisError::AssignmentMissing)
    })?;
    cs.enforce(
        || "diff * inv = 1 - is_zero",
        |lc| lc + diff.get_variable(),
        |lc| lc + inv.get_variable(),
        |lc| lc + CS::one() - is_zero_bit.get_variable(),
    );
    cs.enforce(
        || "diff * is_zero = 0",
        |lc| lc + diff.get_variable(),
        |lc| lc + is_zero_bit.get_variable(),
        |lc| lc,
    );

    Ok(Boolean::from(is_zero_bit))
}

fn num_less_than<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &AllocatedNum<Scalar>,
    b: &AllocatedNum<Scalar>,
) -> Result<Boolean, SynthesisError> {
    let shift = two_pow_n();
    let diff = AllocatedNum::alloc(cs.namespace(|| "shifted diff"), || {
        let (a, b) = (a.get_value(), b.get_value());
        a.zip(b).map(|(a, b)| a - b + shift).ok_or(SynthesisError::AssignmentMissing)
    })?;
    cs.enforce(
        || "shifted_diff = a - b + 2^N",
        |lc| lc + a.get_variable() - b.get_variable() + (shift, CS::one()),
        |lc| lc + CS::one(),
        |lc| lc + diff.get_variable(),
    );
    let bits = num_to_bits(cs.namespace(|| "decompose shifted diff"), &diff, (N + 1) as usize)?;
    // a < b  <=>  a - b + 2^N < 2^N  <=>  bit N of the (N+1)-bit decomposition is 0.
    Ok(bits[N as usize].not())
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{BigIntCanonical, big_add, big_less_than, big_sub};
    use crate::hints::biguint_to_limbs;
    use num_bigint::BigUint;

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
                AllocatedNum::alloc(cs.namespace(|| format!("limb {i}")), || {
                    Ok(Scalar::from(*limb))
                })
                .expect("alloc limb")
            })
            .collect();
        BigIntCanonical { limbs: allocated }
    }

    #[test]
    fn big_add_then_sub_round_trips() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = BigUint::from(123_456_789_u64);
        let b = BigUint::from(987_654_321_u64);

        let a_big = alloc_bigint(cs.namespace(|| "a"), &a, 7);
        let b_big = alloc_bigint(cs.namespace(|| "b"), &b, 7);

        let sum = big_add(cs.namespace(|| "add"), &a_big, &b_big).expect("add");
        // Drop the extra carry limb to subtract against the original K=7 representation.
        let sum_k = BigIntCanonical { limbs: sum.limbs[..7].to_vec() };

        let (diff, underflow) = big_sub(cs.namespace(|| "sub"), &sum_k, &b_big).expect("sub");
        assert!(cs.is_satisfied());
        assert_eq!(underflow.get_value(), Some(false));

        for (got, expected) in diff.limbs.iter().zip(a_big.limbs.iter()) {
            assert_eq!(got.get_value(), expected.get_value());
        }
    }

    #[test]
    fn big_less_than_detects_strict_order() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_bigint(cs.namespace(|| "a"), &BigUint::from(5_u64), 7);
        let b = alloc_bigint(cs.namespace(|| "b"), &BigUint::from(10_u64), 7);

        let lt = big_less_than(cs.namespace(|| "5 < 10"), &a, &b).expect("lt");
        assert!(cs.is_satisfied());
        assert_eq!(lt.get_value(), Some(true));

        let mut cs2 = TestConstraintSystem::<Scalar>::new();
        let a2 = alloc_bigint(cs2.namespace(|| "a"), &BigUint::from(10_u64), 7);
        let b2 = alloc_bigint(cs2.namespace(|| "b"), &BigUint::from(5_u64), 7);
        let lt2 = big_less_than(cs2.namespace(|| "10 < 5"), &a2, &b2).expect("lt");
        assert!(cs2.is_satisfied());
        assert_eq!(lt2.get_value(), Some(false));
    }
}
