//! `Fp12 = Fp6[w]/(w^2 - v)`, using the Fp6-over-Fp6 conjugate trick for inversion.

use bellman::gadgets::boolean::Boolean;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;

use crate::fp6::{Fp6, fp6_add, fp6_invert, fp6_multiply, fp6_negate, fp6_subtract, mul_by_v};

/// An `Fp12` element `c0 + c1*w`.
#[derive(Clone)]
pub struct Fp12 {
    /// Degree-0 component.
    pub c0: Fp6,
    /// Degree-1 component.
    pub c1: Fp6,
}

/// Component-wise `Fp12` addition.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp12_add<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp12, b: &Fp12) -> Result<Fp12, SynthesisError> {
    Ok(Fp12 {
        c0: fp6_add(cs.namespace(|| "c0"), &a.c0, &b.c0)?,
        c1: fp6_add(cs.namespace(|| "c1"), &a.c1, &b.c1)?,
    })
}

/// `Fp12` Karatsuba multiplication: `(a0+a1 w)(b0+b1 w) = (a0 b0 + v a1 b1) + ((a0+a1)(b0+b1) -
/// a0 b0 - a1 b1) w`.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp12_multiply<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp12,
    b: &Fp12,
) -> Result<Fp12, SynthesisError> {
    let t0 = fp6_multiply(cs.namespace(|| "a0*b0"), &a.c0, &b.c0)?;
    let t1 = fp6_multiply(cs.namespace(|| "a1*b1"), &a.c1, &b.c1)?;

    let v_t1 = mul_by_v(cs.namespace(|| "v * (a1*b1)"), &t1)?;
    let c0 = fp6_add(cs.namespace(|| "a0*b0 + v*a1*b1"), &t0, &v_t1)?;

    let a_sum = fp6_add(cs.namespace(|| "a0+a1"), &a.c0, &a.c1)?;
    let b_sum = fp6_add(cs.namespace(|| "b0+b1"), &b.c0, &b.c1)?;
    let cross = fp6_multiply(cs.namespace(|| "(a0+a1)(b0+b1)"), &a_sum, &b_sum)?;
    let cross_minus_t0 = fp6_subtract(cs.namespace(|| "cross - t0"), &cross, &t0)?;
    let c1 = fp6_subtract(cs.namespace(|| "cross - t0 - t1"), &cross_minus_t0, &t1)?;

    Ok(Fp12 { c0, c1 })
}

/// `Fp12` conjugation: negates the `w`-component, i.e. the nontrivial automorphism of the
/// quadratic extension `Fp12/Fp6`.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp12_conjugate<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp12) -> Result<Fp12, SynthesisError> {
    Ok(Fp12 { c0: a.c0.clone(), c1: fp6_negate(cs.namespace(|| "-c1"), &a.c1)? })
}

/// `Fp12` inversion via the conjugate trick: `a^{-1} = conjugate(a) / norm(a)`, where `norm(a) =
/// a0^2 - v*a1^2` lands in `Fp6` and is inverted with [`fp6_invert`].
///
/// # Errors
/// Returns [`SynthesisError`] if `a` is zero, or on constraint failure.
pub fn fp12_invert<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp12) -> Result<Fp12, SynthesisError> {
    let a0_sq = fp6_multiply(cs.namespace(|| "a0^2"), &a.c0, &a.c0)?;
    let a1_sq = fp6_multiply(cs.namespace(|| "a1^2"), &a.c1, &a.c1)?;
    let v_a1_sq = mul_by_v(cs.namespace(|| "v*a1^2"), &a1_sq)?;
    let norm = fp6_subtract(cs.namespace(|| "norm = a0^2 - v*a1^2"), &a0_sq, &v_a1_sq)?;
    let norm_inv = fp6_invert(cs.namespace(|| "norm^-1"), &norm)?;

    let c0 = fp6_multiply(cs.namespace(|| "a0 * norm^-1"), &a.c0, &norm_inv)?;
    let neg_a1 = fp6_negate(cs.namespace(|| "-a1"), &a.c1)?;
    let c1 = fp6_multiply(cs.namespace(|| "-a1 * norm^-1"), &neg_a1, &norm_inv)?;
    Ok(Fp12 { c0, c1 })
}

/// Asserts `a == 1` in `Fp12`: the real component `c0.c0.c0` must be `1`, and every other one of
/// the twelve underlying `Fp` limbs-groups must vanish. Used to close the optimal-Ate pairing
/// identity check (`e(P0,Q0)*e(P1,Q1) == 1`) after [`crate::pairing::final_exponentiate`].
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure, including when `a != 1`.
pub fn fp12_assert_one<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp12) -> Result<(), SynthesisError> {
    let one = one_fp(cs.namespace(|| "one"))?;
    let c0_c0_c0_is_one =
        crate::fp::fp_is_equal(cs.namespace(|| "re(c0.c0) == 1"), &a.c0.c0.c0, &one)?;
    Boolean::enforce_equal(cs.namespace(|| "c0.c0.c0 is one"), &c0_c0_c0_is_one, &Boolean::constant(true))?;

    for (label, component) in [
        ("c0.c0.c1", &a.c0.c0.c1),
        ("c0.c1.c0", &a.c0.c1.c0),
        ("c0.c1.c1", &a.c0.c1.c1),
        ("c0.c2.c0", &a.c0.c2.c0),
        ("c0.c2.c1", &a.c0.c2.c1),
        ("c1.c0.c0", &a.c1.c0.c0),
        ("c1.c0.c1", &a.c1.c0.c1),
        ("c1.c1.c0", &a.c1.c1.c0),
        ("c1.c1.c1", &a.c1.c1.c1),
        ("c1.c2.c0", &a.c1.c2.c0),
        ("c1.c2.c1", &a.c1.c2.c1),
    ] {
        let is_zero = crate::fp::fp_is_zero(cs.namespace(|| label), component)?;
        Boolean::enforce_equal(cs.namespace(|| format!("{label} vanishes")), &is_zero, &Boolean::constant(true))?;
    }
    Ok(())
}

fn one_fp<CS: ConstraintSystem<Scalar>>(mut cs: CS) -> Result<crate::fp::Fp, SynthesisError> {
    use bellman::gadgets::num::AllocatedNum;
    use beacon_zkp_bigint::add_sub::BigIntCanonical;
    use beacon_zkp_core::constants::K;

    let mut limbs = Vec::with_capacity(K);
    for i in 0..K {
        let value = if i == 0 { Scalar::ONE } else { Scalar::ZERO };
        limbs.push(AllocatedNum::alloc(cs.namespace(|| format!("one limb {i}")), || Ok(value))?);
    }
    Ok(crate::fp::Fp(BigIntCanonical { limbs }))
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{Fp12, fp12_add, fp12_conjugate};
    use crate::fp::Fp;
    use crate::fp2::Fp2;
    use crate::fp6::Fp6;
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

    fn alloc_fp12_simple<CS: bellman::ConstraintSystem<Scalar>>(mut cs: CS, value: u64) -> Fp12 {
        Fp12 {
            c0: Fp6 {
                c0: Fp2 {
                    c0: alloc_fp(cs.namespace(|| "c0.c0.c0"), value),
                    c1: alloc_fp(cs.namespace(|| "c0.c0.c1"), 0),
                },
                c1: Fp2 {
                    c0: alloc_fp(cs.namespace(|| "c0.c1.c0"), 0),
                    c1: alloc_fp(cs.namespace(|| "c0.c1.c1"), 0),
                },
                c2: Fp2 {
                    c0: alloc_fp(cs.namespace(|| "c0.c2.c0"), 0),
                    c1: alloc_fp(cs.namespace(|| "c0.c2.c1"), 0),
                },
            },
            c1: Fp6 {
                c0: Fp2 {
                    c0: alloc_fp(cs.namespace(|| "c1.c0.c0"), 0),
                    c1: alloc_fp(cs.namespace(|| "c1.c0.c1"), 0),
                },
                c1: Fp2 {
                    c0: alloc_fp(cs.namespace(|| "c1.c1.c0"), 0),
                    c1: alloc_fp(cs.namespace(|| "c1.c1.c1"), 0),
                },
                c2: Fp2 {
                    c0: alloc_fp(cs.namespace(|| "c1.c2.c0"), 0),
                    c1: alloc_fp(cs.namespace(|| "c1.c2.c1"), 0),
                },
            },
        }
    }

    #[test]
    fn conjugate_of_real_element_is_itself() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp12_simple(cs.namespace(|| "a"), 7);
        let conjugated = fp12_conjugate(cs.namespace(|| "conj"), &a).expect("conj");
        assert!(cs.is_satisfied());
        assert_eq!(conjugated.c0.c0.c0.0.limbs[0].get_value(), Some(Scalar::from(7_u64)));
    }

    #[test]
    fn add_is_constraint_satisfiable() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp12_simple(cs.namespace(|| "a"), 3);
        let b = alloc_fp12_simple(cs.namespace(|| "b"), 4);
        let sum = fp12_add(cs.namespace(|| "add"), &a, &b).expect("add");
        assert!(cs.is_satisfied());
        assert_eq!(sum.c0.c0.c0.0.limbs[0].get_value(), Some(Scalar::from(7_u64)));
    }

    #[test]
    fn invert_a_real_element_then_multiply_is_one() {
        use super::{fp12_invert, fp12_multiply};

        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp12_simple(cs.namespace(|| "a"), 9);
        let inverse = fp12_invert(cs.namespace(|| "inv"), &a).expect("invert");
        let product = fp12_multiply(cs.namespace(|| "mul"), &a, &inverse).expect("mul");
        assert!(cs.is_satisfied());
        assert_eq!(product.c0.c0.c0.0.limbs[0].get_value(), Some(Scalar::from(1_u64)));
        assert_eq!(product.c0.c0.c1.0.limbs[0].get_value(), Some(Scalar::from(0_u64)));
    }
}
