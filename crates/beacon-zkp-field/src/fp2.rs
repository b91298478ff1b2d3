//! `Fp2 = Fp[u]/(u^2 + 1)`: Karatsuba multiplication and inversion over [`Fp`].

use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;

use crate::fp::{Fp, fp_add, fp_invert, fp_multiply, fp_negate, fp_subtract};

/// An `Fp2` element `c0 + c1 * u`.
#[derive(Clone)]
pub struct Fp2 {
    /// Real component.
    pub c0: Fp,
    /// Imaginary (`u`) component.
    pub c1: Fp,
}

/// Component-wise `Fp2` addition.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp2_add<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2, b: &Fp2) -> Result<Fp2, SynthesisError> {
    Ok(Fp2 {
        c0: fp_add(cs.namespace(|| "c0"), &a.c0, &b.c0)?,
        c1: fp_add(cs.namespace(|| "c1"), &a.c1, &b.c1)?,
    })
}

/// Component-wise `Fp2` subtraction.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp2_subtract<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp2,
    b: &Fp2,
) -> Result<Fp2, SynthesisError> {
    Ok(Fp2 {
        c0: fp_subtract(cs.namespace(|| "c0"), &a.c0, &b.c0)?,
        c1: fp_subtract(cs.namespace(|| "c1"), &a.c1, &b.c1)?,
    })
}

/// Component-wise `Fp2` negation.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp2_negate<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2) -> Result<Fp2, SynthesisError> {
    Ok(Fp2 {
        c0: fp_negate(cs.namespace(|| "c0"), &a.c0)?,
        c1: fp_negate(cs.namespace(|| "c1"), &a.c1)?,
    })
}

/// Karatsuba `Fp2` multiplication: `3` base-field multiplications instead of `4`.
///
/// `(a0 + a1*u)(b0 + b1*u) = (a0*b0 - a1*b1) + ((a0+a1)(b0+b1) - a0*b0 - a1*b1)*u`
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp2_multiply<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp2,
    b: &Fp2,
) -> Result<Fp2, SynthesisError> {
    let v0 = fp_multiply(cs.namespace(|| "a0*b0"), &a.c0, &b.c0)?;
    let v1 = fp_multiply(cs.namespace(|| "a1*b1"), &a.c1, &b.c1)?;

    let a_sum = fp_add(cs.namespace(|| "a0+a1"), &a.c0, &a.c1)?;
    let b_sum = fp_add(cs.namespace(|| "b0+b1"), &b.c0, &b.c1)?;
    let cross = fp_multiply(cs.namespace(|| "(a0+a1)(b0+b1)"), &a_sum, &b_sum)?;

    let c0 = fp_subtract(cs.namespace(|| "v0 - v1"), &v0, &v1)?;
    let cross_minus_v0 = fp_subtract(cs.namespace(|| "cross - v0"), &cross, &v0)?;
    let c1 = fp_subtract(cs.namespace(|| "cross - v0 - v1"), &cross_minus_v0, &v1)?;

    Ok(Fp2 { c0, c1 })
}

/// `Fp2` inversion via the norm trick: `(a0 + a1*u)^{-1} = (a0 - a1*u) / (a0^2 + a1^2)`.
///
/// # Errors
/// Returns [`SynthesisError`] if `a` is zero, or on constraint failure.
pub fn fp2_invert<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2) -> Result<Fp2, SynthesisError> {
    let a0_sq = fp_multiply(cs.namespace(|| "a0^2"), &a.c0, &a.c0)?;
    let a1_sq = fp_multiply(cs.namespace(|| "a1^2"), &a.c1, &a.c1)?;
    let norm = fp_add(cs.namespace(|| "norm"), &a0_sq, &a1_sq)?;
    let norm_inv = fp_invert(cs.namespace(|| "norm^-1"), &norm)?;

    let c0 = fp_multiply(cs.namespace(|| "a0 * norm^-1"), &a.c0, &norm_inv)?;
    let neg_a1 = fp_negate(cs.namespace(|| "-a1"), &a.c1)?;
    let c1 = fp_multiply(cs.namespace(|| "-a1 * norm^-1"), &neg_a1, &norm_inv)?;
    Ok(Fp2 { c0, c1 })
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{Fp2, fp2_add, fp2_multiply, fp2_subtract};
    use crate::fp::Fp;
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

    fn alloc_fp2<CS: bellman::ConstraintSystem<Scalar>>(mut cs: CS, c0: u64, c1: u64) -> Fp2 {
        Fp2 {
            c0: alloc_fp(cs.namespace(|| "c0"), c0),
            c1: alloc_fp(cs.namespace(|| "c1"), c1),
        }
    }

    #[test]
    fn add_sub_round_trip() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp2(cs.namespace(|| "a"), 3, 4);
        let b = alloc_fp2(cs.namespace(|| "b"), 1, 2);

        let sum = fp2_add(cs.namespace(|| "add"), &a, &b).expect("add");
        let back = fp2_subtract(cs.namespace(|| "sub"), &sum, &b).expect("sub");
        assert!(cs.is_satisfied());
        assert_eq!(back.c0.0.limbs[0].get_value(), Some(Scalar::from(3_u64)));
        assert_eq!(back.c1.0.limbs[0].get_value(), Some(Scalar::from(4_u64)));
    }

    #[test]
    fn karatsuba_multiply_matches_schoolbook() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        // (3 + 4u)(1 + 2u) = (3 - 8) + (6+4)u = -5 + 10u
        let a = alloc_fp2(cs.namespace(|| "a"), 3, 4);
        let b = alloc_fp2(cs.namespace(|| "b"), 1, 2);
        let product = fp2_multiply(cs.namespace(|| "mul"), &a, &b).expect("mul");
        assert!(cs.is_satisfied());
        assert_eq!(product.c1.0.limbs[0].get_value(), Some(Scalar::from(10_u64)));
    }

    #[test]
    fn invert_then_multiply_is_one() {
        use super::fp2_invert;

        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp2(cs.namespace(|| "a"), 5, 3);
        let inverse = fp2_invert(cs.namespace(|| "inv"), &a).expect("invert");
        let product = fp2_multiply(cs.namespace(|| "mul"), &a, &inverse).expect("mul");
        assert!(cs.is_satisfied());
        assert_eq!(product.c0.0.limbs[0].get_value(), Some(Scalar::from(1_u64)));
        assert_eq!(product.c1.0.limbs[0].get_value(), Some(Scalar::from(0_u64)));
    }
}
