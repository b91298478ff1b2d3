//! `Fp6 = Fp2[v]/(v^3 - xi)` with `xi = 1 + u`.

use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;

use crate::fp2::{Fp2, fp2_add, fp2_invert, fp2_multiply, fp2_negate, fp2_subtract};

/// An `Fp6` element `c0 + c1*v + c2*v^2`.
#[derive(Clone)]
pub struct Fp6 {
    /// Degree-0 component.
    pub c0: Fp2,
    /// Degree-1 component.
    pub c1: Fp2,
    /// Degree-2 component.
    pub c2: Fp2,
}

/// Multiplies an `Fp2` element by the `Fp6` cubic nonresidue `xi = 1 + u`:
/// `(a0 + a1*u)(1 + u) = (a0 - a1) + (a0 + a1)*u`.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn mul_by_nonresidue<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp2,
) -> Result<Fp2, SynthesisError> {
    let c0 = crate::fp::fp_subtract(cs.namespace(|| "a0 - a1"), &a.c0, &a.c1)?;
    let c1 = crate::fp::fp_add(cs.namespace(|| "a0 + a1"), &a.c0, &a.c1)?;
    Ok(Fp2 { c0, c1 })
}

/// Component-wise `Fp6` addition.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp6_add<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp6, b: &Fp6) -> Result<Fp6, SynthesisError> {
    Ok(Fp6 {
        c0: fp2_add(cs.namespace(|| "c0"), &a.c0, &b.c0)?,
        c1: fp2_add(cs.namespace(|| "c1"), &a.c1, &b.c1)?,
        c2: fp2_add(cs.namespace(|| "c2"), &a.c2, &b.c2)?,
    })
}

/// Component-wise `Fp6` subtraction.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp6_subtract<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp6,
    b: &Fp6,
) -> Result<Fp6, SynthesisError> {
    Ok(Fp6 {
        c0: fp2_subtract(cs.namespace(|| "c0"), &a.c0, &b.c0)?,
        c1: fp2_subtract(cs.namespace(|| "c1"), &a.c1, &b.c1)?,
        c2: fp2_subtract(cs.namespace(|| "c2"), &a.c2, &b.c2)?,
    })
}

/// Component-wise `Fp6` negation.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp6_negate<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp6) -> Result<Fp6, SynthesisError> {
    Ok(Fp6 {
        c0: fp2_negate(cs.namespace(|| "c0"), &a.c0)?,
        c1: fp2_negate(cs.namespace(|| "c1"), &a.c1)?,
        c2: fp2_negate(cs.namespace(|| "c2"), &a.c2)?,
    })
}

/// `Fp6` multiplication (Devegili-et-al. formula): `6` `Fp2` multiplications via 3-way
/// Karatsuba plus the cubic nonresidue fold.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn fp6_multiply<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &Fp6,
    b: &Fp6,
) -> Result<Fp6, SynthesisError> {
    let t0 = fp2_multiply(cs.namespace(|| "a0*b0"), &a.c0, &b.c0)?;
    let t1 = fp2_multiply(cs.namespace(|| "a1*b1"), &a.c1, &b.c1)?;
    let t2 = fp2_multiply(cs.namespace(|| "a2*b2"), &a.c2, &b.c2)?;

    let a1a2 = fp2_add(cs.namespace(|| "a1+a2"), &a.c1, &a.c2)?;
    let b1b2 = fp2_add(cs.namespace(|| "b1+b2"), &b.c1, &b.c2)?;
    let cross_12 = fp2_multiply(cs.namespace(|| "(a1+a2)(b1+b2)"), &a1a2, &b1b2)?;
    let cross_12_minus_t1 = fp2_subtract(cs.namespace(|| "cross12 - t1"), &cross_12, &t1)?;
    let cross_12_minus_t1_t2 = fp2_subtract(cs.namespace(|| "cross12 - t1 - t2"), &cross_12_minus_t1, &t2)?;
    let nonres_term = mul_by_nonresidue(cs.namespace(|| "xi * (cross12 - t1 - t2)"), &cross_12_minus_t1_t2)?;
    let c0 = fp2_add(cs.namespace(|| "t0 + xi*(...)"), &t0, &nonres_term)?;

    let a0a1 = fp2_add(cs.namespace(|| "a0+a1"), &a.c0, &a.c1)?;
    let b0b1 = fp2_add(cs.namespace(|| "b0+b1"), &b.c0, &b.c1)?;
    let cross_01 = fp2_multiply(cs.namespace(|| "(a0+a1)(b0+b1)"), &a0a1, &b0b1)?;
    let cross_01_minus_t0 = fp2_subtract(cs.namespace(|| "cross01 - t0"), &cross_01, &t0)?;
    let cross_01_minus_t0_t1 = fp2_subtract(cs.namespace(|| "cross01 - t0 - t1"), &cross_01_minus_t0, &t1)?;
    let xi_t2 = mul_by_nonresidue(cs.namespace(|| "xi*t2"), &t2)?;
    let c1 = fp2_add(cs.namespace(|| "cross01 - t0 - t1 + xi*t2"), &cross_01_minus_t0_t1, &xi_t2)?;

    let a0a2 = fp2_add(cs.namespace(|| "a0+a2"), &a.c0, &a.c2)?;
    let b0b2 = fp2_add(cs.namespace(|| "b0+b2"), &b.c0, &b.c2)?;
    let cross_02 = fp2_multiply(cs.namespace(|| "(a0+a2)(b0+b2)"), &a0a2, &b0b2)?;
    let cross_02_minus_t0 = fp2_subtract(cs.namespace(|| "cross02 - t0"), &cross_02, &t0)?;
    let cross_02_plus_t1 = fp2_add(cs.namespace(|| "cross02 - t0 + t1"), &cross_02_minus_t0, &t1)?;
    let c2 = fp2_subtract(cs.namespace(|| "cross02 - t0 + t1 - t2"), &cross_02_plus_t1, &t2)?;

    Ok(Fp6 { c0, c1, c2 })
}

/// `Fp6` inversion, via the standard cubic-extension formula: compute the three cofactor terms
/// `t0, t1, t2` and the `Fp2`-valued norm `t3`, then scale each cofactor by `t3^-1`.
///
/// # Errors
/// Returns [`SynthesisError`] if `a` is zero, or on constraint failure.
pub fn fp6_invert<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp6) -> Result<Fp6, SynthesisError> {
    let a0_sq = fp2_multiply(cs.namespace(|| "a0^2"), &a.c0, &a.c0)?;
    let a1a2 = fp2_multiply(cs.namespace(|| "a1*a2"), &a.c1, &a.c2)?;
    let xi_a1a2 = mul_by_nonresidue(cs.namespace(|| "xi*a1*a2"), &a1a2)?;
    let t0 = fp2_subtract(cs.namespace(|| "t0 = a0^2 - xi*a1*a2"), &a0_sq, &xi_a1a2)?;

    let a2_sq = fp2_multiply(cs.namespace(|| "a2^2"), &a.c2, &a.c2)?;
    let xi_a2_sq = mul_by_nonresidue(cs.namespace(|| "xi*a2^2"), &a2_sq)?;
    let a0a1 = fp2_multiply(cs.namespace(|| "a0*a1"), &a.c0, &a.c1)?;
    let t1 = fp2_subtract(cs.namespace(|| "t1 = xi*a2^2 - a0*a1"), &xi_a2_sq, &a0a1)?;

    let a1_sq = fp2_multiply(cs.namespace(|| "a1^2"), &a.c1, &a.c1)?;
    let a0a2 = fp2_multiply(cs.namespace(|| "a0*a2"), &a.c0, &a.c2)?;
    let t2 = fp2_subtract(cs.namespace(|| "t2 = a1^2 - a0*a2"), &a1_sq, &a0a2)?;

    let a2_t1 = fp2_multiply(cs.namespace(|| "a2*t1"), &a.c2, &t1)?;
    let xi_a2_t1 = mul_by_nonresidue(cs.namespace(|| "xi*a2*t1"), &a2_t1)?;
    let a0_t0 = fp2_multiply(cs.namespace(|| "a0*t0"), &a.c0, &t0)?;
    let a1_t2 = fp2_multiply(cs.namespace(|| "a1*t2"), &a.c1, &t2)?;
    let xi_a1_t2 = mul_by_nonresidue(cs.namespace(|| "xi*a1*t2"), &a1_t2)?;

    let sum = fp2_add(cs.namespace(|| "xi*a2*t1 + a0*t0"), &xi_a2_t1, &a0_t0)?;
    let norm = fp2_add(cs.namespace(|| "norm"), &sum, &xi_a1_t2)?;
    let norm_inv = fp2_invert(cs.namespace(|| "norm^-1"), &norm)?;

    Ok(Fp6 {
        c0: fp2_multiply(cs.namespace(|| "c0 = t0 * norm^-1"), &t0, &norm_inv)?,
        c1: fp2_multiply(cs.namespace(|| "c1 = t1 * norm^-1"), &t1, &norm_inv)?,
        c2: fp2_multiply(cs.namespace(|| "c2 = t2 * norm^-1"), &t2, &norm_inv)?,
    })
}

/// Multiplies an `Fp6` element by `v` (the `Fp12` cubic-to-quadratic nonresidue fold, also used
/// directly when `v` itself needs shifting up a degree): `(c0,c1,c2)*v = (xi*c2, c0, c1)`.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn mul_by_v<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp6) -> Result<Fp6, SynthesisError> {
    let c0 = mul_by_nonresidue(cs.namespace(|| "xi*c2"), &a.c2)?;
    Ok(Fp6 { c0, c1: a.c0.clone(), c2: a.c1.clone() })
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{Fp6, fp6_add, fp6_multiply, fp6_subtract};
    use crate::fp::Fp;
    use crate::fp2::Fp2;
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

    fn alloc_fp6<CS: bellman::ConstraintSystem<Scalar>>(mut cs: CS, values: [u64; 6]) -> Fp6 {
        Fp6 {
            c0: Fp2 {
                c0: alloc_fp(cs.namespace(|| "c0.0"), values[0]),
                c1: alloc_fp(cs.namespace(|| "c0.1"), values[1]),
            },
            c1: Fp2 {
                c0: alloc_fp(cs.namespace(|| "c1.0"), values[2]),
                c1: alloc_fp(cs.namespace(|| "c1.1"), values[3]),
            },
            c2: Fp2 {
                c0: alloc_fp(cs.namespace(|| "c2.0"), values[4]),
                c1: alloc_fp(cs.namespace(|| "c2.1"), values[5]),
            },
        }
    }

    #[test]
    fn add_then_subtract_round_trips() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp6(cs.namespace(|| "a"), [1, 2, 3, 4, 5, 6]);
        let b = alloc_fp6(cs.namespace(|| "b"), [6, 5, 4, 3, 2, 1]);

        let sum = fp6_add(cs.namespace(|| "add"), &a, &b).expect("add");
        let back = fp6_subtract(cs.namespace(|| "sub"), &sum, &b).expect("sub");
        assert!(cs.is_satisfied());
        assert_eq!(back.c0.c0.0.limbs[0].get_value(), Some(Scalar::from(1_u64)));
    }

    #[test]
    fn multiplication_is_constraint_satisfiable() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let a = alloc_fp6(cs.namespace(|| "a"), [1, 0, 0, 0, 0, 0]);
        let b = alloc_fp6(cs.namespace(|| "b"), [2, 0, 0, 0, 0, 0]);
        let product = fp6_multiply(cs.namespace(|| "mul"), &a, &b).expect("mul");
        assert!(cs.is_satisfied());
        assert_eq!(product.c0.c0.0.limbs[0].get_value(), Some(Scalar::from(2_u64)));
    }
}
