//! G2 point gadgets over [`Fp2`]: the same shape as [`crate::point_g1`], mirrored onto the
//! quadratic twist.

use beacon_zkp_bigint::add_sub::BigIntCanonical;
use beacon_zkp_core::constants::{CURVE_B1, K};
use bellman::gadgets::boolean::Boolean;
use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, SynthesisError};
use beacon_zkp_field::fp::Fp;
use beacon_zkp_field::fp2::{Fp2, fp2_add, fp2_invert, fp2_multiply, fp2_negate, fp2_subtract};
use bls12_381::Scalar;
use ff::Field;

/// An affine G2 point over `Fp2`, plus an `is_infinity` flag.
#[derive(Clone)]
pub struct G2Point {
    /// Affine x-coordinate.
    pub x: Fp2,
    /// Affine y-coordinate.
    pub y: Fp2,
    /// Whether this represents the point at infinity.
    pub is_infinity: Boolean,
}

fn select_fp2<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    condition: &Boolean,
    if_true: &Fp2,
    if_false: &Fp2,
) -> Result<Fp2, SynthesisError> {
    Ok(Fp2 {
        c0: select_fp(cs.namespace(|| "c0"), condition, &if_true.c0, &if_false.c0)?,
        c1: select_fp(cs.namespace(|| "c1"), condition, &if_true.c1, &if_false.c1)?,
    })
}

fn select_fp<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    condition: &Boolean,
    if_true: &Fp,
    if_false: &Fp,
) -> Result<Fp, SynthesisError> {
    let mut limbs = Vec::with_capacity(K);
    for i in 0..K {
        let mut cs = cs.namespace(|| format!("limb {i}"));
        let result_value = match condition.get_value() {
            Some(true) => if_true.0.limbs[i].get_value(),
            Some(false) => if_false.0.limbs[i].get_value(),
            None => None,
        };
        let result = AllocatedNum::alloc(cs.namespace(|| "selected"), || {
            result_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        cs.enforce(
            || "select via condition * (true - false)",
            |_| condition.lc(CS::one(), Scalar::ONE),
            |lc| lc + if_true.0.limbs[i].get_variable() - if_false.0.limbs[i].get_variable(),
            |lc| lc + result.get_variable() - if_false.0.limbs[i].get_variable(),
        );
        limbs.push(result);
    }
    Ok(Fp(BigIntCanonical { limbs }))
}

fn one_fp2<CS: ConstraintSystem<Scalar>>(mut cs: CS) -> Result<Fp2, SynthesisError> {
    let one_limbs = (0..K)
        .map(|i| {
            let value = if i == 0 { Scalar::ONE } else { Scalar::ZERO };
            AllocatedNum::alloc(cs.namespace(|| format!("one limb {i}")), || Ok(value))
        })
        .collect::<Result<_, _>>()?;
    let zero_limbs = (0..K)
        .map(|i| AllocatedNum::alloc(cs.namespace(|| format!("zero limb {i}")), || Ok(Scalar::ZERO)))
        .collect::<Result<_, _>>()?;
    Ok(Fp2 { c0: Fp(BigIntCanonical { limbs: one_limbs }), c1: Fp(BigIntCanonical { limbs: zero_limbs }) })
}

fn is_zero_fp2<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2) -> Result<Boolean, SynthesisError> {
    let c0_zero = beacon_zkp_field::fp::fp_is_zero(cs.namespace(|| "c0 == 0"), &a.c0)?;
    let c1_zero = beacon_zkp_field::fp::fp_is_zero(cs.namespace(|| "c1 == 0"), &a.c1)?;
    Boolean::and(cs.namespace(|| "both zero"), &c0_zero, &c1_zero)
}

fn eq_fp2<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2, b: &Fp2) -> Result<Boolean, SynthesisError> {
    let diff = fp2_subtract(cs.namespace(|| "a - b"), a, b)?;
    is_zero_fp2(cs.namespace(|| "diff == 0"), &diff)
}

/// `EllipticCurveAdd` on the G2 twist, the same case structure as [`crate::point_g1`].
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn elliptic_curve_add_g2<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    a: &G2Point,
    b: &G2Point,
) -> Result<G2Point, SynthesisError> {
    let x_eq = eq_fp2(cs.namespace(|| "x_a == x_b"), &a.x, &b.x)?;
    let y_eq = eq_fp2(cs.namespace(|| "y_a == y_b"), &a.y, &b.y)?;
    let is_doubling = Boolean::and(cs.namespace(|| "doubling"), &x_eq, &y_eq)?;
    let is_opposite = Boolean::and(cs.namespace(|| "opposite"), &x_eq, &y_eq.not())?;

    let three_x = {
        let two_x = fp2_add(cs.namespace(|| "2x"), &a.x, &a.x)?;
        fp2_add(cs.namespace(|| "3x"), &two_x, &a.x)?
    };
    let x_sq = fp2_multiply(cs.namespace(|| "x^2"), &a.x, &a.x)?;
    let double_num = fp2_multiply(cs.namespace(|| "3x*x"), &three_x, &x_sq)?;
    let double_den = fp2_add(cs.namespace(|| "2y"), &a.y, &a.y)?;

    let generic_num = fp2_subtract(cs.namespace(|| "y_b - y_a"), &b.y, &a.y)?;
    let generic_den = fp2_subtract(cs.namespace(|| "x_b - x_a"), &b.x, &a.x)?;

    let slope = select_fp2(cs.namespace(|| "select numerator"), &is_doubling, &double_num, &generic_num)?;
    let slope_den = select_fp2(cs.namespace(|| "select denominator"), &is_doubling, &double_den, &generic_den)?;

    let one = one_fp2(cs.namespace(|| "one"))?;
    let den_is_zero = is_zero_fp2(cs.namespace(|| "den == 0"), &slope_den)?;
    let safe_den = select_fp2(cs.namespace(|| "guard zero denominator"), &den_is_zero, &one, &slope_den)?;
    let den_inv = fp2_invert(cs.namespace(|| "1/den"), &safe_den)?;
    let lambda = fp2_multiply(cs.namespace(|| "lambda"), &slope, &den_inv)?;

    let lambda_sq = fp2_multiply(cs.namespace(|| "lambda^2"), &lambda, &lambda)?;
    let x_sum = fp2_add(cs.namespace(|| "x_a+x_b"), &a.x, &b.x)?;
    let x_out = fp2_subtract(cs.namespace(|| "lambda^2 - x_sum"), &lambda_sq, &x_sum)?;
    let x_diff = fp2_subtract(cs.namespace(|| "x_a - x_out"), &a.x, &x_out)?;
    let lambda_term = fp2_multiply(cs.namespace(|| "lambda*(x_a-x_out)"), &lambda, &x_diff)?;
    let y_out = fp2_subtract(cs.namespace(|| "... - y_a"), &lambda_term, &a.y)?;

    // Same infinity-flag cases as the G1 gadget: both already infinite, or both affine and
    // cancelling.
    let both_infinity =
        Boolean::and(cs.namespace(|| "a.inf && b.inf"), &a.is_infinity, &b.is_infinity)?;
    let both_affine =
        Boolean::and(cs.namespace(|| "both affine"), &a.is_infinity.not(), &b.is_infinity.not())?;
    let affine_cancel =
        Boolean::and(cs.namespace(|| "affine && opposite"), &both_affine, &is_opposite)?;
    let result_is_infinity = Boolean::and(
        cs.namespace(|| "neither infinity case"),
        &both_infinity.not(),
        &affine_cancel.not(),
    )?
    .not();

    let x_mid = select_fp2(cs.namespace(|| "a.inf -> b.x"), &a.is_infinity, &b.x, &x_out)?;
    let y_mid = select_fp2(cs.namespace(|| "a.inf -> b.y"), &a.is_infinity, &b.y, &y_out)?;
    let x_final = select_fp2(cs.namespace(|| "b.inf -> a.x"), &b.is_infinity, &a.x, &x_mid)?;
    let y_final = select_fp2(cs.namespace(|| "b.inf -> a.y"), &b.is_infinity, &a.y, &y_mid)?;

    Ok(G2Point { x: x_final, y: y_final, is_infinity: result_is_infinity })
}

/// Negates a G2 point: flips the sign of `y`, leaves `x` and `is_infinity` untouched.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn negate_g2<CS: ConstraintSystem<Scalar>>(mut cs: CS, point: &G2Point) -> Result<G2Point, SynthesisError> {
    Ok(G2Point {
        x: point.x.clone(),
        y: fp2_negate(cs.namespace(|| "-y"), &point.y)?,
        is_infinity: point.is_infinity.clone(),
    })
}

/// `PointOnBLSCurveNoCheck` for G2: proves `y^2 = x^3 + b_twist` with the M-twist coefficient
/// `b_twist = 4(1 + u)`.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn point_on_curve_no_check_g2<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    point: &G2Point,
) -> Result<(), SynthesisError> {
    let y_sq = fp2_multiply(cs.namespace(|| "y^2"), &point.y, &point.y)?;
    let x_sq = fp2_multiply(cs.namespace(|| "x^2"), &point.x, &point.x)?;
    let x_cubed = fp2_multiply(cs.namespace(|| "x^3"), &x_sq, &point.x)?;

    let b_c0 = (0..K)
        .map(|i| {
            let value = if i == 0 { Scalar::from(CURVE_B1) } else { Scalar::ZERO };
            AllocatedNum::alloc(cs.namespace(|| format!("b limb {i}")), || Ok(value))
        })
        .collect::<Result<_, _>>()?;
    let b_c1 = (0..K)
        .map(|i| {
            let value = if i == 0 { Scalar::from(CURVE_B1) } else { Scalar::ZERO };
            AllocatedNum::alloc(cs.namespace(|| format!("b imag limb {i}")), || Ok(value))
        })
        .collect::<Result<_, _>>()?;
    let b = Fp2 { c0: Fp(BigIntCanonical { limbs: b_c0 }), c1: Fp(BigIntCanonical { limbs: b_c1 }) };

    let rhs = fp2_add(cs.namespace(|| "x^3+b"), &x_cubed, &b)?;
    let eq = eq_fp2(cs.namespace(|| "y^2 == x^3+b"), &y_sq, &rhs)?;
    Boolean::enforce_equal(cs.namespace(|| "curve equation holds"), &eq, &Boolean::constant(true))
}

/// The prime order `r` of the G1/G2 subgroups, as an integer.
fn subgroup_order() -> num_bigint::BigUint {
    use ff::PrimeField;
    use num_traits::Num as _;

    num_bigint::BigUint::from_str_radix(Scalar::MODULUS.trim_start_matches("0x"), 16)
        .unwrap_or_else(|_| unreachable!("the scalar field modulus is valid hex"))
}

/// `SubgroupCheckG2`: the same `[r]P = O` annihilation check as
/// [`crate::point_g1::subgroup_check_g1`], mirrored onto the twist. The twist's cofactor is
/// far larger than G1's, so this is the check that actually rejects cofactor-torsion
/// signatures; the candidate must already be bound to the curve equation by
/// [`point_on_curve_no_check_g2`].
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn subgroup_check_g2<CS: ConstraintSystem<Scalar>>(mut cs: CS, point: &G2Point) -> Result<(), SynthesisError> {
    let order = subgroup_order();
    let mut acc = G2Point { x: point.x.clone(), y: point.y.clone(), is_infinity: Boolean::constant(true) };
    for i in (0..order.bits()).rev() {
        let mut cs = cs.namespace(|| format!("bit {i}"));
        acc = elliptic_curve_add_g2(cs.namespace(|| "double"), &acc, &acc)?;
        if order.bit(i) {
            acc = elliptic_curve_add_g2(cs.namespace(|| "add"), &acc, point)?;
        }
    }
    Boolean::enforce_equal(
        cs.namespace(|| "order multiple is the identity"),
        &acc.is_infinity,
        &Boolean::constant(true),
    )
}
