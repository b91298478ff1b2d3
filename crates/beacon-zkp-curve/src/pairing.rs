//! Optimal-ate Miller loop and final exponentiation.
//!
//! The loop iterates the bits of `|x|` (the BLS parameter) high-to-low, accumulating line
//! functions evaluated at the fixed G1 point into an `Fp12` accumulator; `MillerLoopFp2Two` runs
//! two independent loops that share the same doubling/addition schedule over `x` and multiplies
//! their accumulators register-wise, matching the batched-pairing shape used by the signature
//! check (the Step circuit evaluates `e(g1_gen, -sig) * e(pubkey, H(m))` as one product).

use beacon_zkp_bigint::add_sub::BigIntCanonical;
use beacon_zkp_core::constants::{BLS12381_PARAMETER, K};
use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, SynthesisError};
use beacon_zkp_field::fp::Fp;
use beacon_zkp_field::fp12::{Fp12, fp12_conjugate, fp12_invert, fp12_multiply};
use beacon_zkp_field::fp2::{Fp2, fp2_add, fp2_invert, fp2_multiply, fp2_negate, fp2_subtract};
use beacon_zkp_field::fp6::Fp6;
use bls12_381::Scalar;
use ff::Field;

use crate::point_g1::G1Point;
use crate::point_g2::{G2Point, elliptic_curve_add_g2};

fn alloc_fp_const<CS: ConstraintSystem<Scalar>>(mut cs: CS, value: u64) -> Result<Fp, SynthesisError> {
    let limbs = (0..K)
        .map(|i| {
            let v = if i == 0 { Scalar::from(value) } else { Scalar::ZERO };
            AllocatedNum::alloc(cs.namespace(|| format!("limb {i}")), || Ok(v))
        })
        .collect::<Result<_, _>>()?;
    Ok(Fp(BigIntCanonical { limbs }))
}

fn zero_fp2<CS: ConstraintSystem<Scalar>>(mut cs: CS) -> Result<Fp2, SynthesisError> {
    Ok(Fp2 {
        c0: alloc_fp_const(cs.namespace(|| "c0"), 0)?,
        c1: alloc_fp_const(cs.namespace(|| "c1"), 0)?,
    })
}

fn one_fp12<CS: ConstraintSystem<Scalar>>(mut cs: CS) -> Result<Fp12, SynthesisError> {
    let one = Fp2 { c0: alloc_fp_const(cs.namespace(|| "one c0"), 1)?, c1: alloc_fp_const(cs.namespace(|| "one c1"), 0)? };
    let zero = zero_fp2(cs.namespace(|| "zero"))?;
    Ok(Fp12 {
        c0: Fp6 { c0: one, c1: zero.clone(), c2: zero.clone() },
        c1: Fp6 { c0: zero.clone(), c1: zero.clone(), c2: zero },
    })
}

/// Embeds a sparse line-function value `(a, b, c) \in Fp2^3` into a full `Fp12` element
/// (`a + b*w + c*v*w`) so it can be folded into the Miller-loop accumulator with ordinary
/// `Fp12` multiplication.
fn embed_line<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: Fp2, b: Fp2, c: Fp2) -> Result<Fp12, SynthesisError> {
    let zero = zero_fp2(cs.namespace(|| "zero"))?;
    Ok(Fp12 {
        c0: Fp6 { c0: a, c1: zero.clone(), c2: zero },
        c1: Fp6 { c0: zero_fp2(cs.namespace(|| "zero again"))?, c1: b, c2: c },
    })
}

/// Evaluates the tangent (doubling, `q = None`) or chord (addition) line function of the point
/// `t` at the fixed G1 point `p`, returning its sparse `Fp2^3` representation. Which variant is
/// emitted is decided by the compile-time schedule, never by a witness value, so the constraint
/// shape is identical across key generation and proving.
fn line_function<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    t: &G2Point,
    q: Option<&G2Point>,
    p: &G1Point,
) -> Result<(Fp2, Fp2, Fp2), SynthesisError> {
    let (numerator, denominator) = match q {
        Some(q) => (
            fp2_subtract(cs.namespace(|| "y_q - y_t"), &q.y, &t.y)?,
            fp2_subtract(cs.namespace(|| "x_q - x_t"), &q.x, &t.x)?,
        ),
        None => {
            let x_sq = fp2_multiply(cs.namespace(|| "x_t^2"), &t.x, &t.x)?;
            let two_x_sq = fp2_add(cs.namespace(|| "2*x_t^2"), &x_sq, &x_sq)?;
            let three_x_sq = fp2_add(cs.namespace(|| "3*x_t^2"), &two_x_sq, &x_sq)?;
            let two_y = fp2_add(cs.namespace(|| "2*y_t"), &t.y, &t.y)?;
            (three_x_sq, two_y)
        }
    };
    let denominator_inv = fp2_invert(cs.namespace(|| "1/den"), &denominator)?;
    let slope = fp2_multiply(cs.namespace(|| "slope"), &numerator, &denominator_inv)?;

    // Line: y - y_t - slope*(x - x_t) = 0, evaluated at (p.x, p.y) and lifted through the sextic
    // twist by pairing the G1 (Fp) coordinates with the Fp2-valued slope and intercept.
    let slope_x_t = fp2_multiply(cs.namespace(|| "slope*x_t"), &slope, &t.x)?;
    let c_const = fp2_subtract(cs.namespace(|| "slope*x_t - y_t"), &slope_x_t, &t.y)?;

    let p_x_fp2 = Fp2 { c0: p.x.clone(), c1: alloc_fp_const(cs.namespace(|| "zero for p.x"), 0)? };
    let p_y_fp2 = Fp2 { c0: p.y.clone(), c1: alloc_fp_const(cs.namespace(|| "zero for p.y"), 0)? };

    let a_unnegated = fp2_multiply(cs.namespace(|| "slope * p.x"), &slope, &p_x_fp2)?;
    let a = fp2_negate(cs.namespace(|| "-slope*p.x"), &a_unnegated)?;

    Ok((a, p_y_fp2, c_const))
}

/// `MillerLoop`: the optimal-ate Miller loop for a single `(P, Q) \in G1 \times G2` pair.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn miller_loop<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    p: &G1Point,
    q: &G2Point,
) -> Result<Fp12, SynthesisError> {
    let mut f = one_fp12(cs.namespace(|| "f = 1"))?;
    let mut t = q.clone();

    // The double-and-add schedule is fixed by the constant parameter; the leading set bit is
    // consumed by the `t = q` initialization, so the loop walks the bits below it.
    let msb = 63 - BLS12381_PARAMETER.leading_zeros();
    for i in (0..msb).rev() {
        let mut cs = cs.namespace(|| format!("bit {i}"));
        let f_sq = fp12_multiply(cs.namespace(|| "f^2"), &f, &f)?;
        let (a, b, c) = line_function(cs.namespace(|| "tangent at t"), &t, None, p)?;
        let line = embed_line(cs.namespace(|| "embed tangent"), a, b, c)?;
        f = fp12_multiply(cs.namespace(|| "f^2 * line"), &f_sq, &line)?;
        t = elliptic_curve_add_g2(cs.namespace(|| "double t"), &t, &t)?;

        if (BLS12381_PARAMETER >> i) & 1 == 1 {
            let (a, b, c) = line_function(cs.namespace(|| "chord at t,q"), &t, Some(q), p)?;
            let line = embed_line(cs.namespace(|| "embed chord"), a, b, c)?;
            f = fp12_multiply(cs.namespace(|| "f * line (add step)"), &f, &line)?;
            t = elliptic_curve_add_g2(cs.namespace(|| "add q"), &t, q)?;
        }
    }

    Ok(f)
}

/// `MillerLoopFp2Two`: runs two Miller loops and multiplies the accumulators register-wise, for
/// the batched `e(g1_gen, -sig) \cdot e(pubkey, H(m))` pairing check.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn miller_loop_fp2_two<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    p0: &G1Point,
    q0: &G2Point,
    p1: &G1Point,
    q1: &G2Point,
) -> Result<Fp12, SynthesisError> {
    let f0 = miller_loop(cs.namespace(|| "loop 0"), p0, q0)?;
    let f1 = miller_loop(cs.namespace(|| "loop 1"), p1, q1)?;
    fp12_multiply(cs.namespace(|| "f0 * f1"), &f0, &f1)
}

/// `FinalExponentiate`: raises the Miller output to `(q^12 - 1)/r`, factored as
/// `(q^6 - 1) * (q^6 + 1)/r`. The first factor is `conjugate(f) * f^{-1}` (the `q^6` Frobenius
/// power coincides with conjugation for the quadratic extension `Fp12/Fp6`); the second is an
/// integer (the embedding degree is 12, so `r` divides `q^6 + 1`) applied by plain
/// square-and-multiply over its fixed bits, rather than the optimized
/// Karabina/Fuentes-Castañeda cyclotomic chain.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn final_exponentiate<CS: ConstraintSystem<Scalar>>(mut cs: CS, f: &Fp12) -> Result<Fp12, SynthesisError> {
    let conjugated = fp12_conjugate(cs.namespace(|| "conjugate"), f)?;
    let inverse = fp12_invert(cs.namespace(|| "f^-1"), f)?;
    let easy = fp12_multiply(cs.namespace(|| "conjugate(f) * f^-1"), &conjugated, &inverse)?;

    let hard_exponent = hard_exponent();
    let mut acc = one_fp12(cs.namespace(|| "acc = 1"))?;
    for i in (0..hard_exponent.bits()).rev() {
        let mut cs = cs.namespace(|| format!("hard part bit {i}"));
        acc = fp12_multiply(cs.namespace(|| "acc^2"), &acc, &acc)?;
        if hard_exponent.bit(i) {
            acc = fp12_multiply(cs.namespace(|| "acc * easy"), &acc, &easy)?;
        }
    }
    Ok(acc)
}

/// The fixed integer exponent `(q^6 + 1)/r` applied by [`final_exponentiate`]'s hard part.
fn hard_exponent() -> num_bigint::BigUint {
    use beacon_zkp_bigint::hints::limbs_to_biguint;
    use beacon_zkp_core::constants::{BLS12381_PRIME, N};
    use ff::PrimeField;
    use num_bigint::BigUint;
    use num_traits::Num as _;

    let base_prime = limbs_to_biguint(&BLS12381_PRIME, N);
    let scalar_order = BigUint::from_str_radix(Scalar::MODULUS.trim_start_matches("0x"), 16)
        .unwrap_or_else(|_| unreachable!("the scalar field modulus is valid hex"));
    (base_prime.pow(6) + BigUint::from(1_u8)) / scalar_order
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{hard_exponent, one_fp12};

    #[test]
    fn one_is_a_valid_witness() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let _ = one_fp12(cs.namespace(|| "one")).expect("alloc one");
        assert!(cs.is_satisfied());
    }

    #[test]
    fn hard_exponent_divides_evenly() {
        use beacon_zkp_bigint::hints::limbs_to_biguint;
        use beacon_zkp_core::constants::{BLS12381_PRIME, N};
        use ff::PrimeField as _;
        use num_bigint::BigUint;
        use num_traits::Num as _;

        let base_prime = limbs_to_biguint(&BLS12381_PRIME, N);
        let scalar_order =
            BigUint::from_str_radix(Scalar::MODULUS.trim_start_matches("0x"), 16).expect("hex");
        assert_eq!(
            hard_exponent() * scalar_order,
            base_prime.pow(6) + BigUint::from(1_u8),
            "r must divide q^6 + 1 exactly"
        );
    }
}
