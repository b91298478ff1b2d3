//! draft-irtf-cfrg-hash-to-curve (RFC 9380) for BLS12-381 G2: `I2OSP`, `ExpandMessageXMD`,
//! `HashToField`, and `MapToG2`.
//!
//! `ExpandMessageXMD` and the SHA-256 calls underneath it are expressed in-circuit via
//! `bellman::gadgets::sha256`, operating over bit vectors the same way `beacon-zkp-ssz` hashes
//! SSZ leaves; the reduction of each 64-byte expanded chunk down to an `Fp` element goes
//! through `BigMod`, matching every other field-boundary reduction in this crate. `MapToG2`
//! follows the standard pipeline: simplified SWU onto the 3-isogenous auxiliary curve
//! (`A' = 240u`, `B' = 1012(1+u)`, `Z = -(2+u)`), the 3-isogeny evaluation back to the target
//! twist, point addition, and cofactor clearing by the effective cofactor.

use beacon_zkp_bigint::add_sub::BigIntCanonical;
use beacon_zkp_bigint::mod_reduce::big_mod;
use beacon_zkp_core::constants::{BLS12381_PARAMETER, BLS12381_PRIME, DST, K, N};
use bellman::gadgets::boolean::{AllocatedBit, Boolean};
use bellman::gadgets::num::AllocatedNum;
use bellman::gadgets::sha256::sha256;
use bellman::{ConstraintSystem, SynthesisError};
use beacon_zkp_field::fp::{Fp, fp_is_zero, fp_sgn0};
use beacon_zkp_field::fp2::{Fp2, fp2_add, fp2_invert, fp2_multiply, fp2_negate};
use bls12_381::Scalar;
use ff::Field;
use num_bigint::BigUint;

use crate::point_g2::{G2Point, elliptic_curve_add_g2};

/// `L` from the hash-to-curve suite parameters for BLS12-381 (`ceil((381 + 128) / 8)`).
const L_BYTES: usize = 64;
/// `COUNT`, the number of `Fp2` field elements `HashToField` produces for the SSWU map (`u0` and
/// `u1`); each `Fp2` element itself needs `M = 2` base-field coordinates.
const COUNT: usize = 2;
/// `M`: base-field coordinates per `Fp2` element.
const M: usize = 2;

/// `I2OSP`: packs a big-endian unsigned integer into exactly `len` bytes, each represented as 8
/// [`Boolean`] bits, bound-checking that the value fits.
///
/// # Errors
/// Returns [`SynthesisError`] if `value` exceeds `len` bytes or on allocation failure.
pub fn i2osp<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: u64,
    len: usize,
) -> Result<Vec<Boolean>, SynthesisError> {
    assert!(len <= 8, "I2OSP helper only packs values that fit a u64");
    assert!(len == 8 || value < (1_u64 << (len * 8)), "value does not fit in len bytes");

    let mut bits = Vec::with_capacity(len * 8);
    for byte_index in (0..len).rev() {
        let byte = ((value >> (byte_index * 8)) & 0xff) as u8;
        for bit_index in (0..8).rev() {
            let bit_value = (byte >> bit_index) & 1 == 1;
            let allocated = AllocatedBit::alloc(
                cs.namespace(|| format!("byte {byte_index} bit {bit_index}")),
                Some(bit_value),
            )?;
            bits.push(Boolean::from(allocated));
        }
    }
    Ok(bits)
}

/// `ExpandMessageXMD`: produces `ell * 32` pseudorandom bytes from `msg` using SHA-256, per
/// RFC 9380 §5.3.1. Asserts `ell < 255` (the one-byte counter's domain).
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn expand_message_xmd<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    msg: &[Boolean],
    ell: usize,
) -> Result<Vec<Boolean>, SynthesisError> {
    assert!(ell < 255, "ExpandMessageXMD requires ell < 255");

    let dst_bits: Vec<Boolean> = DST
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |bit_idx| (byte >> bit_idx) & 1 == 1))
        .map(Boolean::constant)
        .collect();

    // z_pad = I2OSP(0, 64) (one SHA-256 input block of zero bytes), l_i_b_str = I2OSP(ell*32, 2),
    // dst_prime = DST || I2OSP(len(DST), 1).
    let z_pad = zero_bits(cs.namespace(|| "z_pad"), 64 * 8)?;
    let l_i_b_str = i2osp(cs.namespace(|| "l_i_b_str"), (ell * 32) as u64, 2)?;
    let dst_len = i2osp(cs.namespace(|| "dst_len"), DST.len() as u64, 1)?;

    let mut b0_preimage = Vec::new();
    b0_preimage.extend(z_pad);
    b0_preimage.extend_from_slice(msg);
    b0_preimage.extend(l_i_b_str.clone());
    b0_preimage.extend(i2osp(cs.namespace(|| "zero byte"), 0, 1)?);
    b0_preimage.extend(dst_bits.clone());
    b0_preimage.extend(dst_len.clone());

    let b0 = sha256(cs.namespace(|| "b_0"), &b0_preimage)?;

    let mut b_prev = {
        let mut preimage = b0.clone();
        preimage.extend(i2osp(cs.namespace(|| "counter 1"), 1, 1)?);
        preimage.extend(dst_bits.clone());
        preimage.extend(dst_len.clone());
        sha256(cs.namespace(|| "b_1"), &preimage)?
    };

    let mut output = b_prev.clone();
    for i in 2..=ell {
        let xored: Vec<Boolean> = b0
            .iter()
            .zip(b_prev.iter())
            .enumerate()
            .map(|(j, (a, b))| Boolean::xor(cs.namespace(|| format!("b0 xor b_prev bit {i}.{j}")), a, b))
            .collect::<Result<_, _>>()?;

        let mut preimage = xored;
        preimage.extend(i2osp(cs.namespace(|| format!("counter {i}")), i as u64, 1)?);
        preimage.extend(dst_bits.clone());
        preimage.extend(dst_len.clone());
        let b_i = sha256(cs.namespace(|| format!("b_{i}")), &preimage)?;
        output.extend(b_i.clone());
        b_prev = b_i;
    }

    Ok(output)
}

fn zero_bits<CS: ConstraintSystem<Scalar>>(mut cs: CS, num_bits: usize) -> Result<Vec<Boolean>, SynthesisError> {
    (0..num_bits)
        .map(|i| AllocatedBit::alloc(cs.namespace(|| format!("zero bit {i}")), Some(false)).map(Boolean::from))
        .collect()
}

/// `HashToField`: expands `msg` to `COUNT * M * L_BYTES` bytes and reduces each `L_BYTES`-byte
/// big-endian chunk modulo the base prime via `BigMod` (the 512-bit expanded chunk is far wider
/// than `2p`, so the single-subtraction `PrimeReduce` does not apply here), pairing consecutive
/// reduced values into `COUNT` `Fp2` elements (`u0`, `u1`) for the SSWU map.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn hash_to_field<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    msg: &[Boolean],
) -> Result<[Fp2; COUNT], SynthesisError> {
    // `ell` counts 32-byte SHA-256 output blocks, not bytes.
    let ell = (COUNT * M * L_BYTES).div_ceil(32);
    let expanded = expand_message_xmd(cs.namespace(|| "expand"), msg, ell)?;
    let prime = prime_as_bigint(cs.namespace(|| "p"))?;

    let mut coords = Vec::with_capacity(COUNT * M);
    for i in 0..COUNT * M {
        let mut cs = cs.namespace(|| format!("coordinate {i}"));
        let chunk = &expanded[i * L_BYTES * 8..(i + 1) * L_BYTES * 8];
        let wide = bits_to_wide_bigint(cs.namespace(|| "pack wide"), chunk)?;
        let reduced = big_mod(cs.namespace(|| "mod p"), &wide, &prime, &BLS12381_PRIME)?;
        coords.push(Fp(reduced));
    }

    Ok([
        Fp2 { c0: coords[0].clone(), c1: coords[1].clone() },
        Fp2 { c0: coords[2].clone(), c1: coords[3].clone() },
    ])
}

/// `MapToG2`, the RFC 9380 pipeline: simplified SWU onto the 3-isogenous auxiliary curve for
/// each hashed element, the 3-isogeny evaluation back to the target twist, point addition, and
/// cofactor clearing by the effective cofactor.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn map_to_g2<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    u: &[Fp2; COUNT],
) -> Result<G2Point, SynthesisError> {
    let (x0, y0) = simplified_swu(cs.namespace(|| "sswu(u0)"), &u[0])?;
    let (x0, y0) = iso3_map(cs.namespace(|| "isogeny(u0)"), &x0, &y0)?;
    let q0 = G2Point { x: x0, y: y0, is_infinity: Boolean::constant(false) };

    let (x1, y1) = simplified_swu(cs.namespace(|| "sswu(u1)"), &u[1])?;
    let (x1, y1) = iso3_map(cs.namespace(|| "isogeny(u1)"), &x1, &y1)?;
    let q1 = G2Point { x: x1, y: y1, is_infinity: Boolean::constant(false) };

    let sum = elliptic_curve_add_g2(cs.namespace(|| "q0 + q1"), &q0, &q1)?;
    clear_cofactor_g2(cs.namespace(|| "clear cofactor"), &sum)
}

/// Simplified SWU (RFC 9380 §6.6.2, straight-line form) onto the 3-isogenous curve
/// `y^2 = x^3 + A'x + B'`:
///
/// `x1 = (-B'/A') * (1 + 1/(Z^2 u^4 + Z u^2))` (or `B'/(Z A')` in the exceptional case),
/// `x2 = Z u^2 x1`; exactly one of `g(x1)`, `g(x2)` is a square (both when `g(x1)` is), the
/// first square branch is selected via a residue certificate, `y` is its witnessed root, and
/// the sign of `y` is fixed to `sgn0(u)`.
fn simplified_swu<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    u: &Fp2,
) -> Result<(Fp2, Fp2), SynthesisError> {
    let params = swu_params();
    let a = alloc_fp2_constant(cs.namespace(|| "A'"), &params.a)?;
    let b = alloc_fp2_constant(cs.namespace(|| "B'"), &params.b)?;
    let z = alloc_fp2_constant(cs.namespace(|| "Z"), &params.z)?;
    let c1 = alloc_fp2_constant(cs.namespace(|| "-B'/A'"), &params.minus_b_over_a)?;
    let c2 = alloc_fp2_constant(cs.namespace(|| "-1/Z"), &params.minus_one_over_z)?;
    let one = alloc_fp2_constant(cs.namespace(|| "one"), &native_fp2_one())?;

    let u_sq = fp2_multiply(cs.namespace(|| "u^2"), u, u)?;
    let tv1 = fp2_multiply(cs.namespace(|| "Z*u^2"), &z, &u_sq)?;
    let tv2 = fp2_multiply(cs.namespace(|| "Z^2*u^4"), &tv1, &tv1)?;
    let denom_sum = fp2_add(cs.namespace(|| "Zu^2 + Z^2u^4"), &tv1, &tv2)?;

    let (denom_inv, exceptional) = guarded_fp2_invert(cs.namespace(|| "inv0"), &denom_sum)?;
    let regular = fp2_add(cs.namespace(|| "1 + inv0(...)"), &one, &denom_inv)?;
    let x1_frac = select_fp2(cs.namespace(|| "exceptional case"), &exceptional, &c2, &regular)?;
    let x1 = fp2_multiply(cs.namespace(|| "x1"), &c1, &x1_frac)?;

    let gx1 = curve_rhs(cs.namespace(|| "g(x1)"), &x1, &a, &b)?;
    let x2 = fp2_multiply(cs.namespace(|| "x2"), &tv1, &x1)?;
    let gx2 = curve_rhs(cs.namespace(|| "g(x2)"), &x2, &a, &b)?;

    let gx1_is_square = residue_certificate(cs.namespace(|| "is_square(g(x1))"), &gx1)?;

    let x = select_fp2(cs.namespace(|| "select x"), &gx1_is_square, &x1, &x2)?;
    let gx = select_fp2(cs.namespace(|| "select g(x)"), &gx1_is_square, &gx1, &gx2)?;
    let y = witness_fp2_sqrt(cs.namespace(|| "y = sqrt(g(x))"), &gx)?;

    let sgn_u = fp2_sgn0(cs.namespace(|| "sgn0(u)"), u)?;
    let sgn_y = fp2_sgn0(cs.namespace(|| "sgn0(y)"), &y)?;
    let flip = Boolean::xor(cs.namespace(|| "signs differ"), &sgn_u, &sgn_y)?;
    let neg_y = fp2_negate(cs.namespace(|| "-y"), &y)?;
    let y = select_fp2(cs.namespace(|| "fix sign"), &flip, &neg_y, &y)?;

    Ok((x, y))
}

/// `x^3 + A*x + B`.
fn curve_rhs<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    x: &Fp2,
    a: &Fp2,
    b: &Fp2,
) -> Result<Fp2, SynthesisError> {
    let x_sq = fp2_multiply(cs.namespace(|| "x^2"), x, x)?;
    let x_cu = fp2_multiply(cs.namespace(|| "x^3"), &x_sq, x)?;
    let ax = fp2_multiply(cs.namespace(|| "A*x"), a, x)?;
    let with_ax = fp2_add(cs.namespace(|| "x^3 + A*x"), &x_cu, &ax)?;
    fp2_add(cs.namespace(|| "x^3 + A*x + B"), &with_ax, b)
}

/// Allocates and certifies an `is_square` bit for `value`: a claimed residue is accompanied by
/// a square root of `value`, a claimed non-residue by a square root of `zeta * value` (`zeta =
/// 1 + u` the tower non-residue), which exists exactly when `value` is not a square, so the bit
/// cannot be misreported.
fn residue_certificate<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &Fp2,
) -> Result<Boolean, SynthesisError> {
    let value_native = fp_native_limbs(&value.c0).zip(fp_native_limbs(&value.c1));
    let is_square_native = value_native.as_ref().map(|(c0, c1)| native_fp2_is_square(c0, c1));
    let is_square =
        Boolean::from(AllocatedBit::alloc(cs.namespace(|| "is square"), is_square_native)?);

    let zeta_value = mul_by_zeta(cs.namespace(|| "zeta * value"), value)?;
    let target = select_fp2(cs.namespace(|| "certificate target"), &is_square, value, &zeta_value)?;

    let root_native = value_native.zip(is_square_native).map(|((c0, c1), square)| {
        if square {
            native_fp2_sqrt(&c0, &c1)
        } else {
            let (z0, z1) = native_mul_by_zeta(&c0, &c1);
            native_fp2_sqrt(&z0, &z1)
        }
    });
    let root = Fp2 {
        c0: alloc_fp_from_option(
            cs.namespace(|| "root c0"),
            root_native.as_ref().map(|(r0, _)| r0.clone()),
        )?,
        c1: alloc_fp_from_option(
            cs.namespace(|| "root c1"),
            root_native.as_ref().map(|(_, r1)| r1.clone()),
        )?,
    };
    let squared = fp2_multiply(cs.namespace(|| "root^2"), &root, &root)?;
    enforce_fp2_equal(cs.namespace(|| "root^2 == target"), &squared, &target)?;
    Ok(is_square)
}

/// Witnesses a square root of `value` natively (via the `p ≡ 3 (mod 4)` complex square-root
/// formula) and binds it in-circuit by squaring.
fn witness_fp2_sqrt<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &Fp2,
) -> Result<Fp2, SynthesisError> {
    let value_native = fp_native_limbs(&value.c0).zip(fp_native_limbs(&value.c1));
    let root_native = value_native.map(|(c0, c1)| native_fp2_sqrt(&c0, &c1));

    let root = Fp2 {
        c0: alloc_fp_from_option(
            cs.namespace(|| "root c0"),
            root_native.as_ref().map(|(r0, _)| r0.clone()),
        )?,
        c1: alloc_fp_from_option(
            cs.namespace(|| "root c1"),
            root_native.as_ref().map(|(_, r1)| r1.clone()),
        )?,
    };
    let squared = fp2_multiply(cs.namespace(|| "root^2"), &root, &root)?;
    enforce_fp2_equal(cs.namespace(|| "root^2 == value"), &squared, value)?;
    Ok(root)
}

/// RFC 9380 `sgn0` for a degree-2 extension: the sign of `c0`, falling back to the sign of
/// `c1` when `c0` is zero.
fn fp2_sgn0<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2) -> Result<Boolean, SynthesisError> {
    let sign_0 = fp_sgn0(cs.namespace(|| "sgn0(c0)"), &a.c0)?;
    let zero_0 = fp_is_zero(cs.namespace(|| "c0 == 0"), &a.c0)?;
    let sign_1 = fp_sgn0(cs.namespace(|| "sgn0(c1)"), &a.c1)?;
    let fallback = Boolean::and(cs.namespace(|| "c0 zero && sgn0(c1)"), &zero_0, &sign_1)?;
    Ok(Boolean::and(cs.namespace(|| "neither sign set"), &sign_0.not(), &fallback.not())?.not())
}

fn fp2_is_zero_flag<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2) -> Result<Boolean, SynthesisError> {
    let c0_zero = fp_is_zero(cs.namespace(|| "c0 == 0"), &a.c0)?;
    let c1_zero = fp_is_zero(cs.namespace(|| "c1 == 0"), &a.c1)?;
    Boolean::and(cs.namespace(|| "both zero"), &c0_zero, &c1_zero)
}

/// Inverts `value`, substituting `1` when it is zero so witness generation stays total, and
/// returns the is-zero flag so the caller can mask the result (`inv0` semantics).
fn guarded_fp2_invert<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &Fp2,
) -> Result<(Fp2, Boolean), SynthesisError> {
    let is_zero = fp2_is_zero_flag(cs.namespace(|| "value == 0"), value)?;
    let one = alloc_fp2_constant(cs.namespace(|| "one"), &native_fp2_one())?;
    let safe = select_fp2(cs.namespace(|| "guard zero"), &is_zero, &one, value)?;
    let inverse = fp2_invert(cs.namespace(|| "invert"), &safe)?;
    Ok((inverse, is_zero))
}

/// Evaluates the 3-isogeny from the auxiliary curve to the target twist (RFC 9380 appendix
/// coefficients): `x = x_num/x_den`, `y = y' * y_num/y_den`.
///
/// The denominators vanish only on the isogeny kernel, which the SSWU image never hits; the
/// guarded inversions keep witness generation total there.
fn iso3_map<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    x: &Fp2,
    y: &Fp2,
) -> Result<(Fp2, Fp2), SynthesisError> {
    let constants = iso3_constants();
    let x_sq = fp2_multiply(cs.namespace(|| "x^2"), x, x)?;
    let x_cu = fp2_multiply(cs.namespace(|| "x^3"), &x_sq, x)?;
    let powers = [x, &x_sq, &x_cu];

    let x_num = eval_poly(cs.namespace(|| "x_num"), &constants.x_num, &powers, false)?;
    let x_den = eval_poly(cs.namespace(|| "x_den"), &constants.x_den, &powers, true)?;
    let y_num = eval_poly(cs.namespace(|| "y_num"), &constants.y_num, &powers, false)?;
    let y_den = eval_poly(cs.namespace(|| "y_den"), &constants.y_den, &powers, true)?;

    let (x_den_inv, _) = guarded_fp2_invert(cs.namespace(|| "1/x_den"), &x_den)?;
    let (y_den_inv, _) = guarded_fp2_invert(cs.namespace(|| "1/y_den"), &y_den)?;
    let x_out = fp2_multiply(cs.namespace(|| "x_num/x_den"), &x_num, &x_den_inv)?;
    let y_frac = fp2_multiply(cs.namespace(|| "y_num/y_den"), &y_num, &y_den_inv)?;
    let y_out = fp2_multiply(cs.namespace(|| "y * y_num/y_den"), y, &y_frac)?;
    Ok((x_out, y_out))
}

/// `coeffs[0] + coeffs[1]*x + ...`, plus a monic leading term `x^len(coeffs)` when `monic`.
fn eval_poly<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    coeffs: &[NativeFp2],
    powers: &[&Fp2; 3],
    monic: bool,
) -> Result<Fp2, SynthesisError> {
    let mut acc = alloc_fp2_constant(cs.namespace(|| "constant term"), &coeffs[0])?;
    for (i, coeff) in coeffs.iter().enumerate().skip(1) {
        let mut cs = cs.namespace(|| format!("term {i}"));
        let k = alloc_fp2_constant(cs.namespace(|| "coefficient"), coeff)?;
        let term = fp2_multiply(cs.namespace(|| "k * x^i"), &k, powers[i - 1])?;
        acc = fp2_add(cs.namespace(|| "accumulate"), &acc, &term)?;
    }
    if monic {
        acc = fp2_add(cs.namespace(|| "monic term"), &acc, powers[coeffs.len() - 1])?;
    }
    Ok(acc)
}

/// Multiplies by the effective cofactor with a fixed double-and-add schedule, landing the sum
/// in the prime-order subgroup.
fn clear_cofactor_g2<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    point: &G2Point,
) -> Result<G2Point, SynthesisError> {
    let cofactor = effective_cofactor();
    let mut acc = G2Point {
        x: point.x.clone(),
        y: point.y.clone(),
        is_infinity: Boolean::constant(true),
    };
    for i in (0..cofactor.bits()).rev() {
        let mut cs = cs.namespace(|| format!("bit {i}"));
        acc = elliptic_curve_add_g2(cs.namespace(|| "double"), &acc, &acc)?;
        if cofactor.bit(i) {
            acc = elliptic_curve_add_g2(cs.namespace(|| "add"), &acc, point)?;
        }
    }
    Ok(acc)
}

/// The effective cofactor `h2 * (3x^2 - 3)` (the scalar the psi-endomorphism clearing method is
/// equivalent to), with `h2 = (x^8 - 4x^7 + 5x^6 - 4x^4 + 6x^3 - 4x^2 - 4x + 13)/9` the twist
/// cofactor and `x` the (negative) BLS parameter.
fn effective_cofactor() -> BigUint {
    use num_bigint::BigInt;
    use num_traits::Zero as _;

    let x = -BigInt::from(BLS12381_PARAMETER);
    let numerator = x.pow(8) - BigInt::from(4) * x.pow(7) + BigInt::from(5) * x.pow(6)
        - BigInt::from(4) * x.pow(4)
        + BigInt::from(6) * x.pow(3)
        - BigInt::from(4) * x.pow(2)
        - BigInt::from(4) * &x
        + BigInt::from(13);
    assert!((&numerator % BigInt::from(9)).is_zero(), "the twist cofactor polynomial is divisible by 9");
    let h2 = numerator / BigInt::from(9);
    let multiplier = BigInt::from(3) * (&x * &x - BigInt::from(1));
    (h2 * multiplier)
        .to_biguint()
        .unwrap_or_else(|| unreachable!("the effective cofactor is positive"))
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

/// Multiplies by the tower non-residue `zeta = 1 + u`: `(c0 + c1*u)(1 + u) = (c0 - c1) +
/// (c0 + c1)*u`.
fn mul_by_zeta<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2) -> Result<Fp2, SynthesisError> {
    Ok(Fp2 {
        c0: beacon_zkp_field::fp::fp_subtract(cs.namespace(|| "c0 - c1"), &a.c0, &a.c1)?,
        c1: beacon_zkp_field::fp::fp_add(cs.namespace(|| "c0 + c1"), &a.c0, &a.c1)?,
    })
}

fn enforce_fp2_equal<CS: ConstraintSystem<Scalar>>(mut cs: CS, a: &Fp2, b: &Fp2) -> Result<(), SynthesisError> {
    for (label, x, y) in [("c0", &a.c0, &b.c0), ("c1", &a.c1, &b.c1)] {
        let diff = beacon_zkp_field::fp::fp_subtract(cs.namespace(|| format!("{label} diff")), x, y)?;
        let is_zero = fp_is_zero(cs.namespace(|| format!("{label} diff == 0")), &diff)?;
        Boolean::enforce_equal(cs.namespace(|| format!("{label} matches")), &is_zero, &Boolean::constant(true))?;
    }
    Ok(())
}

fn alloc_fp_from_option<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    limbs: Option<Vec<u64>>,
) -> Result<Fp, SynthesisError> {
    let allocated = (0..K)
        .map(|i| {
            AllocatedNum::alloc(cs.namespace(|| format!("limb {i}")), || {
                limbs.as_ref().map(|l| Scalar::from(l[i])).ok_or(SynthesisError::AssignmentMissing)
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(Fp(BigIntCanonical { limbs: allocated }))
}

fn alloc_fp2_constant<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &NativeFp2,
) -> Result<Fp2, SynthesisError> {
    use beacon_zkp_bigint::hints::biguint_to_limbs;

    let c0_limbs = biguint_to_limbs(&value.0, K, N);
    let c1_limbs = biguint_to_limbs(&value.1, K, N);
    let c0 = (0..K)
        .map(|i| {
            AllocatedNum::alloc(cs.namespace(|| format!("c0 limb {i}")), || Ok(Scalar::from(c0_limbs[i])))
        })
        .collect::<Result<_, _>>()?;
    let c1 = (0..K)
        .map(|i| {
            AllocatedNum::alloc(cs.namespace(|| format!("c1 limb {i}")), || Ok(Scalar::from(c1_limbs[i])))
        })
        .collect::<Result<_, _>>()?;
    Ok(Fp2 { c0: Fp(BigIntCanonical { limbs: c0 }), c1: Fp(BigIntCanonical { limbs: c1 }) })
}

fn prime_as_bigint<CS: ConstraintSystem<Scalar>>(mut cs: CS) -> Result<BigIntCanonical, SynthesisError> {
    let limbs = (0..K)
        .map(|i| {
            AllocatedNum::alloc(cs.namespace(|| format!("prime limb {i}")), || Ok(Scalar::from(BLS12381_PRIME[i])))
        })
        .collect::<Result<_, _>>()?;
    Ok(BigIntCanonical { limbs })
}

/// Packs a 512-bit big-endian bit vector into a wide (multi-limb) [`BigIntCanonical`] whose
/// limb count comfortably exceeds `K`, suitable as input to [`big_mod`].
fn bits_to_wide_bigint<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    bits: &[Boolean],
) -> Result<BigIntCanonical, SynthesisError> {
    let limb_count = bits.len().div_ceil(N as usize);
    let mut limbs = Vec::with_capacity(limb_count);
    for limb_idx in 0..limb_count {
        let mut cs = cs.namespace(|| format!("limb {limb_idx}"));
        let start = bits.len().saturating_sub((limb_idx + 1) * N as usize);
        let end = bits.len().saturating_sub(limb_idx * N as usize);
        let limb_bits = &bits[start..end];

        let value = limb_bits.iter().rev().enumerate().try_fold(Scalar::ZERO, |acc, (i, bit)| {
            bit.get_value().map(|v| if v { acc + Scalar::from(1_u64 << i) } else { acc })
        });
        let limb = AllocatedNum::alloc(cs.namespace(|| "limb"), || value.ok_or(SynthesisError::AssignmentMissing))?;

        let mut lc = bellman::LinearCombination::<Scalar>::zero();
        let mut coeff = Scalar::ONE;
        for bit in limb_bits.iter().rev() {
            lc = lc + &bit.lc(CS::one(), coeff);
            coeff = coeff.double();
        }
        cs.enforce(|| "limb matches bits", |_| lc, |lc| lc + CS::one(), |lc| lc + limb.get_variable());
        limbs.push(limb);
    }
    Ok(BigIntCanonical { limbs })
}

/// Reads every limb of `fp` as a `u64`; every limb of a canonical [`Fp`] fits `N = 55` bits.
fn fp_native_limbs(fp: &Fp) -> Option<Vec<u64>> {
    fp.0.limbs
        .iter()
        .map(|limb| limb.get_value().map(|v| u64::from_le_bytes(v.to_bytes()[..8].try_into().unwrap_or([0; 8]))))
        .collect()
}

/// A native `Fp2` element as a `(c0, c1)` pair of reduced residues.
type NativeFp2 = (BigUint, BigUint);

fn base_prime() -> BigUint {
    beacon_zkp_bigint::hints::limbs_to_biguint(&BLS12381_PRIME, N)
}

fn native_fp2_one() -> NativeFp2 {
    use num_traits::{One as _, Zero as _};
    (BigUint::one(), BigUint::zero())
}

fn native_fp2_add(a: &NativeFp2, b: &NativeFp2) -> NativeFp2 {
    let p = base_prime();
    ((&a.0 + &b.0) % &p, (&a.1 + &b.1) % &p)
}

fn native_fp2_neg(a: &NativeFp2) -> NativeFp2 {
    let p = base_prime();
    ((&p - &a.0 % &p) % &p, (&p - &a.1 % &p) % &p)
}

fn native_fp2_mul(a: &NativeFp2, b: &NativeFp2) -> NativeFp2 {
    let p = base_prime();
    let re = ((&a.0 * &b.0) % &p + &p - (&a.1 * &b.1) % &p) % &p;
    let im = (&a.0 * &b.1 + &a.1 * &b.0) % &p;
    (re, im)
}

/// `(c0 + c1*u)^-1 = (c0 - c1*u) / (c0^2 + c1^2)`.
fn native_fp2_inv(a: &NativeFp2) -> NativeFp2 {
    use num_traits::Zero as _;

    let p = base_prime();
    let norm = (&a.0 * &a.0 + &a.1 * &a.1) % &p;
    assert!(!norm.is_zero(), "zero has no inverse");
    let norm_inv = norm.modpow(&(&p - BigUint::from(2_u8)), &p);
    ((&a.0 * &norm_inv) % &p, ((&p - &a.1) * &norm_inv) % &p)
}

fn native_mul_by_zeta(c0: &[u64], c1: &[u64]) -> (Vec<u64>, Vec<u64>) {
    use beacon_zkp_bigint::hints::{biguint_to_limbs, limbs_to_biguint};

    let p = base_prime();
    let a0 = limbs_to_biguint(c0, N) % &p;
    let a1 = limbs_to_biguint(c1, N) % &p;
    let z0 = (&p + &a0 - &a1) % &p;
    let z1 = (&a0 + &a1) % &p;
    (biguint_to_limbs(&z0, K, N), biguint_to_limbs(&z1, K, N))
}

/// Euler's criterion lifted through the norm map: `a` is a square in `Fp2` iff
/// `norm(a)^((p-1)/2) != p - 1`.
fn native_fp2_is_square(c0: &[u64], c1: &[u64]) -> bool {
    use beacon_zkp_bigint::hints::limbs_to_biguint;

    let p = base_prime();
    let a0 = limbs_to_biguint(c0, N) % &p;
    let a1 = limbs_to_biguint(c1, N) % &p;
    let norm = (&a0 * &a0 + &a1 * &a1) % &p;
    let legendre = norm.modpow(&((&p - BigUint::from(1_u8)) / BigUint::from(2_u8)), &p);
    legendre != &p - BigUint::from(1_u8)
}

/// Computes a square root of `c0 + c1*u` in `Fp2 = Fp[u]/(u^2+1)`, assuming one exists, via the
/// standard complex construction: `alpha = sqrt(c0^2+c1^2)`, `delta = (c0+alpha)/2` (falling back
/// to `(c0-alpha)/2` when that is not itself a residue), `root_c0 = sqrt(delta)`, `root_c1 =
/// c1/(2*root_c0)`. Since the base prime is `≡ 3 (mod 4)`, each base-field root is a single
/// `a^((p+1)/4)` exponentiation.
fn native_fp2_sqrt(c0: &[u64], c1: &[u64]) -> (Vec<u64>, Vec<u64>) {
    use beacon_zkp_bigint::hints::{biguint_to_limbs, limbs_to_biguint};
    use num_traits::{One, Zero};

    let p = base_prime();
    let a0 = limbs_to_biguint(c0, N) % &p;
    let a1 = limbs_to_biguint(c1, N) % &p;

    let sqrt_exp = (&p + BigUint::one()) / BigUint::from(4_u8);
    let fp_sqrt = |value: &BigUint| -> BigUint { value.modpow(&sqrt_exp, &p) };
    let two_inv = BigUint::from(2_u8).modpow(&(&p - BigUint::from(2_u8)), &p);

    let norm = (&a0 * &a0 + &a1 * &a1) % &p;
    let alpha = fp_sqrt(&norm);

    let delta_plus = ((&a0 + &alpha) % &p * &two_inv) % &p;
    let delta_minus = ((&p + &a0 - &alpha) % &p * &two_inv) % &p;

    let candidate_plus = fp_sqrt(&delta_plus);
    let is_plus_root = (&candidate_plus * &candidate_plus) % &p == delta_plus;
    let root_c0 = if is_plus_root || delta_minus.is_zero() { candidate_plus } else { fp_sqrt(&delta_minus) };

    let root_c1 = if root_c0.is_zero() {
        BigUint::zero()
    } else {
        let root_c0_inv = root_c0.modpow(&(&p - BigUint::from(2_u8)), &p);
        (&a1 * &root_c0_inv % &p * &two_inv) % &p
    };

    (biguint_to_limbs(&root_c0, K, N), biguint_to_limbs(&root_c1, K, N))
}

/// Parameters of the simplified SWU map for the 3-isogenous curve (RFC 9380 §8.8.2):
/// `A' = 240u`, `B' = 1012(1+u)`, `Z = -(2+u)`, plus the two precomputed fractions the
/// straight-line evaluation uses.
struct SwuParams {
    a: NativeFp2,
    b: NativeFp2,
    z: NativeFp2,
    minus_b_over_a: NativeFp2,
    minus_one_over_z: NativeFp2,
}

fn swu_params() -> SwuParams {
    use num_traits::Zero as _;

    let p = base_prime();
    let a = (BigUint::zero(), BigUint::from(240_u32));
    let b = (BigUint::from(1012_u32), BigUint::from(1012_u32));
    let z = (&p - BigUint::from(2_u8), &p - BigUint::from(1_u8));
    let minus_b_over_a = native_fp2_mul(&native_fp2_neg(&b), &native_fp2_inv(&a));
    let minus_one_over_z = native_fp2_neg(&native_fp2_inv(&z));
    SwuParams { a, b, z, minus_b_over_a, minus_one_over_z }
}

/// Coefficients of the 3-isogeny rational map (RFC 9380 appendix, BLS12-381 G2 suite). The
/// denominator polynomials are monic; only their non-leading coefficients are stored.
struct Iso3Constants {
    x_num: [NativeFp2; 4],
    x_den: [NativeFp2; 2],
    y_num: [NativeFp2; 4],
    y_den: [NativeFp2; 3],
}

fn iso3_constants() -> Iso3Constants {
    fn hex(value: &str) -> BigUint {
        use num_traits::Num as _;
        BigUint::from_str_radix(value, 16)
            .unwrap_or_else(|_| unreachable!("isogeny coefficients are valid hex"))
    }
    fn fp2(re: &str, im: &str) -> NativeFp2 {
        (hex(re), hex(im))
    }

    Iso3Constants {
        x_num: [
            fp2(
                "5c759507e8e333ebb5b7a9a47d7ed8532c52d39fd3a042a88b58423c50ae15d5c2638e343d9c71c6238aaaaaaaa97d6",
                "5c759507e8e333ebb5b7a9a47d7ed8532c52d39fd3a042a88b58423c50ae15d5c2638e343d9c71c6238aaaaaaaa97d6",
            ),
            fp2(
                "0",
                "11560bf17baa99bc32126fced787c88f984f87adf7ae0c7f9a208c6b4f20a4181472aaa9cb8d555526a9ffffffffc71a",
            ),
            fp2(
                "11560bf17baa99bc32126fced787c88f984f87adf7ae0c7f9a208c6b4f20a4181472aaa9cb8d555526a9ffffffffc71e",
                "8ab05f8bdd54cde190937e76bc3e447cc27c3d6fbd7063fcd104635a790520c0a395554e5c6aaaa9354ffffffffe38d",
            ),
            fp2(
                "171d6541fa38ccfaed6dea691f5fb614cb14b4e7f4e810aa22d6108f142b85757098e38d0f671c7188e2aaaaaaaa5ed1",
                "0",
            ),
        ],
        x_den: [
            fp2(
                "0",
                "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaa63",
            ),
            fp2(
                "c",
                "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaa9f",
            ),
        ],
        y_num: [
            fp2(
                "1530477c7ab4113b59a4c18b076d11930f7da5d4a07f649bf54439d87d27e500fc8c25ebf8c92f6812cfc71c71c6d706",
                "1530477c7ab4113b59a4c18b076d11930f7da5d4a07f649bf54439d87d27e500fc8c25ebf8c92f6812cfc71c71c6d706",
            ),
            fp2(
                "0",
                "5c759507e8e333ebb5b7a9a47d7ed8532c52d39fd3a042a88b58423c50ae15d5c2638e343d9c71c6238aaaaaaaa97be",
            ),
            fp2(
                "11560bf17baa99bc32126fced787c88f984f87adf7ae0c7f9a208c6b4f20a4181472aaa9cb8d555526a9ffffffffc71c",
                "8ab05f8bdd54cde190937e76bc3e447cc27c3d6fbd7063fcd104635a790520c0a395554e5c6aaaa9354ffffffffe38f",
            ),
            fp2(
                "124c9ad43b6cf79bfbf7043de3811ad0761b0f37a1e26286b0e977c69aa274524e79097a56dc4bd9e1b371c71c718b10",
                "0",
            ),
        ],
        y_den: [
            fp2(
                "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffa8fb",
                "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffa8fb",
            ),
            fp2(
                "0",
                "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffa9d3",
            ),
            fp2(
                "12",
                "1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaa99",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;
    use num_bigint::BigUint;
    use num_traits::{Num as _, Zero as _};

    use super::{
        NativeFp2, base_prime, effective_cofactor, i2osp, iso3_constants, native_fp2_add,
        native_fp2_inv, native_fp2_mul, native_fp2_neg, native_fp2_one, swu_params,
    };
    use beacon_zkp_bigint::hints::{biguint_to_limbs, limbs_to_biguint};
    use beacon_zkp_core::constants::{CURVE_B1, K, N};

    fn is_square(value: &NativeFp2) -> bool {
        super::native_fp2_is_square(
            &biguint_to_limbs(&value.0, K, N),
            &biguint_to_limbs(&value.1, K, N),
        )
    }

    fn sqrt(value: &NativeFp2) -> NativeFp2 {
        let (c0, c1) = super::native_fp2_sqrt(
            &biguint_to_limbs(&value.0, K, N),
            &biguint_to_limbs(&value.1, K, N),
        );
        (limbs_to_biguint(&c0, N), limbs_to_biguint(&c1, N))
    }

    /// `4(1+u)`, the `b` coefficient of the target twist.
    fn twist_b() -> NativeFp2 {
        (BigUint::from(CURVE_B1), BigUint::from(CURVE_B1))
    }

    /// Scans small real x-coordinates for a point on the 3-isogenous curve.
    fn point_on_iso_curve() -> (NativeFp2, NativeFp2) {
        let params = swu_params();
        for k in 1_u32..64 {
            let x = (BigUint::from(k), BigUint::zero());
            let x_cu = native_fp2_mul(&native_fp2_mul(&x, &x), &x);
            let ax = native_fp2_mul(&params.a, &x);
            let gx = native_fp2_add(&native_fp2_add(&x_cu, &ax), &params.b);
            if is_square(&gx) {
                let y = sqrt(&gx);
                if native_fp2_mul(&y, &y) == gx {
                    return (x, y);
                }
            }
        }
        unreachable!("a small-x point on the isogenous curve exists");
    }

    fn native_eval_poly(coeffs: &[NativeFp2], x: &NativeFp2, monic: bool) -> NativeFp2 {
        let mut acc = coeffs[0].clone();
        let mut power = native_fp2_one();
        for coeff in coeffs.iter().skip(1) {
            power = native_fp2_mul(&power, x);
            acc = native_fp2_add(&acc, &native_fp2_mul(coeff, &power));
        }
        power = native_fp2_mul(&power, x);
        if monic {
            acc = native_fp2_add(&acc, &power);
        }
        acc
    }

    /// Evaluates the native isogeny map at a point on the auxiliary curve.
    fn native_iso3(x: &NativeFp2, y: &NativeFp2) -> (NativeFp2, NativeFp2) {
        let constants = iso3_constants();
        let x_num = native_eval_poly(&constants.x_num, x, false);
        let x_den = native_eval_poly(&constants.x_den, x, true);
        let y_num = native_eval_poly(&constants.y_num, x, false);
        let y_den = native_eval_poly(&constants.y_den, x, true);
        let x_out = native_fp2_mul(&x_num, &native_fp2_inv(&x_den));
        let y_out = native_fp2_mul(y, &native_fp2_mul(&y_num, &native_fp2_inv(&y_den)));
        (x_out, y_out)
    }

    type Point = Option<(NativeFp2, NativeFp2)>;

    fn native_double(point: &(NativeFp2, NativeFp2)) -> Point {
        let (x, y) = point;
        if y.0.is_zero() && y.1.is_zero() {
            return None;
        }
        let x_sq = native_fp2_mul(x, x);
        let three_x_sq = native_fp2_add(&native_fp2_add(&x_sq, &x_sq), &x_sq);
        let two_y = native_fp2_add(y, y);
        let lambda = native_fp2_mul(&three_x_sq, &native_fp2_inv(&two_y));
        let lambda_sq = native_fp2_mul(&lambda, &lambda);
        let two_x = native_fp2_add(x, x);
        let x_out = native_fp2_add(&lambda_sq, &native_fp2_neg(&two_x));
        let y_out = native_fp2_add(
            &native_fp2_mul(&lambda, &native_fp2_add(x, &native_fp2_neg(&x_out))),
            &native_fp2_neg(y),
        );
        Some((x_out, y_out))
    }

    fn native_add(a: &(NativeFp2, NativeFp2), b: &(NativeFp2, NativeFp2)) -> Point {
        if a.0 == b.0 {
            return if a.1 == b.1 { native_double(a) } else { None };
        }
        let num = native_fp2_add(&b.1, &native_fp2_neg(&a.1));
        let den = native_fp2_add(&b.0, &native_fp2_neg(&a.0));
        let lambda = native_fp2_mul(&num, &native_fp2_inv(&den));
        let lambda_sq = native_fp2_mul(&lambda, &lambda);
        let x_sum = native_fp2_add(&a.0, &b.0);
        let x_out = native_fp2_add(&lambda_sq, &native_fp2_neg(&x_sum));
        let y_out = native_fp2_add(
            &native_fp2_mul(&lambda, &native_fp2_add(&a.0, &native_fp2_neg(&x_out))),
            &native_fp2_neg(&a.1),
        );
        Some((x_out, y_out))
    }

    fn native_scalar_mul(point: &(NativeFp2, NativeFp2), scalar: &BigUint) -> Point {
        let mut acc: Point = None;
        for i in (0..scalar.bits()).rev() {
            acc = match &acc {
                Some(p) => native_double(p),
                None => None,
            };
            if scalar.bit(i) {
                acc = match acc {
                    None => Some(point.clone()),
                    Some(p) => native_add(&p, point),
                };
            }
        }
        acc
    }

    #[test]
    fn i2osp_round_trips_a_small_value() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let bits = i2osp(cs.namespace(|| "i2osp"), 0x1234, 2).expect("i2osp");
        assert!(cs.is_satisfied());
        assert_eq!(bits.len(), 16);
        let restored: u64 = bits.iter().enumerate().fold(0, |acc, (i, bit)| {
            acc | (u64::from(bit.get_value().unwrap_or(false)) << (15 - i))
        });
        assert_eq!(restored, 0x1234);
    }

    #[test]
    fn swu_constants_are_consistent() {
        let params = swu_params();
        assert_eq!(
            native_fp2_mul(&params.minus_b_over_a, &params.a),
            native_fp2_neg(&params.b),
            "-B'/A' times A' must give -B'"
        );
        assert_eq!(
            native_fp2_mul(&params.minus_one_over_z, &params.z),
            native_fp2_neg(&native_fp2_one()),
            "-1/Z times Z must give -1"
        );
    }

    #[test]
    fn isogeny_image_satisfies_the_target_curve() {
        let (x, y) = point_on_iso_curve();
        let (x_e, y_e) = native_iso3(&x, &y);

        let lhs = native_fp2_mul(&y_e, &y_e);
        let x_cu = native_fp2_mul(&native_fp2_mul(&x_e, &x_e), &x_e);
        let rhs = native_fp2_add(&x_cu, &twist_b());
        assert_eq!(lhs, rhs, "the isogeny must map the auxiliary curve onto the target twist");
    }

    #[test]
    fn cleared_point_is_annihilated_by_the_subgroup_order() {
        use ff::PrimeField as _;

        let (x, y) = point_on_iso_curve();
        let image = native_iso3(&x, &y);

        let cleared = native_scalar_mul(&image, &effective_cofactor())
            .expect("a generic point survives cofactor clearing");
        let order = BigUint::from_str_radix(Scalar::MODULUS.trim_start_matches("0x"), 16)
            .expect("valid hex modulus");
        assert!(
            native_scalar_mul(&cleared, &order).is_none(),
            "the cleared point must lie in the r-torsion"
        );
    }

    #[test]
    fn effective_cofactor_matches_its_expected_width() {
        // h2 is a 507-bit integer and the 3(x^2-1) multiplier adds ~129 bits.
        let bits = effective_cofactor().bits();
        assert!((630..=640).contains(&bits), "unexpected effective cofactor width: {bits}");
    }

    #[test]
    fn base_prime_matches_the_limb_constant() {
        let p = base_prime();
        assert_eq!(p.bits(), 381);
        assert_eq!(
            biguint_to_limbs(&p, K, N),
            beacon_zkp_core::constants::BLS12381_PRIME.to_vec()
        );
    }
}
