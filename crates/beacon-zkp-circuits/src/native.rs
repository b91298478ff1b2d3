//! Host-side (non-circuit) witness preparation: decompressing the 48-byte G1 and 96-byte G2
//! encodings carried by [`beacon_zkp_core::schema::StepWitness`]/`RotateWitness` into the
//! `K`-limb bigint form the field gadgets need, and running the native `G1AddMany` reduction
//! over the decompressed committee.
//!
//! None of this is trusted by the circuit: every value produced here is re-derived and checked
//! in-circuit against the corresponding byte witness.

use beacon_zkp_bigint::hints::biguint_to_limbs;
use beacon_zkp_core::constants::{G1_POINT_SIZE, K, N};
use beacon_zkp_core::error::WitnessBuildError;
use num_bigint::BigUint;

/// A decompressed G1 point in `K`-limb form, ready to feed [`crate::alloc::alloc_g1_point`].
#[derive(Debug, Clone)]
pub struct NativeG1 {
    /// `x` coordinate, `K` limbs of `N` bits each.
    pub x: [u64; K],
    /// `y` coordinate, `K` limbs of `N` bits each.
    pub y: [u64; K],
    /// Whether the encoded point is the identity.
    pub is_infinity: bool,
}

/// A decompressed G2 point in `K`-limb form (each `Fp2` coordinate as a `(c0, c1)` limb pair).
#[derive(Debug, Clone)]
pub struct NativeG2 {
    /// `x` coordinate: `(c0, c1)`, each `K` limbs.
    pub x: ([u64; K], [u64; K]),
    /// `y` coordinate: `(c0, c1)`, each `K` limbs.
    pub y: ([u64; K], [u64; K]),
    /// Whether the encoded point is the identity.
    pub is_infinity: bool,
}

fn bytes_to_limbs(bytes: &[u8]) -> [u64; K] {
    let value = BigUint::from_bytes_be(bytes);
    let limbs = biguint_to_limbs(&value, K, N);
    let mut out = [0_u64; K];
    out.iter_mut().zip(limbs).for_each(|(slot, limb)| *slot = limb);
    out
}

/// Decompresses a 48-byte compressed G1 encoding into limb form.
///
/// # Errors
/// Returns [`WitnessBuildError::InvalidG1Point`] if `bytes` is not a valid compressed G1
/// encoding.
pub fn decompress_g1(bytes: &[u8; G1_POINT_SIZE], index: usize) -> Result<NativeG1, WitnessBuildError> {
    let affine: Option<bls12_381::G1Affine> = bls12_381::G1Affine::from_compressed(bytes).into();
    let affine = affine.ok_or(WitnessBuildError::InvalidG1Point(index))?;
    let is_infinity = bool::from(affine.is_identity());
    let uncompressed = affine.to_uncompressed();
    let (x_bytes, y_bytes) = uncompressed.split_at(G1_POINT_SIZE);
    Ok(NativeG1 { x: bytes_to_limbs(x_bytes), y: bytes_to_limbs(y_bytes), is_infinity })
}

/// Decompresses a 96-byte compressed G2 encoding (the aggregated BLS signature) into limb form.
/// Coordinate bytes follow the zkcrypto/IETF convention of `x_c1 || x_c0` (and likewise for `y`)
/// within each 96-byte half.
///
/// # Errors
/// Returns [`WitnessBuildError::InvalidG2Point`] if `bytes` is not a valid compressed G2
/// encoding.
pub fn decompress_g2(bytes: &[u8; 96], label: &'static str) -> Result<NativeG2, WitnessBuildError> {
    let affine: Option<bls12_381::G2Affine> = bls12_381::G2Affine::from_compressed(bytes).into();
    let affine = affine.ok_or(WitnessBuildError::InvalidG2Point(label))?;
    let is_infinity = bool::from(affine.is_identity());
    let uncompressed = affine.to_uncompressed();
    let (x_bytes, y_bytes) = uncompressed.split_at(96);
    let (x_c1, x_c0) = x_bytes.split_at(48);
    let (y_c1, y_c0) = y_bytes.split_at(48);
    Ok(NativeG2 {
        x: (bytes_to_limbs(x_c0), bytes_to_limbs(x_c1)),
        y: (bytes_to_limbs(y_c0), bytes_to_limbs(y_c1)),
        is_infinity,
    })
}

/// The canonical BLS12-381 G1 generator, in limb form, for the `e(g1_generator, -signature)` leg
/// of the Step circuit's pairing identity.
pub fn g1_generator() -> NativeG1 {
    let affine = bls12_381::G1Affine::generator();
    let uncompressed = affine.to_uncompressed();
    let (x_bytes, y_bytes) = uncompressed.split_at(G1_POINT_SIZE);
    NativeG1 { x: bytes_to_limbs(x_bytes), y: bytes_to_limbs(y_bytes), is_infinity: false }
}

/// Computes the Poseidon commitment to a committee natively, by synthesizing the sponge over a
/// throwaway test constraint system and reading back the output assignment, the same
/// synthesize-and-read pattern `public_inputs::native_commit_to_public_inputs` uses, so the
/// native value can never drift from what the Rotate circuit constrains.
///
/// # Panics
/// Panics if the flattened limb count is not a multiple of the sponge rate.
#[must_use]
pub fn native_committee_poseidon(pubkeys: &[NativeG1]) -> bls12_381::Scalar {
    use beacon_zkp_ssz::poseidon::{ReferencePoseidon, poseidon_g1_array};
    use bellman::ConstraintSystem as _;
    use bellman::gadgets::test::TestConstraintSystem;
    use ff::Field as _;

    let mut cs = TestConstraintSystem::<bls12_381::Scalar>::new();
    let points = pubkeys
        .iter()
        .enumerate()
        .map(|(i, point)| {
            crate::alloc::alloc_g1_point(cs.namespace(|| format!("pubkey {i}")), Some(point))
                .expect("allocation over a test system cannot fail")
        })
        .collect::<Vec<_>>();

    let permutation = ReferencePoseidon::new();
    poseidon_g1_array(cs.namespace(|| "sponge"), &permutation, &points)
        .expect("sponge synthesis over assigned inputs cannot fail")
        .get_value()
        .unwrap_or(bls12_381::Scalar::ZERO)
}

/// Runs the native `G1AddMany` reduction (`beacon_zkp_ssz::aggregate::native_g1_add_many`) over
/// a committee's compressed keys under `bits`, returning the aggregate in limb form.
///
/// # Errors
/// Returns [`WitnessBuildError::InvalidG1Point`] if any key fails to decompress.
pub fn native_aggregate_pubkeys(
    pubkeys: &[[u8; G1_POINT_SIZE]],
    bits: &[bool],
) -> Result<NativeG1, WitnessBuildError> {
    let affine_points = pubkeys
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            let affine: Option<bls12_381::G1Affine> = bls12_381::G1Affine::from_compressed(bytes).into();
            affine.ok_or(WitnessBuildError::InvalidG1Point(i))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (aggregate, is_infinity) = beacon_zkp_ssz::aggregate::native_g1_add_many(&affine_points, bits);
    let uncompressed = aggregate.to_uncompressed();
    let (x_bytes, y_bytes) = uncompressed.split_at(G1_POINT_SIZE);
    Ok(NativeG1 { x: bytes_to_limbs(x_bytes), y: bytes_to_limbs(y_bytes), is_infinity })
}
