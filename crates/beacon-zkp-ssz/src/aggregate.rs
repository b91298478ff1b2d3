//! `G1AddMany`: log-depth map-reduce aggregation of `SYNC_COMMITTEE_SIZE` G1 public keys
//! under a bitmap, plus a `rayon`-parallel native witness generator mirroring the same reduction
//! shape.

use bellman::gadgets::boolean::Boolean;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use group::Group as _;

use beacon_zkp_curve::point_g1::{G1Point, elliptic_curve_add};

/// Masks a committee member's point by its aggregation bit: an unset bit forces `is_infinity`,
/// so the subsequent [`elliptic_curve_add`] reduction treats it as the group identity and
/// contributes nothing to the sum: the in-circuit counterpart of `G1AddMany`'s "both 0 means
/// infinity element" rule.
fn mask_by_bit<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    point: &G1Point,
    bit: &Boolean,
) -> Result<G1Point, SynthesisError> {
    // is_infinity || !bit, via De Morgan (bellman's Boolean offers only and/xor/not).
    let is_infinity =
        Boolean::and(cs.namespace(|| "participating && already affine"), &point.is_infinity.not(), bit)?
            .not();
    Ok(G1Point { x: point.x.clone(), y: point.y.clone(), is_infinity })
}

/// `G1AddMany`: reduces `pubkeys` (length a power of two) to a single aggregate point, masking
/// each input by `bits` before a log-depth [`elliptic_curve_add`] tree. The result's
/// `is_infinity` flag doubles as `isPointAtInfinity`: a sum of wholly-masked-out inputs
/// collapses to the identity exactly as `elliptic_curve_add`'s own infinity propagation
/// dictates.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure.
pub fn g1_add_many<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    pubkeys: &[G1Point],
    bits: &[Boolean],
) -> Result<G1Point, SynthesisError> {
    assert_eq!(pubkeys.len(), bits.len(), "G1AddMany requires one bit per key");
    assert!(pubkeys.len().is_power_of_two(), "G1AddMany requires a power-of-two key count");

    let mut layer = pubkeys
        .iter()
        .zip(bits.iter())
        .enumerate()
        .map(|(i, (point, bit))| mask_by_bit(cs.namespace(|| format!("mask {i}")), point, bit))
        .collect::<Result<Vec<_>, _>>()?;

    let mut level = 0_usize;
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len() / 2);
        for (i, pair) in layer.chunks_exact(2).enumerate() {
            let (Some(a), Some(b)) = (pair.first(), pair.get(1)) else {
                unreachable!("chunks_exact(2) always yields pairs");
            };
            next.push(elliptic_curve_add(cs.namespace(|| format!("layer {level} pair {i}")), a, b)?);
        }
        layer = next;
        level += 1;
    }

    layer.into_iter().next().ok_or(SynthesisError::Unsatisfiable)
}

/// Native (out-of-circuit) counterpart of [`g1_add_many`], used by witness generation. Masks
/// each key by its bit, then reduces pairwise via `rayon::join` recursion, a divide-and-conquer
/// tree over the same independent sub-sums the in-circuit log-depth reduction performs, so the
/// `S/2^{l+1}` adders at layer `l` run in parallel.
///
/// Returns the aggregate affine point and its `isPointAtInfinity` flag.
#[must_use]
pub fn native_g1_add_many(
    points: &[bls12_381::G1Affine],
    bits: &[bool],
) -> (bls12_381::G1Affine, bool) {
    assert_eq!(points.len(), bits.len(), "G1AddMany requires one bit per key");
    assert!(points.len().is_power_of_two(), "G1AddMany requires a power-of-two key count");

    let masked: Vec<bls12_381::G1Projective> = points
        .iter()
        .zip(bits.iter())
        .map(|(p, &bit)| {
            if bit { bls12_381::G1Projective::from(*p) } else { bls12_381::G1Projective::identity() }
        })
        .collect();

    let sum = reduce(&masked);
    let is_infinity = bool::from(sum.is_identity());
    (bls12_381::G1Affine::from(sum), is_infinity)
}

fn reduce(points: &[bls12_381::G1Projective]) -> bls12_381::G1Projective {
    match points.len() {
        0 => bls12_381::G1Projective::identity(),
        1 => points[0],
        len => {
            let mid = len / 2;
            let (left, right) = rayon::join(|| reduce(&points[..mid]), || reduce(&points[mid..]));
            left + right
        }
    }
}

#[cfg(test)]
mod tests {
    use group::Group as _;

    use super::native_g1_add_many;

    #[test]
    fn all_bits_unset_yields_infinity() {
        let generator = bls12_381::G1Affine::from(bls12_381::G1Projective::generator());
        let points = [generator; 4];
        let bits = [false; 4];
        let (_, is_infinity) = native_g1_add_many(&points, &bits);
        assert!(is_infinity);
    }

    #[test]
    fn single_bit_set_matches_that_key() {
        let generator = bls12_381::G1Affine::from(bls12_381::G1Projective::generator());
        let other = bls12_381::G1Affine::from(bls12_381::G1Projective::generator() + bls12_381::G1Projective::generator());
        let points = [generator, other, generator, generator];
        let bits = [false, true, false, false];
        let (sum, is_infinity) = native_g1_add_many(&points, &bits);
        assert!(!is_infinity);
        assert_eq!(sum, other);
    }

    #[test]
    fn two_bits_set_sums_both_keys() {
        let generator = bls12_381::G1Projective::generator();
        let a = bls12_381::G1Affine::from(generator);
        let b = bls12_381::G1Affine::from(generator + generator);
        let points = [a, b, a, a];
        let bits = [true, true, false, false];
        let (sum, is_infinity) = native_g1_add_many(&points, &bits);
        assert!(!is_infinity);
        assert_eq!(sum, bls12_381::G1Affine::from(generator + (generator + generator)));
    }
}
