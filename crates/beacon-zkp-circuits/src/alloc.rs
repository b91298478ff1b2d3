//! Witness allocation helpers shared by [`crate::step::Step`] and [`crate::rotate::Rotate`]:
//! lifting `Option<...>`-typed witness data into the field/curve gadget types, the same
//! `AllocatedNum::alloc(|| value.ok_or(AssignmentMissing))` idiom every gadget crate below this
//! one uses.

use beacon_zkp_bigint::add_sub::BigIntCanonical;
use beacon_zkp_core::constants::K;
use beacon_zkp_curve::point_g1::G1Point;
use beacon_zkp_curve::point_g2::G2Point;
use beacon_zkp_field::fp::Fp;
use beacon_zkp_field::fp2::Fp2;
use bellman::gadgets::boolean::{AllocatedBit, Boolean};
use bellman::gadgets::num::AllocatedNum;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;

use crate::native::{NativeG1, NativeG2};

/// Allocates a `K`-limb [`Fp`] element from an optional limb array.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn alloc_fp<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    limbs: Option<&[u64; K]>,
) -> Result<Fp, SynthesisError> {
    let allocated = (0..K)
        .map(|i| {
            AllocatedNum::alloc(cs.namespace(|| format!("limb {i}")), || {
                limbs.map(|l| Scalar::from(l[i])).ok_or(SynthesisError::AssignmentMissing)
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(Fp(BigIntCanonical { limbs: allocated }))
}

/// Allocates an `Fp2` element from an optional `(c0, c1)` limb pair.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn alloc_fp2<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    limbs: Option<&([u64; K], [u64; K])>,
) -> Result<Fp2, SynthesisError> {
    Ok(Fp2 {
        c0: alloc_fp(cs.namespace(|| "c0"), limbs.map(|(c0, _)| c0))?,
        c1: alloc_fp(cs.namespace(|| "c1"), limbs.map(|(_, c1)| c1))?,
    })
}

/// Allocates a single private boolean witness.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn alloc_boolean<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: Option<bool>,
) -> Result<Boolean, SynthesisError> {
    AllocatedBit::alloc(cs.namespace(|| "bit"), value).map(Boolean::from)
}

/// Allocates a 32-byte SSZ node as 256 MSB-first-per-byte bits, delegating to
/// [`beacon_zkp_ssz::merkle::witness_bytes_be`].
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn alloc_node<CS: ConstraintSystem<Scalar>>(
    cs: CS,
    bytes: Option<&[u8; 32]>,
) -> Result<Vec<Boolean>, SynthesisError> {
    beacon_zkp_ssz::merkle::witness_bytes_be(cs, bytes)
}

/// Allocates a compressed 48-byte G1 encoding as 384 MSB-first-per-byte bits.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn alloc_g1_bytes<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    bytes: Option<&[u8; beacon_zkp_core::constants::G1_POINT_SIZE]>,
) -> Result<Vec<Boolean>, SynthesisError> {
    let mut bits = Vec::with_capacity(beacon_zkp_core::constants::G1_POINT_SIZE * 8);
    for byte_idx in 0..beacon_zkp_core::constants::G1_POINT_SIZE {
        for bit_idx in (0..8).rev() {
            let value = bytes.map(|b| (b[byte_idx] >> bit_idx) & 1 == 1);
            let bit = alloc_boolean(cs.namespace(|| format!("byte {byte_idx} bit {bit_idx}")), value)?;
            bits.push(bit);
        }
    }
    Ok(bits)
}

/// Allocates a decompressed G1 point, along with its `is_infinity` witness.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn alloc_g1_point<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    point: Option<&NativeG1>,
) -> Result<G1Point, SynthesisError> {
    Ok(G1Point {
        x: alloc_fp(cs.namespace(|| "x"), point.map(|p| &p.x))?,
        y: alloc_fp(cs.namespace(|| "y"), point.map(|p| &p.y))?,
        is_infinity: alloc_boolean(cs.namespace(|| "is_infinity"), point.map(|p| p.is_infinity))?,
    })
}

/// Allocates a decompressed G2 point, along with its `is_infinity` witness.
///
/// # Errors
/// Returns [`SynthesisError`] on allocation failure.
pub fn alloc_g2_point<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    point: Option<&NativeG2>,
) -> Result<G2Point, SynthesisError> {
    Ok(G2Point {
        x: alloc_fp2(cs.namespace(|| "x"), point.map(|p| &p.x))?,
        y: alloc_fp2(cs.namespace(|| "y"), point.map(|p| &p.y))?,
        is_infinity: alloc_boolean(cs.namespace(|| "is_infinity"), point.map(|p| p.is_infinity))?,
    })
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{alloc_fp, alloc_g1_point};
    use crate::native::NativeG1;

    #[test]
    fn alloc_fp_round_trips_limb_values() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let limbs = [1_u64, 2, 3, 4, 5, 6, 7];
        let fp = alloc_fp(cs.namespace(|| "fp"), Some(&limbs)).expect("alloc");
        assert!(cs.is_satisfied());
        assert_eq!(fp.0.limbs[0].get_value(), Some(Scalar::from(1_u64)));
    }

    #[test]
    fn alloc_g1_point_carries_infinity_flag() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let native = NativeG1 { x: [0; 7], y: [0; 7], is_infinity: true };
        let point = alloc_g1_point(cs.namespace(|| "point"), Some(&native)).expect("alloc");
        assert!(cs.is_satisfied());
        assert_eq!(point.is_infinity.get_value(), Some(true));
    }
}
