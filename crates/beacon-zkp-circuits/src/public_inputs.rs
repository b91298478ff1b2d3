//! `CommitToPublicInputs`: a chained SHA-256 over the little-endian byte encodings of
//! `participation` and `syncCommitteePoseidon`, truncated to [`TRUNCATED_SHA256_SIZE`] bits so
//! the result fits a single `Scalar`, then compared bit-for-bit against the `publicInputsRoot`
//! input's own [`num_to_bits`] decomposition, the same "decompose both sides, compare bits"
//! idiom [`beacon_zkp_curve::g1_encoding`] uses for its flag bits.
//!
//! Both `participation` and `syncCommitteePoseidon` are native-scalar-field values (the former a
//! sum of aggregation bits, the latter a Poseidon sponge output), not `Fp` limb values, so this
//! module works directly against `AllocatedNum<Scalar>` rather than the `beacon-zkp-field` tower.
//!
//! [`num_to_bits`]'s width assert caps a full decomposition at `Scalar::NUM_BITS - 1 = 254` bits,
//! one short of the scalar field's actual 255-bit capacity; the byte encoding here is capped at
//! [`SCALAR_BITS`] accordingly (see the design ledger's public-input commitment entry).

use beacon_zkp_bigint::num_codec::{bits_to_num, num_to_bits};
use beacon_zkp_core::constants::TRUNCATED_SHA256_SIZE;
use bellman::gadgets::boolean::Boolean;
use bellman::gadgets::num::AllocatedNum;
use bellman::gadgets::sha256::sha256;
use bellman::{ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;

use crate::alloc::alloc_boolean;

/// Bit width a scalar is decomposed to before byte-encoding it for the commitment; see the
/// module doc comment for why this is one bit short of the field's full range.
const SCALAR_BITS: usize = 254;

/// Bits in one scalar's little-endian byte encoding, zero-padded up to a whole number of bytes.
const ENCODED_BITS: usize = 256;

/// Encodes `num` as [`ENCODED_BITS`] bits in the byte order `bellman::gadgets::sha256::sha256`
/// expects: little-endian byte order (least-significant byte first), each byte itself MSB-first.
fn scalar_to_sha256_bits<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    num: &AllocatedNum<Scalar>,
) -> Result<Vec<Boolean>, SynthesisError> {
    let mut bits = num_to_bits(cs.namespace(|| "decompose"), num, SCALAR_BITS)?;
    for i in SCALAR_BITS..ENCODED_BITS {
        bits.push(alloc_boolean(cs.namespace(|| format!("pad bit {i}")), Some(false))?);
    }

    let mut sha_bits = Vec::with_capacity(ENCODED_BITS);
    for byte in bits.chunks(8) {
        let mut byte_bits = byte.to_vec();
        byte_bits.reverse();
        sha_bits.extend(byte_bits);
    }
    Ok(sha_bits)
}

/// `CommitToPublicInputs`: asserts that `SHA256(SHA256(participation_bytes) ||
/// sync_committee_poseidon_bytes)`, truncated to [`TRUNCATED_SHA256_SIZE`] bits, matches
/// `public_inputs_root`'s own [`num_to_bits`] decomposition to the same width.
///
/// # Errors
/// Returns [`SynthesisError`] on constraint failure, including when the commitment does not
/// match `public_inputs_root`.
pub fn assert_public_inputs_commitment<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    participation: &AllocatedNum<Scalar>,
    sync_committee_poseidon: &AllocatedNum<Scalar>,
    public_inputs_root: &AllocatedNum<Scalar>,
) -> Result<(), SynthesisError> {
    let participation_bits =
        scalar_to_sha256_bits(cs.namespace(|| "participation bytes"), participation)?;
    let first_hash = sha256(cs.namespace(|| "sha256(participation)"), &participation_bits)?;

    let poseidon_bits =
        scalar_to_sha256_bits(cs.namespace(|| "syncCommitteePoseidon bytes"), sync_committee_poseidon)?;
    let mut chained_preimage = first_hash;
    chained_preimage.extend(poseidon_bits);
    let digest = sha256(cs.namespace(|| "sha256(first || poseidon)"), &chained_preimage)?;

    assert_eq!(digest.len(), ENCODED_BITS, "sha256 always returns 256 bits");
    #[allow(clippy::indexing_slicing, reason = "digest is exactly ENCODED_BITS long, checked above")]
    let truncated_be = &digest[ENCODED_BITS - TRUNCATED_SHA256_SIZE..];
    let mut truncated_le = truncated_be.to_vec();
    truncated_le.reverse();

    let declared_bits = num_to_bits(
        cs.namespace(|| "decompose publicInputsRoot"),
        public_inputs_root,
        TRUNCATED_SHA256_SIZE,
    )?;

    for (i, (chained, declared)) in truncated_le.iter().zip(declared_bits.iter()).enumerate() {
        Boolean::enforce_equal(cs.namespace(|| format!("bit {i} matches")), chained, declared)?;
    }
    Ok(())
}

/// Native counterpart of [`assert_public_inputs_commitment`], used by witness generation to
/// compute `publicInputsRoot` before synthesis.
///
/// # Panics
/// Panics if `participation` or `sync_committee_poseidon` do not fit [`SCALAR_BITS`] bits; the
/// caller is responsible for ensuring both values stay within that range.
#[must_use]
pub fn native_commit_to_public_inputs(participation: Scalar, sync_committee_poseidon: Scalar) -> Scalar {
    use bellman::gadgets::test::TestConstraintSystem;

    let mut cs = TestConstraintSystem::<Scalar>::new();
    let participation_num =
        AllocatedNum::alloc(cs.namespace(|| "participation"), || Ok(participation)).expect("alloc");
    let poseidon_num =
        AllocatedNum::alloc(cs.namespace(|| "poseidon"), || Ok(sync_committee_poseidon)).expect("alloc");

    let participation_bits =
        scalar_to_sha256_bits(cs.namespace(|| "participation bytes"), &participation_num).expect("bits");
    let first_hash = sha256(cs.namespace(|| "sha256(participation)"), &participation_bits).expect("sha256");
    let poseidon_bits =
        scalar_to_sha256_bits(cs.namespace(|| "syncCommitteePoseidon bytes"), &poseidon_num).expect("bits");
    let mut chained_preimage = first_hash;
    chained_preimage.extend(poseidon_bits);
    let digest = sha256(cs.namespace(|| "sha256(first || poseidon)"), &chained_preimage).expect("sha256");

    #[allow(clippy::indexing_slicing, reason = "digest is exactly ENCODED_BITS long")]
    let truncated_be = &digest[ENCODED_BITS - TRUNCATED_SHA256_SIZE..];
    let mut truncated_le = truncated_be.to_vec();
    truncated_le.reverse();
    bits_to_num(cs.namespace(|| "root"), &truncated_le).expect("bits_to_num").get_value().unwrap_or(Scalar::ZERO)
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::num::AllocatedNum;
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::ConstraintSystem;
    use bls12_381::Scalar;

    use super::{assert_public_inputs_commitment, native_commit_to_public_inputs};

    #[test]
    fn commitment_is_satisfiable_against_its_own_native_root() {
        let participation = Scalar::from(400_u64);
        let poseidon = Scalar::from(12_345_u64);
        let root = native_commit_to_public_inputs(participation, poseidon);

        let mut cs = TestConstraintSystem::<Scalar>::new();
        let participation_num =
            AllocatedNum::alloc(cs.namespace(|| "participation"), || Ok(participation)).expect("alloc");
        let poseidon_num = AllocatedNum::alloc(cs.namespace(|| "poseidon"), || Ok(poseidon)).expect("alloc");
        let root_num = AllocatedNum::alloc(cs.namespace(|| "root"), || Ok(root)).expect("alloc");

        assert_public_inputs_commitment(cs.namespace(|| "commit"), &participation_num, &poseidon_num, &root_num)
            .expect("commit");
        assert!(cs.is_satisfied());
    }

    #[test]
    fn mismatched_root_is_unsatisfiable() {
        let participation = Scalar::from(400_u64);
        let poseidon = Scalar::from(12_345_u64);

        let mut cs = TestConstraintSystem::<Scalar>::new();
        let participation_num =
            AllocatedNum::alloc(cs.namespace(|| "participation"), || Ok(participation)).expect("alloc");
        let poseidon_num = AllocatedNum::alloc(cs.namespace(|| "poseidon"), || Ok(poseidon)).expect("alloc");
        let wrong_root = AllocatedNum::alloc(cs.namespace(|| "root"), || Ok(Scalar::from(1_u64))).expect("alloc");

        assert_public_inputs_commitment(cs.namespace(|| "commit"), &participation_num, &poseidon_num, &wrong_root)
            .expect("commit runs, just unsatisfied");
        assert!(!cs.is_satisfied());
    }
}
