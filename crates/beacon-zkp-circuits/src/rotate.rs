//! The Rotate circuit: run once per sync-committee period, it binds the SSZ commitment of the
//! incoming committee to a SNARK-friendly Poseidon commitment, so that subsequent Step proofs
//! can reference the committee by a single scalar instead of 512 compressed keys.
//!
//! Same `Option<T>`-per-witness-value / `Circuit` impl shape as [`crate::step::Step`]; the
//! three public inputs (`finalizedHeaderRoot`, `syncCommitteePoseidon`, `syncCommitteeSSZ`)
//! are exposed in that order, the 32-byte roots via `multipack`.

use beacon_zkp_bigint::add_sub::{BigIntCanonical, big_less_than};
use beacon_zkp_bigint::num_codec::num_to_bits;
use beacon_zkp_core::constants::{
    BLS12381_PRIME, G1_POINT_SIZE, K, N, SYNC_COMMITTEE_DEPTH, SYNC_COMMITTEE_INDEX,
    SYNC_COMMITTEE_SIZE,
};
use beacon_zkp_core::error::WitnessBuildError;
use beacon_zkp_core::schema::RotateWitness;
use beacon_zkp_core::ssz_types::BeaconBlockHeader;
use beacon_zkp_curve::g1_encoding::{
    g1_bigint_to_sign_flag, g1_bytes_to_bigint, g1_bytes_to_sign_flag,
};
use beacon_zkp_curve::point_g1::{G1Point, point_on_curve_no_check};
use beacon_zkp_field::fp::{Fp, fp_is_equal};
use beacon_zkp_ssz::merkle::{HeaderFields, ssz_phase0_beacon_block_header, ssz_phase0_sync_committee, ssz_restore_merkle_root};
use beacon_zkp_ssz::poseidon::{ReferencePoseidon, poseidon_g1_array};
use bellman::gadgets::boolean::Boolean;
use bellman::gadgets::multipack;
use bellman::gadgets::num::AllocatedNum;
use bellman::{Circuit, ConstraintSystem, SynthesisError};
use bls12_381::Scalar;

use crate::alloc::{alloc_fp, alloc_g1_bytes, alloc_node};
use crate::native::{self, NativeG1};

/// Witness for the Rotate circuit; `None` everywhere for key generation, fully populated for
/// proving.
#[derive(Clone, Debug, Default)]
pub struct Rotate {
    /// The finalized beacon block header at the period boundary.
    pub finalized_header: Option<BeaconBlockHeader>,
    /// Sibling hashes restoring the committee's SSZ root under the finalized state root,
    /// ordered leaf-to-root.
    pub sync_committee_branch: Option<Vec<[u8; 32]>>,
    /// Compressed 48-byte encoding of every incoming committee key, in committee order.
    pub pubkey_bytes: Option<Vec<[u8; G1_POINT_SIZE]>>,
    /// The same keys decompressed to limb form, for the arithmetic checks.
    pub pubkeys: Option<Vec<NativeG1>>,
    /// Compressed encoding of the committee's declared aggregate key.
    pub aggregate_pubkey_bytes: Option<[u8; G1_POINT_SIZE]>,
    /// Little-endian encoding of the Poseidon commitment the circuit must reproduce.
    pub sync_committee_poseidon: Option<[u8; 32]>,
}

impl Rotate {
    /// Builds a [`Rotate`] witness from a [`RotateWitness`], decompressing every committee key.
    ///
    /// # Errors
    /// Returns [`WitnessBuildError`] if the witness's shape is wrong or any key fails to
    /// decompress.
    pub fn from_witness(witness: &RotateWitness) -> Result<Self, WitnessBuildError> {
        witness.validate_shape()?;
        if witness.sync_committee_branch.branch.len() != SYNC_COMMITTEE_DEPTH {
            return Err(WitnessBuildError::InvalidMerkleDepth {
                label: "sync committee",
                actual: witness.sync_committee_branch.branch.len(),
                expected: SYNC_COMMITTEE_DEPTH,
            });
        }

        let pubkeys = witness
            .pubkeys
            .iter()
            .enumerate()
            .map(|(i, bytes)| native::decompress_g1(bytes, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            finalized_header: Some(witness.finalized_header),
            sync_committee_branch: Some(witness.sync_committee_branch.branch.clone()),
            pubkey_bytes: Some(witness.pubkeys.clone()),
            pubkeys: Some(pubkeys),
            aggregate_pubkey_bytes: Some(witness.aggregate_pubkey),
            sync_committee_poseidon: Some(witness.sync_committee_poseidon),
        })
    }
}

fn bytes_le_to_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_bytes(bytes))
}

fn prime_as_bigint<CS: ConstraintSystem<Scalar>>(mut cs: CS) -> Result<BigIntCanonical, SynthesisError> {
    let limbs = (0..K)
        .map(|i| {
            AllocatedNum::alloc(cs.namespace(|| format!("prime limb {i}")), || {
                Ok(Scalar::from(BLS12381_PRIME[i]))
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(BigIntCanonical { limbs })
}

/// Asserts a coordinate is canonical: every limb in `[0, 2^N)` and the represented integer
/// strictly below the base prime.
fn assert_fp_canonical<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &Fp,
) -> Result<(), SynthesisError> {
    for (i, limb) in value.0.limbs.iter().enumerate() {
        num_to_bits(cs.namespace(|| format!("limb {i} range")), limb, N as usize)?;
    }
    let prime = prime_as_bigint(cs.namespace(|| "p"))?;
    let below_prime = big_less_than(cs.namespace(|| "value < p"), &value.0, &prime)?;
    Boolean::enforce_equal(cs.namespace(|| "canonical"), &below_prime, &Boolean::constant(true))
}

/// The per-key consistency block: the byte encoding and the limb encoding must describe the
/// same affine point, that point must lie on the curve, and the compressed sign bit must match
/// the sign recovered from `y`.
fn committee_member_checks<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    pubkey_bits: &[Boolean],
    point: &G1Point,
) -> Result<(), SynthesisError> {
    assert_fp_canonical(cs.namespace(|| "x canonical"), &point.x)?;
    assert_fp_canonical(cs.namespace(|| "y canonical"), &point.y)?;

    let x_from_bytes = g1_bytes_to_bigint(cs.namespace(|| "x from bytes"), pubkey_bits)?;
    let x_matches = fp_is_equal(cs.namespace(|| "x == bytes x"), &point.x, &x_from_bytes)?;
    Boolean::enforce_equal(
        cs.namespace(|| "byte and limb x agree"),
        &x_matches,
        &Boolean::constant(true),
    )?;

    point_on_curve_no_check(cs.namespace(|| "on curve"), point)?;

    let byte_sign = g1_bytes_to_sign_flag(cs.namespace(|| "sign from bytes"), pubkey_bits)?;
    let bigint_sign = g1_bigint_to_sign_flag(cs.namespace(|| "sign from y"), &point.y)?;
    Boolean::enforce_equal(cs.namespace(|| "sign flags agree"), &byte_sign, &bigint_sign)
}

/// Re-orders MSB-first-per-byte node bits into the LSB-first-per-byte order `multipack`
/// expects, then packs them into public inputs.
fn pack_node_into_inputs<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    bits_be: &[Boolean],
) -> Result<(), SynthesisError> {
    let mut bits_le = Vec::with_capacity(bits_be.len());
    for byte in bits_be.chunks(8) {
        let mut byte_bits = byte.to_vec();
        byte_bits.reverse();
        bits_le.extend(byte_bits);
    }
    multipack::pack_into_inputs(cs.namespace(|| "pack"), &bits_le)
}

impl Circuit<Scalar> for Rotate {
    fn synthesize<CS: ConstraintSystem<Scalar>>(self, cs: &mut CS) -> Result<(), SynthesisError> {
        let slot = alloc_node(cs.namespace(|| "slot"), self.finalized_header.as_ref().map(|h| &h.slot))?;
        let proposer_index = alloc_node(
            cs.namespace(|| "proposer_index"),
            self.finalized_header.as_ref().map(|h| &h.proposer_index),
        )?;
        let parent_root = alloc_node(
            cs.namespace(|| "parent_root"),
            self.finalized_header.as_ref().map(|h| &h.parent_root),
        )?;
        let state_root = alloc_node(
            cs.namespace(|| "state_root"),
            self.finalized_header.as_ref().map(|h| &h.state_root),
        )?;
        let body_root = alloc_node(
            cs.namespace(|| "body_root"),
            self.finalized_header.as_ref().map(|h| &h.body_root),
        )?;
        let finalized_state_root_bits = state_root.clone();
        let finalized_header_root = ssz_phase0_beacon_block_header(
            cs.namespace(|| "finalized header root"),
            HeaderFields { slot, proposer_index, parent_root, state_root, body_root },
        )?;

        let mut pubkey_bit_vecs = Vec::with_capacity(SYNC_COMMITTEE_SIZE);
        let mut points = Vec::with_capacity(SYNC_COMMITTEE_SIZE);
        for i in 0..SYNC_COMMITTEE_SIZE {
            let mut cs = cs.namespace(|| format!("pubkey {i}"));
            let bits = alloc_g1_bytes(
                cs.namespace(|| "bytes"),
                self.pubkey_bytes.as_ref().and_then(|v| v.get(i)),
            )?;
            let native = self.pubkeys.as_ref().and_then(|v| v.get(i));
            let point = G1Point {
                x: alloc_fp(cs.namespace(|| "x"), native.map(|p| &p.x))?,
                y: alloc_fp(cs.namespace(|| "y"), native.map(|p| &p.y))?,
                is_infinity: Boolean::constant(false),
            };
            committee_member_checks(cs.namespace(|| "consistency"), &bits, &point)?;
            pubkey_bit_vecs.push(bits);
            points.push(point);
        }

        let aggregate_bits = alloc_g1_bytes(
            cs.namespace(|| "aggregate pubkey bytes"),
            self.aggregate_pubkey_bytes.as_ref(),
        )?;
        let committee_ssz_root = ssz_phase0_sync_committee(
            cs.namespace(|| "sync committee ssz"),
            &pubkey_bit_vecs,
            &aggregate_bits,
        )?;

        let branch_bits = (0..SYNC_COMMITTEE_DEPTH)
            .map(|i| {
                alloc_node(
                    cs.namespace(|| format!("committee branch {i}")),
                    self.sync_committee_branch.as_ref().and_then(|v| v.get(i)),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let restored_state_root = ssz_restore_merkle_root(
            cs.namespace(|| "restore committee root"),
            committee_ssz_root.clone(),
            &branch_bits,
            u64::try_from(SYNC_COMMITTEE_INDEX).unwrap_or(u64::MAX),
        )?;
        for (i, (restored, declared)) in
            restored_state_root.iter().zip(finalized_state_root_bits.iter()).enumerate()
        {
            Boolean::enforce_equal(
                cs.namespace(|| format!("committee root bit {i} matches finalized state root")),
                restored,
                declared,
            )?;
        }

        let permutation = ReferencePoseidon::new();
        let committee_poseidon =
            poseidon_g1_array(cs.namespace(|| "poseidon commitment"), &permutation, &points)?;

        let declared_poseidon_value =
            self.sync_committee_poseidon.as_ref().and_then(bytes_le_to_scalar);
        let declared_poseidon = AllocatedNum::alloc(cs.namespace(|| "syncCommitteePoseidon"), || {
            declared_poseidon_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        cs.enforce(
            || "poseidon commitment matches declared value",
            |lc| lc + committee_poseidon.get_variable() - declared_poseidon.get_variable(),
            |lc| lc + CS::one(),
            |lc| lc,
        );

        pack_node_into_inputs(cs.namespace(|| "expose finalizedHeaderRoot"), &finalized_header_root)?;
        declared_poseidon.inputize(cs.namespace(|| "expose syncCommitteePoseidon"))?;
        pack_node_into_inputs(cs.namespace(|| "expose syncCommitteeSSZ"), &committee_ssz_root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bellman::gadgets::test::TestConstraintSystem;
    use bellman::Circuit;
    use bls12_381::Scalar;

    use super::Rotate;
    use beacon_zkp_core::constants::{G1_POINT_SIZE, SYNC_COMMITTEE_DEPTH, SYNC_COMMITTEE_SIZE};
    use beacon_zkp_core::error::WitnessBuildError;
    use beacon_zkp_core::schema::RotateWitness;
    use beacon_zkp_core::ssz_types::{BeaconBlockHeader, MerkleProof};

    fn dummy_header() -> BeaconBlockHeader {
        BeaconBlockHeader {
            slot: [0_u8; 32],
            proposer_index: [0_u8; 32],
            parent_root: [0_u8; 32],
            state_root: [0_u8; 32],
            body_root: [0_u8; 32],
        }
    }

    fn committee_of_generators() -> Vec<[u8; G1_POINT_SIZE]> {
        let generator = bls12_381::G1Affine::generator().to_compressed();
        vec![generator; SYNC_COMMITTEE_SIZE]
    }

    #[test]
    fn empty_witness_synthesizes_without_panicking() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let rotate = Rotate::default();
        let _ = rotate.synthesize(&mut cs);
    }

    #[test]
    fn from_witness_rejects_short_committee() {
        let witness = RotateWitness {
            finalized_header: dummy_header(),
            sync_committee_branch: MerkleProof {
                leaf: [0_u8; 32],
                index: 55,
                branch: vec![[0_u8; 32]; SYNC_COMMITTEE_DEPTH],
            },
            pubkeys: vec![bls12_381::G1Affine::generator().to_compressed(); 3],
            aggregate_pubkey: bls12_381::G1Affine::generator().to_compressed(),
            sync_committee_poseidon: [0_u8; 32],
        };
        assert!(matches!(
            Rotate::from_witness(&witness),
            Err(WitnessBuildError::InvalidCommitteeLength { actual: 3, .. })
        ));
    }

    #[test]
    fn from_witness_rejects_wrong_branch_depth() {
        let witness = RotateWitness {
            finalized_header: dummy_header(),
            sync_committee_branch: MerkleProof {
                leaf: [0_u8; 32],
                index: 55,
                branch: vec![[0_u8; 32]; SYNC_COMMITTEE_DEPTH + 1],
            },
            pubkeys: committee_of_generators(),
            aggregate_pubkey: bls12_381::G1Affine::generator().to_compressed(),
            sync_committee_poseidon: [0_u8; 32],
        };
        assert!(matches!(
            Rotate::from_witness(&witness),
            Err(WitnessBuildError::InvalidMerkleDepth { label: "sync committee", .. })
        ));
    }

    #[test]
    fn from_witness_accepts_well_formed_committee() {
        let witness = RotateWitness {
            finalized_header: dummy_header(),
            sync_committee_branch: MerkleProof {
                leaf: [0_u8; 32],
                index: 55,
                branch: vec![[0_u8; 32]; SYNC_COMMITTEE_DEPTH],
            },
            pubkeys: committee_of_generators(),
            aggregate_pubkey: bls12_381::G1Affine::generator().to_compressed(),
            sync_committee_poseidon: [0_u8; 32],
        };
        let rotate = Rotate::from_witness(&witness).expect("well-formed witness");
        assert_eq!(rotate.pubkeys.map(|p| p.len()), Some(SYNC_COMMITTEE_SIZE));
    }
}
