//! The Step circuit: proves that a sync committee's aggregate BLS signature attests to a
//! beacon block header, that header's finality is rooted in the attested state, and the
//! finalized block's execution-layer state root sits under that same finalized block body.
//!
//! Field layout and the `Option<T>`-per-witness-value / `Circuit` impl shape follow
//! `zair-sapling-circuit::circuit::Claim`: every field is `None` for key generation, `Some` for
//! proving, and the single public output is exposed via `.inputize` at the end of `synthesize`.

use beacon_zkp_core::constants::{
    EXECUTION_STATE_ROOT_DEPTH, EXECUTION_STATE_ROOT_INDEX, FINALIZED_HEADER_DEPTH,
    FINALIZED_HEADER_INDEX, SYNC_COMMITTEE_SIZE,
};
use beacon_zkp_core::error::WitnessBuildError;
use beacon_zkp_core::schema::StepWitness;
use beacon_zkp_core::ssz_types::BeaconBlockHeader;
use beacon_zkp_curve::hash_to_curve::{hash_to_field, map_to_g2};
use beacon_zkp_curve::pairing::{final_exponentiate, miller_loop_fp2_two};
use beacon_zkp_curve::point_g1::{point_on_curve_no_check, subgroup_check_g1};
use beacon_zkp_curve::point_g2::{negate_g2, point_on_curve_no_check_g2, subgroup_check_g2};
use beacon_zkp_field::fp12::fp12_assert_one;
use beacon_zkp_ssz::aggregate::g1_add_many;
use beacon_zkp_ssz::merkle::{
    HeaderFields, ssz_phase0_beacon_block_header, ssz_phase0_signing_root, ssz_restore_merkle_root,
};
use bellman::gadgets::boolean::Boolean;
use bellman::gadgets::num::AllocatedNum;
use bellman::{Circuit, ConstraintSystem, SynthesisError};
use bls12_381::Scalar;
use ff::Field;

use crate::alloc::{alloc_boolean, alloc_g1_point, alloc_g2_point, alloc_node};
use crate::native::{self, NativeG1, NativeG2};
use crate::public_inputs::assert_public_inputs_commitment;

/// Witness for the Step circuit, with every value optional so the same struct serves both key
/// generation (`None` everywhere) and proving (fully populated).
#[derive(Clone, Debug, Default)]
pub struct Step {
    /// The attested beacon block header.
    pub attested_header: Option<BeaconBlockHeader>,
    /// The finalized beacon block header.
    pub finalized_header: Option<BeaconBlockHeader>,
    /// Sibling hashes restoring `finalized_header`'s root under the attested state root, ordered
    /// leaf-to-root.
    pub finality_branch: Option<Vec<[u8; 32]>>,
    /// The execution-layer state root, Merkleized under the finalized block body.
    pub execution_state_root: Option<[u8; 32]>,
    /// Sibling hashes restoring `execution_state_root` under the finalized block's body root.
    pub execution_state_branch: Option<Vec<[u8; 32]>>,
    /// Decompressed committee public keys, in committee order.
    pub pubkeys: Option<Vec<NativeG1>>,
    /// One bit per committee member: did they sign the attested header.
    pub aggregation_bits: Option<Vec<bool>>,
    /// The aggregated BLS signature over the signing root.
    pub signature: Option<NativeG2>,
    /// The fork/genesis-validators-root signing domain.
    pub domain: Option<[u8; 32]>,
    /// Little-endian encoding of the Poseidon commitment to the signing committee.
    pub sync_committee_poseidon: Option<[u8; 32]>,
    /// Little-endian encoding of the circuit's declared public-input commitment.
    pub public_inputs_root: Option<[u8; 32]>,
}

impl Step {
    /// Builds a [`Step`] witness from a [`StepWitness`], decompressing every committee key and
    /// the aggregated signature.
    ///
    /// # Errors
    /// Returns [`WitnessBuildError`] if the witness's shape is wrong or any point fails to
    /// decompress.
    pub fn from_witness(witness: &StepWitness) -> Result<Self, WitnessBuildError> {
        witness.validate_shape()?;
        if witness.finality_branch.branch.len() != FINALIZED_HEADER_DEPTH {
            return Err(WitnessBuildError::InvalidMerkleDepth {
                label: "finality",
                actual: witness.finality_branch.branch.len(),
                expected: FINALIZED_HEADER_DEPTH,
            });
        }
        if witness.execution_state_branch.branch.len() != EXECUTION_STATE_ROOT_DEPTH {
            return Err(WitnessBuildError::InvalidMerkleDepth {
                label: "execution state",
                actual: witness.execution_state_branch.branch.len(),
                expected: EXECUTION_STATE_ROOT_DEPTH,
            });
        }

        let pubkeys = witness
            .pubkeys
            .iter()
            .enumerate()
            .map(|(i, bytes)| native::decompress_g1(bytes, i))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = native::decompress_g2(&witness.signature, "step signature")?;

        Ok(Self {
            attested_header: Some(witness.attested_header),
            finalized_header: Some(witness.finalized_header),
            finality_branch: Some(witness.finality_branch.branch.clone()),
            execution_state_root: Some(witness.execution_state_root),
            execution_state_branch: Some(witness.execution_state_branch.branch.clone()),
            pubkeys: Some(pubkeys),
            aggregation_bits: Some(witness.aggregation_bits.clone()),
            signature: Some(signature),
            domain: Some(witness.domain),
            sync_committee_poseidon: Some(witness.sync_committee_poseidon),
            public_inputs_root: Some(witness.public_inputs_root),
        })
    }
}

fn bytes_le_to_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_bytes(bytes))
}

/// Asserts `value != 0` via a witnessed inverse: `value * value^-1 == 1` is only satisfiable when
/// `value` is invertible, i.e. nonzero.
fn assert_nonzero<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    value: &AllocatedNum<Scalar>,
) -> Result<(), SynthesisError> {
    let inverse_value = value.get_value().and_then(|v| Option::from(v.invert()));
    let inverse = AllocatedNum::alloc(cs.namespace(|| "inverse"), || {
        inverse_value.ok_or(SynthesisError::AssignmentMissing)
    })?;
    cs.enforce(
        || "value * inverse == 1",
        |lc| lc + value.get_variable(),
        |lc| lc + inverse.get_variable(),
        |lc| lc + CS::one(),
    );
    Ok(())
}

fn header_fields<CS: ConstraintSystem<Scalar>>(
    mut cs: CS,
    header: Option<&BeaconBlockHeader>,
) -> Result<
    (Vec<Boolean>, Vec<Boolean>, Vec<Boolean>, Vec<Boolean>, Vec<Boolean>),
    SynthesisError,
> {
    let slot = alloc_node(cs.namespace(|| "slot"), header.map(|h| &h.slot))?;
    let proposer_index = alloc_node(cs.namespace(|| "proposer_index"), header.map(|h| &h.proposer_index))?;
    let parent_root = alloc_node(cs.namespace(|| "parent_root"), header.map(|h| &h.parent_root))?;
    let state_root = alloc_node(cs.namespace(|| "state_root"), header.map(|h| &h.state_root))?;
    let body_root = alloc_node(cs.namespace(|| "body_root"), header.map(|h| &h.body_root))?;
    Ok((slot, proposer_index, parent_root, state_root, body_root))
}

impl Circuit<Scalar> for Step {
    fn synthesize<CS: ConstraintSystem<Scalar>>(self, cs: &mut CS) -> Result<(), SynthesisError> {
        let (a_slot, a_proposer, a_parent, a_state_root, a_body_root) =
            header_fields(cs.namespace(|| "attested header fields"), self.attested_header.as_ref())?;
        let attested_state_root_bits = a_state_root.clone();
        let attested_header_root = ssz_phase0_beacon_block_header(
            cs.namespace(|| "attested header root"),
            HeaderFields {
                slot: a_slot,
                proposer_index: a_proposer,
                parent_root: a_parent,
                state_root: a_state_root,
                body_root: a_body_root,
            },
        )?;

        let (f_slot, f_proposer, f_parent, f_state_root, f_body_root) =
            header_fields(cs.namespace(|| "finalized header fields"), self.finalized_header.as_ref())?;
        let finalized_body_root_bits = f_body_root.clone();
        let finalized_header_root = ssz_phase0_beacon_block_header(
            cs.namespace(|| "finalized header root"),
            HeaderFields {
                slot: f_slot,
                proposer_index: f_proposer,
                parent_root: f_parent,
                state_root: f_state_root,
                body_root: f_body_root,
            },
        )?;

        let domain_bits = alloc_node(cs.namespace(|| "domain"), self.domain.as_ref())?;
        let signing_root =
            ssz_phase0_signing_root(cs.namespace(|| "signing root"), &attested_header_root, &domain_bits)?;

        let mut points = Vec::with_capacity(SYNC_COMMITTEE_SIZE);
        let mut bits = Vec::with_capacity(SYNC_COMMITTEE_SIZE);
        for i in 0..SYNC_COMMITTEE_SIZE {
            let point = alloc_g1_point(
                cs.namespace(|| format!("pubkey {i}")),
                self.pubkeys.as_ref().and_then(|v| v.get(i)),
            )?;
            let bit = alloc_boolean(
                cs.namespace(|| format!("aggregation bit {i}")),
                self.aggregation_bits.as_ref().and_then(|v| v.get(i).copied()),
            )?;
            points.push(point);
            bits.push(bit);
        }

        let pk_agg = g1_add_many(cs.namespace(|| "aggregate pubkeys"), &points, &bits)?;
        Boolean::enforce_equal(
            cs.namespace(|| "aggregate pubkey is not infinity"),
            &pk_agg.is_infinity,
            &Boolean::constant(false),
        )?;

        let mut participation_lc = bellman::LinearCombination::<Scalar>::zero();
        for bit in &bits {
            participation_lc = participation_lc + &bit.lc(CS::one(), Scalar::ONE);
        }
        let participation_value = self.aggregation_bits.as_ref().map(|v| {
            let count = v.iter().filter(|&&b| b).count();
            Scalar::from(u64::try_from(count).unwrap_or(u64::MAX))
        });
        let participation = AllocatedNum::alloc(cs.namespace(|| "participation"), || {
            participation_value.ok_or(SynthesisError::AssignmentMissing)
        })?;
        cs.enforce(
            || "participation equals sum of aggregation bits",
            |_| participation_lc,
            |lc| lc + CS::one(),
            |lc| lc + participation.get_variable(),
        );
        assert_nonzero(cs.namespace(|| "participation is nonzero"), &participation)?;

        let u = hash_to_field(cs.namespace(|| "hash to field"), &signing_root)?;
        let hm = map_to_g2(cs.namespace(|| "map to g2"), &u)?;

        let generator_native = native::g1_generator();
        let generator = alloc_g1_point(cs.namespace(|| "g1 generator"), Some(&generator_native))?;
        let signature_point = alloc_g2_point(cs.namespace(|| "signature"), self.signature.as_ref())?;
        point_on_curve_no_check(cs.namespace(|| "aggregate pubkey on curve"), &pk_agg)?;
        subgroup_check_g1(cs.namespace(|| "aggregate pubkey subgroup check"), &pk_agg)?;
        point_on_curve_no_check_g2(cs.namespace(|| "signature on curve"), &signature_point)?;
        subgroup_check_g2(cs.namespace(|| "signature subgroup check"), &signature_point)?;
        let neg_signature = negate_g2(cs.namespace(|| "-signature"), &signature_point)?;

        let miller = miller_loop_fp2_two(
            cs.namespace(|| "e(generator,-signature) * e(pk_agg,Hm)"),
            &generator,
            &neg_signature,
            &pk_agg,
            &hm,
        )?;
        let result = final_exponentiate(cs.namespace(|| "final exponentiate"), &miller)?;
        fp12_assert_one(cs.namespace(|| "pairing identity holds"), &result)?;

        let finality_branch_bits = (0..FINALIZED_HEADER_DEPTH)
            .map(|i| {
                alloc_node(
                    cs.namespace(|| format!("finality branch {i}")),
                    self.finality_branch.as_ref().and_then(|v| v.get(i)),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let restored_state_root = ssz_restore_merkle_root(
            cs.namespace(|| "restore finalized header root"),
            finalized_header_root,
            &finality_branch_bits,
            u64::try_from(FINALIZED_HEADER_INDEX).unwrap_or(u64::MAX),
        )?;
        for (i, (restored, declared)) in
            restored_state_root.iter().zip(attested_state_root_bits.iter()).enumerate()
        {
            Boolean::enforce_equal(
                cs.namespace(|| format!("finality root bit {i} matches attested state root")),
                restored,
                declared,
            )?;
        }

        let execution_state_root_bits =
            alloc_node(cs.namespace(|| "execution state root"), self.execution_state_root.as_ref())?;
        let execution_branch_bits = (0..EXECUTION_STATE_ROOT_DEPTH)
            .map(|i| {
                alloc_node(
                    cs.namespace(|| format!("execution branch {i}")),
                    self.execution_state_branch.as_ref().and_then(|v| v.get(i)),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let restored_body_root = ssz_restore_merkle_root(
            cs.namespace(|| "restore execution state root"),
            execution_state_root_bits,
            &execution_branch_bits,
            u64::try_from(EXECUTION_STATE_ROOT_INDEX).unwrap_or(u64::MAX),
        )?;
        for (i, (restored, declared)) in
            restored_body_root.iter().zip(finalized_body_root_bits.iter()).enumerate()
        {
            Boolean::enforce_equal(
                cs.namespace(|| format!("execution root bit {i} matches finalized body root")),
                restored,
                declared,
            )?;
        }

        let poseidon_value = self.sync_committee_poseidon.as_ref().and_then(bytes_le_to_scalar);
        let poseidon_num = AllocatedNum::alloc(cs.namespace(|| "syncCommitteePoseidon"), || {
            poseidon_value.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let public_inputs_root_value = self.public_inputs_root.as_ref().and_then(bytes_le_to_scalar);
        let public_inputs_root = AllocatedNum::alloc(cs.namespace(|| "publicInputsRoot"), || {
            public_inputs_root_value.ok_or(SynthesisError::AssignmentMissing)
        })?;

        assert_public_inputs_commitment(
            cs.namespace(|| "public inputs commitment"),
            &participation,
            &poseidon_num,
            &public_inputs_root,
        )?;

        public_inputs_root.inputize(cs.namespace(|| "expose publicInputsRoot"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bellman::Circuit;
    use bellman::gadgets::test::TestConstraintSystem;
    use bls12_381::Scalar;

    use super::Step;

    #[test]
    fn empty_witness_synthesizes_without_panicking() {
        let mut cs = TestConstraintSystem::<Scalar>::new();
        let step = Step::default();
        let _ = step.synthesize(&mut cs);
    }
}
