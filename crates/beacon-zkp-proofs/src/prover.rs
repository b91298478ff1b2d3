//! Groth16 parameter generation and proving for the Step and Rotate circuits.
//!
//! Witness preparation (`prepare_*_circuit`) performs the host-side consistency checks before
//! any synthesis runs; everything it accepts is still re-derived and constrained in-circuit.

use beacon_zkp_circuits::rotate::Rotate;
use beacon_zkp_circuits::step::Step;
use beacon_zkp_core::error::{CircuitError, ProofError, WitnessBuildError};
use beacon_zkp_core::schema::{RotateWitness, StepWitness};
use bellman::groth16::{Proof, create_random_proof, generate_random_parameters};
use bls12_381::Bls12;
use group::Group as _;
use rand_core::RngCore;

use crate::types::{RotateParameters, StepParameters};

/// Runs the trusted setup for the Step circuit.
///
/// # Errors
/// Returns [`ProofError::Circuit`] if parameter synthesis fails.
pub fn generate_step_parameters<R: RngCore>(rng: &mut R) -> Result<StepParameters, ProofError> {
    generate_random_parameters::<Bls12, _, _>(Step::default(), rng)
        .map(StepParameters)
        .map_err(|e| ProofError::Circuit(CircuitError::Synthesis(e)))
}

/// Runs the trusted setup for the Rotate circuit.
///
/// # Errors
/// Returns [`ProofError::Circuit`] if parameter synthesis fails.
pub fn generate_rotate_parameters<R: RngCore>(rng: &mut R) -> Result<RotateParameters, ProofError> {
    generate_random_parameters::<Bls12, _, _>(Rotate::default(), rng)
        .map(RotateParameters)
        .map_err(|e| ProofError::Circuit(CircuitError::Synthesis(e)))
}

/// Prepares a Step circuit instance from a host-supplied witness bundle.
///
/// # Errors
/// Returns [`ProofError::WitnessBuild`] if the witness's shape or point encodings are invalid.
pub fn prepare_step_circuit(witness: &StepWitness) -> Result<Step, ProofError> {
    Step::from_witness(witness).map_err(ProofError::from)
}

/// Prepares a Rotate circuit instance from a host-supplied witness bundle, additionally
/// checking that the declared aggregate key really is the sum of the committee's keys.
///
/// # Errors
/// Returns [`ProofError::WitnessBuild`] if the witness's shape or point encodings are invalid,
/// or if the aggregate key is inconsistent with the committee.
pub fn prepare_rotate_circuit(witness: &RotateWitness) -> Result<Rotate, ProofError> {
    let circuit = Rotate::from_witness(witness)?;

    let mut aggregate = bls12_381::G1Projective::identity();
    for (i, bytes) in witness.pubkeys.iter().enumerate() {
        let affine: Option<bls12_381::G1Affine> = bls12_381::G1Affine::from_compressed(bytes).into();
        let affine = affine.ok_or(WitnessBuildError::InvalidG1Point(i))?;
        aggregate += bls12_381::G1Projective::from(affine);
    }
    if bls12_381::G1Affine::from(aggregate).to_compressed() != witness.aggregate_pubkey {
        return Err(WitnessBuildError::AggregateMismatch.into());
    }

    Ok(circuit)
}

/// Creates a Groth16 proof for a prepared Step circuit.
///
/// # Errors
/// Returns [`ProofError::Circuit`] if the witness does not satisfy the constraints.
pub fn create_step_proof<R: RngCore>(
    params: &StepParameters,
    circuit: Step,
    rng: &mut R,
) -> Result<Proof<Bls12>, ProofError> {
    create_random_proof(circuit, &params.0, rng)
        .map_err(|e| ProofError::Circuit(CircuitError::Synthesis(e)))
}

/// Creates a Groth16 proof for a prepared Rotate circuit.
///
/// # Errors
/// Returns [`ProofError::Circuit`] if the witness does not satisfy the constraints.
pub fn create_rotate_proof<R: RngCore>(
    params: &RotateParameters,
    circuit: Rotate,
    rng: &mut R,
) -> Result<Proof<Bls12>, ProofError> {
    create_random_proof(circuit, &params.0, rng)
        .map_err(|e| ProofError::Circuit(CircuitError::Synthesis(e)))
}

#[cfg(test)]
mod tests {
    use beacon_zkp_core::constants::{G1_POINT_SIZE, SYNC_COMMITTEE_DEPTH, SYNC_COMMITTEE_SIZE};
    use beacon_zkp_core::error::{ProofError, WitnessBuildError};
    use beacon_zkp_core::schema::RotateWitness;
    use beacon_zkp_core::ssz_types::{BeaconBlockHeader, MerkleProof};

    use super::prepare_rotate_circuit;

    fn rotate_witness(aggregate_pubkey: [u8; G1_POINT_SIZE]) -> RotateWitness {
        RotateWitness {
            finalized_header: BeaconBlockHeader {
                slot: [0_u8; 32],
                proposer_index: [0_u8; 32],
                parent_root: [0_u8; 32],
                state_root: [0_u8; 32],
                body_root: [0_u8; 32],
            },
            sync_committee_branch: MerkleProof {
                leaf: [0_u8; 32],
                index: 55,
                branch: vec![[0_u8; 32]; SYNC_COMMITTEE_DEPTH],
            },
            pubkeys: vec![bls12_381::G1Affine::generator().to_compressed(); SYNC_COMMITTEE_SIZE],
            aggregate_pubkey,
            sync_committee_poseidon: [0_u8; 32],
        }
    }

    #[test]
    fn prepare_rotate_rejects_mismatched_aggregate() {
        let witness = rotate_witness(bls12_381::G1Affine::generator().to_compressed());
        assert!(matches!(
            prepare_rotate_circuit(&witness),
            Err(ProofError::WitnessBuild(WitnessBuildError::AggregateMismatch))
        ));
    }

    #[test]
    fn prepare_rotate_accepts_consistent_aggregate() {
        use group::Group as _;

        let mut sum = bls12_381::G1Projective::identity();
        for _ in 0..SYNC_COMMITTEE_SIZE {
            sum += bls12_381::G1Projective::generator();
        }
        let witness = rotate_witness(bls12_381::G1Affine::from(sum).to_compressed());
        assert!(prepare_rotate_circuit(&witness).is_ok());
    }
}
