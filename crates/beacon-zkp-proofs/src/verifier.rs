//! Groth16 verification for the Step and Rotate circuits.
//!
//! The public-input vectors built here must match the order and packing the circuits use when
//! they `inputize`/`pack_into_inputs` their outputs: Step exposes the single commitment scalar,
//! Rotate exposes `finalizedHeaderRoot` (multipacked), `syncCommitteePoseidon`, and
//! `syncCommitteeSSZ` (multipacked), in that order.

use beacon_zkp_core::error::{ProofError, WitnessBuildError};
use bellman::gadgets::multipack;
use bellman::groth16::{PreparedVerifyingKey, Proof, verify_proof};
use bls12_381::{Bls12, Scalar};

/// Public inputs for a Step proof.
#[derive(Debug, Clone)]
pub struct StepPublicInputs {
    /// The truncated-SHA-256 commitment to the circuit's public values.
    pub public_inputs_root: Scalar,
}

impl StepPublicInputs {
    /// Parses the commitment scalar from its little-endian byte encoding.
    ///
    /// # Errors
    /// Returns [`WitnessBuildError::InvalidScalar`] if the bytes are not a canonical scalar.
    pub fn from_bytes(public_inputs_root: &[u8; 32]) -> Result<Self, ProofError> {
        let scalar: Option<Scalar> = Scalar::from_bytes(public_inputs_root).into();
        let public_inputs_root =
            scalar.ok_or(WitnessBuildError::InvalidScalar("publicInputsRoot"))?;
        Ok(Self { public_inputs_root })
    }

    /// The verifier-facing input vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Scalar> {
        vec![self.public_inputs_root]
    }
}

/// Public inputs for a Rotate proof.
#[derive(Debug, Clone)]
pub struct RotatePublicInputs {
    /// SSZ root of the finalized header the committee rotation is anchored to.
    pub finalized_header_root: [u8; 32],
    /// Poseidon commitment to the incoming committee.
    pub sync_committee_poseidon: Scalar,
    /// SSZ root of the incoming committee.
    pub sync_committee_ssz: [u8; 32],
}

impl RotatePublicInputs {
    /// Parses the Poseidon commitment scalar and adopts the two roots verbatim.
    ///
    /// # Errors
    /// Returns [`WitnessBuildError::InvalidScalar`] if the commitment bytes are not a
    /// canonical scalar.
    pub fn from_bytes(
        finalized_header_root: &[u8; 32],
        sync_committee_poseidon: &[u8; 32],
        sync_committee_ssz: &[u8; 32],
    ) -> Result<Self, ProofError> {
        let scalar: Option<Scalar> = Scalar::from_bytes(sync_committee_poseidon).into();
        let sync_committee_poseidon =
            scalar.ok_or(WitnessBuildError::InvalidScalar("syncCommitteePoseidon"))?;
        Ok(Self {
            finalized_header_root: *finalized_header_root,
            sync_committee_poseidon,
            sync_committee_ssz: *sync_committee_ssz,
        })
    }

    /// The verifier-facing input vector: the multipacked finalized header root, the Poseidon
    /// commitment, and the multipacked committee SSZ root.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Scalar> {
        let mut inputs = multipack::compute_multipacking(&multipack::bytes_to_bits_le(
            &self.finalized_header_root,
        ));
        inputs.push(self.sync_committee_poseidon);
        inputs.extend(multipack::compute_multipacking::<Scalar>(&multipack::bytes_to_bits_le(
            &self.sync_committee_ssz,
        )));
        inputs
    }
}

/// Verifies a Step proof.
///
/// # Errors
/// Returns [`ProofError::VerificationFailed`] if the proof does not verify (distinct from a
/// backend error).
pub fn verify_step_proof(
    pvk: &PreparedVerifyingKey<Bls12>,
    proof: &Proof<Bls12>,
    public_inputs: &StepPublicInputs,
) -> Result<(), ProofError> {
    verify_proof(pvk, proof, &public_inputs.to_vec()).map_err(|_| ProofError::VerificationFailed)
}

/// Verifies a Rotate proof.
///
/// # Errors
/// Returns [`ProofError::VerificationFailed`] if the proof does not verify (distinct from a
/// backend error).
pub fn verify_rotate_proof(
    pvk: &PreparedVerifyingKey<Bls12>,
    proof: &Proof<Bls12>,
    public_inputs: &RotatePublicInputs,
) -> Result<(), ProofError> {
    verify_proof(pvk, proof, &public_inputs.to_vec()).map_err(|_| ProofError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use bls12_381::Scalar;

    use super::{RotatePublicInputs, StepPublicInputs};

    #[test]
    fn step_inputs_are_a_single_scalar() {
        let inputs = StepPublicInputs { public_inputs_root: Scalar::from(7_u64) }.to_vec();
        assert_eq!(inputs, vec![Scalar::from(7_u64)]);
    }

    #[test]
    fn rotate_inputs_pack_each_root_into_two_scalars() {
        let inputs = RotatePublicInputs {
            finalized_header_root: [0xab_u8; 32],
            sync_committee_poseidon: Scalar::from(3_u64),
            sync_committee_ssz: [0xcd_u8; 32],
        }
        .to_vec();
        assert_eq!(inputs.len(), 5);
        assert_eq!(inputs.get(2), Some(&Scalar::from(3_u64)));
    }

    #[test]
    fn non_canonical_poseidon_bytes_are_rejected() {
        let result = RotatePublicInputs::from_bytes(&[0_u8; 32], &[0xff_u8; 32], &[0_u8; 32]);
        assert!(result.is_err());
    }
}
