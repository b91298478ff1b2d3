//! Parameter and proof-encoding types shared by the prover and verifier halves.

use std::io::{Read, Write};

use beacon_zkp_core::error::ProofError;
use bellman::groth16::{Parameters, PreparedVerifyingKey, Proof, VerifyingKey, prepare_verifying_key};
use bls12_381::Bls12;

/// Byte length of an encoded Groth16 proof: two compressed G1 points and one compressed G2
/// point.
pub const GROTH_PROOF_SIZE: usize = 48 + 96 + 48;

/// An encoded Groth16 proof.
pub type GrothProofBytes = [u8; GROTH_PROOF_SIZE];

/// Groth16 parameters for the Step circuit.
pub struct StepParameters(pub Parameters<Bls12>);

/// Groth16 parameters for the Rotate circuit.
pub struct RotateParameters(pub Parameters<Bls12>);

impl StepParameters {
    /// Returns the verifying key.
    #[must_use]
    pub const fn verifying_key(&self) -> &VerifyingKey<Bls12> {
        &self.0.vk
    }

    /// Returns a prepared verifying key for efficient verification.
    #[must_use]
    pub fn prepared_verifying_key(&self) -> PreparedVerifyingKey<Bls12> {
        prepare_verifying_key(&self.0.vk)
    }

    /// Reads parameters from `reader`, skipping the per-point validity checks (intended for
    /// parameter files this host wrote itself).
    ///
    /// # Errors
    /// Returns [`ProofError::Io`] if the bytes are truncated or malformed.
    pub fn read<R: Read>(reader: R) -> Result<Self, ProofError> {
        Parameters::read(reader, false).map(Self).map_err(ProofError::from)
    }

    /// Writes the parameters to `writer`.
    ///
    /// # Errors
    /// Returns [`ProofError::Io`] on a write failure.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), ProofError> {
        self.0.write(writer).map_err(ProofError::from)
    }
}

impl RotateParameters {
    /// Returns the verifying key.
    #[must_use]
    pub const fn verifying_key(&self) -> &VerifyingKey<Bls12> {
        &self.0.vk
    }

    /// Returns a prepared verifying key for efficient verification.
    #[must_use]
    pub fn prepared_verifying_key(&self) -> PreparedVerifyingKey<Bls12> {
        prepare_verifying_key(&self.0.vk)
    }

    /// Reads parameters from `reader`, skipping the per-point validity checks (intended for
    /// parameter files this host wrote itself).
    ///
    /// # Errors
    /// Returns [`ProofError::Io`] if the bytes are truncated or malformed.
    pub fn read<R: Read>(reader: R) -> Result<Self, ProofError> {
        Parameters::read(reader, false).map(Self).map_err(ProofError::from)
    }

    /// Writes the parameters to `writer`.
    ///
    /// # Errors
    /// Returns [`ProofError::Io`] on a write failure.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), ProofError> {
        self.0.write(writer).map_err(ProofError::from)
    }
}

/// Encodes a Groth16 proof to its fixed-width byte form.
///
/// # Errors
/// Returns [`ProofError::Io`] if serialization fails.
pub fn encode_proof(proof: &Proof<Bls12>) -> Result<GrothProofBytes, ProofError> {
    let mut bytes = [0_u8; GROTH_PROOF_SIZE];
    proof.write(&mut bytes[..])?;
    Ok(bytes)
}

/// Decodes a Groth16 proof from its fixed-width byte form.
///
/// # Errors
/// Returns [`ProofError::Io`] if the bytes do not decode to valid curve points.
pub fn decode_proof(bytes: &GrothProofBytes) -> Result<Proof<Bls12>, ProofError> {
    Proof::read(&bytes[..]).map_err(ProofError::from)
}

#[cfg(test)]
mod tests {
    use super::GROTH_PROOF_SIZE;

    #[test]
    fn proof_size_matches_groth16_point_encoding() {
        assert_eq!(GROTH_PROOF_SIZE, 192);
    }
}
