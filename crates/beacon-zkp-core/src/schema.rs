//! Serialized witness bundles and CLI-facing configuration schema.
//!
//! `serde` + `schemars` derives throughout, so the CLI can validate a config file against a
//! generated JSON schema before it ever touches the circuits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;

use crate::constants::{G1_POINT_SIZE, SYNC_COMMITTEE_SIZE};
use crate::ssz_types::{BeaconBlockHeader, MerkleProof};

/// Top-level configuration for a CLI invocation: which network preset and which Groth16
/// parameter files to use.
#[derive(Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LightClientCircuitConfig {
    /// Schema version, bumped whenever a breaking field is added.
    pub version: u32,
    /// Which beacon-chain preset this configuration targets.
    pub network: NetworkPreset,
    /// Path to the Step circuit's Groth16 parameters, relative to the config file.
    pub step_params_path: String,
    /// Path to the Rotate circuit's Groth16 parameters, relative to the config file.
    pub rotate_params_path: String,
}

/// Network preset identifier.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPreset {
    /// Ethereum mainnet beacon chain.
    Mainnet,
    /// A minimal/testnet preset (same constants, different genesis).
    Minimal,
}

/// A fully-populated witness for the Step circuit.
///
/// All fields are host-computed values fed into `beacon-zkp-circuits::step::Step`; none of
/// them are trusted by the circuit without an accompanying in-circuit re-derivation.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepWitness {
    /// The attested beacon block header.
    pub attested_header: BeaconBlockHeader,
    /// The finalized beacon block header.
    pub finalized_header: BeaconBlockHeader,
    /// Merkle proof that `finalized_header`'s root sits under the attested state root.
    pub finality_branch: MerkleProof,
    /// The execution-layer state root, Merkleized under the finalized block body at
    /// `EXECUTION_STATE_ROOT_INDEX`.
    #[serde_as(as = "Hex")]
    pub execution_state_root: [u8; 32],
    /// Merkle proof that the execution state root sits under the finalized block body.
    pub execution_state_branch: MerkleProof,
    /// Compressed bytes of every sync committee member's public key, in committee order.
    #[serde_as(as = "Vec<Hex>")]
    pub pubkeys: Vec<[u8; G1_POINT_SIZE]>,
    /// One bit per committee member: did they sign the attested header.
    pub aggregation_bits: Vec<bool>,
    /// The aggregated BLS signature over the signing root, compressed G2 encoding.
    #[serde_as(as = "Hex")]
    pub signature: [u8; 96],
    /// The fork/genesis-validators-root signing domain.
    #[serde_as(as = "Hex")]
    pub domain: [u8; 32],
    /// The Poseidon commitment to the sync committee that produced `signature`, as attested by
    /// that committee's Rotate proof; folded into `public_inputs_root` so a Step proof is bound
    /// to a specific, previously-rotated-in committee.
    #[serde_as(as = "Hex")]
    pub sync_committee_poseidon: [u8; 32],
    /// Truncated SHA-256 commitment to the circuit's public inputs, as a scalar.
    #[serde_as(as = "Hex")]
    pub public_inputs_root: [u8; 32],
}

impl StepWitness {
    /// Returns an error if the witness's array lengths are inconsistent with the compile-time
    /// committee size, before any circuit synthesis is attempted.
    ///
    /// # Errors
    /// Returns [`crate::error::WitnessBuildError`] describing the first inconsistency found.
    pub fn validate_shape(&self) -> Result<(), crate::error::WitnessBuildError> {
        if self.pubkeys.len() != SYNC_COMMITTEE_SIZE {
            return Err(crate::error::WitnessBuildError::InvalidCommitteeLength {
                actual: self.pubkeys.len(),
                expected: SYNC_COMMITTEE_SIZE,
            });
        }
        if self.aggregation_bits.len() != SYNC_COMMITTEE_SIZE {
            return Err(crate::error::WitnessBuildError::InvalidBitmapLength(
                self.aggregation_bits.len(),
                SYNC_COMMITTEE_SIZE,
            ));
        }
        Ok(())
    }
}

/// A fully-populated witness for the Rotate circuit.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateWitness {
    /// The finalized beacon block header for the period boundary.
    pub finalized_header: BeaconBlockHeader,
    /// Merkle proof that the new sync committee's SSZ root sits under the finalized state.
    pub sync_committee_branch: MerkleProof,
    /// Compressed bytes of every new committee member's public key, in committee order.
    #[serde_as(as = "Vec<Hex>")]
    pub pubkeys: Vec<[u8; G1_POINT_SIZE]>,
    /// Compressed bytes of the new committee's declared aggregate public key.
    #[serde_as(as = "Hex")]
    pub aggregate_pubkey: [u8; G1_POINT_SIZE],
    /// The Poseidon commitment to the new committee, exposed as a public input.
    #[serde_as(as = "Hex")]
    pub sync_committee_poseidon: [u8; 32],
}

impl RotateWitness {
    /// Returns an error if the witness's array lengths are inconsistent with the compile-time
    /// committee size.
    ///
    /// # Errors
    /// Returns [`crate::error::WitnessBuildError`] describing the first inconsistency found.
    pub fn validate_shape(&self) -> Result<(), crate::error::WitnessBuildError> {
        if self.pubkeys.len() != SYNC_COMMITTEE_SIZE {
            return Err(crate::error::WitnessBuildError::InvalidCommitteeLength {
                actual: self.pubkeys.len(),
                expected: SYNC_COMMITTEE_SIZE,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LightClientCircuitConfig, NetworkPreset};

    #[test]
    fn config_round_trips_through_json() {
        let config = LightClientCircuitConfig {
            version: 1,
            network: NetworkPreset::Mainnet,
            step_params_path: "step.params".to_owned(),
            rotate_params_path: "rotate.params".to_owned(),
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let round_tripped: LightClientCircuitConfig =
            serde_json::from_str(&json).expect("deserialize");
        assert_eq!(config, round_tripped);
    }
}
