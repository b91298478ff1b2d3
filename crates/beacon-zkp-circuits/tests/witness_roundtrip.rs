//! Witness-bundle round trips: the JSON shapes the CLI reads must convert cleanly into circuit
//! instances, and host-side shape validation must reject the malformed bundles before any
//! synthesis is attempted.

use beacon_zkp_circuits::rotate::Rotate;
use beacon_zkp_circuits::step::Step;
use beacon_zkp_core::constants::{
    EXECUTION_STATE_ROOT_DEPTH, FINALIZED_HEADER_DEPTH, SYNC_COMMITTEE_DEPTH,
    SYNC_COMMITTEE_SIZE,
};
use beacon_zkp_core::error::WitnessBuildError;
use beacon_zkp_core::schema::{RotateWitness, StepWitness};
use beacon_zkp_core::ssz_types::{BeaconBlockHeader, MerkleProof};

fn header(tag: u8) -> BeaconBlockHeader {
    BeaconBlockHeader {
        slot: [tag; 32],
        proposer_index: [tag; 32],
        parent_root: [tag; 32],
        state_root: [tag; 32],
        body_root: [tag; 32],
    }
}

fn step_witness() -> StepWitness {
    StepWitness {
        attested_header: header(1),
        finalized_header: header(2),
        finality_branch: MerkleProof {
            leaf: [0_u8; 32],
            index: 105,
            branch: vec![[3_u8; 32]; FINALIZED_HEADER_DEPTH],
        },
        execution_state_root: [4_u8; 32],
        execution_state_branch: MerkleProof {
            leaf: [0_u8; 32],
            index: 402,
            branch: vec![[5_u8; 32]; EXECUTION_STATE_ROOT_DEPTH],
        },
        pubkeys: vec![bls12_381::G1Affine::generator().to_compressed(); SYNC_COMMITTEE_SIZE],
        aggregation_bits: vec![true; SYNC_COMMITTEE_SIZE],
        signature: bls12_381::G2Affine::generator().to_compressed(),
        domain: [6_u8; 32],
        sync_committee_poseidon: bls12_381::Scalar::from(7_u64).to_bytes(),
        public_inputs_root: bls12_381::Scalar::from(8_u64).to_bytes(),
    }
}

fn rotate_witness() -> RotateWitness {
    RotateWitness {
        finalized_header: header(9),
        sync_committee_branch: MerkleProof {
            leaf: [0_u8; 32],
            index: 55,
            branch: vec![[10_u8; 32]; SYNC_COMMITTEE_DEPTH],
        },
        pubkeys: vec![bls12_381::G1Affine::generator().to_compressed(); SYNC_COMMITTEE_SIZE],
        aggregate_pubkey: bls12_381::G1Affine::generator().to_compressed(),
        sync_committee_poseidon: bls12_381::Scalar::from(11_u64).to_bytes(),
    }
}

#[test]
fn step_witness_round_trips_through_json_into_a_circuit() {
    let witness = step_witness();
    let json = serde_json::to_string(&witness).expect("serialize");
    let parsed: StepWitness = serde_json::from_str(&json).expect("deserialize");

    let step = Step::from_witness(&parsed).expect("well-formed witness");
    assert_eq!(step.pubkeys.map(|p| p.len()), Some(SYNC_COMMITTEE_SIZE));
    assert_eq!(step.domain, Some(witness.domain));
}

#[test]
fn step_witness_rejects_truncated_finality_branch() {
    let mut witness = step_witness();
    witness.finality_branch.branch.pop();
    assert!(matches!(
        Step::from_witness(&witness),
        Err(WitnessBuildError::InvalidMerkleDepth { label: "finality", .. })
    ));
}

#[test]
fn step_witness_rejects_invalid_pubkey_bytes() {
    let mut witness = step_witness();
    if let Some(first) = witness.pubkeys.first_mut() {
        *first = [0xff_u8; 48];
    }
    assert!(matches!(
        Step::from_witness(&witness),
        Err(WitnessBuildError::InvalidG1Point(0))
    ));
}

#[test]
fn rotate_witness_round_trips_through_json_into_a_circuit() {
    let witness = rotate_witness();
    let json = serde_json::to_string(&witness).expect("serialize");
    let parsed: RotateWitness = serde_json::from_str(&json).expect("deserialize");

    let rotate = Rotate::from_witness(&parsed).expect("well-formed witness");
    assert_eq!(rotate.pubkey_bytes.map(|p| p.len()), Some(SYNC_COMMITTEE_SIZE));
    assert_eq!(rotate.aggregate_pubkey_bytes, Some(witness.aggregate_pubkey));
}

#[test]
fn native_public_input_commitment_is_deterministic_and_input_sensitive() {
    use beacon_zkp_circuits::public_inputs::native_commit_to_public_inputs;

    let participation = bls12_381::Scalar::from(400_u64);
    let poseidon = bls12_381::Scalar::from(12_345_u64);

    let root = native_commit_to_public_inputs(participation, poseidon);
    assert_eq!(root, native_commit_to_public_inputs(participation, poseidon));
    assert_ne!(root, native_commit_to_public_inputs(participation, bls12_381::Scalar::from(1_u64)));
    assert_ne!(root, native_commit_to_public_inputs(bls12_381::Scalar::from(1_u64), poseidon));
}
