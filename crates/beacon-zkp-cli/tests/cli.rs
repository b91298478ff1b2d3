//! End-to-end checks of the CLI surface that do not require a trusted setup (parameter
//! generation for the full circuits is far too heavy for a test run).

use assert_cmd::Command;
use beacon_zkp_core::constants::{
    EXECUTION_STATE_ROOT_DEPTH, FINALIZED_HEADER_DEPTH, SYNC_COMMITTEE_DEPTH,
    SYNC_COMMITTEE_SIZE,
};
use beacon_zkp_core::schema::{RotateWitness, StepWitness};
use beacon_zkp_core::ssz_types::{BeaconBlockHeader, MerkleProof};

fn beacon_zkp() -> Command {
    Command::cargo_bin("beacon-zkp").expect("binary builds")
}

fn dummy_header() -> BeaconBlockHeader {
    BeaconBlockHeader {
        slot: [0_u8; 32],
        proposer_index: [0_u8; 32],
        parent_root: [0_u8; 32],
        state_root: [0_u8; 32],
        body_root: [0_u8; 32],
    }
}

#[test]
fn help_lists_all_subcommands() {
    let output = beacon_zkp().arg("--help").output().expect("command runs");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["setup", "build-witness", "prove", "verify", "config-schema"] {
        assert!(stdout.contains(subcommand), "help should mention {subcommand}");
    }
}

#[test]
fn config_schema_writes_parseable_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema_path = dir.path().join("schema.json");

    beacon_zkp().arg("config-schema").arg("--output").arg(&schema_path).assert().success();

    let contents = std::fs::read_to_string(&schema_path).expect("schema written");
    let schema: serde_json::Value = serde_json::from_str(&contents).expect("valid json");
    assert!(schema.get("properties").is_some());
}

#[test]
fn verify_with_missing_proof_file_fails() {
    beacon_zkp()
        .args(["verify", "step", "--proof", "does-not-exist.bin"])
        .assert()
        .failure();
}

#[test]
fn build_witness_step_fills_public_inputs_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("step_witness.json");
    let output = dir.path().join("step_witness_built.json");

    let witness = StepWitness {
        attested_header: dummy_header(),
        finalized_header: dummy_header(),
        finality_branch: MerkleProof {
            leaf: [0_u8; 32],
            index: 105,
            branch: vec![[0_u8; 32]; FINALIZED_HEADER_DEPTH],
        },
        execution_state_root: [0_u8; 32],
        execution_state_branch: MerkleProof {
            leaf: [0_u8; 32],
            index: 402,
            branch: vec![[0_u8; 32]; EXECUTION_STATE_ROOT_DEPTH],
        },
        pubkeys: vec![bls12_381::G1Affine::generator().to_compressed(); SYNC_COMMITTEE_SIZE],
        aggregation_bits: vec![true; SYNC_COMMITTEE_SIZE],
        signature: bls12_381::G2Affine::generator().to_compressed(),
        domain: [0_u8; 32],
        sync_committee_poseidon: bls12_381::Scalar::from(5_u64).to_bytes(),
        public_inputs_root: [0_u8; 32],
    };
    std::fs::write(&input, serde_json::to_vec(&witness).expect("serialize")).expect("write");

    beacon_zkp()
        .args(["build-witness", "step", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let built: StepWitness =
        serde_json::from_str(&std::fs::read_to_string(&output).expect("output written"))
            .expect("valid witness json");
    assert_ne!(built.public_inputs_root, [0_u8; 32]);
}

#[test]
fn build_witness_rotate_fills_poseidon_commitment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("rotate_witness.json");
    let output = dir.path().join("rotate_witness_built.json");

    let committee_size = u64::try_from(SYNC_COMMITTEE_SIZE).expect("committee size fits u64");
    let aggregate =
        bls12_381::G1Projective::generator() * bls12_381::Scalar::from(committee_size);

    let witness = RotateWitness {
        finalized_header: dummy_header(),
        sync_committee_branch: MerkleProof {
            leaf: [0_u8; 32],
            index: 55,
            branch: vec![[0_u8; 32]; SYNC_COMMITTEE_DEPTH],
        },
        pubkeys: vec![bls12_381::G1Affine::generator().to_compressed(); SYNC_COMMITTEE_SIZE],
        aggregate_pubkey: bls12_381::G1Affine::from(aggregate).to_compressed(),
        sync_committee_poseidon: [0_u8; 32],
    };
    std::fs::write(&input, serde_json::to_vec(&witness).expect("serialize")).expect("write");

    beacon_zkp()
        .args(["build-witness", "rotate", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let built: RotateWitness =
        serde_json::from_str(&std::fs::read_to_string(&output).expect("output written"))
            .expect("valid witness json");
    assert_ne!(built.sync_committee_poseidon, [0_u8; 32]);
}
