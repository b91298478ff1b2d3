//! Implementations of the CLI subcommands: thin orchestration over `beacon-zkp-proofs`,
//! converting file paths and hex strings into the typed witness/parameter/proof values the
//! library layers expect.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use beacon_zkp_circuits::native::{decompress_g1, native_committee_poseidon};
use beacon_zkp_circuits::public_inputs::native_commit_to_public_inputs;
use beacon_zkp_core::error::{CircuitError, WitnessBuildError};
use beacon_zkp_core::schema::{LightClientCircuitConfig, RotateWitness, StepWitness};
use beacon_zkp_proofs::{GrothProofBytes, RotateParameters, StepParameters, decode_proof, encode_proof};
use beacon_zkp_ssz::merkle::native_sync_committee_root;
use bls12_381::Scalar;
use eyre::Context as _;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::cli::CircuitKind;

/// Verifier-facing public inputs for a Step proof, as written by `prove` and read by `verify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StepPublicInputsFile {
    /// Hex encoding of the 32-byte commitment scalar.
    pub public_inputs_root: String,
}

/// Verifier-facing public inputs for a Rotate proof.
#[derive(Debug, Serialize, Deserialize)]
pub struct RotatePublicInputsFile {
    /// Hex encoding of the finalized header's SSZ root.
    pub finalized_header_root: String,
    /// Hex encoding of the 32-byte Poseidon commitment scalar.
    pub sync_committee_poseidon: String,
    /// Hex encoding of the committee's SSZ root.
    pub sync_committee_ssz: String,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> eyre::Result<T> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> eyre::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn parse_hex32(label: &str, value: &str) -> eyre::Result<[u8; 32]> {
    let bytes = hex::decode(value).with_context(|| format!("{label} is not valid hex"))?;
    bytes.try_into().map_err(|_| eyre::eyre!("{label} must be 32 bytes"))
}

/// Runs the local trusted setup for `circuit` and writes the parameters to `params_out`.
///
/// # Errors
/// Returns an error if parameter synthesis or the file write fails.
pub fn setup(circuit: CircuitKind, params_out: &Path) -> eyre::Result<()> {
    tracing::info!(?circuit, "generating Groth16 parameters; this synthesizes the full circuit");
    let file = File::create(params_out)
        .with_context(|| format!("failed to create {}", params_out.display()))?;
    let mut writer = BufWriter::new(file);
    match circuit {
        CircuitKind::Step => {
            beacon_zkp_proofs::prover::generate_step_parameters(&mut OsRng)?.write(&mut writer)?;
        }
        CircuitKind::Rotate => {
            beacon_zkp_proofs::prover::generate_rotate_parameters(&mut OsRng)?.write(&mut writer)?;
        }
    }
    tracing::info!(path = %params_out.display(), "parameters written");
    Ok(())
}

fn participation_scalar(aggregation_bits: &[bool]) -> eyre::Result<Scalar> {
    let count = aggregation_bits.iter().filter(|&&bit| bit).count();
    if count == 0 {
        return Err(CircuitError::ZeroParticipation.into());
    }
    Ok(Scalar::from(u64::try_from(count).unwrap_or(u64::MAX)))
}

fn build_step_witness(input: &Path, output: &Path) -> eyre::Result<()> {
    let mut witness: StepWitness = read_json(input)?;
    beacon_zkp_proofs::prover::prepare_step_circuit(&witness)?;

    let participation = participation_scalar(&witness.aggregation_bits)?;
    let poseidon: Option<Scalar> = Scalar::from_bytes(&witness.sync_committee_poseidon).into();
    let poseidon = poseidon.ok_or(WitnessBuildError::InvalidScalar("syncCommitteePoseidon"))?;

    let root = native_commit_to_public_inputs(participation, poseidon);
    witness.public_inputs_root = root.to_bytes();

    write_json(output, &witness)?;
    tracing::info!(path = %output.display(), "step witness validated, commitment filled in");
    Ok(())
}

fn build_rotate_witness(input: &Path, output: &Path) -> eyre::Result<()> {
    let mut witness: RotateWitness = read_json(input)?;

    let pubkeys = witness
        .pubkeys
        .iter()
        .enumerate()
        .map(|(i, bytes)| decompress_g1(bytes, i))
        .collect::<Result<Vec<_>, _>>()?;
    witness.sync_committee_poseidon = native_committee_poseidon(&pubkeys).to_bytes();

    beacon_zkp_proofs::prover::prepare_rotate_circuit(&witness)?;

    write_json(output, &witness)?;
    tracing::info!(path = %output.display(), "rotate witness validated, Poseidon commitment filled in");
    Ok(())
}

/// Validates a witness bundle and fills in its derived fields.
///
/// # Errors
/// Returns an error if the witness file is malformed or fails host-side validation.
pub fn build_witness(circuit: CircuitKind, input: &Path, output: &Path) -> eyre::Result<()> {
    match circuit {
        CircuitKind::Step => build_step_witness(input, output),
        CircuitKind::Rotate => build_rotate_witness(input, output),
    }
}

fn prove_step(
    witness_path: &Path,
    params_path: &Path,
    proof_out: &Path,
    public_out: &Path,
) -> eyre::Result<()> {
    let witness: StepWitness = read_json(witness_path)?;
    let params_file = File::open(params_path)
        .with_context(|| format!("failed to open {}", params_path.display()))?;
    let params = StepParameters::read(BufReader::new(params_file))?;

    let circuit = beacon_zkp_proofs::prover::prepare_step_circuit(&witness)?;
    tracing::info!("creating Step proof");
    let proof = beacon_zkp_proofs::prover::create_step_proof(&params, circuit, &mut OsRng)?;

    std::fs::write(proof_out, encode_proof(&proof)?)
        .with_context(|| format!("failed to write {}", proof_out.display()))?;
    write_json(
        public_out,
        &StepPublicInputsFile { public_inputs_root: hex::encode(witness.public_inputs_root) },
    )?;
    tracing::info!(proof = %proof_out.display(), inputs = %public_out.display(), "step proof written");
    Ok(())
}

fn prove_rotate(
    witness_path: &Path,
    params_path: &Path,
    proof_out: &Path,
    public_out: &Path,
) -> eyre::Result<()> {
    let witness: RotateWitness = read_json(witness_path)?;
    let params_file = File::open(params_path)
        .with_context(|| format!("failed to open {}", params_path.display()))?;
    let params = RotateParameters::read(BufReader::new(params_file))?;

    let circuit = beacon_zkp_proofs::prover::prepare_rotate_circuit(&witness)?;
    tracing::info!("creating Rotate proof");
    let proof = beacon_zkp_proofs::prover::create_rotate_proof(&params, circuit, &mut OsRng)?;

    std::fs::write(proof_out, encode_proof(&proof)?)
        .with_context(|| format!("failed to write {}", proof_out.display()))?;
    write_json(
        public_out,
        &RotatePublicInputsFile {
            finalized_header_root: hex::encode(witness.finalized_header.hash_tree_root()),
            sync_committee_poseidon: hex::encode(witness.sync_committee_poseidon),
            sync_committee_ssz: hex::encode(native_sync_committee_root(
                &witness.pubkeys,
                &witness.aggregate_pubkey,
            )),
        },
    )?;
    tracing::info!(proof = %proof_out.display(), inputs = %public_out.display(), "rotate proof written");
    Ok(())
}

/// Creates a Groth16 proof from a witness bundle.
///
/// # Errors
/// Returns an error if witness preparation, proving, or any file access fails.
pub fn prove(
    circuit: CircuitKind,
    witness: &Path,
    params: &Path,
    proof_out: &Path,
    public_out: &Path,
) -> eyre::Result<()> {
    match circuit {
        CircuitKind::Step => prove_step(witness, params, proof_out, public_out),
        CircuitKind::Rotate => prove_rotate(witness, params, proof_out, public_out),
    }
}

fn read_proof(path: &Path) -> eyre::Result<bellman::groth16::Proof<bls12_381::Bls12>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let bytes: GrothProofBytes = bytes
        .try_into()
        .map_err(|_| eyre::eyre!("proof file must be {} bytes", beacon_zkp_proofs::GROTH_PROOF_SIZE))?;
    Ok(decode_proof(&bytes)?)
}

/// Verifies a Groth16 proof against its public inputs.
///
/// # Errors
/// Returns an error if verification fails; the caller maps a verification failure (as opposed
/// to a malformed-input error) to a distinct exit code.
pub fn verify(
    circuit: CircuitKind,
    proof_path: &Path,
    params_path: &Path,
    public_inputs: &Path,
) -> eyre::Result<()> {
    let proof = read_proof(proof_path)?;
    let params_file = File::open(params_path)
        .with_context(|| format!("failed to open {}", params_path.display()))?;

    match circuit {
        CircuitKind::Step => {
            let params = StepParameters::read(BufReader::new(params_file))?;
            let inputs_file: StepPublicInputsFile = read_json(public_inputs)?;
            let root = parse_hex32("public_inputs_root", &inputs_file.public_inputs_root)?;
            let inputs = beacon_zkp_proofs::verifier::StepPublicInputs::from_bytes(&root)?;
            beacon_zkp_proofs::verifier::verify_step_proof(
                &params.prepared_verifying_key(),
                &proof,
                &inputs,
            )?;
        }
        CircuitKind::Rotate => {
            let params = RotateParameters::read(BufReader::new(params_file))?;
            let inputs_file: RotatePublicInputsFile = read_json(public_inputs)?;
            let inputs = beacon_zkp_proofs::verifier::RotatePublicInputs::from_bytes(
                &parse_hex32("finalized_header_root", &inputs_file.finalized_header_root)?,
                &parse_hex32("sync_committee_poseidon", &inputs_file.sync_committee_poseidon)?,
                &parse_hex32("sync_committee_ssz", &inputs_file.sync_committee_ssz)?,
            )?;
            beacon_zkp_proofs::verifier::verify_rotate_proof(
                &params.prepared_verifying_key(),
                &proof,
                &inputs,
            )?;
        }
    }
    tracing::info!(?circuit, "proof verified");
    Ok(())
}

/// Writes the JSON schema of [`LightClientCircuitConfig`] so config files can be validated
/// before they ever touch the circuits.
///
/// # Errors
/// Returns an error if the file write fails.
pub fn write_config_schema(output: &Path) -> eyre::Result<()> {
    let schema = schemars::schema_for!(LightClientCircuitConfig);
    write_json(output, &schema)?;
    tracing::info!(path = %output.display(), "config schema written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_hex32, participation_scalar};

    #[test]
    fn parse_hex32_round_trips() {
        let bytes = [0xab_u8; 32];
        let parsed = parse_hex32("test", &hex::encode(bytes)).expect("valid hex");
        assert_eq!(parsed, bytes);
    }

    #[test]
    fn parse_hex32_rejects_short_input() {
        assert!(parse_hex32("test", "abcd").is_err());
    }

    #[test]
    fn zero_participation_is_rejected_host_side() {
        assert!(participation_scalar(&[false; 4]).is_err());
        assert!(participation_scalar(&[true, false, false, false]).is_ok());
    }
}
