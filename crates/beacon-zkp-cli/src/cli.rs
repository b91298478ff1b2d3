//! Command-line interface definition for the `beacon-zkp` binary.

use std::path::PathBuf;

use clap::Parser;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = "beacon-zkp")]
#[command(about = "Beacon light-client circuit tools")]
pub struct Cli {
    /// CLI subcommands.
    #[command(subcommand)]
    pub command: Commands,
}

/// Which top-level circuit a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CircuitKind {
    /// The per-update signature/finality circuit.
    Step,
    /// The per-period committee rotation circuit.
    Rotate,
}

/// CLI subcommands.
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Generate Groth16 parameters for a circuit (local trusted setup).
    Setup {
        /// Which circuit to set up.
        #[arg(value_enum)]
        circuit: CircuitKind,

        /// Output file for the generated parameters.
        #[arg(long, env = "PARAMS_FILE", default_value = "circuit.params")]
        params_out: PathBuf,
    },
    /// Validate a witness bundle and fill in its derived fields (the Step public-input
    /// commitment, the Rotate Poseidon commitment).
    BuildWitness {
        /// Which circuit the witness targets.
        #[arg(value_enum)]
        circuit: CircuitKind,

        /// Witness JSON file to read.
        #[arg(long, env = "WITNESS_FILE")]
        input: PathBuf,

        /// Where to write the validated witness JSON.
        #[arg(long, default_value = "witness.json")]
        output: PathBuf,
    },
    /// Create a Groth16 proof from a witness bundle.
    Prove {
        /// Which circuit to prove.
        #[arg(value_enum)]
        circuit: CircuitKind,

        /// Witness JSON file (from `build-witness`).
        #[arg(long, env = "WITNESS_FILE")]
        witness: PathBuf,

        /// Groth16 parameters file (from `setup`).
        #[arg(long, env = "PARAMS_FILE", default_value = "circuit.params")]
        params: PathBuf,

        /// Where to write the encoded proof.
        #[arg(long, default_value = "proof.bin")]
        proof_out: PathBuf,

        /// Where to write the public inputs the verifier needs.
        #[arg(long, default_value = "public_inputs.json")]
        public_out: PathBuf,
    },
    /// Verify a Groth16 proof against its public inputs.
    Verify {
        /// Which circuit the proof is for.
        #[arg(value_enum)]
        circuit: CircuitKind,

        /// Encoded proof file (from `prove`).
        #[arg(long, default_value = "proof.bin")]
        proof: PathBuf,

        /// Groth16 parameters file (from `setup`).
        #[arg(long, env = "PARAMS_FILE", default_value = "circuit.params")]
        params: PathBuf,

        /// Public inputs JSON file (from `prove`).
        #[arg(long, default_value = "public_inputs.json")]
        public_inputs: PathBuf,
    },
    /// Write the JSON schema of the circuit configuration file.
    ConfigSchema {
        /// Where to write the generated schema.
        #[arg(long, default_value = "light_client_config.schema.json")]
        output: PathBuf,
    },
}
