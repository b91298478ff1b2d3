//! Beacon light-client circuit CLI.

mod cli;
mod commands;

use beacon_zkp_core::error::ProofError;
use clap::Parser as _;
use cli::{Cli, Commands};

fn init_tracing() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_target(false)
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize tracing: {e:?}"))
}

fn main() -> eyre::Result<()> {
    // Load .env file (fails silently if not found)
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Setup { circuit, params_out } => commands::setup(circuit, &params_out),
        Commands::BuildWitness { circuit, input, output } => {
            commands::build_witness(circuit, &input, &output)
        }
        Commands::Prove { circuit, witness, params, proof_out, public_out } => {
            commands::prove(circuit, &witness, &params, &proof_out, &public_out)
        }
        Commands::Verify { circuit, proof, params, public_inputs } => {
            commands::verify(circuit, &proof, &params, &public_inputs)
        }
        Commands::ConfigSchema { output } => commands::write_config_schema(&output),
    };

    if let Err(e) = res {
        tracing::error!("Error: {e:?}");
        // An invalid proof exits with a dedicated code so callers can tell a rejected proof
        // apart from a prover/backend failure.
        let code = if matches!(e.downcast_ref::<ProofError>(), Some(ProofError::VerificationFailed)) {
            2
        } else {
            1
        };
        std::process::exit(code);
    }

    Ok(())
}
