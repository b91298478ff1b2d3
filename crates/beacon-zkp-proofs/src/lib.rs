//! Groth16 proving and verification glue for the beacon light-client circuits.
//!
//! Proving (parameter generation, witness preparation, proof creation) sits behind the `prove`
//! feature so a verification-only consumer does not pull in the circuit crates.

mod types;

pub use types::{
    GROTH_PROOF_SIZE, GrothProofBytes, RotateParameters, StepParameters, decode_proof,
    encode_proof,
};

#[cfg(feature = "prove")]
pub mod prover;

#[cfg(feature = "verify")]
pub mod verifier;
