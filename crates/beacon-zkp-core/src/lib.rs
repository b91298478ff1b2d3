//! Shared constants, witness types, and errors for the beacon light-client circuits.

/// Compile-time constants fixed by the R1CS.
pub mod constants;
/// `thiserror`-derived error taxonomy (parameter/constant/witness/host errors).
pub mod error;
/// SSZ header and Merkle-proof primitive types.
pub mod ssz_types;
/// Serialized witness bundles and CLI-facing config schema.
pub mod schema;
