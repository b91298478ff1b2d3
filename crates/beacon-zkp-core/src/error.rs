//! Error taxonomy for the beacon light-client circuits: host-side witness assembly errors,
//! in-circuit synthesis errors, and proving/verification glue errors.

/// Errors surfaced while assembling a witness from host-supplied inputs, before synthesis.
#[derive(Debug, thiserror::Error)]
pub enum WitnessBuildError {
    /// A compressed G1 point did not decode to a valid curve point.
    #[error("invalid G1 point encoding at index {0}")]
    InvalidG1Point(usize),

    /// A compressed G2 point (the aggregated signature) did not decode to a valid curve point.
    #[error("invalid G2 point encoding: {0}")]
    InvalidG2Point(&'static str),

    /// The sync committee byte blob was not `SYNC_COMMITTEE_SIZE * G1_POINT_SIZE` bytes.
    #[error("sync committee bytes had length {actual}, expected {expected}")]
    InvalidCommitteeLength {
        /// The length that was actually supplied.
        actual: usize,
        /// The length the circuit requires.
        expected: usize,
    },

    /// A Merkle proof did not have the expected number of sibling hashes.
    #[error("merkle proof for {label} had {actual} siblings, expected depth {expected}")]
    InvalidMerkleDepth {
        /// Which Merkle proof failed (finality, execution state, sync committee, ...).
        label: &'static str,
        /// The sibling count actually supplied.
        actual: usize,
        /// The depth required by the circuit.
        expected: usize,
    },

    /// The aggregation bitmap did not have `SYNC_COMMITTEE_SIZE` entries.
    #[error("aggregation bitmap had {0} entries, expected {1}")]
    InvalidBitmapLength(usize, usize),

    /// A 32-byte field did not decode to a valid BLS12-381 scalar.
    #[error("invalid scalar encoding for {0}")]
    InvalidScalar(&'static str),

    /// The aggregate pubkey bytes did not match the declared sync-committee bytes.
    #[error("aggregate pubkey is inconsistent with the declared sync committee bytes")]
    AggregateMismatch,
}

/// Errors surfaced while synthesizing or verifying a circuit.
#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    /// The witness was inconsistent and a constraint could not be satisfied.
    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] bellman::SynthesisError),

    /// The aggregated participation count was zero.
    #[error("participation must be nonzero")]
    ZeroParticipation,

    /// The aggregated public key was the point at infinity.
    #[error("aggregate public key must not be the point at infinity")]
    AggregateIsInfinity,
}

/// Errors surfaced by the Groth16 proving/verification glue.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// Witness preparation failed before synthesis started.
    #[error(transparent)]
    WitnessBuild(#[from] WitnessBuildError),

    /// Circuit synthesis failed.
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    /// The underlying Groth16 backend returned an error.
    #[error("groth16 backend error: {0}")]
    Backend(String),

    /// Reading or writing parameter/proof bytes failed.
    #[error("parameter/proof I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Proof verification failed (distinct from a backend error).
    #[error("proof verification failed")]
    VerificationFailed,
}
