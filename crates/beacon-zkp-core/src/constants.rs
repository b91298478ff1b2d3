//! Compile-time constants for the limb representation, committee size, and Merkle indices.
//!
//! Every gadget crate imports these rather than re-declaring magic numbers.

/// Bits per limb in the K-limb BLS12-381 base-field representation.
pub const N: u32 = 55;

/// Number of limbs in the K-limb BLS12-381 base-field representation.
pub const K: usize = 7;

/// Number of validators in a sync committee.
pub const SYNC_COMMITTEE_SIZE: usize = 512;

/// `log2(SYNC_COMMITTEE_SIZE)`.
pub const LOG2_SYNC_COMMITTEE_SIZE: u32 = 9;

/// Merkle depth of the finalized-header generalized index inside the attested beacon state.
pub const FINALIZED_HEADER_DEPTH: usize = 6;

/// Generalized Merkle index of the finalized header inside the attested beacon state.
pub const FINALIZED_HEADER_INDEX: usize = 105;

/// Merkle depth of the execution state root inside the finalized block body.
pub const EXECUTION_STATE_ROOT_DEPTH: usize = 8;

/// Generalized Merkle index of the execution state root inside the finalized block body.
pub const EXECUTION_STATE_ROOT_INDEX: usize = 402;

/// Merkle depth of the sync committee inside the finalized beacon state.
pub const SYNC_COMMITTEE_DEPTH: usize = 5;

/// Generalized Merkle index of the sync committee inside the finalized beacon state.
pub const SYNC_COMMITTEE_INDEX: usize = 55;

/// Number of bits the public-input SHA-256 chain is truncated to, so the root fits one scalar.
pub const TRUNCATED_SHA256_SIZE: usize = 253;

/// Byte length of a compressed G1 point (BLS12-381 public key encoding).
pub const G1_POINT_SIZE: usize = 48;

/// The BLS12-381 short-Weierstrass `a` coefficient (`y^2 = x^3 + a*x + b`).
pub const CURVE_A1: u64 = 0;

/// The BLS12-381 short-Weierstrass `b` coefficient.
pub const CURVE_B1: u64 = 4;

/// The BLS parameter `x` used by the optimal-Ate Miller loop and subgroup checks.
pub const BLS12381_PARAMETER: u64 = 15_132_376_222_941_642_752;

/// The BLS12-381 base-field prime, as `K` little-endian limbs of `N` bits each.
pub const BLS12381_PRIME: [u64; K] = [
    35_747_322_042_231_467,
    36_025_922_209_447_795,
    1_084_959_616_957_103,
    7_925_923_977_987_733,
    16_551_456_537_884_751,
    23_443_114_579_904_617,
    1_829_881_462_546_425,
];

/// The fixed hash-to-curve domain separation tag for BLS signatures on G2.
pub const DST: &[u8; 43] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Number of scalars absorbed per Poseidon sponge round.
pub const POSEIDON_RATE: usize = 16;

const _: () = assert!(N <= 126, "N must stay within the multiplication-safe bound");
const _: () = assert!(K * (N as usize) > 381, "K*N must exceed the BLS12-381 prime bit length");
const _: () = assert!(
    SYNC_COMMITTEE_SIZE.is_power_of_two(),
    "SYNC_COMMITTEE_SIZE must be a power of two for the G1AddMany reduction tree"
);
const _: () = assert!(
    1_usize << LOG2_SYNC_COMMITTEE_SIZE == SYNC_COMMITTEE_SIZE,
    "LOG2_SYNC_COMMITTEE_SIZE must match SYNC_COMMITTEE_SIZE"
);
const _: () = assert!(DST.len() == 43, "DST length is fixed by the hash-to-curve ciphersuite");
const _: () = assert!(
    (SYNC_COMMITTEE_SIZE * 2 * K) % POSEIDON_RATE == 0,
    "PoseidonG1Array input length must be a multiple of the sponge rate"
);
