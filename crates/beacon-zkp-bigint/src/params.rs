//! Compile-time numeric policy checks: parameter violations surface as build failures, never
//! as witness-time errors.
//!
//! `N` and `K` live in `beacon-zkp-core::constants`; this module only asserts the derived
//! bounds that the multiplication and addition gadgets rely on.

pub use beacon_zkp_core::constants::{K, N};

/// Bound on `N` used by any gadget that multiplies two limbs together: a product of two
/// `N`-bit values plus `log2(K)` accumulation bits must fit inside `bls12_381::Scalar`
/// (255-bit field) without wraparound.
pub const MAX_MULTIPLICATION_N: u32 = 126;

/// Bound on `N` used by gadgets that only add or subtract limbs.
pub const MAX_ADDITIVE_N: u32 = 252;

const _: () = assert!(N <= MAX_MULTIPLICATION_N, "N exceeds the multiplication-safe bound");
const _: () = assert!(N <= MAX_ADDITIVE_N, "N exceeds the additive-safe bound");
const _: () = assert!(K >= 2, "K must be at least 2 for a meaningful limb decomposition");
