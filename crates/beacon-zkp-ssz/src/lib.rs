//! SSZ hash-tree-root gadgets, a Poseidon commitment sponge, and `G1AddMany` BLS key
//! aggregation: the Merkleization/commitment layer sitting on top of `beacon-zkp-curve`.

pub mod aggregate;
pub mod merkle;
pub mod poseidon;
