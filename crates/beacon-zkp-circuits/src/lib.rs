//! The Step and Rotate top-level `bellman::Circuit` implementations, together with the witness
//! allocation helpers and the public-input commitment that binds Step to a single scalar.

pub mod alloc;
pub mod native;
pub mod public_inputs;
pub mod rotate;
pub mod step;
