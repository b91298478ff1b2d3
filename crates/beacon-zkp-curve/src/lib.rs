pub mod g1_encoding;
pub mod hash_to_curve;
pub mod pairing;
pub mod point_g1;
pub mod point_g2;
