pub mod fingerprint;
pub mod plan;
pub mod trim;
