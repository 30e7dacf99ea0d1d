//! File-level proof pipeline and synthetic data behind the `remrecon` binary.

pub mod proof;
pub mod synth;
