//! Long-running maintenance tasks spawned by the binary.

pub mod unverified_sweep;
