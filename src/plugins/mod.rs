//! Validators, one per input artifact.

pub mod agents;
pub mod hooks;
pub mod manifest;
