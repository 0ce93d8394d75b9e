//! Shared plumbing for the runnable demos under `examples/`.

pub mod common;
