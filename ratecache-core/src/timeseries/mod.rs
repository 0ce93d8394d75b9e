//! Time-bucket utilities shared by the engine and fetchers.
//!
//! Modules include:
//! - `align`: bucket and batch alignment of raw timestamps
//! - `sample`: ladder-based downsampling bounded by a point ceiling
/// Alignment helpers for cache buckets and fetch batches.
pub mod align;
/// Downsampling helpers for range-query responses.
pub mod sample;
