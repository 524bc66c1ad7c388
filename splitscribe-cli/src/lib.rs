//! Library surface of the splitscribe binary.
//!
//! Re-exports the binary's modules for integration testing.

pub mod format;
pub mod paths;
pub mod transcriber;
