//! Batch tasks built on top of the archive clients.
pub mod reconfirming_stellar_parameters;
