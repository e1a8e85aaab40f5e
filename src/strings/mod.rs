//! String helpers for ADQL literals and archive responses.
pub mod conversion;
pub mod extraction;
