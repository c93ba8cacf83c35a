//! Sealbox - anonymous public-key encryption using NaCl sealed boxes

#![forbid(unsafe_code)]

pub mod b64;
pub mod error;
pub mod file_ops;
pub mod sealedbox;
