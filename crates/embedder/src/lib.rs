//! Sentence embeddings behind a small request boundary.
//!
//! [`embedding`] holds the model capability and its providers, [`services`]
//! the request validation, the embed service and configuration loading.

pub mod embedding;
pub mod services;

/// Test utilities for unit and integration testing.
/// Only available with cfg(test) or feature "testing".
#[cfg(any(test, feature = "testing"))]
pub mod testing;
