//! Behavioral tests for the algorithms module.
//!
//! Each test defines one aspect of correct behavior; together they
//! characterize the projection and the loss.
//!
//! # Test Organization
//!
//! - `categorical_tests`: Bellman projection (mass, clipping, terminals)
//! - `distributional_tests`: tensor helpers and the C51 loss on `NdArray`
//! - `integration_tests`: preprocessing through replay to a gradient step

pub mod categorical_tests;
