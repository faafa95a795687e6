//! Carbon footprint estimator library
//!
//! This module exposes the core functionality for use in tests
//! and by the command line front-ends.

pub mod core;
pub mod emissions;
pub mod estimator;
pub mod reference;
pub mod store;
