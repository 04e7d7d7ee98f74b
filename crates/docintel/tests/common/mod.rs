//! Shared test utilities for docintel integration tests.
//!
//! This module provides:
//! - Scripted analyzers that stand in for the remote analysis service
//! - Builders for analysis results and orchestrators

pub mod builders;
pub mod fakes;

pub use builders::*;
pub use fakes::*;
