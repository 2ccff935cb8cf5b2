//! Common types, traits, and error definitions for rust_rrt
//!
//! This module provides the foundational building blocks shared by the
//! collision checker, the steering models and the planner.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
