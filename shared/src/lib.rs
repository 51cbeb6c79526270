//! Shared types and models for the Quantity Surveying Platform
//!
//! This crate contains the document entities, the financial rollup and
//! document-state engine, and validation helpers shared between the
//! backend and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
