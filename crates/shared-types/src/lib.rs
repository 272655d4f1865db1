//! # Shared Types Crate
//!
//! Enumerations and identifiers shared across the Pix key manager crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: key types, account types and their registry
//!   codes are defined once here.
//! - **Closed Sets**: every enum parses from its wire spelling and rejects
//!   anything else with [`ParseError`].

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
