//! Cross-crate integration tests.

pub mod flows;
pub mod node_stack;
