//! # Pix Key Manager Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── flows.rs       # Lifecycle flows through the HTTP router (in-memory adapters)
//! │   └── node_stack.rs  # Full node against fake registry and ERP servers
//! └── benches/           # Validation, generation and store benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pk-tests
//! cargo bench -p pk-tests
//! ```

pub mod integration;
