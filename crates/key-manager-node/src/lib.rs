//! # Pix Key Manager Node
//!
//! Library half of the `key-manager-node` binary.
//!
//! - `container/` - configuration with `PK_*` environment overrides
//! - `adapters/` - registry and directory HTTP clients, RocksDB key store
//! - `wiring/` - assembles the orchestrator from configuration
//! - `logging` - tracing subscriber setup
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults + environment) and validate it
//! 2. Install the tracing subscriber
//! 3. Open the key store and build the outbound clients
//! 4. Serve the HTTP gateway until Ctrl-C

pub mod adapters;
pub mod container;
pub mod logging;
pub mod wiring;

pub use container::NodeConfig;
pub use wiring::{build_orchestrator, WiringError};
