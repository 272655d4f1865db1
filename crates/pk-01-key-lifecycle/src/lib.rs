//! # Pix Key Lifecycle (pk-01)
//!
//! Owns the lifecycle of Pix keys: aliases (tax id, phone, email or a
//! random token) that point at a client's bank account.
//!
//! ## Workflows
//!
//! | Operation | Collaborators | Failure kinds |
//! |-----------|---------------|---------------|
//! | Create | store, directory, registry | InvalidArgument, AlreadyExists, NotFound, Aborted |
//! | Delete | store, registry | InvalidArgument, NotFound, PermissionDenied, Aborted |
//! | Search | store, directory or registry | InvalidArgument, NotFound |
//! | Internal search | store, registry | NotFound, PermissionDenied, Aborted |
//! | List for owner | directory, store | InvalidArgument, NotFound |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, value objects, format rules, value generation
//! - `ports/` - Inbound API and outbound SPI traits
//! - `service/` - [`KeyOrchestrator`], the API implementation
//! - `adapters/` - In-memory port implementations
//! - `resilience` - Timeouts and retries for external calls
//!
//! ## Usage
//!
//! ```ignore
//! use pk_01_key_lifecycle::{KeyManagementApi, KeyOrchestrator, LifecycleConfig};
//!
//! let service = KeyOrchestrator::new(config, store, registry, directory, clock);
//! let created = service.create_key(request).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod resilience;
pub mod service;

pub use config::{CallPolicy, LifecycleConfig, LifecycleConfigError};
pub use domain::*;
pub use ports::*;
pub use service::KeyOrchestrator;
