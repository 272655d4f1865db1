//! PK-02 API Gateway - HTTP/JSON interface to the Pix key lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               API GATEWAY (pk-02)             │
//! ├──────────────────────────────────────────────┤
//! │  Middleware: Trace → Timeout → BodyLimit      │
//! │                      │                        │
//! │  Router: /api/v1/keys, /api/v1/owners/...     │
//! │                      │                        │
//! │  ApiError ← KeyError (kind → HTTP status)     │
//! └──────────────────────┼───────────────────────┘
//!                        ▼
//!              KeyManagementApi (pk-01)
//! ```
//!
//! # Error mapping
//!
//! | Kind | Status |
//! |------|--------|
//! | INVALID_ARGUMENT | 400 |
//! | ALREADY_EXISTS | 409 |
//! | NOT_FOUND | 404 |
//! | PERMISSION_DENIED | 403 |
//! | ABORTED | 409 |
//!
//! # Usage
//!
//! ```ignore
//! use pk_02_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let gateway = ApiGatewayService::new(GatewayConfig::default(), api)?;
//! gateway.serve(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod router;
pub mod service;

pub use domain::config::{ConfigError, GatewayConfig};
pub use domain::error::{status_for, ApiError, ApiResult, GatewayError};
pub use router::{build_router, AppState};
pub use service::ApiGatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
