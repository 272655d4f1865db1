//! Ports module for the key lifecycle
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::KeyManagementApi;
pub use outbound::{AccountDirectory, Clock, KeyRegistry, KeyStore, SystemClock};
