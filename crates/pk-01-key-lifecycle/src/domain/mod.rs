//! Domain layer for the key lifecycle
//!
//! Pure logic: entities, value objects, format rules, value generation and
//! errors. Nothing here performs I/O.

pub mod entities;
pub mod errors;
pub mod generator;
pub mod validation;
pub mod value_objects;

pub use entities::{KeyRecord, NewKeyRecord};
pub use errors::{DirectoryError, ErrorKind, KeyError, RegistryError, StoreError};
pub use value_objects::*;
