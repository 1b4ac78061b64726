//! Configuration types.
//!
//! - `SchemaDescriptor`: one entry of the schemas JSON file
//! - `DumpOptions`: run-wide output settings
//!
//! # Security
//! Passwords read from the configuration are moved straight into
//! [`crate::security::Credentials`] and never appear in `Debug` output.

mod options;
mod schema;

pub use options::DumpOptions;
pub use schema::{SchemaDescriptor, load_schemas, parse_schemas};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "schemas.json";
