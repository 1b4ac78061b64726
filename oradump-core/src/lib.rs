//! Core library of oradump.
//!
//! Reads the catalog of an Oracle schema and writes it out as a tree of
//! replayable DDL scripts: one file per object in a folder per object type,
//! a per-schema log, and a `__master.sql` that runs every script.
//!
//! # Guarantees
//! - Catalog access is read-only apart from `dbms_metadata.get_ddl`
//! - Passwords are held in zeroizing containers and never logged
//! - One schema and one connection at a time; the connection is released
//!   when a schema's dump ends, successfully or not
//!
//! # Architecture
//! - [`catalog::CatalogReader`] abstracts the catalog queries; the Oracle
//!   implementation sits behind the `oracle` feature
//! - [`format`] holds pure text formatters per object category
//! - [`dump`] drives one schema with per-object failure isolation and
//!   produces a [`dump::RunSummary`]

pub mod catalog;
pub mod config;
pub mod dump;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod output;
pub mod security;

// Re-export commonly used types
pub use catalog::{CatalogReader, MemoryCatalog};
pub use config::{DumpOptions, SchemaDescriptor, load_schemas};
pub use dump::{ObjectOutcome, ObjectStatus, RunSummary, SchemaReport, dump_all, dump_schema};
pub use error::{DumpError, Result};
pub use logging::init_logging;
pub use models::{DbObject, ObjectType};
