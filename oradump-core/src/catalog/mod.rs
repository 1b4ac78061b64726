//! Catalog access for one connected schema.
//!
//! [`CatalogReader`] is the seam between the dump orchestration and the
//! database driver. Every method runs one read-only query (or the
//! `dbms_metadata.get_ddl` call), drains it completely, and returns typed
//! rows. Object names matching the recycle-bin pattern `BIN$%` are filtered
//! out by every implementation.
//!
//! # Module Structure
//! - `oracle`: Oracle implementation over the `oracle` crate (feature `oracle`)
//! - `memory`: In-memory catalog used by tests and offline fixtures

use crate::Result;
use crate::models::{
    ColumnComment, ColumnDescriptor, ConstraintDescriptor, DbObject, ObjectType, ObjectTypeCount,
    ReferencedKey, SourceLine, TableGrant, TableInfo, TablespaceCount,
};

pub mod memory;
#[cfg(feature = "oracle")]
pub mod oracle;

pub use memory::MemoryCatalog;

/// Read access to the catalog of the connected schema.
///
/// Implementations are used from a single thread, one query at a time.
pub trait CatalogReader {
    /// Name of the current schema (`sys_context('USERENV', 'CURRENT_SCHEMA')`).
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn current_schema(&self) -> Result<String>;

    /// Object counts per type label, ordered by type.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn object_counts(&self) -> Result<Vec<ObjectTypeCount>>;

    /// Non-temporary table counts per tablespace.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn table_tablespaces(&self) -> Result<Vec<TablespaceCount>>;

    /// Index counts per tablespace.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn index_tablespaces(&self) -> Result<Vec<TablespaceCount>>;

    /// All tables, ordered by name.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn tables(&self) -> Result<Vec<TableInfo>>;

    /// All objects except tables, ordered by type label then name.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn non_table_objects(&self) -> Result<Vec<DbObject>>;

    /// Stored source lines of a PL/SQL object, ordered by line number.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn source_lines(&self, object_type: ObjectType, name: &str) -> Result<Vec<SourceLine>>;

    /// DDL generated by `dbms_metadata.get_ddl(object_type, name)`.
    ///
    /// # Errors
    /// Returns error if the call fails or yields no row.
    fn generated_ddl(&self, object_type: ObjectType, name: &str) -> Result<String>;

    /// Number of columns of a table.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn column_count(&self, table: &str) -> Result<u32>;

    /// Columns of a table, ordered by column id.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// The table comment, if one is set.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn table_comment(&self, table: &str) -> Result<Option<String>>;

    /// Column comments, ordered by column id.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn column_comments(&self, table: &str) -> Result<Vec<ColumnComment>>;

    /// Primary key, unique and foreign key constraints of a table.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn constraints(&self, table: &str) -> Result<Vec<ConstraintDescriptor>>;

    /// Columns of a constraint, ordered by position.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn constraint_columns(&self, constraint: &str) -> Result<Vec<String>>;

    /// Table and columns of the key a foreign key references.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn referenced_key(&self, owner: &str, constraint: &str) -> Result<Option<ReferencedKey>>;

    /// Privileges granted on a table, ordered by grantee.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn table_grants(&self, table: &str) -> Result<Vec<TableGrant>>;

    /// Stored query text of a view, one entry per fetched row.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn view_text(&self, view: &str) -> Result<Vec<String>>;
}
