//! Data models for Oracle catalog objects.
//!
//! Every catalog query returns one of the typed row structs defined here;
//! formatters only ever see these types, never raw driver rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Object types known to the dumper.
///
/// The mapping to file extension and output folder is total: every variant
/// resolves, including the two kinds that are never dumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    #[serde(rename = "TYPE")]
    Type,
    #[serde(rename = "TYPE BODY")]
    TypeBody,
    #[serde(rename = "FUNCTION")]
    Function,
    #[serde(rename = "PROCEDURE")]
    Procedure,
    #[serde(rename = "PACKAGE")]
    Package,
    #[serde(rename = "PACKAGE BODY")]
    PackageBody,
    #[serde(rename = "TRIGGER")]
    Trigger,
    #[serde(rename = "SEQUENCE")]
    Sequence,
    #[serde(rename = "INDEX")]
    Index,
    #[serde(rename = "SYNONYM")]
    Synonym,
    #[serde(rename = "LOB")]
    Lob,
    #[serde(rename = "JAVA CLASS")]
    JavaClass,
    #[serde(rename = "VIEW")]
    View,
    #[serde(rename = "TABLE")]
    Table,
}

/// How an object's DDL is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpMethod {
    /// Stored PL/SQL source from `user_source`
    Source,
    /// DDL generated by `dbms_metadata.get_ddl`
    GeneratedDdl,
    /// `create table` assembled from column/constraint catalogs
    Table,
    /// `create or replace view` from `user_views`
    View,
    /// Mapped but never dumped (LOB, JAVA CLASS)
    NotDumped,
}

impl ObjectType {
    /// Every object type, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Type,
        Self::TypeBody,
        Self::Function,
        Self::Procedure,
        Self::Package,
        Self::PackageBody,
        Self::Trigger,
        Self::Sequence,
        Self::Index,
        Self::Synonym,
        Self::Lob,
        Self::JavaClass,
        Self::View,
        Self::Table,
    ];

    /// Catalog label as stored in `user_objects.object_type`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "TYPE",
            Self::TypeBody => "TYPE BODY",
            Self::Function => "FUNCTION",
            Self::Procedure => "PROCEDURE",
            Self::Package => "PACKAGE",
            Self::PackageBody => "PACKAGE BODY",
            Self::Trigger => "TRIGGER",
            Self::Sequence => "SEQUENCE",
            Self::Index => "INDEX",
            Self::Synonym => "SYNONYM",
            Self::Lob => "LOB",
            Self::JavaClass => "JAVA CLASS",
            Self::View => "VIEW",
            Self::Table => "TABLE",
        }
    }

    /// File extension of the dumped script.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Type => "tps",
            Self::TypeBody => "tpb",
            Self::Function => "fnc",
            Self::Procedure => "prc",
            Self::Package => "spc",
            Self::PackageBody => "bdy",
            Self::Trigger => "trg",
            Self::Sequence => "seq",
            Self::Index => "idx",
            Self::Synonym | Self::View | Self::Table => "sql",
            Self::Lob => "lob",
            Self::JavaClass => "class",
        }
    }

    /// Output subfolder below the schema's dump root.
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Type | Self::TypeBody => "types",
            Self::Function => "functions",
            Self::Procedure => "procedures",
            Self::Package | Self::PackageBody => "packages",
            Self::Trigger => "triggers",
            Self::Sequence => "sequences",
            Self::Index => "indexes",
            Self::Synonym => "synonyms",
            Self::Lob => "lobs",
            Self::JavaClass => "classes",
            Self::View => "views",
            Self::Table => "tables",
        }
    }

    /// How objects of this type are turned into a script.
    pub const fn dump_method(self) -> DumpMethod {
        match self {
            Self::Type
            | Self::TypeBody
            | Self::Function
            | Self::Procedure
            | Self::Package
            | Self::PackageBody
            | Self::Trigger => DumpMethod::Source,
            Self::Sequence | Self::Index | Self::Synonym => DumpMethod::GeneratedDdl,
            Self::Table => DumpMethod::Table,
            Self::View => DumpMethod::View,
            Self::Lob | Self::JavaClass => DumpMethod::NotDumped,
        }
    }

    /// Script path relative to the schema root, as used by `__master.sql`.
    pub fn relative_path(self, object_name: &str) -> String {
        format!("{}/{}.{}", self.folder(), object_name, self.extension())
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ObjectType {
    type Err = crate::error::DumpError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .ok_or_else(|| crate::error::DumpError::unsupported_object(label, ""))
    }
}

/// A row of `user_objects`.
///
/// `object_type` is the raw catalog label; labels outside [`ObjectType`]
/// (database links, partitions, jobs) are valid rows that the dumper skips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbObject {
    /// Catalog label, e.g. `PACKAGE BODY`
    pub object_type: String,
    /// Object name as stored in the catalog
    pub name: String,
}

impl DbObject {
    /// A `user_objects` row.
    pub fn new(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
        }
    }

    /// Resolved object type.
    ///
    /// # Errors
    /// Returns [`DumpError::UnsupportedObject`] for labels the dumper does
    /// not know.
    ///
    /// [`DumpError::UnsupportedObject`]: crate::error::DumpError::UnsupportedObject
    pub fn kind(&self) -> crate::Result<ObjectType> {
        self.object_type
            .parse()
            .map_err(|_| crate::error::DumpError::unsupported_object(&self.object_type, &self.name))
    }
}

/// Recycle-bin object names look like `BIN$<base64>==$0`.
pub fn is_recycle_bin_name(name: &str) -> bool {
    name.starts_with("BIN$")
}

/// Lifetime of rows in a global temporary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporaryDuration {
    /// `SYS$TRANSACTION`: on commit delete rows
    Transaction,
    /// `SYS$SESSION`: on commit preserve rows
    Session,
}

impl TemporaryDuration {
    /// Parses `user_tables.duration`.
    pub fn from_catalog(duration: &str) -> Option<Self> {
        match duration {
            "SYS$TRANSACTION" => Some(Self::Transaction),
            "SYS$SESSION" => Some(Self::Session),
            _ => None,
        }
    }
}

/// A row of `user_tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name
    pub name: String,
    /// `None` for temporary and partitioned tables
    pub tablespace: Option<String>,
    /// Global temporary table
    pub temporary: bool,
    /// Row lifetime of a temporary table
    pub duration: Option<TemporaryDuration>,
    /// Index-organized table (`iot_type = 'IOT'`)
    pub index_organized: bool,
}

impl TableInfo {
    /// A plain heap table in the given tablespace.
    pub fn heap(name: impl Into<String>, tablespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            tablespace: tablespace.map(str::to_string),
            temporary: false,
            duration: None,
            index_organized: false,
        }
    }
}

/// A row of `user_tab_columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Catalog type name, e.g. `VARCHAR2`
    pub data_type: String,
    /// Characters for character semantics, bytes otherwise
    pub data_length: u32,
    /// `NUMBER` precision
    pub data_precision: Option<u32>,
    /// `NUMBER` scale
    pub data_scale: Option<i32>,
    /// Length semantics are characters (`char_used = 'C'`) rather than bytes
    pub char_semantics: bool,
    /// Default expression as stored, untrimmed
    pub data_default: Option<String>,
    /// `false` for `not null` columns
    pub nullable: bool,
    /// 1-based ordinal position
    pub column_id: u32,
}

impl ColumnDescriptor {
    /// A nullable column with no length, precision or default.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, column_id: u32) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            data_length: 0,
            data_precision: None,
            data_scale: None,
            char_semantics: false,
            data_default: None,
            nullable: true,
            column_id,
        }
    }
}

/// Constraint kinds the table formatter reproduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// `P`
    PrimaryKey,
    /// `U`
    Unique,
    /// `R`
    ForeignKey,
}

impl ConstraintKind {
    /// Parses `user_constraints.constraint_type`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(Self::PrimaryKey),
            "U" => Some(Self::Unique),
            "R" => Some(Self::ForeignKey),
            _ => None,
        }
    }

    /// DDL keyword of the constraint kind.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary key",
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
        }
    }
}

/// A row of `user_constraints` joined to `user_indexes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDescriptor {
    /// Owner of the constraint
    pub owner: String,
    /// Constraint name
    pub name: String,
    /// Primary, unique or foreign key
    pub kind: ConstraintKind,
    /// `status = 'ENABLED'`
    pub enabled: bool,
    /// The name was given by the user (`generated = 'USER NAME'`)
    pub user_named: bool,
    /// Owner of the referenced key (foreign keys only)
    pub referenced_owner: Option<String>,
    /// Name of the referenced key (foreign keys only)
    pub referenced_constraint: Option<String>,
    /// `delete_rule = 'CASCADE'`
    pub cascade_delete: bool,
    /// Tablespace of the backing index (primary and unique keys)
    pub index_tablespace: Option<String>,
}

/// Table and columns of the key a foreign key points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedKey {
    /// Table that owns the key
    pub table: String,
    /// Key columns in position order
    pub columns: Vec<String>,
}

/// A row of `user_tab_privs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrant {
    /// User or role receiving the privilege
    pub grantee: String,
    /// Privilege name, e.g. `SELECT`
    pub privilege: String,
}

impl TableGrant {
    /// One granted privilege.
    pub fn new(grantee: impl Into<String>, privilege: impl Into<String>) -> Self {
        Self {
            grantee: grantee.into(),
            privilege: privilege.into(),
        }
    }
}

/// A row of `user_col_comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnComment {
    /// Commented column
    pub column: String,
    /// Comment text, unescaped
    pub comment: String,
}

/// A row of `user_source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// 1-based line number
    pub line: u32,
    /// Line text including its line break
    pub text: String,
}

impl SourceLine {
    /// One line of stored source.
    pub fn new(line: u32, text: impl Into<String>) -> Self {
        Self {
            line,
            text: text.into(),
        }
    }
}

/// Number of objects per catalog type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeCount {
    /// Catalog label
    pub object_type: String,
    /// Objects of that type
    pub count: u64,
}

/// Number of segments (tables or indexes) per tablespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablespaceCount {
    /// `None` for segments without a tablespace
    pub tablespace: Option<String>,
    /// Segments in the tablespace
    pub count: u64,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
