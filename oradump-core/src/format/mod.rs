//! DDL formatters.
//!
//! Each submodule turns typed catalog rows for one object category into the
//! text of its script file. Formatters are pure: they never query the
//! catalog or touch the file system.
//!
//! # Module Structure
//! - `source`: stored PL/SQL (types, functions, procedures, packages, triggers)
//! - `metadata`: `dbms_metadata.get_ddl` output (sequences, indexes, synonyms)
//! - `table`: `create table` plus comments, constraints and grants
//! - `view`: `create or replace view`

use crate::Result;
use crate::error::DumpError;
use regex::Regex;
use std::sync::OnceLock;

pub mod metadata;
pub mod source;
pub mod table;
pub mod view;

pub use metadata::{format_generated_ddl, is_unusable};
pub use source::{format_source, strip_owner_qualifier, unquote_name};
pub use table::{
    column_clause, column_type, constraint_statement, create_table, grant_statements,
    table_comments,
};
pub use view::format_view;

/// Line terminator of every generated script.
pub const CRLF: &str = "\r\n";

/// Statement terminator for PL/SQL blocks and generated DDL.
pub const SLASH: &str = "/";

/// Pre-compiled patterns shared by the formatters.
struct Patterns {
    /// Two or more consecutive blanks
    blank_runs: Regex,
    /// `TABLESPACE "NAME"` with a plain identifier
    quoted_tablespace: Regex,
}

impl Patterns {
    fn instance() -> Result<&'static Self> {
        static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
        PATTERNS
            .get_or_init(|| Self::compile().ok())
            .as_ref()
            .ok_or_else(|| DumpError::unexpected_result("formatter patterns failed to compile"))
    }

    fn compile() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            blank_runs: Regex::new(r" {2,}")?,
            quoted_tablespace: Regex::new(r#"TABLESPACE "([A-Za-z0-9_]+)""#)?,
        })
    }
}

/// Replaces `from` with `to` until no occurrence is left.
///
/// A single pass can create a new occurrence from the text around a removed
/// one; repeating until a fixpoint makes the result stable under reapplication.
fn replace_to_fixpoint(text: &str, from: &str, to: &str) -> String {
    let mut current = text.to_string();
    if from.is_empty() || to.contains(from) {
        return current;
    }
    while current.contains(from) {
        current = current.replace(from, to);
    }
    current
}
