//! Dump run options.

use crate::Result;
use crate::error::DumpError;
use std::path::PathBuf;

/// Options shared by every schema dumped in one run.
///
/// # Example
/// ```rust
/// use oradump_core::config::DumpOptions;
///
/// let options = DumpOptions::new()
///     .with_output_root("/tmp/dumps".into())
///     .with_tablespaces(false);
///
/// assert!(!options.use_tablespaces);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Folder under which each schema's `folder_name` is created
    pub output_root: PathBuf,
    /// Emit `tablespace` clauses for tables and constraint indexes
    pub use_tablespaces: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            use_tablespaces: true,
        }
    }
}

impl DumpOptions {
    /// Output into the working directory, with tablespace clauses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder in which each schema's folder is created.
    pub fn with_output_root(mut self, output_root: PathBuf) -> Self {
        self.output_root = output_root;
        self
    }

    /// Emit or omit `tablespace` clauses for tables and key indexes.
    pub const fn with_tablespaces(mut self, use_tablespaces: bool) -> Self {
        self.use_tablespaces = use_tablespaces;
        self
    }

    /// # Errors
    /// Returns error if the output root is empty or exists as a file.
    pub fn validate(&self) -> Result<()> {
        if self.output_root.as_os_str().is_empty() {
            return Err(DumpError::configuration("output folder cannot be empty"));
        }
        if self.output_root.is_file() {
            return Err(DumpError::configuration(format!(
                "output folder {} is a file",
                self.output_root.display()
            )));
        }
        Ok(())
    }
}
