//! Schema descriptors loaded from the JSON configuration file.

use crate::error::DumpError;
use crate::security::Credentials;
use crate::Result;
use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path};

/// One configured schema to dump.
///
/// Deserialized from an element of the configuration array:
///
/// ```json
/// {
///   "active": true,
///   "folder_name": "hr_prod",
///   "tns": "PRODDB",
///   "schema": "HR",
///   "pwd": "secret",
///   "comment": "HR production schema"
/// }
/// ```
///
/// `pwd` and `comment` are optional.
#[derive(Clone, Deserialize)]
#[serde(from = "RawSchemaDescriptor")]
pub struct SchemaDescriptor {
    /// Whether this entry is dumped at all
    pub active: bool,
    /// Output folder below the output root
    pub folder_name: String,
    /// Oracle data source (TNS alias or easy-connect string)
    pub data_source: String,
    /// Schema user and password
    pub credentials: Credentials,
    /// Free-text comment echoed into the log
    pub comment: String,
}

#[derive(Deserialize)]
struct RawSchemaDescriptor {
    active: bool,
    folder_name: String,
    tns: String,
    schema: String,
    #[serde(default)]
    pwd: Option<String>,
    #[serde(default)]
    comment: String,
}

impl From<RawSchemaDescriptor> for SchemaDescriptor {
    fn from(raw: RawSchemaDescriptor) -> Self {
        Self {
            active: raw.active,
            folder_name: raw.folder_name,
            data_source: raw.tns,
            credentials: Credentials::new(raw.schema, raw.pwd),
            comment: raw.comment,
        }
    }
}

impl fmt::Debug for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDescriptor")
            .field("active", &self.active)
            .field("folder_name", &self.folder_name)
            .field("data_source", &self.data_source)
            .field("credentials", &self.credentials)
            .field("comment", &self.comment)
            .finish()
    }
}

impl SchemaDescriptor {
    /// The schema user name.
    pub fn schema(&self) -> &str {
        self.credentials.username()
    }

    /// Checks the values that end up in file system paths or the connect call.
    ///
    /// # Errors
    /// Returns error if the folder name is not a single plain path component
    /// or if the data source or schema user are empty.
    pub fn validate(&self) -> Result<()> {
        let mut components = Path::new(&self.folder_name).components();
        let single_normal = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !single_normal {
            return Err(DumpError::configuration(format!(
                "folder_name '{}' must be a single folder name",
                self.folder_name
            )));
        }

        if self.data_source.trim().is_empty() {
            return Err(DumpError::configuration(format!(
                "tns cannot be empty (folder '{}')",
                self.folder_name
            )));
        }

        if self.schema().trim().is_empty() {
            return Err(DumpError::configuration(format!(
                "schema cannot be empty (folder '{}')",
                self.folder_name
            )));
        }

        Ok(())
    }
}

/// Parses a configuration document (a JSON array of schema descriptors).
///
/// # Errors
/// Returns a serialization error for malformed JSON or wrongly typed fields.
pub fn parse_schemas(json: &str) -> Result<Vec<SchemaDescriptor>> {
    serde_json::from_str(json).map_err(|e| DumpError::Serialization {
        context: "Failed to parse schema configuration".to_string(),
        source: e,
    })
}

/// Reads and parses the configuration file.
///
/// # Errors
/// Returns an I/O error if the file cannot be read, or a serialization
/// error if it is not a valid descriptor array.
pub fn load_schemas(path: &Path) -> Result<Vec<SchemaDescriptor>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| DumpError::io(format!("Failed to read {}", path.display()), e))?;

    let schemas = parse_schemas(&json)?;
    tracing::debug!(
        "Loaded {} schema descriptors from {}",
        schemas.len(),
        path.display()
    );
    Ok(schemas)
}
