//! Per-object outcomes and the run summary.

use crate::Result;
use crate::config::SchemaDescriptor;
use crate::error::DumpError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happened to one catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    /// Script written and listed in `__master.sql`
    Dumped,
    /// Object type that is never dumped
    Skipped,
    /// Catalog, formatting or write error; a partial file may remain
    Failed,
}

/// Result of dumping one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectOutcome {
    /// Catalog type label, e.g. `PACKAGE BODY`
    pub object_type: String,
    /// Object name
    pub name: String,
    /// Outcome of the object
    pub status: ObjectStatus,
    /// Script path relative to the schema folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Why the object was skipped or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Isolated sub-step failures (table comments, constraints, grants)
    /// and notices such as unusable indexes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ObjectOutcome {
    /// Outcome of an object whose script was written.
    pub fn dumped(
        object_type: impl Into<String>,
        name: impl Into<String>,
        file: String,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
            status: ObjectStatus::Dumped,
            file: Some(file),
            reason: None,
            warnings,
        }
    }

    /// Outcome of an object that is never dumped.
    pub fn skipped(
        object_type: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
            status: ObjectStatus::Skipped,
            file: None,
            reason: Some(reason.into()),
            warnings: Vec::new(),
        }
    }

    /// Outcome of an object whose dump failed.
    pub fn failed(
        object_type: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            object_type: object_type.into(),
            name: name.into(),
            status: ObjectStatus::Failed,
            file: None,
            reason: Some(reason.into()),
            warnings,
        }
    }
}

/// Result of dumping one configured schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    /// Schema user
    pub schema: String,
    /// Output folder below the output root
    pub folder_name: String,
    /// Free-text comment from the configuration
    pub comment: String,
    /// When the schema dump started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When the schema dump ended
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Objects with a written script
    pub dumped: usize,
    /// Objects that are never dumped
    pub skipped: usize,
    /// Objects whose dump failed
    pub failed: usize,
    /// Number of lines written to `__master.sql`
    pub master_entries: usize,
    /// Error that ended the schema dump early
    pub fatal_error: Option<String>,
    /// Every object outcome, in dump order
    pub objects: Vec<ObjectOutcome>,
}

impl SchemaReport {
    /// An empty report, started now.
    pub fn start(schema: &SchemaDescriptor) -> Self {
        Self {
            schema: schema.schema().to_string(),
            folder_name: schema.folder_name.clone(),
            comment: schema.comment.clone(),
            started_at: chrono::Utc::now(),
            finished_at: None,
            dumped: 0,
            skipped: 0,
            failed: 0,
            master_entries: 0,
            fatal_error: None,
            objects: Vec::new(),
        }
    }

    /// Stamps the finish time and tallies the object outcomes.
    pub fn finish(&mut self) {
        let count = |status| self.objects.iter().filter(|o| o.status == status).count();
        self.dumped = count(ObjectStatus::Dumped);
        self.skipped = count(ObjectStatus::Skipped);
        self.failed = count(ObjectStatus::Failed);
        self.finished_at = Some(chrono::Utc::now());
    }

    /// No fatal error and no failed object.
    pub const fn is_complete(&self) -> bool {
        self.fatal_error.is_none() && self.failed == 0
    }
}

/// Reports of every schema processed in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// When the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// When the last schema finished
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Version of oradump that produced the summary
    pub tool_version: String,
    /// One report per active schema, in configuration order
    pub schemas: Vec<SchemaReport>,
    /// Folder names of configured entries with `active = false`
    pub inactive: Vec<String>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            started_at: chrono::Utc::now(),
            finished_at: None,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            schemas: Vec::new(),
            inactive: Vec::new(),
        }
    }
}

impl RunSummary {
    /// An empty summary, started now.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Utc::now());
    }

    /// Dumped objects across all schemas.
    pub fn objects_dumped(&self) -> usize {
        self.schemas
            .iter()
            .fold(0_usize, |total, s| total.saturating_add(s.dumped))
    }

    /// Failed objects across all schemas.
    pub fn objects_failed(&self) -> usize {
        self.schemas
            .iter()
            .fold(0_usize, |total, s| total.saturating_add(s.failed))
    }

    /// Schemas that ended with a fatal error.
    pub fn schemas_aborted(&self) -> usize {
        self.schemas
            .iter()
            .filter(|s| s.fatal_error.is_some())
            .count()
    }

    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DumpError::Serialization {
            context: "Failed to serialize run summary".to_string(),
            source: e,
        })
    }

    /// Writes the summary as pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)
            .map_err(|e| DumpError::io(format!("Failed to write {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_schemas;

    fn descriptor() -> SchemaDescriptor {
        parse_schemas(
            r#"[{"active": true, "folder_name": "hr", "tns": "DB", "schema": "HR", "pwd": "pw", "comment": "c"}]"#,
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn test_report_counts() {
        let mut report = SchemaReport::start(&descriptor());
        report.objects = vec![
            ObjectOutcome::dumped("TABLE", "EMP", "tables/EMP.sql".to_string(), Vec::new()),
            ObjectOutcome::dumped("VIEW", "V", "views/V.sql".to_string(), Vec::new()),
            ObjectOutcome::skipped("LOB", "SYS_LOB001", "not dumped"),
            ObjectOutcome::failed("PACKAGE", "PKG", "ORA-04063", Vec::new()),
        ];
        report.finish();

        assert_eq!(report.dumped, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.is_complete());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_summary_json() {
        let mut report = SchemaReport::start(&descriptor());
        report.objects = vec![ObjectOutcome::skipped("DATABASE LINK", "L", "unsupported")];
        report.finish();

        let mut summary = RunSummary::new();
        summary.schemas.push(report);
        summary.inactive.push("old".to_string());
        summary.finish();

        let json = summary.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schemas"][0]["schema"], "HR");
        assert_eq!(value["schemas"][0]["objects"][0]["status"], "skipped");
        assert!(value["schemas"][0]["objects"][0].get("file").is_none());
        assert_eq!(value["inactive"][0], "old");
    }

    #[test]
    fn test_summary_totals() {
        let mut summary = RunSummary::new();
        let mut a = SchemaReport::start(&descriptor());
        a.dumped = 3;
        a.failed = 1;
        let mut b = SchemaReport::start(&descriptor());
        b.fatal_error = Some("connect failed".to_string());
        summary.schemas = vec![a, b];

        assert_eq!(summary.objects_dumped(), 3);
        assert_eq!(summary.objects_failed(), 1);
        assert_eq!(summary.schemas_aborted(), 1);
    }
}
