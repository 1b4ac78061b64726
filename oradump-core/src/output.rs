//! Output tree of one schema dump.
//!
//! ```text
//! <output_root>/<folder_name>/
//!   types/ functions/ procedures/ packages/ triggers/ sequences/
//!   indexes/ synonyms/ lobs/ classes/ views/ tables/
//!   db_<folder_name>.log
//!   __master.sql
//! ```
//!
//! Every file is written sequentially with CRLF line endings and closed
//! before the next one is opened.

use crate::Result;
use crate::error::DumpError;
use crate::format::CRLF;
use crate::models::ObjectType;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// File name of the master replay script.
pub const MASTER_SCRIPT: &str = "__master.sql";

/// Separator line used between log sections.
pub const LOG_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Paths of one schema's dump folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLayout {
    root: PathBuf,
    folder_name: String,
}

impl DumpLayout {
    /// Layout of `<output_root>/<folder_name>`; nothing is created yet.
    pub fn new(output_root: &Path, folder_name: &str) -> Self {
        Self {
            root: output_root.join(folder_name),
            folder_name: folder_name.to_string(),
        }
    }

    /// The schema folder, `<output_root>/<folder_name>`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the schema folder and one subfolder per object type.
    ///
    /// Existing folders are reused.
    ///
    /// # Errors
    /// Returns error if a folder cannot be created.
    pub fn create(&self) -> Result<()> {
        let folders: BTreeSet<&str> = ObjectType::ALL.iter().map(|t| t.folder()).collect();
        for folder in folders {
            let path = self.root.join(folder);
            std::fs::create_dir_all(&path)
                .map_err(|e| DumpError::io(format!("Failed to create {}", path.display()), e))?;
        }
        Ok(())
    }

    /// Script file of an object.
    ///
    /// Quoted identifiers may contain path separators; such names would
    /// leave the type folder and are refused.
    ///
    /// # Errors
    /// Returns [`DumpError::UnsupportedObject`] if `<name>.<ext>` is not a
    /// single plain file name.
    pub fn object_path(&self, object_type: ObjectType, name: &str) -> Result<PathBuf> {
        let file_name = format!("{name}.{}", object_type.extension());
        let mut components = Path::new(&file_name).components();
        let plain = !name.is_empty()
            && !name.contains(['/', '\\'])
            && matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !plain {
            return Err(DumpError::unsupported_object(object_type.label(), name));
        }
        Ok(self.root.join(object_type.folder()).join(file_name))
    }

    /// The schema log, `db_<folder_name>.log`.
    pub fn log_path(&self) -> PathBuf {
        self.root.join(format!("db_{}.log", self.folder_name))
    }

    /// The replay script, `__master.sql`.
    pub fn master_path(&self) -> PathBuf {
        self.root.join(MASTER_SCRIPT)
    }
}

fn write_error(path: &Path, e: std::io::Error) -> DumpError {
    DumpError::io(format!("Failed to write {}", path.display()), e)
}

/// Script file of one database object.
///
/// Created (truncating any previous file), appended to, then finalized.
/// Dropping an unfinalized file flushes what was written so far, which is
/// what a failed object leaves on disk.
pub struct ObjectFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ObjectFile {
    /// # Errors
    /// Returns error if the file cannot be created.
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .map_err(|e| DumpError::io(format!("Failed to create {}", path.display()), e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Appends text as is.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn append(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .map_err(|e| write_error(&self.path, e))
    }

    /// Appends one line and its CRLF terminator.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        self.append(line)?;
        self.append(CRLF)
    }

    /// Flushes and closes the file, returning its path.
    ///
    /// # Errors
    /// Returns error if buffered content cannot be written.
    pub fn finalize(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .map_err(|e| write_error(&self.path, e))?;
        Ok(self.path)
    }
}

/// The per-schema log file.
pub struct SchemaLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl SchemaLog {
    /// # Errors
    /// Returns error if the file cannot be created.
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .map_err(|e| DumpError::io(format!("Failed to create {}", path.display()), e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Writes one CRLF-terminated line.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn line(&mut self, text: &str) -> Result<()> {
        write!(self.writer, "{text}{CRLF}").map_err(|e| write_error(&self.path, e))
    }

    /// Writes `------------- <label> ------------- <local time>`.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn banner(&mut self, label: &str) -> Result<()> {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        self.line(&format!("------------- {label} ------------- {now}"))
    }

    /// Writes the dashed section separator.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn rule(&mut self) -> Result<()> {
        self.line(LOG_RULE)
    }

    /// Flushes and closes the log.
    ///
    /// # Errors
    /// Returns error if buffered content cannot be written.
    pub fn close(mut self) -> Result<()> {
        self.writer.flush().map_err(|e| write_error(&self.path, e))
    }
}

/// Writes `__master.sql`: one `@<folder>/<name>.<ext>` line per object,
/// sorted by type label and then name.
///
/// Returns the number of lines written.
///
/// # Errors
/// Returns error if the script cannot be written.
pub fn write_master_script(path: &Path, objects: &[(ObjectType, String)]) -> Result<usize> {
    let mut entries: Vec<&(ObjectType, String)> = objects.iter().collect();
    entries.sort_by(|(a_type, a_name), (b_type, b_name)| {
        a_type
            .label()
            .cmp(b_type.label())
            .then_with(|| a_name.cmp(b_name))
    });

    let mut script = ObjectFile::create(path.to_path_buf())?;
    for (object_type, name) in &entries {
        script.append_line(&format!("@{}", object_type.relative_path(name)))?;
    }
    script.finalize()?;

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = DumpLayout::new(Path::new("/out"), "hr");
        assert_eq!(layout.root(), Path::new("/out/hr"));
        assert_eq!(
            layout.object_path(ObjectType::PackageBody, "PKG").unwrap(),
            PathBuf::from("/out/hr/packages/PKG.bdy")
        );
        assert_eq!(
            layout.object_path(ObjectType::Table, "BIN..X").unwrap(),
            PathBuf::from("/out/hr/tables/BIN..X.sql")
        );
        assert_eq!(layout.log_path(), PathBuf::from("/out/hr/db_hr.log"));
        assert_eq!(layout.master_path(), PathBuf::from("/out/hr/__master.sql"));
    }

    #[test]
    fn test_object_names_cannot_leave_type_folder() {
        let layout = DumpLayout::new(Path::new("/out"), "hr");
        for name in ["../../x", "a/b", "a\\b", "/etc/passwd", ""] {
            let error = layout.object_path(ObjectType::View, name).unwrap_err();
            assert!(
                matches!(error, DumpError::UnsupportedObject { .. }),
                "accepted {name:?}"
            );
        }
    }

    #[test]
    fn test_layout_creates_all_folders() {
        let dir = TempDir::new().unwrap();
        let layout = DumpLayout::new(dir.path(), "hr");
        layout.create().unwrap();
        layout.create().unwrap();

        for folder in [
            "types",
            "functions",
            "procedures",
            "packages",
            "triggers",
            "sequences",
            "indexes",
            "synonyms",
            "lobs",
            "classes",
            "views",
            "tables",
        ] {
            assert!(layout.root().join(folder).is_dir(), "missing {folder}");
        }
    }

    #[test]
    fn test_object_file_crlf() {
        let dir = TempDir::new().unwrap();
        let mut file = ObjectFile::create(dir.path().join("t.sql")).unwrap();
        file.append_line("create table T").unwrap();
        file.append("/").unwrap();
        let path = file.finalize().unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "create table T\r\n/");
    }

    #[test]
    fn test_object_file_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.sql");
        std::fs::write(&path, "old content that is longer").unwrap();

        let mut file = ObjectFile::create(path.clone()).unwrap();
        file.append("new").unwrap();
        file.finalize().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn test_schema_log() {
        let dir = TempDir::new().unwrap();
        let mut log = SchemaLog::create(dir.path().join("db_hr.log")).unwrap();
        log.banner("Starting").unwrap();
        log.line("creating file EMP.sql").unwrap();
        log.rule().unwrap();
        log.close().unwrap();

        let text = std::fs::read_to_string(dir.path().join("db_hr.log")).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert!(lines[0].starts_with("------------- Starting ------------- "));
        assert_eq!(lines[1], "creating file EMP.sql");
        assert_eq!(lines[2], LOG_RULE);
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_master_script_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MASTER_SCRIPT);
        let objects = vec![
            (ObjectType::View, "V_EMP".to_string()),
            (ObjectType::Table, "EMP".to_string()),
            (ObjectType::PackageBody, "PKG".to_string()),
            (ObjectType::Package, "PKG".to_string()),
            (ObjectType::Table, "DEPT".to_string()),
        ];

        assert_eq!(write_master_script(&path, &objects).unwrap(), 5);
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "@packages/PKG.spc\r\n@packages/PKG.bdy\r\n@tables/DEPT.sql\r\n@tables/EMP.sql\r\n@views/V_EMP.sql\r\n"
        );
    }
}
