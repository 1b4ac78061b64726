//! Per-schema dump orchestration.
//!
//! For each active schema: create the folder layout and log, connect, write
//! catalog statistics, dump every table, dump every other object by type,
//! then write `__master.sql`. Each object is isolated: a failure is logged,
//! recorded as a [`ObjectStatus::Failed`] outcome and the next object
//! proceeds. Only the primary enumeration (connection, current schema,
//! table and object lists, master script) ends a schema early, and the
//! connection and log are released on that path too.

use crate::Result;
use crate::catalog::CatalogReader;
use crate::config::{DumpOptions, SchemaDescriptor};
use crate::format;
use crate::models::{
    ConstraintDescriptor, ConstraintKind, DbObject, DumpMethod, ObjectType, TableInfo,
    TablespaceCount,
};
use crate::output::{DumpLayout, ObjectFile, SchemaLog, write_master_script};
use std::path::PathBuf;

mod report;

pub use report::{ObjectOutcome, ObjectStatus, RunSummary, SchemaReport};

/// Name written at the top of every schema log.
const LOG_HEADER: &str = "oradump";

/// State of one schema dump, passed to every step.
///
/// Borrows the catalog and the log from [`dump_schema`], which owns them
/// and releases them when the schema is done, whatever the outcome.
pub struct SchemaDump<'a, C: CatalogReader> {
    catalog: &'a C,
    layout: &'a DumpLayout,
    log: &'a mut SchemaLog,
    options: &'a DumpOptions,
    owner: String,
    outcomes: Vec<ObjectOutcome>,
    dumped: Vec<(ObjectType, String)>,
    warnings: Vec<String>,
}

impl<'a, C: CatalogReader> SchemaDump<'a, C> {
    /// A dump context that has not read anything yet.
    pub fn new(
        catalog: &'a C,
        layout: &'a DumpLayout,
        log: &'a mut SchemaLog,
        options: &'a DumpOptions,
    ) -> Self {
        Self {
            catalog,
            layout,
            log,
            options,
            owner: String::new(),
            outcomes: Vec::new(),
            dumped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Runs the whole schema dump.
    ///
    /// Returns the number of entries written to `__master.sql`.
    ///
    /// # Errors
    /// Returns error if the current schema, the table list or the object
    /// list cannot be read, or if the master script cannot be written.
    /// Object-level failures are recorded as outcomes instead.
    pub fn run(&mut self) -> Result<usize> {
        if let Err(e) = self.write_stats() {
            self.note(&format!("statistics unavailable: {}", e.detailed()));
            tracing::warn!("Catalog statistics unavailable: {}", e.detailed());
        }

        self.owner = self.catalog.current_schema()?;
        self.note("");
        self.rule();

        let tables = self.catalog.tables()?;
        tracing::debug!("Dumping {} tables of {}", tables.len(), self.owner);
        for table in &tables {
            let result = self.dump_table(table);
            self.record(ObjectType::Table, &table.name, result);
        }

        let objects = self.catalog.non_table_objects()?;
        tracing::debug!("Dumping {} other objects of {}", objects.len(), self.owner);
        for object in &objects {
            self.dump_object(object);
        }

        let entries = write_master_script(&self.layout.master_path(), &self.dumped)?;
        tracing::info!(
            "Wrote {} with {} entries",
            self.layout.master_path().display(),
            entries
        );
        Ok(entries)
    }

    /// Outcomes recorded so far, in dump order.
    pub fn into_outcomes(self) -> Vec<ObjectOutcome> {
        self.outcomes
    }

    /// Writes one line to the schema log; a failing log only warns.
    fn note(&mut self, text: &str) {
        if let Err(e) = self.log.line(text) {
            tracing::warn!("{}", e.detailed());
        }
    }

    fn rule(&mut self) {
        if let Err(e) = self.log.rule() {
            tracing::warn!("{}", e.detailed());
        }
    }

    /// Records a notice against the object being dumped.
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.note(&format!("warning: {message}"));
        self.warnings.push(message);
    }

    fn record(&mut self, object_type: ObjectType, name: &str, result: Result<PathBuf>) {
        let warnings = std::mem::take(&mut self.warnings);
        match result {
            Ok(_) => {
                self.outcomes.push(ObjectOutcome::dumped(
                    object_type.label(),
                    name,
                    object_type.relative_path(name),
                    warnings,
                ));
                self.dumped.push((object_type, name.to_string()));
            }
            Err(e) => {
                let reason = e.detailed();
                tracing::error!("Failed to dump {} {}: {}", object_type, name, reason);
                self.note(&format!("error dumping {object_type} {name}: {reason}"));
                self.outcomes.push(ObjectOutcome::failed(
                    object_type.label(),
                    name,
                    reason,
                    warnings,
                ));
            }
        }
    }

    fn skip(&mut self, object: &DbObject, reason: &str) {
        tracing::debug!("Skipping {} {}: {}", object.object_type, object.name, reason);
        self.outcomes.push(ObjectOutcome::skipped(
            object.object_type.as_str(),
            object.name.as_str(),
            reason,
        ));
    }

    fn dump_object(&mut self, object: &DbObject) {
        let kind = match object.kind() {
            Ok(kind) => kind,
            Err(e) => {
                self.skip(object, &e.to_string());
                return;
            }
        };

        let result = match kind.dump_method() {
            DumpMethod::Source => self.dump_source(kind, &object.name),
            DumpMethod::GeneratedDdl => self.dump_generated(kind, &object.name),
            DumpMethod::View => self.dump_view(&object.name),
            DumpMethod::NotDumped => {
                self.skip(object, "object type is not dumped");
                return;
            }
            // Tables are enumerated from user_tables before the other objects
            DumpMethod::Table => {
                self.skip(object, "table listed outside user_tables");
                return;
            }
        };
        self.record(kind, &object.name, result);
    }

    fn write_script(&mut self, object_type: ObjectType, name: &str, script: &str) -> Result<PathBuf> {
        self.note(&format!("creating file {name}.{}", object_type.extension()));
        let mut file = ObjectFile::create(self.layout.object_path(object_type, name)?)?;
        file.append(script)?;
        file.finalize()
    }

    fn dump_source(&mut self, object_type: ObjectType, name: &str) -> Result<PathBuf> {
        let lines = self.catalog.source_lines(object_type, name)?;
        let script = format::format_source(&lines, &self.owner, name)?;
        self.write_script(object_type, name, &script)
    }

    fn dump_generated(&mut self, object_type: ObjectType, name: &str) -> Result<PathBuf> {
        let ddl = self.catalog.generated_ddl(object_type, name)?;
        if format::is_unusable(&ddl) {
            self.warn(format!("{object_type} {name} is marked UNUSABLE"));
        }
        let script = format::format_generated_ddl(&ddl, &self.owner, name)?;
        self.write_script(object_type, name, &script)
    }

    fn dump_view(&mut self, name: &str) -> Result<PathBuf> {
        let rows = self.catalog.view_text(name)?;
        let script = format::format_view(name, &rows)?;
        self.write_script(ObjectType::View, name, &script)
    }

    fn dump_table(&mut self, table: &TableInfo) -> Result<PathBuf> {
        let name = table.name.as_str();
        let column_count = self.catalog.column_count(name)?;
        let columns = self.catalog.columns(name)?;

        self.note(&format!(
            "creating file {name}.{}",
            ObjectType::Table.extension()
        ));
        let mut file = ObjectFile::create(self.layout.object_path(ObjectType::Table, name)?)?;
        file.append(&format::create_table(
            table,
            &columns,
            column_count,
            self.options.use_tablespaces,
        ))?;

        match self.comment_block(name) {
            Ok(text) => file.append(&text)?,
            Err(e) => self.warn(format!("comments of {name} skipped: {}", e.detailed())),
        }
        match self.constraint_block(name) {
            Ok(text) => file.append(&text)?,
            Err(e) => self.warn(format!("constraints of {name} skipped: {}", e.detailed())),
        }
        match self.grant_block(name) {
            Ok(text) => file.append(&text)?,
            Err(e) => self.warn(format!("grants on {name} skipped: {}", e.detailed())),
        }

        file.finalize()
    }

    fn comment_block(&self, table: &str) -> Result<String> {
        let comment = self.catalog.table_comment(table)?;
        let column_comments = self.catalog.column_comments(table)?;
        Ok(format::table_comments(
            table,
            comment.as_deref(),
            &column_comments,
        ))
    }

    /// Constraint statements of a table; a constraint that fails only warns.
    fn constraint_block(&mut self, table: &str) -> Result<String> {
        let constraints = self.catalog.constraints(table)?;
        let mut block = String::new();
        for constraint in &constraints {
            match self.constraint_text(table, constraint) {
                Ok(text) => block.push_str(&text),
                Err(e) => self.warn(format!(
                    "constraint {} of {table} skipped: {}",
                    constraint.name,
                    e.detailed()
                )),
            }
        }
        Ok(block)
    }

    fn constraint_text(&self, table: &str, constraint: &ConstraintDescriptor) -> Result<String> {
        let columns = self.catalog.constraint_columns(&constraint.name)?;
        let referenced = match (
            constraint.kind,
            constraint.referenced_owner.as_deref(),
            constraint.referenced_constraint.as_deref(),
        ) {
            (ConstraintKind::ForeignKey, Some(owner), Some(key)) => {
                self.catalog.referenced_key(owner, key)?
            }
            _ => None,
        };
        format::constraint_statement(
            table,
            constraint,
            &columns,
            referenced.as_ref(),
            self.options.use_tablespaces,
        )
    }

    fn grant_block(&self, table: &str) -> Result<String> {
        let grants = self.catalog.table_grants(table)?;
        Ok(format::grant_statements(table, &grants))
    }

    fn write_stats(&mut self) -> Result<()> {
        let counts = self.catalog.object_counts()?;
        let tables = self.catalog.table_tablespaces()?;
        let indexes = self.catalog.index_tablespaces()?;

        let mut total = 0_u64;
        for count in &counts {
            self.note(&format!("{}\t{}", count.object_type, count.count));
            total = total.saturating_add(count.count);
        }
        self.note(&format!("Total number of objects\t{total}"));
        self.note("");

        self.rule();
        self.note("Table distribution across tablespaces:");
        self.note("");
        self.note_tablespaces(&tables);

        self.rule();
        self.note("Index distribution across tablespaces:");
        self.note("");
        self.note_tablespaces(&indexes);
        Ok(())
    }

    fn note_tablespaces(&mut self, counts: &[TablespaceCount]) {
        for count in counts {
            let tablespace = count.tablespace.as_deref().unwrap_or("(none)");
            self.note(&format!("{tablespace}\t{}", count.count));
        }
    }
}

fn log_line(log: &mut SchemaLog, text: &str) {
    if let Err(e) = log.line(text) {
        tracing::warn!("{}", e.detailed());
    }
}

/// Dumps one schema and reports what happened.
///
/// `connect` opens the catalog for the schema; the catalog is dropped (and
/// its connection closed) before this function returns.
pub fn dump_schema<C, F>(
    schema: &SchemaDescriptor,
    options: &DumpOptions,
    connect: F,
) -> SchemaReport
where
    C: CatalogReader,
    F: FnOnce(&SchemaDescriptor) -> Result<C>,
{
    let mut report = SchemaReport::start(schema);
    tracing::info!("Dumping schema '{}' - {}", schema.schema(), schema.comment);

    if let Err(e) = schema.validate() {
        tracing::error!("{}", e);
        report.fatal_error = Some(e.detailed());
        report.finish();
        return report;
    }

    let layout = DumpLayout::new(&options.output_root, &schema.folder_name);
    let mut log = match layout
        .create()
        .and_then(|()| SchemaLog::create(layout.log_path()))
    {
        Ok(log) => log,
        Err(e) => {
            tracing::error!("{}", e.detailed());
            report.fatal_error = Some(e.detailed());
            report.finish();
            return report;
        }
    };

    log_line(&mut log, LOG_HEADER);
    if let Err(e) = log.banner("Starting") {
        tracing::warn!("{}", e.detailed());
    }
    log_line(&mut log, "");
    log_line(
        &mut log,
        &format!("Dumping schema '{}' - {}", schema.schema(), schema.comment),
    );

    let result = connect(schema).and_then(|catalog| {
        let mut dump = SchemaDump::new(&catalog, &layout, &mut log, options);
        let result = dump.run();
        report.objects = dump.into_outcomes();
        result
    });

    match result {
        Ok(entries) => report.master_entries = entries,
        Err(e) => {
            let reason = e.detailed();
            tracing::error!("Dump of schema '{}' aborted: {}", schema.schema(), reason);
            log_line(&mut log, &format!("error: {reason}"));
            report.fatal_error = Some(reason);
        }
    }

    if let Err(e) = log.banner("Finished") {
        tracing::warn!("{}", e.detailed());
    }
    if let Err(e) = log.close() {
        tracing::warn!("{}", e.detailed());
    }

    report.finish();
    tracing::info!(
        "Schema '{}': {} dumped, {} skipped, {} failed",
        report.schema,
        report.dumped,
        report.skipped,
        report.failed
    );
    report
}

/// Dumps every active schema in configuration order.
///
/// A schema that fails does not stop the run; inactive entries are listed
/// in [`RunSummary::inactive`].
pub fn dump_all<C, F>(schemas: &[SchemaDescriptor], options: &DumpOptions, mut connect: F) -> RunSummary
where
    C: CatalogReader,
    F: FnMut(&SchemaDescriptor) -> Result<C>,
{
    let mut summary = RunSummary::new();

    for schema in schemas {
        if !schema.active {
            tracing::debug!("Skipping inactive schema entry '{}'", schema.folder_name);
            summary.inactive.push(schema.folder_name.clone());
            continue;
        }
        summary
            .schemas
            .push(dump_schema(schema, options, &mut connect));
    }

    summary.finish();
    summary
}
