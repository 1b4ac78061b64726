//! In-memory catalog.
//!
//! Holds the same rows the Oracle catalog views would return and answers
//! [`CatalogReader`] queries from them. Used by the test suites and for
//! dumping hand-built fixtures without a database. Individual queries can be
//! made to fail with [`MemoryCatalog::failing`].

use super::CatalogReader;
use crate::Result;
use crate::error::DumpError;
use crate::models::{
    ColumnComment, ColumnDescriptor, ConstraintDescriptor, DbObject, ObjectType, ObjectTypeCount,
    ReferencedKey, SourceLine, TableGrant, TableInfo, TablespaceCount, is_recycle_bin_name,
};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone)]
struct MemoryTable {
    info: TableInfo,
    columns: Vec<ColumnDescriptor>,
    comment: Option<String>,
    column_comments: Vec<ColumnComment>,
    constraints: Vec<(ConstraintDescriptor, Vec<String>)>,
    grants: Vec<TableGrant>,
}

impl MemoryTable {
    fn new(info: TableInfo) -> Self {
        Self {
            info,
            columns: Vec::new(),
            comment: None,
            column_comments: Vec::new(),
            constraints: Vec::new(),
            grants: Vec::new(),
        }
    }
}

/// Catalog backed by in-memory rows.
///
/// # Example
/// ```rust
/// use oradump_core::catalog::{CatalogReader, MemoryCatalog};
/// use oradump_core::models::{ColumnDescriptor, ObjectType, TableInfo};
///
/// let catalog = MemoryCatalog::new("HR")
///     .with_table(TableInfo::heap("EMP", Some("USERS")))
///     .with_columns("EMP", vec![ColumnDescriptor::new("ID", "NUMBER", 1)])
///     .with_source(ObjectType::Function, "F_ONE", &["function f_one return number", "is begin return 1; end;"]);
///
/// assert_eq!(catalog.current_schema().unwrap(), "HR");
/// assert_eq!(catalog.column_count("EMP").unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    schema: String,
    tables: BTreeMap<String, MemoryTable>,
    objects: Vec<DbObject>,
    sources: HashMap<(ObjectType, String), Vec<SourceLine>>,
    generated_ddl: HashMap<(ObjectType, String), String>,
    index_tablespaces: BTreeMap<Option<String>, u64>,
    views: HashMap<String, Vec<String>>,
    referenced_keys: HashMap<(String, String), ReferencedKey>,
    failures: HashSet<(String, String)>,
}

impl MemoryCatalog {
    /// An empty catalog for `schema`.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Self::default()
        }
    }

    fn table_mut(&mut self, table: &str) -> &mut MemoryTable {
        self.tables
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable::new(TableInfo::heap(table, None)))
    }

    /// Adds (or replaces the descriptor of) a table.
    pub fn with_table(mut self, info: TableInfo) -> Self {
        match self.tables.get_mut(&info.name) {
            Some(existing) => existing.info = info,
            None => {
                self.tables
                    .insert(info.name.clone(), MemoryTable::new(info));
            }
        }
        self
    }

    /// Sets the columns of a table.
    pub fn with_columns(mut self, table: &str, columns: Vec<ColumnDescriptor>) -> Self {
        self.table_mut(table).columns = columns;
        self
    }

    pub fn with_table_comment(mut self, table: &str, comment: impl Into<String>) -> Self {
        self.table_mut(table).comment = Some(comment.into());
        self
    }

    pub fn with_column_comment(
        mut self,
        table: &str,
        column: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        self.table_mut(table).column_comments.push(ColumnComment {
            column: column.into(),
            comment: comment.into(),
        });
        self
    }

    /// Adds a constraint with its columns in position order.
    pub fn with_constraint(
        mut self,
        table: &str,
        constraint: ConstraintDescriptor,
        columns: &[&str],
    ) -> Self {
        let columns = columns.iter().map(|c| (*c).to_string()).collect();
        self.table_mut(table).constraints.push((constraint, columns));
        self
    }

    /// Registers the key a foreign key constraint points at.
    pub fn with_referenced_key(
        mut self,
        owner: impl Into<String>,
        constraint: impl Into<String>,
        key: ReferencedKey,
    ) -> Self {
        self.referenced_keys
            .insert((owner.into(), constraint.into()), key);
        self
    }

    pub fn with_grant(mut self, table: &str, grant: TableGrant) -> Self {
        self.table_mut(table).grants.push(grant);
        self
    }

    /// Adds a PL/SQL object with its source lines, numbered from 1.
    pub fn with_source(mut self, object_type: ObjectType, name: &str, lines: &[&str]) -> Self {
        let lines = (1_u32..)
            .zip(lines)
            .map(|(line, text)| SourceLine::new(line, *text))
            .collect();
        self.sources
            .insert((object_type, name.to_string()), lines);
        self.objects.push(DbObject::new(object_type.label(), name));
        self
    }

    /// Adds an object whose DDL comes from `dbms_metadata.get_ddl`.
    pub fn with_generated_ddl(
        mut self,
        object_type: ObjectType,
        name: &str,
        ddl: impl Into<String>,
    ) -> Self {
        self.generated_ddl
            .insert((object_type, name.to_string()), ddl.into());
        self.objects.push(DbObject::new(object_type.label(), name));
        self
    }

    /// Adds an index in `tablespace` with its generated DDL.
    pub fn with_index(self, name: &str, tablespace: Option<&str>, ddl: impl Into<String>) -> Self {
        let mut catalog = self.with_generated_ddl(ObjectType::Index, name, ddl);
        let count = catalog
            .index_tablespaces
            .entry(tablespace.map(str::to_string))
            .or_default();
        *count = count.saturating_add(1);
        catalog
    }

    /// Adds a view whose text spans the given catalog rows.
    pub fn with_view(mut self, name: &str, rows: &[&str]) -> Self {
        self.views.insert(
            name.to_string(),
            rows.iter().map(|r| (*r).to_string()).collect(),
        );
        self.objects.push(DbObject::new(ObjectType::View.label(), name));
        self
    }

    /// Adds a bare `user_objects` row, e.g. a `DATABASE LINK` or `LOB`.
    pub fn with_object(mut self, object: DbObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Makes `operation` fail for `name`.
    ///
    /// `operation` is the [`CatalogReader`] method name; an empty `name`
    /// fails the operation for every argument.
    pub fn failing(mut self, operation: &str, name: &str) -> Self {
        self.failures
            .insert((operation.to_string(), name.to_string()));
        self
    }

    fn check(&self, operation: &str, name: &str) -> Result<()> {
        let fails = self
            .failures
            .iter()
            .any(|(op, target)| op == operation && (target.is_empty() || target == name));
        if fails {
            return Err(DumpError::query_failed(
                format!("{operation} {name}"),
                std::io::Error::other("ORA-00942: table or view does not exist"),
            ));
        }
        Ok(())
    }

    fn table(&self, table: &str) -> Option<&MemoryTable> {
        self.tables.get(table)
    }

    fn live_tables(&self) -> impl Iterator<Item = &MemoryTable> {
        self.tables
            .values()
            .filter(|t| !is_recycle_bin_name(&t.info.name))
    }
}

impl CatalogReader for MemoryCatalog {
    fn current_schema(&self) -> Result<String> {
        self.check("current_schema", "")?;
        Ok(self.schema.clone())
    }

    fn object_counts(&self) -> Result<Vec<ObjectTypeCount>> {
        self.check("object_counts", "")?;
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        let labels = self
            .live_tables()
            .map(|_| ObjectType::Table.label())
            .chain(
                self.objects
                    .iter()
                    .filter(|o| !is_recycle_bin_name(&o.name))
                    .map(|o| o.object_type.as_str()),
            );
        for label in labels {
            let count = counts.entry(label).or_default();
            *count = count.saturating_add(1);
        }
        Ok(counts
            .into_iter()
            .map(|(object_type, count)| ObjectTypeCount {
                object_type: object_type.to_string(),
                count,
            })
            .collect())
    }

    fn table_tablespaces(&self) -> Result<Vec<TablespaceCount>> {
        self.check("table_tablespaces", "")?;
        let mut counts: BTreeMap<Option<String>, u64> = BTreeMap::new();
        for table in self.live_tables().filter(|t| !t.info.temporary) {
            let count = counts.entry(table.info.tablespace.clone()).or_default();
            *count = count.saturating_add(1);
        }
        Ok(counts
            .into_iter()
            .map(|(tablespace, count)| TablespaceCount { tablespace, count })
            .collect())
    }

    fn index_tablespaces(&self) -> Result<Vec<TablespaceCount>> {
        self.check("index_tablespaces", "")?;
        Ok(self
            .index_tablespaces
            .iter()
            .map(|(tablespace, count)| TablespaceCount {
                tablespace: tablespace.clone(),
                count: *count,
            })
            .collect())
    }

    fn tables(&self) -> Result<Vec<TableInfo>> {
        self.check("tables", "")?;
        Ok(self.live_tables().map(|t| t.info.clone()).collect())
    }

    fn non_table_objects(&self) -> Result<Vec<DbObject>> {
        self.check("non_table_objects", "")?;
        let mut objects: Vec<DbObject> = self
            .objects
            .iter()
            .filter(|o| o.object_type != ObjectType::Table.label())
            .filter(|o| !is_recycle_bin_name(&o.name))
            .cloned()
            .collect();
        objects.sort_by(|a, b| {
            a.object_type
                .cmp(&b.object_type)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(objects)
    }

    fn source_lines(&self, object_type: ObjectType, name: &str) -> Result<Vec<SourceLine>> {
        self.check("source_lines", name)?;
        Ok(self
            .sources
            .get(&(object_type, name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn generated_ddl(&self, object_type: ObjectType, name: &str) -> Result<String> {
        self.check("generated_ddl", name)?;
        self.generated_ddl
            .get(&(object_type, name.to_string()))
            .cloned()
            .ok_or_else(|| {
                DumpError::unexpected_result(format!("no DDL generated for {object_type} {name}"))
            })
    }

    fn column_count(&self, table: &str) -> Result<u32> {
        self.check("column_count", table)?;
        let count = self.table(table).map_or(0, |t| t.columns.len());
        u32::try_from(count).map_err(|_| {
            DumpError::unexpected_result(format!("{table} has {count} columns"))
        })
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.check("columns", table)?;
        let mut columns = self
            .table(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default();
        columns.sort_by_key(|c| c.column_id);
        Ok(columns)
    }

    fn table_comment(&self, table: &str) -> Result<Option<String>> {
        self.check("table_comment", table)?;
        Ok(self.table(table).and_then(|t| t.comment.clone()))
    }

    fn column_comments(&self, table: &str) -> Result<Vec<ColumnComment>> {
        self.check("column_comments", table)?;
        let Some(table) = self.table(table) else {
            return Ok(Vec::new());
        };
        let position = |column: &str| {
            table
                .columns
                .iter()
                .find(|c| c.name == column)
                .map_or(u32::MAX, |c| c.column_id)
        };
        let mut comments = table.column_comments.clone();
        comments.sort_by_key(|c| position(&c.column));
        Ok(comments)
    }

    fn constraints(&self, table: &str) -> Result<Vec<ConstraintDescriptor>> {
        self.check("constraints", table)?;
        Ok(self
            .table(table)
            .map(|t| {
                t.constraints
                    .iter()
                    .map(|(constraint, _)| constraint)
                    .filter(|c| !is_recycle_bin_name(&c.name))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn constraint_columns(&self, constraint: &str) -> Result<Vec<String>> {
        self.check("constraint_columns", constraint)?;
        Ok(self
            .tables
            .values()
            .flat_map(|t| t.constraints.iter())
            .find(|(c, _)| c.name == constraint)
            .map(|(_, columns)| columns.clone())
            .unwrap_or_default())
    }

    fn referenced_key(&self, owner: &str, constraint: &str) -> Result<Option<ReferencedKey>> {
        self.check("referenced_key", constraint)?;
        Ok(self
            .referenced_keys
            .get(&(owner.to_string(), constraint.to_string()))
            .cloned())
    }

    fn table_grants(&self, table: &str) -> Result<Vec<TableGrant>> {
        self.check("table_grants", table)?;
        let mut grants = self
            .table(table)
            .map(|t| t.grants.clone())
            .unwrap_or_default();
        // Stable: privileges keep insertion order within a grantee.
        grants.sort_by(|a, b| a.grantee.cmp(&b.grantee));
        Ok(grants)
    }

    fn view_text(&self, view: &str) -> Result<Vec<String>> {
        self.check("view_text", view)?;
        Ok(self.views.get(view).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryCatalog {
        MemoryCatalog::new("HR")
            .with_table(TableInfo::heap("EMP", Some("USERS")))
            .with_table(TableInfo::heap("BIN$abc==$0", Some("USERS")))
            .with_columns(
                "EMP",
                vec![
                    ColumnDescriptor::new("NAME", "VARCHAR2", 2),
                    ColumnDescriptor::new("ID", "NUMBER", 1),
                ],
            )
            .with_index("EMP_PK", Some("INDX"), "CREATE UNIQUE INDEX ...")
            .with_view("V_EMP", &["select *", " from emp"])
            .with_object(DbObject::new("VIEW", "BIN$def==$0"))
            .with_grant("EMP", TableGrant::new("USER2", "SELECT"))
            .with_grant("EMP", TableGrant::new("USER1", "SELECT"))
            .with_grant("EMP", TableGrant::new("USER1", "INSERT"))
    }

    #[test]
    fn test_recycle_bin_filtered() {
        let catalog = sample();
        let tables = catalog.tables().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "EMP");

        let objects = catalog.non_table_objects().unwrap();
        assert!(objects.iter().all(|o| !o.name.starts_with("BIN$")));
        assert_eq!(objects.len(), 2);
    }

    #[test]
    fn test_object_counts() {
        let counts = sample().object_counts().unwrap();
        let labels: Vec<(&str, u64)> = counts
            .iter()
            .map(|c| (c.object_type.as_str(), c.count))
            .collect();
        assert_eq!(labels, vec![("INDEX", 1), ("TABLE", 1), ("VIEW", 1)]);
    }

    #[test]
    fn test_columns_ordered_by_id() {
        let columns = sample().columns("EMP").unwrap();
        assert_eq!(columns[0].name, "ID");
        assert_eq!(columns[1].name, "NAME");
    }

    #[test]
    fn test_grants_ordered_by_grantee() {
        let grants = sample().table_grants("EMP").unwrap();
        let rows: Vec<(&str, &str)> = grants
            .iter()
            .map(|g| (g.grantee.as_str(), g.privilege.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![("USER1", "SELECT"), ("USER1", "INSERT"), ("USER2", "SELECT")]
        );
    }

    #[test]
    fn test_failing_query() {
        let catalog = sample().failing("columns", "EMP");
        let error = catalog.columns("EMP").unwrap_err();
        assert!(error.detailed().contains("ORA-00942"));
        assert!(catalog.column_count("EMP").is_ok());
        assert!(catalog.columns("OTHER").is_ok());

        let catalog = sample().failing("tables", "");
        assert!(catalog.tables().is_err());
    }

    #[test]
    fn test_missing_generated_ddl() {
        let result = sample().generated_ddl(ObjectType::Sequence, "NOPE");
        assert!(matches!(result, Err(DumpError::UnexpectedResult { .. })));
    }
}
