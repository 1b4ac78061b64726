//! Oracle catalog reader.
//!
//! Runs every catalog query through the `oracle` crate (ODPI-C). The Oracle
//! client library is loaded at connect time, so the crate builds without one
//! installed; connecting without it fails with `DPI-1047`.
//!
//! # Security
//! - The password is handed to the driver and never stored or logged
//! - Only `user_*` catalog views (and `all_cons_columns` for foreign key
//!   targets) are queried; the only non-query call is `dbms_metadata.get_ddl`

use super::CatalogReader;
use crate::Result;
use crate::error::DumpError;
use crate::models::{
    ColumnComment, ColumnDescriptor, ConstraintDescriptor, ConstraintKind, DbObject, ObjectType,
    ObjectTypeCount, ReferencedKey, SourceLine, TableGrant, TableInfo, TablespaceCount,
    TemporaryDuration,
};
use crate::security::Credentials;
use oracle::sql_type::ToSql;
use oracle::{Connection, RowValue};

const CURRENT_SCHEMA_SQL: &str = "select sys_context('USERENV', 'CURRENT_SCHEMA') from dual";

const OBJECT_COUNTS_SQL: &str = "\
    select object_type, count(*) \
      from user_objects \
     where object_name not like 'BIN$%' \
     group by object_type \
     order by object_type";

const TABLE_TABLESPACES_SQL: &str = "\
    select tablespace_name, count(1) \
      from user_tables \
     where table_name not like 'BIN$%' \
       and temporary = 'N' \
     group by tablespace_name \
     order by tablespace_name";

const INDEX_TABLESPACES_SQL: &str = "\
    select tablespace_name, count(1) \
      from user_indexes \
     where index_name not like 'BIN$%' \
     group by tablespace_name \
     order by tablespace_name";

const TABLES_SQL: &str = "\
    select table_name, tablespace_name, temporary, duration, iot_type \
      from user_tables \
     where table_name not like 'BIN$%' \
     order by table_name";

const NON_TABLE_OBJECTS_SQL: &str = "\
    select object_type, object_name \
      from user_objects \
     where object_name not like 'BIN$%' \
       and object_type != 'TABLE' \
     order by object_type, object_name";

const SOURCE_SQL: &str = "\
    select line, text \
      from user_source \
     where type = :1 and name = :2 \
     order by line";

const GENERATED_DDL_SQL: &str = "select dbms_metadata.get_ddl(:1, :2) from dual";

const COLUMN_COUNT_SQL: &str = "\
    select count(*) \
      from user_tab_columns \
     where table_name = :1 \
       and column_id is not null";

const COLUMNS_SQL: &str = "\
    select column_name, data_type, \
           case when char_used = 'C' and data_type in ('CHAR', 'VARCHAR2') \
                then char_length else data_length end, \
           data_precision, data_scale, char_used, data_default, nullable, column_id \
      from user_tab_columns \
     where table_name = :1 \
       and column_id is not null \
     order by column_id";

const TABLE_COMMENT_SQL: &str = "\
    select comments \
      from user_tab_comments \
     where table_name = :1 \
       and comments is not null";

const COLUMN_COMMENTS_SQL: &str = "\
    select c.column_name, c.comments \
      from user_col_comments c, user_tab_columns f \
     where c.table_name = f.table_name \
       and c.column_name = f.column_name \
       and c.table_name = :1 \
       and c.comments is not null \
     order by f.column_id";

const CONSTRAINTS_SQL: &str = "\
    select c.owner, c.constraint_name, c.constraint_type, c.status, c.generated, \
           c.r_owner, c.r_constraint_name, c.delete_rule, i.tablespace_name \
      from user_constraints c, user_indexes i \
     where c.index_name = i.index_name (+) \
       and c.constraint_type in ('P', 'U', 'R') \
       and c.constraint_name not like 'BIN$%' \
       and c.table_name = :1 \
     order by decode(c.constraint_type, 'P', 1, 'U', 2, 3), c.constraint_name";

const CONSTRAINT_COLUMNS_SQL: &str = "\
    select column_name \
      from user_cons_columns \
     where constraint_name = :1 \
     order by position";

const REFERENCED_KEY_SQL: &str = "\
    select table_name, column_name \
      from all_cons_columns \
     where owner = :1 \
       and constraint_name = :2 \
     order by position";

const TABLE_GRANTS_SQL: &str = "\
    select grantee, privilege \
      from user_tab_privs \
     where table_name = :1 \
       and owner = user \
     order by grantee";

const VIEW_TEXT_SQL: &str = "select text from user_views where view_name = :1";

/// Catalog reader over one Oracle connection.
///
/// The connection is released when the reader is dropped, on every exit
/// path of a schema dump.
pub struct OracleCatalog {
    conn: Connection,
    data_source: String,
}

impl OracleCatalog {
    /// Connects to `data_source` as the schema user.
    ///
    /// # Errors
    /// Returns a connection error if the client library is missing, the data
    /// source cannot be resolved, or the credentials are rejected.
    pub fn connect(data_source: &str, credentials: &Credentials) -> Result<Self> {
        tracing::debug!(
            "Connecting to '{}' as {}",
            data_source,
            credentials.username()
        );

        let conn = Connection::connect(
            credentials.username(),
            credentials.password().unwrap_or_default(),
            data_source,
        )
        .map_err(|e| DumpError::connection_failed(data_source, e))?;

        Ok(Self {
            conn,
            data_source: data_source.to_string(),
        })
    }

    /// Description of the connection without credentials.
    pub fn safe_description(&self) -> String {
        format!("Oracle connection to '{}'", self.data_source)
    }

    /// Closes the connection explicitly, reporting close errors.
    ///
    /// # Errors
    /// Returns error if the driver fails to close the session.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|e| DumpError::query_failed("closing connection", e))
    }

    fn fetch_all<T>(&self, context: &str, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<T>>
    where
        T: RowValue,
    {
        let rows = self
            .conn
            .query_as::<T>(sql, params)
            .map_err(|e| DumpError::query_failed(context, e))?;

        rows.map(|row| row.map_err(|e| DumpError::query_failed(context, e)))
            .collect()
    }
}

impl CatalogReader for OracleCatalog {
    fn current_schema(&self) -> Result<String> {
        self.conn
            .query_row_as::<String>(CURRENT_SCHEMA_SQL, &[])
            .map_err(|e| DumpError::query_failed("reading current schema", e))
    }

    fn object_counts(&self) -> Result<Vec<ObjectTypeCount>> {
        let rows: Vec<(String, u64)> =
            self.fetch_all("counting objects", OBJECT_COUNTS_SQL, &[])?;
        Ok(rows
            .into_iter()
            .map(|(object_type, count)| ObjectTypeCount { object_type, count })
            .collect())
    }

    fn table_tablespaces(&self) -> Result<Vec<TablespaceCount>> {
        let rows: Vec<(Option<String>, u64)> = self.fetch_all(
            "counting tables per tablespace",
            TABLE_TABLESPACES_SQL,
            &[],
        )?;
        Ok(rows
            .into_iter()
            .map(|(tablespace, count)| TablespaceCount { tablespace, count })
            .collect())
    }

    fn index_tablespaces(&self) -> Result<Vec<TablespaceCount>> {
        let rows: Vec<(Option<String>, u64)> = self.fetch_all(
            "counting indexes per tablespace",
            INDEX_TABLESPACES_SQL,
            &[],
        )?;
        Ok(rows
            .into_iter()
            .map(|(tablespace, count)| TablespaceCount { tablespace, count })
            .collect())
    }

    fn tables(&self) -> Result<Vec<TableInfo>> {
        let rows: Vec<(String, Option<String>, Option<String>, Option<String>, Option<String>)> =
            self.fetch_all("listing tables", TABLES_SQL, &[])?;

        Ok(rows
            .into_iter()
            .map(|(name, tablespace, temporary, duration, iot_type)| TableInfo {
                name,
                tablespace,
                temporary: temporary.as_deref() == Some("Y"),
                duration: duration.as_deref().and_then(TemporaryDuration::from_catalog),
                index_organized: iot_type.as_deref() == Some("IOT"),
            })
            .collect())
    }

    fn non_table_objects(&self) -> Result<Vec<DbObject>> {
        let rows: Vec<(String, String)> =
            self.fetch_all("listing objects", NON_TABLE_OBJECTS_SQL, &[])?;
        Ok(rows
            .into_iter()
            .map(|(object_type, name)| DbObject { object_type, name })
            .collect())
    }

    fn source_lines(&self, object_type: ObjectType, name: &str) -> Result<Vec<SourceLine>> {
        let label = object_type.label();
        let rows: Vec<(u32, Option<String>)> = self.fetch_all(
            &format!("reading source of {label} {name}"),
            SOURCE_SQL,
            &[&label, &name],
        )?;
        Ok(rows
            .into_iter()
            .map(|(line, text)| SourceLine {
                line,
                text: text.unwrap_or_default(),
            })
            .collect())
    }

    fn generated_ddl(&self, object_type: ObjectType, name: &str) -> Result<String> {
        let label = object_type.label();
        self.conn
            .query_row_as::<Option<String>>(GENERATED_DDL_SQL, &[&label, &name])
            .map_err(|e| DumpError::query_failed(format!("generating DDL of {label} {name}"), e))?
            .ok_or_else(|| {
                DumpError::unexpected_result(format!("no DDL generated for {label} {name}"))
            })
    }

    fn column_count(&self, table: &str) -> Result<u32> {
        self.conn
            .query_row_as::<u32>(COLUMN_COUNT_SQL, &[&table])
            .map_err(|e| DumpError::query_failed(format!("counting columns of {table}"), e))
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        type ColumnRow = (
            String,
            String,
            u32,
            Option<u32>,
            Option<i32>,
            Option<String>,
            Option<String>,
            String,
            u32,
        );

        let rows: Vec<ColumnRow> = self.fetch_all(
            &format!("reading columns of {table}"),
            COLUMNS_SQL,
            &[&table],
        )?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    name,
                    data_type,
                    data_length,
                    data_precision,
                    data_scale,
                    char_used,
                    data_default,
                    nullable,
                    column_id,
                )| ColumnDescriptor {
                    name,
                    data_type,
                    data_length,
                    data_precision,
                    data_scale,
                    char_semantics: char_used.as_deref() == Some("C"),
                    data_default,
                    nullable: nullable != "N",
                    column_id,
                },
            )
            .collect())
    }

    fn table_comment(&self, table: &str) -> Result<Option<String>> {
        let rows: Vec<String> = self.fetch_all(
            &format!("reading comment of {table}"),
            TABLE_COMMENT_SQL,
            &[&table],
        )?;
        Ok(rows.into_iter().next())
    }

    fn column_comments(&self, table: &str) -> Result<Vec<ColumnComment>> {
        let rows: Vec<(String, String)> = self.fetch_all(
            &format!("reading column comments of {table}"),
            COLUMN_COMMENTS_SQL,
            &[&table],
        )?;
        Ok(rows
            .into_iter()
            .map(|(column, comment)| ColumnComment { column, comment })
            .collect())
    }

    fn constraints(&self, table: &str) -> Result<Vec<ConstraintDescriptor>> {
        type ConstraintRow = (
            String,
            String,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        );

        let context = format!("reading constraints of {table}");
        let rows: Vec<ConstraintRow> = self.fetch_all(&context, CONSTRAINTS_SQL, &[&table])?;

        rows.into_iter()
            .map(
                |(
                    owner,
                    name,
                    constraint_type,
                    status,
                    generated,
                    referenced_owner,
                    referenced_constraint,
                    delete_rule,
                    index_tablespace,
                )| {
                    let kind = ConstraintKind::from_code(&constraint_type).ok_or_else(|| {
                        DumpError::unexpected_result(format!(
                            "{context}: constraint {name} has type '{constraint_type}'"
                        ))
                    })?;
                    Ok(ConstraintDescriptor {
                        owner,
                        name,
                        kind,
                        enabled: status.as_deref() != Some("DISABLED"),
                        user_named: generated.as_deref() == Some("USER NAME"),
                        referenced_owner,
                        referenced_constraint,
                        cascade_delete: delete_rule.as_deref() == Some("CASCADE"),
                        index_tablespace,
                    })
                },
            )
            .collect()
    }

    fn constraint_columns(&self, constraint: &str) -> Result<Vec<String>> {
        self.fetch_all(
            &format!("reading columns of constraint {constraint}"),
            CONSTRAINT_COLUMNS_SQL,
            &[&constraint],
        )
    }

    fn referenced_key(&self, owner: &str, constraint: &str) -> Result<Option<ReferencedKey>> {
        let rows: Vec<(String, String)> = self.fetch_all(
            &format!("reading referenced key {owner}.{constraint}"),
            REFERENCED_KEY_SQL,
            &[&owner, &constraint],
        )?;

        let Some((table, _)) = rows.first() else {
            return Ok(None);
        };
        let table = table.clone();
        Ok(Some(ReferencedKey {
            table,
            columns: rows.into_iter().map(|(_, column)| column).collect(),
        }))
    }

    fn table_grants(&self, table: &str) -> Result<Vec<TableGrant>> {
        let rows: Vec<(String, String)> = self.fetch_all(
            &format!("reading grants on {table}"),
            TABLE_GRANTS_SQL,
            &[&table],
        )?;
        Ok(rows
            .into_iter()
            .map(|(grantee, privilege)| TableGrant { grantee, privilege })
            .collect())
    }

    fn view_text(&self, view: &str) -> Result<Vec<String>> {
        let rows: Vec<Option<String>> = self.fetch_all(
            &format!("reading text of view {view}"),
            VIEW_TEXT_SQL,
            &[&view],
        )?;
        Ok(rows.into_iter().map(Option::unwrap_or_default).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_queries_filter_recycle_bin() {
        for sql in [
            OBJECT_COUNTS_SQL,
            TABLE_TABLESPACES_SQL,
            INDEX_TABLESPACES_SQL,
            TABLES_SQL,
            NON_TABLE_OBJECTS_SQL,
            CONSTRAINTS_SQL,
        ] {
            assert!(sql.contains("not like 'BIN$%'"), "unfiltered query: {sql}");
        }
    }

    #[test]
    fn test_parameterized_queries_bind_names() {
        for sql in [SOURCE_SQL, GENERATED_DDL_SQL, REFERENCED_KEY_SQL] {
            assert!(sql.contains(":1") && sql.contains(":2"), "{sql}");
        }
        for sql in [
            COLUMN_COUNT_SQL,
            COLUMNS_SQL,
            TABLE_COMMENT_SQL,
            COLUMN_COMMENTS_SQL,
            CONSTRAINTS_SQL,
            CONSTRAINT_COLUMNS_SQL,
            TABLE_GRANTS_SQL,
            VIEW_TEXT_SQL,
        ] {
            assert!(sql.contains(":1"), "{sql}");
        }
    }

    #[test]
    fn test_connect_without_client_fails_cleanly() {
        let creds = Credentials::new("scott".to_string(), Some("tiger-secret".to_string()));
        // Either the client library is missing or the alias does not resolve;
        // both must surface as a connection error without the password.
        if let Err(error) = OracleCatalog::connect("oradump_no_such_alias", &creds) {
            assert!(error.is_connection_error());
            assert!(!error.detailed().contains("tiger-secret"));
        }
    }
}
