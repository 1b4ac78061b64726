//! Table formatter.
//!
//! Produces the `create table` statement and the three dependent blocks
//! written after it in the same file: comments, constraints and grants.
//! Every statement ends with CRLF.

use super::CRLF;
use crate::Result;
use crate::error::DumpError;
use crate::models::{
    ColumnComment, ColumnDescriptor, ConstraintDescriptor, ConstraintKind, ReferencedKey,
    TableGrant, TableInfo, TemporaryDuration,
};

/// Type token of a column definition, e.g. `VARCHAR2(30 CHAR)` or `INTEGER`.
pub fn column_type(column: &ColumnDescriptor) -> String {
    let data_type = column.data_type.as_str();
    match data_type {
        "CHAR" | "VARCHAR2" | "RAW" => {
            if column.char_semantics {
                format!("{data_type}({} CHAR)", column.data_length)
            } else {
                format!("{data_type}({})", column.data_length)
            }
        }
        // Catalog length is in bytes of a two-byte national character set
        "NVARCHAR2" => format!("NVARCHAR2({})", column.data_length / 2),
        "NUMBER" => match (column.data_precision, column.data_scale) {
            (None, None) => "NUMBER".to_string(),
            (None, Some(0)) => "INTEGER".to_string(),
            (None, Some(scale)) => format!("NUMBER(*,{scale})"),
            (Some(precision), scale) => format!("NUMBER({precision},{})", scale.unwrap_or(0)),
        },
        other => other.to_string(),
    }
}

/// One column line of the `create table` body, without the line break.
///
/// Every column but the last (`column_id == column_count`) ends with a comma.
pub fn column_clause(column: &ColumnDescriptor, column_count: u32) -> String {
    let mut clause = format!("  {} {}", column.name, column_type(column));

    if let Some(default) = column
        .data_default
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        clause.push_str(" default ");
        clause.push_str(default);
    }

    if !column.nullable {
        clause.push_str(" not null");
    }

    if column.column_id != column_count {
        clause.push(',');
    }

    clause
}

/// The `create [global temporary] table` statement.
pub fn create_table(
    table: &TableInfo,
    columns: &[ColumnDescriptor],
    column_count: u32,
    use_tablespaces: bool,
) -> String {
    let mut ddl = String::new();

    if table.temporary {
        ddl.push_str("create global temporary table ");
    } else {
        ddl.push_str("create table ");
    }
    ddl.push_str(&table.name);
    ddl.push_str(CRLF);
    ddl.push('(');
    ddl.push_str(CRLF);

    for column in columns {
        ddl.push_str(&column_clause(column, column_count));
        ddl.push_str(CRLF);
    }

    ddl.push(')');
    ddl.push_str(&table_trailer(table, use_tablespaces));
    ddl
}

fn table_trailer(table: &TableInfo, use_tablespaces: bool) -> String {
    if table.temporary {
        return match table.duration {
            Some(TemporaryDuration::Transaction) => format!("{CRLF}on commit delete rows;{CRLF}"),
            Some(TemporaryDuration::Session) => format!("{CRLF}on commit preserve rows;{CRLF}"),
            None => format!(";{CRLF}"),
        };
    }

    if table.index_organized {
        return format!("{CRLF}organization index;{CRLF}");
    }

    match table.tablespace.as_deref() {
        Some(tablespace) if use_tablespaces => format!("{CRLF}tablespace {tablespace};{CRLF}"),
        _ => format!(";{CRLF}"),
    }
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// `comment on` statements for the table and its columns.
///
/// Returns an empty string when nothing is commented.
pub fn table_comments(table: &str, comment: Option<&str>, columns: &[ColumnComment]) -> String {
    let mut out = String::new();

    if let Some(comment) = comment {
        out.push_str("-- Add comments to the table");
        out.push_str(CRLF);
        out.push_str(&format!(
            "comment on table {table}{CRLF}  is {};{CRLF}",
            quote_literal(comment)
        ));
    }

    if !columns.is_empty() {
        out.push_str("-- Add comments to the columns");
        out.push_str(CRLF);
    }
    for column in columns {
        out.push_str(&format!(
            "comment on column {table}.{}{CRLF}  is {};{CRLF}",
            column.column,
            quote_literal(&column.comment)
        ));
    }

    out
}

/// `alter table ... add` statement for one constraint.
///
/// `referenced` is the key a foreign key points at; it is ignored for
/// primary and unique keys.
///
/// # Errors
/// Returns error if the constraint has no columns, or if it is a foreign key
/// whose referenced key is unknown or has no columns.
pub fn constraint_statement(
    table: &str,
    constraint: &ConstraintDescriptor,
    columns: &[String],
    referenced: Option<&ReferencedKey>,
    use_tablespaces: bool,
) -> Result<String> {
    if columns.is_empty() {
        return Err(DumpError::unexpected_result(format!(
            "constraint {} on {table} has no columns",
            constraint.name
        )));
    }

    let mut out = format!("alter table {table}{CRLF}  add");
    if constraint.user_named {
        out.push_str(" constraint ");
        out.push_str(&constraint.name);
    }
    out.push_str(&format!(
        " {} ({}",
        constraint.kind.keyword(),
        columns.join(", ")
    ));

    match constraint.kind {
        ConstraintKind::PrimaryKey | ConstraintKind::Unique => {
            if !constraint.enabled {
                out.push_str(&format!("){CRLF}  disable;{CRLF}"));
            } else if let Some(tablespace) = constraint
                .index_tablespace
                .as_deref()
                .filter(|_| use_tablespaces)
            {
                out.push_str(&format!(
                    "){CRLF}  using index{CRLF}  tablespace {tablespace};{CRLF}"
                ));
            } else {
                out.push_str(&format!(");{CRLF}"));
            }
        }
        ConstraintKind::ForeignKey => {
            let key = referenced
                .filter(|key| !key.columns.is_empty())
                .ok_or_else(|| {
                    DumpError::unexpected_result(format!(
                        "referenced key of {} on {table} not found",
                        constraint.name
                    ))
                })?;

            let target = match constraint.referenced_owner.as_deref() {
                Some(owner) if owner != constraint.owner => format!("{owner}.{}", key.table),
                _ => key.table.clone(),
            };
            out.push_str(&format!(
                "){CRLF}  references {target} ({})",
                key.columns.join(", ")
            ));

            if constraint.cascade_delete {
                out.push_str(" on delete cascade");
            }
            if !constraint.enabled {
                out.push_str(CRLF);
                out.push_str("  disable");
            }
            out.push(';');
            out.push_str(CRLF);
        }
    }

    Ok(out)
}

/// One `grant` statement per grantee.
///
/// Rows must be ordered by grantee; privileges are lower-cased and keep
/// their row order. Returns an empty string when there are no grants.
pub fn grant_statements(table: &str, grants: &[TableGrant]) -> String {
    let mut out = String::new();

    for group in grants.chunk_by(|a, b| a.grantee == b.grantee) {
        let Some(first) = group.first() else {
            continue;
        };
        let privileges: Vec<String> = group.iter().map(|g| g.privilege.to_lowercase()).collect();
        out.push_str(&format!(
            "grant {} on {table} to {};{CRLF}",
            privileges.join(", "),
            first.grantee
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn number(precision: Option<u32>, scale: Option<i32>) -> ColumnDescriptor {
        let mut column = ColumnDescriptor::new("N", "NUMBER", 1);
        column.data_precision = precision;
        column.data_scale = scale;
        column
    }

    fn sized(data_type: &str, length: u32, char_semantics: bool) -> ColumnDescriptor {
        let mut column = ColumnDescriptor::new("C", data_type, 1);
        column.data_length = length;
        column.char_semantics = char_semantics;
        column
    }

    #[test]
    fn test_number_types() {
        assert_eq!(column_type(&number(None, None)), "NUMBER");
        assert_eq!(column_type(&number(None, Some(0))), "INTEGER");
        assert_eq!(column_type(&number(Some(5), Some(2))), "NUMBER(5,2)");
        assert_eq!(column_type(&number(Some(10), Some(0))), "NUMBER(10,0)");
        assert_eq!(column_type(&number(None, Some(-2))), "NUMBER(*,-2)");
    }

    #[test]
    fn test_character_types() {
        assert_eq!(column_type(&sized("VARCHAR2", 30, true)), "VARCHAR2(30 CHAR)");
        assert_eq!(column_type(&sized("VARCHAR2", 30, false)), "VARCHAR2(30)");
        assert_eq!(column_type(&sized("CHAR", 1, false)), "CHAR(1)");
        assert_eq!(column_type(&sized("RAW", 16, false)), "RAW(16)");
        assert_eq!(column_type(&sized("NVARCHAR2", 20, false)), "NVARCHAR2(10)");
    }

    #[test]
    fn test_other_types_verbatim() {
        assert_eq!(column_type(&sized("DATE", 7, false)), "DATE");
        assert_eq!(column_type(&sized("TIMESTAMP(6)", 11, false)), "TIMESTAMP(6)");
        assert_eq!(column_type(&sized("CLOB", 4000, false)), "CLOB");
    }

    #[test]
    fn test_column_clause() {
        let mut column = sized("VARCHAR2", 1, false);
        column.name = "ACTIVE".to_string();
        column.data_default = Some("'Y'  \n".to_string());
        column.nullable = false;
        column.column_id = 2;

        assert_eq!(
            column_clause(&column, 3),
            "  ACTIVE VARCHAR2(1) default 'Y' not null,"
        );
        assert_eq!(
            column_clause(&column, 2),
            "  ACTIVE VARCHAR2(1) default 'Y' not null"
        );
    }

    #[test]
    fn test_create_table() {
        let mut id = number(Some(10), Some(0));
        id.name = "ID".to_string();
        id.nullable = false;
        let mut name = sized("VARCHAR2", 50, true);
        name.name = "NAME".to_string();
        name.column_id = 2;

        let table = TableInfo::heap("EMP", Some("USERS"));
        let ddl = create_table(&table, &[id.clone(), name.clone()], 2, true);
        assert_eq!(
            ddl,
            "create table EMP\r\n(\r\n  ID NUMBER(10,0) not null,\r\n  NAME VARCHAR2(50 CHAR)\r\n)\r\ntablespace USERS;\r\n"
        );

        let ddl = create_table(&table, &[id, name], 2, false);
        assert!(ddl.ends_with("\r\n);\r\n"));
    }

    #[test]
    fn test_table_trailers() {
        let mut table = TableInfo::heap("TMP", None);
        table.temporary = true;

        table.duration = Some(TemporaryDuration::Transaction);
        assert_eq!(table_trailer(&table, true), "\r\non commit delete rows;\r\n");
        table.duration = Some(TemporaryDuration::Session);
        assert_eq!(table_trailer(&table, true), "\r\non commit preserve rows;\r\n");
        table.duration = None;
        assert_eq!(table_trailer(&table, true), ";\r\n");

        let mut iot = TableInfo::heap("IOT", Some("USERS"));
        iot.index_organized = true;
        assert_eq!(table_trailer(&iot, true), "\r\norganization index;\r\n");

        let no_tablespace = TableInfo::heap("T", None);
        assert_eq!(table_trailer(&no_tablespace, true), ";\r\n");
    }

    #[test]
    fn test_temporary_table_header() {
        let mut table = TableInfo::heap("TMP", None);
        table.temporary = true;
        table.duration = Some(TemporaryDuration::Session);
        let ddl = create_table(&table, &[ColumnDescriptor::new("X", "DATE", 1)], 1, true);
        assert!(ddl.starts_with("create global temporary table TMP\r\n(\r\n  X DATE\r\n)"));
    }

    #[test]
    fn test_table_comments() {
        let comments = table_comments(
            "EMP",
            Some("Employee's master"),
            &[ColumnComment {
                column: "ID".to_string(),
                comment: "Key".to_string(),
            }],
        );
        assert_eq!(
            comments,
            "-- Add comments to the table\r\ncomment on table EMP\r\n  is 'Employee''s master';\r\n-- Add comments to the columns\r\ncomment on column EMP.ID\r\n  is 'Key';\r\n"
        );
        assert_eq!(table_comments("EMP", None, &[]), "");
    }

    fn constraint(kind: ConstraintKind, name: &str) -> ConstraintDescriptor {
        ConstraintDescriptor {
            owner: "HR".to_string(),
            name: name.to_string(),
            kind,
            enabled: true,
            user_named: true,
            referenced_owner: None,
            referenced_constraint: None,
            cascade_delete: false,
            index_tablespace: Some("INDX".to_string()),
        }
    }

    #[test]
    fn test_primary_key_statement() {
        let pk = constraint(ConstraintKind::PrimaryKey, "EMP_PK");
        let columns = vec!["ID".to_string(), "SEQ".to_string()];

        assert_eq!(
            constraint_statement("EMP", &pk, &columns, None, true).unwrap(),
            "alter table EMP\r\n  add constraint EMP_PK primary key (ID, SEQ)\r\n  using index\r\n  tablespace INDX;\r\n"
        );
        assert_eq!(
            constraint_statement("EMP", &pk, &columns, None, false).unwrap(),
            "alter table EMP\r\n  add constraint EMP_PK primary key (ID, SEQ);\r\n"
        );

        let mut disabled = constraint(ConstraintKind::Unique, "SYS_C001");
        disabled.enabled = false;
        disabled.user_named = false;
        assert_eq!(
            constraint_statement("EMP", &disabled, &columns, None, true).unwrap(),
            "alter table EMP\r\n  add unique (ID, SEQ)\r\n  disable;\r\n"
        );
    }

    #[test]
    fn test_foreign_key_statement() {
        let mut fk = constraint(ConstraintKind::ForeignKey, "EMP_DEPT_FK");
        fk.referenced_owner = Some("HR".to_string());
        fk.referenced_constraint = Some("DEPT_PK".to_string());
        fk.index_tablespace = None;
        let key = ReferencedKey {
            table: "DEPT".to_string(),
            columns: vec!["ID".to_string()],
        };
        let columns = vec!["DEPT_ID".to_string()];

        assert_eq!(
            constraint_statement("EMP", &fk, &columns, Some(&key), true).unwrap(),
            "alter table EMP\r\n  add constraint EMP_DEPT_FK foreign key (DEPT_ID)\r\n  references DEPT (ID);\r\n"
        );

        fk.referenced_owner = Some("CORE".to_string());
        fk.cascade_delete = true;
        fk.enabled = false;
        assert_eq!(
            constraint_statement("EMP", &fk, &columns, Some(&key), true).unwrap(),
            "alter table EMP\r\n  add constraint EMP_DEPT_FK foreign key (DEPT_ID)\r\n  references CORE.DEPT (ID) on delete cascade\r\n  disable;\r\n"
        );

        assert!(constraint_statement("EMP", &fk, &columns, None, true).is_err());
    }

    #[test]
    fn test_constraint_without_columns() {
        let pk = constraint(ConstraintKind::PrimaryKey, "EMP_PK");
        assert!(constraint_statement("EMP", &pk, &[], None, true).is_err());
    }

    #[test]
    fn test_grant_grouping() {
        let grants = vec![
            TableGrant::new("USER1", "SELECT"),
            TableGrant::new("USER1", "INSERT"),
            TableGrant::new("USER2", "SELECT"),
        ];
        assert_eq!(
            grant_statements("EMP", &grants),
            "grant select, insert on EMP to USER1;\r\ngrant select on EMP to USER2;\r\n"
        );
        assert_eq!(grant_statements("EMP", &[]), "");
    }

    proptest! {
        #[test]
        fn prop_column_commas(count in 1_u32..40) {
            let columns: Vec<ColumnDescriptor> = (1..=count)
                .map(|id| ColumnDescriptor::new(format!("C{id}"), "DATE", id))
                .collect();
            let ddl = create_table(&TableInfo::heap("T", None), &columns, count, false);

            let column_lines: Vec<&str> = ddl
                .split("\r\n")
                .filter(|line| line.starts_with("  C"))
                .collect();
            let commas = column_lines.iter().filter(|line| line.ends_with(',')).count();

            prop_assert_eq!(column_lines.len(), count as usize);
            prop_assert_eq!(commas, (count - 1) as usize);
            prop_assert!(!column_lines.last().unwrap().ends_with(','));
        }
    }
}
