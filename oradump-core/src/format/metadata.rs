//! Formatter for DDL generated by `dbms_metadata.get_ddl`.

use super::source::{strip_owner_qualifier, unquote_name};
use super::{CRLF, Patterns, SLASH};
use crate::Result;
use crate::error::DumpError;

/// Whether the generated DDL marks the object unusable.
///
/// `dbms_metadata` ends such DDL with an `ALTER INDEX ... UNUSABLE` line;
/// the keyword inside a quoted name does not count.
pub fn is_unusable(ddl: &str) -> bool {
    ddl.lines().any(|line| {
        let line = line.trim_end().trim_end_matches(';').trim_end();
        line == "UNUSABLE" || line.ends_with(" UNUSABLE")
    })
}

/// Normalizes generated DDL into a replayable script.
///
/// Every line loses `"OWNER".` qualifiers, the quotes around the object's
/// own name and around plain tablespace names, and its surrounding blanks.
/// Empty lines before and after the statement are dropped. The script ends
/// with a lone `/` without a line break after it.
///
/// # Errors
/// Returns error if the DDL has no content.
pub fn format_generated_ddl(ddl: &str, owner: &str, name: &str) -> Result<String> {
    let patterns = Patterns::instance()?;

    let lines: Vec<String> = ddl
        .lines()
        .map(|line| {
            let line = unquote_name(&strip_owner_qualifier(line, owner), name);
            patterns
                .quoted_tablespace
                .replace_all(&line, "TABLESPACE $1")
                .trim()
                .to_string()
        })
        .collect();

    let Some(start) = lines.iter().position(|l| !l.is_empty()) else {
        return Err(DumpError::unexpected_result(format!(
            "empty DDL generated for {name}"
        )));
    };
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .unwrap_or(start);

    let mut script = String::new();
    for line in lines.get(start..=end).unwrap_or_default() {
        script.push_str(line);
        script.push_str(CRLF);
    }
    script.push_str(SLASH);
    Ok(script)
}
