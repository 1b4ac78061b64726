//! View formatter.

use super::CRLF;
use crate::Result;
use crate::error::DumpError;

/// Builds `create or replace view <name> as` followed by the view text.
///
/// The text of a long view can arrive in several rows; they are joined
/// first, so the statement is right-trimmed and terminated exactly once.
/// Line breaks inside the text are written as CRLF.
///
/// # Errors
/// Returns error if the view has no text.
pub fn format_view(name: &str, rows: &[String]) -> Result<String> {
    let text = rows.concat();
    let text = text.trim_end();
    if text.is_empty() {
        return Err(DumpError::unexpected_result(format!(
            "no text stored for view {name}"
        )));
    }

    let body = text.lines().collect::<Vec<_>>().join(CRLF);
    Ok(format!("create or replace view {name} as{CRLF}{body};{CRLF}"))
}
