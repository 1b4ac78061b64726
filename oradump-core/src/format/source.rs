//! Stored PL/SQL source formatter.

use super::{CRLF, Patterns, SLASH, replace_to_fixpoint};
use crate::Result;
use crate::error::DumpError;
use crate::models::SourceLine;

/// Removes every `"OWNER".` qualifier from `text`.
///
/// Triggers in particular are stored as `trigger "HR".trg_name`; without the
/// qualifier the script can be replayed into any schema.
pub fn strip_owner_qualifier(text: &str, owner: &str) -> String {
    replace_to_fixpoint(text, &format!("\"{owner}\"."), "")
}

/// Replaces `"NAME"` with `NAME` for the object's own name.
pub fn unquote_name(text: &str, name: &str) -> String {
    replace_to_fixpoint(text, &format!("\"{name}\""), name)
}

/// Builds the script of a stored PL/SQL object from its source lines.
///
/// Lines are emitted in line-number order. Line 1 loses its owner qualifier
/// and name quotes, has runs of blanks collapsed and is prefixed with
/// `create or replace `. Every line is right-trimmed, trailing blank lines
/// are dropped, and the text ends with a blank line and a lone `/` without
/// a line break after it.
///
/// # Errors
/// Returns error if there are no source lines.
pub fn format_source(lines: &[SourceLine], owner: &str, name: &str) -> Result<String> {
    if lines.is_empty() {
        return Err(DumpError::unexpected_result(format!(
            "no source lines for {name}"
        )));
    }

    let patterns = Patterns::instance()?;
    let mut ordered: Vec<&SourceLine> = lines.iter().collect();
    ordered.sort_by_key(|line| line.line);

    let mut text = String::from("create or replace ");
    for (index, line) in ordered.iter().enumerate() {
        if index > 0 {
            text.push_str(CRLF);
        }
        if line.line == 1 {
            let head = unquote_name(&strip_owner_qualifier(&line.text, owner), name);
            text.push_str(&patterns.blank_runs.replace_all(head.trim_end(), " "));
        } else {
            text.push_str(line.text.trim_end());
        }
    }

    let mut script = text.trim_end().to_string();
    script.push_str(CRLF);
    script.push_str(CRLF);
    script.push_str(SLASH);
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(texts: &[&str]) -> Vec<SourceLine> {
        (1_u32..)
            .zip(texts)
            .map(|(n, t)| SourceLine::new(n, *t))
            .collect()
    }

    #[test]
    fn test_trigger_first_line_normalized() {
        let source = lines(&[
            "trigger \"HR\".\"TRG_EMP\"   before insert on emp\n",
            "  for each row\n",
            "begin\n",
            "  :new.id := 1;   \n",
            "end;\n",
            "\n",
            "\n",
        ]);
        let script = format_source(&source, "HR", "TRG_EMP").unwrap();
        assert_eq!(
            script,
            "create or replace trigger TRG_EMP before insert on emp\r\n  for each row\r\nbegin\r\n  :new.id := 1;\r\nend;\r\n\r\n/"
        );
    }

    #[test]
    fn test_single_line_source() {
        let script = format_source(&lines(&["type t_ids as table of number"]), "HR", "T_IDS")
            .unwrap();
        assert_eq!(
            script,
            "create or replace type t_ids as table of number\r\n\r\n/"
        );
    }

    #[test]
    fn test_interior_formatting_kept_after_first_line() {
        let script = format_source(
            &lines(&["package body pkg is", "    x  :=  \"HR\".f;", "end;"]),
            "HR",
            "PKG",
        )
        .unwrap();
        assert!(script.contains("\r\n    x  :=  \"HR\".f;\r\n"));
    }

    #[test]
    fn test_lines_emitted_in_line_number_order() {
        let source = vec![
            SourceLine::new(3, "end;"),
            SourceLine::new(2, "  null;"),
            SourceLine::new(1, "procedure \"HR\".\"P\"  is"),
        ];
        let script = format_source(&source, "HR", "P").unwrap();
        assert_eq!(
            script,
            "create or replace procedure P is\r\n  null;\r\nend;\r\n\r\n/"
        );
    }

    #[test]
    fn test_first_line_rules_only_for_line_one() {
        // Line 1 missing from the catalog rows: nothing is normalized
        let source = vec![SourceLine::new(2, "  x  :=  \"HR\".f;")];
        let script = format_source(&source, "HR", "P").unwrap();
        assert_eq!(script, "create or replace   x  :=  \"HR\".f;\r\n\r\n/");
    }

    #[test]
    fn test_no_source_lines() {
        assert!(format_source(&[], "HR", "MISSING").is_err());
    }

    #[test]
    fn test_strip_owner_only_for_owner() {
        assert_eq!(
            strip_owner_qualifier("\"HR\".emp, \"SCOTT\".dept", "HR"),
            "emp, \"SCOTT\".dept"
        );
    }

    proptest! {
        #[test]
        fn prop_strip_owner_qualifier_idempotent(
            text in "[\"A-Z. ]{0,40}",
            owner in "[A-Z]{1,4}",
        ) {
            let once = strip_owner_qualifier(&text, &owner);
            let twice = strip_owner_qualifier(&once, &owner);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_source_script_shape(
            body in prop::collection::vec("[a-z ;:=]{0,20}", 0..8),
        ) {
            let mut texts = vec!["procedure p is".to_string()];
            texts.extend(body);
            texts.push("end;".to_string());
            let source: Vec<SourceLine> = (1_u32..)
                .zip(&texts)
                .map(|(n, t)| SourceLine::new(n, t.as_str()))
                .collect();

            let script = format_source(&source, "HR", "P").unwrap();
            prop_assert!(script.starts_with("create or replace procedure p is"));
            prop_assert!(script.ends_with("end;\r\n\r\n/"));
            for line in script.split("\r\n") {
                prop_assert_eq!(line, line.trim_end());
            }
        }
    }
}
