//! Pass 1a: strips the `/** ... */` comment delimiters and each line's
//! leading `*` marker, leaving a flat list of content lines for the tag
//! splitter to walk.

use std::sync::OnceLock;

use regex::Regex;

use crate::diagnostics::{Position, Reporter};

fn line_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\s?(.*)$").expect("static regex"))
}

fn strip_comment_delimiters(s: &str) -> &str {
    let s = s
        .strip_prefix("/**")
        .or_else(|| s.strip_prefix("/*"))
        .unwrap_or(s);
    s.strip_suffix("*/").unwrap_or(s)
}

/// Splits a raw `/** ... */` comment into cleaned content lines.
///
/// Every line this returns has no leading `* ` marker and no trailing
/// whitespace (leading whitespace, which carries list/indentation meaning
/// for the wiki parser, is preserved). A marker line with nothing after it
/// (just `*`) emits an *empty* line rather than being dropped — that's how
/// a paragraph break is written inside a `/** ... */` comment, and the
/// wiki parser's blank-line detection depends on it surviving here. A line
/// with no marker at all and nothing on it is pure source noise and is
/// dropped silently.
pub fn clean_lines(raw: &str, pos: Position, reporter: &mut dyn Reporter) -> Vec<String> {
    let body = strip_comment_delimiters(raw.trim());
    let mut out = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if let Some(caps) = line_marker_re().captures(line) {
            let rest = caps.get(1).expect("group 1 always present").as_str();
            out.push(rest.trim_end().to_string());
        } else if line.is_empty() {
            continue;
        } else {
            reporter.warning(
                pos,
                "Comment has no start-of-line marker ('*')".to_string(),
            );
            out.push(line.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingReporter;

    fn clean(raw: &str) -> (Vec<String>, CollectingReporter) {
        let mut r = CollectingReporter::default();
        let lines = clean_lines(raw, Position(1), &mut r);
        (lines, r)
    }

    #[test]
    fn minimal_comment() {
        let (lines, r) = clean("/** Hello. */");
        assert_eq!(lines, vec!["Hello.".to_string()]);
        // the opening line shares its physical line with `/**` itself, so it
        // has no `*` marker of its own and is reported like any other.
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn multi_line_with_star_markers() {
        let (lines, r) = clean(
            "/** Greets the user.\n  * @author Alice\n  * @return the greeting */",
        );
        assert_eq!(
            lines,
            vec![
                "Greets the user.".to_string(),
                "@author Alice".to_string(),
                "@return the greeting".to_string(),
            ]
        );
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn missing_marker_warns_but_is_accepted() {
        let (lines, r) = clean("/** First.\n  no marker here\n  * Second. */");
        assert_eq!(
            lines,
            vec![
                "First.".to_string(),
                "no marker here".to_string(),
                "Second.".to_string(),
            ]
        );
        // both "First." and "no marker here" share no line with a `*`.
        assert_eq!(r.warnings.len(), 2);
        assert!(r.warnings.iter().all(|(_, m)| m.contains("no start-of-line marker")));
    }

    #[test]
    fn lone_star_line_signals_a_paragraph_break() {
        let (lines, _) = clean("/** One.\n  *\n  * Two. */");
        assert_eq!(
            lines,
            vec!["One.".to_string(), "".to_string(), "Two.".to_string()]
        );
    }

    #[test]
    fn truly_blank_line_is_dropped_without_a_warning() {
        let (lines, r) = clean("/**\n  * One.\n\n  * Two.\n */");
        assert_eq!(lines, vec!["One.".to_string(), "Two.".to_string()]);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn indentation_after_marker_is_preserved() {
        let (lines, _) = clean("/**\n *  - item A\n *    - child of A\n */");
        assert_eq!(lines, vec![" - item A".to_string(), "   - child of A".to_string()]);
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let (first, _) = clean("/** Hello.\n  * @author Alice */");
        let rewrapped = format!(
            "/**\n{}\n */",
            first
                .iter()
                .map(|l| format!(" * {l}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
        let (second, _) = clean(&rewrapped);
        assert_eq!(first, second);
    }
}
