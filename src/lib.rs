//! Parses wiki-style `/** ... */` documentation comments into a
//! structured [`Comment`]: a block/inline body, a one-line summary, and
//! every recognized `@tag` projected into a named field.
//!
//! The pipeline is two passes over the raw comment text:
//!
//! 1. [`line_cleaner`] strips the comment delimiters and per-line `*`
//!    markers, then [`tag_splitter`] walks the result into a body string
//!    plus an ordered multimap of tag occurrences.
//! 2. [`wiki::parser`] recursive-descent parses the body string (and
//!    every tag's raw value) into the [`wiki::ast`] tree; [`projector`]
//!    assembles the final [`Comment`].
//!
//! Nothing here ever aborts on malformed input — problems are reported
//! through the caller-supplied [`Reporter`] and parsing continues with a
//! best-effort tree. The one entry point is [`parse`].
//!
//! Every AST node here derives `Serialize`/`Deserialize`, so a parsed
//! tree round-trips through `serde_json` cleanly — handy for persisting
//! or diffing a comment outside this crate:
//!
//! ```rust,ignore
//! let comment = doccomment_core::parse(raw, 1, &mut reporter);
//! let json = serde_json::to_string(&comment)?;
//! ```

pub mod comment;
pub mod diagnostics;
pub mod line_cleaner;
pub mod projector;
pub mod reader;
pub mod tag_splitter;
pub mod wiki;

pub use comment::Comment;
pub use diagnostics::{CollectingReporter, Position, Reporter, StderrReporter};
pub use wiki::{Block, Body, Inline};

/// Parses one raw `/** ... */` comment into a [`Comment`].
///
/// `pos` is an opaque token forwarded verbatim to `reporter` for every
/// warning raised while parsing this comment; it is never inspected.
pub fn parse(raw: &str, pos: impl Into<Position>, reporter: &mut dyn Reporter) -> Comment {
    let pos = pos.into();
    let lines = line_cleaner::clean_lines(raw, pos, reporter);
    let split = tag_splitter::split(&lines);
    projector::project(split, pos, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_minimal_comment() {
        let mut reporter = CollectingReporter::default();
        let comment = parse("/** Hello. */", 1u32, &mut reporter);
        assert_eq!(
            comment.body,
            vec![Block::Paragraph(Inline::Text("Hello.".into()))]
        );
        assert_eq!(comment.short, Inline::Text("Hello".into()));
    }

    #[test]
    fn position_is_forwarded_verbatim_to_every_warning() {
        let mut reporter = CollectingReporter::default();
        let _ = parse("not a comment at all", 42u32, &mut reporter);
        assert!(reporter.warnings.iter().all(|(pos, _)| pos.0 == 42));
        assert!(!reporter.warnings.is_empty());
    }
}
