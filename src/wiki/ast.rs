//! The closed block/inline AST produced by the wiki parser.
//!
//! Both `Block` and `Inline` are sealed sum types, matching how this repo's
//! other AST modules model syntax: exhaustive matches on these are relied on
//! by every downstream consumer, so new variants are never added casually.

use serde::{Deserialize, Serialize};

/// An ordered sequence of blocks; the content form of any parsed wiki string.
pub type Body = Vec<Block>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Inline),
    /// `level` is always >= 1 and equals the number of `=` characters the
    /// title was opened with.
    Title(Inline, u32),
    /// Raw, unparsed text captured between `{{{` and `}}}`.
    Code(String),
    HorizontalRule,
    UnorderedList(Vec<Block>),
    OrderedList(Vec<Block>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    /// A run of sibling inlines. Never holds 0 or 1 elements — the parser
    /// collapses those to `Text("")` or the sole element on construction.
    Chain(Vec<Inline>),
    Bold(Box<Inline>),
    Italic(Box<Inline>),
    Underline(Box<Inline>),
    /// Raw text between backticks; no nested inline recognition.
    Monospace(String),
    Superscript(Box<Inline>),
    Subscript(Box<Inline>),
    Link {
        target: String,
        title: Option<String>,
    },
}

/// Folds a freshly-built run of inline fragments into the invariant shape:
/// no singleton or empty `Chain`, and adjacent `Text` fragments merged with
/// a line-separator between them.
pub fn merge_chain(mut parts: Vec<Inline>) -> Inline {
    let mut merged: Vec<Inline> = Vec::with_capacity(parts.len());
    for part in parts.drain(..) {
        match (merged.last_mut(), &part) {
            (Some(Inline::Text(prev)), Inline::Text(next)) => {
                prev.push('\n');
                prev.push_str(next);
            }
            _ => merged.push(part),
        }
    }
    match merged.len() {
        0 => Inline::Text(String::new()),
        1 => merged.into_iter().next().unwrap(),
        _ => Inline::Chain(merged),
    }
}
