//! Pass 3: turns a tag splitter's `(body, tag occurrences)` pair into the
//! final [`Comment`] — wiki-parsing every raw string once, and projecting
//! each recognized tag name into its named field.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::comment::Comment;
use crate::diagnostics::{Position, Reporter};
use crate::tag_splitter::{SplitResult, TagKey, SYMBOL_TAGS};
use crate::wiki::ast::{Block, Inline};
use crate::wiki::parser::parse_body;

/// Recognized singleton kinds: at most one wins, any extras warn.
const ONE_TAGS: &[&str] = &["return", "version", "since", "deprecated"];
/// Recognized multi-valued kinds: every occurrence survives, in order.
const MANY_TAGS: &[&str] = &["author", "see", "todo", "note", "example"];
/// Recognized symbol-keyed kinds — the same names `tag_splitter`'s regex
/// is built from, so a name can't be added to one table without the other.
const SYM_TAGS: &[&str] = SYMBOL_TAGS;

fn short_line_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.|</?.*>").expect("static regex"))
}

// Kept exactly as described, greedy `.*` included: on a prefix with more
// than one HTML-ish tag this over-matches and strips too much. That's the
// same "oddity" `ShortLineEnd` has below, not a bug to quietly fix.
fn clean_html_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</?(p|h\d|pre|dl|dt|dd|ol|ul|li|blockquote|div|hr|br|br).*/?>")
            .expect("static regex")
    })
}

/// A tag-name's accumulated occurrences, grouped and ordered by first
/// appearance — the append-then-keep-first convention this crate picked
/// for the prepend/`.head` ambiguity in the original description.
struct TagTable {
    entries: Vec<(TagKey, Vec<String>)>,
}

impl TagTable {
    fn from_split(tags: Vec<(TagKey, String)>) -> Self {
        let mut entries: Vec<(TagKey, Vec<String>)> = Vec::new();
        for (key, value) in tags {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(value),
                None => entries.push((key, vec![value])),
            }
        }
        Self { entries }
    }

    fn take_simple(&mut self, name: &str) -> Option<Vec<String>> {
        let idx = self
            .entries
            .iter()
            .position(|(k, _)| matches!(k, TagKey::Simple(n) if n == name))?;
        Some(self.entries.remove(idx).1)
    }

    fn take_all_symbols(&mut self, name: &str) -> Vec<(String, Vec<String>)> {
        let mut out = Vec::new();
        let mut idx = 0;
        while idx < self.entries.len() {
            let matches = matches!(&self.entries[idx].0, TagKey::Symbol { name: n, .. } if n == name);
            if matches {
                let (key, values) = self.entries.remove(idx);
                let symbol = match key {
                    TagKey::Symbol { symbol, .. } => symbol,
                    TagKey::Simple(_) => unreachable!("filtered to Symbol above"),
                };
                out.push((symbol, values));
            } else {
                idx += 1;
            }
        }
        out
    }
}

fn project_one(
    table: &mut TagTable,
    name: &str,
    pos: Position,
    reporter: &mut dyn Reporter,
) -> Option<Vec<Block>> {
    let values = table.take_simple(name)?;
    if values.len() > 1 {
        reporter.warning(pos, format!("Only one '@{name}' tag is allowed"));
    }
    Some(parse_body(&values[0], pos, reporter))
}

fn project_many(
    table: &mut TagTable,
    name: &str,
    pos: Position,
    reporter: &mut dyn Reporter,
) -> Vec<Vec<Block>> {
    table
        .take_simple(name)
        .unwrap_or_default()
        .iter()
        .map(|v| parse_body(v, pos, reporter))
        .collect()
}

fn project_symbols(
    table: &mut TagTable,
    name: &str,
    pos: Position,
    reporter: &mut dyn Reporter,
) -> BTreeMap<String, Vec<Block>> {
    // Defensive: in principle a SimpleTagKey with this name could reach us
    // (if some upstream ever produces one), meaning the tag was written
    // without a symbol name. With the splitter's own regexes this never
    // happens — the symbol-tag pattern always wins first for these names —
    // but the warning is cheap to keep for literal fidelity.
    if let Some(values) = table.take_simple(name) {
        for _ in values {
            reporter.warning(pos, format!("Tag '@{name}' must be followed by a symbol name"));
        }
    }

    let mut out = BTreeMap::new();
    for (symbol, values) in table.take_all_symbols(name) {
        if values.len() > 1 {
            reporter.warning(
                pos,
                format!("Only one '@{name}' tag for symbol {symbol} is allowed"),
            );
        }
        out.insert(symbol, parse_body(&values[0], pos, reporter));
    }
    out
}

fn compute_short(body_text: &str, pos: Position, reporter: &mut dyn Reporter) -> Inline {
    let prefix = match short_line_end_re().find(body_text) {
        Some(m) => &body_text[..m.start()],
        None => body_text,
    };
    let cleaned = clean_html_re().replace_all(prefix, "").into_owned();
    let short_body = parse_body(&cleaned, pos, reporter);
    match short_body.into_iter().next() {
        Some(Block::Paragraph(inline)) => inline,
        _ => {
            if !cleaned.trim().is_empty() {
                reporter.warning(pos, "Comment must start with a sentence".to_string());
            }
            Inline::Text(String::new())
        }
    }
}

/// Builds the final [`Comment`] from a tag splitter's output.
pub fn project(split: SplitResult, pos: Position, reporter: &mut dyn Reporter) -> Comment {
    let body = parse_body(&split.body, pos, reporter);
    let short = compute_short(&split.body, pos, reporter);

    let mut table = TagTable::from_split(split.tags);

    let mut many: HashMap<&str, Vec<Vec<Block>>> = HashMap::new();
    for &name in MANY_TAGS {
        let projected = project_many(&mut table, name, pos, reporter);
        many.insert(name, projected);
    }
    let mut one: HashMap<&str, Option<Vec<Block>>> = HashMap::new();
    for &name in ONE_TAGS {
        let projected = project_one(&mut table, name, pos, reporter);
        one.insert(name, projected);
    }
    let mut sym: HashMap<&str, BTreeMap<String, Vec<Block>>> = HashMap::new();
    for &name in SYM_TAGS {
        let projected = project_symbols(&mut table, name, pos, reporter);
        sym.insert(name, projected);
    }

    for (key, _) in &table.entries {
        reporter.warning(pos, format!("Tag '@{}' is not recognised", key.name()));
    }

    Comment {
        body,
        short,
        authors: many.remove("author").unwrap_or_default(),
        see: many.remove("see").unwrap_or_default(),
        todo: many.remove("todo").unwrap_or_default(),
        note: many.remove("note").unwrap_or_default(),
        example: many.remove("example").unwrap_or_default(),
        result: one.remove("return").unwrap_or_default(),
        version: one.remove("version").unwrap_or_default(),
        since: one.remove("since").unwrap_or_default(),
        deprecated: one.remove("deprecated").unwrap_or_default(),
        throws: sym.remove("throws").unwrap_or_default(),
        value_params: sym.remove("param").unwrap_or_default(),
        type_params: sym.remove("tparam").unwrap_or_default(),
    }
}
