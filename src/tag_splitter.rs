//! Pass 1b: walks the cleaned line list, tracks code-fence state, and
//! partitions the lines into the main body string and an ordered multimap
//! of tag occurrences.
//!
//! The fence and tag-start recognizers are line-level regexes, exactly as
//! called out as a safe translation target (see the design notes this
//! crate keeps in `DESIGN.md`). Everything else is a small line-at-a-time
//! state machine; lines can synthesize further lines (e.g. a single
//! physical line holding both trailing body text and an opening `{{{`
//! splits into two logical lines), so the driver keeps an explicit queue
//! rather than recursing on borrowed state.

use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Names recognized with a bound symbol, e.g. `@param x ...`. Also the
/// source of truth `symbol_tag_re` builds its alternation from, and what
/// `projector` reuses to keep its own symbol-tag handling in sync.
pub(crate) const SYMBOL_TAGS: &[&str] = &["param", "tparam", "throws"];

/// A tag's identity: either free-standing or bound to a symbol name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TagKey {
    Simple(String),
    Symbol { name: String, symbol: String },
}

impl TagKey {
    pub fn name(&self) -> &str {
        match self {
            TagKey::Simple(name) => name,
            TagKey::Symbol { name, .. } => name,
        }
    }
}

/// Output of the splitter: the body string (lines joined by `\n`) and every
/// tag occurrence in the order it was encountered. A tag written across
/// several continuation lines is already folded into one multi-line
/// string here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitResult {
    pub body: String,
    pub tags: Vec<(TagKey, String)>,
}

fn fence_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\{\{\{(.*)$").expect("static regex"))
}

fn fence_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\}\}\}(.*)$").expect("static regex"))
}

fn symbol_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = SYMBOL_TAGS.join("|");
        Regex::new(&format!(r"^\s*@({alternation})\s+(\S*)\s*(.*)$")).expect("static regex")
    })
}

fn simple_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*@(\S+)\s+(.*)$").expect("static regex"))
}

struct Splitter {
    queue: VecDeque<String>,
    body: String,
    tags: Vec<(TagKey, String)>,
    last_tag_key: Option<TagKey>,
    in_code_block: bool,
}

impl Splitter {
    /// Appends one logical line to `docBody`, using the cleaner's join
    /// convention (a line-separator before it, unless the body is still
    /// empty). Fence markers are pushed through this same path so the
    /// wiki parser sees `{{{`/`}}}` as ordinary characters in the stream.
    fn push_body_line(&mut self, line: &str) {
        if self.body.is_empty() {
            self.body.push_str(line);
        } else {
            self.body.push('\n');
            self.body.push_str(line);
        }
    }

    fn start_tag(&mut self, key: TagKey, content: &str) {
        self.tags.push((key.clone(), content.to_string()));
        self.last_tag_key = Some(key);
    }

    fn continue_tag(&mut self, line: &str) {
        let key = self
            .last_tag_key
            .as_ref()
            .expect("continuation line with no active tag key");
        let (last_key, last_value) = self
            .tags
            .last_mut()
            .expect("tag key recorded with no accumulated entries");
        assert_eq!(
            last_key, key,
            "continuation line did not target the most recent tag occurrence"
        );
        last_value.push('\n');
        last_value.push_str(line);
    }

    fn run(&mut self) {
        while let Some(line) = self.queue.pop_front() {
            self.process_line(&line);
        }
    }

    fn process_line(&mut self, line: &str) {
        if !self.in_code_block {
            if let Some(caps) = fence_open_re().captures(line) {
                let pre = caps.get(1).unwrap().as_str();
                let post = caps.get(2).unwrap().as_str().to_string();
                if !pre.trim().is_empty() {
                    self.queue.push_front(format!("{{{{{{{post}}}}}}}"));
                    self.queue.push_front(pre.to_string());
                    return;
                } else if !post.trim().is_empty() {
                    self.push_body_line("{{{");
                    self.in_code_block = true;
                    self.process_line(&post);
                    return;
                } else {
                    self.push_body_line("{{{");
                    self.in_code_block = true;
                    return;
                }
            }
        }

        // Rule 2 is evaluated unconditionally: opening context is already
        // excluded by rule 1's own guard, so this only ever fires as a
        // genuine close (or, rarely, on a stray `}}}` with no open fence).
        if let Some(caps) = fence_close_re().captures(line) {
            let pre = caps.get(1).unwrap().as_str();
            let post = caps.get(2).unwrap().as_str().to_string();
            if !pre.trim().is_empty() {
                self.queue.push_front(format!("}}}}}}{post}"));
                self.queue.push_front(pre.to_string());
                return;
            } else if !post.trim().is_empty() {
                self.push_body_line("}}}");
                self.in_code_block = false;
                self.process_line(&post);
                return;
            } else {
                self.push_body_line("}}}");
                self.in_code_block = false;
                return;
            }
        }

        if !self.in_code_block {
            if let Some(caps) = symbol_tag_re().captures(line) {
                let name = caps.get(1).unwrap().as_str().to_string();
                let symbol = caps.get(2).unwrap().as_str().to_string();
                let content = caps.get(3).unwrap().as_str();
                self.start_tag(TagKey::Symbol { name, symbol }, content);
                return;
            }

            if let Some(caps) = simple_tag_re().captures(line) {
                let name = caps.get(1).unwrap().as_str().to_string();
                let content = caps.get(2).unwrap().as_str();
                self.start_tag(TagKey::Simple(name), content);
                return;
            }
        }

        if self.last_tag_key.is_some() {
            self.continue_tag(line);
            return;
        }

        self.push_body_line(line);
    }
}

/// Splits cleaned lines into a body string and an ordered tag multimap.
///
/// Lines between a `{{{` and its matching `}}}` are always treated as body
/// continuation, even if they look like a tag line.
pub fn split(lines: &[String]) -> SplitResult {
    let mut s = Splitter {
        queue: lines.iter().cloned().collect(),
        body: String::new(),
        tags: Vec::new(),
        last_tag_key: None,
        in_code_block: false,
    };
    s.run();
    SplitResult {
        body: s.body,
        tags: s.tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[&str]) -> SplitResult {
        let owned: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        split(&owned)
    }

    #[test]
    fn body_and_simple_tags() {
        let r = run(&["Greets the user.", "@author Alice", "@return the greeting"]);
        assert_eq!(r.body, "Greets the user.");
        assert_eq!(
            r.tags,
            vec![
                (TagKey::Simple("author".into()), "Alice".to_string()),
                (TagKey::Simple("return".into()), "the greeting".to_string()),
            ]
        );
    }

    #[test]
    fn code_fence_hides_tags_but_keeps_markers_in_body() {
        let r = run(&["Example.", "{{{", "@param not a tag", "}}}"]);
        assert_eq!(r.body, "Example.\n{{{\n@param not a tag\n}}}");
        assert!(r.tags.is_empty());
    }

    #[test]
    fn symbol_tag_multiline_continuation() {
        let r = run(&["Doc.", "@param x the", "first parameter", "@param y second"]);
        assert_eq!(
            r.tags,
            vec![
                (
                    TagKey::Symbol { name: "param".into(), symbol: "x".into() },
                    "the\nfirst parameter".to_string()
                ),
                (
                    TagKey::Symbol { name: "param".into(), symbol: "y".into() },
                    "second".to_string()
                ),
            ]
        );
    }

    #[test]
    fn fence_open_sharing_a_line_with_preceding_body_text() {
        let r = run(&["before {{{ after", "}}}"]);
        assert_eq!(r.body, "before\n{{{\nafter\n}}}");
    }

    #[test]
    fn fence_open_and_close_on_one_line() {
        let r = run(&["{{{ inline }}}"]);
        assert_eq!(r.body, "{{{\ninline\n}}}");
    }
}
