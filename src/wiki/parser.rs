//! Pass 2: a recursive-descent parser that turns one cleaned body or tag
//! string into a [`Body`](super::ast::Body). `CharReader` owns the mutable
//! cursor; this module only ever calls `check` before a destructive
//! `jump`, never the reverse.

use crate::diagnostics::{Position, Reporter};
use crate::reader::{CharReader, END_OF_LINE, END_OF_TEXT};
use crate::wiki::ast::{merge_chain, Block, Body, Inline};

/// Bounds list/style nesting so a pathological input can't blow the stack.
/// Grammar-wise nesting is bounded by indentation levels or marker
/// balance, which for any real comment stays tiny; this is a backstop.
const MAX_NEST_DEPTH: u32 = 64;

struct WikiParser<'a> {
    reader: CharReader,
    pos: Position,
    reporter: &'a mut dyn Reporter,
    depth: u32,
}

type Pred<'p> = &'p dyn Fn(&CharReader) -> bool;

fn starts_style_marker(r: &CharReader) -> bool {
    r.check("'''")
        || r.check("''")
        || r.check("__")
        || r.check("`")
        || r.check("^")
        || r.check(",,")
        || r.check("[[")
}

fn is_paragraph_block_end(r: &CharReader) -> bool {
    r.check("\n\n")
        || r.check("\n{{{")
        || r.check("\n=")
        || r.check("\n - ")
        || r.check("\n 1 ")
        // a lone trailing newline with nothing after it ends the paragraph
        // too - without this, the very last line's line-ending would be
        // swallowed into the paragraph's own text instead of being left
        // for `block_ended` to consume.
        || (r.current() == END_OF_LINE && r.peek_at(1) == END_OF_TEXT)
}

fn is_line_end(r: &CharReader) -> bool {
    r.current() == END_OF_LINE
}

fn never(_: &CharReader) -> bool {
    false
}

impl<'a> WikiParser<'a> {
    fn warn(&mut self, message: impl Into<String>) {
        self.reporter.warning(self.pos, message.into());
    }

    fn document(&mut self) -> Body {
        let mut blocks = Vec::new();
        self.reader.repeat_jump("\n", None);
        while !self.reader.at_end() {
            blocks.push(self.block());
        }
        blocks
    }

    fn block(&mut self) -> Block {
        if self.reader.check("{{{") {
            self.code_block()
        } else if self.reader.current() == '=' {
            self.title()
        } else if self.reader.check("----") {
            self.hrule()
        } else if let Some(indent) = self.list_indent('-') {
            self.list_block(indent, '-')
        } else if let Some(indent) = self.list_indent('1') {
            self.list_block(indent, '1')
        } else {
            self.paragraph()
        }
    }

    fn list_indent(&self, marker: char) -> Option<usize> {
        let indent = self.reader.count_whitespace();
        if self.reader.peek_at(indent) == marker && self.reader.peek_at(indent + 1) == ' ' {
            Some(indent)
        } else {
            None
        }
    }

    /// After each block's terminating construct, either a line-end or
    /// end-of-text is expected; anything else is layout garbage.
    fn block_ended(&mut self, label: &str) {
        let cur = self.reader.current();
        if cur != END_OF_LINE && cur != END_OF_TEXT {
            self.warn(format!("no additional content on same line after {label}"));
            self.reader.jump_until(|r| r.current() == END_OF_LINE || r.at_end());
        }
        self.reader.repeat_jump("\n", None);
    }

    fn consume_trailing_blank_lines(&mut self) {
        self.reader.repeat_jump("\n", None);
    }

    fn code_block(&mut self) -> Block {
        self.reader.jump("{{{");
        self.reader.read_until(|r| r.check("}}}"));
        let content = self.reader.get_read();
        if self.reader.at_end() {
            self.warn("unclosed code block");
        } else {
            self.reader.jump("}}}");
        }
        self.block_ended("code block");
        Block::Code(content)
    }

    fn title(&mut self) -> Block {
        let open_level = self.reader.repeat_jump("=", None) as u32;
        let inline = self.inline(&|r: &CharReader| r.current() == '=', &is_line_end);
        let close_level = self.reader.repeat_jump("=", None) as u32;
        if close_level != open_level {
            self.warn("unbalanced or unclosed heading");
        }
        self.block_ended("title");
        Block::Title(inline, open_level.max(1))
    }

    fn hrule(&mut self) -> Block {
        self.reader.repeat_jump("-", None);
        self.block_ended("horizontal rule");
        Block::HorizontalRule
    }

    fn list_block(&mut self, indent: usize, marker: char) -> Block {
        if self.depth >= MAX_NEST_DEPTH {
            self.warn("maximum list nesting depth exceeded");
            return match marker {
                '-' => Block::UnorderedList(Vec::new()),
                _ => Block::OrderedList(Vec::new()),
            };
        }
        self.depth += 1;

        let mut items = Vec::new();
        loop {
            self.consume_list_prefix(indent, marker);
            let item_inline = self.inline(&is_line_end, &is_line_end);
            items.push(Block::Paragraph(item_inline));
            self.reader.checked_jump("\n");

            let next_indent = self.reader.count_whitespace();
            if next_indent > indent {
                match self.marker_at(next_indent) {
                    Some(nested_marker) => items.push(self.list_block(next_indent, nested_marker)),
                    None => break,
                }
            }

            if self.marker_at(indent) == Some(marker) {
                continue;
            }
            break;
        }
        self.consume_trailing_blank_lines();
        self.depth -= 1;

        match marker {
            '-' => Block::UnorderedList(items),
            _ => Block::OrderedList(items),
        }
    }

    fn consume_list_prefix(&mut self, indent: usize, marker: char) {
        let prefix = format!("{}{} ", " ".repeat(indent), marker);
        self.reader.jump(&prefix);
    }

    fn marker_at(&self, indent: usize) -> Option<char> {
        if self.reader.peek_at(indent) == '-' && self.reader.peek_at(indent + 1) == ' ' {
            Some('-')
        } else if self.reader.peek_at(indent) == '1' && self.reader.peek_at(indent + 1) == ' ' {
            Some('1')
        } else {
            None
        }
    }

    fn paragraph(&mut self) -> Block {
        let inline = self.inline(&never, &is_paragraph_block_end);
        self.block_ended("paragraph");
        Block::Paragraph(inline)
    }

    fn inline(&mut self, is_inline_end: Pred, is_block_end: Pred) -> Inline {
        let mut parts = Vec::new();
        while !self.reader.at_end() && !is_inline_end(&self.reader) && !is_block_end(&self.reader) {
            parts.push(self.inline0(is_inline_end, is_block_end));
        }
        merge_chain(parts)
    }

    fn inline0(&mut self, is_inline_end: Pred, is_block_end: Pred) -> Inline {
        if self.reader.check("'''") {
            self.styled("'''", Inline::Bold, is_block_end, "bold")
        } else if self.reader.check("''") {
            self.styled("''", Inline::Italic, is_block_end, "italic")
        } else if self.reader.check("__") {
            self.styled("__", Inline::Underline, is_block_end, "underline")
        } else if self.reader.check("`") {
            self.monospace()
        } else if self.reader.check("^") {
            self.styled("^", Inline::Superscript, is_block_end, "superscript")
        } else if self.reader.check(",,") {
            self.styled(",,", Inline::Subscript, is_block_end, "subscript")
        } else if self.reader.check("[[") {
            self.link()
        } else {
            self.text_run(is_inline_end, is_block_end)
        }
    }

    fn text_run(&mut self, is_inline_end: Pred, is_block_end: Pred) -> Inline {
        self.reader.read_until(|r| {
            is_inline_end(r) || is_block_end(r) || starts_style_marker(r)
        });
        Inline::Text(self.reader.get_read())
    }

    fn styled(
        &mut self,
        marker: &str,
        ctor: fn(Box<Inline>) -> Inline,
        outer_is_block_end: Pred,
        label: &str,
    ) -> Inline {
        if self.depth >= MAX_NEST_DEPTH {
            self.warn("maximum style nesting depth exceeded");
            self.reader.jump(marker);
            return Inline::Text(String::new());
        }
        self.depth += 1;
        self.reader.jump(marker);
        let is_close = |r: &CharReader| r.check(marker);
        let inner = self.inline(&is_close, outer_is_block_end);
        if !self.reader.checked_jump(marker) {
            self.warn(format!("unclosed {label} span"));
        }
        self.depth -= 1;
        ctor(Box::new(inner))
    }

    fn monospace(&mut self) -> Inline {
        self.reader.jump("`");
        self.reader.read_until(|r| r.check("`"));
        let content = self.reader.get_read();
        if !self.reader.checked_jump("`") {
            self.warn("unclosed monospace span");
        }
        Inline::Monospace(content)
    }

    fn link(&mut self) -> Inline {
        self.reader.jump("[[");
        self.reader.read_until(|r| r.check("]]"));
        let content = self.reader.get_read();
        if !self.reader.checked_jump("]]") {
            self.warn("unclosed link");
        }
        let (target, title) = split_link(&content);
        Inline::Link { target, title }
    }
}

fn split_link(content: &str) -> (String, Option<String>) {
    match content.find(' ') {
        None => (content.trim().to_string(), None),
        Some(0) => (content.trim().to_string(), None),
        Some(idx) => {
            let (target, rest) = content.split_at(idx);
            (target.trim().to_string(), Some(rest[1..].trim().to_string()))
        }
    }
}

/// Parses one wiki-markup string (a comment's main body, or a single tag's
/// raw value) into a [`Body`].
pub fn parse_body(text: &str, pos: Position, reporter: &mut dyn Reporter) -> Body {
    let mut parser = WikiParser {
        reader: CharReader::new(text),
        pos,
        reporter,
        depth: 0,
    };
    parser.document()
}
