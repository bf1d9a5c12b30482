//! Best-effort markup scanner.
//!
//! Builds a [`PreviewDom`] from JSX/HTML-like source without parsing the
//! surrounding script. Only element structure and literal attribute values
//! are recovered; `{expression}` values are kept as raw text. Unbalanced
//! markup never fails, it just yields a flatter tree.

use super::dom::{NodeId, PreviewDom, ROOT};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

impl PreviewDom {
    /// Scans `source` for element tags and builds the corresponding tree.
    pub fn from_markup(source: &str) -> Self {
        let mut dom = PreviewDom::new();
        let mut scanner = Scanner {
            src: source,
            bytes: source.as_bytes(),
            pos: 0,
        };
        // stack of (tag, node)
        let mut open: Vec<(String, NodeId)> = Vec::new();

        while let Some(offset) = scanner.rest().find('<') {
            scanner.pos += offset + 1;
            match scanner.peek() {
                Some(b'/') => {
                    scanner.pos += 1;
                    let name = scanner.take_name();
                    scanner.skip_past(b'>');
                    if let Some(depth) = open.iter().rposition(|(tag, _)| *tag == name) {
                        open.truncate(depth);
                    }
                }
                Some(b'!') => {
                    if scanner.rest().starts_with("!--") {
                        match scanner.rest().find("-->") {
                            Some(end) => scanner.pos += end + 3,
                            None => scanner.pos = scanner.bytes.len(),
                        }
                    } else {
                        scanner.skip_past(b'>');
                    }
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    let tag = scanner.take_name();
                    let (attributes, self_closing) = scanner.take_attributes();
                    let parent = open.last().map(|(_, id)| *id).unwrap_or(ROOT);
                    let id = dom.append_child(parent, tag.clone(), attributes);
                    if !self_closing && !VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
                    {
                        open.push((tag, id));
                    }
                }
                // fragments, comparisons and other stray `<`
                _ => {}
            }
        }
        dom
    }
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        self.src.get(self.pos..).unwrap_or("")
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_past(&mut self, target: u8) {
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == target {
                return;
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if pred(c)) {
            self.pos += 1;
        }
        self.src.get(start..self.pos).unwrap_or("")
    }

    fn take_name(&mut self) -> String {
        self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b'.' | b':'))
            .to_string()
    }

    /// Reads attributes up to the end of the opening tag.
    fn take_attributes(&mut self) -> (Vec<(String, String)>, bool) {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return (attributes, false),
                Some(b'>') => {
                    self.pos += 1;
                    return (attributes, false);
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        return (attributes, true);
                    }
                }
                Some(b'{') => {
                    // spread props: {...rest}
                    self.take_braced();
                }
                Some(_) => {
                    let name = self
                        .take_while(|c| !c.is_ascii_whitespace() && !matches!(c, b'=' | b'>' | b'/'))
                        .to_string();
                    if name.is_empty() {
                        self.pos += 1;
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.take_value()
                    } else {
                        String::new()
                    };
                    attributes.push((name, value));
                }
            }
        }
    }

    fn take_value(&mut self) -> String {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let value = self.take_while(|c| c != quote).to_string();
                self.pos += 1;
                value
            }
            Some(b'{') => {
                let raw = self.take_braced();
                unwrap_string_literal(raw).unwrap_or(raw).to_string()
            }
            _ => self
                .take_while(|c| !c.is_ascii_whitespace() && c != b'>')
                .to_string(),
        }
    }

    /// Consumes a balanced `{...}` group, returning its inner text.
    fn take_braced(&mut self) -> &'a str {
        let start = self.pos + 1;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.src.get(start..self.pos - 1).unwrap_or("");
                    }
                }
                _ => {}
            }
        }
        self.src.get(start.min(self.pos)..).unwrap_or("")
    }
}

/// `{"el-1"}` and `{'el-1'}` are plain string values.
fn unwrap_string_literal(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    ['"', '\'', '`'].iter().find_map(|q| {
        trimmed
            .strip_prefix(*q)
            .and_then(|inner| inner.strip_suffix(*q))
    })
}
