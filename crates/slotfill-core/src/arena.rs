//! Immutable, position-indexed view of the input text.
//!
//! The arena never changes after construction. Scanning and rewriting refer
//! to lines by index and to byte ranges within a line; the only place that
//! produces new text is [`PatchSet::apply`](crate::patch::PatchSet::apply).

/// One physical line of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 0-based position in the arena.
    pub index: usize,
    /// Byte offset of the first character in the source text.
    pub offset: usize,
    /// Line content without its terminator.
    pub text: &'a str,
    /// `"\n"`, `"\r\n"`, or `""` for a final unterminated line.
    pub terminator: &'a str,
}

impl<'a> Line<'a> {
    /// 1-based line number, for reports.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn indent(&self) -> &'a str {
        let n = self.text.len() - self.text.trim_start().len();
        &self.text[..n]
    }

    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LineArena<'a> {
    source: &'a str,
    lines: Vec<Line<'a>>,
}

impl<'a> LineArena<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut offset = 0usize;
        let mut rest = source;

        while !rest.is_empty() {
            let (body_len, term_len) = match rest.find('\n') {
                Some(nl) if nl > 0 && rest.as_bytes()[nl - 1] == b'\r' => (nl - 1, 2),
                Some(nl) => (nl, 1),
                None => (rest.len(), 0),
            };
            lines.push(Line {
                index: lines.len(),
                offset,
                text: &rest[..body_len],
                terminator: &rest[body_len..body_len + term_len],
            });
            let consumed = body_len + term_len;
            offset += consumed;
            rest = &rest[consumed..];
        }

        Self { source, lines }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line<'a>> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Terminator used for synthesized lines: the first one seen in the input.
    pub fn default_terminator(&self) -> &'a str {
        self.lines
            .iter()
            .map(|l| l.terminator)
            .find(|t| !t.is_empty())
            .unwrap_or("\n")
    }

    /// Concatenate the lines back into text. Equal to the source by construction.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        for line in &self.lines {
            out.push_str(line.text);
            out.push_str(line.terminator);
        }
        out
    }
}
