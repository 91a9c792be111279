//! Tolerant streaming tag tokenizer for SFC documents.
//!
//! Fires ordered open-tag, text, and close-tag events with byte offsets
//! into the original document. The tokenizer never fails: malformed
//! markup degrades to best-effort events. Script and style bodies are
//! scanned as raw text up to the matching close tag, so `<` inside a
//! script block stays text. At end of input a close event is emitted
//! for every tag still open, innermost first.

use std::collections::VecDeque;

/// One attribute on an open tag. Attributes without a value carry the
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// A single tag event. All offsets are byte offsets into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent<'a> {
    /// An opening tag; `start` is the offset of the `<`. A self-closing
    /// tag is followed immediately by its `Close` event.
    Open {
        name: &'a str,
        attributes: Vec<Attribute<'a>>,
        start: usize,
    },
    /// A run of text; `data` is the verbatim `start..end` slice of the
    /// document. Empty runs are never emitted.
    Text {
        data: &'a str,
        start: usize,
        end: usize,
    },
    /// A closing tag. Names are not verified against open tags.
    Close { name: &'a str },
}

/// Elements whose content is scanned as raw text up to the matching
/// close tag, with no markup interpretation inside.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Streaming tokenizer over a single document.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    pending: VecDeque<TagEvent<'a>>,
    open_stack: Vec<&'a str>,
    raw_text: Option<&'a str>,
    recognize_self_closing: bool,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::with_self_closing(input, true)
    }

    /// `recognize_self_closing` controls whether `/>` produces an
    /// immediate open+close pair; when off the slash is ignored and the
    /// tag is an ordinary open.
    #[must_use]
    pub fn with_self_closing(input: &'a str, recognize_self_closing: bool) -> Self {
        Self {
            input,
            pos: 0,
            pending: VecDeque::new(),
            open_stack: Vec::new(),
            raw_text: None,
            recognize_self_closing,
            finished: false,
        }
    }

    /// Scan forward from the current position and queue the next
    /// event(s). Declarations and comments queue nothing.
    fn scan(&mut self) {
        if self.pos >= self.input.len() {
            self.finish_input();
            return;
        }
        if let Some(name) = self.raw_text {
            self.scan_raw_text(name);
            return;
        }

        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start;
        while i < bytes.len() {
            if bytes[i] == b'<' && is_markup_start(bytes, i) {
                break;
            }
            i += 1;
        }
        if i > start {
            self.pending.push_back(TagEvent::Text {
                data: &self.input[start..i],
                start,
                end: i,
            });
            self.pos = i;
            return;
        }

        match bytes.get(i + 1) {
            Some(b'/') => self.scan_close_tag(),
            Some(b'!' | b'?') => self.skip_declaration(),
            _ => self.scan_open_tag(),
        }
    }

    /// Emit implied closes for tags still open at end of input.
    fn finish_input(&mut self) {
        self.finished = true;
        while let Some(name) = self.open_stack.pop() {
            self.pending.push_back(TagEvent::Close { name });
        }
    }

    /// Scan the raw-text body of a script/style element up to its
    /// case-insensitive close tag, or to end of input.
    fn scan_raw_text(&mut self, name: &'a str) {
        let start = self.pos;
        if let Some(idx) = find_close_tag(self.input, start, name) {
            if idx > start {
                self.pending.push_back(TagEvent::Text {
                    data: &self.input[start..idx],
                    start,
                    end: idx,
                });
            }
            self.raw_text = None;
            self.pos = idx;
            self.scan_close_tag();
        } else {
            if start < self.input.len() {
                self.pending.push_back(TagEvent::Text {
                    data: &self.input[start..],
                    start,
                    end: self.input.len(),
                });
            }
            self.raw_text = None;
            self.pos = self.input.len();
        }
    }

    /// Parse `</name ...>` at the current position.
    fn scan_close_tag(&mut self) {
        let bytes = self.input.as_bytes();
        let name_start = self.pos + 2;
        let mut i = name_start.min(bytes.len());
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
            i += 1;
        }
        let name = &self.input[name_start.min(i)..i];
        while i < bytes.len() && bytes[i] != b'>' {
            i += 1;
        }
        self.pos = (i + 1).min(self.input.len());
        self.open_stack.pop();
        self.pending.push_back(TagEvent::Close { name });
    }

    /// Skip comments, doctype declarations, and processing
    /// instructions. No events are produced for them; the skipped
    /// range is simply never covered by a text event.
    fn skip_declaration(&mut self) {
        let rest = &self.input[self.pos..];
        let end = if rest.starts_with("<!--") {
            rest.find("-->").map(|idx| self.pos + idx + 3)
        } else {
            rest.find('>').map(|idx| self.pos + idx + 1)
        };
        self.pos = end.unwrap_or(self.input.len());
    }

    /// Parse `<name attr=value ...>` at the current position.
    fn scan_open_tag(&mut self) {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let name_start = start + 1;
        let mut i = name_start;
        while i < bytes.len() && !is_tag_name_end(bytes[i]) {
            i += 1;
        }
        let name = &self.input[name_start..i];

        let mut attributes = Vec::new();
        let mut self_closing = false;
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                None => break,
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') => {
                    if bytes.get(i + 1) == Some(&b'>') {
                        self_closing = true;
                        i += 2;
                        break;
                    }
                    i += 1;
                }
                Some(_) => {
                    let (attribute, next) = self.scan_attribute(i);
                    attributes.push(attribute);
                    i = next;
                }
            }
        }

        self.pos = i;
        self.pending.push_back(TagEvent::Open {
            name,
            attributes,
            start,
        });

        if self_closing && self.recognize_self_closing {
            self.pending.push_back(TagEvent::Close { name });
        } else {
            self.open_stack.push(name);
            if RAW_TEXT_ELEMENTS
                .iter()
                .any(|element| name.eq_ignore_ascii_case(element))
            {
                self.raw_text = Some(name);
            }
        }
    }

    /// Parse one `name`, `name=value`, `name="value"`, or `name='value'`
    /// attribute. Returns the attribute and the position after it.
    fn scan_attribute(&self, from: usize) -> (Attribute<'a>, usize) {
        let bytes = self.input.as_bytes();
        let name_start = from;
        let mut i = from;
        while i < bytes.len() && !is_attr_name_end(bytes[i]) {
            i += 1;
        }
        let name = &self.input[name_start..i];

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            return (Attribute { name, value: "" }, i);
        }
        i = j + 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                let value = &self.input[value_start..i];
                if i < bytes.len() {
                    i += 1;
                }
                (Attribute { name, value }, i)
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                let value = &self.input[value_start..i];
                (Attribute { name, value }, i)
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = TagEvent<'a>;

    fn next(&mut self) -> Option<TagEvent<'a>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.finished {
                return None;
            }
            self.scan();
        }
    }
}

/// A `<` starts markup only when followed by `/`, `!`, `?`, or an
/// ASCII letter; any other `<` is ordinary text.
fn is_markup_start(bytes: &[u8], lt: usize) -> bool {
    match bytes.get(lt + 1) {
        Some(b'/' | b'!' | b'?') => true,
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

fn is_tag_name_end(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'/' || byte == b'>'
}

fn is_attr_name_end(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'=' || byte == b'/' || byte == b'>'
}

/// Find the case-insensitive `</name` close tag at or after `from`.
/// The name must be followed by whitespace, `/`, `>`, or end of input.
fn find_close_tag(input: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'<' && bytes.get(i + 1) == Some(&b'/') {
            let name_start = i + 2;
            let name_end = name_start + name.len();
            if name_end <= bytes.len()
                && input[name_start..name_end].eq_ignore_ascii_case(name)
                && bytes
                    .get(name_end)
                    .map_or(true, |c| c.is_ascii_whitespace() || *c == b'>' || *c == b'/')
            {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}
