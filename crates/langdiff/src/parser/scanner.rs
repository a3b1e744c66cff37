//! Incremental partial-JSON scanner.
//!
//! Consumes character chunks and maintains the current partial value as an
//! in-place `serde_json::Value` tree. The exposed tree is monotone: every
//! key and index present in one observation is present in the next, and a
//! string leaf only ever grows by suffix. Trailing unfinished strings are
//! exposed as their decoded prefix; unfinished containers as their known
//! members.
//!
//! Exposure rules that keep observations non-speculative:
//! - containers appear at their opening brace;
//! - a string leaf appears once its first character has decoded, or at its
//!   closing quote (covering `""`);
//! - numbers and literals commit only when a terminating character proves
//!   them finished;
//! - object keys are buffered whole and never exposed half-lexed;
//! - escape sequences are buffered until they decode unambiguously (a high
//!   surrogate additionally waits for its partner).

use serde_json::{Map, Number, Value};

use crate::error::StreamError;

/// Whether the root value is still growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Partial,
    Completed,
}

enum Frame {
    Object { pending_key: Option<String> },
    Array,
}

/// One step of the route from the root to the innermost open container.
enum Crumb {
    Key(String),
    Index(usize),
}

/// Where the next value lands.
enum Site {
    Root,
    Key(String),
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a value (document start, after `:`, `[` or `,` in an
    /// array).
    Value,
    /// Inside a container, after a finished value.
    AfterValue,
    /// Inside an object, expecting a key or `}`.
    BeforeKey,
    /// Inside a key string.
    Key,
    /// After a key, expecting `:`.
    AfterKey,
    /// Inside a string value.
    Str,
    Number,
    Literal,
    /// Root value finished; only whitespace may follow.
    End,
}

pub struct Scanner {
    root: Option<Value>,
    frames: Vec<Frame>,
    crumbs: Vec<Crumb>,
    state: State,
    str_exposed: bool,
    escape: String,
    high_surrogate: Option<u16>,
    key_buf: String,
    num_buf: String,
    lit_buf: String,
    pos: u64,
    dirty: bool,
}

fn is_json_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            root: None,
            frames: Vec::new(),
            crumbs: Vec::new(),
            state: State::Value,
            str_exposed: false,
            escape: String::new(),
            high_surrogate: None,
            key_buf: String::new(),
            num_buf: String::new(),
            lit_buf: String::new(),
            pos: 0,
            dirty: false,
        }
    }

    /// The current partial value, once anything has been exposed.
    pub fn view(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    pub fn status(&self) -> ScanStatus {
        if self.state == State::End {
            ScanStatus::Completed
        } else {
            ScanStatus::Partial
        }
    }

    /// True if the observable tree changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Consume a chunk of characters.
    pub fn push(&mut self, chunk: &str) -> Result<(), StreamError> {
        for ch in chunk.chars() {
            self.feed_char(ch)?;
            self.pos += 1;
        }
        Ok(())
    }

    /// End of input. Commits a trailing number if it parses; anything else
    /// left open simply stays at its current partial.
    pub fn finish(&mut self) {
        if self.state == State::Number {
            let _ = self.commit_number();
            self.num_buf.clear();
        }
    }

    fn syntax(&self, ch: char) -> StreamError {
        StreamError::Syntax { pos: self.pos, ch }
    }

    fn feed_char(&mut self, ch: char) -> Result<(), StreamError> {
        match self.state {
            State::Value => self.value_char(ch),
            State::AfterValue => self.after_value_char(ch),
            State::BeforeKey => self.before_key_char(ch),
            State::Key => self.string_char(ch, true),
            State::AfterKey => self.after_key_char(ch),
            State::Str => self.string_char(ch, false),
            State::Number => self.number_char(ch),
            State::Literal => self.literal_char(ch),
            State::End => self.end_char(ch),
        }
    }

    // ── Structural states ─────────────────────────────────────────────────

    fn value_char(&mut self, ch: char) -> Result<(), StreamError> {
        match ch {
            c if is_json_whitespace(c) => Ok(()),
            '{' => {
                self.open_container(Value::Object(Map::new()));
                self.frames.push(Frame::Object { pending_key: None });
                self.state = State::BeforeKey;
                Ok(())
            }
            '[' => {
                self.open_container(Value::Array(Vec::new()));
                self.frames.push(Frame::Array);
                self.state = State::Value;
                Ok(())
            }
            '"' => {
                self.str_exposed = false;
                self.state = State::Str;
                Ok(())
            }
            '-' | '0'..='9' => {
                self.num_buf.clear();
                self.num_buf.push(ch);
                self.state = State::Number;
                Ok(())
            }
            't' | 'f' | 'n' => {
                self.lit_buf.clear();
                self.lit_buf.push(ch);
                self.state = State::Literal;
                Ok(())
            }
            ']' => {
                // Only an empty array may close from here.
                let empty = matches!(self.frames.last(), Some(Frame::Array))
                    && self
                        .top_container()
                        .and_then(Value::as_array)
                        .is_some_and(Vec::is_empty);
                if empty {
                    self.close_container();
                    Ok(())
                } else {
                    Err(self.syntax(ch))
                }
            }
            other => Err(self.syntax(other)),
        }
    }

    fn after_value_char(&mut self, ch: char) -> Result<(), StreamError> {
        match ch {
            c if is_json_whitespace(c) => Ok(()),
            ',' => {
                match self.frames.last() {
                    Some(Frame::Object { .. }) => self.state = State::BeforeKey,
                    Some(Frame::Array) => self.state = State::Value,
                    None => return Err(self.syntax(ch)),
                }
                Ok(())
            }
            '}' if matches!(self.frames.last(), Some(Frame::Object { .. })) => {
                self.close_container();
                Ok(())
            }
            ']' if matches!(self.frames.last(), Some(Frame::Array)) => {
                self.close_container();
                Ok(())
            }
            other => Err(self.syntax(other)),
        }
    }

    fn before_key_char(&mut self, ch: char) -> Result<(), StreamError> {
        match ch {
            c if is_json_whitespace(c) => Ok(()),
            '"' => {
                self.key_buf.clear();
                self.state = State::Key;
                Ok(())
            }
            '}' => {
                // Only an empty object may close from here.
                let empty = self
                    .top_container()
                    .and_then(Value::as_object)
                    .is_some_and(Map::is_empty);
                if empty {
                    self.close_container();
                    Ok(())
                } else {
                    Err(self.syntax(ch))
                }
            }
            other => Err(self.syntax(other)),
        }
    }

    fn after_key_char(&mut self, ch: char) -> Result<(), StreamError> {
        match ch {
            c if is_json_whitespace(c) => Ok(()),
            ':' => {
                self.state = State::Value;
                Ok(())
            }
            other => Err(self.syntax(other)),
        }
    }

    fn end_char(&mut self, ch: char) -> Result<(), StreamError> {
        if is_json_whitespace(ch) {
            Ok(())
        } else {
            Err(StreamError::TrailingInput { pos: self.pos })
        }
    }

    // ── Strings and escapes ───────────────────────────────────────────────

    fn string_char(&mut self, ch: char, is_key: bool) -> Result<(), StreamError> {
        if !self.escape.is_empty() {
            return self.escape_char(ch, is_key);
        }
        match ch {
            '\\' => {
                self.escape.push('\\');
                Ok(())
            }
            '"' => {
                self.flush_orphan_surrogate(is_key);
                if is_key {
                    self.finish_key()
                } else {
                    self.finish_string_value();
                    Ok(())
                }
            }
            c if (c as u32) < 0x20 => Err(self.syntax(c)),
            c => {
                self.flush_orphan_surrogate(is_key);
                self.emit_char(c, is_key);
                Ok(())
            }
        }
    }

    fn escape_char(&mut self, ch: char, is_key: bool) -> Result<(), StreamError> {
        self.escape.push(ch);
        if self.escape.len() == 2 {
            let decoded = match ch {
                'u' => return Ok(()),
                '"' => '"',
                '\\' => '\\',
                '/' => '/',
                'b' => '\u{0008}',
                'f' => '\u{000C}',
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => return Err(self.syntax(other)),
            };
            self.escape.clear();
            self.flush_orphan_surrogate(is_key);
            self.emit_char(decoded, is_key);
            return Ok(());
        }
        // "\u" escape: four hex digits follow.
        if !ch.is_ascii_hexdigit() {
            return Err(self.syntax(ch));
        }
        if self.escape.len() < 6 {
            return Ok(());
        }
        let code = u32::from_str_radix(&self.escape[2..6], 16).map_err(|_| self.syntax(ch))?;
        self.escape.clear();
        match code {
            0xD800..=0xDBFF => {
                // High surrogate: hold it until the partner arrives. A
                // previous unpaired high surrogate is orphaned.
                self.flush_orphan_surrogate(is_key);
                self.high_surrogate = Some(code as u16);
            }
            0xDC00..=0xDFFF => match self.high_surrogate.take() {
                Some(high) => {
                    let combined =
                        0x10000 + (((high as u32) - 0xD800) << 10) + (code - 0xDC00);
                    let decoded = char::from_u32(combined).unwrap_or('\u{FFFD}');
                    self.emit_char(decoded, is_key);
                }
                None => self.emit_char('\u{FFFD}', is_key),
            },
            _ => {
                self.flush_orphan_surrogate(is_key);
                let decoded = char::from_u32(code).unwrap_or('\u{FFFD}');
                self.emit_char(decoded, is_key);
            }
        }
        Ok(())
    }

    fn flush_orphan_surrogate(&mut self, is_key: bool) {
        if self.high_surrogate.take().is_some() {
            self.emit_char('\u{FFFD}', is_key);
        }
    }

    fn emit_char(&mut self, ch: char, is_key: bool) {
        if is_key {
            self.key_buf.push(ch);
            return;
        }
        if !self.str_exposed {
            self.place_value(Value::String(String::new()));
            self.str_exposed = true;
        }
        if let Some(target) = self.site_string_mut() {
            target.push(ch);
        }
        self.dirty = true;
    }

    fn finish_key(&mut self) -> Result<(), StreamError> {
        match self.frames.last_mut() {
            Some(Frame::Object { pending_key }) => {
                *pending_key = Some(std::mem::take(&mut self.key_buf));
                self.state = State::AfterKey;
                Ok(())
            }
            _ => Err(self.syntax('"')),
        }
    }

    fn finish_string_value(&mut self) {
        if !self.str_exposed {
            self.place_value(Value::String(String::new()));
            self.str_exposed = true;
        }
        self.end_value();
    }

    // ── Numbers and literals ──────────────────────────────────────────────

    fn number_char(&mut self, ch: char) -> Result<(), StreamError> {
        match ch {
            '0'..='9' | '-' | '+' | '.' | 'e' | 'E' => {
                self.num_buf.push(ch);
                Ok(())
            }
            delimiter => {
                if !self.commit_number() {
                    return Err(self.syntax(delimiter));
                }
                self.num_buf.clear();
                self.feed_char(delimiter)
            }
        }
    }

    /// Parse and place the buffered number. Returns false if the buffer is
    /// not a valid JSON number.
    fn commit_number(&mut self) -> bool {
        match self.num_buf.parse::<Number>() {
            Ok(n) => {
                self.place_value(Value::Number(n));
                self.end_value();
                true
            }
            Err(_) => false,
        }
    }

    fn literal_char(&mut self, ch: char) -> Result<(), StreamError> {
        self.lit_buf.push(ch);
        let buf = self.lit_buf.as_str();
        let committed = if "true".starts_with(buf) {
            buf == "true"
        } else if "false".starts_with(buf) {
            buf == "false"
        } else if "null".starts_with(buf) {
            buf == "null"
        } else {
            return Err(self.syntax(ch));
        };
        if committed {
            let value = match buf {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Null,
            };
            self.lit_buf.clear();
            self.place_value(value);
            self.end_value();
        }
        Ok(())
    }

    // ── Tree plumbing ─────────────────────────────────────────────────────

    fn current_site(&self) -> Site {
        match self.frames.last() {
            None => Site::Root,
            Some(Frame::Array) => Site::Push,
            Some(Frame::Object { pending_key }) => match pending_key {
                Some(key) => Site::Key(key.clone()),
                None => unreachable!("value inside an object without a key"),
            },
        }
    }

    fn top_container(&self) -> Option<&Value> {
        let mut current = self.root.as_ref()?;
        for crumb in &self.crumbs {
            current = match (crumb, current) {
                (Crumb::Key(key), Value::Object(map)) => map.get(key)?,
                (Crumb::Index(index), Value::Array(arr)) => arr.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn top_container_mut(&mut self) -> Option<&mut Value> {
        let mut current = self.root.as_mut()?;
        for crumb in &self.crumbs {
            current = match (crumb, current) {
                (Crumb::Key(key), Value::Object(map)) => map.get_mut(key)?,
                (Crumb::Index(index), Value::Array(arr)) => arr.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Insert a value at the current site. The pending object key stays in
    /// place until the value finishes (`end_value`).
    fn place_value(&mut self, value: Value) {
        self.dirty = true;
        match self.current_site() {
            Site::Root => self.root = Some(value),
            Site::Key(key) => {
                if let Some(Value::Object(map)) = self.top_container_mut() {
                    map.insert(key, value);
                }
            }
            Site::Push => {
                if let Some(Value::Array(arr)) = self.top_container_mut() {
                    arr.push(value);
                }
            }
        }
    }

    /// Mutable handle on the string currently being streamed.
    fn site_string_mut(&mut self) -> Option<&mut String> {
        let site = self.current_site();
        let slot = match site {
            Site::Root => self.root.as_mut()?,
            Site::Key(key) => match self.top_container_mut()? {
                Value::Object(map) => map.get_mut(&key)?,
                _ => return None,
            },
            Site::Push => match self.top_container_mut()? {
                Value::Array(arr) => arr.last_mut()?,
                _ => return None,
            },
        };
        match slot {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Open a container at the current site and extend the route to it.
    fn open_container(&mut self, container: Value) {
        self.dirty = true;
        match self.current_site() {
            Site::Root => self.root = Some(container),
            Site::Key(key) => {
                if let Some(Value::Object(map)) = self.top_container_mut() {
                    map.insert(key.clone(), container);
                }
                self.crumbs.push(Crumb::Key(key));
            }
            Site::Push => {
                let mut index = 0;
                if let Some(Value::Array(arr)) = self.top_container_mut() {
                    arr.push(container);
                    index = arr.len() - 1;
                }
                self.crumbs.push(Crumb::Index(index));
            }
        }
    }

    fn close_container(&mut self) {
        self.frames.pop();
        if !self.crumbs.is_empty() {
            self.crumbs.pop();
        }
        self.end_value();
    }

    /// The current value is finished: release the pending key and decide
    /// whether the whole document is done.
    fn end_value(&mut self) {
        if let Some(Frame::Object { pending_key }) = self.frames.last_mut() {
            *pending_key = None;
        }
        if self.frames.is_empty() {
            self.state = State::End;
        } else {
            self.state = State::AfterValue;
        }
    }
}
