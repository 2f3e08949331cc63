//! Character cursor over a stack of input frames
//!
//! The bottom frame borrows the document text. Entity inclusion pushes a new
//! frame holding the replacement text instead of rewriting the input, so each
//! inclusion costs one allocation for the replacement and nothing for the
//! document. Reads are transparent: once a frame is exhausted, the next read
//! pops it and continues in the frame below, unless a fence has been set on
//! that frame. Fenced text (the external DTD subset) must be complete on its
//! own, so reads stop at its end as if the input ended there.
//!
//! Delimiter searches inside a frame use memchr (SSE2/AVX2/NEON):
//! - `text_run`: next `<`, `&` or `]`
//! - `consume_until`: next occurrence of a literal via `memmem`

use memchr::memchr3;
use memchr::memmem;
use std::borrow::Cow;

use super::unicode::is_whitespace;
use crate::error::Position;

/// One span of input: the document itself or the replacement text of an entity
#[derive(Debug)]
struct Frame<'a> {
    text: Cow<'a, str>,
    /// Byte offset of the next character
    pos: usize,
    /// Entity whose replacement text this frame holds
    entity: Option<String>,
    /// Whether popping this frame must be reported as an entity end
    reported: bool,
}

impl<'a> Frame<'a> {
    #[inline]
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    #[inline]
    fn is_exhausted(&self) -> bool {
        self.pos >= self.text.len()
    }
}

/// Cursor over the document plus any active entity expansions
#[derive(Debug)]
pub struct Cursor<'a> {
    frames: Vec<Frame<'a>>,
    position: Position,
    /// Reported entities whose frames were popped but not yet announced
    ended: Vec<String>,
    /// Frame counts below which reads may not go, innermost last
    fences: Vec<usize>,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over a document
    pub fn new(input: &'a str) -> Self {
        Cursor {
            frames: vec![Frame {
                text: Cow::Borrowed(input),
                pos: 0,
                entity: None,
                reported: false,
            }],
            position: Position::start(),
            ended: Vec::new(),
            fences: Vec::new(),
        }
    }

    /// Position in the document frame
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Number of frames on the stack, the document included
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Index of the lowest frame reads may reach
    #[inline]
    fn base(&self) -> usize {
        self.fences.last().map_or(0, |depth| depth - 1)
    }

    /// Depth of the frame the next character will come from, or 0 at end of input
    pub fn source_depth(&self) -> usize {
        let base = self.base();
        self.frames
            .iter()
            .rposition(|f| !f.is_exhausted())
            .filter(|&i| i >= base)
            .map_or(0, |i| i + 1)
    }

    /// Make the innermost frame the bottom of the input until [`Cursor::lift_fence`]
    pub fn fence(&mut self) {
        self.fences.push(self.frames.len());
    }

    pub fn lift_fence(&mut self) {
        self.fences.pop();
    }

    /// True if the innermost frame has nothing left
    #[inline]
    pub fn frame_exhausted(&self) -> bool {
        self.frames.last().is_none_or(|f| f.is_exhausted())
    }

    /// True if no frame has anything left
    #[inline]
    pub fn at_end(&self) -> bool {
        self.source_depth() == 0
    }

    /// Iterate over upcoming characters without consuming them
    fn lookahead(&self) -> impl Iterator<Item = char> + '_ {
        self.frames[self.base()..].iter().rev().flat_map(|f| f.rest().chars())
    }

    /// Current character, looking through exhausted frames
    #[inline]
    pub fn current(&self) -> Option<char> {
        self.lookahead().next()
    }

    /// Character `n` positions ahead of the current one
    #[inline]
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.lookahead().nth(n)
    }

    /// Next character of the innermost frame only
    #[inline]
    pub fn current_in_frame(&self) -> Option<char> {
        self.frames.last().and_then(|f| f.rest().chars().next())
    }

    /// Check whether the upcoming characters match `literal`
    pub fn starts_with(&self, literal: &str) -> bool {
        if let Some(top) = self.frames.last() {
            if top.rest().len() >= literal.len() {
                return top.rest().starts_with(literal);
            }
        }
        let mut ahead = self.lookahead();
        literal.chars().all(|c| ahead.next() == Some(c))
    }

    /// Pop exhausted entity frames. The document frame and fenced frames are never popped.
    pub fn pop_exhausted(&mut self) {
        while self.frames.len() > self.base() + 1 && self.frame_exhausted() {
            if let Some(frame) = self.frames.pop() {
                log::trace!("leaving entity frame {:?}", frame.entity);
                if frame.reported {
                    if let Some(name) = frame.entity {
                        self.ended.push(name);
                    }
                }
            }
        }
    }

    /// Take the names of reported entities whose replacement text has been fully read
    pub fn take_ended(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ended)
    }

    #[inline]
    fn track(&mut self, c: char) {
        self.position.offset += 1;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
    }

    /// Consume and return the current character
    pub fn next_char(&mut self) -> Option<char> {
        self.pop_exhausted();
        let in_document = self.frames.len() == 1;
        let frame = self.frames.last_mut()?;
        let c = frame.rest().chars().next()?;
        frame.pos += c.len_utf8();
        if in_document {
            self.track(c);
        }
        Some(c)
    }

    /// Move past the current character, then optionally past any whitespace
    pub fn advance(&mut self, skip_whitespace: bool) {
        self.next_char();
        if skip_whitespace {
            self.skip_whitespace();
        }
    }

    /// Skip whitespace, returning true if any was skipped
    pub fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.current().is_some_and(is_whitespace) {
            self.next_char();
            skipped = true;
        }
        skipped
    }

    /// Consume characters while `pred` holds
    pub fn consume_while<F>(&mut self, mut pred: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut out = String::new();
        while let Some(c) = self.current() {
            if !pred(c) {
                break;
            }
            self.next_char();
            out.push(c);
        }
        out
    }

    /// Consume `literal` if the input continues with it; otherwise leave the cursor unchanged
    pub fn consume_literal(&mut self, literal: &str) -> bool {
        if !self.starts_with(literal) {
            return false;
        }
        for _ in literal.chars() {
            self.next_char();
        }
        true
    }

    /// Consume up to and including the next `literal`, returning the text before it.
    ///
    /// Returns `None` when the input ends first; everything up to the end
    /// has then been consumed.
    pub fn consume_until(&mut self, literal: &str) -> Option<String> {
        let finder = memmem::Finder::new(literal.as_bytes());
        let mut out = String::new();
        loop {
            self.pop_exhausted();
            let in_document = self.frames.len() == 1;
            let frame = self.frames.last_mut()?;
            if frame.is_exhausted() {
                return None;
            }
            let rest = frame.rest();
            let (taken, found) = match finder.find(rest.as_bytes()) {
                Some(i) => (i, true),
                None => (rest.len(), false),
            };
            let chunk = &rest[..taken];
            out.push_str(chunk);
            frame.pos += taken;
            if found {
                frame.pos += literal.len();
            }
            if in_document {
                let tracked: Vec<char> = if found {
                    out[out.len() - taken..].chars().chain(literal.chars()).collect()
                } else {
                    out[out.len() - taken..].chars().collect()
                };
                for c in tracked {
                    self.track(c);
                }
            }
            if found {
                return Some(out);
            }
        }
    }

    /// Consume character data from the innermost frame up to the next `<`, `&`, `]` or
    /// the end of the frame.
    pub fn text_run(&mut self) -> String {
        let in_document = self.frames.len() == 1;
        let Some(frame) = self.frames.last_mut() else {
            return String::new();
        };
        let rest = frame.rest();
        let end = memchr3(b'<', b'&', b']', rest.as_bytes()).unwrap_or(rest.len());
        let run = rest[..end].to_string();
        frame.pos += end;
        if in_document {
            for c in run.chars() {
                self.track(c);
            }
        }
        run
    }

    /// Push replacement text to be read before the rest of the input
    pub fn push_back(&mut self, text: impl Into<Cow<'a, str>>, entity: Option<String>, reported: bool) {
        log::trace!("entering entity frame {:?}", entity);
        self.frames.push(Frame {
            text: text.into(),
            pos: 0,
            entity,
            reported,
        });
    }

    /// Whether a frame for `name` is still on the stack.
    ///
    /// Exhausted frames count too: a frame is only popped once reading moves
    /// below it, so one still on the stack encloses whatever is being read.
    pub fn is_expanding(&self, name: &str) -> bool {
        self.frames
            .iter()
            .skip(1)
            .any(|f| f.entity.as_deref() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_char_tracks_lines() {
        let mut cursor = Cursor::new("a\nbc");
        assert_eq!(cursor.next_char(), Some('a'));
        assert_eq!(cursor.next_char(), Some('\n'));
        assert_eq!(cursor.position().line, 2);
        assert_eq!(cursor.position().column, 1);
        assert_eq!(cursor.next_char(), Some('b'));
        assert_eq!(cursor.position().column, 2);
        assert_eq!(cursor.position().offset, 3);
    }

    #[test]
    fn test_consume_literal() {
        let mut cursor = Cursor::new("<!--x-->");
        assert!(!cursor.consume_literal("<![CDATA["));
        assert_eq!(cursor.current(), Some('<'));
        assert!(cursor.consume_literal("<!--"));
        assert_eq!(cursor.current(), Some('x'));
    }

    #[test]
    fn test_consume_until() {
        let mut cursor = Cursor::new("hello-->rest");
        assert_eq!(cursor.consume_until("-->"), Some("hello".to_string()));
        assert_eq!(cursor.current(), Some('r'));
        assert_eq!(cursor.position().offset, 8);
        assert_eq!(cursor.consume_until("-->"), None);
        assert!(cursor.at_end());
    }

    #[test]
    fn test_push_back_is_read_first() {
        let mut cursor = Cursor::new("cd");
        cursor.push_back("ab".to_string(), Some("e".to_string()), true);
        assert!(cursor.starts_with("abcd"));
        assert!(cursor.is_expanding("e"));
        assert_eq!(cursor.next_char(), Some('a'));
        assert_eq!(cursor.next_char(), Some('b'));
        // exhausted but not yet popped
        assert!(cursor.is_expanding("e"));
        let rest: String = std::iter::from_fn(|| cursor.next_char()).collect();
        let read = format!("ab{}", rest);
        assert!(!cursor.is_expanding("e"));
        assert_eq!(read, "abcd");
        assert_eq!(cursor.take_ended(), vec!["e".to_string()]);
        // replacement text does not move the document position
        assert_eq!(cursor.position().offset, 2);
    }

    #[test]
    fn test_text_run_stops_at_frame_end() {
        let mut cursor = Cursor::new("tail<x/>");
        cursor.push_back("hi".to_string(), Some("e".to_string()), true);
        assert_eq!(cursor.text_run(), "hi");
        assert!(cursor.frame_exhausted());
        cursor.pop_exhausted();
        assert_eq!(cursor.take_ended(), vec!["e".to_string()]);
        assert_eq!(cursor.text_run(), "tail");
        assert_eq!(cursor.current(), Some('<'));
    }

    #[test]
    fn test_starts_with_across_frames() {
        let mut cursor = Cursor::new("-->");
        cursor.push_back("<!-".to_string(), None, false);
        assert!(cursor.starts_with("<!--"));
        assert_eq!(cursor.source_depth(), 2);
    }

    #[test]
    fn test_skip_whitespace_and_consume_while() {
        let mut cursor = Cursor::new("  \t\n name>");
        assert!(cursor.skip_whitespace());
        assert_eq!(cursor.consume_while(|c| c != '>'), "name");
        assert!(!cursor.skip_whitespace());
        assert_eq!(cursor.current(), Some('>'));
    }

    #[test]
    fn test_fence_stops_reads_at_frame_end() {
        let mut cursor = Cursor::new("'>doc");
        cursor.push_back("'x".to_string(), Some("[dtd]".to_string()), true);
        cursor.fence();
        assert_eq!(cursor.next_char(), Some('\''));
        assert_eq!(cursor.consume_while(|c| c != '\''), "x");
        assert_eq!(cursor.current(), None);
        assert!(cursor.at_end());
        assert_eq!(cursor.consume_until("'"), None);
        assert!(!cursor.skip_whitespace());
        // the fenced frame stays on the stack until the fence is lifted
        assert!(cursor.take_ended().is_empty());
        assert_eq!(cursor.depth(), 2);

        cursor.lift_fence();
        assert_eq!(cursor.source_depth(), 1);
        assert_eq!(cursor.next_char(), Some('\''));
        assert_eq!(cursor.take_ended(), vec!["[dtd]".to_string()]);
        assert_eq!(cursor.position().offset, 1);
    }

    #[test]
    fn test_unreported_frames_are_not_announced() {
        let mut cursor = Cursor::new("");
        cursor.push_back("x".to_string(), Some("a".to_string()), false);
        assert_eq!(cursor.next_char(), Some('x'));
        assert_eq!(cursor.next_char(), None);
        assert!(cursor.take_ended().is_empty());
    }
}
