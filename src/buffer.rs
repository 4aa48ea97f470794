//! The document buffer: stores text using a Rope for O(log n) operations on large files.

use crate::types::{LineEnding, Marker};
use ropey::Rope;
use std::borrow::Cow;

/// The document buffer using a Rope data structure.
///
/// A Rope provides O(log n) insert/delete operations, making it suitable for
/// files with 100,000+ lines. Text is normalized to LF internally; the
/// detected line ending is reapplied when the buffer is streamed out.
pub struct Buffer {
    /// The text content stored as a Rope.
    text: Rope,
    /// Line ending style for this buffer.
    pub line_ending: LineEnding,
    /// Position bookmarks, kept ordered by position.
    markers: Vec<Marker>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Create a new empty buffer defaulting to LF.
    pub fn new() -> Self {
        Self {
            text: Rope::new(),
            line_ending: LineEnding::LF,
            markers: Vec::new(),
        }
    }

    /// Build a buffer from an on-disk string, detecting and honoring line endings.
    pub fn from_string(s: &str) -> Self {
        // Detect line ending by looking for the first \r\n
        let line_ending = if s.contains("\r\n") {
            LineEnding::CRLF
        } else {
            LineEnding::LF
        };

        // Normalize to LF internally, store CRLF preference for saving
        let normalized = s.replace("\r\n", "\n");
        let text = Rope::from_str(&normalized);

        Self {
            text,
            line_ending,
            markers: Vec::new(),
        }
    }

    /// Stream the buffer content as chunks, with the stored line ending
    /// reapplied. This is what the save loop iterates so it can poll for
    /// cancellation between chunks instead of materializing the whole file.
    pub fn chunks(&self) -> impl Iterator<Item = Cow<'_, str>> {
        let crlf = self.line_ending == LineEnding::CRLF;
        self.text.chunks().map(move |chunk| {
            if crlf && chunk.contains('\n') {
                Cow::Owned(chunk.replace('\n', "\r\n"))
            } else {
                Cow::Borrowed(chunk)
            }
        })
    }

    /// Serialize the buffer, using the detected line ending.
    pub fn to_string(&self) -> String {
        self.chunks().collect()
    }

    /// Byte length of the serialized form (used for progress reporting).
    pub fn serialized_len(&self) -> usize {
        let mut len = self.text.len_bytes();
        if self.line_ending == LineEnding::CRLF {
            // each \n becomes \r\n
            len += self.text.len_lines().saturating_sub(1);
        }
        len
    }

    /// Number of chars in the buffer.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        let len = self.text.len_lines();
        if len == 0 { 1 } else { len }
    }

    /// Get the text of a specific line (without trailing newline).
    pub fn line(&self, y: usize) -> Cow<'_, str> {
        if y >= self.text.len_lines() {
            return Cow::Borrowed("");
        }
        let s: String = self.text.line(y).chars().collect();
        Cow::Owned(s.trim_end_matches('\n').to_string())
    }

    /// Insert a string at a char offset, returning the offset just past the
    /// inserted text. Markers at or after the offset shift right.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> usize {
        let normalized = text.replace("\r\n", "\n");
        let idx = char_idx.min(self.text.len_chars());
        self.text.insert(idx, &normalized);

        let inserted = normalized.chars().count();
        for m in &mut self.markers {
            if m.position >= idx {
                m.position += inserted;
            }
        }
        idx + inserted
    }

    /// Delete a char range. Markers inside the range collapse to its start;
    /// markers past it shift left.
    pub fn remove(&mut self, start: usize, end: usize) {
        let len = self.text.len_chars();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return;
        }
        self.text.remove(start..end);

        let removed = end - start;
        for m in &mut self.markers {
            if m.position >= end {
                m.position -= removed;
            } else if m.position > start {
                m.position = start;
            }
        }
    }

    /// Extract a char range as a string.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.text.len_chars();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return String::new();
        }
        self.text.slice(start..end).chars().collect()
    }

    /// The buffer's markers, ordered by position.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Add a marker, replacing any existing marker with the same shortcut.
    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.retain(|m| m.shortcut != marker.shortcut);
        let mut marker = marker;
        marker.position = marker.position.min(self.text.len_chars());
        let at = self
            .markers
            .partition_point(|m| m.position <= marker.position);
        self.markers.insert(at, marker);
    }

    /// Remove the marker with the given shortcut, if any.
    pub fn remove_marker(&mut self, shortcut: char) -> Option<Marker> {
        let idx = self.markers.iter().position(|m| m.shortcut == shortcut)?;
        Some(self.markers.remove(idx))
    }

    /// Replace all markers at once (used when loading a companion file).
    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
        let len = self.text.len_chars();
        for m in &mut self.markers {
            m.position = m.position.min(len);
        }
        self.markers.sort_by_key(|m| m.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Buffer creation tests ====================

    #[test]
    fn new_buffer_is_empty() {
        let buf = Buffer::new();
        assert_eq!(buf.len_chars(), 0);
        assert_eq!(buf.line_ending, LineEnding::LF);
    }

    #[test]
    fn from_string_lf_lines() {
        let buf = Buffer::from_string("line1\nline2\nline3");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line(0).as_ref(), "line1");
        assert_eq!(buf.line(2).as_ref(), "line3");
        assert_eq!(buf.line_ending, LineEnding::LF);
    }

    #[test]
    fn from_string_crlf_lines() {
        let buf = Buffer::from_string("line1\r\nline2\r\nline3");
        assert_eq!(buf.line_count(), 3);
        assert_eq!(buf.line(1).as_ref(), "line2");
        assert_eq!(buf.line_ending, LineEnding::CRLF);
    }

    #[test]
    fn to_string_preserves_line_ending() {
        let buf_lf = Buffer::from_string("a\nb");
        assert_eq!(buf_lf.to_string(), "a\nb");

        let buf_crlf = Buffer::from_string("a\r\nb");
        assert_eq!(buf_crlf.to_string(), "a\r\nb");
    }

    #[test]
    fn serialized_len_counts_crlf() {
        let buf = Buffer::from_string("a\r\nb\r\nc");
        assert_eq!(buf.serialized_len(), buf.to_string().len());

        let buf = Buffer::from_string("a\nb\nc");
        assert_eq!(buf.serialized_len(), 5);
    }

    #[test]
    fn chunks_roundtrip_unicode() {
        let src = "héllo 日本語\r\n😀 line two\r\n";
        let buf = Buffer::from_string(src);
        let joined: String = buf.chunks().collect();
        assert_eq!(joined, src);
    }

    // ==================== Edit tests ====================

    #[test]
    fn insert_and_remove() {
        let mut buf = Buffer::from_string("ac");
        let end = buf.insert(1, "b");
        assert_eq!(end, 2);
        assert_eq!(buf.to_string(), "abc");

        buf.remove(0, 2);
        assert_eq!(buf.to_string(), "c");
    }

    #[test]
    fn insert_normalizes_crlf() {
        let mut buf = Buffer::from_string("ab");
        buf.insert(1, "x\r\ny");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line(0).as_ref(), "ax");
        assert_eq!(buf.line(1).as_ref(), "yb");
    }

    #[test]
    fn slice_clamps_range() {
        let buf = Buffer::from_string("hello");
        assert_eq!(buf.slice(1, 100), "ello");
        assert_eq!(buf.slice(3, 2), "");
    }

    // ==================== Marker tests ====================

    #[test]
    fn markers_stay_ordered() {
        let mut buf = Buffer::from_string("0123456789");
        buf.add_marker(Marker::new('b', 7));
        buf.add_marker(Marker::new('a', 2));
        let pos: Vec<usize> = buf.markers().iter().map(|m| m.position).collect();
        assert_eq!(pos, vec![2, 7]);
    }

    #[test]
    fn add_marker_replaces_same_shortcut() {
        let mut buf = Buffer::from_string("0123456789");
        buf.add_marker(Marker::new('a', 2));
        buf.add_marker(Marker::new('a', 8));
        assert_eq!(buf.markers(), &[Marker::new('a', 8)]);
    }

    #[test]
    fn markers_shift_on_insert() {
        let mut buf = Buffer::from_string("0123456789");
        buf.add_marker(Marker::new('a', 2));
        buf.add_marker(Marker::new('b', 8));
        buf.insert(5, "xyz");
        assert_eq!(buf.markers(), &[Marker::new('a', 2), Marker::new('b', 11)]);
    }

    #[test]
    fn markers_collapse_on_remove() {
        let mut buf = Buffer::from_string("0123456789");
        buf.add_marker(Marker::new('a', 5));
        buf.add_marker(Marker::new('b', 9));
        buf.remove(3, 7);
        assert_eq!(buf.markers(), &[Marker::new('a', 3), Marker::new('b', 5)]);
    }

    #[test]
    fn remove_marker_by_shortcut() {
        let mut buf = Buffer::from_string("abc");
        buf.add_marker(Marker::new('a', 1));
        assert_eq!(buf.remove_marker('a'), Some(Marker::new('a', 1)));
        assert_eq!(buf.remove_marker('a'), None);
        assert!(buf.markers().is_empty());
    }
}
