//! The markers companion file format.
//!
//! One line per marker:
//!
//! ```text
//! !<shortcut-char>;<position>;<position>
//! ```
//!
//! The position is written twice (range start/end); markers store a single
//! offset so both fields are equal.

use crate::types::Marker;
use std::io::{self, Write};

/// Write all markers in order.
pub fn write_markers<W: Write>(markers: &[Marker], mut w: W) -> io::Result<()> {
    for m in markers {
        writeln!(w, "!{};{};{}", m.shortcut, m.position, m.position)?;
    }
    w.flush()
}

/// Parse a companion file back into markers. Malformed lines are skipped.
pub fn parse_markers(s: &str) -> Vec<Marker> {
    let mut out = Vec::new();
    for line in s.lines() {
        let Some(rest) = line.strip_prefix('!') else {
            continue;
        };
        let mut chars = rest.chars();
        let Some(shortcut) = chars.next() else {
            continue;
        };
        let Some(fields) = chars.as_str().strip_prefix(';') else {
            continue;
        };
        let Some(position) = fields
            .split(';')
            .next()
            .and_then(|p| p.parse::<usize>().ok())
        else {
            continue;
        };
        out.push(Marker::new(shortcut, position));
    }
    out
}
