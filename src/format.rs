//! Line-oriented reader and writer for `key=value` files.
//!
//! Grammar, per line:
//! - leading whitespace is ignored; blank lines are skipped;
//! - `#` or `!` as first character marks a comment;
//! - the first unescaped `=` or `:` splits key from value, and both sides
//!   lose their unescaped surrounding whitespace;
//! - `\t`, `\n`, `\r` decode to control characters, `\` before any other
//!   character yields that character, a lone trailing `\` stays literal.
//!
//! Lines without a separator or with an empty key are malformed and are
//! reported by line number rather than failing the whole file.

use std::io::{self, Write};

/// Outcome of parsing a whole file.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Parsed {
    /// Pairs in file order; later duplicates override earlier ones on apply.
    pub pairs: Vec<(String, String)>,
    /// 1-based numbers of skipped malformed lines.
    pub malformed: Vec<usize>,
}

pub(crate) fn parse(text: &str) -> Parsed {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut out = Parsed::default();

    for (idx, raw) in text.split('\n').enumerate() {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let line = raw.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        match parse_line(line) {
            Some(pair) => out.pairs.push(pair),
            None => out.malformed.push(idx + 1),
        }
    }
    out
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let sep = find_separator(line)?;
    let key = unescape(trim_unescaped_end(&line[..sep]));
    if key.is_empty() {
        return None;
    }
    let value = unescape(trim_unescaped_end(line[sep + 1..].trim_start()));
    Some((key, value))
}

fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Strip trailing whitespace that is not protected by a backslash.
fn trim_unescaped_end(s: &str) -> &str {
    let mut end = s.len();
    while let Some(c) = s[..end].chars().next_back() {
        if !c.is_whitespace() {
            break;
        }
        let before = &s[..end - c.len_utf8()];
        let slashes = before.bytes().rev().take_while(|&b| b == b'\\').count();
        if slashes % 2 == 1 {
            break;
        }
        end -= c.len_utf8();
    }
    &s[..end]
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    let last = s.chars().count().saturating_sub(1);
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' | '\u{feff}' if is_key && i == 0 => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_whitespace() && (i == 0 || i == last) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Write one escaped `key=value` line.
pub(crate) fn write_line<W: Write>(w: &mut W, key: &str, value: &str) -> io::Result<()> {
    writeln!(w, "{}={}", escape(key, true), escape(value, false))
}
