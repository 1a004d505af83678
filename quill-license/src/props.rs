//! Reader and writer for the `key=value` property-file format.
//!
//! License files are plain UTF-8 text: one `key=value` pair per line,
//! `#`/`!` comment lines, backslash escapes, and trailing-backslash line
//! continuations. The conventions follow the classic property-file format
//! so files issued by older tooling keep loading.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

/// Parses a property map from UTF-8 text.
///
/// Malformed escapes surface as [`io::ErrorKind::InvalidData`] errors.
pub(crate) fn load<R: BufRead>(reader: R) -> io::Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();
    let mut logical = String::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let stripped = line.trim_start_matches([' ', '\t', '\u{c}']);
        if logical.is_empty()
            && (stripped.is_empty() || stripped.starts_with('#') || stripped.starts_with('!'))
        {
            continue;
        }
        logical.push_str(stripped);
        if ends_with_continuation(&logical) {
            logical.pop();
            continue;
        }
        let (key, value) = split_pair(&logical)?;
        properties.insert(key, value);
        logical.clear();
    }
    // A continuation at end of input is a complete final line.
    if !logical.is_empty() {
        let (key, value) = split_pair(&logical)?;
        properties.insert(key, value);
    }
    Ok(properties)
}

/// Writes the properties as UTF-8 text under a single `#` comment line.
/// Keys are emitted in map order.
pub(crate) fn store<W: Write>(
    mut writer: W,
    properties: &BTreeMap<String, String>,
    comment: &str,
) -> io::Result<()> {
    writeln!(writer, "# {comment}")?;
    for (key, value) in properties {
        writeln!(writer, "{}={}", escape(key, true), escape(value, false))?;
    }
    writer.flush()
}

/// True when the line ends with an odd number of backslashes, i.e. the
/// final backslash escapes the line break itself.
fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

/// Splits one logical line into an unescaped key/value pair. The key ends at
/// the first unescaped `=`, `:`, or whitespace; whitespace around a single
/// separator is skipped.
fn split_pair(line: &str) -> io::Result<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut idx = 0;
    let mut escaped = false;
    while idx < chars.len() {
        if escaped {
            escaped = false;
            idx += 1;
            continue;
        }
        match chars[idx] {
            '\\' => {
                escaped = true;
                idx += 1;
            }
            '=' | ':' | ' ' | '\t' | '\u{c}' => break,
            _ => idx += 1,
        }
    }
    let key: String = chars[..idx].iter().collect();

    let mut start = idx;
    while start < chars.len() && matches!(chars[start], ' ' | '\t' | '\u{c}') {
        start += 1;
    }
    if start < chars.len() && matches!(chars[start], '=' | ':') {
        start += 1;
        while start < chars.len() && matches!(chars[start], ' ' | '\t' | '\u{c}') {
            start += 1;
        }
    }
    let value: String = chars[start..].iter().collect();

    Ok((unescape(&key)?, unescape(&value)?))
}

fn unescape(s: &str) -> io::Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => break,
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => out.push(read_unicode_escape(&mut chars)?),
            Some(other) => out.push(other),
        }
    }
    Ok(out)
}

/// Decodes the `XXXX` of a `\uXXXX` escape, combining surrogate pairs
/// spelled as two consecutive escapes.
fn read_unicode_escape(chars: &mut std::str::Chars<'_>) -> io::Result<char> {
    let unit = read_code_unit(chars)?;
    if (0xD800..0xDC00).contains(&unit) {
        if chars.next() != Some('\\') || chars.next() != Some('u') {
            return Err(invalid("unpaired surrogate in \\u escape"));
        }
        let low = read_code_unit(chars)?;
        match char::decode_utf16([unit, low]).next() {
            Some(Ok(c)) => Ok(c),
            _ => Err(invalid("unpaired surrogate in \\u escape")),
        }
    } else {
        char::from_u32(u32::from(unit)).ok_or_else(|| invalid("unpaired surrogate in \\u escape"))
    }
}

fn read_code_unit(chars: &mut std::str::Chars<'_>) -> io::Result<u16> {
    let mut unit: u16 = 0;
    for _ in 0..4 {
        let c = chars
            .next()
            .ok_or_else(|| invalid("truncated \\u escape"))?;
        let digit = c
            .to_digit(16)
            .ok_or_else(|| invalid("bad hex digit in \\u escape"))?;
        unit = (unit << 4) | digit as u16;
    }
    Ok(unit)
}

/// Escapes one key or value for writing. Keys escape every space; values
/// only need their leading run of spaces escaped.
fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '\t' => out.push_str(r"\t"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\u{c}' => out.push_str(r"\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' => {
                if is_key || at_start {
                    out.push('\\');
                }
                out.push(' ');
            }
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
        if c != ' ' {
            at_start = false;
        }
    }
    out
}

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
