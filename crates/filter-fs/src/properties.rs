//! Java-style `.properties` text
//!
//! Supports `key=value`, `key: value` and `key value` entries, `#`/`!`
//! comments, backslash line continuations and the usual escapes including
//! `\uXXXX` (surrogate pairs are combined).

use std::collections::BTreeMap;

use crate::text;

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Parse `.properties` content into a sorted map.
///
/// Later duplicates of a key replace earlier ones. Returns a message
/// describing the first malformed escape.
pub fn parse(content: &str) -> Result<BTreeMap<String, String>, String> {
    let mut entries = BTreeMap::new();
    for line in logical_lines(content) {
        let (raw_key, raw_value) = split_entry(&line);
        entries.insert(unescape(raw_key)?, unescape(raw_value)?);
    }
    Ok(entries)
}

/// Serialize entries as `.properties` text, one `key=value` per line.
///
/// Keys come out in the map's (sorted) order so the output is stable.
pub fn to_string(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

fn continues(segment: &str) -> bool {
    segment.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn logical_lines(content: &str) -> Vec<String> {
    let mut logical = Vec::new();
    let mut lines = text::split_lines(content).into_iter();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut current = String::new();
        let mut segment = trimmed;
        loop {
            if !continues(segment) {
                current.push_str(segment);
                break;
            }
            current.push_str(&segment[..segment.len() - 1]);
            match lines.next() {
                Some(next) => segment = next.trim_start_matches(is_blank),
                None => break,
            }
        }
        logical.push(current);
    }

    logical
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn flush_units(out: &mut String, units: &mut Vec<u16>) {
    out.extend(
        char::decode_utf16(units.drain(..)).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut out, &mut units);
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = u16::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .ok_or_else(|| format!("malformed \\uXXXX escape: \\u{hex}"))?;
                units.push(unit);
            }
            Some(escaped) => {
                flush_units(&mut out, &mut units);
                out.push(match escaped {
                    't' => '\t',
                    'n' => '\n',
                    'r' => '\r',
                    'f' => '\x0c',
                    other => other,
                });
            }
            None => {}
        }
    }
    flush_units(&mut out, &mut units);

    Ok(out)
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
}
