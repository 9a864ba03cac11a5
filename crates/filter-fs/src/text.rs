//! Line splitting and lenient decoding

use std::borrow::Cow;

/// Split `content` into lines terminated by `\n`, `\r\n` or a lone `\r`.
///
/// A final line without a terminator is still a line; a trailing terminator
/// does not add an empty one.
pub fn split_lines(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&content[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&content[start..i]);
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Decode text that is usually UTF-8 but may be a legacy single-byte file.
///
/// Falls back to windows-1252, the WHATWG superset of ISO-8859-1, when the
/// bytes are not valid UTF-8.
pub fn decode_lenient(bytes: &[u8]) -> Cow<'_, str> {
    let (content, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return content;
    }
    tracing::debug!("Input is not UTF-8, decoding as windows-1252");
    let (content, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    content
}
