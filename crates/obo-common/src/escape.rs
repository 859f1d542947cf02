//! OBO text escaping
//!
//! Both functions make a single left-to-right pass over the input and look each
//! character up in a fixed substitution table. Output is never re-scanned, so
//! the backslashes introduced by escaping are not escaped again.

/// Characters that are backslash-prefixed by both escaping variants
pub const OBO_ESCAPE_SLIM_CHARS: [char; 10] = [':', ',', '"', '\\', '(', ')', '[', ']', '{', '}'];

fn push_slim(out: &mut String, character: char) -> bool {
    if OBO_ESCAPE_SLIM_CHARS.contains(&character) {
        out.push('\\');
        out.push(character);
        true
    } else {
        false
    }
}

/// Escape all reserved characters for OBO, including spaces (as `\W`)
///
/// Used for tokens that must not contain whitespace, such as the CURIEs inside
/// a bracketed dbxref list.
pub fn obo_escape(string: &str) -> String {
    let mut out = String::with_capacity(string.len());
    for character in string.chars() {
        if character == ' ' {
            out.push_str("\\W");
        } else if !push_slim(&mut out, character) {
            out.push(character);
        }
    }
    out
}

/// Escape reserved characters for OBO free text, leaving spaces alone
///
/// After the per-character pass every newline is replaced with the two
/// character sequence `\n`.
pub fn obo_escape_slim(string: &str) -> String {
    let mut out = String::with_capacity(string.len());
    for character in string.chars() {
        if !push_slim(&mut out, character) {
            out.push(character);
        }
    }
    out.replace('\n', "\\n")
}
