//! Cleanup applied to OCR output before it is returned to clients.

/// Normalize extracted text.
///
/// Keeps ASCII letters and digits (lowercased), turns every run of
/// whitespace into a single space, drops everything else, and trims both
/// ends. Dropped characters never split or join words: `"e-mail"` becomes
/// `"email"` and `"a - b"` becomes `"a b"`.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if c.is_ascii_alphanumeric() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c.to_ascii_lowercase());
        }
    }

    out
}
