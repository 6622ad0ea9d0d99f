//! Subject line substitution.
//!
//! The stored subject template may contain `%d` (replaced by the current date)
//! and `%h` (replaced by the host name). The template is scanned once; text
//! that was inserted is never scanned again, and any other `%` sequence is
//! copied through unchanged.

/// Substitutes every `%d` and `%h` in `template`.
pub fn render(template: &str, date: &str, hostname: &str) -> String {
    let mut out = String::with_capacity(template.len() + date.len() + hostname.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('d') => {
                out.push_str(date);
                chars.next();
            }
            Some('h') => {
                out.push_str(hostname);
                chars.next();
            }
            _ => out.push('%'),
        }
    }

    out
}
