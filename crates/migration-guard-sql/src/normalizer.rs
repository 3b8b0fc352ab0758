//! Comment and literal stripping for raw SQL
//!
//! This is a best-effort lexer, not a SQL grammar. It walks the input once,
//! tracking which kind of quoted or commented region it is in, and produces a
//! lowercase string suitable for keyword and identifier matching:
//!
//! - `-- ...` line comments are dropped (the newline is kept)
//! - `/* ... */` block comments are dropped (no nesting)
//! - `'...'` string literals become a single space (`''` is an escaped quote)
//! - `"..."` quoted identifiers lose their quotes but keep their content
//!   (`""` collapses to one `"`)
//! - `$tag$ ... $tag$` bodies, tags included, become a single space
//!
//! Unterminated regions swallow the rest of the input. That can only remove
//! text, which at worst produces an extra violation, never a missed one.

/// Scanner state; at most one region is open at a time
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Default,
    LineComment,
    BlockComment,
    SingleQuote,
    DoubleQuote,
    /// Inside a dollar-quoted body opened by this exact tag (e.g. `$body$`)
    DollarQuote(String),
}

/// Normalize raw SQL for pattern matching
pub fn normalize(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut mode = Mode::Default;
    let mut i = 0;

    while i < sql.len() {
        let rest = &sql[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };
        let width = ch.len_utf8();

        match &mode {
            Mode::LineComment => {
                if ch == '\n' {
                    mode = Mode::Default;
                    out.push('\n');
                }
                i += width;
            }
            Mode::BlockComment => {
                if rest.starts_with("*/") {
                    mode = Mode::Default;
                    i += 2;
                } else {
                    i += width;
                }
            }
            Mode::DollarQuote(tag) => {
                if rest.starts_with(tag.as_str()) {
                    i += tag.len();
                    mode = Mode::Default;
                    out.push(' ');
                } else {
                    i += width;
                }
            }
            Mode::SingleQuote => {
                if rest.starts_with("''") {
                    i += 2;
                } else if ch == '\'' {
                    mode = Mode::Default;
                    out.push(' ');
                    i += 1;
                } else {
                    i += width;
                }
            }
            Mode::DoubleQuote => {
                if rest.starts_with("\"\"") {
                    out.push('"');
                    i += 2;
                } else if ch == '"' {
                    mode = Mode::Default;
                    i += 1;
                } else {
                    out.push(ch);
                    i += width;
                }
            }
            Mode::Default => {
                if rest.starts_with("--") {
                    mode = Mode::LineComment;
                    i += 2;
                } else if rest.starts_with("/*") {
                    mode = Mode::BlockComment;
                    i += 2;
                } else if ch == '\'' {
                    mode = Mode::SingleQuote;
                    i += 1;
                } else if ch == '"' {
                    mode = Mode::DoubleQuote;
                    i += 1;
                } else if let Some(tag) = dollar_tag(rest) {
                    i += tag.len();
                    out.push(' ');
                    mode = Mode::DollarQuote(tag.to_string());
                } else {
                    out.push(ch);
                    i += width;
                }
            }
        }
    }

    out.to_lowercase()
}

/// Match a dollar-quote tag (`$`, then `[A-Za-z0-9_]*`, then `$`) at the start of `s`
fn dollar_tag(s: &str) -> Option<&str> {
    let body = s.strip_prefix('$')?;
    let len = body
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();

    if body[len..].starts_with('$') {
        // `$` + tag + `$`
        Some(&s[..len + 2])
    } else {
        None
    }
}
