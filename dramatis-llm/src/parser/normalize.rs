//! Text clean-up shared by the extraction strategies.
//!
//! Everything here that touches JSON-ish text walks it character by
//! character and tracks whether it is inside a string literal, so braces,
//! commas and slashes inside quoted values are never mistaken for syntax.

use std::sync::LazyLock;

use regex::Regex;

/// Fence lines (```` ```json ````, ```` ``` ````) and inline fence markers.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*```[\w+-]*[ \t]*\r?$\n?|```(?:json)?").expect("Invalid regex")
});

/// Strip code-fence markup and surrounding whitespace.
///
/// Only the fence markers go. Text before, between and after fenced blocks
/// is kept, so a reply split over several blocks or ending in a stray fence
/// still reaches the strategies whole.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// Remove `// line` and `/* block */` comments outside string literals.
#[must_use]
pub fn strip_comments(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Remove commas that directly precede (modulo whitespace) a `}` or `]`.
#[must_use]
pub fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Close whatever the text left open.
///
/// An unterminated string is closed first. Then a dangling `,` is dropped, a
/// dangling `:` gets a `null` value, and the missing `]` / `}` are appended
/// in nesting order. Stray closers that match nothing are left alone for the
/// decoder to reject.
#[must_use]
pub fn auto_close(json: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = json.to_string();
    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }

    let trimmed_len = out.trim_end().trim_end_matches(',').trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(':') {
        out.push_str(" null");
    }

    out.extend(stack.iter().rev());
    out
}

/// The first `{` through the last `}`, if both exist in that order.
#[must_use]
pub fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// The first `{` through the end of the text.
#[must_use]
pub fn object_tail(text: &str) -> Option<&str> {
    text.find('{').map(|start| text[start..].trim_end())
}

/// At most `limit` characters of `text`, for log previews.
#[must_use]
pub fn preview(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
