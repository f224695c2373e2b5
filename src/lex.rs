//! Lexical utilities shared by the user-config loader and the declaration
//! parser: line trimming, quote-aware tokenization, and `$(NAME)` expansion.
//! These operate on whole lines rather than a token stream, since the
//! grammar above them is line-oriented rather than free-form.

/// A line is blank if empty or made only of spaces/tabs.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

/// A line is a comment if its first non-space character is `#`.
pub fn is_comment(line: &str) -> bool {
    match line.trim_start_matches([' ', '\t']).chars().next() {
        Some('#') => true,
        _ => false,
    }
}

/// True iff `line` is blank or a comment; such lines close an open symbol
/// block (spec §4.5).
pub fn is_block_terminator(line: &str) -> bool {
    is_blank(line) || is_comment(line)
}

/// Trim leading and trailing spaces/tabs (head-and-tail trim, used for
/// `.config` values and directive operands).
pub fn trim_head_tail(s: &str) -> &str {
    s.trim_matches([' ', '\t'])
}

/// Exactly four leading spaces, followed by a non-space character. Used to
/// detect symbol-block attribute lines.
pub fn head_is_four_space(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() > 4
        && bytes[..4].iter().all(|&b| b == b' ')
        && bytes[4] != b' '
}

/// Quote-aware whitespace tokenization: a run of non-space characters is a
/// token, except that a quote opens a literal region (quotes stripped,
/// interior spaces preserved) that ends at the matching quote.
pub fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;

    while let Some(&c) = chars.peek() {
        match in_quote {
            Some(q) if c == q => {
                in_quote = None;
                chars.next();
            }
            Some(_) => {
                current.push(c);
                chars.next();
            }
            None if c == '\'' || c == '"' => {
                in_quote = Some(c);
                chars.next();
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                chars.next();
            }
            None => {
                current.push(c);
                chars.next();
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Returns the substring between the first pair of double quotes on a line.
pub fn quote_extract(s: &str) -> Option<&str> {
    let start = s.find('"')?;
    let rest = &s[start + 1..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Expand every `$(NAME)` occurrence in `s` by calling `lookup(name)`, which
/// should return the symbol's current resolved value (or `None` if the
/// symbol is unknown or has no value, in which case the substitution is
/// empty). Returns a syntax error message if a `$(` is never terminated.
pub fn expand_macros(s: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("$(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find(')') else {
            return Err("unterminated '$(' macro expansion".to_string());
        };
        let name = &after[..end];
        out.push_str(&lookup(name).unwrap_or_default());
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Apply a single trailing-backslash line continuation: if `line` ends with
/// `\`, the caller should strip it and append the head-and-tail-trimmed next
/// line's content. This helper only detects the condition; joining is done by
/// the reader, which owns the line iterator.
pub fn has_continuation(line: &str) -> bool {
    line.ends_with('\\')
}

pub fn strip_continuation(line: &str) -> &str {
    &line[..line.len() - 1]
}
