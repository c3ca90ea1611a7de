//! Source text utilities
//!
//! Small string helpers shared by the rewrite rules: comment detachment,
//! quote-aware scanning, bracket and parenthesis matching.

use std::ops::Range;

/// Byte ranges of the quoted string and character literals in `text`.
///
/// An unterminated literal extends to the end of the text.
pub fn string_literal_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<(char, usize)> = None;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        match open {
            Some((quote, start)) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    spans.push(start..i + ch.len_utf8());
                    open = None;
                }
            }
            None => {
                if ch == '"' || ch == '\'' {
                    open = Some((ch, i));
                }
            }
        }
    }

    if let Some((_, start)) = open {
        spans.push(start..text.len());
    }
    spans
}

/// Whether byte offset `pos` falls inside one of `spans`
pub fn in_spans(spans: &[Range<usize>], pos: usize) -> bool {
    spans.iter().any(|span| span.contains(&pos))
}

/// Split a line into its code and its trailing `//` comment.
///
/// The comment starts at the first `//` outside a string literal and keeps
/// the whitespace that preceded it, so `code + comment` is the original line.
pub fn split_trailing_comment(line: &str) -> (&str, &str) {
    let literals = string_literal_spans(line);
    let mut search_from = 0;

    while let Some(found) = line[search_from..].find("//") {
        let pos = search_from + found;
        if !in_spans(&literals, pos) {
            let code = line[..pos].trim_end();
            return (code, &line[code.len()..]);
        }
        search_from = pos + 2;
    }

    (line, "")
}

/// Lower-case the first letter of an identifier fragment.
///
/// Acronyms stay untouched: `Name` becomes `name`, but `URL` and `ID` are kept.
pub fn downcase_first(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let second = chars.next();
    let third = chars.next();

    let is_acronym = second.is_some_and(char::is_uppercase)
        && third.map_or(true, char::is_uppercase);
    if is_acronym {
        return word.to_string();
    }

    let mut result: String = first.to_lowercase().collect();
    result.push_str(&word[first.len_utf8()..]);
    result
}

/// Find the closing parenthesis matching the `(` at byte offset `open`.
///
/// Parentheses inside string literals are ignored. Returns `None` when the
/// text is unbalanced.
pub fn find_matching_paren(text: &str, open: usize) -> Option<usize> {
    if !text[open..].starts_with('(') {
        return None;
    }

    let literals = string_literal_spans(text);
    let mut depth = 0usize;
    for (i, ch) in text[open..].char_indices() {
        let pos = open + i;
        if in_spans(&literals, pos) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }
    None
}

/// Innermost square bracket pairs, left to right, as `(open, close)` offsets.
///
/// A pair is innermost when no other bracket sits between its delimiters.
/// Brackets inside string literals are ignored and unbalanced brackets are
/// skipped, so the result is always finite.
pub fn innermost_bracket_pairs(text: &str) -> Vec<(usize, usize)> {
    let literals = string_literal_spans(text);
    let mut pairs = Vec::new();
    let mut last_open: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if in_spans(&literals, i) {
            continue;
        }
        match ch {
            '[' => last_open = Some(i),
            ']' => {
                if let Some(open) = last_open.take() {
                    pairs.push((open, i));
                }
            }
            _ => {}
        }
    }
    pairs
}
