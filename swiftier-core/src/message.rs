//! Conversion of a single, bracket-free message send to call syntax
//!
//! ```text
//! Foo bar                  ->  Foo.bar()
//! Foo alloc                ->  Foo
//! Foo init                 ->  Foo()
//! foo setX:1 y:2           ->  foo.setX(1, y: 2)
//! Foo initWithName:n       ->  Foo(name: n)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::source_utils::{downcase_first, in_spans, string_literal_spans};

static UNARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S*[^\s:,])\s+(\w+)$").unwrap());
static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\b(\w+):\s*").unwrap());

/// Split a message body on its `keyword:` tokens.
///
/// Produces `[receiver, kw1, arg1, kw2, arg2, ...]`. Keywords inside string
/// literals are not split on, and trailing empty segments are dropped.
fn split_keywords(expr: &str) -> Vec<&str> {
    let literals = string_literal_spans(expr);
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in KEYWORD_RE.captures_iter(expr) {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if in_spans(&literals, keyword.start()) {
            continue;
        }
        segments.push(&expr[last..whole.start()]);
        segments.push(keyword.as_str());
        last = whole.end();
    }
    segments.push(&expr[last..]);

    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

/// Whether `segment` has a square bracket outside its string literals
fn has_bare_bracket(segment: &str) -> bool {
    let literals = string_literal_spans(segment);
    segment
        .char_indices()
        .any(|(i, c)| matches!(c, '[' | ']') && !in_spans(&literals, i))
}

/// Convert the interior of one `[...]` pair to call syntax.
///
/// Returns `None` when the text is not a message send this rewriter
/// understands; the caller must then leave the brackets untouched.
pub fn resolve_message_send(expr: &str) -> Option<String> {
    let expr = expr.trim();

    if let Some(caps) = UNARY_RE.captures(expr) {
        let receiver = &caps[1];
        return Some(match &caps[2] {
            "alloc" => receiver.to_string(),
            "init" => format!("{}()", receiver),
            message => format!("{}.{}()", receiver, message),
        });
    }

    let segments = split_keywords(expr);
    if segments.len() < 3 || segments[0].trim().is_empty() {
        return None;
    }
    // Not fully collapsed yet: segmenting now would split the wrong expression
    if segments.iter().any(|s| has_bare_bracket(s)) {
        return None;
    }

    let receiver = segments[0].trim();
    let (keyword, argument) = (segments[1], segments[2]);

    let mut call = match keyword.strip_prefix("init") {
        Some(rest) => match rest.strip_prefix("With") {
            Some(label) if !label.is_empty() => {
                format!("{}({}: {}", receiver, downcase_first(label), argument)
            }
            _ => format!("{}({}", receiver, argument),
        },
        None => format!("{}.{}({}", receiver, keyword, argument),
    };

    for pair in segments[3..].chunks(2) {
        let value = pair.get(1).copied().unwrap_or("");
        call.push_str(&format!(", {}: {}", pair[0], value));
    }
    call.push(')');
    Some(call)
}
