//! Iterative collapse of nested message sends
//!
//! Each pass converts every innermost `[...]` pair on the line. A converted
//! pair is replaced by an opaque fragment marker, so text produced for an
//! inner send (including its `label:` colons) is never re-read when the
//! enclosing send is split on its keywords. Markers are expanded once the
//! line stops changing.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::message::resolve_message_send;
use crate::source_utils::innermost_bracket_pairs;

const FRAGMENT_OPEN: char = '\u{E000}';
const FRAGMENT_CLOSE: char = '\u{E001}';

static FRAGMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").unwrap());

/// Resolved sub-expressions of the line being collapsed
#[derive(Debug, Default)]
struct Fragments {
    texts: Vec<String>,
}

impl Fragments {
    /// Store `text` and return the marker standing in for it
    fn insert(&mut self, text: String) -> String {
        let id = self.texts.len();
        self.texts.push(text);
        format!("{}{}{}", FRAGMENT_OPEN, id, FRAGMENT_CLOSE)
    }

    /// Replace every marker with its text. Fragments only reference
    /// fragments created before them, so this needs at most one round per
    /// nesting level.
    fn expand(&self, line: &str) -> String {
        let mut result = line.to_string();
        for _ in 0..=self.texts.len() {
            if !result.contains(FRAGMENT_OPEN) {
                break;
            }
            result = FRAGMENT_RE
                .replace_all(&result, |caps: &regex::Captures| {
                    caps[1]
                        .parse::<usize>()
                        .ok()
                        .and_then(|id| self.texts.get(id))
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
        }
        result
    }
}

/// What a bracket pair means, judged from the character before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketKind {
    /// `@[a, b]` array literal
    Literal,
    /// `a[0]`
    Subscript,
    /// After `)`, `]` or a resolved fragment: a send after a cast such as
    /// `(id)[NSNull null]`, or a subscript such as `f()[i]` or `[x y][0]`
    Trailing,
    Send,
}

fn classify(line: &str, open: usize) -> BracketKind {
    match line[..open].chars().next_back() {
        Some('@') => BracketKind::Literal,
        Some(c) if c.is_alphanumeric() || c == '_' => BracketKind::Subscript,
        Some(')' | ']' | FRAGMENT_CLOSE) => BracketKind::Trailing,
        _ => BracketKind::Send,
    }
}

/// One left-to-right pass over the innermost pairs. Returns the new line and
/// whether anything was replaced.
fn collapse_pass(line: &str, fragments: &mut Fragments) -> (String, bool) {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    let mut changed = false;

    for (open, close) in innermost_bracket_pairs(line) {
        let before = &line[last..open];
        let whole = &line[open..=close];
        let interior = &line[open + 1..close];

        match classify(line, open) {
            BracketKind::Literal => {
                out.push_str(before.strip_suffix('@').unwrap_or(before));
                out.push_str(&fragments.insert(whole.to_string()));
                changed = true;
            }
            BracketKind::Subscript => {
                out.push_str(before);
                out.push_str(&fragments.insert(whole.to_string()));
                changed = true;
            }
            BracketKind::Trailing => {
                out.push_str(before);
                let text = resolve_message_send(interior).unwrap_or_else(|| whole.to_string());
                out.push_str(&fragments.insert(text));
                changed = true;
            }
            BracketKind::Send => {
                out.push_str(before);
                match resolve_message_send(interior) {
                    Some(call) => {
                        out.push_str(&fragments.insert(call));
                        changed = true;
                    }
                    None => {
                        debug!(expr = %fragments.expand(whole), "leaving unparsable message send");
                        out.push_str(whole);
                    }
                }
            }
        }
        last = close + 1;
    }

    out.push_str(&line[last..]);
    (out, changed)
}

/// Convert every message send on `line` to call syntax, innermost first.
///
/// Terminates on any input: each productive pass removes at least one
/// bracket pair, and a pass that removes none ends the loop. Pairs that do
/// not parse are left exactly as written.
pub fn collapse_message_sends(line: &str) -> String {
    if !line.contains('[') {
        return line.to_string();
    }
    if line.contains(FRAGMENT_OPEN) {
        debug!("line already holds fragment markers, leaving message sends alone");
        return line.to_string();
    }

    let mut fragments = Fragments::default();
    let mut working = line.to_string();
    loop {
        let (next, changed) = collapse_pass(&working, &mut fragments);
        working = next;
        if !changed {
            break;
        }
    }
    fragments.expand(&working)
}
