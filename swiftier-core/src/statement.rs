//! Line-level rewrites for everything that is not a declaration
//!
//! The functions here are pure: they look at one line and describe what it
//! becomes. Rules that need to read further lines (conditional bodies, the
//! `if (self)` guard) are driven by the `Translator`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::source_utils::{find_matching_paren, split_trailing_comment};
use crate::types::resolve_type;

/// Swift spelling of `NSLog`
pub const LOGGING_CALL: &str = "println";
/// Swift spelling of the `NSAssert` family
pub const ASSERT_CALL: &str = "assert";

/// Words that look like a type in `word name` but never are one
pub static NON_TYPE_KEYWORDS: &[&str] = &["return", "goto", "throw", "case", "typedef", "delete", "else"];

static SUBSTITUTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"\b__block\s+").unwrap(), ""),
        (Regex::new(r"\bNO\b").unwrap(), "false"),
        (Regex::new(r"\bYES\b").unwrap(), "true"),
        (Regex::new(r"\bNSLog\b").unwrap(), LOGGING_CALL),
        (Regex::new(r"\bNS(?:Parameter|C)?Assert\b").unwrap(), ASSERT_CALL),
    ]
});

static IF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)(\}?\s*(?:else\s+)?if)\s*\(").unwrap());
static ELSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)(\}?\s*else)\b\s*(.*)$").unwrap());
static LOCAL_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(\w+)((?:\s|\*)+)(\w+)\s*(?:=\s*(.*))?$").unwrap()
});
static SELF_SEND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*self\s*=\s*\[").unwrap());
static SELF_ASSIGN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)self\s*=\s*(.*)$").unwrap());
static DELEGATED_INIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(super|self)\(").unwrap());
static TERMINATED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r";\s*(//.*)?$").unwrap());
static RETURN_SELF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*return\s+self\s*;").unwrap());

/// Remove the `@` of `@"..."` literals, except after `%` where `%@"` is
/// the tail of a format specifier such as `"%@"`.
fn strip_literal_markers(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut prev: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '@' && chars.peek() == Some(&'"') && prev != Some('%') {
            prev = Some(c);
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Apply the fixed token substitutions and drop one trailing `;`.
pub fn apply_substitutions(line: &str) -> String {
    let mut result = strip_literal_markers(line);
    if let Some(stripped) = result.trim_end().strip_suffix(';') {
        result = stripped.to_string();
    }
    for (pattern, replacement) in SUBSTITUTIONS.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result
}

/// Whether a raw source line ends a statement
pub fn ends_statement(line: &str) -> bool {
    TERMINATED_RE.is_match(line)
}

pub fn is_return_self(line: &str) -> bool {
    RETURN_SELF_RE.is_match(line)
}

/// What follows the condition of an `if`/`else` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalBody {
    /// Nothing: the body is on the following line(s)
    Open,
    /// Text starting with `{`, kept as written
    Braced(String),
    /// A single statement on the header line
    Inline(String),
}

/// An `if`, `else if` or `else` header, possibly preceded by `}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub indent: String,
    pub keyword: String,
    pub condition: Option<String>,
    pub body: ConditionalBody,
}

impl Conditional {
    fn header(&self) -> String {
        match &self.condition {
            Some(condition) => format!("{}{} {}", self.indent, self.keyword, condition),
            None => format!("{}{}", self.indent, self.keyword),
        }
    }

    /// Swift rendering of the header line. An `Open` header gets its `{`
    /// here; the caller supplies the matching close.
    pub fn render(&self) -> String {
        match &self.body {
            ConditionalBody::Open => format!("{} {{", self.header()),
            ConditionalBody::Braced(rest) => format!("{} {}", self.header(), rest),
            ConditionalBody::Inline(statement) => format!("{} {{ {} }}", self.header(), statement),
        }
    }

    /// The `if (self) {` guard wrapping an initializer body
    pub fn is_self_guard(&self) -> bool {
        self.keyword == "if"
            && self.condition.as_deref() == Some("self")
            && !self.indent.is_empty()
            && self.body == ConditionalBody::Braced("{".to_string())
    }
}

fn classify_body(rest: &str) -> ConditionalBody {
    let rest = rest.trim();
    if rest.is_empty() {
        ConditionalBody::Open
    } else if rest.starts_with('{') {
        ConditionalBody::Braced(rest.to_string())
    } else {
        ConditionalBody::Inline(rest.to_string())
    }
}

/// Parse a conditional header. An `if` whose parenthesis never closes on
/// this line is not treated as a conditional.
pub fn parse_conditional(line: &str) -> Option<Conditional> {
    if let Some(caps) = IF_RE.captures(line) {
        let open = caps.get(0)?.end() - 1;
        let close = find_matching_paren(line, open)?;
        return Some(Conditional {
            indent: caps[1].to_string(),
            keyword: caps[2].to_string(),
            condition: Some(line[open + 1..close].trim().to_string()),
            body: classify_body(&line[close + 1..]),
        });
    }

    let caps = ELSE_RE.captures(line)?;
    Some(Conditional {
        indent: caps[1].to_string(),
        keyword: caps[2].to_string(),
        condition: None,
        body: classify_body(&caps[3]),
    })
}

/// Whether a raw line opens a conditional that reads its own body from the
/// following lines
pub fn opens_unbraced_conditional(line: &str) -> bool {
    let (code, _) = split_trailing_comment(line);
    let code = apply_substitutions(code);
    matches!(parse_conditional(&code), Some(c) if c.body == ConditionalBody::Open)
}

/// `self = [...]` before message sends are converted
pub fn is_self_delegation(line: &str) -> bool {
    SELF_SEND_RE.is_match(line)
}

/// Drop the `self =` of an already converted initializer delegation.
/// `super(...)` and `self(...)` become `super.init(...)`/`self.init(...)`.
/// Returns `None` when the right-hand side still holds an unresolved send.
pub fn rewrite_self_delegation(converted: &str) -> Option<String> {
    let caps = SELF_ASSIGN_RE.captures(converted)?;
    let rhs = caps[2].trim();
    if rhs.contains('[') {
        return None;
    }
    let rhs = DELEGATED_INIT_RE.replace(rhs, "$1.init(");
    Some(format!("{}{}", &caps[1], rhs))
}

/// `Type name` or `Type name = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDeclaration {
    pub indent: String,
    pub type_spelling: String,
    pub name: String,
    pub value: Option<String>,
}

impl LocalDeclaration {
    pub fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("{}let {} = {}", self.indent, self.name, value),
            None => format!(
                "{}var {}: {}",
                self.indent,
                self.name,
                resolve_type(&self.type_spelling)
            ),
        }
    }
}

pub fn parse_local_declaration(line: &str) -> Option<LocalDeclaration> {
    let caps = LOCAL_DECL_RE.captures(line)?;
    let type_name = &caps[2];
    if NON_TYPE_KEYWORDS.contains(&type_name) {
        return None;
    }
    let type_spelling = if caps[3].contains('*') {
        format!("{}*", type_name)
    } else {
        type_name.to_string()
    };
    Some(LocalDeclaration {
        indent: caps[1].to_string(),
        type_spelling,
        name: caps[4].to_string(),
        value: caps.get(5).map(|m| m.as_str().trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutions() {
        assert_eq!(apply_substitutions(r#"NSLog(@"hi");"#), r#"println("hi")"#);
        assert_eq!(apply_substitutions("done = YES;"), "done = true");
        assert_eq!(apply_substitutions("if (x == NO)"), "if (x == false)");
        assert_eq!(apply_substitutions("__block int n = 0;"), "int n = 0");
        assert_eq!(apply_substitutions("NSParameterAssert(x);"), "assert(x)");
        assert_eq!(apply_substitutions("NSCAssert(x, @\"bad\");"), "assert(x, \"bad\")");
        assert_eq!(apply_substitutions("NOTHING = YESTERDAY"), "NOTHING = YESTERDAY");
    }

    #[test]
    fn test_format_specifier_marker_is_kept() {
        assert_eq!(
            apply_substitutions(r#"NSLog(@"%@"@"x", s);"#),
            r#"println("%@""x", s)"#
        );
    }

    #[test]
    fn test_only_one_trailing_semicolon_is_dropped() {
        assert_eq!(apply_substitutions("for (;;) ;;"), "for (;;) ;");
        assert_eq!(apply_substitutions("a; b"), "a; b");
    }

    #[test]
    fn test_if_headers() {
        let c = parse_conditional("    if (x > 0)").unwrap();
        assert_eq!(c.condition.as_deref(), Some("x > 0"));
        assert_eq!(c.body, ConditionalBody::Open);
        assert_eq!(c.render(), "    if x > 0 {");

        let c = parse_conditional("if (f(a) && b) {").unwrap();
        assert_eq!(c.render(), "if f(a) && b {");

        let c = parse_conditional("    } else if (y) {").unwrap();
        assert_eq!(c.keyword, "} else if");
        assert_eq!(c.render(), "    } else if y {");
    }

    #[test]
    fn test_inline_body() {
        let c = parse_conditional("    if (!ok) return nil").unwrap();
        assert_eq!(c.render(), "    if !ok { return nil }");
    }

    #[test]
    fn test_else_headers() {
        assert_eq!(parse_conditional("    else").unwrap().render(), "    else {");
        assert_eq!(parse_conditional("    } else {").unwrap().render(), "    } else {");
        assert_eq!(parse_conditional("}else{").unwrap().render(), "}else {");
        assert!(parse_conditional("    elsewhere = 1").is_none());
    }

    #[test]
    fn test_unclosed_condition_is_not_a_conditional() {
        assert!(parse_conditional("    if (a &&").is_none());
    }

    #[test]
    fn test_self_guard() {
        assert!(parse_conditional("    if (self) {").unwrap().is_self_guard());
        assert!(!parse_conditional("if (self) {").unwrap().is_self_guard());
        assert!(!parse_conditional("    if (self)").unwrap().is_self_guard());
        assert!(!parse_conditional("    if (self.ready) {").unwrap().is_self_guard());
    }

    #[test]
    fn test_unbraced_conditional_detection() {
        assert!(opens_unbraced_conditional("        if (y) // check"));
        assert!(!opens_unbraced_conditional("        if (y) {"));
        assert!(!opens_unbraced_conditional("        if (y) z();"));
        assert!(!opens_unbraced_conditional("        z();"));
    }

    #[test]
    fn test_statement_terminators() {
        assert!(ends_statement("    x = 1;"));
        assert!(ends_statement("    x = 1;  // done"));
        assert!(!ends_statement("    x = 1"));
        assert!(is_return_self("    return self;"));
        assert!(!is_return_self("    return selfish;"));
    }

    #[test]
    fn test_self_delegation() {
        assert!(is_self_delegation("    self = [super init];"));
        assert!(!is_self_delegation("    self.x = [a b];"));
        assert_eq!(
            rewrite_self_delegation("    self = super()").as_deref(),
            Some("    super.init()")
        );
        assert_eq!(
            rewrite_self_delegation("    self = super(frame: frame)").as_deref(),
            Some("    super.init(frame: frame)")
        );
        assert_eq!(
            rewrite_self_delegation("    self = other.configure()").as_deref(),
            Some("    other.configure()")
        );
        assert_eq!(rewrite_self_delegation("    self = [x: 1]"), None);
    }

    #[test]
    fn test_local_declarations() {
        assert_eq!(parse_local_declaration("int x = 5").unwrap().render(), "let x = 5");
        assert_eq!(parse_local_declaration("int x").unwrap().render(), "var x: Int");
        assert_eq!(
            parse_local_declaration("    NSString *name").unwrap().render(),
            "    var name: String?"
        );
        assert_eq!(
            parse_local_declaration("    NSString* s = foo.bar()").unwrap().render(),
            "    let s = foo.bar()"
        );
    }

    #[test]
    fn test_keywords_are_not_types() {
        assert!(parse_local_declaration("    return x").is_none());
        assert!(parse_local_declaration("    goto done").is_none());
        assert!(parse_local_declaration("    x = 5").is_none());
        assert!(parse_local_declaration("    static int x = 0").is_none());
    }
}
