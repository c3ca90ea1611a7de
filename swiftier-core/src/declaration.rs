//! Structural declarations
//!
//! Recognises the lines that open a type or a method: `#import`,
//! `@interface`, `@implementation`, instance variable lists and method
//! headers, and renders their Swift counterparts. Consuming the lines that
//! follow a declaration is left to the `Translator`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::source_utils::{downcase_first, split_trailing_comment};
use crate::types::resolve_type;

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#import\s+(.*)$").unwrap());
static FRAMEWORK_HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\w+/(\w+)\.h>").unwrap());
static INTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@interface\s+(\w+)(?:\s*:\s*(\w+)|\s*\((\w*)\))?").unwrap()
});
static IMPLEMENTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@implementation\s+(\w+)(?:\s*\((\w*)\))?\s*(\{)?").unwrap()
});
static END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@end\b").unwrap());
static SYNTHESIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(?:synthesize|dynamic)\b").unwrap());
static FIELD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\w[^;]*?[\s*])(\w+)\s*;").unwrap());

static METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-])\s*\(([^)]+)\)\s*(\w+)").unwrap());
static PARAM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\w*)\s*:\s*\(([^)]+)\)\s*(\w+)").unwrap());
static CONTINUATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(\w+):\s*\(([^)]+)\)\s*(\w+)").unwrap()
});
static INIT_WITH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_?initWith(\w+)$").unwrap());

/// Column offsets for parameters continued on later lines
const CONSTRUCTOR_CONTINUATION_INDENT: usize = 5;
const FUNC_CONTINUATION_OFFSET: usize = 6;

/// What an `#import` line turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// `#import <Foundation/Foundation.h>` becomes `import Foundation`
    Module(String),
    /// Local headers have no Swift counterpart
    Drop,
}

pub fn parse_import(line: &str) -> Option<Import> {
    let caps = IMPORT_RE.captures(line)?;
    Some(match FRAMEWORK_HEADER_RE.captures(&caps[1]) {
        Some(header) => Import::Module(header[1].to_string()),
        None => Import::Drop,
    })
}

/// `@interface Name`, `@interface Name : Super` or `@interface Name (Category)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceHeader {
    pub name: String,
    pub supertype: Option<String>,
    pub category: Option<String>,
}

pub fn parse_interface_header(line: &str) -> Option<InterfaceHeader> {
    let caps = INTERFACE_RE.captures(line)?;
    Some(InterfaceHeader {
        name: caps[1].to_string(),
        supertype: caps.get(2).map(|m| m.as_str().to_string()),
        category: caps.get(3).map(|m| m.as_str().to_string()),
    })
}

/// `@implementation Name`, optionally with a category or an opening `{`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationHeader {
    pub name: String,
    pub category: Option<String>,
    /// The instance variable list opens on this same line
    pub opens_fields: bool,
}

impl ImplementationHeader {
    pub fn render(&self) -> String {
        match self.category {
            Some(_) => format!("extension {} {{", self.name),
            None => format!("class {} {{", self.name),
        }
    }
}

pub fn parse_implementation_header(line: &str) -> Option<ImplementationHeader> {
    let caps = IMPLEMENTATION_RE.captures(line)?;
    Some(ImplementationHeader {
        name: caps[1].to_string(),
        category: caps.get(2).map(|m| m.as_str().to_string()),
        opens_fields: caps.get(3).is_some(),
    })
}

pub fn is_block_end(line: &str) -> bool {
    END_RE.is_match(line)
}

pub fn is_synthesize(line: &str) -> bool {
    SYNTHESIZE_RE.is_match(line)
}

/// An instance variable `Type name;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub type_spelling: String,
    pub name: String,
}

impl Field {
    pub fn render(&self) -> String {
        format!("private var {}: {}", self.name, resolve_type(&self.type_spelling))
    }
}

pub fn parse_field(line: &str) -> Option<Field> {
    let caps = FIELD_RE.captures(line)?;
    Some(Field {
        type_spelling: caps[1].trim().to_string(),
        name: caps[2].to_string(),
    })
}

/// One `keyword:(Type)name` triple of a method signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub keyword: String,
    pub type_spelling: String,
    pub name: String,
}

impl Param {
    fn new(keyword: &str, type_spelling: &str, name: &str) -> Self {
        Param {
            keyword: keyword.to_string(),
            type_spelling: type_spelling.trim().to_string(),
            name: name.to_string(),
        }
    }

    /// The external label is written only when it differs from the name
    fn render(&self) -> String {
        let ty = resolve_type(&self.type_spelling);
        if self.keyword.is_empty() || self.keyword == self.name {
            format!("{}: {}", self.name, ty)
        } else {
            format!("{} {}: {}", self.keyword, self.name, ty)
        }
    }
}

/// A parsed method header. Built while reading the signature, rendered once,
/// then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHeader {
    pub is_class_method: bool,
    pub return_type: String,
    pub name: String,
    /// Parameters on the header line itself. The first has an empty keyword:
    /// its keyword is the method name.
    pub params: Vec<Param>,
    /// Parameters read from continuation lines, one per line
    pub continued: Vec<ParamContinuation>,
    pub has_brace: bool,
}

impl MethodHeader {
    /// `init...` and `_init...` methods become constructors
    pub fn is_constructor(&self) -> bool {
        self.name.starts_with("init") || self.name.starts_with("_init")
    }

    /// Whether later lines may carry further parameters
    pub fn accepts_continuation(&self) -> bool {
        !self.has_brace && !self.params.is_empty()
    }

    /// Append a parameter read from a continuation line
    pub fn push_continuation(&mut self, continuation: ParamContinuation) {
        if continuation.opens_body {
            self.has_brace = true;
        }
        self.continued.push(continuation);
    }

    fn with_brace(&self, mut line: String) -> String {
        if self.has_brace {
            line.push_str(" {");
        }
        line
    }

    fn return_suffix(&self) -> String {
        if self.return_type == "void" {
            String::new()
        } else {
            format!(" -> {}", resolve_type(&self.return_type))
        }
    }

    /// Render the Swift header. Continued parameters go on their own lines,
    /// aligned under the opening parenthesis, each keeping its comment.
    pub fn render(&self) -> Vec<String> {
        let scope = if self.is_class_method { "class " } else { "" };

        if self.params.is_empty() {
            if self.name == "init" {
                return vec![self.with_brace("init()".to_string())];
            }
            let line = format!("{}func {}(){}", scope, self.name, self.return_suffix());
            return vec![self.with_brace(line)];
        }

        let mut params = self.params.clone();
        let (head, indent, returns) = if self.is_constructor() {
            if let Some(caps) = INIT_WITH_RE.captures(&self.name) {
                params[0].keyword = downcase_first(&caps[1]);
            }
            ("init(".to_string(), CONSTRUCTOR_CONTINUATION_INDENT, String::new())
        } else {
            (
                format!("{}func {}(", scope, self.name),
                self.name.len() + FUNC_CONTINUATION_OFFSET,
                self.return_suffix(),
            )
        };

        let rendered: Vec<String> = params.iter().map(Param::render).collect();
        let mut lines = Vec::new();
        let mut current = head + &rendered.join(", ");
        let mut comment = "";
        for continuation in &self.continued {
            current.push(',');
            lines.push(current + comment);
            current = format!("{}{}", " ".repeat(indent), continuation.param.render());
            comment = &continuation.comment;
        }
        current.push(')');
        current.push_str(&returns);
        lines.push(self.with_brace(current) + comment);
        lines
    }
}

/// Parse a `-`/`+` method header line. Returns `None` when the line does
/// not have the `(ReturnType)name` shape.
pub fn parse_method_header(line: &str) -> Option<MethodHeader> {
    let trimmed = line.trim_end();
    let (body, has_brace) = match trimmed.strip_suffix('{') {
        Some(body) => (body.trim_end(), true),
        None => (trimmed, false),
    };

    let caps = METHOD_RE.captures(body)?;
    let mut rest = &body[caps.get(0)?.end()..];

    let mut params = Vec::new();
    while let Some(param) = PARAM_RE.captures(rest) {
        let keyword = if params.is_empty() { "" } else { &param[1] };
        params.push(Param::new(keyword, &param[2], &param[3]));
        rest = &rest[param.get(0)?.end()..];
    }

    Some(MethodHeader {
        is_class_method: &caps[1] == "+",
        return_type: caps[2].trim().to_string(),
        name: caps[3].to_string(),
        params,
        continued: Vec::new(),
        has_brace,
    })
}

/// A parameter carried on a line after the method header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamContinuation {
    pub param: Param,
    /// The line ends with the `{` that opens the method body
    pub opens_body: bool,
    /// Trailing `//` comment with its leading whitespace, or empty
    pub comment: String,
}

pub fn parse_param_continuation(line: &str) -> Option<ParamContinuation> {
    let (code, comment) = split_trailing_comment(line);
    let (code, opens_body) = match code.strip_suffix('{') {
        Some(code) => (code.trim_end(), true),
        None => (code, false),
    };
    let caps = CONTINUATION_RE.captures(code)?;
    Some(ParamContinuation {
        param: Param::new(&caps[1], &caps[2], &caps[3]),
        opens_body,
        comment: comment.to_string(),
    })
}
