//! The line-buffered translation engine
//!
//! A `Translator` pulls Objective-C lines from a `LineSource`, dispatches
//! each one to the first rule that claims it and collects the Swift lines
//! that rule produces. Rules that need more context (method headers
//! spanning several lines, conditional bodies, instance variable blocks)
//! read ahead through the same source, so output follows logical statement
//! order.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use serde::Serialize;
use tracing::debug;

use crate::collapse::collapse_message_sends;
use crate::declaration::{
    is_block_end, is_synthesize, parse_field, parse_implementation_header, parse_import,
    parse_interface_header, parse_method_header, parse_param_continuation, ImplementationHeader,
    Import, InterfaceHeader,
};
use crate::options::TranslateOptions;
use crate::source::LineSource;
use crate::source_utils::split_trailing_comment;
use crate::statement::{
    apply_substitutions, ends_statement, is_return_self, is_self_delegation,
    opens_unbraced_conditional, parse_conditional, parse_local_declaration,
    rewrite_self_delegation, Conditional, ConditionalBody,
};

/// One line of Swift output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    /// 1-based number of the input line being converted when this line was
    /// produced
    #[serde(rename = "line")]
    pub source_line: u32,
    pub text: String,
}

/// Result of one `Translator::step`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Lines produced while converting the next input unit
    Emit(Vec<OutputLine>),
    /// A unit was consumed but produced no output
    Nothing,
    /// No input left
    Exhausted,
}

/// Where a forward scan over following lines stops
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanBound {
    /// After the line ending a statement, or after a nested conditional
    /// that reads its own body
    Statement,
    /// Before the first non-blank line not starting with this indentation
    Indented(String),
}

pub struct Translator<I> {
    source: LineSource<I>,
    pending: Vec<OutputLine>,
    ready: VecDeque<OutputLine>,
}

impl<I: Iterator<Item = String>> Translator<I> {
    pub fn new(lines: I) -> Self {
        Self::with_options(lines, &TranslateOptions::default())
    }

    pub fn with_options(lines: I, options: &TranslateOptions) -> Self {
        Translator {
            source: LineSource::with_dedent_width(lines, options.dedent_width),
            pending: Vec::new(),
            ready: VecDeque::new(),
        }
    }

    /// Convert the next input unit.
    ///
    /// A unit is one line plus whatever lines its rule reads ahead. Callers
    /// keep stepping until `Step::Exhausted`.
    pub fn step(&mut self) -> Step {
        if !self.convert_next_line() {
            return Step::Exhausted;
        }
        if self.pending.is_empty() {
            Step::Nothing
        } else {
            Step::Emit(std::mem::take(&mut self.pending))
        }
    }

    fn emit(&mut self, text: String) {
        self.pending.push(OutputLine {
            source_line: self.source.line_number(),
            text,
        });
    }

    fn emit_with(&mut self, mut text: String, comment: &str) {
        text.push_str(comment);
        self.emit(text);
    }

    /// Read one line and convert it. Returns `false` at end of input.
    fn convert_next_line(&mut self) -> bool {
        let Some(line) = self.source.next_line() else {
            return false;
        };
        let (code, comment) = split_trailing_comment(&line);
        if code.is_empty() {
            self.emit(comment.to_string());
        } else {
            self.convert_top_level(code, comment);
        }
        true
    }

    fn convert_top_level(&mut self, line: &str, comment: &str) {
        if let Some(import) = parse_import(line) {
            match import {
                Import::Module(module) => self.emit_with(format!("import {}", module), comment),
                Import::Drop => {
                    debug!(line = self.source.line_number(), "dropping local import");
                }
            }
            return;
        }
        if let Some(header) = parse_implementation_header(line) {
            self.convert_implementation(&header, comment);
            return;
        }
        if let Some(header) = parse_interface_header(line) {
            self.skip_interface(&header);
            return;
        }
        if is_block_end(line) {
            self.emit_with("}".to_string(), comment);
            return;
        }
        if is_synthesize(line) {
            self.skip_synthesize(line);
            return;
        }
        if line.starts_with(['+', '-']) {
            self.convert_method_header(line, comment);
            return;
        }
        self.convert_statement(line, comment);
    }

    fn convert_implementation(&mut self, header: &ImplementationHeader, comment: &str) {
        self.emit_with(header.render(), comment);

        let brace_follows = !header.opens_fields
            && self.source.peek().is_some_and(|next| next.trim() == "{");
        if brace_follows {
            self.source.next_line();
        } else if !header.opens_fields {
            return;
        }

        self.emit(String::new());
        loop {
            let Some(line) = self.source.next_line() else {
                debug!(class = %header.name, "end of input inside instance variables");
                return;
            };
            let (code, comment) = split_trailing_comment(&line);
            if code.trim() == "}" {
                return;
            }
            if let Some(field) = parse_field(code) {
                self.emit_with(field.render(), comment);
            }
        }
    }

    fn skip_interface(&mut self, header: &InterfaceHeader) {
        debug!(
            line = self.source.line_number(),
            name = %header.name,
            supertype = ?header.supertype,
            category = ?header.category,
            "skipping @interface"
        );
        loop {
            match self.source.next_line() {
                Some(line) if is_block_end(&line) => break,
                Some(_) => {}
                None => {
                    debug!(name = %header.name, "end of input inside @interface");
                    return;
                }
            }
        }
        while self.source.peek().is_some_and(str::is_empty) {
            self.source.next_line();
        }
    }

    /// Drop a `@synthesize` declaration, which may wrap onto later lines
    fn skip_synthesize(&mut self, line: &str) {
        debug!(line = self.source.line_number(), "dropping @synthesize");
        if ends_statement(line) {
            return;
        }
        while let Some(next) = self.source.next_line() {
            if ends_statement(&next) {
                return;
            }
        }
        debug!("end of input inside @synthesize");
    }

    fn convert_method_header(&mut self, line: &str, comment: &str) {
        let Some(mut header) = parse_method_header(line) else {
            self.emit_with(line.to_string(), comment);
            return;
        };

        while header.accepts_continuation() {
            let Some(continuation) = self.source.peek().and_then(parse_param_continuation) else {
                break;
            };
            self.source.next_line();
            header.push_continuation(continuation);
        }

        for (i, text) in header.render().into_iter().enumerate() {
            if i == 0 {
                self.emit_with(text, comment);
            } else {
                self.emit(text);
            }
        }
    }

    fn convert_statement(&mut self, line: &str, comment: &str) {
        let substituted = apply_substitutions(line);
        let converted = collapse_message_sends(&substituted);

        if let Some(conditional) = parse_conditional(&converted) {
            self.convert_conditional(conditional, comment);
            return;
        }

        if is_self_delegation(&substituted) {
            let text = rewrite_self_delegation(&converted).unwrap_or(converted);
            self.emit_with(text, comment);
            return;
        }

        let text = match parse_local_declaration(&converted) {
            Some(declaration) => declaration.render(),
            None => converted,
        };
        self.emit_with(text, comment);
    }

    fn convert_conditional(&mut self, conditional: Conditional, comment: &str) {
        if conditional.is_self_guard() {
            self.elide_self_guard(&conditional.indent);
            return;
        }

        self.emit_with(conditional.render(), comment);
        if conditional.body != ConditionalBody::Open {
            return;
        }

        if self.source.peek().is_some_and(|next| next.trim() == "{") {
            self.source.next_line();
            return;
        }
        self.convert_block(&ScanBound::Statement);
        self.emit(format!("{}}}", conditional.indent));
    }

    /// Emit the body of an initializer's `if (self) { ... }` one level
    /// shallower and drop the guard, its closing brace and `return self;`.
    fn elide_self_guard(&mut self, indent: &str) {
        debug!(line = self.source.line_number(), "eliding if (self) guard");
        {
            let mut scope = DedentScope::new(self);
            scope.convert_block(&ScanBound::Indented(indent.to_string()));
        }

        if self.source.peek().is_some_and(|next| next.trim_start().starts_with('}')) {
            self.source.next_line();
        }
        if self.source.peek().is_some_and(is_return_self) {
            self.source.next_line();
        }
    }

    /// Convert following lines until `bound` says stop or input ends
    fn convert_block(&mut self, bound: &ScanBound) {
        loop {
            let Some(next) = self.source.peek() else {
                debug!(bound = ?bound, "end of input inside block");
                return;
            };
            let is_last = match bound {
                ScanBound::Statement => ends_statement(next) || opens_unbraced_conditional(next),
                ScanBound::Indented(indent) => {
                    if !next.is_empty() && !next.starts_with(indent.as_str()) {
                        return;
                    }
                    false
                }
            };
            self.convert_next_line();
            if is_last {
                return;
            }
        }
    }
}

impl<I: Iterator<Item = String>> Iterator for Translator<I> {
    type Item = OutputLine;

    fn next(&mut self) -> Option<OutputLine> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(line);
            }
            match self.step() {
                Step::Emit(lines) => self.ready.extend(lines),
                Step::Nothing => {}
                Step::Exhausted => return None,
            }
        }
    }
}

/// De-indent mode for the lifetime of the scope; the previous setting is
/// restored on drop.
struct DedentScope<'a, I: Iterator<Item = String>> {
    translator: &'a mut Translator<I>,
    previous: bool,
}

impl<'a, I: Iterator<Item = String>> DedentScope<'a, I> {
    fn new(translator: &'a mut Translator<I>) -> Self {
        let previous = translator.source.set_dedent(true);
        DedentScope { translator, previous }
    }
}

impl<I: Iterator<Item = String>> Deref for DedentScope<'_, I> {
    type Target = Translator<I>;

    fn deref(&self) -> &Translator<I> {
        &*self.translator
    }
}

impl<I: Iterator<Item = String>> DerefMut for DedentScope<'_, I> {
    fn deref_mut(&mut self) -> &mut Translator<I> {
        &mut *self.translator
    }
}

impl<I: Iterator<Item = String>> Drop for DedentScope<'_, I> {
    fn drop(&mut self) {
        self.translator.source.set_dedent(self.previous);
    }
}

/// Translate a whole Objective-C source text. Every output line is
/// terminated by `\n`.
pub fn translate_str(source: &str) -> String {
    translate_str_with_options(source, &TranslateOptions::default())
}

pub fn translate_str_with_options(source: &str, options: &TranslateOptions) -> String {
    Translator::with_options(source.lines().map(str::to_owned), options)
        .map(|line| line.text + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator(text: &str) -> Translator<std::vec::IntoIter<String>> {
        let lines: Vec<String> = text.lines().map(str::to_owned).collect();
        Translator::new(lines.into_iter())
    }

    fn lines(text: &str) -> Vec<String> {
        translator(text).map(|line| line.text).collect()
    }

    #[test]
    fn test_step_contract() {
        let mut t = translator("#import \"Foo.h\"\nint x;");
        assert_eq!(t.step(), Step::Nothing);
        assert_eq!(
            t.step(),
            Step::Emit(vec![OutputLine {
                source_line: 2,
                text: "var x: Int".to_string()
            }])
        );
        assert_eq!(t.step(), Step::Exhausted);
        assert_eq!(t.step(), Step::Exhausted);
    }

    #[test]
    fn test_pass_through() {
        assert_eq!(lines("x = y + 1"), vec!["x = y + 1"]);
        assert_eq!(lines("#define FOO 1"), vec!["#define FOO 1"]);
    }

    #[test]
    fn test_blank_lines_and_comments() {
        assert_eq!(lines("\n// note\n"), vec!["", "// note"]);
        assert_eq!(
            lines("    NSLog(@\"hi\");  // greet"),
            vec!["    println(\"hi\")  // greet"]
        );
    }

    #[test]
    fn test_comment_marker_inside_string() {
        assert_eq!(
            lines("    NSLog(@\"http://x\");"),
            vec!["    println(\"http://x\")"]
        );
    }

    #[test]
    fn test_conditional_reconstruction() {
        let out = lines("    if (x)\n        a = 1\n        b = 2;\n    c = 3;");
        assert_eq!(
            out,
            vec!["    if x {", "        a = 1", "        b = 2", "    }", "    c = 3"]
        );
    }

    #[test]
    fn test_conditional_brace_on_next_line() {
        let out = lines("if (ok)\n{\n    go();\n}");
        assert_eq!(out, vec!["if ok {", "    go()", "}"]);
    }

    #[test]
    fn test_nested_unbraced_conditionals() {
        let out = lines("if (a)\n    if (b)\n        f();\ng();");
        assert_eq!(out, vec!["if a {", "    if b {", "        f()", "    }", "}", "g()"]);
    }

    #[test]
    fn test_else_chain() {
        let out = lines("    if (x) {\n        f();\n    } else\n        g();");
        assert_eq!(
            out,
            vec!["    if x {", "        f()", "    } else {", "        g()", "    }"]
        );
    }

    #[test]
    fn test_conditional_at_end_of_input() {
        assert_eq!(lines("if (x)\n    a = 1"), vec!["if x {", "    a = 1", "}"]);
        assert_eq!(lines("if (x)"), vec!["if x {", "}"]);
    }

    #[test]
    fn test_self_guard_is_elided() {
        let source = "\
- (id)init {
    self = [super init];
    if (self) {
        _count = 0;
    }
    return self;
}";
        assert_eq!(
            lines(source),
            vec!["init() {", "    super.init()", "    _count = 0", "}"]
        );
    }

    #[test]
    fn test_self_guard_keeps_blank_lines() {
        let source = "    if (self) {\n        a = 1;\n\n        b = 2;\n    }\n    return self;\ndone";
        assert_eq!(lines(source), vec!["    a = 1", "", "    b = 2", "done"]);
    }

    #[test]
    fn test_self_guard_at_end_of_input() {
        assert_eq!(lines("    if (self) {\n        a = 1;"), vec!["    a = 1"]);
    }

    #[test]
    fn test_self_guard_keeps_outer_dedent() {
        let mut t = translator("        if (self) {\n            a = 1;");
        t.source.set_dedent(true);
        let expected = OutputLine {
            source_line: 2,
            text: "        a = 1".to_string(),
        };
        assert_eq!(t.step(), Step::Emit(vec![expected]));
        assert_eq!(t.step(), Step::Exhausted);
        assert!(t.source.is_dedenting());
    }

    #[test]
    fn test_dedent_scope_restores_previous_mode() {
        let mut t = translator("");
        {
            let scope = DedentScope::new(&mut t);
            assert!(scope.source.is_dedenting());
        }
        assert!(!t.source.is_dedenting());

        t.source.set_dedent(true);
        {
            let _scope = DedentScope::new(&mut t);
        }
        assert!(t.source.is_dedenting());
    }

    #[test]
    fn test_dedent_width_option() {
        let options = TranslateOptions::new().with_dedent_width(2);
        let out = translate_str_with_options("  if (self) {\n    a = 1;\n  }", &options);
        assert_eq!(out, "  a = 1\n");
    }

    #[test]
    fn test_interface_is_skipped() {
        let source = "\
@interface Foo : NSObject
@property int x;
- (void)bar;
@end

@implementation Foo
@end";
        assert_eq!(lines(source), vec!["class Foo {", "}"]);
    }

    #[test]
    fn test_unterminated_interface() {
        assert!(lines("@interface Foo ()\n- (void)x;").is_empty());
    }

    #[test]
    fn test_instance_variables() {
        let source = "\
@implementation Foo
{
    NSString *_name;
    int _count;  // items
}
@end";
        assert_eq!(
            lines(source),
            vec![
                "class Foo {",
                "",
                "private var _name: String?",
                "private var _count: Int  // items",
                "}",
            ]
        );
    }

    #[test]
    fn test_instance_variables_on_header_line() {
        let out = lines("@implementation Foo {\n    BOOL _on;\n}\n@end");
        assert_eq!(out, vec!["class Foo {", "", "private var _on: Bool", "}"]);
    }

    #[test]
    fn test_synthesize_is_dropped() {
        assert_eq!(lines("@synthesize a = _a;\nx"), vec!["x"]);
        assert_eq!(lines("@synthesize a = _a,\n    b = _b;\nx"), vec!["x"]);
        assert!(lines("@synthesize a,").is_empty());
    }

    #[test]
    fn test_multi_line_method_header() {
        let source = "\
- (void)moveTo:(int)x // move
         andY:(int)y  // vertical
{";
        assert_eq!(
            lines(source),
            vec![
                "func moveTo(x: Int, // move",
                "            andY y: Int)  // vertical",
                "{",
            ]
        );
    }

    #[test]
    fn test_method_header_stops_after_braced_continuation() {
        let source = "- (void)a:(int)x\n   b:(int)y {\n   c:(int)z";
        let out = lines(source);
        assert_eq!(out[..2], ["func a(x: Int,", "       b y: Int) {"]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_unrecognised_sigil_line_passes_through() {
        assert_eq!(lines("-- weird"), vec!["-- weird"]);
    }

    #[test]
    fn test_source_line_numbers() {
        let out: Vec<u32> = translator("\nif (x)\n    y();")
            .map(|line| line.source_line)
            .collect();
        assert_eq!(out, vec![1, 2, 3, 3]);
    }

    #[test]
    fn test_translate_str() {
        assert_eq!(translate_str("int x = 5;\nint y;"), "let x = 5\nvar y: Int\n");
        assert_eq!(translate_str(""), "");
    }
}
