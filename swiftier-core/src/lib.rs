//! swiftier-core: Quick and dirty Objective-C to Swift rewriting
//!
//! This library provides:
//! - A line-buffered translation engine with one line of lookahead
//! - Message send collapsing (`[[Foo alloc] initWithName:n]` to `Foo(name: n)`)
//! - Class, method, conditional and declaration rewrites
//! - Parallel file translation and several output formats
//!
//! Output is an approximation meant to save editing time, not code that is
//! guaranteed to compile.

pub mod collapse;
pub mod declaration;
pub mod files;
pub mod message;
pub mod options;
pub mod output;
pub mod source;
pub mod source_utils;
pub mod statement;
pub mod translator;
pub mod types;

pub use collapse::collapse_message_sends;
pub use files::{
    expand_globs, filter_supported_files, is_objc_file, resolve_output_collisions,
    swift_output_path, translate_file, translate_files_parallel, translate_source,
    write_translation, FileTranslation,
    TranslateError, OBJC_EXTENSIONS,
};
pub use message::resolve_message_send;
pub use options::TranslateOptions;
pub use output::{format_translations, OutputFormat};
pub use source::LineSource;
pub use translator::{translate_str, translate_str_with_options, OutputLine, Step, Translator};
pub use types::{resolve_type, TYPE_MAPPINGS};
