//! Objective-C source files: discovery, parallel translation and output paths

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::options::TranslateOptions;
use crate::translator::{OutputLine, Translator};

/// Extensions of the files this translator accepts
pub static OBJC_EXTENSIONS: &[&str] = &["m", "mm", "h"];

/// Errors that can occur while translating files
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Not an Objective-C source file: {0}")]
    UnsupportedFile(String),
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{target} would be written from several inputs: {}", inputs.join(", "))]
    OutputCollision { target: String, inputs: Vec<String> },
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The translated lines of one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTranslation {
    pub file_path: String,
    pub lines: Vec<OutputLine>,
}

impl FileTranslation {
    /// The Swift text, one `\n`-terminated line per output line
    pub fn text(&self) -> String {
        self.lines.iter().map(|line| format!("{}\n", line.text)).collect()
    }
}

pub fn is_objc_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| OBJC_EXTENSIONS.contains(&ext))
}

/// Translate source text already in memory
pub fn translate_source(source: &str, file_path: String, options: &TranslateOptions) -> FileTranslation {
    let lines = Translator::with_options(source.lines().map(str::to_owned), options).collect();
    FileTranslation { file_path, lines }
}

pub fn translate_file(path: &Path, options: &TranslateOptions) -> Result<FileTranslation, TranslateError> {
    let shown = path.to_string_lossy().to_string();
    if !is_objc_file(&shown) {
        return Err(TranslateError::UnsupportedFile(shown));
    }
    let source = fs::read_to_string(path).map_err(|source| TranslateError::FileRead {
        path: shown.clone(),
        source,
    })?;
    debug!(file = %shown, "translating");
    Ok(translate_source(&source, shown, options))
}

/// Translate multiple files in parallel, one `Translator` per file.
/// Results keep the order of `files`.
pub fn translate_files_parallel<P: AsRef<Path> + Sync>(
    files: &[P],
    options: &TranslateOptions,
) -> Vec<Result<FileTranslation, TranslateError>> {
    files
        .par_iter()
        .map(|path| translate_file(path.as_ref(), options))
        .collect()
}

/// Expand glob patterns to file paths
pub fn expand_globs(patterns: &[String]) -> Vec<String> {
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') {
            match glob::glob(pattern) {
                Ok(paths) => {
                    for entry in paths.flatten() {
                        if entry.is_file() {
                            if let Some(path) = entry.to_str() {
                                files.push(path.to_string());
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "invalid glob pattern");
                }
            }
        } else {
            files.push(pattern.clone());
        }
    }

    files
}

/// Keep only Objective-C sources
pub fn filter_supported_files(files: Vec<String>) -> Vec<String> {
    files.into_iter().filter(|f| is_objc_file(f)).collect()
}

/// `Widget.m` translates to `Widget.swift` in the same directory. A header
/// and its implementation map to the same path, see
/// [`resolve_output_collisions`].
pub fn swift_output_path(path: &Path) -> PathBuf {
    path.with_extension("swift")
}

fn is_header(path: &str) -> bool {
    Path::new(path).extension().is_some_and(|ext| ext == "h")
}

/// Make every input map to its own `.swift` target before writing.
///
/// A header whose implementation is also selected is dropped, since its
/// `@interface` translates to nothing. Any other shared target is an error.
pub fn resolve_output_collisions(files: Vec<String>) -> Result<Vec<String>, TranslateError> {
    let mut by_target: Vec<(PathBuf, Vec<String>)> = Vec::new();
    for file in files {
        let target = swift_output_path(Path::new(&file));
        match by_target.iter_mut().find(|(t, _)| *t == target) {
            Some((_, inputs)) => inputs.push(file),
            None => by_target.push((target, vec![file])),
        }
    }

    let mut kept = Vec::new();
    for (target, mut inputs) in by_target {
        if inputs.len() > 1 {
            let (headers, sources): (Vec<String>, Vec<String>) =
                inputs.into_iter().partition(|f| is_header(f));
            for header in &headers {
                warn!(file = %header, "skipping header, its implementation writes the same file");
            }
            inputs = if sources.is_empty() { headers } else { sources };
        }
        if inputs.len() > 1 {
            return Err(TranslateError::OutputCollision {
                target: target.to_string_lossy().to_string(),
                inputs,
            });
        }
        kept.extend(inputs);
    }
    Ok(kept)
}

/// Write a translation next to its input and return the path written
pub fn write_translation(translation: &FileTranslation) -> Result<PathBuf, TranslateError> {
    let target = swift_output_path(Path::new(&translation.file_path));
    fs::write(&target, translation.text()).map_err(|source| TranslateError::FileWrite {
        path: target.to_string_lossy().to_string(),
        source,
    })?;
    Ok(target)
}
