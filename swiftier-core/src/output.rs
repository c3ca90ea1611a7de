//! Output formatters for translated files

use serde::Serialize;
use strum::VariantNames;
use strum_macros::{Display, EnumString, VariantNames};

use crate::files::FileTranslation;
use crate::translator::OutputLine;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, VariantNames)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Swift source text
    #[default]
    Swift,
    /// JSON array of `{file, line, text}` records
    Json,
    /// Number of emitted lines
    Count,
}

impl OutputFormat {
    /// Get list of all valid format names
    pub fn valid_formats() -> &'static [&'static str] {
        Self::VARIANTS
    }
}

/// JSON output structure
#[derive(Serialize)]
struct JsonLine<'a> {
    file: &'a str,
    #[serde(flatten)]
    line: &'a OutputLine,
}

/// Format translations according to the specified format
pub fn format_translations(translations: &[FileTranslation], format: OutputFormat) -> String {
    match format {
        OutputFormat::Swift => format_swift(translations),
        OutputFormat::Json => format_json(translations),
        OutputFormat::Count => format_count(translations),
    }
}

/// Plain Swift text. With several files each one is introduced by a
/// `// file` comment line.
fn format_swift(translations: &[FileTranslation]) -> String {
    let with_headers = translations.len() > 1;
    let mut output = String::new();
    for translation in translations {
        if with_headers {
            output.push_str(&format!("// {}\n", translation.file_path));
        }
        output.push_str(&translation.text());
    }
    output
}

fn format_json(translations: &[FileTranslation]) -> String {
    let records: Vec<JsonLine> = translations
        .iter()
        .flat_map(|t| {
            t.lines.iter().map(move |line| JsonLine {
                file: &t.file_path,
                line,
            })
        })
        .collect();

    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}

fn format_count(translations: &[FileTranslation]) -> String {
    let total: usize = translations.iter().map(|t| t.lines.len()).sum();
    format!("{}\n", total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::translate_source;
    use crate::options::TranslateOptions;

    fn translation(file: &str, source: &str) -> FileTranslation {
        translate_source(source, file.to_string(), &TranslateOptions::default())
    }

    #[test]
    fn test_format_names() {
        assert_eq!("json".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!("SWIFT".parse::<OutputFormat>().ok(), Some(OutputFormat::Swift));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Count.to_string(), "count");
        assert_eq!(OutputFormat::valid_formats(), &["swift", "json", "count"]);
    }

    #[test]
    fn test_swift_single_file_has_no_header() {
        let out = format_translations(&[translation("a.m", "int x;")], OutputFormat::Swift);
        assert_eq!(out, "var x: Int\n");
    }

    #[test]
    fn test_swift_multiple_files() {
        let out = format_translations(
            &[translation("a.m", "int x;"), translation("b.m", "int y;")],
            OutputFormat::Swift,
        );
        assert_eq!(out, "// a.m\nvar x: Int\n// b.m\nvar y: Int\n");
    }

    #[test]
    fn test_json_records() {
        let out = format_translations(&[translation("a.m", "\nint x;")], OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[1]["file"], "a.m");
        assert_eq!(value[1]["line"], 2);
        assert_eq!(value[1]["text"], "var x: Int");
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_count() {
        let out = format_translations(
            &[translation("a.m", "a\nb"), translation("b.m", "#import \"x.h\"\nc")],
            OutputFormat::Count,
        );
        assert_eq!(out, "3\n");
    }
}
