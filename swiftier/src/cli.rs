//! CLI argument parsing using clap

use clap::Parser;

/// Quick and dirty Objective-C to Swift translator
#[derive(Parser, Debug)]
#[command(name = "swiftier")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Translate one file to stdout
    swiftier Widget.m

    # Write Widget.swift next to every implementation file
    swiftier "src/**/*.m" --write

    # Translate from stdin
    cat Widget.m | swiftier

    # Count emitted lines across a project
    swiftier "src/**/*.m" -o count

The output is a starting point for a manual port; expect to fix it up by hand.
"#)]
pub struct Args {
    /// Files to translate (supports glob patterns like "src/**/*.m")
    #[arg()]
    pub files: Vec<String>,

    /// Output format: swift (default), json, count
    #[arg(short = 'o', long = "output", default_value = "swift")]
    pub output: String,

    /// Write <name>.swift next to each input instead of printing
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Spaces removed per line when unwrapping an `if (self)` initializer guard
    #[arg(long = "dedent-width", default_value_t = 4)]
    pub dedent_width: usize,

    /// Number of parallel workers
    #[arg(short = 'c', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Show verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["swiftier", "a.m"]);
        assert_eq!(args.files, vec!["a.m"]);
        assert_eq!(args.output, "swift");
        assert_eq!(args.dedent_width, 4);
        assert!(!args.write);
        assert!(args.concurrency.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from(["swiftier", "-o", "json", "-w", "-c", "2", "-v", "x.m", "y.h"]);
        assert_eq!(args.output, "json");
        assert!(args.write);
        assert_eq!(args.concurrency, Some(2));
        assert!(args.verbose);
        assert_eq!(args.files.len(), 2);
    }
}
