//! swiftier - Quick and dirty Objective-C to Swift translator
//!
//! This is the main CLI entry point: it collects input, runs the
//! translation engine and prints or writes the results.

mod cli;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use swiftier_core::{
    expand_globs, filter_supported_files, format_translations, resolve_output_collisions,
    translate_files_parallel, write_translation, FileTranslation, OutputFormat, Step, TranslateOptions, Translator,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use clap::Parser;
use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Log to stderr. `RUST_LOG` wins over the built-in default.
fn init_tracing(verbose: bool) {
    let default = if verbose { "swiftier_core=debug,swiftier=debug" } else { "swiftier_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let format: OutputFormat = args.output.parse().map_err(|_| {
        anyhow!(
            "invalid format '{}'. Valid formats: {}",
            args.output,
            OutputFormat::valid_formats().join(", ")
        )
    })?;
    let options = TranslateOptions::new().with_dedent_width(args.dedent_width);

    let requested = expand_globs(&args.files);
    let files = filter_supported_files(requested.clone());
    for skipped in requested.iter().filter(|f| !files.contains(f)) {
        warn!(file = %skipped, "skipping file without an Objective-C extension");
    }
    let files = if args.write { resolve_output_collisions(files)? } else { files };

    if args.files.is_empty() {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("Usage: swiftier <FILES>... [OPTIONS]");
            eprintln!("   or: cat Widget.m | swiftier");
            eprintln!("\nUse --help for more information.");
            bail!("no input files");
        }
        if args.write {
            bail!("--write needs input files");
        }
        return translate_stdin(format, &options);
    }

    if files.is_empty() {
        bail!("no Objective-C files among the inputs");
    }

    let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build_global()
        .ok();

    let mut translations = Vec::new();
    let mut failures = 0;
    for result in translate_files_parallel(&files, &options) {
        match result {
            Ok(translation) => translations.push(translation),
            Err(e) => {
                eprintln!("error: {}", e);
                failures += 1;
            }
        }
    }

    if args.write {
        for translation in &translations {
            let target = write_translation(translation)?;
            info!(from = %translation.file_path, to = %target.display(), "wrote");
        }
    } else {
        print_output(&format_translations(&translations, format))?;
    }

    if failures > 0 {
        bail!("{} of {} files could not be translated", failures, files.len());
    }
    Ok(())
}

/// Translate stdin. Swift output streams line by line as each input unit
/// is converted; the other formats need the whole result first.
fn translate_stdin(format: OutputFormat, options: &TranslateOptions) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let lines = stdin.lock().lines().map_while(|line| match line {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "stopped reading stdin");
            None
        }
    });
    let mut translator = Translator::with_options(lines, options);

    if format != OutputFormat::Swift {
        let translation = FileTranslation {
            file_path: "<stdin>".to_string(),
            lines: translator.collect(),
        };
        return print_output(&format_translations(&[translation], format));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    loop {
        match translator.step() {
            Step::Emit(lines) => {
                for line in lines {
                    writeln!(out, "{}", line.text).context("writing to stdout")?;
                }
                out.flush().ok();
            }
            Step::Nothing => {}
            Step::Exhausted => break,
        }
    }
    debug!("stdin exhausted");
    Ok(())
}

fn print_output(text: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(text.as_bytes()).context("writing to stdout")?;
    out.flush().ok();
    Ok(())
}
