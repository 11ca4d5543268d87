use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use quill_core::options::{load_options_file, render_options, Extensions, ReaderOptions};
use quill_core::{format_error, Reader, ERROR_TAG};
use tracing::debug;
use tracing_subscriber::prelude::*;

fn help() -> ! {
    println!("Usage: quill [--config PATH] [--baseline] [--print-config] [-e CODE] [file]");
    println!();
    println!("Reads forms and prints each one with trigger syntax expanded.");
    println!();
    println!("Options:");
    println!("  --config PATH   Load reader options from a TOML file");
    println!("  --baseline      Disable every trigger extension");
    println!("  --print-config  Print the active options and trigger table, then exit");
    println!("  -e CODE         Expand CODE instead of reading a file or stdin");
    println!("  --version       Show version");
    println!("  -h, --help      Show this help");
    println!();
    println!("Set QUILL_LOG (e.g. QUILL_LOG=debug) to enable logging on stderr.");
    process::exit(0);
}

fn unknown_option(opt: &str) -> ! {
    eprintln!("unknown option: {}", opt);
    help();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", ERROR_TAG, message);
    process::exit(1);
}

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    baseline: bool,
    print_config: bool,
    code: Option<String>,
    file: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => help(),
            "--version" => {
                println!("quill {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--config" => match iter.next() {
                Some(path) => args.config = Some(PathBuf::from(path)),
                None => fail("--config requires a path"),
            },
            "--baseline" => args.baseline = true,
            "--print-config" => args.print_config = true,
            "-e" => match iter.next() {
                Some(code) => args.code = Some(code),
                None => fail("-e requires code"),
            },
            opt if opt.starts_with('-') && opt != "-" => unknown_option(opt),
            path => {
                if args.file.is_some() {
                    fail(format!("unexpected argument: {}", path));
                }
                args.file = Some(PathBuf::from(path));
            }
        }
    }
    args
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("QUILL_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn resolve_options(args: &Args) -> ReaderOptions {
    let mut options = match &args.config {
        Some(path) => load_options_file(path).unwrap_or_else(|e| fail(e)),
        None => ReaderOptions::default(),
    };
    if args.baseline {
        options = options.with_extensions(Extensions::none());
    }
    if options.source_name.is_none() {
        let name = match (&args.code, &args.file) {
            (Some(_), _) => Some("<expr>".to_string()),
            (None, Some(path)) if path.as_os_str() != "-" => Some(path.display().to_string()),
            _ => Some("<stdin>".to_string()),
        };
        options = options.with_source_name(name);
    }
    options
}

fn print_config(options: &ReaderOptions, reader: &Reader) {
    match render_options(options) {
        Ok(text) => print!("{}", text),
        Err(e) => fail(e),
    }
    println!();
    println!("# triggers");
    for (key, handler) in reader.registry().bindings() {
        println!("# {:<4} {}", key.to_string(), handler);
    }
}

fn read_source(args: &Args) -> String {
    if let Some(code) = &args.code {
        return code.clone();
    }
    match &args.file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("failed to read {}: {}", path.display(), e))),
        _ => io::read_to_string(io::stdin())
            .unwrap_or_else(|e| fail(format!("failed to read stdin: {}", e))),
    }
}

fn main() {
    init_logging();
    let args = parse_args();
    let options = resolve_options(&args);
    let mut reader = Reader::from_options(&options);
    debug!(triggers = reader.registry().len(), "reader ready");

    if args.print_config {
        print_config(&options, &reader);
        return;
    }

    let source = read_source(&args);
    for form in reader.forms(&source) {
        match form {
            Ok(expr) => println!("{}", expr),
            Err(err) => fail(format_error(&err, &source, options.source_name.as_deref())),
        }
    }
}
