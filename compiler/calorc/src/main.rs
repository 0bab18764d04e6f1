//! Calor compiler CLI.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use calor_diagnostic::emitter::{ColorMode, DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use calor_diagnostic::Diagnostic;
use calorc::EmitOptions;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    let command = args[1].as_str();
    match command {
        "build" => {
            let Some(path) = file_arg(&args) else {
                eprintln!("Usage: calor build <file.calor> [-o <out.cs>] [--no-prelude] [--json]");
                return ExitCode::FAILURE;
            };
            let Some(source) = read_source(&path) else {
                return ExitCode::FAILURE;
            };
            let options = EmitOptions {
                prelude: !has_flag(&args, "--no-prelude"),
            };
            let output = calorc::compile_to_host(&source, &options);
            report(&output.diagnostics, has_flag(&args, "--json"));
            match output.host_source {
                Some(host_source) => {
                    let out_path = output_path(&args, &path);
                    if let Err(error) = std::fs::write(&out_path, host_source) {
                        eprintln!("error: cannot write {}: {error}", out_path.display());
                        return ExitCode::FAILURE;
                    }
                    println!("wrote {}", out_path.display());
                    ExitCode::SUCCESS
                }
                None => ExitCode::FAILURE,
            }
        }
        "check" => {
            let Some(path) = file_arg(&args) else {
                eprintln!("Usage: calor check <file.calor> [--json]");
                return ExitCode::FAILURE;
            };
            let Some(source) = read_source(&path) else {
                return ExitCode::FAILURE;
            };
            let output = calorc::check_source(&source);
            report(&output.diagnostics, has_flag(&args, "--json"));
            if output.has_errors() {
                ExitCode::FAILURE
            } else {
                println!("ok");
                ExitCode::SUCCESS
            }
        }
        "fmt" => {
            let Some(path) = file_arg(&args) else {
                eprintln!("Usage: calor fmt <file.calor> [--write]");
                return ExitCode::FAILURE;
            };
            let Some(source) = read_source(&path) else {
                return ExitCode::FAILURE;
            };
            let output = calorc::format_source(&source);
            report(&output.diagnostics, false);
            match output.formatted {
                Some(formatted) if has_flag(&args, "--write") => {
                    if let Err(error) = std::fs::write(&path, formatted) {
                        eprintln!("error: cannot write {}: {error}", path.display());
                        return ExitCode::FAILURE;
                    }
                    ExitCode::SUCCESS
                }
                Some(formatted) => {
                    print!("{formatted}");
                    ExitCode::SUCCESS
                }
                None => ExitCode::FAILURE,
            }
        }
        "lex" => {
            let Some(path) = file_arg(&args) else {
                eprintln!("Usage: calor lex <file.calor>");
                return ExitCode::FAILURE;
            };
            let Some(source) = read_source(&path) else {
                return ExitCode::FAILURE;
            };
            let output = calorc::lex_source(&source);
            for token in &output.tokens {
                println!("{}:{} {}", token.span.line, token.span.column, token.kind);
            }
            report(&output.diagnostics, false);
            ExitCode::SUCCESS
        }
        "parse" => {
            let Some(path) = file_arg(&args) else {
                eprintln!("Usage: calor parse <file.calor>");
                return ExitCode::FAILURE;
            };
            let Some(source) = read_source(&path) else {
                return ExitCode::FAILURE;
            };
            let output = calorc::parse_source(&source);
            if let Some(module) = &output.module {
                println!("{module:#?}");
            }
            report(&output.diagnostics, false);
            ExitCode::SUCCESS
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Calor compiler");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  calor build <file.calor> [-o <out.cs>] [--no-prelude] [--json]");
    eprintln!("  calor check <file.calor> [--json]");
    eprintln!("  calor fmt <file.calor> [--write]");
    eprintln!("  calor lex <file.calor>");
    eprintln!("  calor parse <file.calor>");
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// The first non-flag argument after the command.
fn file_arg(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .skip(2)
        .find(|arg| !arg.starts_with('-'))
        .map(PathBuf::from)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().skip(2).any(|arg| arg == flag)
}

fn output_path(args: &[String], input: &Path) -> PathBuf {
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if arg == "-o" {
            if let Some(path) = iter.next() {
                return PathBuf::from(path);
            }
        }
    }
    input.with_extension("cs")
}

fn read_source(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(error) => {
            eprintln!("error: cannot read {}: {error}", path.display());
            None
        }
    }
}

fn report(diagnostics: &[Diagnostic], json: bool) {
    if diagnostics.is_empty() {
        return;
    }
    if json {
        let stdout = std::io::stdout();
        let mut emitter = JsonEmitter::new(stdout.lock());
        emitter.begin();
        emitter.emit_all(diagnostics);
        emitter.end();
    } else {
        let stderr = std::io::stderr();
        let is_tty = stderr.is_terminal();
        let mut emitter =
            TerminalEmitter::with_color_mode(stderr.lock(), ColorMode::Auto, is_tty);
        emitter.emit_all(diagnostics);
    }
}
