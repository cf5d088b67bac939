//! TEBNF compiler CLI.

use tebnf_diagnostic::emitter::ColorMode;
use tebnfc::{compile, init_tracing, CompileOptions};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    let mut positional = Vec::new();
    let mut color = ColorMode::Auto;
    let mut error_limit = None;
    let mut dump_tokens = false;

    for arg in args.iter().skip(1) {
        if arg == "--dump-tokens" {
            dump_tokens = true;
        } else if let Some(value) = arg.strip_prefix("--color=") {
            let Some(mode) = ColorMode::from_flag(value) else {
                eprintln!("error: invalid color mode '{value}'");
                eprintln!("Valid modes: auto, always, never");
                std::process::exit(1);
            };
            color = mode;
        } else if let Some(value) = arg.strip_prefix("--error-limit=") {
            let Ok(limit) = value.parse::<usize>() else {
                eprintln!("error: invalid error limit '{value}'");
                std::process::exit(1);
            };
            error_limit = Some(limit);
        } else if arg == "--help" || arg == "-h" {
            print_usage();
            return;
        } else if arg.starts_with('-') {
            eprintln!("error: unknown option '{arg}'");
            std::process::exit(1);
        } else {
            positional.push(arg.as_str());
        }
    }

    // A token dump only needs the source.
    let needed = if dump_tokens { 1 } else { 3 };
    if positional.len() < needed {
        print_usage();
        std::process::exit(1);
    }

    let dest = positional.get(1).copied().unwrap_or(".");
    let app = positional.get(2).copied().unwrap_or("app");
    let mut options = CompileOptions::new(positional[0], dest, app);
    options.color = color;
    options.emit_rpn_debug = dump_tokens;
    if let Some(limit) = error_limit {
        options.error_limit = limit;
    }

    match compile(&options) {
        Ok(written) => {
            for path in written {
                println!("wrote {}", path.display());
            }
        }
        Err(tebnfc::CompileError::Failed { .. }) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("TEBNF compiler");
    eprintln!();
    eprintln!("Usage: tebnfc <source.tebnf> <dest-dir> <app-name> [options]");
    eprintln!("       tebnfc <source.tebnf> --dump-tokens");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --color=<mode>       auto, always, never (default: auto)");
    eprintln!("  --error-limit=<n>    Stop reporting after n errors (0 = unlimited)");
    eprintln!("  --dump-tokens        Print the token stream and exit");
    eprintln!();
    eprintln!("Logging: set RUST_LOG (e.g. RUST_LOG=tebnf_parse=debug);");
    eprintln!("TEBNF_LOG_TREE=0 prints flat lines instead of a tree.");
}
