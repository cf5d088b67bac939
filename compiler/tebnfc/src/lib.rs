//! TEBNF compiler driver.
//!
//! Runs the pipeline lex → parse/resolve → codec synthesis, reports
//! diagnostics through the shared queue and emitter, and writes the
//! generated crate sources:
//!
//! ```text
//! <dest>/<app>/src/lib.rs
//! <dest>/<app>/src/<element>.rs   one per GRAMMAR element
//! <dest>/<app>/src/states.rs      when the source has STATES elements
//! ```

mod states;

pub use states::render_states;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Once;

use tebnf_codec::render::{module_name, render_element, render_lib};
use tebnf_codec::SynthesisError;
use tebnf_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use tebnf_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};
use tebnf_ir::TokenList;
use tebnf_lexer::LexError;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Nothing is installed unless `RUST_LOG` is
/// set (`RUST_LOG=tebnf_parse=debug`, `RUST_LOG=trace`). Output is a nested
/// tree per stage; `TEBNF_LOG_TREE=0` switches to flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let flat = std::env::var("TEBNF_LOG_TREE").is_ok_and(|v| v == "0");
        if flat {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Command-line configuration for one compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    pub source: PathBuf,
    /// Directory the application crate is written under.
    pub dest: PathBuf,
    pub app: String,
    pub color: ColorMode,
    /// Errors reported before the rest are dropped (0 = unlimited).
    pub error_limit: usize,
    /// Print the token stream and stop.
    pub emit_rpn_debug: bool,
}

impl CompileOptions {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>, app: impl Into<String>) -> Self {
        CompileOptions {
            source: source.into(),
            dest: dest.into(),
            app: app.into(),
            color: ColorMode::Auto,
            error_limit: DiagnosticConfig::default().error_limit,
            emit_rpn_debug: false,
        }
    }

    /// `<dest>/<app>/src`
    pub fn src_dir(&self) -> PathBuf {
        self.dest.join(&self.app).join("src")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("compilation failed with {errors} error(s)")]
    Failed { errors: usize },
}

/// A source file of the generated crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative to the crate's `src/` directory.
    pub path: PathBuf,
    pub contents: String,
}

/// Output of a successful compile.
#[derive(Clone, Debug, Default)]
pub struct Compilation {
    pub files: Vec<GeneratedFile>,
    /// Warnings; never fatal.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile TEBNF source text in memory.
///
/// Stops after the first stage that reports an error. On failure the
/// returned diagnostics are sorted by line and include any warnings.
pub fn compile_source(source: &str, error_limit: usize) -> Result<Compilation, Vec<Diagnostic>> {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit,
        ..DiagnosticConfig::default()
    });

    let lexed = tebnf_lexer::lex(source);
    queue.extend(lexed.errors.iter().map(LexError::to_diagnostic));
    if queue.has_errors() {
        return Err(queue.flush());
    }

    let parsed = tebnf_parse::parse(&lexed.tokens);
    queue.extend(parsed.diagnostics());
    if queue.has_errors() {
        return Err(queue.flush());
    }

    let plans = match tebnf_codec::synthesize(&parsed.tree, &parsed.elements, &lexed.tokens) {
        Ok(plans) => plans,
        Err(errors) => {
            queue.extend(errors.iter().map(SynthesisError::to_diagnostic));
            return Err(queue.flush());
        }
    };

    let mut files: Vec<GeneratedFile> = plans
        .iter()
        .map(|plan| GeneratedFile {
            path: PathBuf::from(format!("{}.rs", module_name(&plan.element))),
            contents: render_element(plan),
        })
        .collect();
    let states = render_states(&parsed.tree, &parsed.elements, &lexed.tokens);
    let extra: &[&str] = if states.is_some() { &["states"] } else { &[] };
    files.push(GeneratedFile {
        path: PathBuf::from("lib.rs"),
        contents: render_lib(&plans, extra),
    });
    if let Some(contents) = states {
        files.push(GeneratedFile {
            path: PathBuf::from("states.rs"),
            contents,
        });
    }
    tracing::debug!(files = files.len(), plans = plans.len(), "generated");

    Ok(Compilation {
        files,
        diagnostics: queue.flush(),
    })
}

/// Compile `options.source` and write the generated crate sources.
///
/// Diagnostics go to stderr. Returns the paths written, or nothing for a
/// token dump.
#[tracing::instrument(level = "debug", skip_all, fields(source = %options.source.display()))]
pub fn compile(options: &CompileOptions) -> Result<Vec<PathBuf>, CompileError> {
    let source = std::fs::read_to_string(&options.source).map_err(|source| CompileError::Read {
        path: options.source.clone(),
        source,
    })?;

    if options.emit_rpn_debug {
        let lexed = tebnf_lexer::lex(&source);
        print!("{}", dump_tokens(&lexed.tokens));
        return Ok(Vec::new());
    }

    let mut emitter = TerminalEmitter::<io::Stderr>::stderr(options.color, io::stderr().is_terminal())
        .with_source(&source);
    let compilation = match compile_source(&source, options.error_limit) {
        Ok(compilation) => compilation,
        Err(diagnostics) => {
            emitter.report(&diagnostics);
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            return Err(CompileError::Failed { errors });
        }
    };
    if !compilation.diagnostics.is_empty() {
        emitter.report(&compilation.diagnostics);
    }

    write_files(&options.src_dir(), &compilation.files)
}

fn write_files(dir: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, CompileError> {
    std::fs::create_dir_all(dir).map_err(|source| CompileError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    files
        .iter()
        .map(|file| {
            let path = dir.join(&file.path);
            std::fs::write(&path, &file.contents).map_err(|source| CompileError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "wrote");
            Ok(path)
        })
        .collect()
}

/// One line per token: line number, kind and text.
pub fn dump_tokens(tokens: &TokenList) -> String {
    tokens
        .stream_ids()
        .iter()
        .map(|&id| {
            let token = &tokens[id];
            let kind = format!("{:?}", token.kind);
            format!("{:>4}  {kind:<14} {}\n", token.line, token.text)
        })
        .collect()
}
