use ariadne::{Color, Config, IndexType, Label, Report, ReportKind};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use spp_ast::Span;
use spp_lexer::{Token, TokenKind};
use spp_parser::ParseError;
use spp_sema::{render_plain, SemanticError, SourceMap};

use spp_driver::{check_file, generate_file, module_root, parse_file, CheckFailure};

#[derive(Parser)]
#[command(
    name = "spp",
    version = "0.1.0",
    about = "Semantic checker for SPP modules",
    long_about = "Checks SPP source files: symbol generation, type inference,\noverload resolution and move/borrow rules."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a file and every module it imports
    Check {
        /// Input SPP file
        input: PathBuf,

        /// Directory imports resolve against (default: $SPP_ROOT, then the input's directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Print diagnostics as plain text
        #[arg(long)]
        plain: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Lex an SPP file and show tokens (debug)
    Lex {
        /// Input SPP file
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },

    /// Parse an SPP file and show the AST (debug)
    Parse {
        /// Input SPP file
        input: PathBuf,

        /// Print diagnostics as plain text
        #[arg(long)]
        plain: bool,
    },

    /// Generate symbols and dump the scope arena as JSON (debug)
    Scopes {
        /// Input SPP file
        input: PathBuf,

        /// Directory imports resolve against
        #[arg(long)]
        root: Option<PathBuf>,

        /// Print diagnostics as plain text
        #[arg(long)]
        plain: bool,
    },
}

fn main() -> ExitCode {
    // SPP_LOG takes an EnvFilter directive, e.g. "spp_sema=debug"
    if let Ok(filter) = EnvFilter::try_from_env("SPP_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { input, root, plain, verbose } => check_command(input, root, plain, verbose),
        Commands::Lex { input, positions } => lex_command(input, positions),
        Commands::Parse { input, plain } => parse_command(input, plain),
        Commands::Scopes { input, root, plain } => scopes_command(input, root, plain),
    }
}

fn check_command(input: PathBuf, root: Option<PathBuf>, plain: bool, verbose: bool) -> ExitCode {
    let root = module_root(&input, root);
    if verbose {
        println!("Checking: {}", input.display());
        println!("Module root: {}", root.display());
        println!("\n[Phase 1] Parsing, symbol generation and analysis...");
    }

    let mut sources = SourceMap::new();
    match check_file(&input, &root, &mut sources) {
        Ok(analysis) => {
            if verbose {
                println!("  {} source files", sources.files().len());
                for unit in &analysis.units {
                    println!("    {}", unit.name);
                }
                println!(
                    "  {} scopes, {} functions, {} scopes analysed",
                    analysis.scopes.scopes().len(),
                    analysis.scopes.functions().len(),
                    analysis.traversal.len()
                );
            }
            println!("Check passed!");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            report_failure(&failure, &sources, plain);
            ExitCode::FAILURE
        }
    }
}

fn lex_command(input: PathBuf, positions: bool) -> ExitCode {
    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut sources = SourceMap::new();
    let file_id = sources.add(input.display().to_string(), source.as_str());
    let tokens = spp_lexer::tokenize(&source, file_id);

    println!("Tokens for {}:\n", input.display());
    println!("{}", "=".repeat(80));

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("\n{:4} | {:?}", i, token.kind);
            break;
        }

        if positions {
            println!(
                "{:4} | {:20?} | {:?} | {}..{}",
                i, token.kind, token.value, token.span.start, token.span.end
            );
        } else {
            println!("{:4} | {:20?} | {:?}", i, token.kind, token.value);
        }
    }

    println!("{}", "=".repeat(80));
    println!("\nTotal tokens: {}", tokens.len());

    let error_count = tokens.iter().filter(|t| t.kind == TokenKind::Error).count();
    if error_count > 0 {
        println!("\nLexer errors found: {}", error_count);
        report_lexer_errors(&tokens, &sources);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn parse_command(input: PathBuf, plain: bool) -> ExitCode {
    let mut sources = SourceMap::new();
    match parse_file(&input, &mut sources) {
        Ok(program) => {
            println!("{:#?}", program);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            report_failure(&failure, &sources, plain);
            ExitCode::FAILURE
        }
    }
}

fn scopes_command(input: PathBuf, root: Option<PathBuf>, plain: bool) -> ExitCode {
    let root = module_root(&input, root);
    let mut sources = SourceMap::new();
    let generated = match generate_file(&input, &root, &mut sources) {
        Ok(generated) => generated,
        Err(failure) => {
            report_failure(&failure, &sources, plain);
            return ExitCode::FAILURE;
        }
    };

    match spp_sema::to_json(&generated.scopes) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serialising scopes: {}", e);
            ExitCode::FAILURE
        }
    }
}

// Helper functions

fn report_failure(failure: &CheckFailure, sources: &SourceMap, plain: bool) {
    match failure {
        CheckFailure::Io { path, error } => eprintln!("Error reading {}: {}", path.display(), error),
        CheckFailure::Parse(errors) => {
            for err in errors {
                report_parse_error(err, sources, plain);
            }
        }
        CheckFailure::Semantic(error) => report_semantic_error(error, sources, plain),
    }
}

fn report_parse_error(err: &ParseError, sources: &SourceMap, plain: bool) {
    if plain {
        eprintln!("error[E1000]: Parse error\n --> {}\n{}", location(err.span, sources), err.message);
    } else {
        report_error("E1000", "Parse error", &err.message, err.span, None, None, sources);
    }
}

fn report_semantic_error(err: &SemanticError, sources: &SourceMap, plain: bool) {
    if err.is_internal() {
        tracing::error!(kind = ?err.kind, "internal compiler error");
    }
    if plain {
        eprint!("{}", render_plain(err, sources));
        return;
    }
    let category = err.category();
    let note = err.note.as_ref().map(|(message, span)| (message.as_str(), *span));
    report_error(
        category.code(),
        category.title(),
        &err.kind.to_string(),
        err.span,
        note,
        err.help.as_deref(),
        sources,
    );
}

fn report_lexer_errors(tokens: &[Token], sources: &SourceMap) {
    for token in tokens.iter().filter(|t| t.kind == TokenKind::Error) {
        report_error("E0001", "Lexical error", &token.value, token.span, None, None, sources);
    }
}

fn report_error(
    code: &str,
    title: &str,
    message: &str,
    span: Span,
    note: Option<(&str, Span)>,
    help: Option<&str>,
    sources: &SourceMap,
) {
    let file_name = |span: Span| {
        sources
            .get(span.file_id)
            .map_or_else(|| "<unknown>".to_string(), |file| file.name.clone())
    };
    let primary = (file_name(span), span.start..span.end.max(span.start));

    let mut report = Report::build(ReportKind::Error, primary.clone())
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_code(code)
        .with_message(title)
        .with_label(Label::new(primary).with_message(message).with_color(Color::Red));
    if let Some((text, at)) = note {
        report = report.with_label(
            Label::new((file_name(at), at.start..at.end.max(at.start)))
                .with_message(text)
                .with_color(Color::Yellow),
        );
    }
    if let Some(help) = help {
        report = report.with_help(help);
    }

    let files = sources.files().iter().map(|file| (file.name.clone(), file.source.clone()));
    if let Err(e) = report.finish().eprint(ariadne::sources(files)) {
        tracing::warn!(error = %e, "diagnostic rendering failed");
        eprintln!("error[{}]: {}\n --> {}\n{}", code, title, location(span, sources), message);
    }
}

fn location(span: Span, sources: &SourceMap) -> String {
    match (sources.get(span.file_id), sources.line_col(span.file_id, span.start)) {
        (Some(file), Some((line, col))) => format!("{}:{}:{}", file.name, line, col),
        _ => format!("<unknown>:{}", span.start),
    }
}
