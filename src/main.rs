//! rustlite CLI
//!
//! Runs the analysis pipeline over a source file and prints either a
//! human-readable summary or the machine-readable JSON report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::{fs, process};

use rustlite::report::{lexical_diagnostics, AnalysisReport, DiagnosticRecord, TokenRecord};

/// Rust-subset analyzer
#[derive(Parser, Debug)]
#[command(name = "rustlite")]
#[command(version = "0.1.0")]
#[command(about = "Lexical, syntactic and semantic analyzer for a Rust subset")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Emit the JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream
    Tokens {
        /// Input source file
        input: PathBuf,

        /// Emit the JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Parse and report syntax diagnostics
    Parse {
        /// Input source file
        input: PathBuf,

        /// Emit the JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the full pipeline: tokenize, parse, analyze
    Check {
        /// Input source file
        input: PathBuf,

        /// Emit the JSON report instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Tokens { input, json }) => print_tokens(&input, json),
        Some(Commands::Parse { input, json }) => parse_file(&input, json),
        Some(Commands::Check { input, json }) => check_file(&input, json),
        None => match cli.input {
            Some(input) => check_file(&input, cli.json),
            None => {
                eprintln!("Error: no input file specified");
                eprintln!("Usage: rustlite <FILE> or rustlite check <FILE>");
                process::exit(2);
            }
        },
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

fn read_source(input: &PathBuf) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("could not read {}", input.display()))
}

/// Tokenize and print the stream. Returns false if lexical errors exist.
fn print_tokens(input: &PathBuf, json: bool) -> Result<bool> {
    let source = read_source(input)?;
    let tokens = rustlite::tokenize(&source);
    let diagnostics = lexical_diagnostics(&tokens);

    if json {
        let records: Vec<TokenRecord> = tokens.iter().map(TokenRecord::from).collect();
        let report = AnalysisReport::new(records, diagnostics);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report_is_clean(&report));
    }

    for token in &tokens {
        println!(
            "{:>4}:{:<3} {:<12} {}",
            token.line,
            token.column,
            format!("{:?}", token.kind),
            token.raw_text
        );
    }
    for diagnostic in &diagnostics {
        eprintln!("lexical error: {}", diagnostic.message);
    }
    Ok(diagnostics.is_empty())
}

/// Parse a file and report syntax diagnostics. Returns false if any exist.
fn parse_file(input: &PathBuf, json: bool) -> Result<bool> {
    let source = read_source(input)?;
    let (program, errors) = rustlite::parse(&source);

    if json {
        let diagnostics: Vec<DiagnosticRecord> =
            errors.iter().map(DiagnosticRecord::syntax).collect();
        let report = AnalysisReport::new(Vec::new(), diagnostics);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report_is_clean(&report));
    }

    println!("Parsing: {}", input.display());
    match &program {
        Some(program) => println!("  [✓] Parsed {} items", program.items.len()),
        None => println!("  [✗] No top-level item could be completed"),
    }
    for error in &errors {
        eprintln!("{}", error);
    }
    Ok(errors.is_empty())
}

/// Run the full pipeline. Returns false if any diagnostic was produced.
fn check_file(input: &PathBuf, json: bool) -> Result<bool> {
    let source = read_source(input)?;

    let tokens = rustlite::tokenize(&source);
    let lexical = lexical_diagnostics(&tokens);

    let (program, syntax_errors) = rustlite::parse(&source);

    // semantic findings are only meaningful over a clean tree
    let semantic_errors = match &program {
        Some(program) if syntax_errors.is_empty() => rustlite::analyze(program),
        _ => Vec::new(),
    };

    if json {
        let records: Vec<TokenRecord> = tokens.iter().map(TokenRecord::from).collect();
        let mut diagnostics = lexical;
        diagnostics.extend(syntax_errors.iter().map(DiagnosticRecord::syntax));
        diagnostics.extend(semantic_errors.iter().map(DiagnosticRecord::semantic));
        let report = AnalysisReport::new(records, diagnostics);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report_is_clean(&report));
    }

    println!("Checking: {}", input.display());

    if lexical.is_empty() {
        println!("  [✓] Lexed {} tokens", tokens.len());
    } else {
        println!("  [✗] {} lexical errors", lexical.len());
        for diagnostic in &lexical {
            eprintln!("lexical error: {}", diagnostic.message);
        }
    }

    match &program {
        Some(program) if syntax_errors.is_empty() => {
            println!("  [✓] Parsed {} items", program.items.len());
        }
        Some(program) => {
            println!(
                "  [✗] Parsed {} items with {} syntax errors",
                program.items.len(),
                syntax_errors.len()
            );
        }
        None => println!("  [✗] No top-level item could be completed"),
    }
    for error in &syntax_errors {
        eprintln!("{}", error);
    }

    if syntax_errors.is_empty() && program.is_some() {
        if semantic_errors.is_empty() {
            println!("  [✓] Semantic analysis passed");
        } else {
            println!("  [✗] {} semantic errors", semantic_errors.len());
        }
        for error in &semantic_errors {
            eprintln!("{}", error);
        }
    }

    let clean = lexical.is_empty() && syntax_errors.is_empty() && semantic_errors.is_empty();
    if clean {
        println!("✅ No errors found");
    }
    Ok(clean)
}

fn report_is_clean(report: &AnalysisReport) -> bool {
    report.status == "ok"
}
