//! `cpf` command line: encode, decode, validate, stats.
//!
//! Everything is reachable through [`run`] so the binary stays a thin shell
//! around argument parsing and logging setup.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cpf_compactor::{decode_document, encode, CompressionStats, EncodeOptions, TextStats};
use cpf_core::{AbbreviationOverrides, EncoderConfig};
use cpf_parser::traits::DocumentParser;
use cpf_parser::{validate, CpfParser, Severity};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "cpf")]
#[command(version)]
#[command(about = "CPF - Compact Prompt Format: token-efficient instruction encoding for LLMs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert English markdown to CPF
    Encode {
        /// Input markdown file
        input: PathBuf,
        /// Output CPF file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Custom abbreviation JSON file
        #[arg(long)]
        abbrev: Option<PathBuf>,
        /// Document ID (derived from the title if not given)
        #[arg(long)]
        id: Option<String>,
        /// Document title (first heading if not given)
        #[arg(long)]
        title: Option<String>,
        /// Encoder configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert CPF back to English markdown
    Decode {
        /// Input CPF file
        input: PathBuf,
        /// Output markdown file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Custom abbreviation JSON file
        #[arg(long)]
        abbrev: Option<PathBuf>,
    },

    /// Validate a CPF document
    Validate {
        /// CPF file to validate
        input: PathBuf,
        /// Print issues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show compression statistics
    Stats {
        /// CPF file
        input: PathBuf,
        /// Original English file for comparison
        #[arg(long)]
        original: Option<PathBuf>,
    },
}

/// Execute a parsed command line. Returns the process exit code.
pub fn run(cli: Cli, out: &mut dyn Write, err: &mut dyn Write) -> Result<u8> {
    match cli.command {
        Commands::Encode { input, output, abbrev, id, title, config } => {
            let text = read(&input)?;
            let mut options = EncodeOptions::new().with_source(input.display().to_string());
            if let Some(id) = id {
                options = options.with_doc_id(id);
            }
            if let Some(title) = title {
                options = options.with_title(title);
            }
            if let Some(path) = abbrev {
                options = options.with_abbreviations(load_abbreviations(&path)?.encode);
            }
            if let Some(path) = config {
                let config = EncoderConfig::from_json(&read(&path)?)
                    .with_context(|| format!("invalid encoder config {}", path.display()))?;
                options = options.with_config(config);
            }
            let result = encode(&text, &options);
            emit(&result, &input, output.as_deref(), "Encoded", out)?;
            Ok(0)
        }

        Commands::Decode { input, output, abbrev } => {
            let parser = CpfParser::new();
            if !parser.can_parse(&input) {
                tracing::warn!(
                    input = %input.display(),
                    format = parser.name(),
                    "unrecognised input extension"
                );
            }
            let document = parser
                .parse_file(&input)
                .with_context(|| format!("failed to decode {}", input.display()))?;
            let custom = abbrev.map(|p| load_abbreviations(&p)).transpose()?;
            let result = decode_document(&document, custom.as_ref());
            emit(&result, &input, output.as_deref(), "Decoded", out)?;
            Ok(0)
        }

        Commands::Validate { input, json } => {
            let issues = validate(&read(&input)?);
            let errors = issues.iter().filter(|i| i.is_error()).count();
            let warnings = issues.iter().filter(|i| i.severity == Severity::Warning).count();

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&issues)?)?;
            } else if issues.is_empty() {
                writeln!(out, "OK: {} is valid CPF v1", input.display())?;
            } else {
                for issue in &issues {
                    writeln!(err, "{issue}")?;
                }
                writeln!(err, "\n{errors} error(s), {warnings} warning(s)")?;
            }
            Ok(if errors > 0 { 1 } else { 0 })
        }

        Commands::Stats { input, original } => {
            let cpf_text = read(&input)?;
            let cpf = TextStats::measure(&cpf_text);
            writeln!(out, "CPF file: {}", input.display())?;
            write_stats(out, &cpf)?;

            if let Some(path) = original {
                let original_text = read(&path)?;
                let stats = CompressionStats::measure(&original_text, &cpf_text);
                writeln!(out, "\nOriginal: {}", path.display())?;
                write_stats(out, &stats.original)?;
                writeln!(out, "\nReduction:")?;
                writeln!(out, "  Tokens: ~{:.1}%", stats.token_reduction_pct)?;
                writeln!(out, "  Chars:  ~{:.1}%", stats.char_reduction_pct)?;
            }
            Ok(0)
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_abbreviations(path: &Path) -> Result<AbbreviationOverrides> {
    AbbreviationOverrides::from_json(&read(path)?)
        .with_context(|| format!("invalid abbreviation file {}", path.display()))
}

/// Write to `output` with a confirmation line, or print the result itself.
fn emit(
    result: &str,
    input: &Path,
    output: Option<&Path>,
    verb: &str,
    out: &mut dyn Write,
) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, result).with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(out, "{verb} {} -> {}", input.display(), path.display())?;
        }
        None => write!(out, "{result}")?,
    }
    Ok(())
}

fn write_stats(out: &mut dyn Write, stats: &TextStats) -> Result<()> {
    writeln!(out, "  Lines:  {}", stats.lines)?;
    writeln!(out, "  Chars:  {}", stats.chars)?;
    writeln!(out, "  Tokens: ~{} (estimate)", stats.tokens)?;
    Ok(())
}
