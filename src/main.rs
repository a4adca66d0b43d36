use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use tscat::{
    merge, purge_vanished, run_lookup, CatalogLoader, ExtractedMessage,
    LanguageSetting, LookupQuery, ReportFormatter, Settings, Translator, TsParser, TsWriter,
};

/// Exit status for a catalog that parsed but has untranslated entries
const EXIT_INCOMPLETE: i32 = 1;
/// Exit status for any failure (unreadable or malformed catalog, bad arguments)
const EXIT_ERROR: i32 = 2;

/// tscat - Inspect, query and maintain TS translation catalogs
#[derive(Parser, Debug)]
#[command(name = "tscat")]
#[command(author, version, about, long_about = None)]
#[command(help_template = "{name} {version}\n{about}\n\nUSAGE:\n    {usage}\n\n{all-args}")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Strictly parse a catalog and list untranslated entries
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Translate one source string, falling back to the source text
    Lookup {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Context (dialog or scope) the string belongs to
        #[arg(short, long)]
        context: String,

        /// Disambiguation comment
        #[arg(long)]
        comment: Option<String>,

        /// Count used to pick a plural form and replace %n
        #[arg(long, value_name = "N")]
        plural: Option<u64>,

        /// Values for %0, %1, ... in order
        #[arg(short, long = "arg", value_name = "VALUE")]
        args: Vec<String>,

        #[arg(value_name = "SOURCE")]
        source: String,
    },

    /// Show per-status message counts
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Rewrite a catalog in canonical layout
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (defaults to rewriting FILE in place)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Remove vanished and obsolete entries
    Purge {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Merge freshly extracted strings (JSON array) into a catalog
    Merge {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON file with the extracted messages
        #[arg(long, value_name = "JSON")]
        extracted: PathBuf,

        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// List languages that have a catalog in a directory
    Languages {
        #[arg(long, value_name = "DIR")]
        dir: PathBuf,

        /// Catalog file name prefix
        #[arg(long, default_value = "dd", value_parser = validate_prefix)]
        prefix: String,
    },

    /// Show which catalog a language setting selects and load it
    Resolve {
        /// Settings file (TOML)
        #[arg(long, value_name = "TOML")]
        settings: Option<PathBuf>,

        /// Language code or "auto"; overrides settings and TSCAT_LANGUAGE
        #[arg(long)]
        language: Option<String>,

        /// Catalog directory; overrides settings
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        #[arg(long, value_parser = validate_prefix)]
        prefix: Option<String>,
    },
}

/// Validate that a catalog prefix is a plain, non-empty file name fragment
fn validate_prefix(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("prefix cannot be empty".to_string());
    }
    if s.contains(['/', '\\']) {
        return Err(format!("prefix '{}' must not contain path separators", s));
    }
    Ok(s.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(EXIT_ERROR);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn formatter() -> ReportFormatter {
    if io::stdout().is_terminal() {
        ReportFormatter::new()
    } else {
        ReportFormatter::plain()
    }
}

fn run(command: Command) -> Result<i32> {
    match command {
        Command::Check { file, json } => check(&file, json),
        Command::Lookup {
            file,
            context,
            comment,
            plural,
            args,
            source,
        } => {
            let mut query = LookupQuery::new(context, source).with_args(args);
            if let Some(comment) = comment {
                query = query.with_comment(comment);
            }
            if let Some(n) = plural {
                query = query.with_count(n);
            }
            lookup(&file, &query)
        }
        Command::Stats { file, json } => stats(&file, json),
        Command::Normalize { file, output } => {
            let out = output.as_deref().unwrap_or(&file);
            tscat::normalize_catalog(&file, out)
                .with_context(|| format!("failed to normalize into {}", out.display()))?;
            Ok(0)
        }
        Command::Purge { file, output } => {
            let mut catalog = TsParser::parse_file(&file)?;
            let removed = purge_vanished(&mut catalog);
            write_catalog(&catalog, output.as_deref().unwrap_or(&file))?;
            println!("removed {} vanished entries", removed);
            Ok(0)
        }
        Command::Merge {
            file,
            extracted,
            output,
        } => merge_extracted(&file, &extracted, output.as_deref()),
        Command::Languages { dir, prefix } => {
            let languages = CatalogLoader::new(&dir, prefix).available_languages();
            if languages.is_empty() {
                println!("No catalogs found in {}", dir.display());
            }
            for language in languages {
                println!("{}", language);
            }
            Ok(0)
        }
        Command::Resolve {
            settings,
            language,
            dir,
            prefix,
        } => resolve(settings.as_deref(), language, dir, prefix),
    }
}

fn check(file: &Path, json: bool) -> Result<i32> {
    let report = tscat::check_catalog(file)?;

    if json {
        println!("{}", ReportFormatter::to_json(&report)?);
    } else {
        print!("{}", formatter().format_check(&report));
    }

    Ok(if report.is_complete() { 0 } else { EXIT_INCOMPLETE })
}

fn lookup(file: &Path, query: &LookupQuery) -> Result<i32> {
    let (catalog, diagnostics) = TsParser::parse_file_lenient(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    if !diagnostics.is_empty() {
        eprint!("{}", formatter().format_diagnostics(&diagnostics));
    }

    let translator = Translator::from_catalog(&catalog);
    tracing::debug!(
        context = %query.context,
        source = %query.source,
        entries = translator.len(),
        "looking up"
    );
    println!("{}", run_lookup(&translator, query));
    Ok(0)
}

fn stats(file: &Path, json: bool) -> Result<i32> {
    let catalog = TsParser::parse_file(file)?;
    let stats = catalog.stats();
    if json {
        println!("{}", ReportFormatter::to_json(&stats)?);
    } else {
        print!(
            "{}",
            formatter().format_stats(
                &file.display().to_string(),
                catalog.language.as_deref(),
                &stats
            )
        );
    }
    Ok(0)
}

fn merge_extracted(file: &Path, extracted: &Path, output: Option<&Path>) -> Result<i32> {
    let mut catalog = TsParser::parse_file(file)?;
    let content = fs::read_to_string(extracted)
        .with_context(|| format!("failed to read {}", extracted.display()))?;
    let messages: Vec<ExtractedMessage> = serde_json::from_str(&content)
        .with_context(|| format!("invalid extracted messages in {}", extracted.display()))?;

    let summary = merge(&mut catalog, &messages);
    write_catalog(&catalog, output.unwrap_or(file))?;
    print!("{}", formatter().format_merge(&summary));
    Ok(0)
}

fn resolve(
    settings_path: Option<&Path>,
    language: Option<String>,
    dir: Option<PathBuf>,
    prefix: Option<String>,
) -> Result<i32> {
    let settings = match settings_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let setting = match language {
        Some(code) => code.parse::<LanguageSetting>().unwrap_or_default(),
        None => settings.language_from_env(),
    };
    let loader = CatalogLoader::new(
        dir.unwrap_or_else(|| settings.resolved_catalog_dir()),
        prefix.unwrap_or_else(|| settings.prefix.clone()),
    );

    println!("language:   {}", setting);
    match CatalogLoader::locale_for(&setting) {
        Some(tag) => println!("locale:     {}", tag),
        None => println!("locale:     (none)"),
    }
    for candidate in loader.candidate_paths(&setting) {
        println!("candidate:  {}", candidate.display());
    }

    let outcome = loader.load(&setting);
    if !outcome.diagnostics.is_empty() {
        eprint!("{}", formatter().format_diagnostics(&outcome.diagnostics));
    }
    match &outcome.path {
        Some(path) => println!(
            "loaded:     {} ({} messages)",
            path.display(),
            outcome.translator.len()
        ),
        None => println!("loaded:     nothing, source strings will be shown"),
    }
    Ok(0)
}

fn write_catalog(catalog: &tscat::Catalog, path: &Path) -> Result<()> {
    TsWriter::write_file(catalog, path).with_context(|| format!("failed to write {}", path.display()))
}
