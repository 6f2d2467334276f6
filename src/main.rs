//! CLI for bibsite - Publication lists and inline citations from BibTeX.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use bibsite::{load_settings, style_names, PublicationGenerator, Settings};

const DEFAULT_CONFIG: &str = "bibsite.toml";

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Publication lists and inline citations from BibTeX databases
#[derive(Parser)]
#[command(name = "bibsite")]
#[command(version)]
#[command(after_help = "\
Examples:
  bibsite build --config bibsite.toml --output output
  bibsite list --source publications.bib --extra-field url
  bibsite cite page.html -o page.out.html
  bibsite styles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every command that loads databases.
#[derive(Args)]
struct SiteArgs {
    /// Configuration file (default: bibsite.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// BibTeX source, replaces the configured list (repeatable)
    #[arg(short, long = "source")]
    sources: Vec<String>,

    /// Citation style (see 'styles' command)
    #[arg(long)]
    style: Option<String>,

    /// Entry field to copy into each publication (repeatable)
    #[arg(short, long = "extra-field")]
    extra_fields: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the publications page
    Build {
        #[command(flatten)]
        site: SiteArgs,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Print the publication list as JSON
    List {
        #[command(flatten)]
        site: SiteArgs,
    },

    /// Replace inline citations in a page
    #[command(after_help = "\
Examples:
  bibsite cite page.html -s publications.bib
  bibsite cite page.html -o page.out.html --no-bib
  echo '[@key]' | bibsite cite - -s publications.bib

Citation syntax: [@key], [@key](url), [@key, p. 42], [@a; @b; @c]")]
    Cite {
        #[command(flatten)]
        site: SiteArgs,

        /// Input page (use '-' for stdin)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't append the reference list
        #[arg(long)]
        no_bib: bool,
    },

    /// List available citation styles
    Styles,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — configuration file not found / invalid
    Config(String),
    /// Exit 11 — input page not found / unreadable
    InputFile(String),
    /// Exit 12 — cannot write output
    Output(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 10,
            AppError::InputFile(_) => 11,
            AppError::Output(_) => 12,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => {
                write!(
                    f,
                    "{}\n  hint: check the TOML syntax and key names of the configuration file",
                    msg
                )
            }
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::Output(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output location is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "bibsite=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { site, output } => build_command(site, &output)?,
        Commands::List { site } => list_command(site)?,
        Commands::Cite {
            site,
            input,
            output,
            no_bib,
        } => cite_command(site, &input, output.as_deref(), no_bib)?,
        Commands::Styles => styles_command(),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Reads the configuration and applies command-line overrides.
fn settings(site: SiteArgs) -> Result<Settings, AppError> {
    let mut settings = match &site.config {
        Some(path) => load_settings(path)
            .map_err(|e| AppError::Config(format!("'{}': {}", path.display(), e)))?,
        None if Path::new(DEFAULT_CONFIG).exists() => load_settings(Path::new(DEFAULT_CONFIG))
            .map_err(|e| AppError::Config(format!("'{}': {}", DEFAULT_CONFIG, e)))?,
        None => Settings::default(),
    };

    if !site.sources.is_empty() {
        settings.sources = site.sources;
    }
    if let Some(style) = site.style {
        settings.style = style;
    }
    if !site.extra_fields.is_empty() {
        settings.extra_fields = site.extra_fields;
    }
    Ok(settings)
}

/// Write the publications page.
fn build_command(site: SiteArgs, output: &Path) -> Result<(), AppError> {
    let generator = PublicationGenerator::new(settings(site)?);

    match generator
        .generate_output(output)
        .map_err(|e| AppError::Output(e.to_string()))?
    {
        Some(path) => eprintln!(
            "formatted {} publication(s), wrote {}",
            generator.summary().entries,
            path.display()
        ),
        None => eprintln!("no publications, nothing written"),
    }
    Ok(())
}

/// Print the template context.
fn list_command(site: SiteArgs) -> Result<(), AppError> {
    let generator = PublicationGenerator::new(settings(site)?);

    let context = generator
        .generate_context()
        .map_err(|e| AppError::Output(e.to_string()))?;
    let json = serde_json::to_string_pretty(&context)
        .map_err(|e| AppError::Output(format!("failed to serialize context: {}", e)))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json).map_err(|e| AppError::Output(format!("stdout: {}", e)))?;
    Ok(())
}

/// Replace the inline citations of a page.
fn cite_command(
    site: SiteArgs,
    input: &Path,
    output: Option<&Path>,
    no_bib: bool,
) -> Result<(), AppError> {
    // 1. Read the page (support '-' for stdin)
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::InputFile(format!("failed to read from stdin: {}", e)))?;
        buf
    } else {
        fs::read_to_string(input)
            .map_err(|e| AppError::InputFile(format!("'{}': {}", input.display(), e)))?
    };

    // 2. Load databases and render citations
    let generator = PublicationGenerator::new(settings(site)?);
    let page = generator.cite(&text);

    // 3. Append the reference list unless disabled or empty
    let mut result = page.content;
    if !no_bib && !page.bibliography.is_empty() {
        if !result.ends_with('\n') {
            result.push('\n');
        }
        result.push('\n');
        result.push_str(&page.bibliography);
        result.push('\n');
    }

    // 4. Write to file or stdout
    if let Some(output_path) = output {
        fs::write(output_path, &result)
            .map_err(|e| AppError::Output(format!("'{}': {}", output_path.display(), e)))?;
        eprintln!("wrote {}", output_path.display());
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", result).map_err(|e| AppError::Output(format!("stdout: {}", e)))?;
    }

    Ok(())
}

/// List available citation styles.
fn styles_command() {
    for name in style_names() {
        println!("{}", name);
    }
}
