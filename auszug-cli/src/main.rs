use anyhow::{bail, Context, Result};
use auszug_core::{DocumentKind, FilenameMatcher, ParsedStatement, Reconciliation};
use auszug_export::ExportFormat;
use auszug_ingest::{parse_documents, parse_text, read_document, Document};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod scan;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "auszug",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("AUSZUG_BUILD_SHA"), ")"),
    about = "Extract transactions from bank and credit-card statement PDFs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan directories for statement PDFs and write all transactions as CSV
    Parse {
        /// Directories to scan recursively
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv or moneymoney (default from config)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Documents parsed concurrently (default from config)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Seconds before text extraction of one PDF is abandoned
        #[arg(long)]
        timeout: Option<u64>,

        /// Log progress (info level)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse a single statement and print what was recognized
    Inspect {
        /// Statement PDF
        file: PathBuf,

        /// Use this already-extracted text instead of running the extractor
        #[arg(long)]
        text: Option<PathBuf>,

        /// Statement kind, when the filename does not tell
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Log every matched and unmatched line (debug level)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Manage ~/.auszug/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Legacy,
    Modern,
    Card,
}

impl From<KindArg> for DocumentKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Legacy => DocumentKind::AccountLegacy,
            KindArg::Modern => DocumentKind::AccountModern,
            KindArg::Card => DocumentKind::Card,
        }
    }
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Parse {
            dirs,
            output,
            format,
            jobs,
            timeout,
            verbose,
        } => {
            init_logging(if verbose { "info" } else { "warn" });
            let mut cfg = config::load_config()?;
            if let Some(secs) = timeout {
                cfg.extract.timeout_secs = secs;
            }
            if let Some(jobs) = jobs {
                cfg.scan.jobs = jobs;
            }
            if let Some(format) = format {
                cfg.output.format = format;
            }
            run_parse(&dirs, output.as_deref(), &cfg).await?;
        }

        Command::Inspect {
            file,
            text,
            kind,
            verbose,
        } => {
            init_logging(if verbose { "debug" } else { "warn" });
            let cfg = config::load_config()?;
            run_inspect(&file, text.as_deref(), kind.map(Into::into), &cfg).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

async fn run_parse(dirs: &[PathBuf], output: Option<&Path>, cfg: &Config) -> Result<()> {
    for dir in dirs {
        if !dir.is_dir() {
            bail!("not a directory: {}", dir.display());
        }
    }

    let matcher = Arc::new(FilenameMatcher::new().context("compiling filename patterns")?);
    let documents = scan::scan_dirs(dirs, &matcher)?;
    tracing::info!(
        documents = documents.len(),
        jobs = cfg.scan.jobs,
        "parsing statements"
    );

    let report = parse_documents(documents, cfg.scan.jobs, matcher, cfg.extract.extractor())
        .await
        .context("statement worker failed")?;
    let transactions: Vec<_> = report.transactions().cloned().collect();

    eprintln!(
        "Parsed {} transactions from {} statements",
        transactions.len(),
        report.parsed.len()
    );
    if !report.failures.is_empty() {
        eprintln!("{} documents could not be parsed", report.failures.len());
    }
    let mismatched = report.mismatched().count();
    if mismatched > 0 {
        eprintln!("{mismatched} statements did not reconcile");
    }

    let writer: Box<dyn Write> = match output {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("create {}", p.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    auszug_export::write(cfg.output.format, writer, &transactions)
}

async fn run_inspect(
    file: &Path,
    text: Option<&Path>,
    kind: Option<DocumentKind>,
    cfg: &Config,
) -> Result<()> {
    let matcher = FilenameMatcher::new().context("compiling filename patterns")?;
    let Some(kind) = kind.or_else(|| matcher.kind(file)) else {
        bail!(
            "cannot tell the statement kind of {} from its name (pass --kind)",
            file.display()
        );
    };

    let parsed = match text {
        Some(t) => {
            let body =
                std::fs::read_to_string(t).with_context(|| format!("read {}", t.display()))?;
            parse_text(kind, &file.display().to_string(), &body, matcher.metadata(file).as_ref())
        }
        None => read_document(&Document::new(file, kind), &matcher, &cfg.extract.extractor()).await,
    }
    .with_context(|| format!("parsing {}", file.display()))?;

    print_statement(&parsed);
    Ok(())
}

fn print_statement(parsed: &ParsedStatement) {
    let s = &parsed.statement;
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    println!("source:     {}", s.source);
    println!("layout:     {}", s.layout.name());
    println!("account:    {}", or_dash(s.account.clone()));
    if let Some(iban) = &s.iban {
        println!("iban:       {iban}");
    }
    println!(
        "statement:  {}/{}",
        or_dash(s.number.map(|n| n.to_string())),
        or_dash(s.year.map(|y| y.to_string()))
    );
    if let (Some(from), Some(to)) = (s.period_from, s.period_to) {
        println!("period:     {from} .. {to}");
    }
    println!(
        "opening:    {} {}",
        or_dash(s.opening_balance.map(|v| v.to_string())),
        s.opening_date.map(|d| format!("({d})")).unwrap_or_default()
    );
    println!(
        "closing:    {} {}",
        or_dash(s.closing_balance.map(|v| v.to_string())),
        s.closing_date.map(|d| format!("({d})")).unwrap_or_default()
    );
    match &parsed.reconciliation {
        Reconciliation::Balanced => println!("balance:    ok, {} booked", parsed.total()),
        Reconciliation::Mismatch(d) => println!("balance:    MISMATCH, {d}"),
        Reconciliation::Skipped => println!("balance:    not checked, a balance line is missing"),
    }

    println!("\n{} transactions", parsed.transactions.len());
    for t in &parsed.transactions {
        let foreign = t
            .foreign
            .as_ref()
            .map(|f| format!(" [{} {} @ {}]", f.amount, f.currency, f.rate))
            .unwrap_or_default();
        println!(
            "{}  {}  {}  {:>10}  {:<16} {}{}",
            t.ordinal_label(),
            t.booked,
            t.valued,
            t.value,
            t.kind,
            t.comment,
            foreign
        );
    }
}
