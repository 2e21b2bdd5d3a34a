use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use comex_pdf_reader::output::{write_csv, write_json};
use comex_pdf_reader::{
    ExchangeRateTable, LopdfReader, OutputFormat, PipelineOptions, QualityMode, ReadOptions, Table,
    UploadedPdf, process_duas, process_percepciones,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "comex2csv",
    version,
    about = "Extract DUAS and Percepciones customs PDFs into accounting tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract DUAS declarations, one row per PDF.
    Duas(DuasArgs),
    /// Extract Percepciones receipts, one row per PDF.
    Percepciones(CommonArgs),
    /// Convert a monthly sell-rate PDF into a Data,Venta CSV.
    Rates(RatesArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Input PDF paths, processed in the given order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path; standard output when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv or json.
    #[arg(long, default_value = "csv")]
    format: String,

    /// Output delimiter character for CSV.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Minimum cells required per candidate table row.
    #[arg(long, default_value_t = 2)]
    min_cols: usize,

    /// Handling of low-confidence tables: best-effort, strict or skip-ambiguous.
    #[arg(long, default_value = "best-effort")]
    quality_mode: String,

    /// Print each document as it is read.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct DuasArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Exchange-rate CSV with Data and Venta columns. Repeatable; later
    /// files win on shared dates.
    #[arg(long)]
    rates: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct RatesArgs {
    /// Monthly sell-rate PDF.
    input: PathBuf,

    /// Year the PDF covers.
    #[arg(long)]
    year: i32,

    /// Month the PDF covers, 1-12.
    #[arg(long)]
    month: u32,

    /// Output CSV path; standard output when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_options(args: &CommonArgs, preset: PipelineOptions) -> Result<PipelineOptions> {
    let quality_mode = QualityMode::from_str(&args.quality_mode)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --quality-mode")?;
    let options = PipelineOptions {
        read: ReadOptions {
            min_cols: args.min_cols,
            quality_mode,
            ..preset.read
        },
        ..preset
    };
    options.validate().context("invalid read options")?;
    Ok(options)
}

fn load_documents(paths: &[PathBuf]) -> Result<Vec<UploadedPdf>> {
    paths
        .iter()
        .map(|path| {
            let bytes =
                std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
            Ok(UploadedPdf::new(name, bytes))
        })
        .collect()
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    })
}

fn write_table(table: &Table, args: &CommonArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --format")?;
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let writer = open_output(args.output.as_deref())?;
    match format {
        #[allow(clippy::cast_possible_truncation)]
        OutputFormat::Csv => write_csv(writer, table, args.delimiter as u8)?,
        OutputFormat::Json => write_json(writer, table)?,
    }
    Ok(())
}

fn progress_printer(verbose: bool) -> impl FnMut(usize, usize, &str) {
    move |index: usize, total: usize, filename: &str| {
        if verbose {
            eprintln!("[{index}/{total}] {filename}");
        }
    }
}

fn load_rates(paths: &[PathBuf]) -> Result<Option<ExchangeRateTable>> {
    let mut merged: Option<ExchangeRateTable> = None;
    for path in paths {
        let table = ExchangeRateTable::from_csv_path(path)
            .with_context(|| format!("failed to load rates from '{}'", path.display()))?;
        match merged.as_mut() {
            Some(existing) => existing.merge(table),
            None => merged = Some(table),
        }
    }
    Ok(merged)
}

fn run_duas(args: &DuasArgs) -> Result<usize> {
    let options = parse_options(&args.common, PipelineOptions::duas())?;
    let rates = load_rates(&args.rates)?;
    let documents = load_documents(&args.common.inputs)?;

    let reader = LopdfReader::new(options.read.clone());
    let mut progress = progress_printer(args.common.verbose);
    let Some(table) = process_duas(&documents, &reader, rates.as_ref(), &options.codes, &mut progress)
    else {
        return Ok(0);
    };
    write_table(&table, &args.common)?;
    Ok(table.len())
}

fn run_percepciones(args: &CommonArgs) -> Result<usize> {
    let options = parse_options(args, PipelineOptions::percepciones())?;
    let documents = load_documents(&args.inputs)?;

    let reader = LopdfReader::new(options.read.clone());
    let mut progress = progress_printer(args.verbose);
    let Some(table) = process_percepciones(&documents, &reader, &options.codes, &mut progress)
    else {
        return Ok(0);
    };
    write_table(&table, args)?;
    Ok(table.len())
}

fn run_rates(args: &RatesArgs) -> Result<usize> {
    let pdf = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let reader = LopdfReader::new(ReadOptions::default());
    let table = ExchangeRateTable::from_month_pdf(&reader, &pdf, args.year, args.month)
        .with_context(|| format!("failed to read rates from '{}'", args.input.display()))?;

    let writer = open_output(args.output.as_deref())?;
    table.write_csv(writer)?;
    Ok(table.len())
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("comex_pdf_reader=warn,comex_pdf_layout=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Duas(args) => run_duas(args),
        Commands::Percepciones(args) => run_percepciones(args),
        Commands::Rates(args) => run_rates(args),
    };

    match outcome {
        Ok(rows) if rows > 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
