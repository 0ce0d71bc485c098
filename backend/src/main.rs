//! Transco CLI - transcode workbook rows through a rule table
//!
//! A workbook is a directory of CSV sheets plus an optional `workbook.json`
//! declaring named and protected ranges.
//!
//! ```bash
//! transco run book/ --source Catalog --dest Form --transco Transco --row 2
//! transco run book/                          # prompts for what is missing
//! transco rules book/ --transco Transco      # show the compiled mapping
//! transco find-column book/ Catalog Title    # zero-based column of a header
//! transco export book/ Form -o form.csv      # text-safe CSV export
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use transco::{
    compile, export_text_safe, load_dir, load_rules, request_value_stdin, resolve_field_index, save_sheet,
    transcode_and_copy, DataSource, InputKind, LogBroadcaster, LogSink, TranscodeOptions, TranscodeRequest,
};

#[derive(Parser)]
#[command(name = "transco")]
#[command(about = "Transcode spreadsheet rows through a rule table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcode one source row and write it to the destination sheet
    Run {
        /// Workbook directory
        book: PathBuf,

        /// Source sheet
        #[arg(short, long)]
        source: Option<String>,

        /// Destination sheet
        #[arg(short, long)]
        dest: Option<String>,

        /// Transcoding table sheet
        #[arg(short, long)]
        transco: Option<String>,

        /// Source row (1-based)
        #[arg(short, long)]
        row: Option<usize>,

        /// Header row of the source sheet (default: TRANSCO_HEADER_ROW or 1)
        #[arg(long)]
        header_row: Option<usize>,

        /// Don't save the destination sheet back to the workbook
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the mapping compiled from a transcoding table
    Rules {
        /// Workbook directory
        book: PathBuf,

        /// Transcoding table sheet
        #[arg(short, long)]
        transco: String,

        /// Print the mapping as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the zero-based column of a header
    FindColumn {
        /// Workbook directory
        book: PathBuf,

        /// Sheet to search
        dataset: String,

        /// Header text (exact match)
        field: String,

        /// Header row (1-based)
        #[arg(long, default_value = "1")]
        header_row: usize,
    },

    /// Export a sheet as text-safe CSV (`;`, every cell quoted and prefixed with ')
    Export {
        /// Workbook directory
        book: PathBuf,

        /// Sheet to export
        dataset: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            book,
            source,
            dest,
            transco,
            row,
            header_row,
            dry_run,
        } => cmd_run(&book, source, dest, transco, row, header_row, dry_run),

        Commands::Rules { book, transco, json } => cmd_rules(&book, &transco, json),

        Commands::FindColumn {
            book,
            dataset,
            field,
            header_row,
        } => cmd_find_column(&book, &dataset, &field, header_row),

        Commands::Export { book, dataset, output } => cmd_export(&book, &dataset, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    book: &Path,
    source: Option<String>,
    dest: Option<String>,
    transco: Option<String>,
    row: Option<usize>,
    header_row: Option<usize>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = TranscodeOptions::from_env()?;
    if let Some(header_row) = header_row {
        options = options.with_header_row(header_row);
    }

    let source_dataset = or_prompt(source, "Source sheet name?", InputKind::Any)?;
    let dest_dataset = or_prompt(dest, "Destination sheet name?", InputKind::Any)?;
    let transco_dataset = or_prompt(transco, "Transcoding sheet name?", InputKind::Any)?;
    let row = match row {
        Some(row) => row,
        None => or_prompt(None, "Row number to transcode?", InputKind::Numeric)?.parse()?,
    };

    eprintln!("📄 Workbook: {}", book.display());
    let mut workbook = load_dir(book)?;
    let source = workbook.clone();
    let log = LogBroadcaster::new();

    let request = TranscodeRequest::new(source_dataset, dest_dataset, transco_dataset, row);
    let report = transcode_and_copy(&source, &mut workbook, &request, &options, &log)?;

    if !report.write.is_ok() {
        log.warning(&format!("{} field(s) could not be written", report.failures().len()));
    }

    if dry_run {
        log.info("Dry run, workbook left unchanged");
    } else if !report.written().is_empty() {
        let path = save_sheet(&workbook, &request.dest_dataset, book)?;
        log.success(&format!("Saved '{}' to {}", request.dest_dataset, path.display()));
    }

    Ok(())
}

/// Use `value` if given, otherwise ask on stdin. EOF cancels the command.
fn or_prompt(value: Option<String>, question: &str, kind: InputKind) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(value) = value {
        return Ok(value);
    }
    request_value_stdin(question, kind)?.ok_or_else(|| "Cancelled".into())
}

fn cmd_rules(book: &Path, transco: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workbook = load_dir(book)?;
    let log = LogBroadcaster::new();

    let rules = load_rules(&workbook, transco)?;
    let mapping = compile(&rules, &log)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&mapping)?);
        return Ok(());
    }

    eprintln!("🗺️  {} destination field(s) from {} rule(s):\n", mapping.len(), rules.len());
    for (dest, entry) in mapping.iter() {
        println!("  {}", dest);
        println!("     Sources: {}", entry.sources.join(", "));
        if let Some(ref delimiter) = entry.split_delimiter {
            println!("     Split on: '{}'", delimiter);
        }
    }
    Ok(())
}

fn cmd_find_column(
    book: &Path,
    dataset: &str,
    field: &str,
    header_row: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let workbook = load_dir(book)?;
    if !workbook.has_dataset(dataset) {
        return Err(format!("Sheet not found: {}", dataset).into());
    }

    let index = resolve_field_index(&workbook, dataset, header_row, field)?;
    println!("{}", index);
    Ok(())
}

fn cmd_export(book: &Path, dataset: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let workbook = load_dir(book)?;
    let rows = workbook.all_rows(dataset)?;
    let content = export_text_safe(&rows)?;

    match output {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
