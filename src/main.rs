//! Pharmex CLI - Extract and rank human-use pharmaceutical trade data
//!
//! # Main Commands
//!
//! ```bash
//! pharmex serve                     # Start HTTP server (port 3000)
//! pharmex report trade.xlsx        # Print the five rankings
//! pharmex export trade.xlsx        # Write humanuse_data.csv
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! pharmex parse trade.xlsx         # Dump parsed rows as JSON
//! ```

use clap::{Parser, Subcommand};
use pharmex::{
    parse_workbook_file, run_file, to_csv, FilterChoices, PipelineOptions, RankRow, Selection,
    TradeReport, EXPORT_FILE_NAME,
};
use pharmex::{format_count, format_usd};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pharmex")]
#[command(about = "Extract human-use pharmaceutical trade data and rank products, ingredients, and customers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a workbook's first sheet and output rows as JSON
    Parse {
        /// Input workbook file (xlsx, xls, xlsb, ods)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the pipeline and print the five top-N rankings
    Report {
        /// Input workbook file
        input: PathBuf,

        /// Only rows for this exact customer
        #[arg(short, long)]
        customer: Option<String>,

        /// Only rows for this exact ingredient
        #[arg(short, long)]
        api: Option<String>,
    },

    /// Run the pipeline and export the filtered table as CSV
    Export {
        /// Input workbook file
        input: PathBuf,

        /// Output file (default: humanuse_data.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only rows for this exact customer
        #[arg(short, long)]
        customer: Option<String>,

        /// Only rows for this exact ingredient
        #[arg(short, long)]
        api: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Report {
            input,
            customer,
            api,
        } => cmd_report(&input, customer, api),

        Commands::Export {
            input,
            output,
            customer,
            api,
        } => cmd_export(&input, output.as_deref(), customer, api),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing workbook: {}", input.display());

    let sheet = parse_workbook_file(input)?;
    eprintln!("   Sheet: {}", sheet.sheet_name);
    eprintln!("   Columns: {}", sheet.headers.join(", "));
    eprintln!("✅ Parsed {} rows", sheet.row_count());

    let json = serde_json::to_string_pretty(&sheet.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_report(
    input: &Path,
    customer: Option<String>,
    api: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let outcome = run_file(input, &PipelineOptions::default())?;
    let selection = Selection::from_widgets(customer, api);
    let table = selection.apply(&outcome.table);

    eprintln!("   Sheet: {}", outcome.sheet.sheet_name);
    eprintln!("   Rows: {}", outcome.sheet.row_count);
    eprintln!("   Human-use: {}", outcome.table.len());
    if !selection.is_unfiltered() {
        eprintln!("   Selected: {}", table.len());
    }

    let choices = FilterChoices::from_table(&outcome.table);
    eprintln!(
        "   {} customers, {} ingredients",
        choices.customers.len(),
        choices.ingredients.len()
    );

    let report = TradeReport::build(&table);

    print_ranking(
        "📦 Top 10 Human-use Products by FOB (USD)",
        &report.products_by_value,
        format_usd,
    );
    print_ranking(
        "⚖️  Top 10 Human-use Products by Quantity",
        &report.products_by_quantity,
        format_count,
    );
    print_ranking(
        "🧪 Top 5 Ingredients by Value (USD)",
        &report.ingredients_by_value,
        format_usd,
    );
    print_ranking(
        "🧪 Top 5 Ingredients by Quantity",
        &report.ingredients_by_quantity,
        format_count,
    );
    print_ranking(
        "🏆 Top 10 Importing Customers by FOB (USD)",
        &report.customers_by_value,
        format_usd,
    );

    Ok(())
}

fn print_ranking(title: &str, rows: &[RankRow], fmt: fn(f64) -> String) {
    println!("\n{}", title);
    if rows.is_empty() {
        println!("   (no rows)");
        return;
    }
    for (i, row) in rows.iter().enumerate() {
        println!("   {:2}. {}  {}", i + 1, row.key, fmt(row.total));
    }
}

fn cmd_export(
    input: &Path,
    output: Option<&Path>,
    customer: Option<String>,
    api: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let outcome = run_file(input, &PipelineOptions::default())?;
    let selection = Selection::from_widgets(customer, api);
    let table = selection.apply(&outcome.table);

    let csv_text = to_csv(&table)?;
    let path = output.unwrap_or(Path::new(EXPORT_FILE_NAME));
    fs::write(path, csv_text)?;
    eprintln!("💾 Exported {} rows to: {}", table.len(), path.display());

    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    pharmex::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
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
