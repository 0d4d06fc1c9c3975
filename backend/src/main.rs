//! Cornerpivot CLI - regroup per-corner point records and export them
//!
//! ```bash
//! cornerpivot serve                        # Start HTTP server (port 3000)
//! cornerpivot convert points.csv -o out/   # Write out/output.csv and out/output.xlsx
//! cornerpivot preview points.csv           # Print the pivoted table as JSON
//! ```
//!
//! `RUST_LOG` controls log verbosity (default `cornerpivot=info`); logs go to
//! stderr so `preview` output can be piped.

use clap::{Args, Parser, Subcommand, ValueEnum};
use cornerpivot::server::{start_server, ServerConfig};
use cornerpivot::{pivot_file, ExportFormat, PivotOptions, HEADER};
use serde_json::json;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cornerpivot", version)]
#[command(about = "Regroup per-corner point records into one row per identifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Address to bind
        #[arg(long, env = "CORNERPIVOT_HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "CORNERPIVOT_PORT", default_value = "3000")]
        port: u16,

        /// Largest accepted upload, in bytes
        #[arg(long, env = "CORNERPIVOT_MAX_UPLOAD_BYTES", default_value_t = cornerpivot::api::server::DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Pivot a CSV file and write the exports
    Convert {
        /// Input CSV file
        input: PathBuf,

        /// Directory receiving output.csv / output.xlsx
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Which exports to write
        #[arg(short, long, value_enum, default_value_t = FormatArg::Both)]
        format: FormatArg,

        #[command(flatten)]
        options: InputArgs,
    },

    /// Print the pivoted table as JSON
    Preview {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        options: InputArgs,
    },
}

/// How input files are read.
#[derive(Args, Debug, Clone, Default)]
struct InputArgs {
    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Treat the first line as a header and skip it
    #[arg(long)]
    skip_header: bool,
}

impl From<InputArgs> for PivotOptions {
    fn from(args: InputArgs) -> Self {
        PivotOptions {
            delimiter: args.delimiter,
            skip_header: args.skip_header,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Xlsx,
    Both,
}

impl FormatArg {
    fn formats(self) -> &'static [ExportFormat] {
        match self {
            FormatArg::Csv => &[ExportFormat::Csv],
            FormatArg::Xlsx => &[ExportFormat::Xlsx],
            FormatArg::Both => &ExportFormat::ALL,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            max_upload_bytes,
            input,
        } => {
            let config = ServerConfig {
                host,
                port,
                max_upload_bytes,
                defaults: input.into(),
            };
            start_server(config).await
        }

        Commands::Convert {
            input,
            out_dir,
            format,
            options,
        } => cmd_convert(&input, &out_dir, format, &options.into()).map(|_| ()),

        Commands::Preview { input, options } => cmd_preview(&input, &options.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cornerpivot=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_convert(
    input: &Path,
    out_dir: &Path,
    format: FormatArg,
    options: &PivotOptions,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let result = pivot_file(input, options)?;

    if result.rows.is_empty() {
        return Err("no rows to export".into());
    }

    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for &export in format.formats() {
        let bytes = export.encode(&result.rows)?;
        let path = out_dir.join(export.file_name());
        fs::write(&path, &bytes)?;
        eprintln!("💾 {} rows written to: {}", result.rows.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

fn cmd_preview(input: &Path, options: &PivotOptions) -> Result<(), Box<dyn std::error::Error>> {
    let result = pivot_file(input, options)?;

    let rows: Vec<Vec<String>> = result.rows.iter().map(|r| r.to_record()).collect();
    let preview = json!({
        "columns": HEADER,
        "rows": rows,
        "unplacedFragments": result.unplaced_fragments,
        "csvInfo": result.csv_info,
    });

    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}
