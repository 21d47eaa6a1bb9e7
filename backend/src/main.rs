//! Inventory CLI - fetch, parse and query the inventory sheet
//!
//! ```bash
//! inventory fetch                        # Fetch the sheet, print records as JSON
//! inventory parse sheet.csv              # Parse a local CSV file
//! inventory categories                   # Distinct categories
//! inventory suppliers                    # Distinct suppliers
//! inventory search milk                  # Case-insensitive search
//! inventory filter --category Dairy      # Exact-match filter
//! inventory export -o out.csv --supplier Metro
//! inventory serve                        # Start HTTP server (port 3000)
//! ```

use clap::{Args, Parser, Subcommand};
use inventory::{
    server::{start_server, AppState},
    AnySource, Config, FileSource, HttpSource, InventoryStore, ItemQuery, Record,
    LOG_BROADCASTER,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "inventory")]
#[command(about = "Fetch, parse and query a published inventory spreadsheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the CSV comes from (default: configured URL)
#[derive(Args, Clone, Default)]
struct SourceArgs {
    /// CSV export URL
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Local CSV file
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet and output records as JSON
    Fetch {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a local CSV file and output records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List distinct categories
    Categories {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List distinct suppliers (default and alternative)
    Suppliers {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Search items by name, category or default supplier
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Filter items by exact category or supplier
    Filter {
        #[arg(long)]
        category: Option<String>,

        /// Matches either supplier column
        #[arg(long)]
        supplier: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Write (optionally filtered) items to a CSV file
    Export {
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        query: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        supplier: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: INVENTORY_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match Config::from_env() {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Fetch { source, output } => cmd_fetch(&config, &source, output.as_deref()).await,

        Commands::Parse { input, output } => {
            let source = SourceArgs {
                url: None,
                file: Some(input),
            };
            cmd_fetch(&config, &source, output.as_deref()).await
        }

        Commands::Categories { source } => {
            let store = load(&config, &source).await?;
            print_values(&store.categories());
            Ok(())
        }

        Commands::Suppliers { source } => {
            let store = load(&config, &source).await?;
            print_values(&store.suppliers());
            Ok(())
        }

        Commands::Search { query, source } => {
            let store = load(&config, &source).await?;
            let found = store.search(&query);
            eprintln!("🔎 {} match(es) for '{}'", found.len(), query);
            print_records(&found, None)
        }

        Commands::Filter {
            category,
            supplier,
            source,
        } => {
            let store = load(&config, &source).await?;
            let query = ItemQuery {
                search: None,
                category,
                supplier,
            };
            let found = store.query(&query);
            eprintln!("🔎 {} item(s)", found.len());
            print_records(&found, None)
        }

        Commands::Export {
            output,
            query,
            category,
            supplier,
            source,
        } => {
            let store = load(&config, &source).await?;
            let query = ItemQuery {
                search: query,
                category,
                supplier,
            };
            let found = store.query(&query);
            let written =
                inventory::write_records_file(&output, &store.records().keys, found)?;
            eprintln!("💾 {} item(s) written to: {}", written, output.display());
            Ok(())
        }

        Commands::Serve { port, source } => {
            let port = port.unwrap_or(config.port);
            let store = InventoryStore::new(config.parse_options()).shared();
            let state = AppState::new(store, build_source(&config, &source)?);
            start_server(port, state).await?;
            Ok(())
        }
    }
}

async fn cmd_fetch(
    config: &Config,
    source: &SourceArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = load(config, source).await?;
    let records: Vec<&Record> = store.records().iter().collect();
    eprintln!("✅ {} item(s)", records.len());
    print_records(&records, output)
}

fn build_source(
    config: &Config,
    args: &SourceArgs,
) -> Result<AnySource, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.file {
        return Ok(FileSource::new(path).into());
    }

    let url = args.url.as_deref().unwrap_or(&config.csv_url);
    Ok(HttpSource::with_timeout(url, config.fetch_timeout)?.into())
}

/// Fetch and parse once, with log echo off so stdout stays machine-readable.
async fn load(
    config: &Config,
    args: &SourceArgs,
) -> Result<InventoryStore, Box<dyn std::error::Error>> {
    LOG_BROADCASTER.set_quiet(true);

    let source = build_source(config, args)?;
    eprintln!("📄 Loading: {}", inventory::CsvSource::describe(&source));

    let mut store = InventoryStore::new(config.parse_options());
    if !store.initialize(&source).await {
        let message = store
            .error()
            .unwrap_or("Failed to fetch inventory data")
            .to_string();
        return Err(message.into());
    }

    Ok(store)
}

fn print_values(values: &[String]) {
    for value in values {
        println!("{}", value);
    }
}

fn print_records(
    records: &[&Record],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(records)?;
    write_output(&json, output)
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
