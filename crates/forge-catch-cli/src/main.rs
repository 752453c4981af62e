//! forge-catch: generate Arrow wrappers from a symbol catalog
//!
//! # Usage
//!
//! ```text
//! forge-catch --catalog build/catalog.json --out build/generated/kotlin \
//!     --include 'io.example.Client.*' --exclude 'io.example.Client.close' --raise --either
//! ```
//!
//! # Environment Variables
//!
//! - `FORGE_CATCH_LOG` - Log level (default: "info")

mod generate;

use anyhow::Result;
use std::env;

const USAGE: &str = "\
Usage: forge-catch --catalog <catalog.json> [options]

Options:
  --catalog, -c <file>    Symbol catalog (JSON)
  --config <file>         Generator config (TOML)
  --out, -o <dir>         Output directory (default: generated)
  --include, -i <name>    Operation name or pattern to wrap (repeatable)
  --exclude, -x <name>    Operation name or pattern to skip (repeatable)
  --raise                 Generate Raise wrappers
  --either                Generate Either wrappers
  --effect                Generate Effect wrappers
  --dry-run               Render without writing; print unit paths
  --help, -h              Show this message";

fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("FORGE_CATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    generate::run(&args)
}
