//! DLS Inspect - look inside DLS instrument collections
//!
//! # Commands
//!
//! - `dls-inspect info <file>` - Print the collection descriptor only
//! - `dls-inspect list <file>` - List instruments, the pool table and load diagnostics
//! - `dls-inspect find <file> --patch <n>` - Look up one instrument by patch
//!
//! # Usage
//!
//! ```bash
//! dls-inspect list gm.dls
//!
//! # Drum kit, bank 0, program 0
//! dls-inspect find gm.dls --patch 0x80000000
//!
//! # Fail on any malformed chunk
//! dls-inspect --config strict.toml list gm.dls
//! ```
//!
//! # Config file
//!
//! ```toml
//! max_chunks = 4096
//! strict = true
//! ```
//!
//! Set `RUST_LOG=nether_dls=debug` to trace the loader.

mod find;
mod info;
mod list;
mod load;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// DLS Inspect - look inside DLS instrument collections
#[derive(Parser)]
#[command(name = "dls-inspect")]
#[command(about = "Inspect DLS instrument collections")]
#[command(version)]
struct Cli {
    /// Load options file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the collection descriptor (name, version, class)
    Info(info::InfoArgs),

    /// List instruments, pool table and load diagnostics
    List(list::ListArgs),

    /// Look up an instrument by patch number
    Find(find::FindArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = load::load_options(cli.config.as_deref())?;

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::List(args) => list::execute(args, &options),
        Commands::Find(args) => find::execute(args, &options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_is_global() {
        let cli = Cli::try_parse_from([
            "dls-inspect",
            "find",
            "gm.dls",
            "--patch",
            "0x10",
            "--config",
            "opts.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("opts.toml")));
        match cli.command {
            Commands::Find(args) => assert_eq!(args.patch, 0x10),
            _ => panic!("expected find"),
        }
    }
}
