//! netstate CLI
//!
//! Command-line access to the host network state snapshot.
//!
//! # Commands
//!
//! - `show` - Print the JSON snapshot
//! - `compare` - Cross-check the snapshot against `npc` output
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use netstate_core::{retrieve_with_timeout, LibraryConfig, NetStateRetriever, SymbolNames};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Host network state snapshots from libnispor.
#[derive(Parser)]
#[command(name = "netstate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path or soname of the native library (overrides NETSTATE_LIBRARY)
    #[arg(global = true, short, long)]
    library: Option<PathBuf>,

    /// Symbol set exported by the native library
    #[arg(global = true, long, value_enum, default_value_t = Symbols::Nispor)]
    symbols: Symbols,

    /// Give up waiting for the native call after this many milliseconds
    #[arg(global = true, short, long)]
    timeout_ms: Option<u64>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// C ABI symbol sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Symbols {
    /// nispor_net_state_retrieve / nispor_net_state_free
    Nispor,
    /// nispor_state_get / nispor_state_free
    NisporStateGet,
}

impl From<Symbols> for SymbolNames {
    fn from(symbols: Symbols) -> Self {
        match symbols {
            Symbols::Nispor => SymbolNames::nispor(),
            Symbols::NisporStateGet => SymbolNames::nispor_state_get(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the JSON snapshot
    Show {
        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,

        /// Print only this top-level member (e.g. ifaces, routes)
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Compare the snapshot against the output of npc
    Compare {
        /// npc executable
        #[arg(long, default_value = "npc")]
        npc: PathBuf,

        /// Arguments passed to npc
        #[arg(last = true, default_values = ["iface", "-j"])]
        args: Vec<String>,
    },

    /// Show version information
    Version,
}

/// Retrieves the snapshot using the global options.
pub(crate) struct Source {
    config: LibraryConfig,
    timeout: Option<Duration>,
}

impl Source {
    fn from_cli(cli: &Cli) -> Self {
        let mut config = LibraryConfig::from_env().with_symbols(cli.symbols.into());
        if let Some(library) = &cli.library {
            config = config.with_library(library);
        }
        Self {
            config,
            timeout: cli.timeout_ms.map(Duration::from_millis),
        }
    }

    pub(crate) fn retrieve(&self) -> Result<String, Box<dyn std::error::Error>> {
        let retriever: NetStateRetriever = NetStateRetriever::open(&self.config)?;
        debug!(library = %retriever.library().path().display(), "retrieving net state");
        let state = match self.timeout {
            Some(timeout) => retrieve_with_timeout(&Arc::new(retriever), timeout)?,
            None => retriever.retrieve()?,
        };
        Ok(state)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source = Source::from_cli(&cli);

    match cli.command {
        Commands::Show { pretty, section } => {
            commands::show::run(&source, pretty, section.as_deref())?;
        }
        Commands::Compare { npc, args } => {
            commands::compare::run(&source, &npc, &args)?;
        }
        Commands::Version => {
            println!("netstate CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("netstate core v{}", netstate_core::VERSION);
        }
    }

    Ok(())
}
