//! CLI struct definitions for the sylte command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "sylte",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and replay function calls captured with sylt!"
)]
pub(crate) struct Cli {
    /// Store directory (defaults to $SYLTE_CACHE_DIR, then ~/.cache/sylte).
    #[clap(long, global = true)]
    pub dir: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List captured calls, oldest first
    List {
        /// Only include identifiers containing this text
        substring: Option<String>,
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Show the arguments of the most recent matching call
    Latest {
        /// Only consider identifiers containing this text
        substring: Option<String>,
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Show the arguments of one captured call
    Show {
        /// Exact identifier, as printed by `list`
        identifier: String,
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Delete every captured call
    Clear,
    /// Print the store directory
    Path,
}
