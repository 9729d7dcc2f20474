//! Sylte: capture function arguments to disk and load them back later.
//!
//! Wrap a function with [`sylt!`] and every call persists its arguments to the
//! store before the function runs. The captured calls can then be listed, and
//! any of them loaded ("unsylted") for offline inspection or replay.
//!
//! # Store
//!
//! One directory, `$SYLTE_CACHE_DIR` or `~/.cache/sylte` by default, holding one
//! `{identifier}.pickle` file per call. Identifiers have the form
//! `{caller-file-stem}-{function}-{YYYY-MM-DD-HH-MM-SS}` and are ordered by that
//! trailing timestamp.
//!
//! # Examples
//!
//! ```no_run
//! use sylte::{Store, sylt};
//!
//! fn add(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! let store = Store::new("/tmp/sylte-demo");
//! let add = sylt!(store, add);
//! assert_eq!(add.call((3_i64, 7_i64)).unwrap(), 10);
//!
//! let latest = store.latest("add").unwrap().unwrap();
//! println!("{}", latest);
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: identifiers, values, the store, capture wrappers and the name index
//! - the `sylte` binary: `list`, `latest`, `show`, `clear` and `path` over a store

mod cli;
pub mod core;

pub use crate::core::capture::{Invoke, Sylted};
pub use crate::core::error::SylteError;
pub use crate::core::ident::{CallId, later_of};
pub use crate::core::index::Index;
pub use crate::core::store::{Store, default_store};
pub use crate::core::value::{Payload, Placeholder, ToPayload, ToValue, Value};

use crate::core::output::{self, OutputFormat};
use clap::Parser;
use cli::{Cli, Command};

/// Entry point of the `sylte` binary.
pub fn run() -> Result<(), SylteError> {
    let cli = Cli::parse();
    let store = match cli.dir {
        Some(dir) => Store::new(dir),
        None => Store::from_env()?,
    };
    execute(&store, cli.command)
}

fn execute(store: &Store, command: Command) -> Result<(), SylteError> {
    use colored::Colorize;

    match command {
        Command::List { substring, format } => {
            let format: OutputFormat = format.parse()?;
            let ids = store.list(substring.as_deref().unwrap_or(""))?;
            let rendered = output::render_ids(&ids, format)?;
            if !rendered.is_empty() {
                println!("{}", rendered);
            }
        }
        Command::Latest { substring, format } => {
            let format: OutputFormat = format.parse()?;
            let substring = substring.unwrap_or_default();
            match store.latest_id(&substring)? {
                Some(id) => {
                    let payload = store.unsylt(id.as_str())?;
                    if format == OutputFormat::Text {
                        println!("{}", id.as_str().bright_white());
                    }
                    println!("{}", output::render_payload(&payload, format)?);
                }
                None => {
                    let scope = if substring.is_empty() {
                        String::new()
                    } else {
                        format!(" matching '{}'", substring)
                    };
                    eprintln!(
                        "{} No sylted calls{} in {}",
                        "ℹ".bright_blue(),
                        scope,
                        store.root.display()
                    );
                    if format == OutputFormat::Json {
                        println!("null");
                    }
                }
            }
        }
        Command::Show { identifier, format } => {
            let format: OutputFormat = format.parse()?;
            let payload = store.unsylt(&identifier)?;
            println!("{}", output::render_payload(&payload, format)?);
        }
        Command::Clear => {
            let removed = store.clear()?;
            println!(
                "{} Removed {} sylted call(s) from {}",
                "✓".bright_green(),
                removed,
                store.root.display()
            );
        }
        Command::Path => {
            println!("{}", store.root.display());
        }
    }
    Ok(())
}
