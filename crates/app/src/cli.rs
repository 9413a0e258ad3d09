//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pokefetch_infrastructure::{AdapterKind, Settings};

/// Pokemon lookups, CMS queries and recently viewed history.
#[derive(Debug, Parser)]
#[command(name = "pokefetch")]
#[command(version)]
pub struct Cli {
    /// Answer from fixtures instead of the network
    #[arg(long, global = true)]
    pub offline: bool,

    /// Fixture file used with --offline
    #[arg(long, global = true, value_name = "PATH")]
    pub fixtures: Option<PathBuf>,

    /// Default request timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Directory holding the history file
    #[arg(long, global = true, value_name = "DIR")]
    pub history_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a Pokemon by name or number and remember it
    Pokemon {
        /// Name or Pokedex number
        name: String,
    },

    /// Run a GraphQL operation against the CMS
    Graphql {
        /// The GraphQL document
        query: String,
        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,
        /// Operation name to select from the document
        #[arg(long)]
        operation_name: Option<String>,
        /// query, mutation or subscription
        #[arg(long, default_value = "query")]
        kind: String,
    },

    /// Show recently viewed items
    History {
        /// Forget all recently viewed items
        #[arg(long)]
        clear: bool,
    },
}

impl Cli {
    /// Applies command-line overrides on top of environment settings.
    pub fn apply(&self, settings: &mut Settings) {
        if self.offline {
            settings.adapter = AdapterKind::InMemory;
        }
        if let Some(path) = &self.fixtures {
            settings.fixtures = Some(path.clone());
        }
        if let Some(ms) = self.timeout_ms {
            settings.timeout_ms = Some(ms);
        }
        if let Some(dir) = &self.history_dir {
            settings.history_dir = Some(dir.clone());
        }
    }
}
