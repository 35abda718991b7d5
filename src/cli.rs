//! CLI definitions for SiteProbe.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SiteProbe CLI.
#[derive(Parser)]
#[command(name = "siteprobe")]
#[command(about = "Heuristic snapshot of a web page's technologies and security posture")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config/default.toml",
        env = "SITEPROBE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Open a page and analyze it
    Analyze {
        /// Page URL
        url: String,

        /// Print the analysis record as JSON
        #[arg(long)]
        json: bool,

        /// Also write an exported report into this directory
        #[arg(long)]
        export: Option<PathBuf>,

        /// Load the analyzer with the page instead of injecting it on demand
        #[arg(long)]
        auto_inject: bool,
    },

    /// List analyses kept in the local store
    History {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Remove a domain's analysis from the local store
    Forget {
        /// Domain as shown by `history`
        domain: String,
    },

    /// Validate the configuration file
    CheckConfig,
}
