use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anisearch")]
#[command(author, version, about = "AniSearch metadata lookup tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a title or id and print the assembled metadata
    Metadata(QueryArgs),

    /// List candidate entries for a title and/or id
    Search(QueryArgs),

    /// Print the cover image for a known id
    Images {
        /// AniSearch id
        #[arg(required = true)]
        id: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Title to search for
    #[arg(short, long)]
    pub title: Option<String>,

    /// Known AniSearch id (takes precedence over the title)
    #[arg(long)]
    pub id: Option<String>,
}
