use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stockroom", bin_name = "stockroom", version)]
#[command(about = "Local-first inventory tracker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Inventory to operate on (defaults to the configured storage key)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub inventory: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true, help_heading = "Options")]
    pub yes: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an item
    Add {
        /// Item name (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,

        /// Starting quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Image file to embed
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// List items, newest first
    #[command(alias = "ls")]
    List,

    /// Change an item's quantity by a signed amount
    Adjust {
        /// Item id or unique id prefix
        id: String,

        /// Amount to add (negative to remove)
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },

    /// Delete an item
    #[command(alias = "rm")]
    Remove {
        /// Item id or unique id prefix
        id: String,
    },

    /// Delete every item
    Clear,

    /// Write all items to inventory_export_<date>.json
    Export {
        /// Target directory (defaults to the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Merge items from a JSON export
    Import {
        file: PathBuf,
    },

    /// Show storage usage
    Usage,

    /// Push the inventory to the sync endpoint
    Sync {
        /// Override the configured endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Show or change settings
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}
