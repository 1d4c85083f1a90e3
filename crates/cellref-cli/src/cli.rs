use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cellref_types::{EditorKind, SetMode};

#[derive(Parser)]
#[command(
    name = "cellref",
    about = "Resolve and save content referenced from spreadsheet cells",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Engine config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify a raw cell value
    Classify(ClassifyArgs),
    /// Encode a locator into a cell value
    Encode(EncodeArgs),
    /// Resolve a cell value into content
    Load(LoadArgs),
    /// Save content and print the new cell value
    Save(SaveArgs),
}

#[derive(Args)]
pub struct ClassifyArgs {
    pub raw: String,
    #[arg(long, default_value = "json")]
    pub editor: EditorKind,
}

#[derive(Args)]
pub struct EncodeArgs {
    pub locator: String,
    #[arg(long, default_value = "json")]
    pub editor: EditorKind,
    #[arg(long)]
    pub auto_loaded: bool,
    /// The locator is a managed file id
    #[arg(long)]
    pub managed: bool,
}

/// Where managed files live and which cell is active.
#[derive(Args)]
pub struct StoreArgs {
    /// Directory of the local managed file store
    #[arg(long, default_value = ".cellref")]
    pub root: PathBuf,
    #[arg(long, default_value = "json")]
    pub editor: EditorKind,
    /// Current value of the cell
    #[arg(long, default_value = "")]
    pub cell: String,
    #[arg(long, default_value = "Sheet1")]
    pub sheet: String,
    /// Value of the row's key column
    #[arg(long, default_value = "row")]
    pub key: String,
    /// Header of the column
    #[arg(long, default_value = "content")]
    pub field: String,
}

#[derive(Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args)]
pub struct SaveArgs {
    #[command(flatten)]
    pub store: StoreArgs,
    #[arg(long)]
    pub content: String,
    /// raw, current, new-internal or new-external
    #[arg(long)]
    pub mode: SetMode,
    /// Locator from the last load
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub managed: bool,
    #[arg(long)]
    pub auto_loaded: bool,
}
