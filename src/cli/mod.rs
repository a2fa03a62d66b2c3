use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "import-atlas",
    version,
    about = "JavaScript/TypeScript import graph explorer",
    long_about = "Scan a JavaScript or TypeScript source tree, extract import relationships, and lay the resulting graph out on a 2D canvas. The project dialect is detected once per run; discovery honors the root .gitignore plus fixed build-output directories."
)]
pub struct Cli {
    /// Suppress the stdout summary
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,
    /// Increase log detail (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Rings around the most connected node, collision-free
    Spiral,
    /// Importers above the center, dependencies below (always recomputes)
    Hierarchical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze every source file under the project root
    Analyze {
        /// Project root (directory containing package.json); "." auto-detects
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Path to a TOML configuration file
        #[arg(long, env = "IMPORT_ATLAS_CONFIG")]
        config: Option<PathBuf>,
        /// Write the full graph + layout snapshot to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Placement algorithm
        #[arg(long, value_enum, default_value_t = LayoutArg::Spiral)]
        layout: LayoutArg,
        /// Positions store file (default: .import_atlas_positions.json in the root)
        #[arg(long, conflicts_with = "no_positions")]
        positions: Option<PathBuf>,
        /// Do not read or write the positions store
        #[arg(long, default_value_t = false)]
        no_positions: bool,
        /// Stdout format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Analyze one entry file and its immediate neighborhood
    Focus {
        /// The file to center on (absolute, or relative to the current dir)
        entry: PathBuf,
        /// Project root (directory containing package.json); "." auto-detects
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Path to a TOML configuration file
        #[arg(long, env = "IMPORT_ATLAS_CONFIG")]
        config: Option<PathBuf>,
        /// Write the full graph + layout snapshot to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Placement algorithm
        #[arg(long, value_enum, default_value_t = LayoutArg::Spiral)]
        layout: LayoutArg,
        /// Positions store file (default: .import_atlas_positions.json in the root)
        #[arg(long, conflicts_with = "no_positions")]
        positions: Option<PathBuf>,
        /// Do not read or write the positions store
        #[arg(long, default_value_t = false)]
        no_positions: bool,
        /// Stdout format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
