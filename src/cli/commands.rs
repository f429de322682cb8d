use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pocforge", version, about = "Turn vulnerability descriptions into runnable POCs and manage the POC library")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Backend base URL (overrides config and POCFORGE_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a POC from a vulnerability description
    Generate(GenerateArgs),
    /// List, filter and sort the POC library
    Library(LibraryArgs),
    /// Show one POC record
    Show(IdArgs),
    /// Show the manual verification guide of a POC
    Guide(IdArgs),
    /// Print the source of a POC
    Code(IdArgs),
    /// Write a POC to disk
    Download(DownloadArgs),
    /// Delete a POC from the library
    Delete(IdArgs),
    /// Run a POC against a target URL
    Execute(ExecuteArgs),
    /// Show server-side library statistics
    Stats(StatsArgs),
    /// Check backend health
    Health,
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// Show version and build information
    Version,
}

#[derive(Args, Clone)]
pub struct GenerateArgs {
    /// Vulnerability description
    #[arg(short, long, conflicts_with = "info_file", required_unless_present = "info_file")]
    pub info: Option<String>,

    /// Read the vulnerability description from a file
    #[arg(long)]
    pub info_file: Option<String>,

    /// Target environment details (stack, versions)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Directory to save the generated POC into
    #[arg(long)]
    pub save: Option<String>,
}

#[derive(Args, Clone)]
pub struct LibraryArgs {
    /// Category: all, verifiable, manual
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Case-insensitive search over name, type and description
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Exact vulnerability type
    #[arg(long)]
    pub vuln_type: Option<String>,

    /// Sort order: newest, oldest, name
    #[arg(long, default_value = "newest")]
    pub sort: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct IdArgs {
    /// POC id
    pub id: u64,
}

#[derive(Args, Clone)]
pub struct DownloadArgs {
    /// POC id
    pub id: u64,

    /// Destination directory
    #[arg(short, long, default_value = ".")]
    pub dir: String,
}

#[derive(Args, Clone)]
pub struct ExecuteArgs {
    /// POC id
    pub id: u64,

    /// Target URL
    pub url: String,
}

#[derive(Args, Clone)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
