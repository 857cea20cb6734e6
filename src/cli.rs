use clap::{Args, Parser, Subcommand};
use octopunch_common::BackendKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "octopunch-manage")]
#[command(author, version, about = "Manage the octopunch vCenter registry database")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database connection override (file path or :memory:)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Database backend override (sqlite)
    #[arg(long, global = true, value_parser = parse_backend)]
    pub backend: Option<BackendKind>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Database maintenance
    #[command(subcommand)]
    Db(DbCommands),

    /// Manage registered vCenters
    #[command(subcommand)]
    Vcenter(VcenterCommands),

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Apply pending schema migrations
    Sync,

    /// Show the current and latest schema versions
    Version,

    /// Force the engine to establish new connections
    Dispose,
}

#[derive(Subcommand)]
pub enum VcenterCommands {
    /// List registered vCenters
    List {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        datacenter: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single vCenter
    Show {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a vCenter
    Create(CreateArgs),

    /// Change fields of a registered vCenter
    Update(UpdateArgs),

    /// Remove a registered vCenter
    Delete { id: String },
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub host: String,

    #[arg(long, default_value = "443")]
    pub port: i64,

    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub datacenter: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Explicit ID (generated if omitted)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<i64>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub datacenter: Option<String>,

    /// Remove the datacenter
    #[arg(long, conflicts_with = "datacenter")]
    pub clear_datacenter: bool,

    #[arg(long)]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long, conflicts_with = "description")]
    pub clear_description: bool,

    #[arg(long)]
    pub status: Option<String>,
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    s.parse().map_err(|e: octopunch_common::Error| e.to_string())
}
