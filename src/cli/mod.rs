pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "jewelry")]
#[command(about = "Jewelry catalog CLI - inspect routes, navigation and configuration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List the route table")]
    Routes {
        #[arg(long, help = "Show only the route with this name")]
        name: Option<String>,
    },

    #[command(about = "Run a navigation through the access guard")]
    Resolve {
        #[arg(help = "Path to navigate to, e.g. /admin")]
        path: String,
        #[arg(long, help = "ID token for the current user (anonymous if omitted)")]
        token: Option<String>,
    },

    #[command(about = "Show effective configuration with secrets redacted")]
    Config,

    #[command(about = "Print backend addresses for the configured project")]
    Backend {
        #[arg(long, help = "Document collection to address, e.g. products")]
        collection: Option<String>,
        #[arg(long, help = "Storage object path to address, e.g. products/ring.jpg")]
        object: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Routes { name } => commands::routes::handle(name.as_deref(), output_format),
        Commands::Resolve { path, token } => commands::resolve::handle(&path, token.as_deref(), output_format),
        Commands::Config => commands::config::handle(output_format),
        Commands::Backend { collection, object } => {
            commands::backend::handle(collection.as_deref(), object.as_deref(), output_format)
        }
    }
}
