//! CLI entry points

pub mod serve;

use clap::{Parser, Subcommand};

/// Semantic response cache fronting a generative model
#[derive(Parser)]
#[command(name = "semantic-cache-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,
}
