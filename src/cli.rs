//! CLI command definitions for oh-my-traefik
//!
//! This module contains all the clap-based command definitions and argument parsing.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "omt")]
#[command(about = "Manage a local Traefik development stack", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate locally-trusted certificates for all routed hostnames
    Certs,
    /// List hostnames discovered from service route configurations
    Hosts,
    /// Scaffold a new service from templates
    NewService {
        /// Service name (lowercased, becomes <name>.localhost)
        name: String,
        /// Container image reference
        #[arg(short, long)]
        image: String,
        /// Internal service port (auto-detected when omitted)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
