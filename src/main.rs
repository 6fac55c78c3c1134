//! oh-my-traefik (omt) - Traefik development stack management CLI
//!
//! A CLI tool for operating a local multi-service Traefik deployment:
//! locally-trusted TLS certificates covering all routed hostnames, and
//! service scaffolding with automatic port detection from image metadata.

use std::process;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

mod certs;
mod cli;
mod config;
mod image;
mod routes;
mod runtime;
mod scaffold;
mod template;

use cli::{Cli, Commands};
use config::StackConfig;
use runtime::PodmanRuntime;

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {:#}", "✗".red(), err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let stack = StackConfig::load()?;

    match cli.command {
        Commands::Certs => certs::generate(&stack),
        Commands::Hosts => routes::list_hosts(&stack),
        Commands::NewService { name, image, port } => {
            let runtime = PodmanRuntime::new(&stack.runtime);
            scaffold::new_service(&stack, &runtime, &name, &image, port)
        }
    }
}
