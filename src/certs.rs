//! TLS certificate provisioning
//!
//! Drives mkcert to issue one locally-trusted certificate covering every
//! routed hostname. The key is reused across runs when present so that
//! already-trusted certificates for unaffected hosts stay valid.

use std::{fs, path::Path, process::Command};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::{config::StackConfig, routes, runtime::ensure_tool};

/// Certificate output file name inside the certs directory
pub const CERT_FILE: &str = "cert.pem";
/// Private key output file name inside the certs directory
pub const KEY_FILE: &str = "key.pem";

/// Generate a certificate covering all routed hostnames
pub fn generate(stack: &StackConfig) -> Result<()> {
    ensure_tool("mkcert")?;

    let hosts = routes::extract_hosts(stack)?;
    if hosts.is_empty() {
        anyhow::bail!("No hostnames found");
    }

    let certs_dir = stack.certs_path();
    fs::create_dir_all(&certs_dir).context(format!(
        "Failed to create certificate directory: {}",
        certs_dir.display()
    ))?;

    let cert_file = certs_dir.join(CERT_FILE);
    let key_file = certs_dir.join(KEY_FILE);

    println!("{}", "Generating certificates for:".blue());
    for host in &hosts {
        println!("  - {}", host);
    }

    let args = mkcert_args(&cert_file, &key_file, key_file.exists(), &hosts);

    let status = Command::new("mkcert")
        .args(&args)
        .status()
        .context("Failed to run mkcert")?;

    if !status.success() {
        anyhow::bail!("mkcert exited with an error");
    }

    println!();
    println!(
        "{} Certificates written to {}",
        "✓".green(),
        certs_dir.display()
    );

    Ok(())
}

/// Build the mkcert argument list.
///
/// When a key already exists it is passed first so mkcert reuses it
/// instead of rotating; otherwise both paths are fresh outputs.
fn mkcert_args(
    cert_file: &Path,
    key_file: &Path,
    reuse_key: bool,
    hosts: &[String],
) -> Vec<String> {
    let cert_arg = cert_file.display().to_string();
    let key_arg = key_file.display().to_string();

    let mut args: Vec<String> = if reuse_key {
        vec![
            "-key-file".to_string(),
            key_arg,
            "-cert-file".to_string(),
            cert_arg,
        ]
    } else {
        vec![
            "-cert-file".to_string(),
            cert_arg,
            "-key-file".to_string(),
            key_arg,
        ]
    };

    args.extend(hosts.iter().cloned());
    args
}
