//! Service route discovery
//!
//! This module walks the per-service route configurations and collects
//! the hostnames Traefik routes to. The resulting host set drives
//! certificate generation.

use std::{
    collections::BTreeSet,
    fs,
    path::Path,
};

use anyhow::{Context, Result};
use colored::Colorize;
use serde_yaml::Value;

use crate::config::StackConfig;

/// Route configuration file name inside each service directory
pub const ROUTE_FILE: &str = "route.yml";

/// Collect all routed hostnames across the stack's service directories.
///
/// The administrative hostname is always included, and the result is
/// deduplicated and sorted.
pub fn extract_hosts(stack: &StackConfig) -> Result<Vec<String>> {
    let mut hosts = BTreeSet::new();

    let services_dir = stack.services_path();
    if services_dir.is_dir() {
        let entries = fs::read_dir(&services_dir).context(format!(
            "Failed to read services directory: {}",
            services_dir.display()
        ))?;

        for entry in entries {
            let entry = entry?;
            let dir_name = entry.file_name().to_string_lossy().to_string();

            // Hidden/template directories (e.g. .template) are not services
            if dir_name.starts_with('.') {
                continue;
            }

            let route_path = entry.path().join(ROUTE_FILE);
            if !route_path.is_file() {
                continue;
            }

            collect_route_hosts(&route_path, &mut hosts)?;
        }
    }

    // The Traefik dashboard is routed regardless of service configuration
    hosts.insert(stack.admin_host.clone());

    Ok(hosts.into_iter().collect())
}

/// Parse a single route configuration and add its hostnames to the set
fn collect_route_hosts(path: &Path, hosts: &mut BTreeSet<String>) -> Result<()> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read route config: {}", path.display()))?;

    // Unrendered template artifacts are not real route configs
    if content.contains("{{") || content.contains("}}") {
        return Ok(());
    }

    let data: Value = serde_yaml::from_str(&content)
        .context(format!("Failed to parse route config: {}", path.display()))?;

    let routers = data
        .get("http")
        .and_then(|v| v.get("routers"))
        .and_then(|v| v.as_mapping());

    let Some(routers) = routers else {
        return Ok(());
    };

    for (_, router) in routers {
        let rule = router.get("rule").and_then(|v| v.as_str()).unwrap_or("");

        if let Some(host) = host_from_rule(rule) {
            hosts.insert(host);
        }
    }

    Ok(())
}

/// Extract the hostname from a Traefik router rule.
///
/// Takes the text between `Host(` and the first `)` after it, with the
/// surrounding backtick or quote characters stripped. Rules without a
/// Host clause yield nothing. Extracted strings are not validated as
/// hostnames.
fn host_from_rule(rule: &str) -> Option<String> {
    let (_, rest) = rule.split_once("Host(")?;
    let inner = rest.split(')').next().unwrap_or("");

    Some(
        inner
            .trim_matches(|c| c == '`' || c == '\'')
            .to_string(),
    )
}

/// Print the hostnames the certificate workflow would cover
pub fn list_hosts(stack: &StackConfig) -> Result<()> {
    let hosts = extract_hosts(stack)?;

    println!("{}", "Routed hostnames:".blue());
    for host in &hosts {
        println!("  - {}", host);
    }

    Ok(())
}
