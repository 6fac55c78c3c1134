//! Container image references and port detection
//!
//! This module normalizes image references and resolves the port a
//! service listens on: an explicit override wins, then a single exposed
//! port from image metadata, then a table of well-known defaults.

use std::collections::BTreeSet;

use colored::Colorize;
use thiserror::Error;

use crate::runtime::ContainerRuntime;

/// Fallback ports for common images, consulted only when image metadata
/// does not pin down a single port
const KNOWN_PORTS: &[(&str, u16)] = &[
    ("postgres", 5432),
    ("mysql", 3306),
    ("mariadb", 3306),
    ("redis", 6379),
    ("mongo", 27017),
    ("grafana", 3000),
    ("nginx", 80),
    ("httpd", 80),
];

/// Port resolution failures.
///
/// Runtime failures and undetectable ports surface to the operator the
/// same way, but stay distinct kinds: a caller may want to retry a
/// runtime failure, never an ambiguity.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("failed to inspect image '{image}': {reason}")]
    Inspect { image: String, reason: String },

    #[error("could not auto-detect a port for '{image}'")]
    Undetected { image: String },
}

/// Normalize an image reference by prefixing the default registry.
///
/// A reference already specifies a registry only if it contains a `/`
/// and a `.` within the first path segment. Idempotent.
pub fn normalize_image(image: &str, registry: &str) -> String {
    if let Some((first_segment, _)) = image.split_once('/') {
        if first_segment.contains('.') {
            return image.to_string();
        }
    }

    format!("{}/{}", registry, image)
}

/// Resolve the port a service listens on. First match wins:
/// explicit override, single distinct exposed port, known-image default.
pub fn resolve_port(
    runtime: &dyn ContainerRuntime,
    image: &str,
    explicit: Option<u16>,
) -> Result<u16, PortError> {
    if let Some(port) = explicit {
        return Ok(port);
    }

    println!("{} Detecting service port...", "ℹ".blue());

    let inspect_failure = |err: anyhow::Error| PortError::Inspect {
        image: image.to_string(),
        reason: format!("{:#}", err),
    };

    runtime.pull(image).map_err(inspect_failure)?;
    let declared = runtime.exposed_ports(image).map_err(inspect_failure)?;

    // "8080/tcp" and "8080/udp" are one candidate, not two
    let distinct: BTreeSet<u16> = declared
        .iter()
        .filter_map(|entry| entry.split('/').next()?.parse().ok())
        .collect();

    if distinct.len() == 1 {
        let port = *distinct.iter().next().unwrap();
        println!("{} Detected exposed port: {}", "✓".green(), port);
        return Ok(port);
    }

    if let Some(port) = known_port(image) {
        println!("{} Using known default port: {}", "⚠".yellow(), port);
        return Ok(port);
    }

    Err(PortError::Undetected {
        image: image.to_string(),
    })
}

/// Look up the image's bare name (final path segment, tag stripped) in
/// the known-image table
fn known_port(image: &str) -> Option<u16> {
    let bare = image.rsplit('/').next().unwrap_or(image);
    let bare = bare.split(':').next().unwrap_or(bare);

    KNOWN_PORTS
        .iter()
        .find(|(name, _)| *name == bare)
        .map(|(_, port)| *port)
}
