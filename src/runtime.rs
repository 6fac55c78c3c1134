//! Thin wrappers around external tools
//!
//! Image pull/inspect shells out to the configured container runtime
//! (podman by default). All invocations block until the tool completes.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Access to container image metadata
pub trait ContainerRuntime {
    /// Make the image's metadata available locally
    fn pull(&self, image: &str) -> Result<()>;

    /// Exposed-port declarations from image metadata, e.g. `"3000/tcp"`
    fn exposed_ports(&self, image: &str) -> Result<Vec<String>>;
}

/// Container runtime backed by a podman-compatible CLI
pub struct PodmanRuntime {
    binary: String,
}

impl PodmanRuntime {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }
}

impl ContainerRuntime for PodmanRuntime {
    fn pull(&self, image: &str) -> Result<()> {
        let status = Command::new(&self.binary)
            .args(["pull", "--quiet", image])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .context(format!("Failed to run {} pull", self.binary))?;

        if !status.success() {
            anyhow::bail!("{} pull failed for image '{}'", self.binary, image);
        }

        Ok(())
    }

    fn exposed_ports(&self, image: &str) -> Result<Vec<String>> {
        let output = Command::new(&self.binary)
            .args(["inspect", image])
            .output()
            .context(format!("Failed to run {} inspect", self.binary))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} inspect failed for image '{}': {}",
                self.binary,
                image,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)
            .context("Failed to parse image metadata JSON")?;

        // Inspect output is an array of one object; images without
        // exposed-port declarations simply omit the map.
        let exposed = metadata
            .get(0)
            .and_then(|v| v.get("Config"))
            .and_then(|v| v.get("ExposedPorts"))
            .and_then(|v| v.as_object());

        Ok(exposed
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default())
    }
}

/// Fail if a required external command is not available
pub fn ensure_tool(binary: &str) -> Result<()> {
    let available = Command::new(binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false);

    if !available {
        anyhow::bail!("Required command not found: {}", binary);
    }

    Ok(())
}
