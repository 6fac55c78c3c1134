//! Stack configuration
//!
//! Resolves the stack root directory and loads optional overrides from
//! omt.toml at the stack root. Every setting has a default, so a stack
//! without an omt.toml is fully usable.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable overriding the stack root directory
pub const STACK_DIR_ENV: &str = "OMT_STACK_DIR";

const CONFIG_FILE: &str = "omt.toml";

/// Get the stack root directory.
/// Checks OMT_STACK_DIR environment variable first,
/// then defaults to the current directory.
pub fn get_stack_dir() -> Result<PathBuf> {
    if let Ok(custom_dir) = env::var(STACK_DIR_ENV) {
        return Ok(PathBuf::from(custom_dir));
    }

    env::current_dir().context("Failed to get current directory")
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    #[serde(skip)]
    root: PathBuf,

    /// Hostname of the Traefik dashboard, always covered by the certificate
    pub admin_host: String,
    /// Registry prefixed onto image references that do not carry one
    pub default_registry: String,
    /// Container runtime binary used for image pull/inspect
    pub runtime: String,
    /// Per-service directories live here (relative to the stack root)
    pub services_dir: String,
    /// Certificate and key output directory (relative to the stack root)
    pub certs_dir: String,
    /// Service template directory (relative to the stack root)
    pub templates_dir: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            admin_host: "traefik.localhost".to_string(),
            default_registry: "docker.io".to_string(),
            runtime: "podman".to_string(),
            services_dir: "services".to_string(),
            certs_dir: "core/certs".to_string(),
            templates_dir: "templates/service".to_string(),
        }
    }
}

impl StackConfig {
    /// Load the stack configuration for the resolved stack root
    pub fn load() -> Result<Self> {
        let root = get_stack_dir()?;
        Self::load_from(&root)
    }

    /// Load the stack configuration rooted at a specific directory
    pub fn load_from(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context(format!("Failed to read {}", config_path.display()))?;

            toml::from_str(&content)
                .context(format!("Failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        config.root = root.to_path_buf();

        Ok(config)
    }

    pub fn services_path(&self) -> PathBuf {
        self.root.join(&self.services_dir)
    }

    pub fn certs_path(&self) -> PathBuf {
        self.root.join(&self.certs_dir)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.root.join(&self.templates_dir)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();

        let config = StackConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.admin_host, "traefik.localhost");
        assert_eq!(config.default_registry, "docker.io");
        assert_eq!(config.runtime, "podman");
        assert_eq!(config.services_path(), dir.path().join("services"));
        assert_eq!(config.certs_path(), dir.path().join("core/certs"));
        assert_eq!(config.templates_path(), dir.path().join("templates/service"));
    }

    #[test]
    fn test_partial_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("omt.toml"),
            r#"
admin_host = "dashboard.localhost"
runtime = "docker"
"#,
        )
        .unwrap();

        let config = StackConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.admin_host, "dashboard.localhost");
        assert_eq!(config.runtime, "docker");
        // Untouched settings keep their defaults
        assert_eq!(config.default_registry, "docker.io");
        assert_eq!(config.services_path(), dir.path().join("services"));
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("omt.toml"), "admin_host = [not toml").unwrap();

        let result = StackConfig::load_from(dir.path());

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("omt.toml"));
    }
}
