//! Service scaffolding
//!
//! Creates a new service directory from templates: a Traefik route
//! config, a compose file, and a README describing the service. Template
//! files at the stack's templates directory take precedence over the
//! built-in defaults.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use regex::Regex;

use crate::{
    config::StackConfig,
    image,
    routes::ROUTE_FILE,
    runtime::ContainerRuntime,
    template,
};

const COMPOSE_FILE: &str = "compose.yml";
const README_FILE: &str = "README.md";

const DEFAULT_ROUTE_TEMPLATE: &str = r#"http:
  routers:
    {{SERVICE_NAME}}:
      rule: Host(`{{SERVICE_NAME}}.localhost`)
      entryPoints:
        - websecure
      tls: {}
      service: {{SERVICE_NAME}}
  services:
    {{SERVICE_NAME}}:
      loadBalancer:
        servers:
          - url: http://{{SERVICE_NAME}}:{{PORT}}
"#;

const DEFAULT_COMPOSE_TEMPLATE: &str = r#"services:
  {{SERVICE_NAME}}:
    image: {{IMAGE}}
    container_name: {{SERVICE_NAME}}
    restart: unless-stopped
    networks:
      - proxy-net

networks:
  proxy-net:
    external: true
"#;

/// Scaffold a new service directory
pub fn new_service(
    stack: &StackConfig,
    runtime: &dyn ContainerRuntime,
    name: &str,
    image_ref: &str,
    explicit_port: Option<u16>,
) -> Result<()> {
    let name = name.to_lowercase();
    validate_name(&name)?;

    let image = image::normalize_image(image_ref, &stack.default_registry);

    let port = match image::resolve_port(runtime, &image, explicit_port) {
        Ok(port) => port,
        Err(err @ image::PortError::Inspect { .. }) => {
            return Err(anyhow::Error::new(err).context(
                "Make sure the image name is correct, e.g. grafana/grafana:latest",
            ));
        }
        Err(err @ image::PortError::Undetected { .. }) => {
            return Err(anyhow::Error::new(err).context(
                "Specify the port explicitly: omt new-service <name> --image <image> --port <port>",
            ));
        }
    };

    let service_dir = stack.services_path().join(&name);
    if service_dir.exists() {
        anyhow::bail!("Service already exists: {}", name);
    }

    let route_template = load_template(&stack.templates_path(), ROUTE_FILE, DEFAULT_ROUTE_TEMPLATE)?;
    let compose_template =
        load_template(&stack.templates_path(), COMPOSE_FILE, DEFAULT_COMPOSE_TEMPLATE)?;

    fs::create_dir_all(&service_dir).context(format!(
        "Failed to create service directory: {}",
        service_dir.display()
    ))?;

    let route = template::render(
        &route_template,
        &[
            ("SERVICE_NAME", name.clone()),
            ("PORT", port.to_string()),
        ],
    );
    fs::write(service_dir.join(ROUTE_FILE), route)
        .context(format!("Failed to write {}", ROUTE_FILE))?;

    let compose = template::render(
        &compose_template,
        &[
            ("SERVICE_NAME", name.clone()),
            ("IMAGE", image.clone()),
        ],
    );
    fs::write(service_dir.join(COMPOSE_FILE), compose)
        .context(format!("Failed to write {}", COMPOSE_FILE))?;

    fs::write(service_dir.join(README_FILE), describe(&name, &image, port))
        .context(format!("Failed to write {}", README_FILE))?;

    println!();
    println!("{} Service '{}' created", "✓".green(), name);
    println!(
        "  Available at: {}",
        format!("https://{}.localhost", name).bright_white()
    );
    println!();
    println!("Next steps:");
    println!("  1. Run {} to refresh certificates", "omt certs".bright_white());
    println!("  2. Restart the stack to pick up the new service");

    Ok(())
}

/// Read a template from the stack, falling back to the built-in default
fn load_template(templates_dir: &Path, file_name: &str, default: &str) -> Result<String> {
    let path = templates_dir.join(file_name);

    if path.is_file() {
        fs::read_to_string(&path).context(format!("Failed to read template: {}", path.display()))
    } else {
        Ok(default.to_string())
    }
}

/// Service names become hostname labels and container names, so only
/// lowercase letters, digits and inner hyphens are accepted
fn validate_name(name: &str) -> Result<()> {
    let re = Regex::new(r"^[a-z0-9][a-z0-9-]*$").unwrap();

    if !re.is_match(name) {
        anyhow::bail!(
            "Invalid service name '{}': use lowercase letters, digits and hyphens",
            name
        );
    }

    Ok(())
}

fn describe(name: &str, image: &str, port: u16) -> String {
    format!(
        "# {}\n\nImage: `{}`\nPort: `{}`\nCreated: {}\n",
        name,
        image,
        port,
        Local::now().format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::TempDir;

    use super::*;

    /// Runtime stub for scaffolding tests
    struct StubRuntime {
        ports: Vec<String>,
    }

    impl ContainerRuntime for StubRuntime {
        fn pull(&self, _image: &str) -> Result<()> {
            Ok(())
        }

        fn exposed_ports(&self, _image: &str) -> Result<Vec<String>> {
            Ok(self.ports.clone())
        }
    }

    fn stack_at(root: &Path) -> StackConfig {
        StackConfig::load_from(root).unwrap()
    }

    #[test]
    fn test_scaffolds_three_files_with_explicit_port() {
        let dir = TempDir::new().unwrap();
        let stack = stack_at(dir.path());
        let runtime = StubRuntime { ports: vec![] };

        new_service(&stack, &runtime, "Cache", "redis", Some(6379)).unwrap();

        let service_dir = dir.path().join("services/cache");
        let route = fs::read_to_string(service_dir.join(ROUTE_FILE)).unwrap();
        let compose = fs::read_to_string(service_dir.join(COMPOSE_FILE)).unwrap();
        let readme = fs::read_to_string(service_dir.join(README_FILE)).unwrap();

        assert!(route.contains("Host(`cache.localhost`)"));
        assert!(route.contains("http://cache:6379"));
        assert!(compose.contains("image: docker.io/redis"));
        assert!(compose.contains("container_name: cache"));
        assert!(readme.contains("Image: `docker.io/redis`"));
        assert!(readme.contains("Port: `6379`"));
    }

    #[test]
    fn test_port_detected_from_image_metadata() {
        let dir = TempDir::new().unwrap();
        let stack = stack_at(dir.path());
        let runtime = StubRuntime {
            ports: vec!["3000/tcp".to_string()],
        };

        new_service(&stack, &runtime, "dash", "grafana/grafana:latest", None).unwrap();

        let route =
            fs::read_to_string(dir.path().join("services/dash").join(ROUTE_FILE)).unwrap();
        assert!(route.contains("http://dash:3000"));
    }

    #[test]
    fn test_existing_service_dir_is_untouched() {
        let dir = TempDir::new().unwrap();
        let stack = stack_at(dir.path());
        let runtime = StubRuntime { ports: vec![] };

        let service_dir = dir.path().join("services/db");
        fs::create_dir_all(&service_dir).unwrap();
        fs::write(service_dir.join("keep.txt"), "precious").unwrap();

        let result = new_service(&stack, &runtime, "db", "postgres", Some(5432));

        assert!(result.is_err());
        assert_eq!(
            fs::read_to_string(service_dir.join("keep.txt")).unwrap(),
            "precious"
        );
        assert!(!service_dir.join(ROUTE_FILE).exists());
    }

    #[test]
    fn test_stack_templates_take_precedence() {
        let dir = TempDir::new().unwrap();
        let stack = stack_at(dir.path());
        let runtime = StubRuntime { ports: vec![] };

        let templates_dir = dir.path().join("templates/service");
        fs::create_dir_all(&templates_dir).unwrap();
        fs::write(
            templates_dir.join(ROUTE_FILE),
            "# custom route for {{SERVICE_NAME}} on {{PORT}}\n",
        )
        .unwrap();

        new_service(&stack, &runtime, "web", "nginx", Some(80)).unwrap();

        let route = fs::read_to_string(dir.path().join("services/web").join(ROUTE_FILE)).unwrap();
        assert_eq!(route, "# custom route for web on 80\n");
    }

    #[test]
    fn test_undetectable_port_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let stack = stack_at(dir.path());
        let runtime = StubRuntime {
            ports: vec!["8080/tcp".to_string(), "9090/tcp".to_string()],
        };

        let result = new_service(&stack, &runtime, "app", "acme/app", None);

        assert!(result.is_err());
        assert!(!dir.path().join("services/app").exists());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("db").is_ok());
        assert!(validate_name("my-app2").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("My App").is_err());
        assert!(validate_name("-app").is_err());
        assert!(validate_name("app_1").is_err());
    }

    #[test]
    fn test_describe_summarizes_image_and_port() {
        let readme = describe("db", "docker.io/postgres", 5432);

        assert!(readme.starts_with("# db\n"));
        assert!(readme.contains("Image: `docker.io/postgres`"));
        assert!(readme.contains("Port: `5432`"));
    }
}
