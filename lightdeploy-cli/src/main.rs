use anyhow::{Context, Result};
use clap::Parser;
use lightdeploy_config::{ConfigLoader, LogDestination, LoggingConfig, ServerConfig};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands, OutputFormat};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let loader = ConfigLoader::with_prefix(&cli.env_prefix);

    match cli.command {
        Commands::Check { config } => {
            let resolved = load(&loader, &config)?;
            info!("Configuration {} is valid", config.display());
            print!("{}", summarize(&resolved));
        }
        Commands::Show { config, format } => {
            let resolved = load(&loader, &config)?;
            let rendered = match format {
                OutputFormat::Yaml => serde_yaml::to_string(&resolved)
                    .context("Failed to render configuration as YAML")?,
                OutputFormat::Json => serde_json::to_string_pretty(&resolved)
                    .context("Failed to render configuration as JSON")?,
            };
            println!("{}", rendered.trim_end());
        }
        Commands::Sample => {
            print!("{}", ServerConfig::generate_sample());
        }
    }

    Ok(())
}

fn load(loader: &ConfigLoader, path: &Path) -> Result<ServerConfig> {
    debug!("Resolving configuration from {}", path.display());
    loader
        .from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Human readable overview of what the server will start
fn summarize(config: &ServerConfig) -> String {
    let admin = config
        .admin_port()
        .map_or_else(|| "disabled".to_string(), |p| p.to_string());

    let tls = match config.ssl() {
        None => "disabled".to_string(),
        Some(ssl) if config.is_mixed_mode() => {
            format!("separate listener on {}", ssl.port.unwrap_or_default())
        }
        Some(_) => format!("shared with port {}", config.port()),
    };

    let jmx = config.jmx().map_or_else(
        || "disabled".to_string(),
        |jmx| format!("registry {}, server {}", jmx.registry_port, jmx.server_port),
    );

    let rows = [
        ("http port", config.port().to_string()),
        ("admin port", admin),
        (
            "worker threads",
            format!("{}..={}", config.min_threads(), config.max_threads()),
        ),
        ("tls", tls),
        ("server log", channel(config.server_log())),
        ("request log", channel(config.request_log())),
        ("jmx", jmx),
        ("work dir", config.work_dir().display().to_string()),
    ];

    rows.iter()
        .map(|(label, value)| format!("{:<17}{}\n", format!("{}:", label), value))
        .collect()
}

fn channel(log: Option<&LoggingConfig>) -> String {
    match log {
        None => "disabled".to_string(),
        Some(log) => match log.destination() {
            LogDestination::Console => format!("{} to console", log.level),
            LogDestination::File(path) => format!("{} to {}", log.level, path.display()),
        },
    }
}

/// Initialize tracing with an explicit level, `RUST_LOG`, or `info`
fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", level);
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_summarize_mixed_mode() {
        let config = ConfigLoader::with_prefix("LDCLITEST")
            .from_yaml_str(
                "http:\n  port: 8080\n  ssl:\n    port: 8443\n  requestLog:\n    currentLogFilename: /var/log/request.log\njmx:\n  registryPort: 9000\n  serverPort: 9001\nworkDir: /srv/app\n",
            )
            .unwrap();

        let summary = summarize(&config);
        assert!(summary.contains("http port:       8080"));
        assert!(summary.contains("admin port:      disabled"));
        assert!(summary.contains("separate listener on 8443"));
        assert!(summary.contains("server log:      disabled"));
        assert!(summary.contains("info to /var/log/request.log"));
        assert!(summary.contains("registry 9000, server 9001"));
        assert!(summary.contains("work dir:        /srv/app"));
    }

    #[test]
    fn test_summarize_shared_tls() {
        let config = ConfigLoader::with_prefix("LDCLITEST")
            .from_yaml_str("http:\n  port: 8443\n  ssl:\n    keyStorePath: k.jks\nlogging:\n  level: warn\n")
            .unwrap();

        let summary = summarize(&config);
        assert!(summary.contains("shared with port 8443"));
        assert!(summary.contains("warn to console"));
        assert_eq!(summary.lines().count(), 8);
        assert!(summary.lines().all(|line| line.len() > 17 && line.as_bytes()[16] == b' '));
    }

    #[test]
    fn test_load_adds_path_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"jmx:\n  registryPort: 9000\n")
            .unwrap();

        let err = load(&ConfigLoader::with_prefix("LDCLITEST"), &path).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("broken.yml"));
        assert!(message.contains("Missing required section 'http'"));
    }
}
