// # dns01d - DNS-01 Solver Daemon
//
// This daemon is a THIN integration layer only:
// - DO NOT add challenge, DNS or retry logic here
// - All solver logic lives in dns01-core
// - Configuration is via environment variables only
//
// The dns01d daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering the Porkbun solver under the configured group name
// 4. Initializing the solvers with the Kubernetes secret store
// 5. Waiting for a shutdown signal
//
// Serving the webhook transport itself is left to the hosting framework.
//
// ## Configuration
//
// - `GROUP_NAME`: API group the solvers are registered under (required)
// - `DNS01_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `DNS01_LOG_FORMAT`: text or json (default: text)
// - `DNS01_PORKBUN_API_BASE`: Porkbun API base URL override (optional)
//
// `RUST_LOG`, when set, takes precedence over `DNS01_LOG_LEVEL`.
//
// ## Example
//
// ```bash
// export GROUP_NAME=acme.example.com
// export DNS01_LOG_FORMAT=json
//
// dns01d
// ```

use anyhow::Result;
use dns01_core::SolverRegistry;
use dns01_provider_porkbun::PorkbunFactory;
use dns01_secrets_kube::KubeSecretStore;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum Dns01ExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<Dns01ExitCode> for ExitCode {
    fn from(code: Dns01ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug)]
struct Config {
    group_name: String,
    log_level: String,
    log_format: LogFormat,
    porkbun_api_base: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from a variable lookup
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let group_name = var("GROUP_NAME").ok_or_else(|| {
            anyhow::anyhow!(
                "GROUP_NAME is required. \
                Set it via: export GROUP_NAME=acme.example.com"
            )
        })?;

        let log_format = match var("DNS01_LOG_FORMAT").as_deref().map(str::to_lowercase) {
            None => LogFormat::Text,
            Some(f) if f == "text" => LogFormat::Text,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => anyhow::bail!(
                "DNS01_LOG_FORMAT '{}' is not valid. Valid formats: text, json",
                other
            ),
        };

        Ok(Self {
            group_name: group_name.trim().to_string(),
            log_level: var("DNS01_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            porkbun_api_base: var("DNS01_PORKBUN_API_BASE").filter(|s| !s.is_empty()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validate_group_name(&self.group_name)?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNS01_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if let Some(ref url) = self.porkbun_api_base {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                anyhow::bail!(
                    "DNS01_PORKBUN_API_BASE must use HTTP or HTTPS scheme. Got: {}",
                    url
                );
            }

            // Credentials travel in the request body
            if url.starts_with("http://") {
                eprintln!(
                    "WARNING: DNS01_PORKBUN_API_BASE uses HTTP (not HTTPS). \
                    API credentials will be sent unencrypted."
                );
            }
        }

        Ok(())
    }

    fn porkbun_factory(&self) -> PorkbunFactory {
        match self.porkbun_api_base {
            Some(ref base) => PorkbunFactory::with_base_url(base),
            None => PorkbunFactory::new(),
        }
    }
}

/// Validate that the group name is a DNS subdomain (RFC 1123)
fn validate_group_name(group: &str) -> Result<()> {
    if group.is_empty() {
        anyhow::bail!("GROUP_NAME cannot be empty");
    }

    if group.len() > 253 {
        anyhow::bail!("GROUP_NAME too long: {} chars (max 253)", group.len());
    }

    for label in group.split('.') {
        if label.is_empty() {
            anyhow::bail!("GROUP_NAME has empty label: '{}'", group);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "GROUP_NAME label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            anyhow::bail!(
                "GROUP_NAME label contains invalid characters. Label: '{}'. \
                Valid: lowercase alphanumeric and hyphen only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "GROUP_NAME label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

/// Install the global tracing subscriber
fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));

    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let result = match config.log_format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Dns01ExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("{}", e);
        return Dns01ExitCode::ConfigError.into();
    }

    info!(group = %config.group_name, "Starting dns01d daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Dns01ExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let registry = match bootstrap(&config).await {
            Ok(registry) => registry,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return Dns01ExitCode::ConfigError;
            }
        };

        match wait_for_shutdown().await {
            Ok(signal) => {
                info!("Received shutdown signal: {}", signal);
                info!(solvers = ?registry.list_solvers(), "Shutting down daemon");
                Dns01ExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Daemon error: {}", e);
                Dns01ExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Register and initialize every solver
async fn bootstrap(config: &Config) -> Result<SolverRegistry> {
    let registry = SolverRegistry::new(config.group_name.clone());

    let factory = config.porkbun_factory();
    if config.porkbun_api_base.is_some() {
        warn!(base_url = factory.base_url(), "Using non-default Porkbun API endpoint");
    }

    info!("Registering Porkbun solver");
    dns01_provider_porkbun::register(&registry, factory)?;

    let secrets = KubeSecretStore::try_default().await?;
    registry.initialize_all(Arc::new(secrets))?;

    info!(
        group = registry.group_name(),
        solvers = ?registry.list_solvers(),
        "Solvers initialized"
    );

    Ok(registry)
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
