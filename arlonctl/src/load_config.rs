/// `load_config` module: merges the optional YAML config file with the environment into
/// the core's [`Settings`].
///
/// This module is the only place where user-supplied YAML is parsed.
///
/// # Responsibilities
/// - Parse the config file (if one is given) into the file-side types below
/// - Overlay environment variables: `ARGOCD_SERVER`, `ARGOCD_AUTH_TOKEN`,
///   `ARLON_ARGOCD_NAMESPACE`
/// - Keep secrets out of the file: the ArgoCD token is only ever read from the environment
///
/// Values that are still missing after the merge (server, token) are not an error here;
/// the commands that need them fail when building their client. `verify` can still run
/// its local checks without them.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use arlonctl_core::config::{ArgoCdSettings, KubernetesSettings, Settings, DEFAULT_ARGOCD_NAMESPACE};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const ENV_ARGOCD_SERVER: &str = "ARGOCD_SERVER";
pub const ENV_ARGOCD_AUTH_TOKEN: &str = "ARGOCD_AUTH_TOKEN";
pub const ENV_ARGOCD_NAMESPACE: &str = "ARLON_ARGOCD_NAMESPACE";

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub argocd: ArgoCdSection,
    #[serde(default)]
    pub kubernetes: KubernetesSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArgoCdSection {
    pub server: Option<String>,
    #[serde(default)]
    pub insecure: bool,
    pub namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KubernetesSection {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

/// Loads the config file (when given) and overlays the environment.
pub fn load_config(path: Option<&Path>) -> Result<Settings> {
    let file = match path {
        Some(path) => read_file_config(path)?,
        None => {
            info!("No config file given, using environment and defaults");
            FileConfig::default()
        }
    };

    let settings = Settings {
        argocd: ArgoCdSettings {
            server: env_var(ENV_ARGOCD_SERVER).or(file.argocd.server),
            auth_token: env_var(ENV_ARGOCD_AUTH_TOKEN),
            insecure: file.argocd.insecure,
            namespace: env_var(ENV_ARGOCD_NAMESPACE)
                .or(file.argocd.namespace)
                .unwrap_or_else(|| DEFAULT_ARGOCD_NAMESPACE.to_string()),
        },
        kubernetes: KubernetesSettings {
            kubeconfig: file.kubernetes.kubeconfig,
            context: file.kubernetes.context,
        },
    };
    settings.trace_loaded();
    Ok(settings)
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = fs::read_to_string(path)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {path:?}"))?;

    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Unset and empty are the same thing.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
