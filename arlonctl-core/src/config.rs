use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

/// Namespace ArgoCD is installed in, and where its cluster secrets live.
pub const DEFAULT_ARGOCD_NAMESPACE: &str = "argocd";

/// Fully merged settings (file + environment) for one arlonctl invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub argocd: ArgoCdSettings,
    pub kubernetes: KubernetesSettings,
}

impl Settings {
    pub fn trace_loaded(&self) {
        info!(
            argocd_server = self.argocd.server.as_deref().unwrap_or("<unset>"),
            argocd_namespace = %self.argocd.namespace,
            auth_token_set = self.argocd.auth_token.is_some(),
            kubeconfig = ?self.kubernetes.kubeconfig,
            context = ?self.kubernetes.context,
            "Loaded Settings"
        );
        debug!(?self, "Settings loaded (full debug)");
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ArgoCdSettings {
    /// Base URL of the ArgoCD API server, e.g. `https://argocd.example.com`.
    pub server: Option<String>,
    pub auth_token: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    pub namespace: String,
}

impl Default for ArgoCdSettings {
    fn default() -> Self {
        ArgoCdSettings {
            server: None,
            auth_token: None,
            insecure: false,
            namespace: DEFAULT_ARGOCD_NAMESPACE.to_string(),
        }
    }
}

// Keeps the token out of debug logs.
impl fmt::Debug for ArgoCdSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgoCdSettings")
            .field("server", &self.server)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("insecure", &self.insecure)
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Where to find the kube config. Both unset means the usual inference
/// (`KUBECONFIG`, `~/.kube/config`, then in-cluster).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubernetesSettings {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}
