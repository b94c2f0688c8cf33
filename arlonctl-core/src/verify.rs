//! Prerequisite verification for `arlonctl verify`.
//!
//! Checks that the local tools arlon relies on are installed and that the management
//! cluster has arlon and Cluster API (CAPI) deployed. Every check runs regardless of
//! the outcome of the previous ones; the caller gets one [`CheckOutcome`] per
//! [`Requirement`], in a fixed order.
//!
//! Cluster-side checks go through the Kubernetes API ([`ClusterProbe`]) and the ArgoCD
//! API ([`ArgoAccountProbe`]) rather than through the `kubectl`/`argocd` binaries.

use std::fmt;

use tracing::{debug, info, warn};

use crate::contract::{ArgoAccountProbe, BoxError, ClusterProbe, KubeConnector, ToolLocator};
use crate::error::VerifyError;

pub const CAPI_INFRASTRUCTURE_GROUP: &str = "infrastructure.cluster.x-k8s.io";
pub const CAPA_NAMESPACE: &str = "capa-system";
pub const CAPZ_NAMESPACE: &str = "capz-system";
/// Any namespace whose name contains this marks an arlon installation.
pub const ARLON_NAMESPACE_MARKER: &str = "arlon";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Kubectl,
    ArgoCd,
    Git,
    Capi,
    Arlon,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Kubectl => "kubectl",
            Requirement::ArgoCd => "argocd",
            Requirement::Git => "git",
            Requirement::Capi => "capi",
            Requirement::Arlon => "arlon",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub requirement: Requirement,
    pub result: Result<(), VerifyError>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl VerifyReport {
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }

    pub fn outcome(&self, requirement: Requirement) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.requirement == requirement)
    }
}

/// Runs every prerequisite check.
///
/// `argocd` is `None` when no ArgoCD client could be configured (no server or token);
/// the ArgoCD check then reports [`VerifyError::ArgoCdAuthToken`] once the binary is found.
pub async fn verify<L, K, A>(locator: &L, kube: &K, argocd: Option<&A>) -> VerifyReport
where
    L: ToolLocator + ?Sized,
    K: KubeConnector + ?Sized,
    A: ArgoAccountProbe + ?Sized,
{
    let probe = kube.probe().await;
    if let Err(e) = &probe {
        warn!(error = %e, "[VERIFY] Could not build a Kubernetes client");
    }
    let probe = probe.as_deref().ok();

    let checks = [
        (Requirement::Kubectl, check_kubectl(locator, probe).await),
        (Requirement::ArgoCd, check_argocd(locator, argocd).await),
        (Requirement::Git, check_git(locator)),
        (Requirement::Capi, check_capi(probe).await),
        (Requirement::Arlon, check_arlon(probe).await),
    ];

    let outcomes = checks
        .into_iter()
        .map(|(requirement, result)| {
            match &result {
                Ok(()) => info!(%requirement, "[VERIFY] Check passed"),
                Err(e) => info!(%requirement, error = %e, "[VERIFY] Check failed"),
            }
            CheckOutcome {
                requirement,
                result,
            }
        })
        .collect();

    VerifyReport { outcomes }
}

fn require_tool<L>(locator: &L, tool: &str, missing: VerifyError) -> Result<(), VerifyError>
where
    L: ToolLocator + ?Sized,
{
    match locator.locate(tool) {
        Some(path) => {
            debug!(tool, path = %path.display(), "[VERIFY] Found tool");
            Ok(())
        }
        None => Err(missing),
    }
}

async fn check_kubectl<L>(locator: &L, probe: Option<&dyn ClusterProbe>) -> Result<(), VerifyError>
where
    L: ToolLocator + ?Sized,
{
    require_tool(locator, "kubectl", VerifyError::KubectlNotInstalled)?;
    let probe = probe.ok_or(VerifyError::ClusterInfo)?;
    let version = probe
        .server_version()
        .await
        .map_err(|e| probe_failed(e, VerifyError::ClusterInfo))?;
    debug!(%version, "[VERIFY] API server reachable");
    Ok(())
}

async fn check_argocd<L, A>(locator: &L, argocd: Option<&A>) -> Result<(), VerifyError>
where
    L: ToolLocator + ?Sized,
    A: ArgoAccountProbe + ?Sized,
{
    require_tool(locator, "argocd", VerifyError::ArgoCdNotInstalled)?;
    let argocd = argocd.ok_or(VerifyError::ArgoCdAuthToken)?;
    argocd
        .check_session()
        .await
        .map_err(|e| probe_failed(e, VerifyError::ArgoCdAuthToken))
}

fn check_git<L>(locator: &L) -> Result<(), VerifyError>
where
    L: ToolLocator + ?Sized,
{
    require_tool(locator, "git", VerifyError::GitNotInstalled)
}

async fn check_capi(probe: Option<&dyn ClusterProbe>) -> Result<(), VerifyError> {
    let probe = probe.ok_or(VerifyError::CapiNotInstalled)?;
    let groups = probe
        .api_groups()
        .await
        .map_err(|e| probe_failed(e, VerifyError::CapiNotInstalled))?;
    // Exact group match. Grepping `kubectl api-versions` also accepted any group containing it.
    if !groups.iter().any(|g| g == CAPI_INFRASTRUCTURE_GROUP) {
        return Err(VerifyError::CapiNotInstalled);
    }

    // One infrastructure provider is enough: AWS first, then Azure.
    let namespaces = probe
        .namespaces()
        .await
        .map_err(|e| probe_failed(e, VerifyError::CapiCloudProvider))?;
    if namespaces
        .iter()
        .any(|ns| ns == CAPA_NAMESPACE || ns == CAPZ_NAMESPACE)
    {
        Ok(())
    } else {
        Err(VerifyError::CapiCloudProvider)
    }
}

async fn check_arlon(probe: Option<&dyn ClusterProbe>) -> Result<(), VerifyError> {
    let probe = probe.ok_or(VerifyError::ArlonNotInstalled)?;
    let namespaces = probe
        .namespaces()
        .await
        .map_err(|e| probe_failed(e, VerifyError::ArlonNotInstalled))?;
    if namespaces.iter().any(|ns| ns.contains(ARLON_NAMESPACE_MARKER)) {
        Ok(())
    } else {
        Err(VerifyError::ArlonNotInstalled)
    }
}

fn probe_failed(e: BoxError, reported: VerifyError) -> VerifyError {
    debug!(error = %e, reported = %reported, "[VERIFY] Probe call failed");
    reported
}
