//! Cluster registry: one uniform view of every cluster arlon knows about.
//!
//! Arlon records clusters in three unrelated places:
//!   - legacy clusters: ArgoCD applications labelled `arlon-type=cluster`, with the
//!     clusterspec and profile kept in annotations
//!   - next-gen clusters: ArgoCD applications labelled `arlon-type=cluster-app`, whose
//!     base cluster lives in annotations and whose profile is found through a separate
//!     `profile-app` application
//!   - external clusters: ArgoCD cluster secrets carrying the `arlon-type=external` label
//!
//! [`list`] queries the three sources one after the other and concatenates the results
//! in that order.
//!
//! # Error Handling
//! Any failed query aborts the listing with a [`ListError`] naming the query; records
//! collected so far are dropped. The only non-fatal case is an external secret without
//! a `name` data field, which is skipped.

pub mod selector;

use serde::Serialize;
use tracing::{debug, info};

use crate::contract::{Application, ApplicationLister, ClusterSecret, KubeConnector};
use crate::error::ListError;
use selector::{
    ArlonType, ARLON_PROFILE_LABEL, BASE_CLUSTER_NAME_ANNOTATION,
    BASE_CLUSTER_REPO_PATH_ANNOTATION, BASE_CLUSTER_REPO_REVISION_ANNOTATION,
    BASE_CLUSTER_REPO_URL_ANNOTATION, CLUSTER_SPEC_ANNOTATION, PROFILE_ANNOTATION,
    SECRET_NAME_FIELD,
};

/// A cluster as reported by `arlonctl cluster list`.
///
/// Empty strings mean "not set". Exactly one source produced each record, so at most
/// one of `cluster_spec_name`, `base_cluster` and `is_external` carries information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub name: String,
    pub cluster_spec_name: String,
    pub profile_name: String,
    pub base_cluster: Option<BaseClusterInfo>,
    pub is_external: bool,
    pub secret_name: String,
}

/// Template a next-gen cluster was created from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BaseClusterInfo {
    pub name: String,
    pub repo_url: String,
    pub repo_revision: String,
    pub repo_path: String,
}

/// Which source a [`Cluster`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterKind {
    Legacy,
    NextGen,
    External,
}

impl ClusterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterKind::Legacy => "legacy",
            ClusterKind::NextGen => "next-gen",
            ClusterKind::External => "external",
        }
    }
}

impl Cluster {
    pub fn kind(&self) -> ClusterKind {
        if self.is_external {
            ClusterKind::External
        } else if self.base_cluster.is_some() {
            ClusterKind::NextGen
        } else {
            ClusterKind::Legacy
        }
    }

    fn from_legacy_app(app: &Application) -> Self {
        Cluster {
            name: app.name.clone(),
            cluster_spec_name: app.annotation(CLUSTER_SPEC_ANNOTATION).to_string(),
            profile_name: app.annotation(PROFILE_ANNOTATION).to_string(),
            ..Default::default()
        }
    }

    fn from_cluster_app(app: &Application, profile_name: String) -> Self {
        Cluster {
            name: app.name.clone(),
            profile_name,
            base_cluster: Some(BaseClusterInfo {
                name: app.annotation(BASE_CLUSTER_NAME_ANNOTATION).to_string(),
                repo_url: app.annotation(BASE_CLUSTER_REPO_URL_ANNOTATION).to_string(),
                repo_revision: app.annotation(BASE_CLUSTER_REPO_REVISION_ANNOTATION).to_string(),
                repo_path: app.annotation(BASE_CLUSTER_REPO_PATH_ANNOTATION).to_string(),
            }),
            ..Default::default()
        }
    }

    /// `None` when the secret has no `name` data field.
    fn from_external_secret(secret: &ClusterSecret) -> Option<Self> {
        let name = secret.data.get(SECRET_NAME_FIELD)?;
        Some(Cluster {
            name: String::from_utf8_lossy(name).into_owned(),
            profile_name: secret.annotation(PROFILE_ANNOTATION).to_string(),
            is_external: true,
            secret_name: secret.name.clone(),
            ..Default::default()
        })
    }
}

/// Lists every cluster known to arlon.
///
/// `secrets_namespace` is the namespace holding ArgoCD cluster secrets (usually `argocd`);
/// it is passed through as is.
///
/// Queries run sequentially: legacy apps, cluster apps (plus one profile-app lookup per
/// cluster app), then external cluster secrets.
pub async fn list<A, K>(
    apps: &A,
    kube: &K,
    secrets_namespace: &str,
) -> Result<Vec<Cluster>, ListError>
where
    A: ApplicationLister + ?Sized,
    K: KubeConnector + ?Sized,
{
    let mut clusters = Vec::new();

    let legacy = apps
        .list(&selector::managed(ArlonType::Cluster))
        .await
        .map_err(ListError::ListApplications)?;
    info!(count = legacy.len(), "[LIST] Found legacy clusters");
    clusters.extend(legacy.iter().map(Cluster::from_legacy_app));

    let cluster_apps = apps
        .list(&selector::managed(ArlonType::ClusterApp))
        .await
        .map_err(ListError::ListNextGenClusters)?;
    info!(count = cluster_apps.len(), "[LIST] Found next-gen clusters");
    for app in &cluster_apps {
        let profile_apps = apps
            .list(&selector::profile_apps_for(&app.name))
            .await
            .map_err(|source| ListError::ListProfileApps {
                cluster: app.name.clone(),
                source,
            })?;
        // Several profile apps may target the same cluster; only the first is reported.
        let profile_name = profile_apps
            .first()
            .map(|p| p.label(ARLON_PROFILE_LABEL).to_string())
            .unwrap_or_default();
        debug!(
            cluster = %app.name,
            profile_apps = profile_apps.len(),
            profile = %profile_name,
            "[LIST] Resolved profile for next-gen cluster"
        );
        clusters.push(Cluster::from_cluster_app(app, profile_name));
    }

    let secrets_api = kube.connect().await.map_err(ListError::KubeClient)?;
    let secrets = secrets_api
        .list(secrets_namespace, &selector::external_cluster_secrets())
        .await
        .map_err(ListError::ListClusterSecrets)?;
    info!(
        count = secrets.len(),
        namespace = secrets_namespace,
        "[LIST] Found external cluster secrets"
    );
    for secret in &secrets {
        match Cluster::from_external_secret(secret) {
            Some(cluster) => clusters.push(cluster),
            None => debug!(
                secret_name = %secret.name,
                "cluster secret skipped because missing cluster name"
            ),
        }
    }

    Ok(clusters)
}
