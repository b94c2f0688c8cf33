//! Well-known arlon metadata keys and the label selectors built from them.
//!
//! These strings are shared with the arlon controllers and the ArgoCD cluster
//! secret format; they must match exactly.

pub const CLUSTER_SPEC_ANNOTATION: &str = "arlon.io/clusterspec";
pub const PROFILE_ANNOTATION: &str = "arlon.io/profile";

pub const BASE_CLUSTER_NAME_ANNOTATION: &str = "arlon.io/basecluster-name";
pub const BASE_CLUSTER_REPO_URL_ANNOTATION: &str = "arlon.io/basecluster-repo-url";
pub const BASE_CLUSTER_REPO_REVISION_ANNOTATION: &str = "arlon.io/basecluster-repo-revision";
pub const BASE_CLUSTER_REPO_PATH_ANNOTATION: &str = "arlon.io/basecluster-repo-path";

pub const MANAGED_BY_LABEL: &str = "managed-by";
pub const MANAGED_BY_ARLON: &str = "arlon";
pub const ARLON_TYPE_LABEL: &str = "arlon-type";
pub const ARLON_CLUSTER_LABEL: &str = "arlon-cluster";
pub const ARLON_PROFILE_LABEL: &str = "arlon-profile";

pub const ARGO_SECRET_TYPE_LABEL: &str = "argocd.argoproj.io/secret-type";

/// Secret data field carrying the external cluster's name.
pub const SECRET_NAME_FIELD: &str = "name";

/// Values of the `arlon-type` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArlonType {
    Cluster,
    ClusterApp,
    ProfileApp,
    External,
}

impl ArlonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArlonType::Cluster => "cluster",
            ArlonType::ClusterApp => "cluster-app",
            ArlonType::ProfileApp => "profile-app",
            ArlonType::External => "external",
        }
    }
}

/// `managed-by=arlon,arlon-type=<kind>`
pub fn managed(kind: ArlonType) -> String {
    format!(
        "{MANAGED_BY_LABEL}={MANAGED_BY_ARLON},{ARLON_TYPE_LABEL}={}",
        kind.as_str()
    )
}

/// Profile apps bound to one cluster.
pub fn profile_apps_for(cluster: &str) -> String {
    format!(
        "{},{ARLON_CLUSTER_LABEL}={cluster}",
        managed(ArlonType::ProfileApp)
    )
}

/// ArgoCD cluster secrets that arlon registered as external clusters. Both
/// requirements must hold (comma means AND in selector syntax).
pub fn external_cluster_secrets() -> String {
    format!(
        "{ARGO_SECRET_TYPE_LABEL}=cluster,{ARLON_TYPE_LABEL}={}",
        ArlonType::External.as_str()
    )
}
