use crate::contract::BoxError;

/// Failure while aggregating the cluster registry. Every variant is fatal:
/// no partial list is returned alongside it.
#[derive(thiserror::Error, Debug)]
pub enum ListError {
    /// The legacy cluster query failed.
    #[error("failed to list argocd applications: {0}")]
    ListApplications(#[source] BoxError),

    /// The next-gen cluster-app query failed.
    #[error("failed to list next-gen clusters: {0}")]
    ListNextGenClusters(#[source] BoxError),

    /// The profile-app lookup for one next-gen cluster failed.
    #[error("failed to list profile apps associated with cluster {cluster}: {source}")]
    ListProfileApps {
        cluster: String,
        #[source]
        source: BoxError,
    },

    /// No Kubernetes client could be built from the configuration.
    #[error("failed to get kube client: {0}")]
    KubeClient(#[source] BoxError),

    /// The external cluster secret query failed.
    #[error("failed to list cluster secrets: {0}")]
    ListClusterSecrets(#[source] BoxError),
}

/// Reason a prerequisite check did not pass.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("kubectl is not installed")]
    KubectlNotInstalled,

    #[error("set the kubeconfig or kubeconfig does not have required access")]
    ClusterInfo,

    #[error("argocd is not installed")]
    ArgoCdNotInstalled,

    #[error("argocd auth token has expired, login to argocd again")]
    ArgoCdAuthToken,

    #[error("git is not installed")]
    GitNotInstalled,

    #[error("arlon is not installed")]
    ArlonNotInstalled,

    #[error("capi services are not installed")]
    CapiNotInstalled,

    #[error("error fetching the capi cloudproviders")]
    CapiCloudProvider,
}
