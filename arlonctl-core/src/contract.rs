//! # contract: collaborator interfaces for arlonctl
//!
//! This module defines the traits through which the core logic talks to the
//! outside world, plus the plain data records those traits exchange. Nothing
//! in here knows about HTTP, kube configs or tokens.
//!
//! ## Interface & Extensibility
//! - [`ApplicationLister`]: label-selector queries against the ArgoCD application API.
//! - [`KubeConnector`]: the Kubernetes "client factory". Constructing a client may fail
//!   (bad kube config), which is why connecting is its own fallible step.
//! - [`SecretLister`] / [`ClusterProbe`]: what a connected Kubernetes client can do for us.
//! - [`ToolLocator`]: finds local executables.
//! - [`ArgoAccountProbe`]: confirms the ArgoCD session token is accepted.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`; mocks are exported behind the
//!   `test-export-mocks` feature (on by default) so the CLI crate's tests can use them.
//!
//! ## Errors
//! - Collaborators return [`BoxError`]; the core wraps it into its own typed errors
//!   (see [`crate::error`]) together with the query that failed.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use mockall::automock;

/// Error type returned by every collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An ArgoCD application, reduced to the metadata arlon keeps on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

impl Application {
    /// Annotation value, or `""` when the key is absent.
    pub fn annotation(&self, key: &str) -> &str {
        self.annotations.get(key).map(String::as_str).unwrap_or("")
    }

    /// Label value, or `""` when the key is absent.
    pub fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A Kubernetes secret holding cluster credentials. `data` is already base64-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSecret {
    pub name: String,
    pub data: BTreeMap<String, Vec<u8>>,
    pub annotations: BTreeMap<String, String>,
}

impl ClusterSecret {
    /// Annotation value, or `""` when the key is absent.
    pub fn annotation(&self, key: &str) -> &str {
        self.annotations.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Lists ArgoCD applications matching a label selector.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ApplicationLister: Send + Sync {
    /// `selector` uses Kubernetes label-selector syntax, e.g. `managed-by=arlon,arlon-type=cluster`.
    async fn list(&self, selector: &str) -> Result<Vec<Application>, BoxError>;
}

/// Lists secrets in a namespace matching a label selector.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SecretLister: Send + Sync {
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<ClusterSecret>, BoxError>;
}

/// Read-only questions about the management cluster, used by `verify`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ClusterProbe: Send + Sync {
    /// Version string reported by the API server (proves it is reachable and we are authorised).
    async fn server_version(&self) -> Result<String, BoxError>;

    /// Names of every API group the server advertises.
    async fn api_groups(&self) -> Result<Vec<String>, BoxError>;

    /// Names of every namespace.
    async fn namespaces(&self) -> Result<Vec<String>, BoxError>;
}

/// Builds Kubernetes clients from whatever configuration the implementor holds.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait KubeConnector: Send + Sync {
    /// A client able to list secrets. Fails when the configuration is unusable.
    async fn connect(&self) -> Result<Box<dyn SecretLister>, BoxError>;

    /// A client able to answer [`ClusterProbe`] questions.
    async fn probe(&self) -> Result<Box<dyn ClusterProbe>, BoxError>;
}

/// Finds an executable by name.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ToolLocator: Send + Sync {
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// Confirms that the ArgoCD API accepts the configured credentials.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArgoAccountProbe: Send + Sync {
    async fn check_session(&self) -> Result<(), BoxError>;
}
