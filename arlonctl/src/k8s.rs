//! Kubernetes adapter: builds `kube` clients and exposes them through the core's
//! [`KubeConnector`], [`SecretLister`] and [`ClusterProbe`] contracts.

use arlonctl_core::config::KubernetesSettings;
use arlonctl_core::contract::{BoxError, ClusterProbe, ClusterSecret, KubeConnector, SecretLister};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Client factory driven by [`KubernetesSettings`].
pub struct KubeClientFactory {
    settings: KubernetesSettings,
}

impl KubeClientFactory {
    pub fn new(settings: KubernetesSettings) -> Self {
        Self { settings }
    }

    /// Resolves the kubeconfig: an explicit file (optionally at a named context), the
    /// default kubeconfig at a named context, or in-cluster/default inference.
    pub(crate) async fn config(&self) -> Result<Config, BoxError> {
        let options = KubeConfigOptions {
            context: self.settings.context.clone(),
            ..Default::default()
        };
        let config = match (&self.settings.kubeconfig, &self.settings.context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path)?;
                Config::from_custom_kubeconfig(kubeconfig, &options).await?
            }
            (None, Some(_)) => Config::from_kubeconfig(&options).await?,
            (None, None) => Config::infer().await?,
        };
        tracing::debug!(cluster_url = %config.cluster_url, "Resolved Kubernetes config");
        Ok(config)
    }

    async fn client(&self) -> Result<Client, BoxError> {
        Ok(Client::try_from(self.config().await?)?)
    }
}

#[async_trait]
impl KubeConnector for KubeClientFactory {
    async fn connect(&self) -> Result<Box<dyn SecretLister>, BoxError> {
        Ok(Box::new(KubeApi::new(self.client().await?)))
    }

    async fn probe(&self) -> Result<Box<dyn ClusterProbe>, BoxError> {
        Ok(Box::new(KubeApi::new(self.client().await?)))
    }
}

/// A connected client.
pub struct KubeApi {
    client: Client,
}

impl KubeApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub fn cluster_secret(secret: Secret) -> ClusterSecret {
    ClusterSecret {
        name: secret.metadata.name.unwrap_or_default(),
        data: secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, value.0))
            .collect(),
        annotations: secret.metadata.annotations.unwrap_or_default(),
    }
}

#[async_trait]
impl SecretLister for KubeApi {
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<ClusterSecret>, BoxError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secrets = api.list(&ListParams::default().labels(selector)).await?;
        tracing::info!(
            namespace,
            selector,
            count = secrets.items.len(),
            "Listed secrets"
        );
        Ok(secrets.items.into_iter().map(cluster_secret).collect())
    }
}

#[async_trait]
impl ClusterProbe for KubeApi {
    async fn server_version(&self) -> Result<String, BoxError> {
        let info = self.client.apiserver_version().await?;
        Ok(info.git_version)
    }

    async fn api_groups(&self) -> Result<Vec<String>, BoxError> {
        let groups = self.client.list_api_groups().await?;
        Ok(groups.groups.into_iter().map(|g| g.name).collect())
    }

    async fn namespaces(&self) -> Result<Vec<String>, BoxError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api.list(&ListParams::default()).await?;
        Ok(namespaces
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }
}
