//! # ArgoCD REST client
//!
//! Implements the core's [`ApplicationLister`] and [`ArgoAccountProbe`] contracts
//! against the ArgoCD API server:
//!
//! - `GET /api/v1/applications?selector=<label selector>` for application queries
//! - `GET /api/v1/account` to confirm the session token is still accepted
//!
//! Authentication is a bearer token (`ARGOCD_AUTH_TOKEN`), the same one the `argocd`
//! CLI uses. Only the metadata of each application (name, annotations, labels) is
//! decoded; arlon keeps everything it needs there.

use std::collections::BTreeMap;
use std::time::Duration;

use arlonctl_core::config::ArgoCdSettings;
use arlonctl_core::contract::{Application, ApplicationLister, ArgoAccountProbe, BoxError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum ArgoCdError {
    #[error("{0} is not set (config file or environment)")]
    MissingSetting(&'static str),

    #[error("invalid ArgoCD server address: {0}")]
    InvalidServer(#[from] url::ParseError),

    #[error("request to ArgoCD failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ArgoCD returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected ArgoCD response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct ArgoCdClient {
    http: reqwest::Client,
    server: Url,
    token: String,
}

impl ArgoCdClient {
    pub fn from_settings(settings: &ArgoCdSettings) -> Result<Self, ArgoCdError> {
        let server = settings
            .server
            .as_deref()
            .ok_or(ArgoCdError::MissingSetting("ARGOCD_SERVER"))?;
        let token = settings
            .auth_token
            .clone()
            .ok_or(ArgoCdError::MissingSetting("ARGOCD_AUTH_TOKEN"))?;
        let server = server_url(server)?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(settings.insecure)
            .build()?;

        tracing::info!(
            server = %server,
            insecure = settings.insecure,
            "Initialized ArgoCD client"
        );
        Ok(ArgoCdClient {
            http,
            server,
            token,
        })
    }

    fn applications_url(&self, selector: &str) -> Result<Url, ArgoCdError> {
        let mut url = self.server.join("api/v1/applications")?;
        url.query_pairs_mut().append_pair("selector", selector);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<String, ArgoCdError> {
        tracing::debug!(url = %url, "ArgoCD GET");
        let resp = self.http.get(url).bearer_auth(&self.token).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::error!(%status, body = %body, "ArgoCD API returned error");
            return Err(ArgoCdError::Status { status, body });
        }
        Ok(body)
    }
}

/// Accepts `host[:port]` as the `argocd` CLI does, defaulting to https, and makes sure
/// the path ends in `/` so API paths join under it.
pub fn server_url(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim();
    let mut url = if raw.contains("://") {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("https://{raw}"))?
    };
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Deserialize)]
struct ApplicationList {
    #[serde(default)]
    items: Option<Vec<ApplicationItem>>,
}

#[derive(Deserialize)]
struct ApplicationItem {
    metadata: ObjectMeta,
}

#[derive(Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: String,
    #[serde(default)]
    annotations: Option<BTreeMap<String, String>>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

/// Decodes an `ApplicationList` response. ArgoCD sends `"items": null` for an empty list.
pub fn parse_application_list(body: &str) -> Result<Vec<Application>, serde_json::Error> {
    let list: ApplicationList = serde_json::from_str(body)?;
    Ok(list
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|item| Application {
            name: item.metadata.name,
            annotations: item.metadata.annotations.unwrap_or_default(),
            labels: item.metadata.labels.unwrap_or_default(),
        })
        .collect())
}

#[async_trait]
impl ApplicationLister for ArgoCdClient {
    async fn list(&self, selector: &str) -> Result<Vec<Application>, BoxError> {
        let url = self.applications_url(selector)?;
        let body = self.get(url).await?;
        let apps = parse_application_list(&body).map_err(ArgoCdError::from)?;
        tracing::info!(selector, count = apps.len(), "Listed ArgoCD applications");
        Ok(apps)
    }
}

#[async_trait]
impl ArgoAccountProbe for ArgoCdClient {
    async fn check_session(&self) -> Result<(), BoxError> {
        let url = self.server.join("api/v1/account")?;
        self.get(url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(server: &str) -> ArgoCdSettings {
        ArgoCdSettings {
            server: Some(server.to_string()),
            auth_token: Some("token".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn server_without_scheme_defaults_to_https() {
        let url = server_url("argocd.example.com:8443").unwrap();
        assert_eq!(url.as_str(), "https://argocd.example.com:8443/");
    }

    #[test]
    fn server_path_prefix_is_kept() {
        let url = server_url("http://gateway.local/argocd").unwrap();
        assert_eq!(
            url.join("api/v1/account").unwrap().as_str(),
            "http://gateway.local/argocd/api/v1/account"
        );
    }

    #[test]
    fn selector_is_query_encoded() {
        let client = ArgoCdClient::from_settings(&settings("https://argocd.example.com")).unwrap();
        let url = client
            .applications_url("managed-by=arlon,arlon-type=profile-app,arlon-cluster=prod-west")
            .unwrap();
        assert_eq!(url.path(), "/api/v1/applications");
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "selector");
        assert_eq!(
            pairs[0].1,
            "managed-by=arlon,arlon-type=profile-app,arlon-cluster=prod-west"
        );
    }

    #[test]
    fn missing_token_is_named() {
        let mut s = settings("https://argocd.example.com");
        s.auth_token = None;
        let err = ArgoCdClient::from_settings(&s).err().unwrap();
        assert!(err.to_string().contains("ARGOCD_AUTH_TOKEN"), "got: {err}");
    }

    #[test]
    fn missing_server_is_named() {
        let s = ArgoCdSettings {
            auth_token: Some("token".to_string()),
            ..Default::default()
        };
        let err = ArgoCdClient::from_settings(&s).err().unwrap();
        assert!(err.to_string().contains("ARGOCD_SERVER"), "got: {err}");
    }

    #[test]
    fn parses_application_metadata() {
        let body = r#"{
            "metadata": {"resourceVersion": "123"},
            "items": [
                {
                    "metadata": {
                        "name": "prod-east",
                        "namespace": "argocd",
                        "annotations": {"arlon.io/clusterspec": "spec-a"},
                        "labels": {"managed-by": "arlon", "arlon-type": "cluster"}
                    },
                    "spec": {"project": "default"},
                    "status": {}
                },
                {"metadata": {"name": "bare"}}
            ]
        }"#;
        let apps = parse_application_list(body).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].name, "prod-east");
        assert_eq!(apps[0].annotation("arlon.io/clusterspec"), "spec-a");
        assert_eq!(apps[0].label("arlon-type"), "cluster");
        assert!(apps[1].annotations.is_empty());
        assert!(apps[1].labels.is_empty());
    }

    #[test]
    fn null_items_is_an_empty_list() {
        assert!(parse_application_list(r#"{"items": null}"#).unwrap().is_empty());
        assert!(parse_application_list(r#"{"metadata": {}}"#).unwrap().is_empty());
    }

    /// Answers one request per queued response and hands back the raw requests.
    async fn serve(
        responses: Vec<(&'static str, &'static str)>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    raw.extend_from_slice(&buf[..n]);
                }
                requests.push(String::from_utf8_lossy(&raw).into_owned());
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        });
        (format!("http://{addr}"), handle)
    }

    fn client_for(server: &str) -> ArgoCdClient {
        let mut s = settings(server);
        s.auth_token = Some("tok".to_string());
        ArgoCdClient::from_settings(&s).unwrap()
    }

    #[tokio::test]
    async fn talks_to_the_api_server_with_bearer_auth() {
        let (server, handle) = serve(vec![
            ("401 Unauthorized", "nope!"),
            ("200 OK", r#"{"items":null}"#),
            ("200 OK", r#"{"username":"admin"}"#),
            ("403 Forbidden", "expired"),
        ])
        .await;
        let client = client_for(&server);

        let err = ApplicationLister::list(&client, "managed-by=arlon,arlon-type=cluster")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ArgoCD returned 401 Unauthorized: nope!");
        let status = err.downcast_ref::<ArgoCdError>().map(|e| match e {
            ArgoCdError::Status { status, .. } => status.as_u16(),
            _ => 0,
        });
        assert_eq!(status, Some(401));

        let apps = ApplicationLister::list(&client, "managed-by=arlon,arlon-type=cluster-app")
            .await
            .unwrap();
        assert!(apps.is_empty());

        client.check_session().await.unwrap();
        let err = client.check_session().await.unwrap_err();
        assert_eq!(err.to_string(), "ArgoCD returned 403 Forbidden: expired");

        let requests = handle.await.unwrap();
        assert_eq!(requests.len(), 4);
        assert!(
            requests[0].starts_with(
                "GET /api/v1/applications?selector=managed-by%3Darlon%2Carlon-type%3Dcluster HTTP/1.1\r\n"
            ),
            "got: {}",
            requests[0]
        );
        assert!(requests[1].starts_with(
            "GET /api/v1/applications?selector=managed-by%3Darlon%2Carlon-type%3Dcluster-app HTTP/1.1\r\n"
        ));
        assert!(requests[2].starts_with("GET /api/v1/account HTTP/1.1\r\n"));
        for request in &requests {
            assert!(
                request.to_ascii_lowercase().contains("\r\nauthorization: bearer tok\r\n"),
                "got: {request}"
            );
        }
    }
}
