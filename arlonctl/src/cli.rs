///
/// This module implements the CLI interface for arlonctl: command parsing, wiring of the
/// concrete ArgoCD/Kubernetes clients into the core logic, and user-visible output.
///
/// All domain logic (cluster aggregation, prerequisite checks) lives in the
/// [`arlonctl-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: run the `arlonctl` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`arlonctl-core`]: ../../arlonctl-core/
use crate::argocd::ArgoCdClient;
use crate::k8s::KubeClientFactory;
use crate::load_config::load_config;
use crate::locate::PathLocator;
use crate::render;
use anyhow::{Context, Result};
use arlonctl_core::cluster;
use arlonctl_core::config::Settings;
use arlonctl_core::verify::{verify, VerifyReport};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI for arlonctl: check prerequisites and inspect Arlon-managed clusters.
#[derive(Parser)]
#[clap(
    name = "arlonctl",
    version,
    about = "Command-line helper for Arlon: verify prerequisites and list managed clusters"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify if required kubectl, argocd and git access is present before profiles and bundles are created
    Verify {
        /// Exit with an error when any check fails
        #[clap(long)]
        strict: bool,
    },
    /// Work with clusters
    Cluster {
        #[clap(subcommand)]
        command: ClusterCommands,
    },
}

#[derive(Subcommand)]
pub enum ClusterCommands {
    /// List legacy, next-gen and external clusters
    List {
        /// Output format
        #[clap(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Verify { strict } => {
            tracing::info!(command = "verify", "Verifying prerequisites");
            let report = verify_prerequisites(&settings).await;
            print!("{}", render::verify_report(&report));
            if strict && !report.all_passed() {
                anyhow::bail!("prerequisite verification failed");
            }
            Ok(())
        }
        Commands::Cluster {
            command: ClusterCommands::List { output },
        } => {
            tracing::info!(command = "cluster list", "Listing clusters");
            let argocd = ArgoCdClient::from_settings(&settings.argocd)
                .context("Failed to set up ArgoCD client")?;
            let kube = KubeClientFactory::new(settings.kubernetes.clone());
            let clusters = cluster::list(&argocd, &kube, &settings.argocd.namespace)
                .await
                .map_err(|e| {
                    tracing::error!(command = "cluster list", error = %e, "Listing failed");
                    e
                })?;
            match output {
                OutputFormat::Table => println!("{}", render::cluster_table(&clusters)),
                OutputFormat::Json => println!("{}", render::cluster_json(&clusters)?),
            }
            Ok(())
        }
    }
}

async fn verify_prerequisites(settings: &Settings) -> VerifyReport {
    let argocd = match ArgoCdClient::from_settings(&settings.argocd) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(error = %e, "ArgoCD client unavailable, session check will fail");
            None
        }
    };
    let kube = KubeClientFactory::new(settings.kubernetes.clone());
    verify(&PathLocator, &kube, argocd.as_ref()).await
}
