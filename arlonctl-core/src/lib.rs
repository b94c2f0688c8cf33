#![doc = "arlonctl-core: core logic library for arlonctl."]

//! This crate contains the domain types, the collaborator contracts and the
//! logic behind `arlonctl`: the cluster registry aggregator and the
//! prerequisite verifier. Transport code (ArgoCD REST, Kubernetes API) is not
//! included here; it lives in the `arlonctl` binary crate and plugs in through
//! the traits in [`contract`].
//!
//! # Usage
//! Depend on this crate for anything that needs the cluster model or wants to
//! drive the aggregation/verification against its own (or mocked) clients.

pub mod cluster;
pub mod config;
pub mod contract;
pub mod error;
pub mod verify;
