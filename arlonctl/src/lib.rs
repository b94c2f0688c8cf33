pub mod argocd;
pub mod cli;
pub mod k8s;
pub mod load_config;
pub mod locate;
pub mod render;

pub use cli::{run, Cli, Commands};
