use std::path::PathBuf;

use arlonctl_core::contract::ToolLocator;

/// Looks tools up on `PATH`.
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        match which::which(tool) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(tool, error = %e, "Tool not found on PATH");
                None
            }
        }
    }
}
