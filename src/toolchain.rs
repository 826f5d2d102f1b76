// CLASSIFICATION: COMMUNITY
// Filename: toolchain.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::error::{CompilerError, Result};

/// A resolved compiler executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    tool: String,
    path: PathBuf,
}

impl Toolchain {
    /// Use an explicit executable path.
    pub fn new<P: Into<PathBuf>>(tool: &str, path: P) -> Result<Self> {
        let path = path.into();
        if tool.trim().is_empty() || path.as_os_str().is_empty() {
            return Err(CompilerError::ToolNotFound {
                tool: tool.to_string(),
            });
        }
        Ok(Toolchain {
            tool: tool.to_string(),
            path,
        })
    }

    /// Resolve `tool`, honouring `env_var` before searching `PATH`.
    pub fn detect(tool: &str, env_var: &str) -> Result<Self> {
        if let Some(value) = env::var_os(env_var).filter(|v| !v.is_empty()) {
            let candidate = PathBuf::from(value);
            let resolved = if candidate.components().count() > 1 {
                candidate
            } else {
                which::which(&candidate).map_err(|_| CompilerError::ToolNotFound {
                    tool: candidate.display().to_string(),
                })?
            };
            debug!("toolchain tool={tool} source={env_var} path={}", resolved.display());
            return Self::new(tool, resolved);
        }
        let resolved = which::which(tool).map_err(|_| CompilerError::ToolNotFound {
            tool: tool.to_string(),
        })?;
        debug!("toolchain tool={tool} source=PATH path={}", resolved.display());
        Self::new(tool, resolved)
    }

    pub fn rustc() -> Result<Self> {
        Self::detect("rustc", "RUSTC")
    }

    pub fn cc() -> Result<Self> {
        Self::detect("cc", "CC")
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn command(&self) -> Command {
        Command::new(&self.path)
    }

    /// First line of `<tool> --version`.
    pub fn version(&self) -> Result<String> {
        let out = self
            .command()
            .arg("--version")
            .output()
            .map_err(|source| CompilerError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;
        let text = String::from_utf8_lossy(&out.stdout);
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(
            Toolchain::new("rustc", ""),
            Err(CompilerError::ToolNotFound { .. })
        ));
    }
}
