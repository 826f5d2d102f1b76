// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::registry::BackendKind;
use crate::error::{CompilerError, Result};

/// Code generation profile handed to the toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Debug,
    Release,
}

/// Session-wide options, read once when the session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilationOptions {
    /// Base directory that unit filenames are joined onto.
    pub root_path: Option<PathBuf>,
    /// Persist every unit to its resolved path as it is added.
    pub emit_file: bool,
    /// Optimised code generation instead of debug-friendly output.
    pub is_release: bool,
    /// Promote every warning to error severity.
    pub warnings_as_errors: bool,
    /// Backend override; detected from the first unit when absent.
    pub backend: Option<BackendKind>,
    /// Rust edition passed to rustc.
    pub edition: String,
    /// Target triple; the host target when absent.
    pub target: Option<String>,
    /// Additional compiler arguments, screened by [`crate::guard`].
    pub extra_args: Vec<String>,
    /// Directory receiving the build ledger.
    pub log_dir: Option<PathBuf>,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            root_path: None,
            emit_file: false,
            is_release: false,
            warnings_as_errors: false,
            backend: None,
            edition: "2021".to_string(),
            target: None,
            extra_args: Vec::new(),
            log_dir: None,
        }
    }
}

impl CompilationOptions {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CompilerError::Config(e.to_string()))
    }

    /// Read options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CompilerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn optimization(&self) -> OptimizationLevel {
        if self.is_release {
            OptimizationLevel::Release
        } else {
            OptimizationLevel::Debug
        }
    }

    /// Path a unit named `filename` is addressed by (and written to).
    pub fn resolve_path(&self, filename: &Path) -> PathBuf {
        match &self.root_path {
            Some(root) => root.join(filename),
            None => filename.to_path_buf(),
        }
    }
}
