// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

//! Compiler backends. Each one drives an external toolchain that turns the
//! session's units into a shared-object image held in memory.

pub mod cc;
pub mod registry;
pub mod rustc;

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;

use crate::config::CompilationOptions;
use crate::diagnostic::Diagnostic;
use crate::error::{CompilerError, Result};
use crate::input::SourceUnit;

pub use registry::{backend_for, get_backend, BackendKind, CompilerBackend};

/// An on-disk module the new build links against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    /// Crate name for rustc `--extern`; derived from the file name when absent.
    pub name: Option<String>,
    pub path: PathBuf,
}

impl ModuleReference {
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        ModuleReference {
            name: None,
            path: path.into(),
        }
    }

    pub fn named<P: Into<PathBuf>>(name: &str, path: P) -> Self {
        ModuleReference {
            name: Some(name.to_string()),
            path: path.into(),
        }
    }

    /// `libfoo-1a2b.rlib` -> `foo`.
    pub fn crate_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("reference");
        let stem = stem.strip_prefix("lib").unwrap_or(stem);
        stem.split('-').next().unwrap_or(stem).replace('.', "_")
    }
}

/// Everything one compilation needs, assembled by the session.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub module_name: &'a str,
    pub units: &'a [SourceUnit],
    pub references: &'a [ModuleReference],
    pub options: &'a CompilationOptions,
}

/// Outcome reported by a backend for a single invocation.
#[derive(Debug)]
pub enum EmitResult {
    Emitted {
        image: Vec<u8>,
        symbols: Vec<u8>,
        diagnostics: Vec<Diagnostic>,
    },
    Failed {
        diagnostics: Vec<Diagnostic>,
    },
}

/// Private directory holding materialised units and the linker output.
/// Removed when dropped.
pub(crate) struct Scratch {
    dir: TempDir,
    logical: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl Scratch {
    /// Write every unit to `units/<index>/<file name>`.
    pub(crate) fn materialise(units: &[SourceUnit]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("exprc")
            .tempdir()
            .map_err(CompilerError::Scratch)?;
        let mut files = Vec::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            let unit_dir = dir.path().join("units").join(i.to_string());
            fs::create_dir_all(&unit_dir).map_err(CompilerError::Scratch)?;
            let file = unit_dir.join(unit.file_name());
            fs::write(&file, unit.text().as_bytes()).map_err(CompilerError::Scratch)?;
            files.push(file);
        }
        fs::create_dir_all(dir.path().join("out")).map_err(CompilerError::Scratch)?;
        Ok(Scratch {
            dir,
            logical: units.iter().map(|u| u.path().to_path_buf()).collect(),
            files,
        })
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Scratch copy of each unit, in unit order.
    pub(crate) fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub(crate) fn output_path(&self, module_name: &str) -> PathBuf {
        self.dir.path().join("out").join(format!(
            "{}{module_name}{}",
            env::consts::DLL_PREFIX,
            env::consts::DLL_SUFFIX
        ))
    }

    /// `(scratch file, logical path)` pairs for path remapping.
    pub(crate) fn remaps(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.files
            .iter()
            .map(PathBuf::as_path)
            .zip(self.logical.iter().map(PathBuf::as_path))
    }

    /// Map a path reported by the toolchain back to the unit's logical path.
    pub(crate) fn logical_path(&self, reported: &str) -> PathBuf {
        let path = Path::new(reported);
        if let Some(i) = self.files.iter().position(|f| f == path) {
            return self.logical[i].clone();
        }
        let rel = path.strip_prefix(self.dir.path()).unwrap_or(path);
        let mut comps = rel.components().map(|c| c.as_os_str().to_string_lossy());
        if comps.next().as_deref() == Some("units") {
            if let Some(i) = comps.next().and_then(|s| s.parse::<usize>().ok()) {
                if let Some(logical) = self.logical.get(i) {
                    return logical.clone();
                }
            }
        }
        path.to_path_buf()
    }

    pub(crate) fn read_image(&self, module_name: &str) -> Result<Vec<u8>> {
        fs::read(self.output_path(module_name)).map_err(CompilerError::Scratch)
    }
}

/// Make a host-supplied path independent of the toolchain's working directory.
pub(crate) fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Last `max_lines` lines of captured standard error.
pub(crate) fn stderr_tail(output: &Output, max_lines: usize) -> String {
    let text = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
