// CLASSIFICATION: COMMUNITY
// Filename: session.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

//! Single-use compiler session: accumulate units, then build and load once.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::backend::{
    backend_for, BackendKind, CompileRequest, CompilerBackend, EmitResult, ModuleReference,
};
use crate::config::CompilationOptions;
use crate::diagnostic::{CompilationError, Diagnostic};
use crate::error::{CompilerError, Result};
use crate::guard;
use crate::input::{unique_module_ident, SourceUnit};
use crate::loader::{DefaultLoader, LoadedModule, ModuleLoader};
use crate::symbols::symbols_name;

/// Code for a unit path added more than once to a session.
pub const DUPLICATE_UNIT_CODE: &str = "XD0001";

/// Fresh module name, unique among modules loaded by this process.
pub fn random_module_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(12)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("expr_{suffix}")
}

pub struct ExpressionCompiler {
    options: CompilationOptions,
    units: Vec<SourceUnit>,
    backend: Option<Box<dyn CompilerBackend>>,
    loader: Box<dyn ModuleLoader>,
}

impl ExpressionCompiler {
    /// Session using the toolchain picked from options or the first unit.
    pub fn new(options: CompilationOptions) -> Self {
        ExpressionCompiler {
            options,
            units: Vec::new(),
            backend: None,
            loader: Box::new(DefaultLoader),
        }
    }

    /// Session with explicit collaborators.
    pub fn with_collaborators(
        options: CompilationOptions,
        backend: Box<dyn CompilerBackend>,
        loader: Box<dyn ModuleLoader>,
    ) -> Self {
        ExpressionCompiler {
            options,
            units: Vec::new(),
            backend: Some(backend),
            loader,
        }
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Add one unit. With `emit_file` the text is first written to the
    /// resolved path; a failed write leaves the session unchanged. Units whose
    /// file stems collide get suffixed module names (`a`, `a_1`).
    pub fn add_unit(&mut self, text: &str, filename: impl AsRef<Path>) -> Result<()> {
        let path = self.options.resolve_path(filename.as_ref());
        if self.options.emit_file {
            fs::write(&path, text.as_bytes()).map_err(|source| CompilerError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("emitted unit path={} bytes={}", path.display(), text.len());
        }
        let module = {
            let taken: Vec<&str> = self.units.iter().map(SourceUnit::module).collect();
            unique_module_ident(&path, &taken)
        };
        self.units.push(SourceUnit::new(path, text.to_string()).with_module(module));
        Ok(())
    }

    /// Compile every unit into one shared library and load it.
    pub fn build(self, references: &[ModuleReference]) -> Result<LoadedModule> {
        let module_name = random_module_name();
        debug!(
            "build module={module_name} symbols={} units={}",
            symbols_name(&module_name),
            self.units.len()
        );

        let duplicates = duplicate_units(&self.units);
        if !duplicates.is_empty() {
            warn!("build module={module_name} rejected: duplicate unit paths");
            return Err(CompilationError::from_reported(duplicates).into());
        }
        guard::check_extra_args(&self.options.extra_args)?;

        let backend = match self.backend {
            Some(backend) => backend,
            None => {
                let kind = self
                    .options
                    .backend
                    .unwrap_or_else(|| BackendKind::detect(&self.units));
                backend_for(kind)?
            }
        };
        let request = CompileRequest {
            module_name: &module_name,
            units: &self.units,
            references,
            options: &self.options,
        };

        match backend.compile(&request)? {
            EmitResult::Failed { diagnostics } => {
                let err = CompilationError::from_reported(diagnostics);
                warn!(
                    "build module={module_name} backend={} failed errors={}",
                    backend.name(),
                    err.diagnostics().len()
                );
                Err(err.into())
            }
            EmitResult::Emitted {
                image,
                symbols,
                diagnostics,
            } => {
                let suppressed = diagnostics.iter().filter(|d| !d.is_blocking()).count();
                if suppressed > 0 {
                    debug!("build module={module_name} suppressed={suppressed} warnings");
                }
                let module = self.loader.load(&module_name, &image, &symbols)?;
                info!(
                    "build module={module_name} backend={} bytes={} sha256={}",
                    backend.name(),
                    image.len(),
                    module.digest()
                );
                if let Some(dir) = &self.options.log_dir {
                    let units = self.units.len();
                    let logged =
                        guard::log_build(dir, module.digest(), backend.name(), &module_name, units);
                    if let Err(e) = logged {
                        warn!("build ledger {}: {e}", dir.display());
                    }
                }
                Ok(module)
            }
        }
    }
}

/// One diagnostic per repeated path, in the order the repeats were added.
fn duplicate_units(units: &[SourceUnit]) -> Vec<Diagnostic> {
    let mut seen = HashSet::new();
    units
        .iter()
        .filter(|u| !seen.insert(u.path()))
        .map(|u| {
            Diagnostic::error(format!(
                "source unit `{}` was added more than once; embedded sources are indexed by path",
                u.path().display()
            ))
            .with_code(DUPLICATE_UNIT_CODE)
        })
        .collect()
}
