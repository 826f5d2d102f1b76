// CLASSIFICATION: COMMUNITY
// Filename: registry.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backend::{cc::CcBackend, rustc::RustcBackend, CompileRequest, EmitResult};
use crate::error::{CompilerError, Result};
use crate::input::{InputLanguage, SourceUnit};
use crate::toolchain::Toolchain;

/// The compiler service a session delegates to.
pub trait CompilerBackend {
    /// Short name used in logs and the build ledger.
    fn name(&self) -> &str;

    /// Run the toolchain once over the request.
    fn compile(&self, request: &CompileRequest<'_>) -> Result<EmitResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Rustc,
    Cc,
}

impl BackendKind {
    /// Backend implied by the first unit; rustc for an empty session.
    pub fn detect(units: &[SourceUnit]) -> Self {
        match units.first().map(SourceUnit::language) {
            Some(InputLanguage::C) => BackendKind::Cc,
            _ => BackendKind::Rustc,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Rustc => f.write_str("rustc"),
            BackendKind::Cc => f.write_str("cc"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "rustc" => Ok(BackendKind::Rustc),
            "cc" | "gcc" | "clang" => Ok(BackendKind::Cc),
            other => Err(CompilerError::UnknownBackend(other.to_string())),
        }
    }
}

/// Resolve the toolchain for `kind` and wrap it in its backend.
pub fn backend_for(kind: BackendKind) -> Result<Box<dyn CompilerBackend>> {
    match kind {
        BackendKind::Rustc => Ok(Box::new(RustcBackend::new(Toolchain::rustc()?))),
        BackendKind::Cc => Ok(Box::new(CcBackend::new(Toolchain::cc()?))),
    }
}

/// Backend by configured name (`rustc`, `cc`, `gcc`, `clang`).
pub fn get_backend(name: &str) -> Result<Box<dyn CompilerBackend>> {
    backend_for(name.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn names_parse() {
        assert_eq!("rustc".parse::<BackendKind>().unwrap(), BackendKind::Rustc);
        assert_eq!("clang".parse::<BackendKind>().unwrap(), BackendKind::Cc);
        assert!(matches!(
            "llvm".parse::<BackendKind>(),
            Err(CompilerError::UnknownBackend(n)) if n == "llvm"
        ));
    }

    #[test]
    fn unknown_name_has_no_backend() {
        assert!(matches!(
            get_backend("tcc"),
            Err(CompilerError::UnknownBackend(n)) if n == "tcc"
        ));
    }

    #[test]
    fn detect_from_first_unit() {
        assert_eq!(BackendKind::detect(&[]), BackendKind::Rustc);
        let units = vec![SourceUnit::new(PathBuf::from("add.c"), String::new())];
        assert_eq!(BackendKind::detect(&units), BackendKind::Cc);
    }
}
