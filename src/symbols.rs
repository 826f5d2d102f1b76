// CLASSIFICATION: COMMUNITY
// Filename: symbols.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

//! Portable debug-symbol image with the original unit text embedded.
//!
//! Native debug info (DWARF, remapped to the logical unit paths) stays inside
//! the shared object. This companion document indexes every unit by path and
//! carries its text and checksum, so tooling can show source lines without
//! any file on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::OptimizationLevel;
use crate::input::SourceUnit;

pub const SYMBOL_FORMAT: &str = "expr-symbols/1";
pub const CHECKSUM_ALGORITHM: &str = "sha256";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedDocument {
    pub path: PathBuf,
    pub checksum_algorithm: String,
    pub checksum: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolImage {
    pub format: String,
    pub module: String,
    pub optimized: bool,
    pub documents: Vec<EmbeddedDocument>,
}

/// Companion file name for a module (`expr_x1y2.sym.json`).
pub fn symbols_name(module: &str) -> String {
    format!("{module}.sym.json")
}

impl SymbolImage {
    pub fn new(module: &str, units: &[SourceUnit], optimization: OptimizationLevel) -> Self {
        let documents = units
            .iter()
            .map(|u| EmbeddedDocument {
                path: u.path().to_path_buf(),
                checksum_algorithm: CHECKSUM_ALGORITHM.to_string(),
                checksum: u.checksum().to_string(),
                text: u.text().to_string(),
            })
            .collect();
        SymbolImage {
            format: SYMBOL_FORMAT.to_string(),
            module: module.to_string(),
            optimized: optimization == OptimizationLevel::Release,
            documents,
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn document(&self, path: &Path) -> Option<&EmbeddedDocument> {
        self.documents.iter().find(|d| d.path == path)
    }
}
