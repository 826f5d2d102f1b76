// CLASSIFICATION: COMMUNITY
// Filename: input.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLanguage {
    C,
    Rust,
}

pub fn detect_input_language(path: &Path) -> InputLanguage {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "c" | "h" => InputLanguage::C,
        _ => InputLanguage::Rust,
    }
}

const RESERVED: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try",
    "type", "unsafe", "use", "where", "while", "yield",
];

/// Derive a Rust module identifier from a unit path (`src/Math Ops.rs` -> `math_ops`).
pub fn module_ident(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unit");
    let mut ident: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if ident == "_" || RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// `module_ident`, suffixed `_1`, `_2`, ... until it differs from every name in `taken`.
pub fn unique_module_ident(path: &Path, taken: &[&str]) -> String {
    let base = module_ident(path);
    if !taken.contains(&base.as_str()) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// One named block of source text, immutable once added to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: PathBuf,
    text: String,
    module: String,
    language: InputLanguage,
    checksum: String,
}

impl SourceUnit {
    pub fn new(path: PathBuf, text: String) -> Self {
        let module = module_ident(&path);
        let language = detect_input_language(&path);
        let checksum = hex::encode(Sha256::digest(text.as_bytes()));
        SourceUnit {
            path,
            text,
            module,
            language,
            checksum,
        }
    }

    /// Replace the module identifier derived from the path.
    pub fn with_module(mut self, module: String) -> Self {
        self.module = module;
        self
    }

    /// Resolved logical path the unit is indexed by.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn language(&self) -> InputLanguage {
        self.language
    }

    /// Hex SHA-256 of the UTF-8 text.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// File name used when the unit is materialised in scratch space.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.rs", self.module))
    }
}
