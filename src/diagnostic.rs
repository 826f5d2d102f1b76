// CLASSIFICATION: COMMUNITY
// Filename: diagnostic.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

//! Toolchain-neutral diagnostics and the aggregate compilation failure.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Code given to parse-phase errors the toolchain reports without one.
pub const SYNTAX_CODE: &str = "syntax";

/// Severity as reported by the toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// Primary source position of a diagnostic, mapped back to the unit path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
}

/// One compiler-produced message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Short identifying code (`E0425`, `-Wunused-variable`, `XD0001`), if any.
    pub code: Option<String>,
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
    /// Set when a warning was promoted to error severity by a lint level.
    pub warning_as_error: bool,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: None,
            severity,
            message: message.into(),
            location: None,
            warning_as_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether this diagnostic prevents the build from producing an image.
    pub fn is_blocking(&self) -> bool {
        self.warning_as_error || self.severity == Severity::Error
    }

    /// Identifier used when rendering; falls back to the severity name.
    pub fn id(&self) -> String {
        match &self.code {
            Some(code) => code.clone(),
            None => self.severity.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id(), self.message)
    }
}

/// Aggregate failure carrying every build-blocking diagnostic in report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    diagnostics: Vec<Diagnostic>,
}

impl CompilationError {
    /// Keep only blocking diagnostics; warnings and notes are dropped.
    pub fn from_reported<I>(reported: I) -> Self
    where
        I: IntoIterator<Item = Diagnostic>,
    {
        Self {
            diagnostics: reported.into_iter().filter(Diagnostic::is_blocking).collect(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompilationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_code_and_message_per_line() {
        let err = CompilationError::from_reported(vec![
            Diagnostic::error("cannot find value `x` in this scope").with_code("E0425"),
            Diagnostic::new(Severity::Warning, "unused variable: `y`"),
            Diagnostic::error("expected one of `;` or `}`"),
        ]);
        assert_eq!(
            err.to_string(),
            "E0425: cannot find value `x` in this scope\nerror: expected one of `;` or `}`"
        );
    }

    #[test]
    fn builder_keeps_location_and_order() {
        let at = Location {
            path: PathBuf::from("A.rs"),
            line: 3,
            column: 7,
        };
        let err = CompilationError::from_reported(vec![
            Diagnostic::error("expected `;`").with_code(SYNTAX_CODE).with_location(at.clone()),
            Diagnostic::error("mismatched types").with_code("E0308"),
        ]);
        let diags = err.into_diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].location, Some(at));
        assert_eq!(diags[0].to_string(), "syntax: expected `;`");
        assert_eq!(diags[1].id(), "E0308");
    }

    #[test]
    fn escalated_warning_is_blocking() {
        let mut diag = Diagnostic::new(Severity::Warning, "unused variable");
        assert!(!diag.is_blocking());
        diag.warning_as_error = true;
        assert!(diag.is_blocking());
    }
}
