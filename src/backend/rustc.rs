// CLASSIFICATION: COMMUNITY
// Filename: rustc.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::backend::{absolute, stderr_tail, CompileRequest, CompilerBackend, EmitResult, Scratch};
use crate::config::OptimizationLevel;
use crate::diagnostic::{Diagnostic, Location, Severity, SYNTAX_CODE};
use crate::error::{CompilerError, Result};
use crate::symbols::SymbolImage;
use crate::toolchain::Toolchain;
use crate::{expr_info, expr_warn};

/// Backend driving `rustc` to produce a `cdylib`.
pub struct RustcBackend {
    toolchain: Toolchain,
}

impl RustcBackend {
    pub fn new(toolchain: Toolchain) -> Self {
        RustcBackend { toolchain }
    }

    /// Crate root declaring one public module per unit, in unit order.
    fn crate_root(request: &CompileRequest<'_>, scratch: &Scratch) -> String {
        let mut root = String::new();
        for (unit, file) in request.units.iter().zip(scratch.files()) {
            let _ = writeln!(
                root,
                "#[path = {:?}]\npub mod {};",
                file.to_string_lossy(),
                unit.module()
            );
        }
        root
    }

    fn args(&self, request: &CompileRequest<'_>, scratch: &Scratch) -> Result<Vec<String>> {
        let opts = request.options;
        let opt_level = match opts.optimization() {
            OptimizationLevel::Debug => "0",
            OptimizationLevel::Release => "3",
        };
        let mut args = vec![
            "--crate-name".to_string(),
            request.module_name.to_string(),
            "--crate-type".to_string(),
            "cdylib".to_string(),
            format!("--edition={}", opts.edition),
            "--error-format=json".to_string(),
            "-C".to_string(),
            format!("opt-level={opt_level}"),
            "-C".to_string(),
            "debuginfo=2".to_string(),
        ];
        for (file, logical) in scratch.remaps() {
            args.push("--remap-path-prefix".to_string());
            args.push(format!("{}={}", file.display(), logical.display()));
        }
        if opts.warnings_as_errors {
            args.push("-D".to_string());
            args.push("warnings".to_string());
        }
        if let Some(target) = &opts.target {
            args.push("--target".to_string());
            args.push(target.clone());
        }
        for reference in request.references {
            let path = absolute(&reference.path).map_err(CompilerError::Scratch)?;
            if let Some(dir) = path.parent() {
                args.push("-L".to_string());
                args.push(format!("dependency={}", dir.display()));
            }
            args.push("--extern".to_string());
            args.push(format!("{}={}", reference.crate_name(), path.display()));
        }
        args.extend(opts.extra_args.iter().cloned());
        args.push("-o".to_string());
        args.push(scratch.output_path(request.module_name).display().to_string());
        args.push(scratch.root().join("lib.rs").display().to_string());
        Ok(args)
    }
}

impl CompilerBackend for RustcBackend {
    fn name(&self) -> &str {
        "rustc"
    }

    fn compile(&self, request: &CompileRequest<'_>) -> Result<EmitResult> {
        let scratch = Scratch::materialise(request.units)?;
        fs::write(
            scratch.root().join("lib.rs"),
            Self::crate_root(request, &scratch),
        )
        .map_err(CompilerError::Scratch)?;
        let args = self.args(request, &scratch)?;
        let units = request.units.len();
        expr_info!("rustc", &self.toolchain, request.module_name, units, &args, "compile");
        let output = self
            .toolchain
            .command()
            .args(&args)
            .current_dir(scratch.root())
            .output()
            .map_err(|source| CompilerError::Spawn {
                tool: self.toolchain.tool().to_string(),
                source,
            })?;
        let diagnostics = parse_diagnostics(&String::from_utf8_lossy(&output.stderr), &scratch);
        if !output.status.success() {
            expr_warn!("rustc", &self.toolchain, request.module_name, units, &args, "failed");
            if !diagnostics.iter().any(Diagnostic::is_blocking) {
                return Err(CompilerError::ToolFailed {
                    tool: self.toolchain.tool().to_string(),
                    status: output.status,
                    stderr: stderr_tail(&output, 20),
                });
            }
            return Ok(EmitResult::Failed { diagnostics });
        }
        let image = scratch.read_image(request.module_name)?;
        let optimization = request.options.optimization();
        let symbols = SymbolImage::new(request.module_name, request.units, optimization)
            .to_bytes()
            .map_err(|e| CompilerError::Scratch(e.into()))?;
        Ok(EmitResult::Emitted {
            image,
            symbols,
            diagnostics,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RustcCode {
    code: String,
}

#[derive(Debug, Deserialize)]
struct RustcSpan {
    file_name: String,
    line_start: u32,
    column_start: u32,
    #[serde(default)]
    is_primary: bool,
}

#[derive(Debug, Deserialize)]
struct RustcChild {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RustcDiagnostic {
    #[serde(rename = "$message_type")]
    message_type: Option<String>,
    message: String,
    code: Option<RustcCode>,
    level: String,
    #[serde(default)]
    spans: Vec<RustcSpan>,
    #[serde(default)]
    children: Vec<RustcChild>,
}

fn severity(level: &str) -> Severity {
    if level.starts_with("error") {
        Severity::Error
    } else if level == "warning" {
        Severity::Warning
    } else {
        Severity::Note
    }
}

/// Lint promoted to an error by `-D warnings` or a `deny` attribute.
fn is_escalated_lint(diag: &RustcDiagnostic) -> bool {
    diag.children.iter().any(|c| {
        c.message.contains("implied by `-D warnings`")
            || c.message.contains("implied by `#[deny(warnings)]`")
            || c.message.contains("the lint level is defined here")
    })
}

/// Parse `--error-format=json` output, one diagnostic per line, in report order.
pub fn parse_json_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    parse_with(stderr, |p| PathBuf::from(p))
}

pub(crate) fn parse_diagnostics(stderr: &str, scratch: &Scratch) -> Vec<Diagnostic> {
    parse_with(stderr, |p| scratch.logical_path(p))
}

/// Codeless errors with a span that arrive before any coded diagnostic come
/// from the parser and get `SYNTAX_CODE`.
fn parse_with(stderr: &str, map_path: impl Fn(&str) -> PathBuf) -> Vec<Diagnostic> {
    let mut coded = false;
    stderr
        .lines()
        .filter(|l| l.starts_with('{'))
        .filter_map(|l| serde_json::from_str::<RustcDiagnostic>(l).ok())
        .filter(|d| d.message_type.as_deref().map_or(true, |t| t == "diagnostic"))
        .filter(|d| !(d.spans.is_empty() && d.message.starts_with("aborting due to")))
        .map(|d| convert(d, &map_path))
        .map(|mut d| {
            if d.code.is_some() {
                coded = true;
            } else if !coded && d.severity == Severity::Error && d.location.is_some() {
                d.code = Some(SYNTAX_CODE.to_string());
            }
            d
        })
        .collect()
}

fn convert(d: RustcDiagnostic, map_path: &impl Fn(&str) -> PathBuf) -> Diagnostic {
    let severity = severity(&d.level);
    let warning_as_error = severity == Severity::Error && is_escalated_lint(&d);
    let location = d
        .spans
        .iter()
        .find(|s| s.is_primary)
        .or_else(|| d.spans.first())
        .map(|s| Location {
            path: map_path(&s.file_name),
            line: s.line_start,
            column: s.column_start,
        });
    Diagnostic {
        code: d.code.map(|c| c.code),
        severity,
        message: d.message,
        location,
        warning_as_error,
    }
}
