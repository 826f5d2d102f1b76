// CLASSIFICATION: COMMUNITY
// Filename: cc.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::{absolute, stderr_tail, CompileRequest, CompilerBackend, EmitResult, Scratch};
use crate::config::OptimizationLevel;
use crate::diagnostic::{Diagnostic, Location, Severity, SYNTAX_CODE};
use crate::error::{CompilerError, Result};
use crate::symbols::SymbolImage;
use crate::toolchain::Toolchain;
use crate::{expr_info, expr_warn};

/// Compiler backend using the system C compiler (`cc -shared -fPIC`).
pub struct CcBackend {
    toolchain: Toolchain,
}

impl CcBackend {
    pub fn new(toolchain: Toolchain) -> Self {
        CcBackend { toolchain }
    }

    fn args(&self, request: &CompileRequest<'_>, scratch: &Scratch) -> Result<Vec<String>> {
        let opts = request.options;
        let opt_level = match opts.optimization() {
            OptimizationLevel::Debug => "-O0",
            OptimizationLevel::Release => "-O2",
        };
        let mut args = vec![
            "-shared".to_string(),
            "-fPIC".to_string(),
            "-g".to_string(),
            opt_level.to_string(),
            "-fdiagnostics-color=never".to_string(),
        ];
        for (file, logical) in scratch.remaps() {
            args.push(format!("-ffile-prefix-map={}={}", file.display(), logical.display()));
        }
        if opts.warnings_as_errors {
            args.push("-Werror".to_string());
        }
        if let Some(target) = &opts.target {
            args.push(format!("--target={target}"));
        }
        let mut sources = Vec::new();
        for file in scratch.files() {
            match file.parent() {
                Some(dir) if is_header(file) => args.push(format!("-I{}", dir.display())),
                _ => sources.push(file.display().to_string()),
            }
        }
        args.extend(opts.extra_args.iter().cloned());
        args.push("-o".to_string());
        args.push(scratch.output_path(request.module_name).display().to_string());
        args.extend(sources);
        for reference in request.references {
            let path = absolute(&reference.path).map_err(CompilerError::Scratch)?;
            args.push(path.display().to_string());
        }
        Ok(args)
    }
}

fn is_header(path: &std::path::Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("h")
}

impl CompilerBackend for CcBackend {
    fn name(&self) -> &str {
        "cc"
    }

    fn compile(&self, request: &CompileRequest<'_>) -> Result<EmitResult> {
        let scratch = Scratch::materialise(request.units)?;
        let args = self.args(request, &scratch)?;
        let units = request.units.len();
        expr_info!("cc", &self.toolchain, request.module_name, units, &args, "compile");
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
            expr_warn!("cc", &self.toolchain, request.module_name, units, &args, "failed");
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

static LOCATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<file>[^:]+):(?P<line>\d+):(?P<col>\d+): (?P<level>fatal error|error|warning|note): (?P<msg>.*)$",
    )
    .expect("located diagnostic regex")
});

static DRIVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<tool>[\w.+-]+): (?P<level>fatal error|error|warning): (?P<msg>.*)$")
        .expect("driver diagnostic regex")
});

static FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\[(?P<flag>-W[^\]]+)\]$").expect("warning flag regex"));

/// Message openings gcc and clang use for parse errors, which carry no `-W` flag.
const SYNTAX_PREFIXES: &[&str] = &[
    "expected ",
    "stray ",
    "unterminated ",
    "missing terminating ",
    "extraneous closing brace",
];

const LINKER_MARKERS: &[&str] = &["multiple definition of", "undefined reference to"];

fn severity(level: &str) -> Severity {
    match level {
        "error" | "fatal error" => Severity::Error,
        "warning" => Severity::Warning,
        _ => Severity::Note,
    }
}

/// Split a trailing `[-W...]` option into `(message, code, escalated)`.
/// Handles gcc `-Werror=foo` and clang `-Werror,-Wfoo`.
fn split_flag(msg: &str) -> (String, Option<String>, bool) {
    let Some(caps) = FLAG.captures(msg) else {
        return (msg.to_string(), None, false);
    };
    let whole = caps.get(0).map_or(msg.len(), |m| m.start());
    let flag = &caps["flag"];
    let last = flag.rsplit(',').next().unwrap_or(flag);
    let (code, escalated) = match last.strip_prefix("-Werror=") {
        Some(name) => (format!("-W{name}"), true),
        None => (last.to_string(), flag.contains("-Werror")),
    };
    (msg[..whole].to_string(), Some(code), escalated)
}

/// Parse gcc/clang text diagnostics in report order.
pub fn parse_text_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    parse_with(stderr, |p| PathBuf::from(p))
}

pub(crate) fn parse_diagnostics(stderr: &str, scratch: &Scratch) -> Vec<Diagnostic> {
    parse_with(stderr, |p| scratch.logical_path(p))
}

fn parse_with(stderr: &str, map_path: impl Fn(&str) -> PathBuf) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for line in stderr.lines() {
        if let Some(caps) = LOCATED.captures(line) {
            let (message, code, escalated) = split_flag(&caps["msg"]);
            let severity = severity(&caps["level"]);
            let code = code.or_else(|| {
                let syntax = severity == Severity::Error
                    && SYNTAX_PREFIXES.iter().any(|p| message.starts_with(p));
                syntax.then(|| SYNTAX_CODE.to_string())
            });
            let mut diag = Diagnostic::new(severity, message).with_location(Location {
                path: map_path(&caps["file"]),
                line: caps["line"].parse().unwrap_or(0),
                column: caps["col"].parse().unwrap_or(0),
            });
            diag.code = code;
            diag.warning_as_error = escalated && severity == Severity::Error;
            out.push(diag);
        } else if let Some(caps) = DRIVER.captures(line) {
            out.push(Diagnostic::new(severity(&caps["level"]), &caps["msg"]));
        } else if let Some(start) = LINKER_MARKERS.iter().find_map(|m| line.find(m)) {
            let message = line[start..].split(';').next().unwrap_or(&line[start..]);
            out.push(Diagnostic::error(message).with_code("ld"));
        }
    }
    out
}
