// CLASSIFICATION: COMMUNITY
// Filename: guard.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::{CompilerError, Result};

pub const LEDGER_FILE: &str = "expr_builds.log";

/// Arguments that would change what the toolchain emits or where.
const DISALLOWED: &[&str] = &["-c", "-S", "-E", "-static"];

/// Rejected with any attached value: `-ofoo`, `--emit=asm`, `--emitasm`.
const DISALLOWED_PREFIXES: &[&str] = &[
    "-o",
    "--out-dir",
    "--emit",
    "--crate-type",
    "--crate-name",
    "--error-format",
];

/// Reject extra arguments that would break the shared-library contract.
pub fn check_extra_args(args: &[String]) -> Result<()> {
    for arg in args {
        let exact = DISALLOWED.contains(&arg.as_str());
        if exact || DISALLOWED_PREFIXES.iter().any(|p| arg.starts_with(p)) {
            return Err(CompilerError::RejectedArgument(arg.clone()));
        }
    }
    Ok(())
}

pub fn hash_image(image: &[u8]) -> String {
    hex::encode(Sha256::digest(image))
}

/// Append one build record to `log_dir/expr_builds.log`.
pub fn log_build(
    log_dir: &Path,
    hash: &str,
    backend: &str,
    module: &str,
    units: usize,
) -> std::io::Result<()> {
    fs::create_dir_all(log_dir)?;
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LEDGER_FILE))?;
    writeln!(
        f,
        "{} hash={hash} backend={backend} module={module} units={units}",
        Utc::now().to_rfc3339()
    )?;
    f.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_flags_rejected() {
        let err = check_extra_args(&["-o".to_string()]).unwrap_err();
        assert!(matches!(err, CompilerError::RejectedArgument(a) if a == "-o"));
        assert!(check_extra_args(&["--emit=asm".to_string()]).is_err());
        assert!(check_extra_args(&["--crate-type=bin".to_string()]).is_err());
    }

    #[test]
    fn joined_output_flags_rejected() {
        for arg in ["-o/tmp/out.so", "-ofoo", "--emitasm", "--out-dir/tmp", "--crate-typebin"] {
            let err = check_extra_args(&[arg.to_string()]).unwrap_err();
            assert!(matches!(err, CompilerError::RejectedArgument(ref a) if a == arg));
        }
    }

    #[test]
    fn tuning_flags_pass() {
        let args = vec![
            "-Ctarget-cpu=native".to_string(),
            "-Wall".to_string(),
            "-O2".to_string(),
            "-Werror=format".to_string(),
        ];
        assert!(check_extra_args(&args).is_ok());
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(hash_image(b"abc"), hash_image(b"abc"));
        assert_ne!(hash_image(b"abc"), hash_image(b"abd"));
    }
}
