// CLASSIFICATION: COMMUNITY
// Filename: logging.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use log::Level;

use crate::toolchain::Toolchain;

pub const INVOCATION_TARGET: &str = "expression_debugger::invocation";

/// Emit one key=value invocation record through the `log` facade.
/// The tool is only asked for its version when the record is enabled.
pub fn invocation(
    level: Level,
    backend: &str,
    toolchain: &Toolchain,
    module: &str,
    units: usize,
    args: &[String],
    msg: &str,
) {
    if !log::log_enabled!(target: INVOCATION_TARGET, level) {
        return;
    }
    let version = toolchain.version().unwrap_or_else(|_| "unknown".to_string());
    log::log!(
        target: INVOCATION_TARGET,
        level,
        "backend={backend} tool={} version={version:?} module={module} units={units} args={args:?} msg={msg}",
        toolchain.path().display()
    );
}

#[macro_export]
macro_rules! expr_info {
    ($backend:expr, $toolchain:expr, $module:expr, $units:expr, $args:expr, $msg:expr $(,)?) => {
        $crate::logging::invocation(
            ::log::Level::Info,
            $backend,
            $toolchain,
            $module,
            $units,
            $args,
            $msg,
        )
    };
}

#[macro_export]
macro_rules! expr_warn {
    ($backend:expr, $toolchain:expr, $module:expr, $units:expr, $args:expr, $msg:expr $(,)?) => {
        $crate::logging::invocation(
            ::log::Level::Warn,
            $backend,
            $toolchain,
            $module,
            $units,
            $args,
            $msg,
        )
    };
}
