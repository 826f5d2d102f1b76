// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-14
// Author: Lukas Bower

//! Compile source units with an external toolchain and load the resulting
//! shared object into the running process.
//!
//! ```no_run
//! use expression_debugger::{CompilationOptions, ExpressionCompiler};
//!
//! let mut session = ExpressionCompiler::new(CompilationOptions::default());
//! session.add_unit(
//!     "#[no_mangle]\npub extern \"C\" fn add(a: i32, b: i32) -> i32 { a + b }\n",
//!     "A.rs",
//! )?;
//! let module = session.build(&[])?;
//! let add = unsafe { module.get::<unsafe extern "C" fn(i32, i32) -> i32>("add")? };
//! assert_eq!(unsafe { add(2, 3) }, 5);
//! # Ok::<(), expression_debugger::CompilerError>(())
//! ```

/// Toolchain backends and the backend registry
pub mod backend;

/// Session options
pub mod config;

/// Diagnostics reported by toolchains
pub mod diagnostic;

pub mod error;

/// Argument screening and build ledger
pub mod guard;

/// Source units
pub mod input;

pub mod loader;
pub mod logging;
pub mod session;
pub mod symbols;
pub mod toolchain;

pub use backend::{BackendKind, CompileRequest, CompilerBackend, EmitResult, ModuleReference};
pub use config::{CompilationOptions, OptimizationLevel};
pub use diagnostic::{CompilationError, Diagnostic, Location, Severity, SYNTAX_CODE};
pub use error::{CompilerError, Result};
pub use input::SourceUnit;
pub use libloading::Symbol;
pub use loader::{DefaultLoader, LoadedModule, ModuleLoader};
pub use session::ExpressionCompiler;
pub use symbols::SymbolImage;
pub use toolchain::Toolchain;
