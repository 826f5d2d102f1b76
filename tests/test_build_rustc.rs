// CLASSIFICATION: COMMUNITY
// Filename: test_build_rustc.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::path::Path;

use expression_debugger::{
    BackendKind, CompilationOptions, CompilerError, ExpressionCompiler, Severity, Toolchain,
    SYNTAX_CODE,
};

const ADD: &str = "#[no_mangle]\npub extern \"C\" fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n";

fn have_rustc() -> bool {
    if Toolchain::rustc().is_ok() {
        return true;
    }
    eprintln!("skipping: rustc not available");
    false
}

fn value_unit(k: i32) -> String {
    format!("#[no_mangle]\npub extern \"C\" fn value() -> i32 {{ {k} }}\n")
}

fn rust_options() -> CompilationOptions {
    CompilationOptions {
        backend: Some(BackendKind::Rustc),
        ..Default::default()
    }
}

#[test]
fn add_two_numbers() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    if !have_rustc() {
        return Ok(());
    }
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit(ADD, "A.rs")?;
    let module = session.build(&[])?;
    let add = unsafe { module.get::<unsafe extern "C" fn(i32, i32) -> i32>("add")? };
    assert_eq!(unsafe { add(2, 3) }, 5);
    assert_eq!(module.embedded_source(Path::new("A.rs")), Some(ADD));
    Ok(())
}

#[test]
fn constant_literal_round_trips() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let mut session = ExpressionCompiler::new(rust_options());
    let unit = "#[no_mangle]\npub extern \"C\" fn answer() -> i64 { 4_200_000_000 }\n";
    session.add_unit(unit, "K.rs")?;
    let module = session.build(&[])?;
    let answer = unsafe { module.get::<unsafe extern "C" fn() -> i64>("answer")? };
    assert_eq!(unsafe { answer() }, 4_200_000_000);
    Ok(())
}

#[test]
fn units_resolve_each_other() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit("pub fn helper() -> i32 { 40 }\n", "A.rs")?;
    session.add_unit(
        "#[no_mangle]\npub extern \"C\" fn answer() -> i32 { crate::a::helper() + 2 }\n",
        "B.rs",
    )?;
    let module = session.build(&[])?;
    let answer = unsafe { module.get::<unsafe extern "C" fn() -> i32>("answer")? };
    assert_eq!(unsafe { answer() }, 42);
    Ok(())
}

#[test]
fn syntax_error_fails_build() {
    if !have_rustc() {
        return;
    }
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit("pub fn broken( -> i32 { 1 }\n", "A.rs").unwrap();
    let err = session.build(&[]).unwrap_err();
    let CompilerError::Compilation(failure) = &err else {
        panic!("expected compilation failure, got {err}");
    };
    assert!(!failure.is_empty());
    assert!(failure.diagnostics().iter().all(|d| d.severity == Severity::Error));
    let syntax = format!("{SYNTAX_CODE}: ");
    assert!(err.to_string().lines().any(|l| l.starts_with(&syntax)), "{err}");
    let location = failure.diagnostics()[0].location.as_ref().unwrap();
    assert!(location.path.ends_with("A.rs"));
    assert!(!err.to_string().contains("aborting due to"));
}

#[test]
fn unclosed_delimiter_is_a_syntax_error() {
    if !have_rustc() {
        return;
    }
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit("pub fn open() -> i32 {\n    1\n", "A.rs").unwrap();
    let err = session.build(&[]).unwrap_err();
    assert_eq!(err.diagnostics()[0].code.as_deref(), Some(SYNTAX_CODE), "{err}");
}

#[test]
fn same_stem_in_different_directories() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit("#[no_mangle]\npub extern \"C\" fn left() -> i32 { 1 }\n", "x/A.rs")?;
    session.add_unit("#[no_mangle]\npub extern \"C\" fn right() -> i32 { 2 }\n", "y/A.rs")?;
    session.add_unit(
        "pub fn both() -> i32 { crate::a::left() + crate::a_1::right() }\n",
        "a.rs",
    )?;
    let modules: Vec<&str> = session.units().iter().map(|u| u.module()).collect();
    assert_eq!(modules, ["a", "a_1", "a_2"]);
    let module = session.build(&[])?;
    let left = unsafe { module.get::<unsafe extern "C" fn() -> i32>("left")? };
    let right = unsafe { module.get::<unsafe extern "C" fn() -> i32>("right")? };
    assert_eq!(unsafe { (left(), right()) }, (1, 2));
    assert!(module.embedded_source(Path::new("y/A.rs")).unwrap().contains("right"));
    Ok(())
}

#[test]
fn type_error_carries_code() {
    if !have_rustc() {
        return;
    }
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit("pub fn f() -> i32 { \"no\" }\n", "A.rs").unwrap();
    let err = session.build(&[]).unwrap_err();
    assert!(err.to_string().lines().any(|l| l.starts_with("E0308: ")), "{err}");
}

#[test]
fn warnings_do_not_fail_or_surface() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let unit = format!("{ADD}\npub fn noisy() {{ let unused = 1; }}\n");
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit(&unit, "A.rs")?;
    let module = session.build(&[])?;
    let add = unsafe { module.get::<unsafe extern "C" fn(i32, i32) -> i32>("add")? };
    assert_eq!(unsafe { add(1, 1) }, 2);
    Ok(())
}

#[test]
fn warnings_as_errors_fail_build() {
    if !have_rustc() {
        return;
    }
    let options = CompilationOptions {
        warnings_as_errors: true,
        ..rust_options()
    };
    let mut session = ExpressionCompiler::new(options);
    session
        .add_unit("pub fn noisy() { let unused = 1; }\n", "A.rs")
        .unwrap();
    let err = session.build(&[]).unwrap_err();
    let diags = err.diagnostics();
    assert!(!diags.is_empty());
    assert!(diags.iter().any(|d| d.warning_as_error));
    assert!(err.to_string().contains("unused_variables"), "{err}");
}

#[test]
fn release_and_debug_agree() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let unit = "#[no_mangle]\npub extern \"C\" fn fib(n: u32) -> u64 {\n    let (mut a, mut b) = (0u64, 1u64);\n    for _ in 0..n { let t = a + b; a = b; b = t; }\n    a\n}\n";
    let mut results = Vec::new();
    for is_release in [false, true] {
        let mut session = ExpressionCompiler::new(CompilationOptions {
            is_release,
            ..rust_options()
        });
        session.add_unit(unit, "F.rs")?;
        let module = session.build(&[])?;
        assert_eq!(module.symbols().optimized, is_release);
        let fib = unsafe { module.get::<unsafe extern "C" fn(u32) -> u64>("fib")? };
        results.push(unsafe { fib(50) });
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], 12_586_269_025);
    Ok(())
}

#[test]
fn empty_session_builds_empty_module() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let module = ExpressionCompiler::new(rust_options()).build(&[])?;
    assert!(module.documents().is_empty());
    assert!(unsafe { module.get::<unsafe extern "C" fn()>("add") }.is_err());
    Ok(())
}

#[test]
fn duplicate_filename_is_flagged() {
    if !have_rustc() {
        return;
    }
    let mut session = ExpressionCompiler::new(rust_options());
    session.add_unit(ADD, "A.rs").unwrap();
    session.add_unit("pub fn other() {}\n", "A.rs").unwrap();
    let err = session.build(&[]).unwrap_err();
    assert!(err.to_string().starts_with("XD0001: "), "{err}");
}

#[test]
fn sessions_load_independent_modules() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let mut modules = Vec::new();
    for k in [7, 11] {
        let mut session = ExpressionCompiler::new(rust_options());
        session.add_unit(&value_unit(k), "V.rs")?;
        modules.push(session.build(&[])?);
    }
    assert_ne!(modules[0].name(), modules[1].name());
    let first = unsafe { modules[0].get::<unsafe extern "C" fn() -> i32>("value")? };
    let second = unsafe { modules[1].get::<unsafe extern "C" fn() -> i32>("value")? };
    assert_eq!(unsafe { (first(), second()) }, (7, 11));
    Ok(())
}

#[cfg(target_os = "linux")]
fn memfd_open(module: &str) -> bool {
    let needle = format!("memfd:{module}");
    std::fs::read_dir("/proc/self/fd")
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|entry| std::fs::read_link(entry.path()).ok())
        .any(|target| target.to_string_lossy().contains(&needle))
}

#[cfg(target_os = "linux")]
#[test]
fn dropped_module_releases_its_image() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    for k in [3, 4, 5] {
        let mut session = ExpressionCompiler::new(rust_options());
        session.add_unit(&value_unit(k), "V.rs")?;
        let module = session.build(&[])?;
        let name = module.name().to_string();
        assert!(memfd_open(&name));
        {
            let value = unsafe { module.get::<unsafe extern "C" fn() -> i32>("value")? };
            assert_eq!(unsafe { value() }, k);
        }
        drop(module);
        assert!(!memfd_open(&name), "image of {name} still open");
    }
    Ok(())
}

#[test]
fn toolchain_reports_version() -> anyhow::Result<()> {
    if !have_rustc() {
        return Ok(());
    }
    let version = Toolchain::rustc()?.version()?;
    assert!(version.starts_with("rustc "), "{version}");
    Ok(())
}
