use std::fs;
use std::process::Command;

use acorn::compile;
use acorn::util::config::CompilerConfig;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> CompilerConfig {
    CompilerConfig {
        cache_dir: dir.path().join("build"),
        output: dir.path().join("prog"),
        style_checks: false,
        dump_on_error: false,
        ..CompilerConfig::default()
    }
}

fn have_c_compiler(config: &CompilerConfig) -> bool {
    Command::new(&config.c_compiler)
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

const SUM: &str = "// sum of 0..9, less three\n\
                   let main() -> i32 {\n\
                       let total: i32 = 0;\n\
                       let i: i32 = 0;\n\
                       while i < 10 { total += i; i += 1; }\n\
                       return total - 3;\n\
                   }\n";

#[test]
fn test_emit_c_only() {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("main.oak");
    fs::write(&main, SUM).unwrap();
    let config = CompilerConfig {
        emit_only: true,
        ..config_in(&dir)
    };

    let output = compile(&config, &[main]).unwrap();
    assert_eq!(output.binary, None);
    let c = fs::read_to_string(output.c_path).unwrap();
    assert!(c.contains("while (i < 10)"));
    assert!(c.contains("return (total - 3);"));
}

#[test]
fn test_build_and_run() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    if !have_c_compiler(&config) {
        eprintln!("skipping: no C compiler");
        return;
    }
    let main = dir.path().join("main.oak");
    fs::write(&main, SUM).unwrap();

    let output = compile(&config, &[main]).unwrap();
    let binary = output.binary.unwrap();
    let status = Command::new(&binary).status().unwrap();
    assert_eq!(status.code(), Some(42));
}

#[test]
fn test_c_compiler_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let main = dir.path().join("main.oak");
    fs::write(&main, "raw_c!(\"this is not C\");\nlet main() -> i32 { return 0; }\n").unwrap();
    let config = config_in(&dir);
    if !have_c_compiler(&config) {
        return;
    }

    let err = compile(&config, &[main]).unwrap_err();
    assert!(format!("{:#}", err).contains("failed"));
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let err = compile(&config_in(&dir), &[dir.path().join("nope.oak")]).unwrap_err();
    assert!(format!("{:#}", err).contains("nope.oak"));
}
