mod common;

use common::fixture_module_path;
use native_bridge::domain::ports::HarnessSettings;
use native_bridge::utils::validation::Validate;
use native_bridge::{BindScope, BridgeError, Coordinate2D, Harness, HarnessReport, TomlConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_for_fixture(extra: &str) -> TomlConfig {
    let path = fixture_module_path().display().to_string().replace('\\', "/");
    let toml_content = format!(
        r#"
[module]
path = "{path}"
scope = "local"
symbol = "swap"
input = {{ x = 1.0, y = 2.0 }}
{extra}
"#
    );

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml_content.as_bytes()).unwrap();

    let config = TomlConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    config
}

#[test]
fn test_binding_run_reports_swapped_coordinates() {
    let harness = Harness::new(config_for_fixture(""));
    // SAFETY: the fixture's swap is a coordinate transform.
    let report = unsafe { harness.run_binding() }.unwrap();

    assert_eq!(report.symbol, "swap");
    assert_eq!(report.scope, BindScope::Local);
    assert_eq!(report.input, Coordinate2D::new(1.0, 2.0));
    assert_eq!(report.output, Coordinate2D::new(2.0, 1.0));
    assert_eq!(report.module, harness.settings().module_path().unwrap());
}

#[test]
fn test_unknown_symbol_fails_binding() {
    let mut config = config_for_fixture("");
    config.module.symbol = "rotate".to_string();

    let err = unsafe { Harness::new(config).run_binding() }.unwrap_err();
    assert!(matches!(err, BridgeError::Resolve(ref e) if e.symbol_name == "rotate"));
    assert_eq!(err.exit_code(), 1);
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos"))]
#[test]
fn test_full_report_serializes() {
    let harness = Harness::new(config_for_fixture("[syscall]\nargs = []\n"));
    let report = HarnessReport {
        binding: Some(unsafe { harness.run_binding() }.unwrap()),
        syscall: Some(unsafe { harness.run_syscall() }.unwrap()),
    };

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["binding"]["output"]["x"], 2.0);
    assert_eq!(json["binding"]["scope"], "local");
    assert_eq!(json["syscall"]["result"], std::process::id() as i64);
    assert_eq!(json["syscall"]["verified"], true);

    let text = report.to_string();
    assert!(text.contains("swap(1, 2)"));
    assert!(text.contains("= (2, 1)"));
}

#[cfg(any(target_os = "linux", target_os = "android"))]
#[test]
fn test_failing_syscall_surfaces_errno() {
    let config = config_for_fixture(&format!(
        "[syscall]\nnumber = {}\nargs = [-1]\n",
        libc::SYS_close
    ));

    let err = unsafe { Harness::new(config).run_syscall() }.unwrap_err();
    match err {
        BridgeError::Syscall(ref e) => assert_eq!(e.code, libc::EBADF),
        other => panic!("expected a syscall error, got {other}"),
    }
    assert_eq!(err.exit_code(), 3);
}
