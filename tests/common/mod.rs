use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;

/// Shared library built from `fixtures/coordinate-module`.
///
/// Cargo drops it next to the test executables in `target/<profile>/deps`,
/// and sometimes also one level up.
pub fn fixture_module_path() -> PathBuf {
    let stem = format!("{}coordinate_module", DLL_PREFIX);
    let exe = std::env::current_exe().expect("test executable path");
    let deps = exe.parent().expect("test executable directory");

    let mut dirs = vec![deps.to_path_buf()];
    if let Some(profile) = deps.parent() {
        dirs.push(profile.to_path_buf());
    }

    for dir in &dirs {
        let exact = dir.join(format!("{}{}", stem, DLL_SUFFIX));
        if exact.exists() {
            return exact;
        }
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&stem) && name.ends_with(DLL_SUFFIX) {
                return entry.path();
            }
        }
    }

    panic!("coordinate-module shared library not found in {:?}", dirs);
}
