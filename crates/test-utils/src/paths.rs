//! Path utilities for locating workspace configuration and scratch files.

use std::io::Write;
use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the path of a file under the workspace `config/` directory.
pub fn config_file(name: &str) -> PathBuf {
    workspace_root().join("config").join(name)
}

/// Writes `contents` to a temporary `.yaml` file that is removed on drop.
pub fn temp_yaml_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temporary YAML file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary YAML file");
    file
}
