//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code outside the animation timer
//! - No unwrap()/expect() in the core library outside tests
//!
//! The helpers below are shared by the tests in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root (two levels above this crate)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// A Rust source file loaded for scanning
pub struct SourceFile {
    /// Path to the file
    pub path: PathBuf,
    /// File contents split into lines
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Index of the first line of a `#[cfg(test)]` block, if any
    ///
    /// Everything from that line on is treated as test code. The crates in
    /// this workspace keep their unit tests at the bottom of each file.
    #[must_use]
    pub fn test_section_start(&self) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.trim_start().starts_with("#[cfg(test)]"))
    }

    /// Lines before the test section, with comments stripped
    pub fn production_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        let end = self.test_section_start().unwrap_or(self.lines.len());
        self.lines[..end]
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx + 1, code_part(line)))
    }
}

/// The part of a line before any `//` comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Load every `.rs` file under `dir` (relative to the workspace root)
///
/// Missing directories yield an empty list.
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root().join(dir);
    if !root.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|entry| {
            let content = fs::read_to_string(entry.path()).ok()?;
            Some(SourceFile {
                path: entry.path().to_path_buf(),
                lines: content.lines().map(str::to_string).collect(),
            })
        })
        .collect()
}
