//! Integration Test: Unwrap Prohibition
//!
//! **Policy**: The core library propagates errors with `?` and typed error
//! enums. `unwrap()` and `expect()` belong in tests only.
//!
//! Doc comments are skipped along with every other comment, so doc examples
//! may unwrap.

use architectural_enforcement::rust_sources;

#[test]
fn test_no_unwrap_in_core_library() {
    let mut violations = Vec::new();

    for file in rust_sources("conductor/core/src") {
        for (line_number, code) in file.production_lines() {
            if code.contains(".unwrap()") || code.contains(".expect(") {
                violations.push(format!(
                    "{}:{} - {}",
                    file.path.display(),
                    line_number,
                    code.trim()
                ));
            }
        }
    }

    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!(
            "\nFound {} unwrap/expect call(s) in conductor/core/src outside tests.\n\
             Return a ChoreographyError or ConfigError instead.",
            violations.len()
        );
    }
}
