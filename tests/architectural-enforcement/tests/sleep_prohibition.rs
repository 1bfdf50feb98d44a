//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Sequencing is
//! driven by completion signals, never by waiting a guessed amount of time.
//!
//! **Exceptions**: The timer engine's animation timer (it is the clock that
//! stands in for a renderer), and test code.

use std::path::Path;

use architectural_enforcement::{rust_sources, SourceFile};

/// The one file allowed to wait on a timer
const ANIMATION_TIMER_FILE: &str = "animation/clock.rs";

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - The animation timer in the timer engine");
        eprintln!("  - Test code (#[cfg(test)] modules and tests/ directories)");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleeping until a phase 'should' be done (wait for its completion)");
        eprintln!("  - Sleep as poor man's synchronization");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// The scan must actually find the sources it polices
#[test]
fn test_scan_covers_the_core() {
    let core = rust_sources("conductor/core/src");
    assert!(
        core.iter().any(|f| f.path.ends_with("conductor.rs")),
        "conductor/core/src not found from the workspace root"
    );
    assert!(core
        .iter()
        .any(|f| f.path.ends_with(Path::new(ANIMATION_TIMER_FILE))));
}

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();

    for dir in ["conductor/core/src", "conductor/demo/src"] {
        for file in rust_sources(dir) {
            check_file(&file, &mut violations);
        }
    }

    violations
}

fn check_file(file: &SourceFile, violations: &mut Vec<String>) {
    for (line_number, code) in file.production_lines() {
        if !(code.contains("::sleep(") || code.contains(".sleep(")) {
            continue;
        }

        if file.path.ends_with(Path::new(ANIMATION_TIMER_FILE))
            && is_animation_timer_context(&file.lines, line_number - 1)
        {
            continue;
        }

        violations.push(format!(
            "{}:{} - {}",
            file.path.display(),
            line_number,
            code.trim()
        ));
    }
}

/// Check if sleep waits out an animation transition
fn is_animation_timer_context(lines: &[String], current_idx: usize) -> bool {
    let context_range = current_idx.saturating_sub(5)..current_idx;
    lines[context_range]
        .iter()
        .any(|line| line.to_lowercase().contains("animation timer"))
}
