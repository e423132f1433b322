//! Structural tests for layer boundary enforcement.
//!
//! These tests scan source files so the layering stays intact as the crate
//! grows.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Non-comment lines that are not inside a `#[cfg(test)]` module.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut test_depth: Option<i32> = None;
    let mut pending_cfg_test = false;
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(test)]") || trimmed.starts_with("#[cfg(all(test") {
            pending_cfg_test = true;
        }
        let in_test = test_depth.is_some() || pending_cfg_test;
        if !in_test && !trimmed.starts_with("//") && !trimmed.is_empty() {
            out.push((i + 1, line.to_string()));
        }
        for ch in line.chars() {
            match ch {
                '{' => {
                    if pending_cfg_test {
                        test_depth = Some(depth);
                        pending_cfg_test = false;
                    }
                    depth += 1;
                }
                '}' => {
                    depth -= 1;
                    if test_depth == Some(depth) {
                        test_depth = None;
                    }
                }
                _ => {}
            }
        }
        // `#[cfg(test)] mod foo;` has no body.
        if pending_cfg_test && trimmed.ends_with(';') && !trimmed.starts_with("#[") {
            pending_cfg_test = false;
        }
    }
    out
}

fn src() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

fn violations(dir: &Path, forbidden: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for file in collect_rs_files(dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (lineno, line) in production_lines(&file) {
            for needle in forbidden {
                if line.contains(needle) {
                    found.push(format!("{rel}:{lineno}: `{needle}`: {}", line.trim()));
                }
            }
        }
    }
    found
}

#[test]
fn domain_is_pure() {
    let found = violations(
        &src().join("domain"),
        &[
            "crate::application",
            "crate::infra",
            "crate::commands",
            "crate::output",
            "tokio::",
            "std::fs",
            "std::process",
            "std::net",
        ],
    );
    assert!(found.is_empty(), "domain/ must stay pure:\n{}", found.join("\n"));
}

#[test]
fn application_depends_only_on_domain_and_ports() {
    let found = violations(
        &src().join("application"),
        &["crate::infra", "crate::commands", "crate::output", "std::fs"],
    );
    assert!(
        found.is_empty(),
        "application/ must not reach into outer layers:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let found = violations(&src().join("infra"), &["crate::commands", "crate::output"]);
    assert!(
        found.is_empty(),
        "infra/ must not import presentation code:\n{}",
        found.join("\n")
    );
}

#[test]
fn command_runner_is_constructed_only_in_infra_or_app() {
    let mut found = Vec::new();
    for dir in ["application", "commands", "domain", "output"] {
        found.extend(violations(
            &src().join(dir),
            &["TokioCommandRunner::new", "TokioCommandRunner::default"],
        ));
    }
    assert!(
        found.is_empty(),
        "process runners are wired in app.rs only:\n{}",
        found.join("\n")
    );
}
