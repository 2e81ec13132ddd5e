// Reject lint-suppression attributes ("#[" + "allow" + ... ) in scoped sources.
// Runs on every build so a suppression cannot slip in through a test file either.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    // Skip when explicitly disabled (e.g., SCOPED_CHECK_NO_ALLOW=0).
    if env::var("SCOPED_CHECK_NO_ALLOW")
        .map(|v| v == "0")
        .unwrap_or(false)
    {
        return;
    }

    println!("cargo:rerun-if-env-changed=SCOPED_CHECK_NO_ALLOW");
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=tests");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let mut violations = Vec::new();
    for relative in ["src", "tests"] {
        let path = manifest_dir.join(relative);
        if path.exists() {
            scan_path(&path, &mut violations);
        }
    }

    if violations.is_empty() {
        return;
    }

    eprintln!("ERROR: disallowed allow-attributes detected in scoped:");
    for (file, line, content) in violations {
        eprintln!("  {}:{}: {}", file.display(), line, content.trim());
    }
    panic!("lint suppression attributes are forbidden");
}

fn scan_path(path: &Path, violations: &mut Vec<(PathBuf, usize, String)>) {
    if path.is_dir() {
        if path.ends_with("target") {
            return;
        }
        for entry in fs::read_dir(path).expect("read dir") {
            let entry = entry.expect("dir entry");
            scan_path(&entry.path(), violations);
        }
        return;
    }

    if path.extension().map_or(true, |ext| ext != "rs") {
        return;
    }

    if let Ok(content) = fs::read_to_string(path) {
        for (idx, line) in content.lines().enumerate() {
            if line.contains("#[allow") || line.contains("#![allow") {
                violations.push((path.to_path_buf(), idx + 1, line.to_string()));
            }
        }
    }
}
