//! Project file scanner: walks a source tree and yields the files eligible
//! for chunking, skipping build artifacts, vendor trees, and binary assets.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names excluded anywhere in the path, mirroring the original
/// implementation's exclusion list.
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".venv",
    "venv",
    "__pycache__",
    "node_modules",
    "target",
    "build",
    "dist",
    "out",
    ".mypy_cache",
    ".pytest_cache",
    ".idea",
    ".vscode",
];

/// Extensions never worth chunking regardless of grammar support: binary,
/// media, and lockfile-style generated artifacts.
const EXCLUDED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "svg", "webp", "pdf", "zip", "tar", "gz", "lock", "woff",
    "woff2", "ttf", "eot", "exe", "dll", "so", "dylib", "class", "o", "a", "bin",
];

fn is_excluded_dir_component(path: &Path) -> bool {
    path.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        EXCLUDED_DIRS.contains(&s.as_ref())
    })
}

fn is_excluded_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXCLUDED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively lists every file under `root` eligible for chunking.
pub fn scan_project_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_excluded_dir_component(path) || is_excluded_extension(path) {
            continue;
        }
        out.push(path.to_path_buf());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_known_vendor_directories() {
        assert!(is_excluded_dir_component(Path::new("proj/node_modules/pkg/index.js")));
        assert!(is_excluded_dir_component(Path::new("proj/target/debug/out.o")));
        assert!(!is_excluded_dir_component(Path::new("proj/src/main.rs")));
    }

    #[test]
    fn excludes_binary_extensions() {
        assert!(is_excluded_extension(Path::new("logo.png")));
        assert!(!is_excluded_extension(Path::new("main.rs")));
    }
}
