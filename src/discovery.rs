//! Project file discovery.
//!
//! Recursively scans a project directory for compilable sources and, for
//! project builds, mirrors everything else (images, JSON, media) into the
//! build tree untouched.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use std::collections::HashSet;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{CompileError, CompileResult};

lazy_static! {
    /// Directories never descended into, neither for sources nor resources.
    static ref EXCLUDED_DIRS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("node_modules");
        s.insert(".git");
        s.insert(".idea");
        s.insert(".vscode");
        s.insert("dist");
        s.insert("build");
        s.insert("target");
        s.insert("__pycache__");
        s.insert(".hg");
        s.insert(".svn");
        s
    };

    /// Extensions handled by the compiler, or derived from it. Resources
    /// are everything else.
    static ref SOURCE_EXTENSIONS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("ets");
        s.insert("ts");
        s.insert("tsx");
        s.insert("jsx");
        s.insert("map");
        s
    };
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| EXCLUDED_DIRS.contains(name))
            .unwrap_or(false)
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Finds `.ets` and `.ts` files under a root, excluded directories pruned.
#[derive(Debug, Default)]
pub struct SourceFileFinder;

impl SourceFileFinder {
    pub fn new() -> Self {
        Self
    }

    /// All compilable sources under `root`, sorted by path so batch order
    /// is stable across platforms.
    pub fn find(&self, root: &Path) -> CompileResult<Vec<PathBuf>> {
        if !root.exists() {
            return Err(CompileError::malformed(format!(
                "project path does not exist: {}",
                root.display()
            )));
        }

        let mut sources = Vec::new();
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e))
        {
            let entry = entry.map_err(|e| CompileError::malformed(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            match extension_of(entry.path()) {
                Some("ets") | Some("ts") => sources.push(entry.path().to_path_buf()),
                _ => {}
            }
        }
        sources.sort();
        debug!(root = %root.display(), count = sources.len(), "discovered sources");
        Ok(sources)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOURCE COPYING
// ═══════════════════════════════════════════════════════════════════════════════

/// Copies non-source files from the project tree into the build tree,
/// preserving relative structure.
#[derive(Debug, Default)]
pub struct ResourceFileCopier;

impl ResourceFileCopier {
    pub fn new() -> Self {
        Self
    }

    fn is_resource(path: &Path) -> bool {
        match extension_of(path) {
            Some(ext) => !SOURCE_EXTENSIONS.contains(ext),
            None => true,
        }
    }

    /// Copy every resource file under `source_root` to the same relative
    /// path under `build_root`. Returns the number of files copied.
    pub fn copy_all(&self, source_root: &Path, build_root: &Path) -> CompileResult<usize> {
        let mut copied = 0usize;
        for entry in WalkDir::new(source_root)
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e))
        {
            let entry = entry.map_err(|e| CompileError::malformed(e.to_string()))?;
            if !entry.file_type().is_file() || !Self::is_resource(entry.path()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(source_root)
                .map_err(|e| CompileError::malformed(e.to_string()))?;
            let target = build_root.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target).map_err(|source| CompileError::Write {
                path: target.clone(),
                source,
            })?;
            copied += 1;
        }
        debug!(count = copied, "copied resources");
        Ok(copied)
    }
}

/// Output path for one source file: same relative location under the build
/// root, extension rewritten to `.js`.
pub fn mirrored_output_path(
    source: &Path,
    source_root: &Path,
    build_root: &Path,
) -> CompileResult<PathBuf> {
    let relative = source
        .strip_prefix(source_root)
        .map_err(|e| CompileError::malformed(e.to_string()))?;
    Ok(build_root.join(relative).with_extension("js"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_finds_nested_sources_and_skips_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("pages/Index.ets"));
        touch(&dir.path().join("common/util.ts"));
        touch(&dir.path().join("node_modules/dep/index.ets"));
        touch(&dir.path().join("assets/logo.png"));

        let found = SourceFileFinder::new().find(dir.path()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["common/util.ts", "pages/Index.ets"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(SourceFileFinder::new().find(&missing).is_err());
    }

    #[test]
    fn test_copier_counts_only_resources() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        touch(&src.path().join("pages/Index.ets"));
        touch(&src.path().join("resources/icon.png"));
        touch(&src.path().join("module.json5"));
        touch(&src.path().join("old.js.map"));
        touch(&src.path().join(".git/config"));

        let copied = ResourceFileCopier::new()
            .copy_all(src.path(), out.path())
            .unwrap();
        assert_eq!(copied, 2);
        assert!(out.path().join("resources/icon.png").exists());
        assert!(out.path().join("module.json5").exists());
        assert!(!out.path().join("pages/Index.ets").exists());
        assert!(!out.path().join("old.js.map").exists());
    }

    #[test]
    fn test_mirrored_output_path_rewrites_extension() {
        let path = mirrored_output_path(
            Path::new("/proj/pages/Index.ets"),
            Path::new("/proj"),
            Path::new("/build"),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/build/pages/Index.js"));
    }
}
