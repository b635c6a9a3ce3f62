//! Directory aggregation pipeline.
//!
//! Walks a directory, filters source files by suffix, builds a registry per
//! file and merges everything into a [`CombinedRegistry`]. Failures on
//! individual files are collected, never fatal.

use crate::extractor::{extract_from_tree, ExtractOptions};
use crate::parser::JavaScriptParser;
use crate::registry::{CombinedRegistry, FileRegistry};
use ignore::{Walk, WalkBuilder};
use methodref_core::{
    has_source_suffix, CollisionPolicy, MethodRefConfig, MethodRefError, ScanConfig,
};
use std::path::{Path, PathBuf};

/// A file that could not be read, parsed or registered.
#[derive(Debug)]
pub struct FileFailure {
    /// The failing file, or the root for walk errors without a path.
    pub path: PathBuf,
    pub error: MethodRefError,
}

/// Result of indexing a directory.
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    /// Every record found, keyed by qualified name.
    pub registry: CombinedRegistry,
    /// Files that were skipped because of an error.
    pub failures: Vec<FileFailure>,
    /// Number of source files discovered.
    pub files_scanned: usize,
    /// Number of source files successfully registered.
    pub files_indexed: usize,
    /// Number of source files recorded in `failures`.
    pub files_failed: usize,
    /// Total records merged into the registry.
    pub total_symbols: usize,
}

impl DirectoryIndex {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// The main indexing pipeline.
pub struct Indexer {
    parser: JavaScriptParser,
    scan: ScanConfig,
    options: ExtractOptions,
    policy: CollisionPolicy,
}

impl Indexer {
    /// Create an Indexer with default settings.
    pub fn new() -> Result<Self, MethodRefError> {
        Self::with_config(&MethodRefConfig::default())
    }

    pub fn with_config(config: &MethodRefConfig) -> Result<Self, MethodRefError> {
        Ok(Self {
            parser: JavaScriptParser::new()?,
            scan: config.scan.clone(),
            options: ExtractOptions::from(&config.extract),
            policy: config.extract.collision_policy,
        })
    }

    pub fn scan_config(&self) -> &ScanConfig {
        &self.scan
    }

    /// Read, parse and register a single file.
    pub fn index_file(&mut self, path: &Path) -> Result<FileRegistry, MethodRefError> {
        let content = std::fs::read(path).map_err(|e| MethodRefError::io(path, e))?;
        let source = String::from_utf8_lossy(&content).into_owned();
        let tree = self.parser.parse(source, path)?;
        FileRegistry::from_records(path, extract_from_tree(&tree, &self.options), self.policy)
    }

    /// Index every source file under `root`.
    ///
    /// Fails only when `root` itself is missing or not a directory.
    pub fn index_directory(&mut self, root: &Path) -> Result<DirectoryIndex, MethodRefError> {
        let mut result = DirectoryIndex::default();

        for entry in SourceFiles::new(root, &self.scan)? {
            let path = match entry {
                Ok(path) => path,
                Err(error) => {
                    tracing::warn!("{}", error);
                    result.failures.push(FileFailure {
                        path: error.path().unwrap_or(root).to_path_buf(),
                        error,
                    });
                    continue;
                }
            };

            result.files_scanned += 1;

            match self.index_file(&path) {
                Ok(registry) => {
                    result.files_indexed += 1;
                    result.total_symbols += registry.len();
                    result.registry.merge(registry);
                }
                Err(error) => {
                    tracing::warn!("Skipping {}: {}", path.display(), error);
                    result.files_failed += 1;
                    result.failures.push(FileFailure { path, error });
                }
            }
        }

        tracing::info!(
            "Indexed {}: {} scanned, {} indexed, {} failed, {} symbols, {} keys",
            root.display(),
            result.files_scanned,
            result.files_indexed,
            result.files_failed,
            result.total_symbols,
            result.registry.len(),
        );

        Ok(result)
    }
}

/// Every source file under `root`, depth first.
///
/// Entries that cannot be walked are logged and left out.
pub fn list_source_files(root: &Path, scan: &ScanConfig) -> Result<Vec<PathBuf>, MethodRefError> {
    Ok(SourceFiles::new(root, scan)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::warn!("{}", error);
                None
            }
        })
        .collect())
}

/// Index `root` with the default configuration.
pub fn build_directory_registry(root: &Path) -> Result<DirectoryIndex, MethodRefError> {
    Indexer::new()?.index_directory(root)
}

// ── Source File Walk ───────────────────────────────────────────────────────

/// Iterative depth-first walk yielding source files.
struct SourceFiles {
    walker: Walk,
    suffix: String,
}

impl SourceFiles {
    fn new(root: &Path, scan: &ScanConfig) -> Result<Self, MethodRefError> {
        let metadata = std::fs::metadata(root).map_err(|e| MethodRefError::io(root, e))?;
        if !metadata.is_dir() {
            return Err(MethodRefError::io(
                root,
                std::io::Error::other("not a directory"),
            ));
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .hidden(!scan.include_hidden)
            .ignore(scan.respect_gitignore)
            .git_ignore(scan.respect_gitignore)
            .git_global(scan.respect_gitignore)
            .git_exclude(scan.respect_gitignore)
            .parents(scan.respect_gitignore)
            .require_git(false)
            .follow_links(scan.follow_links);

        if !scan.ignore_dirs.is_empty() {
            let ignore_dirs = scan.ignore_dirs.clone();
            builder.filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && ignore_dirs.iter().any(|name| entry.file_name() == name.as_str()))
            });
        }

        Ok(Self {
            walker: builder.build(),
            suffix: scan.suffix.clone(),
        })
    }
}

impl Iterator for SourceFiles {
    type Item = Result<PathBuf, MethodRefError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(MethodRefError::Walk(err.to_string()))),
            };

            // Skip directories
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if has_source_suffix(path, &self.suffix) {
                return Some(Ok(path.to_path_buf()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn index_temp_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.js", "function main() {}\n");
        write(dir.path(), "lib.js", "class Config { load() {} }\n");
        write(dir.path(), "readme.txt", "function notJs() {}");

        let mut indexer = Indexer::new().unwrap();
        let result = indexer.index_directory(dir.path()).unwrap();

        assert_eq!(result.files_scanned, 2, "Should scan 2 .js files");
        assert_eq!(result.files_indexed, 2);
        assert_eq!(result.total_symbols, 2);
        assert_eq!(result.files_failed, 0);
        assert!(!result.has_failures());
        assert!(result.registry.contains_key("Global.main"));
        assert!(result.registry.contains_key("Config.load"));
        assert!(!result.registry.contains_key("Global.notJs"));
    }

    #[test]
    fn lists_only_suffix_matches() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.js", "");
        write(dir.path(), "a.json", "{}");
        write(dir.path(), "a.ts", "");
        let nested = write(dir.path(), "x/y/z/deep.js", "");

        let mut files = list_source_files(dir.path(), &ScanConfig::default()).unwrap();
        files.sort();
        let mut expected = vec![a, nested];
        expected.sort();
        assert_eq!(files, expected);
    }

    #[test]
    fn hidden_files_are_visited_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".config/setup.js", "function setup() {}");

        let files = list_source_files(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(files.len(), 1);

        let scan = ScanConfig {
            include_hidden: false,
            ..ScanConfig::default()
        };
        assert!(list_source_files(dir.path(), &scan).unwrap().is_empty());
    }

    #[test]
    fn ignore_dirs_are_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/app.js", "");
        write(dir.path(), "node_modules/pkg/index.js", "");

        let scan = ScanConfig {
            ignore_dirs: vec!["node_modules".to_string()],
            ..ScanConfig::default()
        };
        let files = list_source_files(dir.path(), &scan).unwrap();
        assert_eq!(files, vec![dir.path().join("src/app.js")]);
    }

    #[test]
    fn gitignore_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", "build/\n");
        write(dir.path(), "build/out.js", "");
        write(dir.path(), "src.js", "");

        let all = list_source_files(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(all.len(), 2);

        let scan = ScanConfig {
            respect_gitignore: true,
            ..ScanConfig::default()
        };
        let filtered = list_source_files(dir.path(), &scan).unwrap();
        assert_eq!(filtered, vec![dir.path().join("src.js")]);
    }

    #[test]
    fn custom_suffix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.js", "function a() {}");
        write(dir.path(), "b.mjs", "function b() {}");

        let config = MethodRefConfig {
            scan: ScanConfig {
                suffix: ".mjs".to_string(),
                ..ScanConfig::default()
            },
            ..MethodRefConfig::default()
        };
        let result = Indexer::with_config(&config)
            .unwrap()
            .index_directory(dir.path())
            .unwrap();
        let keys: Vec<_> = result.registry.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Global.b"]);
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = build_directory_registry(&missing).unwrap_err();
        match err {
            MethodRefError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn file_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "single.js", "function f() {}");
        let err = list_source_files(&file, &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, MethodRefError::Io { .. }));
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn reject_policy_fails_only_the_offending_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "dup.js", "function f() {}\nfunction f() {}");
        write(dir.path(), "ok.js", "function g() {}");

        let mut config = MethodRefConfig::default();
        config.extract.collision_policy = CollisionPolicy::Reject;
        let result = Indexer::with_config(&config)
            .unwrap()
            .index_directory(dir.path())
            .unwrap();

        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.files_indexed, 1);
        assert_eq!(result.files_failed, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].path, dir.path().join("dup.js"));
        assert!(result.registry.contains_key("Global.g"));
        assert!(!result.registry.contains_key("Global.f"));
    }

    #[test]
    fn index_file_reports_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut indexer = Indexer::new().unwrap();
        let err = indexer.index_file(&dir.path().join("gone.js")).unwrap_err();
        assert!(matches!(err, MethodRefError::Io { .. }));
    }

    #[test]
    fn non_utf8_source_is_decoded_lossily() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("legacy.js"), b"// caf\xE9\nfunction legacy() {}").unwrap();

        let result = build_directory_registry(dir.path()).unwrap();
        assert!(!result.has_failures(), "failures: {:?}", result.failures);
        assert_eq!(result.files_indexed, 1);
        assert!(result.registry.contains_key("Global.legacy"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_and_directories_are_followed() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let shared = write(target.path(), "shared.txt", "function shared(){}");
        write(target.path(), "lib/inner.js", "function inner() {}");

        write(dir.path(), "app.js", "function app() {}");
        symlink(&shared, dir.path().join("link.js")).unwrap();
        symlink(target.path().join("lib"), dir.path().join("linkdir")).unwrap();

        let result = build_directory_registry(dir.path()).unwrap();
        assert!(!result.has_failures(), "failures: {:?}", result.failures);
        assert_eq!(result.files_indexed, 3);
        assert!(result.registry.contains_key("Global.app"));
        assert!(result.registry.contains_key("Global.shared"));
        let inner = result.registry.get("Global.inner").unwrap();
        assert_eq!(inner[0].source_path, dir.path().join("linkdir").join("inner.js"));

        let scan = ScanConfig {
            follow_links: false,
            ..ScanConfig::default()
        };
        let files = list_source_files(dir.path(), &scan).unwrap();
        assert_eq!(files, vec![dir.path().join("app.js")]);
    }
}
