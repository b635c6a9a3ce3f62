//! Qualified symbol registries.
//!
//! A [`FileRegistry`] holds at most one record per qualified key for a single
//! file; duplicates are resolved by a [`CollisionPolicy`]. A
//! [`CombinedRegistry`] keeps every record for a key across files.

use crate::extractor::{extract_from_tree, ExtractOptions};
use crate::parser::parse_source;
use methodref_core::{
    CollisionPolicy, MethodRefError, QualifiedKey, SymbolRecord, DEFAULT_COLLISION_POLICY,
};
use serde::Serialize;
use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Qualified key → symbol record, for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRegistry {
    source_path: PathBuf,
    entries: BTreeMap<QualifiedKey, SymbolRecord>,
}

impl FileRegistry {
    /// Fold a file's records into a registry, resolving duplicate keys with
    /// `policy`.
    pub fn from_records(
        source_path: impl Into<PathBuf>,
        records: impl IntoIterator<Item = SymbolRecord>,
        policy: CollisionPolicy,
    ) -> Result<Self, MethodRefError> {
        let source_path = source_path.into();
        let mut entries = BTreeMap::new();

        for record in records {
            match entries.entry(record.qualified_key()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => match policy {
                    CollisionPolicy::LastWins => {
                        tracing::debug!(
                            "{} redeclared in {}, keeping the later declaration",
                            slot.key(),
                            source_path.display()
                        );
                        slot.insert(record);
                    }
                    CollisionPolicy::FirstWins => {
                        tracing::debug!(
                            "{} redeclared in {}, keeping the first declaration",
                            slot.key(),
                            source_path.display()
                        );
                    }
                    CollisionPolicy::Reject => {
                        return Err(MethodRefError::DuplicateSymbol {
                            path: source_path,
                            key: slot.key().to_string(),
                        });
                    }
                },
            }
        }

        Ok(Self {
            source_path,
            entries,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn get(&self, key: &str) -> Option<&SymbolRecord> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &QualifiedKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, QualifiedKey, SymbolRecord> {
        self.entries.iter()
    }
}

impl IntoIterator for FileRegistry {
    type Item = (QualifiedKey, SymbolRecord);
    type IntoIter = btree_map::IntoIter<QualifiedKey, SymbolRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parse a source text and build its registry with the default options and
/// [`DEFAULT_COLLISION_POLICY`].
pub fn build_file_registry(
    source_text: &str,
    source_id: &Path,
) -> Result<FileRegistry, MethodRefError> {
    build_file_registry_with(
        source_text,
        source_id,
        &ExtractOptions::default(),
        DEFAULT_COLLISION_POLICY,
    )
}

pub fn build_file_registry_with(
    source_text: &str,
    source_id: &Path,
    options: &ExtractOptions,
    policy: CollisionPolicy,
) -> Result<FileRegistry, MethodRefError> {
    let tree = parse_source(source_text, source_id)?;
    FileRegistry::from_records(source_id, extract_from_tree(&tree, options), policy)
}

// ── Combined Registry ──────────────────────────────────────────────────────

/// Qualified key → every record declared under it, across files.
///
/// Records for a key are kept in merge order: file order first, then
/// declaration order within the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CombinedRegistry {
    entries: BTreeMap<QualifiedKey, Vec<SymbolRecord>>,
}

impl CombinedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every record of `file` to the list at its key.
    pub fn merge(&mut self, file: FileRegistry) {
        for (key, record) in file {
            self.entries.entry(key).or_default().push(record);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[SymbolRecord]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct qualified keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records across all keys.
    pub fn total_records(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &QualifiedKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, QualifiedKey, Vec<SymbolRecord>> {
        self.entries.iter()
    }
}

impl Extend<FileRegistry> for CombinedRegistry {
    fn extend<I: IntoIterator<Item = FileRegistry>>(&mut self, files: I) {
        for file in files {
            self.merge(file);
        }
    }
}

impl FromIterator<FileRegistry> for CombinedRegistry {
    fn from_iter<I: IntoIterator<Item = FileRegistry>>(files: I) -> Self {
        let mut combined = Self::new();
        combined.extend(files);
        combined
    }
}

impl std::fmt::Display for CombinedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, records) in &self.entries {
            writeln!(f, "{} ({})", key, records.len())?;
            for record in records {
                writeln!(f, "  {}", record)?;
            }
        }
        Ok(())
    }
}
