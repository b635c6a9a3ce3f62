//! Declaration extraction: turns a parsed tree into symbol records.

use crate::parser::parse_source;
use crate::syntax::{
    ClassDeclaration, ClassMember, Declaration, Declarations, MethodKind, SyntaxTree,
};
use methodref_core::{ExtractConfig, MethodRefError, SymbolRecord};
use std::collections::VecDeque;
use std::path::Path;

/// Options controlling which declarations become symbol records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Emit class constructors as methods named `constructor`.
    pub include_constructors: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_constructors: true,
        }
    }
}

impl From<&ExtractConfig> for ExtractOptions {
    fn from(config: &ExtractConfig) -> Self {
        Self {
            include_constructors: config.include_constructors,
        }
    }
}

/// Lazily yield one [`SymbolRecord`] per function or method declaration.
///
/// The walk is single-pass; call again to re-walk the tree.
pub fn extract_from_tree<'tree>(
    tree: &'tree SyntaxTree,
    options: &ExtractOptions,
) -> Symbols<'tree> {
    Symbols {
        declarations: tree.declarations(),
        path: tree.path(),
        options: *options,
        pending: VecDeque::new(),
    }
}

/// Parse `source_text` and prepare its symbols for iteration.
pub fn extract_symbols(
    source_text: &str,
    source_id: &Path,
) -> Result<FileSymbols, MethodRefError> {
    Ok(FileSymbols {
        tree: parse_source(source_text, source_id)?,
        options: ExtractOptions::default(),
    })
}

/// A parsed file whose symbols can be iterated.
#[derive(Debug)]
pub struct FileSymbols {
    tree: SyntaxTree,
    options: ExtractOptions,
}

impl FileSymbols {
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn iter(&self) -> Symbols<'_> {
        extract_from_tree(&self.tree, &self.options)
    }
}

impl<'a> IntoIterator for &'a FileSymbols {
    type Item = SymbolRecord;
    type IntoIter = Symbols<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`extract_from_tree`].
pub struct Symbols<'tree> {
    declarations: Declarations<'tree>,
    path: &'tree Path,
    options: ExtractOptions,
    /// Methods of the most recent class not yet handed out.
    pending: VecDeque<SymbolRecord>,
}

impl Symbols<'_> {
    fn queue_methods(&mut self, class: ClassDeclaration) {
        for member in class.members {
            let ClassMember::Method(method) = member else {
                continue;
            };
            if method.kind == MethodKind::Constructor && !self.options.include_constructors {
                continue;
            }
            let Some(name) = method.simple_name() else {
                tracing::debug!(
                    "Skipping {:?} member of {} at {}:{}",
                    method.key,
                    class.name,
                    self.path.display(),
                    method.line
                );
                continue;
            };
            self.pending.push_back(SymbolRecord::method(
                name,
                class.name.clone(),
                method.is_static,
                class.super_class.clone(),
                self.path,
            ));
        }
    }
}

impl Iterator for Symbols<'_> {
    type Item = SymbolRecord;

    fn next(&mut self) -> Option<SymbolRecord> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(record);
            }
            match self.declarations.next()? {
                Declaration::Function(function) => {
                    return Some(SymbolRecord::function(function.name, self.path));
                }
                Declaration::Class(class) => self.queue_methods(class),
                Declaration::Malformed(malformed) => {
                    tracing::debug!(
                        "Skipping {} at {}:{}: {}",
                        malformed.kind,
                        self.path.display(),
                        malformed.line,
                        malformed.reason
                    );
                }
            }
        }
    }
}
