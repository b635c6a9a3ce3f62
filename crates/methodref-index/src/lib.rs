//! methodref-index: Tree-sitter based function and method registries for
//! JavaScript source trees.
//!
//! # Architecture
//!
//! - **parser** — Tree-sitter adapter; rejects sources with syntax errors
//! - **syntax** — Typed view of class and function declarations in a parsed tree
//! - **extractor** — Lazily turns declarations into `SymbolRecord`s
//! - **registry** — Per-file registries keyed by qualified name, and the
//!   combined cross-file registry
//! - **indexer** — Directory walking and aggregation with per-file failure isolation

pub mod extractor;
pub mod indexer;
pub mod parser;
pub mod registry;
pub mod syntax;

pub use extractor::{extract_from_tree, extract_symbols, ExtractOptions, FileSymbols, Symbols};
pub use indexer::{
    build_directory_registry, list_source_files, DirectoryIndex, FileFailure, Indexer,
};
pub use parser::{parse_source, JavaScriptParser};
pub use registry::{build_file_registry, build_file_registry_with, CombinedRegistry, FileRegistry};
pub use syntax::{
    ClassDeclaration, ClassMember, Declaration, FunctionDeclaration, MalformedDeclaration,
    MemberKey, MethodDefinition, MethodKind, SyntaxTree,
};
