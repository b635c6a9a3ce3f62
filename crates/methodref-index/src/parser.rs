//! Tree-sitter parsing adapter for JavaScript sources.
//!
//! Parses module-scoped JavaScript and rejects any tree that contains an
//! `ERROR` or `MISSING` node, so callers only ever see syntactically valid
//! trees.

use crate::syntax::SyntaxTree;
use methodref_core::MethodRefError;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Longest snippet of offending source quoted in a parse error.
const MAX_SNIPPET_LEN: usize = 40;

/// A reusable tree-sitter parser configured for JavaScript.
pub struct JavaScriptParser {
    parser: Parser,
}

impl JavaScriptParser {
    /// Create a parser with the JavaScript grammar loaded.
    pub fn new() -> Result<Self, MethodRefError> {
        let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| MethodRefError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse `source` read from `source_id` into a syntax tree.
    pub fn parse(
        &mut self,
        source: impl Into<String>,
        source_id: &Path,
    ) -> Result<SyntaxTree, MethodRefError> {
        let source = source.into();
        let tree = self
            .parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| MethodRefError::Parse {
                path: source_id.to_path_buf(),
                line: 1,
                column: 1,
                detail: "parser produced no tree".to_string(),
            })?;

        if let Some(node) = first_error(tree.root_node()) {
            let position = node.start_position();
            return Err(MethodRefError::Parse {
                path: source_id.to_path_buf(),
                line: position.row + 1,
                column: position.column + 1,
                detail: describe_error(node, source.as_bytes()),
            });
        }

        if let Some(node) = first_jsx(tree.root_node()) {
            let position = node.start_position();
            return Err(MethodRefError::Parse {
                path: source_id.to_path_buf(),
                line: position.row + 1,
                column: position.column + 1,
                detail: format!("JSX is not supported (`{}`)", node.kind()),
            });
        }

        Ok(SyntaxTree::new(tree, source, source_id.to_path_buf()))
    }
}

/// Parse a single source text with a fresh parser.
pub fn parse_source(source: &str, source_id: &Path) -> Result<SyntaxTree, MethodRefError> {
    JavaScriptParser::new()?.parse(source, source_id)
}

/// Find the first `ERROR` or `MISSING` node in source order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for child in children {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    Some(node)
}

/// Find the first JSX node in source order.
///
/// The grammar parses JSX without error nodes, so this is a separate pass.
fn first_jsx(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.kind().starts_with("jsx_") {
            return Some(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn describe_error(node: Node, source: &[u8]) -> String {
    if node.is_missing() {
        return format!("missing `{}`", node.kind());
    }
    let text = node.utf8_text(source).unwrap_or("");
    let line = text.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return "unexpected end of input".to_string();
    }
    let snippet: String = line.chars().take(MAX_SNIPPET_LEN).collect();
    if snippet.len() < line.len() {
        format!("unexpected `{}...`", snippet)
    } else {
        format!("unexpected `{}`", snippet)
    }
}
