//! Typed view over a parsed JavaScript syntax tree.
//!
//! Only the node kinds the extractor consumes are modelled: class
//! declarations (with their members and heritage clause) and function
//! declarations. Anything with an unexpected shape becomes a
//! [`MalformedDeclaration`] rather than an unchecked field access.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

/// A parsed, syntactically valid source file.
pub struct SyntaxTree {
    tree: Tree,
    source: String,
    path: PathBuf,
}

impl SyntaxTree {
    pub(crate) fn new(tree: Tree, source: String, path: PathBuf) -> Self {
        Self { tree, source, path }
    }

    /// Path of the file this tree was parsed from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// All declarations in the file, in source order (pre-order walk).
    ///
    /// Declarations nested in blocks, function bodies and method bodies are
    /// included.
    pub fn declarations(&self) -> Declarations<'_> {
        Declarations {
            source: self.source.as_bytes(),
            stack: vec![self.tree.root_node()],
        }
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("path", &self.path)
            .field("root", &self.tree.root_node().kind())
            .finish()
    }
}

// ── Declaration Model ──────────────────────────────────────────────────────

/// A declaration node recognised by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Declaration {
    Class(ClassDeclaration),
    Function(FunctionDeclaration),
    Malformed(MalformedDeclaration),
}

/// `class Name extends Parent { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDeclaration {
    pub name: String,
    /// Superclass, only when the heritage clause is a plain identifier.
    pub super_class: Option<String>,
    pub members: Vec<ClassMember>,
    /// 1-based line of the `class` keyword.
    pub line: usize,
}

/// `function name() {}` or `function* name() {}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub is_generator: bool,
    pub line: usize,
}

/// A declaration-like node without an extractable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedDeclaration {
    /// Tree-sitter node kind.
    pub kind: String,
    pub reason: String,
    pub line: usize,
}

/// One entry of a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClassMember {
    Method(MethodDefinition),
    /// Fields, static blocks, and anything else that is not a method.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDefinition {
    pub key: MemberKey,
    pub is_static: bool,
    pub kind: MethodKind,
    pub line: usize,
}

impl MethodDefinition {
    /// Name used in symbol records; `None` for computed and literal keys.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.key {
            MemberKey::Identifier(name) | MemberKey::Private(name) => Some(name),
            MemberKey::Literal(_) | MemberKey::Computed(_) => None,
        }
    }
}

/// The key of a class member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemberKey {
    /// `name() {}`
    Identifier(String),
    /// `#name() {}`, stored with the leading `#`.
    Private(String),
    /// `"name"() {}` or `42() {}`, stored as written.
    Literal(String),
    /// `[expr]() {}`, stored as written.
    Computed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MethodKind {
    Method,
    Constructor,
    Getter,
    Setter,
}

// ── Traversal ──────────────────────────────────────────────────────────────

/// Lazy pre-order iterator over the declarations of a [`SyntaxTree`].
pub struct Declarations<'tree> {
    source: &'tree [u8],
    stack: Vec<Node<'tree>>,
}

impl Iterator for Declarations<'_> {
    type Item = Declaration;

    fn next(&mut self) -> Option<Declaration> {
        while let Some(node) = self.stack.pop() {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            self.stack.extend(children.into_iter().rev());

            if let Some(declaration) = classify(node, self.source) {
                return Some(declaration);
            }
        }
        None
    }
}

fn classify(node: Node, source: &[u8]) -> Option<Declaration> {
    match node.kind() {
        "class_declaration" => Some(class_declaration(node, source)),
        "function_declaration" | "generator_function_declaration" => {
            Some(function_declaration(node, source))
        }
        // `export default class {}` / `export default function () {}` parse
        // as expressions but declare like their statement forms.
        "class" if is_default_export(node) => Some(class_declaration(node, source)),
        "function" | "function_expression" | "generator_function"
            if is_default_export(node) =>
        {
            Some(function_declaration(node, source))
        }
        _ => None,
    }
}

fn class_declaration(node: Node, source: &[u8]) -> Declaration {
    match node.child_by_field_name("name") {
        Some(name) => Declaration::Class(ClassDeclaration {
            name: node_text(name, source),
            super_class: super_class(node, source),
            members: class_members(node, source),
            line: line_of(node),
        }),
        None => malformed(node, "class declaration without a name"),
    }
}

fn function_declaration(node: Node, source: &[u8]) -> Declaration {
    match node.child_by_field_name("name") {
        Some(name) => Declaration::Function(FunctionDeclaration {
            name: node_text(name, source),
            is_generator: node.kind().starts_with("generator"),
            line: line_of(node),
        }),
        None => malformed(node, "function declaration without a name"),
    }
}

fn malformed(node: Node, reason: &str) -> Declaration {
    Declaration::Malformed(MalformedDeclaration {
        kind: node.kind().to_string(),
        reason: reason.to_string(),
        line: line_of(node),
    })
}

/// The superclass identifier of a class declaration.
///
/// `extends a.B` or `extends mixin(A)` have no single identifier and yield
/// `None`.
fn super_class(class: Node, source: &[u8]) -> Option<String> {
    let mut cursor = class.walk();
    let heritage = class
        .named_children(&mut cursor)
        .find(|child| child.kind() == "class_heritage")?;
    let mut cursor = heritage.walk();
    let parent = heritage.named_children(&mut cursor).next()?;
    (parent.kind() == "identifier").then(|| node_text(parent, source))
}

fn class_members(class: Node, source: &[u8]) -> Vec<ClassMember> {
    let Some(body) = class.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|member| member.kind() != "comment")
        .map(|member| match member.kind() {
            "method_definition" => match method_definition(member, source) {
                Some(method) => ClassMember::Method(method),
                None => ClassMember::Other,
            },
            _ => ClassMember::Other,
        })
        .collect()
}

fn method_definition(node: Node, source: &[u8]) -> Option<MethodDefinition> {
    let name = node.child_by_field_name("name")?;
    let text = node_text(name, source);
    let key = match name.kind() {
        "property_identifier" => MemberKey::Identifier(text),
        "private_property_identifier" => MemberKey::Private(text),
        "string" | "number" => MemberKey::Literal(text),
        _ => MemberKey::Computed(text),
    };

    let mut is_static = false;
    let mut kind = MethodKind::Method;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_named() {
            continue;
        }
        match child.kind() {
            "static" => is_static = true,
            "get" => kind = MethodKind::Getter,
            "set" => kind = MethodKind::Setter,
            _ => {}
        }
    }
    if !is_static
        && kind == MethodKind::Method
        && matches!(&key, MemberKey::Identifier(name) if name == "constructor")
    {
        kind = MethodKind::Constructor;
    }

    Some(MethodDefinition {
        key,
        is_static,
        kind,
        line: line_of(node),
    })
}

fn is_default_export(node: Node) -> bool {
    node.parent()
        .is_some_and(|parent| parent.kind() == "export_statement")
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn declarations(source: &str) -> Vec<Declaration> {
        parse_source(source, Path::new("test.js"))
            .expect("valid source")
            .declarations()
            .collect()
    }

    fn only_class(source: &str) -> ClassDeclaration {
        let decls = declarations(source);
        assert_eq!(decls.len(), 1, "Expected 1 declaration, got: {:#?}", decls);
        match decls.into_iter().next() {
            Some(Declaration::Class(class)) => class,
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn class_with_identifier_superclass() {
        let class = only_class("class Dog extends Animal { bark() {} }");
        assert_eq!(class.name, "Dog");
        assert_eq!(class.super_class.as_deref(), Some("Animal"));
        assert_eq!(class.line, 1);
        assert_eq!(class.members.len(), 1);
    }

    #[test]
    fn member_expression_superclass_is_none() {
        let class = only_class("class View extends Backbone.View {}");
        assert_eq!(class.super_class, None);
        let class = only_class("class Mixed extends mixin(Base) {}");
        assert_eq!(class.super_class, None);
    }

    #[test]
    fn member_kinds() {
        let class = only_class(
            r#"
class Shape {
    constructor(w) { this.w = w; }
    static unit() {}
    get width() { return this.w; }
    set width(v) { this.w = v; }
    #hidden() {}
    ["computed"]() {}
    "quoted"() {}
    area = 0;
    static { Shape.count = 0; }
}
"#,
        );
        let methods: Vec<&MethodDefinition> = class
            .members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Method(def) => Some(def),
                ClassMember::Other => None,
            })
            .collect();
        assert_eq!(methods.len(), 7, "got: {:#?}", methods);
        assert_eq!(class.members.len(), 9);

        assert_eq!(methods[0].kind, MethodKind::Constructor);
        assert_eq!(methods[0].simple_name(), Some("constructor"));

        assert!(methods[1].is_static);
        assert_eq!(methods[1].simple_name(), Some("unit"));

        assert_eq!(methods[2].kind, MethodKind::Getter);
        assert_eq!(methods[3].kind, MethodKind::Setter);
        assert!(!methods[2].is_static);

        assert_eq!(methods[4].key, MemberKey::Private("#hidden".into()));
        assert_eq!(methods[4].simple_name(), Some("#hidden"));

        assert!(matches!(methods[5].key, MemberKey::Computed(_)));
        assert_eq!(methods[5].simple_name(), None);
        assert_eq!(methods[6].key, MemberKey::Literal("\"quoted\"".into()));
        assert_eq!(methods[6].simple_name(), None);
    }

    #[test]
    fn function_and_generator_declarations() {
        let decls = declarations("function a() {}\nfunction* b() {}\nasync function c() {}");
        let names: Vec<_> = decls
            .iter()
            .map(|d| match d {
                Declaration::Function(f) => (f.name.as_str(), f.is_generator, f.line),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(names, vec![("a", false, 1), ("b", true, 2), ("c", false, 3)]);
    }

    #[test]
    fn nested_declarations_in_source_order() {
        let decls = declarations(
            r#"
function outer() {
    function inner() {}
    if (true) {
        class Local { run() {} }
    }
}
class Top {
    method() {
        function helper() {}
    }
}
"#,
        );
        let names: Vec<String> = decls
            .iter()
            .map(|d| match d {
                Declaration::Class(c) => format!("class {}", c.name),
                Declaration::Function(f) => format!("fn {}", f.name),
                Declaration::Malformed(m) => format!("malformed {}", m.kind),
            })
            .collect();
        assert_eq!(
            names,
            vec!["fn outer", "fn inner", "class Local", "class Top", "fn helper"]
        );
    }

    #[test]
    fn expressions_are_not_declarations() {
        let decls = declarations(
            "const a = () => {};\nconst b = function named() {};\nconst C = class {};",
        );
        assert!(decls.is_empty(), "got: {:#?}", decls);
    }

    #[test]
    fn anonymous_default_exports_are_malformed() {
        let decls = declarations("export default class { run() {} }");
        assert_eq!(decls.len(), 1);
        assert!(matches!(&decls[0], Declaration::Malformed(m) if m.kind == "class"));

        let decls = declarations("export default function () {}");
        assert_eq!(decls.len(), 1);
        assert!(matches!(decls[0], Declaration::Malformed(_)));
    }

    #[test]
    fn exported_named_declarations() {
        let decls = declarations("export class A {}\nexport default function b() {}");
        assert_eq!(decls.len(), 2);
        assert!(matches!(&decls[0], Declaration::Class(c) if c.name == "A"));
        assert!(matches!(&decls[1], Declaration::Function(f) if f.name == "b"));
    }
}
