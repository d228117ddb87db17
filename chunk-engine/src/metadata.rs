//! Symbol & reference extraction: turns a single AST node into `ChunkMetadata`.
//!
//! Pure and per-chunk — never looks outside the current file. Cross-file
//! facts (`referenced_by`, `subclasses`, `dependencies`, `dependents`) are
//! left empty here and filled in by the resolver.

use crate::grammar::LangId;
use crate::types::{ChunkMetadata, SymbolType};
use std::collections::BTreeMap;
use tree_sitter::Node;

const CLASS_TYPES: &[&str] = &["class_definition", "class_declaration", "impl_item"];
const FUNCTION_TYPES: &[&str] = &[
    "function_definition",
    "function_declaration",
    "function_item",
];
const METHOD_TYPES: &[&str] = &["method_declaration", "method_definition"];
const STRUCT_TYPES: &[&str] = &["struct_item"];
const TRAIT_TYPES: &[&str] = &["trait_item"];
const INTERFACE_TYPES: &[&str] = &["interface_declaration"];

pub fn symbol_type_for_node(kind: &str) -> Option<SymbolType> {
    if CLASS_TYPES.contains(&kind) {
        Some(SymbolType::Class)
    } else if FUNCTION_TYPES.contains(&kind) {
        Some(SymbolType::Function)
    } else if METHOD_TYPES.contains(&kind) {
        Some(SymbolType::Method)
    } else if STRUCT_TYPES.contains(&kind) {
        Some(SymbolType::Struct)
    } else if TRAIT_TYPES.contains(&kind) {
        Some(SymbolType::Trait)
    } else if INTERFACE_TYPES.contains(&kind) {
        Some(SymbolType::Interface)
    } else {
        None
    }
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

pub fn find_child_by_type<'a>(node: Node<'a>, types: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| types.contains(&c.kind()))
}

pub fn find_children_by_type<'a>(node: Node<'a>, types: &[&str]) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| types.contains(&c.kind()))
        .collect()
}

/// First identifier-like child: the common shape for a definition's own name.
pub fn extract_symbol_name(node: Node, source: &[u8]) -> Option<String> {
    find_child_by_type(node, &["identifier", "name", "type_identifier", "field_identifier"])
        .map(|c| node_text(c, source).to_string())
}

/// Root-level imports, language-specific textual extraction (unresolved).
pub fn extract_imports(root: Node, lang: LangId, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match (lang, child.kind()) {
            (LangId::Python, "import_statement") | (LangId::Python, "import_from_statement") => {
                collect_dotted_names(child, source, &mut out);
            }
            (LangId::Javascript | LangId::Typescript | LangId::Tsx, "import_statement") => {
                if let Some(s) = find_child_by_type(child, &["string"]) {
                    out.push(unquote(node_text(s, source)));
                }
            }
            (LangId::Java, "import_declaration") => {
                if let Some(s) = find_child_by_type(
                    child,
                    &["scoped_identifier", "identifier", "scoped_type_identifier"],
                ) {
                    out.push(node_text(s, source).to_string());
                }
            }
            (LangId::Rust, "use_declaration") => {
                let text = node_text(child, source);
                let trimmed = text
                    .trim_start_matches("pub ")
                    .trim_start_matches("use ")
                    .trim_end_matches(';')
                    .trim();
                out.push(trimmed.to_string());
            }
            (LangId::Go, "import_declaration") => {
                collect_string_literals(child, source, &mut out);
            }
            _ => {}
        }
    }
    out
}

fn collect_dotted_names(node: Node, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for c in node.children(&mut cursor) {
        match c.kind() {
            "dotted_name" | "identifier" => out.push(node_text(c, source).to_string()),
            "aliased_import" => {
                if let Some(n) = find_child_by_type(c, &["dotted_name", "identifier"]) {
                    out.push(node_text(n, source).to_string());
                }
            }
            "import_from_statement" => collect_dotted_names(c, source, out),
            _ => {}
        }
    }
}

fn collect_string_literals(node: Node, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for c in node.children(&mut cursor) {
        if c.kind() == "interpreted_string_literal" || c.kind() == "string" {
            out.push(unquote(node_text(c, source)));
        } else {
            collect_string_literals(c, source, out);
        }
    }
}

fn unquote(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

/// Top-level exported symbol names, language-specific.
pub fn extract_exports(root: Node, lang: LangId, source: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match lang {
            LangId::Python | LangId::Rust | LangId::Go => {
                let mut all = CLASS_TYPES.to_vec();
                all.extend(FUNCTION_TYPES);
                all.extend(STRUCT_TYPES);
                all.extend(TRAIT_TYPES);
                if all.contains(&child.kind()) {
                    if let Some(name) = extract_symbol_name(child, source) {
                        out.push(name);
                    }
                }
            }
            LangId::Javascript | LangId::Typescript | LangId::Tsx => {
                if child.kind() == "export_statement" {
                    let mut all = CLASS_TYPES.to_vec();
                    all.extend(FUNCTION_TYPES);
                    if let Some(decl) = find_child_by_type(child, &all) {
                        if let Some(name) = extract_symbol_name(decl, source) {
                            out.push(name);
                        }
                    }
                }
            }
            LangId::Java => {
                if child.kind() == "class_declaration" {
                    let modifiers_text = find_child_by_type(child, &["modifiers"])
                        .map(|m| node_text(m, source))
                        .unwrap_or("");
                    if modifiers_text.contains("public") {
                        if let Some(name) = extract_symbol_name(child, source) {
                            out.push(name);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Parent/base class for a class-like node.
pub fn extract_parent_class(node: Node, lang: LangId, source: &[u8]) -> Option<String> {
    match lang {
        LangId::Python => {
            let args = find_child_by_type(node, &["argument_list"])?;
            find_child_by_type(args, &["identifier"]).map(|c| node_text(c, source).to_string())
        }
        LangId::Java => {
            let superclass = find_child_by_type(node, &["superclass"])?;
            find_child_by_type(superclass, &["type_identifier"])
                .map(|c| node_text(c, source).to_string())
        }
        LangId::Javascript | LangId::Typescript | LangId::Tsx => {
            let clause = find_child_by_type(node, &["class_heritage", "extends_clause"])?;
            find_child_by_type(clause, &["identifier"]).map(|c| node_text(c, source).to_string())
        }
        _ => None,
    }
}

/// Implemented interfaces (Java-only).
pub fn extract_interfaces(node: Node, lang: LangId, source: &[u8]) -> Vec<String> {
    if lang != LangId::Java {
        return Vec::new();
    }
    let Some(super_ifaces) = find_child_by_type(node, &["super_interfaces"]) else {
        return Vec::new();
    };
    let Some(type_list) = find_child_by_type(super_ifaces, &["type_list"]) else {
        return Vec::new();
    };
    find_children_by_type(type_list, &["type_identifier"])
        .into_iter()
        .map(|c| node_text(c, source).to_string())
        .collect()
}

const CALL_TYPES: &[&str] = &["call", "call_expression", "method_invocation"];
const ATTR_ACCESS_TYPES: &[&str] = &["attribute", "field_expression", "field_access"];

/// Identifiers called or accessed anywhere in the subtree, as a deduplicated set.
pub fn extract_references(node: Node, source: &[u8]) -> Vec<String> {
    let mut seen = Vec::new();
    walk_references(node, source, &mut seen);
    seen
}

fn walk_references(node: Node, source: &[u8], out: &mut Vec<String>) {
    if CALL_TYPES.contains(&node.kind()) {
        if let Some(callee) = node.child(0) {
            if let Some(name) = callee_name(callee, source) {
                push_dedup(out, name);
            }
        }
    } else if ATTR_ACCESS_TYPES.contains(&node.kind()) {
        if let Some(field) = find_child_by_type(node, &["identifier", "field_identifier"]) {
            push_dedup(out, node_text(field, source).to_string());
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_references(child, source, out);
    }
}

fn callee_name(node: Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" => Some(node_text(node, source).to_string()),
        "attribute" | "field_expression" | "field_access" => {
            find_child_by_type(node, &["identifier", "field_identifier"])
                .map(|c| node_text(c, source).to_string())
        }
        _ => None,
    }
}

fn push_dedup(out: &mut Vec<String>, value: String) {
    if !out.contains(&value) {
        out.push(value);
    }
}

/// Direct-child function/method definitions: name -> "line:<row>".
pub fn extract_symbol_definitions(node: Node, source: &[u8]) -> BTreeMap<String, String> {
    let mut all = FUNCTION_TYPES.to_vec();
    all.extend(METHOD_TYPES);
    let mut out = BTreeMap::new();
    for child in find_children_by_type(node, &all) {
        if let Some(name) = extract_symbol_name(child, source) {
            out.insert(name, format!("line:{}", child.start_position().row));
        }
    }
    out
}

/// Orchestrates the full per-node extraction into `ChunkMetadata`.
pub fn extract_metadata(
    node: Node,
    root: Node,
    lang: LangId,
    source: &[u8],
    filepath: &str,
) -> ChunkMetadata {
    let symbol_type = symbol_type_for_node(node.kind());
    let symbol_name = match symbol_type {
        Some(SymbolType::File) => None,
        _ => extract_symbol_name(node, source),
    };

    let is_root = matches!(node.kind(), "module" | "source_file" | "program");
    let (symbol_type, symbol_name) = if is_root {
        let basename = filepath.rsplit(['/', '\\']).next().unwrap_or(filepath);
        (Some(SymbolType::File), Some(basename.to_string()))
    } else {
        (symbol_type, symbol_name)
    };

    let imports = if is_root { extract_imports(root, lang, source) } else { Vec::new() };
    let exports = if is_root { extract_exports(root, lang, source) } else { Vec::new() };

    let extends = if matches!(symbol_type, Some(SymbolType::Class)) {
        extract_parent_class(node, lang, source)
    } else {
        None
    };
    let implements = if matches!(symbol_type, Some(SymbolType::Class)) {
        extract_interfaces(node, lang, source)
    } else {
        Vec::new()
    };

    ChunkMetadata {
        symbol_type,
        symbol_name,
        symbol_definitions: extract_symbol_definitions(node, source),
        imports,
        exports,
        references_to: extract_references(node, source),
        referenced_by: Vec::new(),
        extends,
        implements,
        subclasses: Vec::new(),
        dependencies: Vec::new(),
        dependents: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;

    #[test]
    fn python_class_and_method_metadata() {
        let src = b"class Calculator:\n    def add(self, a, b):\n        return a + b\n";
        let tree = grammar::parse(LangId::Python, src).unwrap();
        let root = tree.root_node();
        let class_node = find_child_by_type(root, CLASS_TYPES).unwrap();
        let md = extract_metadata(class_node, root, LangId::Python, src, "calc.py");
        assert_eq!(md.symbol_type, Some(SymbolType::Class));
        assert_eq!(md.symbol_name.as_deref(), Some("Calculator"));
        assert!(md.symbol_definitions.contains_key("add"));
    }

    #[test]
    fn python_root_collects_imports_and_exports() {
        let src = b"import os\nclass Foo:\n    pass\n";
        let tree = grammar::parse(LangId::Python, src).unwrap();
        let root = tree.root_node();
        let md = extract_metadata(root, root, LangId::Python, src, "a.py");
        assert_eq!(md.symbol_type, Some(SymbolType::File));
        assert_eq!(md.imports, vec!["os".to_string()]);
        assert_eq!(md.exports, vec!["Foo".to_string()]);
    }

    #[test]
    fn references_collected_as_set() {
        let src = b"def f():\n    g()\n    g()\n    h()\n";
        let tree = grammar::parse(LangId::Python, src).unwrap();
        let root = tree.root_node();
        let fn_node = find_child_by_type(root, FUNCTION_TYPES).unwrap();
        let md = extract_metadata(fn_node, root, LangId::Python, src, "a.py");
        let mut refs = md.references_to.clone();
        refs.sort();
        assert_eq!(refs, vec!["g".to_string(), "h".to_string()]);
    }
}
