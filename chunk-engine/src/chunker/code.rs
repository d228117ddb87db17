//! Structural AST walker: collapses oversized structural nodes into summary
//! chunks while recursing into their children, and yields whole-node chunks
//! for leaves that already fit the token budget.

use crate::errors::Result;
use crate::grammar::{self, LangId};
use crate::metadata::{self, extract_metadata, find_child_by_type, find_children_by_type};
use crate::tokenizer::count_tokens;
use crate::types::RawChunk;
use tree_sitter::Node;

const STRUCTURAL_NODE_TYPES: &[&str] = &[
    "module",
    "source_file",
    "program",
    "class_definition",
    "class_declaration",
    "impl_item",
];

const FUNCTION_LIKE: &[&str] = &[
    "function_definition",
    "function_declaration",
    "function_item",
    "method_declaration",
    "method_definition",
];

const BODY_KINDS: &[&str] = &[
    "block",
    "statement_block",
    "class_body",
    "declaration_list",
    "compound_statement",
    "suite",
];

fn is_collapsible(kind: &str) -> bool {
    STRUCTURAL_NODE_TYPES.contains(&kind) || FUNCTION_LIKE.contains(&kind)
}

fn is_root(kind: &str) -> bool {
    matches!(kind, "module" | "source_file" | "program")
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn body_node<'a>(node: Node<'a>) -> Option<Node<'a>> {
    node.child_by_field_name("body")
        .or_else(|| find_child_by_type(node, BODY_KINDS))
}

/// Joins the signature span (node start .. body start) into a single-line
/// form: first line kept as-is, continuation lines trimmed and space-joined.
fn signature_text(node: Node, body: Node, source: &[u8]) -> String {
    let start = node.start_byte();
    let end = body.start_byte();
    let raw = std::str::from_utf8(&source[start..end]).unwrap_or("").trim_end();
    let mut lines = raw.lines();
    let mut out = lines.next().unwrap_or("").to_string();
    for l in lines {
        out.push(' ');
        out.push_str(l.trim());
    }
    out
}

fn collapsed_replacement(body: Node) -> &'static str {
    match body.kind() {
        "statement_block" | "compound_statement" => "{ ... }",
        _ => "...",
    }
}

fn indent_of(node: Node) -> String {
    " ".repeat(node.start_position().column)
}

fn function_collapse(node: Node, source: &[u8]) -> String {
    let Some(body) = body_node(node) else {
        return node_text(node, source).to_string();
    };
    format!("{} {}", signature_text(node, body, source), collapsed_replacement(body))
}

fn class_collapse(node: Node, source: &[u8], max_chunk_size: usize) -> String {
    let Some(body) = body_node(node) else {
        return node_text(node, source).to_string();
    };
    let preamble = std::str::from_utf8(&source[node.start_byte()..body.start_byte()])
        .unwrap_or("")
        .trim_end()
        .to_string();

    let methods = find_children_by_type(body, FUNCTION_LIKE);
    let mut method_lines: Vec<String> = methods
        .iter()
        .map(|m| {
            let sig = match body_node(*m) {
                Some(b) => signature_text(*m, b, source),
                None => node_text(*m, source).to_string(),
            };
            format!("{}{} ...", indent_of(*m), sig)
        })
        .collect();

    loop {
        let mut lines = vec![preamble.clone()];
        lines.extend(method_lines.iter().cloned());
        let joined = lines.join("\n");
        if count_tokens(&joined) <= max_chunk_size || lines.len() <= 3 {
            return joined;
        }
        method_lines.pop();
    }
}

fn root_collapse(node: Node, source: &[u8], max_chunk_size: usize) -> String {
    let mut class_and_fn_types = STRUCTURAL_NODE_TYPES
        .iter()
        .copied()
        .filter(|k| *k != "module" && *k != "source_file" && *k != "program")
        .collect::<Vec<_>>();
    class_and_fn_types.extend(FUNCTION_LIKE.iter().filter(|k| !k.contains("method")));

    let mut cursor = node.walk();
    let top_level: Vec<Node> = node
        .children(&mut cursor)
        .filter(|c| class_and_fn_types.contains(&c.kind()))
        .collect();

    let preamble_end = top_level.first().map(|c| c.start_byte()).unwrap_or(node.end_byte());
    let preamble = std::str::from_utf8(&source[node.start_byte()..preamble_end])
        .unwrap_or("")
        .trim_end()
        .to_string();

    let mut lines = vec![preamble.clone()];
    for child in &top_level {
        if STRUCTURAL_NODE_TYPES.contains(&child.kind()) {
            if let Some(body) = body_node(*child) {
                lines.push(signature_text(*child, body, source));
                if let Some(ctor) = find_children_by_type(body, FUNCTION_LIKE)
                    .into_iter()
                    .find(|m| metadata::find_child_by_type(*m, &["identifier", "name"])
                        .map(|n| node_text(n, source) == "__init__")
                        .unwrap_or(false))
                {
                    if let Some(cbody) = body_node(ctor) {
                        lines.push(format!("{}{}", indent_of(ctor), signature_text(ctor, cbody, source)));
                    }
                }
            }
        } else if let Some(body) = body_node(*child) {
            lines.push(format!("{} ...", signature_text(*child, body, source)));
        }
    }

    let joined = lines.join("\n");
    if count_tokens(&joined) <= max_chunk_size {
        return joined;
    }
    format!("{preamble}\n...")
}

fn walk(node: Node, source: &[u8], max_chunk_size: usize, lang: LangId, root: Node, filepath: &str, out: &mut Vec<RawChunk>) {
    let kind = node.kind();

    if STRUCTURAL_NODE_TYPES.contains(&kind) {
        let content = if is_root(kind) {
            root_collapse(node, source, max_chunk_size)
        } else {
            class_collapse(node, source, max_chunk_size)
        };
        let md = extract_metadata(node, root, lang, source, filepath);
        out.push(RawChunk {
            content,
            start_line: node.start_position().row,
            end_line: node.end_position().row,
            metadata: md,
        });
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            walk(child, source, max_chunk_size, lang, root, filepath, out);
        }
        return;
    }

    let text = node_text(node, source);
    if count_tokens(text) <= max_chunk_size {
        let md = if metadata::symbol_type_for_node(kind).is_some() {
            extract_metadata(node, root, lang, source, filepath)
        } else {
            Default::default()
        };
        out.push(RawChunk {
            content: text.to_string(),
            start_line: node.start_position().row,
            end_line: node.end_position().row,
            metadata: md,
        });
        return;
    }

    if is_collapsible(kind) {
        let content = function_collapse(node, source);
        let md = extract_metadata(node, root, lang, source, filepath);
        out.push(RawChunk {
            content,
            start_line: node.start_position().row,
            end_line: node.end_position().row,
            metadata: md,
        });
        return;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk(child, source, max_chunk_size, lang, root, filepath, out);
    }
}

pub fn code_chunker(filepath: &str, content: &str, max_chunk_size: usize, lang: LangId) -> Result<Vec<RawChunk>> {
    let tree = grammar::parse(lang, content.as_bytes())?;
    let root = tree.root_node();
    let mut out = Vec::new();
    walk(root, content.as_bytes(), max_chunk_size, lang, root, filepath, &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_class_with_methods_yields_file_class_and_method_chunks() {
        let src = "class Calculator:\n    def __init__(self):\n        self.history = []\n\n    def add(self, a, b):\n        return a + b\n\ndef main():\n    pass\n";
        let chunks = code_chunker("calc.py", src, 500, LangId::Python).unwrap();
        let kinds: Vec<_> = chunks
            .iter()
            .map(|c| c.metadata.symbol_type)
            .collect();
        assert!(kinds.contains(&Some(crate::types::SymbolType::File)));
        assert!(kinds.contains(&Some(crate::types::SymbolType::Class)));
        assert!(kinds.contains(&Some(crate::types::SymbolType::Function)));
    }

    #[test]
    fn oversize_function_collapses_to_single_chunk() {
        let body: String = (0..300).map(|i| format!("    x{i} = {i}\n")).collect();
        let src = format!("def big():\n{body}");
        let chunks = code_chunker("big.py", &src, 50, LangId::Python).unwrap();
        let fn_chunks: Vec<_> = chunks
            .iter()
            .filter(|c| c.metadata.symbol_type == Some(crate::types::SymbolType::Function))
            .collect();
        assert_eq!(fn_chunks.len(), 1);
        assert!(fn_chunks[0].content.contains("{ ... }") || fn_chunks[0].content.ends_with("..."));
    }
}
