//! Cross-file resolver: pass 2 of indexing. Consumes every chunk produced in
//! pass 1 and back-fills the relational fields (`referenced_by`, `subclasses`,
//! `dependencies`, `dependents`) that cannot be known from a single file.

use crate::types::{Chunk, SymbolType};
use std::collections::HashMap;

/// symbol name -> indices of chunks that define it.
type SymbolMap = HashMap<String, Vec<usize>>;

fn build_symbol_map(chunks: &[Chunk]) -> SymbolMap {
    let mut map: SymbolMap = HashMap::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if let Some(name) = &chunk.metadata.symbol_name {
            if chunk.metadata.symbol_type != Some(SymbolType::File) {
                map.entry(name.clone()).or_default().push(i);
            }
        }
        for name in chunk.metadata.symbol_definitions.keys() {
            map.entry(name.clone()).or_default().push(i);
        }
    }
    map
}

/// `imports` are recorded as unresolved path text (e.g. Rust's
/// `crate::foo::Bar`, Java's `com.foo.Bar`), while `exports` are bare symbol
/// names. Reduces an import string to the segment comparable against an
/// export name: the path tail after the last `::` (Rust) or `.`/`/`/`\`
/// (Java, dotted imports).
fn import_tail(name: &str) -> &str {
    let after_rust_sep = name.rsplit("::").next().unwrap_or(name);
    after_rust_sep
        .rsplit(['.', '/', '\\'])
        .next()
        .unwrap_or(after_rust_sep)
}

/// exported name -> files whose exports contain it, i.e. the `(p, exports)`
/// pairs inverted into a reverse index for near-linear lookup.
fn build_export_name_index(chunks: &[Chunk]) -> HashMap<String, Vec<String>> {
    let mut idx: HashMap<String, Vec<String>> = HashMap::new();
    for chunk in chunks {
        for name in &chunk.metadata.exports {
            idx.entry(name.clone()).or_default().push(chunk.filepath.clone());
        }
    }
    idx
}

/// imported name (reduced to its path tail) -> files whose imports contain it.
fn build_import_name_index(chunks: &[Chunk]) -> HashMap<String, Vec<String>> {
    let mut idx: HashMap<String, Vec<String>> = HashMap::new();
    for chunk in chunks {
        for name in &chunk.metadata.imports {
            idx.entry(import_tail(name).to_string())
                .or_default()
                .push(chunk.filepath.clone());
        }
    }
    idx
}

/// Runs the full second pass in place, mutating every chunk's relational
/// metadata fields. Chunks are expected to come from a single indexing batch
/// (or the full corpus being refreshed); each is addressed by its position in
/// `chunks` for the duration of this call only.
pub fn resolve_cross_file(chunks: &mut [Chunk]) {
    let symbol_map = build_symbol_map(chunks);

    // references_to -> referenced_by, and extends -> subclasses.
    let mut referenced_by_updates: Vec<(usize, String)> = Vec::new();
    let mut subclass_updates: Vec<(usize, String)> = Vec::new();

    for chunk in chunks.iter() {
        let loc = chunk.location();
        for reference in &chunk.metadata.references_to {
            if let Some(targets) = symbol_map.get(reference) {
                for &target_idx in targets {
                    referenced_by_updates.push((target_idx, loc.clone()));
                }
            }
        }
        if let Some(parent_name) = &chunk.metadata.extends {
            if let Some(targets) = symbol_map.get(parent_name) {
                if let Some(child_name) = &chunk.metadata.symbol_name {
                    for &target_idx in targets {
                        subclass_updates.push((target_idx, child_name.clone()));
                    }
                }
            }
        }
    }

    for (idx, loc) in referenced_by_updates {
        chunks[idx].metadata.add_referenced_by(loc);
    }
    for (idx, name) in subclass_updates {
        chunks[idx].metadata.add_subclass(name);
    }

    // Imports/exports -> dependencies/dependents, matched by set membership
    // of an imported identifier against a file's recorded exports (not by
    // filename), per the `i ∈ c.imports`, `(p, exports)` with `i ∈ exports`
    // rule.
    let export_name_index = build_export_name_index(chunks);
    let import_name_index = build_import_name_index(chunks);

    let mut dependency_updates: Vec<(usize, String)> = Vec::new();
    let mut dependent_updates: Vec<(usize, String)> = Vec::new();

    for (i, chunk) in chunks.iter().enumerate() {
        if chunk.metadata.symbol_type != Some(SymbolType::File) {
            continue;
        }
        for name in &chunk.metadata.imports {
            if let Some(exporters) = export_name_index.get(import_tail(name)) {
                for exporter in exporters {
                    if exporter != &chunk.filepath {
                        dependency_updates.push((i, exporter.clone()));
                    }
                }
            }
        }
        for name in &chunk.metadata.exports {
            if let Some(importers) = import_name_index.get(name) {
                for importer in importers {
                    if importer != &chunk.filepath {
                        dependent_updates.push((i, importer.clone()));
                    }
                }
            }
        }
    }

    for (idx, path) in dependency_updates {
        chunks[idx].metadata.add_dependency(path);
    }
    for (idx, path) in dependent_updates {
        chunks[idx].metadata.add_dependent(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn chunk(filepath: &str, start_line: usize, metadata: ChunkMetadata) -> Chunk {
        Chunk {
            content: String::new(),
            start_line,
            end_line: start_line,
            filepath: filepath.to_string(),
            index: 0,
            digest: "d".to_string(),
            metadata,
        }
    }

    #[test]
    fn reference_is_backfilled_as_referenced_by() {
        let mut chunks = vec![
            chunk(
                "a.py",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::Function),
                    symbol_name: Some("helper".to_string()),
                    ..Default::default()
                },
            ),
            chunk(
                "b.py",
                10,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::Function),
                    symbol_name: Some("main".to_string()),
                    references_to: vec!["helper".to_string()],
                    ..Default::default()
                },
            ),
        ];
        resolve_cross_file(&mut chunks);
        assert_eq!(chunks[0].metadata.referenced_by, vec!["b.py:10".to_string()]);
    }

    #[test]
    fn extends_is_backfilled_as_subclass() {
        let mut chunks = vec![
            chunk(
                "base.py",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::Class),
                    symbol_name: Some("Animal".to_string()),
                    ..Default::default()
                },
            ),
            chunk(
                "dog.py",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::Class),
                    symbol_name: Some("Dog".to_string()),
                    extends: Some("Animal".to_string()),
                    ..Default::default()
                },
            ),
        ];
        resolve_cross_file(&mut chunks);
        assert_eq!(chunks[0].metadata.subclasses, vec!["Dog".to_string()]);
    }

    #[test]
    fn import_creates_file_dependency_edge_by_exported_symbol() {
        let mut chunks = vec![
            chunk(
                "util.py",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::File),
                    symbol_name: Some("util.py".to_string()),
                    exports: vec!["helper".to_string()],
                    ..Default::default()
                },
            ),
            chunk(
                "main.py",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::File),
                    symbol_name: Some("main.py".to_string()),
                    imports: vec!["helper".to_string()],
                    ..Default::default()
                },
            ),
        ];
        resolve_cross_file(&mut chunks);
        assert_eq!(chunks[1].metadata.dependencies, vec!["util.py".to_string()]);
        assert_eq!(chunks[0].metadata.dependents, vec!["main.py".to_string()]);
    }

    #[test]
    fn rust_fully_qualified_import_resolves_by_path_tail() {
        let mut chunks = vec![
            chunk(
                "shapes.rs",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::File),
                    symbol_name: Some("shapes.rs".to_string()),
                    exports: vec!["Circle".to_string()],
                    ..Default::default()
                },
            ),
            chunk(
                "main.rs",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::File),
                    symbol_name: Some("main.rs".to_string()),
                    imports: vec!["crate::shapes::Circle".to_string()],
                    ..Default::default()
                },
            ),
        ];
        resolve_cross_file(&mut chunks);
        assert_eq!(chunks[1].metadata.dependencies, vec!["shapes.rs".to_string()]);
        assert_eq!(chunks[0].metadata.dependents, vec!["main.rs".to_string()]);
    }

    #[test]
    fn module_only_import_with_no_matching_export_leaves_dependencies_empty() {
        let mut chunks = vec![
            chunk(
                "util.py",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::File),
                    symbol_name: Some("util.py".to_string()),
                    exports: vec!["helper".to_string()],
                    ..Default::default()
                },
            ),
            chunk(
                "main.py",
                0,
                ChunkMetadata {
                    symbol_type: Some(SymbolType::File),
                    symbol_name: Some("main.py".to_string()),
                    imports: vec!["util".to_string()],
                    ..Default::default()
                },
            ),
        ];
        resolve_cross_file(&mut chunks);
        assert!(chunks[1].metadata.dependencies.is_empty());
    }
}
