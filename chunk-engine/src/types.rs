//! Canonical chunk and metadata schema shared by the chunker, resolver, and indexer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Symbol kind recognized across the supported grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    File,
    Class,
    Function,
    Method,
    Interface,
    Struct,
    Trait,
}

/// Per-chunk facts extracted locally (pass 1) and, for the last four fields,
/// back-filled by the cross-file resolver (pass 2).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_type: Option<SymbolType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_name: Option<String>,
    /// name -> "line:<row>"
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symbol_definitions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subclasses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependents: Vec<String>,
}

impl ChunkMetadata {
    pub fn file_stub(basename: &str) -> Self {
        Self {
            symbol_type: Some(SymbolType::File),
            symbol_name: Some(basename.to_string()),
            ..Default::default()
        }
    }

    fn push_dedup(list: &mut Vec<String>, value: String) {
        if !list.contains(&value) {
            list.push(value);
        }
    }

    pub fn add_referenced_by(&mut self, loc: String) {
        Self::push_dedup(&mut self.referenced_by, loc);
    }

    pub fn add_subclass(&mut self, name: String) {
        Self::push_dedup(&mut self.subclasses, name);
    }

    pub fn add_dependency(&mut self, path: String) {
        Self::push_dedup(&mut self.dependencies, path);
    }

    pub fn add_dependent(&mut self, path: String) {
        Self::push_dedup(&mut self.dependents, path);
    }
}

/// A finished, identity-bearing chunk ready for embedding and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub filepath: String,
    pub index: usize,
    pub digest: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// `relpath:start_line`, the identity used in `referenced_by`/cross-file edges.
    pub fn location(&self) -> String {
        format!("{}:{}", self.filepath, self.start_line)
    }
}

/// Interim chunk produced by a splitter before identity (digest/index) and,
/// for code chunks, metadata are attached.
pub struct RawChunk {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub metadata: ChunkMetadata,
}

/// File-scoped input to the chunker.
pub struct SourceFile {
    pub filepath: String,
    pub content: String,
    pub digest: String,
}
