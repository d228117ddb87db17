//! AST provider: selects a tree-sitter grammar by file extension and parses.
//!
//! The grammar registry is process-wide and write-once per language, mirroring
//! the original implementation's module-level `_name_to_language` cache.

use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tree_sitter::{Language, Parser, Tree};

/// Grammar-bearing languages this engine can parse into a structural AST.
/// Declarative/markup languages are intentionally absent here — they are
/// routed to the line-level splitter regardless of grammar availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LangId {
    Python,
    Javascript,
    Typescript,
    Tsx,
    Java,
    Rust,
    Go,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Bash,
    Lua,
}

/// Extension -> language routing table (spec section 6).
pub fn lang_for_extension(ext: &str) -> Option<LangId> {
    Some(match ext.to_ascii_lowercase().as_str() {
        "py" | "pyw" | "pyi" => LangId::Python,
        "js" | "jsx" | "mjs" | "cjs" => LangId::Javascript,
        "ts" | "mts" | "cts" => LangId::Typescript,
        "tsx" => LangId::Tsx,
        "java" => LangId::Java,
        "rs" => LangId::Rust,
        "go" => LangId::Go,
        "c" | "h" => LangId::C,
        "cpp" | "hpp" | "cc" | "cxx" | "hxx" | "cp" | "hh" | "inc" => LangId::Cpp,
        "cs" => LangId::CSharp,
        "rb" | "erb" => LangId::Ruby,
        "php" | "phtml" | "php3" | "php4" | "php5" | "php6" | "php7" | "phps" => LangId::Php,
        "sh" | "bash" => LangId::Bash,
        "lua" | "luau" => LangId::Lua,
        _ => return None,
    })
}

/// Extensions routed to the non-code line splitter even when a grammar exists
/// for the same logical family (spec section 6).
pub const NON_CODE_EXTENSIONS: &[&str] = &["css", "html", "htm", "json", "toml", "yaml", "yml"];

static GRAMMARS: OnceLock<Mutex<HashMap<LangId, Language>>> = OnceLock::new();

fn load_language(id: LangId) -> Language {
    match id {
        LangId::Python => tree_sitter_python::LANGUAGE.into(),
        LangId::Javascript => tree_sitter_javascript::LANGUAGE.into(),
        LangId::Typescript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        LangId::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        LangId::Java => tree_sitter_java::LANGUAGE.into(),
        LangId::Rust => tree_sitter_rust::LANGUAGE.into(),
        LangId::Go => tree_sitter_go::LANGUAGE.into(),
        LangId::C => tree_sitter_c::LANGUAGE.into(),
        LangId::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        LangId::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        LangId::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        LangId::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        LangId::Bash => tree_sitter_bash::LANGUAGE.into(),
        LangId::Lua => tree_sitter_lua::LANGUAGE.into(),
    }
}

fn language_for(id: LangId) -> Language {
    let cache = GRAMMARS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().expect("grammar cache poisoned");
    guard.entry(id).or_insert_with(|| load_language(id)).clone()
}

/// Builds a parser for `id`. Returns `Error::TreeSitterLanguage` if the grammar
/// cannot be installed into a fresh parser (should not happen for a grammar
/// that compiled into this binary, but the caller's fallback path depends on
/// this being a recoverable `Result` rather than a panic).
pub fn parser_for(id: LangId) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language_for(id))
        .map_err(|_| Error::TreeSitterLanguage)?;
    Ok(parser)
}

/// Parses `source` with the grammar for `id`.
pub fn parse(id: LangId, source: &[u8]) -> Result<Tree> {
    let mut parser = parser_for(id)?;
    parser.parse(source, None).ok_or(Error::TreeSitterParse)
}

/// Selects a grammar for `path` by extension, if one is registered and the
/// extension is not in the non-code set.
pub fn lang_for_path(path: &Path) -> Option<LangId> {
    let ext = path.extension()?.to_str()?;
    if NON_CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
        return None;
    }
    lang_for_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_extensions() {
        assert_eq!(lang_for_extension("py"), Some(LangId::Python));
        assert_eq!(lang_for_extension("rs"), Some(LangId::Rust));
        assert_eq!(lang_for_extension("tsx"), Some(LangId::Tsx));
        assert_eq!(lang_for_extension("unknown_ext"), None);
    }

    #[test]
    fn non_code_extensions_excluded_from_lang_for_path() {
        assert_eq!(lang_for_path(Path::new("a.json")), None);
        assert_eq!(lang_for_path(Path::new("a.yaml")), None);
    }

    #[test]
    fn parses_simple_python() {
        let tree = parse(LangId::Python, b"def f():\n    pass\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
    }
}
