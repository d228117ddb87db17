pub mod basic;
pub mod code;
pub mod document;

pub use document::{chunk_document, chunk_document_without_id, should_chunk};
