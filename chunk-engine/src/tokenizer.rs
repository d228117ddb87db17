//! Token counting via a process-wide cached BPE encoding.

use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

static ENCODING: OnceLock<CoreBPE> = OnceLock::new();

fn encoding() -> &'static CoreBPE {
    ENCODING.get_or_init(|| tiktoken_rs::cl100k_base().expect("cl100k_base encoding must load"))
}

/// Number of `cl100k_base` tokens in `text`.
pub fn count_tokens(text: &str) -> usize {
    encoding().encode_with_special_tokens(text).len()
}
