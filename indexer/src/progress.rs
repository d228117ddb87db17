//! Progress records the `Indexer` emits at file-level granularity as a batch
//! proceeds, via the caller-supplied callback (see §5 of the design notes:
//! this collapses the source's bidirectional generator onto a single callback).

use crate::plan::IndexResultKind;

/// Lifecycle state of a single file's progress record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressStatus {
    Indexing,
    Success,
    Error,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Indexing => "indexing",
            ProgressStatus::Success => "success",
            ProgressStatus::Error => "error",
        }
    }
}

/// One progress update for one file within a batch.
#[derive(Clone, Debug)]
pub struct IndexingProgress {
    pub desc: String,
    pub status: ProgressStatus,
    /// Fraction of the batch completed so far, in `[0, 1]`.
    pub progress: f32,
    pub kind: IndexResultKind,
}

impl IndexingProgress {
    pub fn new(desc: impl Into<String>, status: ProgressStatus, progress: f32, kind: IndexResultKind) -> Self {
        Self {
            desc: desc.into(),
            status,
            progress: progress.clamp(0.0, 1.0),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped_into_unit_range() {
        let p = IndexingProgress::new("a.py", ProgressStatus::Success, 1.5, IndexResultKind::Compute);
        assert_eq!(p.progress, 1.0);
    }

    #[test]
    fn status_as_str_matches_the_wire_vocabulary() {
        assert_eq!(ProgressStatus::Indexing.as_str(), "indexing");
        assert_eq!(ProgressStatus::Success.as_str(), "success");
        assert_eq!(ProgressStatus::Error.as_str(), "error");
    }
}
