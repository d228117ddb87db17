//! The unit of work an `Indexer` batch is driven by: three disjoint lists of
//! `(path, cache_key)` describing what changed since the last run.

/// A file path paired with the cache key (typically a content digest) the
/// caller last observed for it.
#[derive(Clone, Debug)]
pub struct PathAndCacheKey {
    pub path: String,
    pub cache_key: String,
}

impl PathAndCacheKey {
    pub fn new(path: impl Into<String>, cache_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cache_key: cache_key.into(),
        }
    }
}

/// Which bucket a path fell into when the caller diffed the project tree
/// against its last-known state.
#[derive(Clone, Debug, Default)]
pub struct RefreshPlan {
    /// Files that changed (or are new) and must be re-chunked and re-embedded.
    pub compute: Vec<PathAndCacheKey>,
    /// Files whose content is unchanged but need relinking (resolver-only).
    pub add_tag: Vec<PathAndCacheKey>,
    /// Files removed from the project; their rows must be dropped.
    pub delete: Vec<PathAndCacheKey>,
}

impl RefreshPlan {
    pub fn is_empty(&self) -> bool {
        self.compute.is_empty() && self.add_tag.is_empty() && self.delete.is_empty()
    }
}

/// Which of the three plan buckets a progress record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexResultKind {
    Compute,
    AddTag,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_reports_empty() {
        assert!(RefreshPlan::default().is_empty());
    }

    #[test]
    fn plan_with_one_delete_is_not_empty() {
        let plan = RefreshPlan {
            delete: vec![PathAndCacheKey::new("a.py", "digest")],
            ..Default::default()
        };
        assert!(!plan.is_empty());
    }
}
