//! Builders converting high-level `StoreFilter` into Qdrant filters.
//!
//! qdrant-client 1.15 specifics:
//! - `Condition` is a wrapper with `condition_one_of: Option<condition::ConditionOneOf>`.
//!   There are no helper constructors like `Condition::Field`; you must set the enum.
//! - `FieldCondition.r#match` expects a `Match`, which wraps `r#match::MatchValue`.
//! - Floats are not supported by `MatchValue`; use `Range { gte, lte }` for equality-like behavior.

use crate::record::StoreFilter;
use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, Range, condition, r#match::MatchValue,
};
use serde_json::Value as J;
use tracing::trace;

/// Converts a high-level `StoreFilter` into a concrete Qdrant `Filter`.
///
/// Supported mappings:
/// - `ByPath("...")` -> exact equality via `MatchValue::Keyword`
/// - `ByFieldEq { key, value }`:
///   - string  -> `MatchValue::Keyword`
///   - integer -> `MatchValue::Integer`
///   - boolean -> `MatchValue::Boolean`
///   - float   -> `Range { gte = val, lte = val }`
/// - `And([...])` -> flatten into `must`
/// - `Or([...])`  -> each sub-filter wrapped into `Condition::Filter` and appended to `should`
pub fn to_qdrant_filter(f: &StoreFilter) -> Filter {
    trace!("filters::to_qdrant_filter kind={}", kind_of_filter(f));
    match f {
        StoreFilter::ByPath(src) => Filter {
            must: vec![condition_field_eq("path", &J::String(src.clone()))],
            ..Default::default()
        },

        StoreFilter::ByFieldEq { key, value } => Filter {
            must: vec![condition_field_eq(key, value)],
            ..Default::default()
        },

        StoreFilter::And(list) => {
            let mut out = Filter::default();
            for sub in list {
                let sf = to_qdrant_filter(sub);
                out.must.extend(sf.must);
                out.should.extend(sf.should);
                out.must_not.extend(sf.must_not);
            }
            out
        }

        StoreFilter::Or(list) => {
            let mut out = Filter::default();
            for sub in list {
                let sf = to_qdrant_filter(sub);
                // Wrap sub-filter into a nested filter condition.
                out.should.push(Condition {
                    condition_one_of: Some(condition::ConditionOneOf::Filter(sf)),
                });
            }
            out
        }
    }
}

/// Builds a single equality-like `Condition` for a field.
///
/// For floats we express equality as a narrow range: `gte == lte == value`.
fn condition_field_eq(key: impl Into<String>, value: &J) -> Condition {
    let key = key.into();

    // Build FieldCondition with either r#match or range set.
    let field = match value {
        J::String(s) => FieldCondition {
            key,
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(s.clone())),
            }),
            ..Default::default()
        },

        J::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldCondition {
                    key,
                    r#match: Some(Match {
                        match_value: Some(MatchValue::Integer(i)),
                    }),
                    ..Default::default()
                }
            } else if let Some(f) = n.as_f64() {
                // Float equality => use Range.
                FieldCondition {
                    key,
                    range: Some(Range {
                        gte: Some(f),
                        lte: Some(f),
                        ..Default::default()
                    }),
                    ..Default::default()
                }
            } else {
                // Fallback: stringify and match as keyword.
                FieldCondition {
                    key,
                    r#match: Some(Match {
                        match_value: Some(MatchValue::Keyword(n.to_string())),
                    }),
                    ..Default::default()
                }
            }
        }

        J::Bool(b) => FieldCondition {
            key,
            r#match: Some(Match {
                match_value: Some(MatchValue::Boolean(*b)),
            }),
            ..Default::default()
        },

        // Null/Array/Object: fall back to keyword over stringified JSON.
        other => FieldCondition {
            key,
            r#match: Some(Match {
                match_value: Some(MatchValue::Keyword(other.to_string())),
            }),
            ..Default::default()
        },
    };

    // Wrap FieldCondition into ConditionOneOf::Field.
    Condition {
        condition_one_of: Some(condition::ConditionOneOf::Field(field)),
    }
}

/// Small helper for tracing readable filter kind names.
fn kind_of_filter(f: &StoreFilter) -> &'static str {
    match f {
        StoreFilter::ByPath(_) => "ByPath",
        StoreFilter::ByFieldEq { .. } => "ByFieldEq",
        StoreFilter::And(_) => "And",
        StoreFilter::Or(_) => "Or",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_path_becomes_must_keyword_match() {
        let filter = to_qdrant_filter(&StoreFilter::ByPath("src/a.py".to_string()));
        assert_eq!(filter.must.len(), 1);
        assert!(filter.should.is_empty());
    }

    #[test]
    fn and_flattens_into_must() {
        let filter = to_qdrant_filter(&StoreFilter::And(vec![
            StoreFilter::ByPath("a.py".to_string()),
            StoreFilter::ByFieldEq {
                key: "index".to_string(),
                value: J::Number(2.into()),
            },
        ]));
        assert_eq!(filter.must.len(), 2);
    }
}
