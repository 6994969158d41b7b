//! Second enforcement layer for the group-session privacy boundary.
//!
//! Independent of which datasets the resolver picked: every result is
//! re-classified by its own `source_dataset`.

use std::collections::HashSet;

use super::types::ScopedSearchResult;
use crate::metrics::METRICS;
use crate::obs;
use crate::scope::{classify_dataset, ScopeContext};

/// Identity of one result across datasets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultKey {
    pub dataset: String,
    pub id: String,
}

impl ResultKey {
    fn of(result: &ScopedSearchResult) -> Self {
        Self {
            dataset: result.source_dataset.clone(),
            id: result.id.clone(),
        }
    }
}

/// Results that passed the filter, plus the keys that were withheld.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivacyFiltered {
    pub results: Vec<ScopedSearchResult>,
    pub withheld: Vec<ResultKey>,
}

/// Drop results from private datasets when `scope` is a group session.
///
/// Outside group sessions nothing is removed. Order is preserved.
pub fn filter_private_results(
    results: Vec<ScopedSearchResult>,
    scope: &ScopeContext,
) -> PrivacyFiltered {
    if !scope.is_group_session {
        return PrivacyFiltered {
            results,
            withheld: Vec::new(),
        };
    }

    let mut withheld = Vec::new();
    let mut seen = HashSet::new();
    for result in &results {
        if classify_dataset(&result.source_dataset, &scope.user_id).is_private {
            let key = ResultKey::of(result);
            if seen.insert(key.clone()) {
                withheld.push(key);
            }
        }
    }
    if withheld.is_empty() {
        return PrivacyFiltered { results, withheld };
    }

    let kept: Vec<_> = results
        .into_iter()
        .filter(|r| !seen.contains(&ResultKey::of(r)))
        .collect();

    let removed = withheld.len();
    METRICS.add_privacy_withheld(removed as u64);
    obs::emit_privacy_filtered(removed);

    PrivacyFiltered {
        results: kept,
        withheld,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeTier;

    fn result(id: &str, dataset: &str, tier: ScopeTier) -> ScopedSearchResult {
        ScopedSearchResult {
            id: id.to_string(),
            text: format!("text {id}"),
            score: 0.5,
            source_dataset: dataset.to_string(),
            source_tier: tier,
        }
    }

    #[test]
    fn test_one_to_one_keeps_private() {
        let scope = ScopeContext::personal("alice");
        let out = filter_private_results(
            vec![result("m1", "alice-private", ScopeTier::Personal)],
            &scope,
        );
        assert_eq!(out.results.len(), 1);
        assert!(out.withheld.is_empty());
    }

    #[test]
    fn test_group_drops_private_and_unknown() {
        let scope = ScopeContext::personal("alice").in_group();
        let out = filter_private_results(
            vec![
                result("m1", "alice-private", ScopeTier::Personal),
                result("m2", "alice-profile", ScopeTier::Personal),
                result("m3", "bob-private", ScopeTier::Personal),
                result("m4", "team-shared", ScopeTier::Team),
                result("m5", "mystery", ScopeTier::Personal),
            ],
            &scope,
        );
        let ids: Vec<_> = out.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m4"]);
        assert_eq!(out.withheld.len(), 3);
    }

    #[test]
    fn test_same_id_different_dataset_not_confused() {
        let scope = ScopeContext::personal("alice").in_group();
        let out = filter_private_results(
            vec![
                result("shared-id", "alice-private", ScopeTier::Personal),
                result("shared-id", "team-shared", ScopeTier::Team),
            ],
            &scope,
        );
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].source_dataset, "team-shared");
        assert_eq!(
            out.withheld,
            vec![ResultKey {
                dataset: "alice-private".to_string(),
                id: "shared-id".to_string(),
            }]
        );
    }

    #[test]
    fn test_ignores_annotated_tier() {
        // A mislabelled tier must not let a private dataset through.
        let scope = ScopeContext::personal("alice").in_group();
        let out = filter_private_results(
            vec![result("m1", "alice-private", ScopeTier::Team)],
            &scope,
        );
        assert!(out.results.is_empty());
    }
}
