//! Parallel fan-out of one query across every dataset visible to a scope.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

use super::executor::{CancellationSignal, SearchExecutor, SearchRequest};
use super::privacy::filter_private_results;
use super::types::{DatasetIdMap, QueryOptions, ScopedQueryResult, ScopedSearchResult, SearchHit};
use crate::error::SearchError;
use crate::metrics::METRICS;
use crate::obs;
use crate::scope::{classify_dataset, resolve_recall_datasets, ScopeContext};

type SearchOutcome = Result<Vec<SearchHit>, SearchError>;

/// Search every recall dataset of `scope` that has a backend id.
///
/// Never fails: a dataset whose search errors, panics, or is still running
/// when `options.timeout` elapses contributes no results. Callers detect
/// degraded answers through `datasets_queried` and `total_before_filter`.
///
/// Output is ordered by score descending; ties keep dataset resolution
/// order, independent of which search finished first.
pub async fn query_scoped_knowledge(
    query: &str,
    scope: &ScopeContext,
    executor: Arc<dyn SearchExecutor>,
    dataset_ids: &DatasetIdMap,
    options: &QueryOptions,
) -> ScopedQueryResult {
    let span = obs::query_span(&scope.user_id, scope.tier, scope.is_group_session);
    fan_out(query, scope, executor, dataset_ids, options)
        .instrument(span)
        .await
}

async fn fan_out(
    query: &str,
    scope: &ScopeContext,
    executor: Arc<dyn SearchExecutor>,
    dataset_ids: &DatasetIdMap,
    options: &QueryOptions,
) -> ScopedQueryResult {
    let started = Instant::now();

    let targets: Vec<(String, String)> = resolve_recall_datasets(scope)
        .into_iter()
        .filter_map(|name| {
            let id = dataset_ids.get(&name)?.clone();
            Some((name, id))
        })
        .collect();

    if targets.is_empty() {
        debug!("no recall dataset has a backend id yet");
        return ScopedQueryResult::default();
    }

    METRICS.inc_queries();
    METRICS.add_dataset_searches(targets.len() as u64);
    obs::emit_query_started(scope.tier, scope.is_group_session, targets.len());

    let (trigger, signal) = CancellationSignal::pair();
    let timeout = options.timeout;
    let deadline = tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        trigger.cancel();
    });

    let handles: Vec<JoinHandle<SearchOutcome>> = targets
        .iter()
        .map(|(_, dataset_id)| {
            let request = SearchRequest {
                query_text: query.to_string(),
                search_type: options.search_type,
                dataset_ids: vec![dataset_id.clone()],
                max_tokens: options.max_tokens,
                cancel: signal.clone(),
            };
            tokio::spawn(search_until_cancelled(Arc::clone(&executor), request).in_current_span())
        })
        .collect();

    let outcomes = join_all(handles).await;
    deadline.abort();

    let mut annotated = Vec::new();
    for ((name, _), outcome) in targets.iter().zip(outcomes) {
        let hits = match outcome {
            Ok(Ok(hits)) => hits,
            Ok(Err(err)) => {
                METRICS.inc_dataset_search_failures();
                obs::emit_dataset_failed(name, &err);
                continue;
            }
            Err(join_err) => {
                METRICS.inc_dataset_search_failures();
                obs::emit_dataset_failed(name, &join_err);
                continue;
            }
        };
        let tier = classify_dataset(name, &scope.user_id).tier;
        annotated.extend(hits.into_iter().map(|hit| ScopedSearchResult {
            id: hit.id,
            text: hit.text,
            score: hit.score,
            source_dataset: name.clone(),
            source_tier: tier,
        }));
    }

    let total_before_filter = annotated.len();
    let visible = filter_private_results(annotated, scope).results;
    let results = rank_results(visible, options.min_score, options.max_results);

    obs::emit_query_completed(
        targets.len(),
        total_before_filter,
        results.len(),
        started.elapsed().as_millis() as u64,
    );

    ScopedQueryResult {
        results,
        datasets_queried: targets.len(),
        total_before_filter,
    }
}

async fn search_until_cancelled(
    executor: Arc<dyn SearchExecutor>,
    request: SearchRequest,
) -> SearchOutcome {
    let cancel = request.cancel.clone();
    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }
    // A result that is ready at the deadline still counts.
    tokio::select! {
        biased;
        outcome = executor.search(request) => outcome,
        _ = cancel.cancelled() => Err(SearchError::Cancelled),
    }
}

/// Score floor, stable descending sort, text dedup, then truncation.
///
/// Dedup compares trimmed, lowercased text; the first occurrence after
/// sorting (the highest score) wins.
pub fn rank_results(
    results: Vec<ScopedSearchResult>,
    min_score: f64,
    max_results: usize,
) -> Vec<ScopedSearchResult> {
    let mut kept: Vec<_> = results
        .into_iter()
        .filter(|r| r.score >= min_score)
        .collect();
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    kept.retain(|r| seen.insert(r.text.trim().to_lowercase()));
    kept.truncate(max_results);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeTier;

    fn hit(id: &str, text: &str, score: f64, dataset: &str) -> ScopedSearchResult {
        ScopedSearchResult {
            id: id.to_string(),
            text: text.to_string(),
            score,
            source_dataset: dataset.to_string(),
            source_tier: ScopeTier::Personal,
        }
    }

    #[test]
    fn test_rank_sorts_descending() {
        let ranked = rank_results(
            vec![hit("a", "one", 0.2, "d"), hit("b", "two", 0.9, "d"), hit("c", "three", 0.5, "d")],
            0.0,
            10,
        );
        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank_results(
            vec![hit("first", "x", 0.5, "d1"), hit("second", "y", 0.5, "d2")],
            0.0,
            10,
        );
        assert_eq!(ranked[0].id, "first");
        assert_eq!(ranked[1].id, "second");
    }

    #[test]
    fn test_rank_dedup_normalizes_text() {
        let ranked = rank_results(
            vec![
                hit("low", "Deploy on Fridays ", 0.4, "d1"),
                hit("high", "  deploy on fridays", 0.8, "d2"),
            ],
            0.0,
            10,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "high");
    }

    #[test]
    fn test_rank_min_score_inclusive() {
        let ranked = rank_results(
            vec![hit("a", "a", 0.5, "d"), hit("b", "b", 0.49, "d")],
            0.5,
            10,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "a");
    }

    #[test]
    fn test_rank_drops_nan_and_truncates() {
        let ranked = rank_results(
            vec![
                hit("nan", "n", f64::NAN, "d"),
                hit("a", "a", 0.3, "d"),
                hit("b", "b", 0.2, "d"),
                hit("c", "c", 0.1, "d"),
            ],
            0.0,
            2,
        );
        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
