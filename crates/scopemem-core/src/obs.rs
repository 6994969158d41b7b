//! Structured lifecycle events for recall and retention.
//!
//! Every event carries an `event = "..."` field so log pipelines can filter
//! on it. Levels follow `RUST_LOG`; set `--json` on the CLI for JSON lines.

use tracing::{info, warn};

use crate::scope::ScopeTier;

/// Span covering one scoped query. Instrument the query future with it so
/// every event from the fan-out carries the user and tier.
pub fn query_span(user_id: &str, tier: ScopeTier, group: bool) -> tracing::Span {
    tracing::info_span!("scopemem.query", user_id = %user_id, tier = %tier, group = group)
}

pub fn emit_query_started(tier: ScopeTier, group: bool, datasets: usize) {
    info!(event = "query.started", tier = %tier, group = group, datasets = datasets);
}

pub fn emit_dataset_failed(dataset: &str, error: &dyn std::fmt::Display) {
    warn!(event = "query.dataset_failed", dataset = %dataset, error = %error);
}

pub fn emit_query_completed(
    datasets_queried: usize,
    total_before_filter: usize,
    returned: usize,
    duration_ms: u64,
) {
    info!(
        event = "query.completed",
        datasets_queried = datasets_queried,
        total_before_filter = total_before_filter,
        returned = returned,
        duration_ms = duration_ms,
    );
}

/// Results withheld by the privacy filter. Any withheld result means a
/// private dataset leaked into a group fan-out, so this logs at `warn!`.
pub fn emit_privacy_filtered(removed: usize) {
    if removed > 0 {
        warn!(event = "privacy.filtered", removed = removed);
    }
}

pub fn emit_retention_pruned(removed: usize, remaining: usize, threshold: f64) {
    info!(
        event = "retention.pruned",
        removed = removed,
        remaining = remaining,
        threshold = threshold,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        out.text()
    }

    #[test]
    fn test_events_carry_query_span_fields() {
        let logs = capture(|| {
            let _guard = query_span("alice", ScopeTier::Personal, true).entered();
            emit_query_started(ScopeTier::Personal, true, 2);
            emit_query_completed(2, 5, 3, 12);
        });
        let started = logs
            .lines()
            .find(|l| l.contains("query.started"))
            .unwrap_or_else(|| panic!("no query.started line in {logs:?}"));
        assert!(started.contains("scopemem.query"), "{started}");
        assert!(started.contains("user_id=alice"), "{started}");
        assert!(started.contains("datasets=2"), "{started}");

        let completed = logs.lines().find(|l| l.contains("query.completed")).unwrap();
        assert!(completed.contains("total_before_filter=5"), "{completed}");
        assert!(completed.contains("returned=3"), "{completed}");
    }

    #[test]
    fn test_privacy_filtered_only_logged_when_something_was_removed() {
        let quiet = capture(|| emit_privacy_filtered(0));
        assert!(!quiet.contains("privacy.filtered"), "{quiet}");

        let loud = capture(|| emit_privacy_filtered(2));
        assert!(loud.contains("privacy.filtered"), "{loud}");
        assert!(loud.contains("WARN"), "{loud}");
        assert!(loud.contains("removed=2"), "{loud}");
    }
}
