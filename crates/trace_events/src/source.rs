use std::future::Future;

use crate::error::TraceSourceError;
use crate::normalized::NormalizedEvent;

/// Window selection for [`TraceSource::fetch`]. Bounds are inclusive, in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct FetchOptions {
    pub since: Option<i64>,
    pub until: Option<i64>,
    /// Keep only the earliest `limit` events of the window.
    pub limit: Option<usize>,
}

impl FetchOptions {
    pub fn contains(&self, timestamp: i64) -> bool {
        self.since.map_or(true, |since| timestamp >= since)
            && self.until.map_or(true, |until| timestamp <= until)
    }

    /// Applies the session filter, the time window and the limit to an already-materialized
    /// event list. Arrival order is preserved among same-timestamp events.
    pub fn select<'a, I>(&self, session_id: &str, events: I) -> Vec<NormalizedEvent>
    where
        I: IntoIterator<Item = &'a NormalizedEvent>,
    {
        let mut selected: Vec<NormalizedEvent> = events
            .into_iter()
            .filter(|ev| ev.session_id == session_id && self.contains(ev.timestamp))
            .cloned()
            .collect();
        if let Some(limit) = self.limit {
            if selected.len() > limit {
                selected.sort_by_key(|ev| ev.timestamp);
                selected.truncate(limit);
            }
        }
        selected
    }
}

/// Supplier of already-normalized events for one session window.
///
/// Fetching is the only suspending step of an analysis pass; implementations own transport,
/// retries and backoff.
pub trait TraceSource {
    fn fetch(
        &self,
        session_id: &str,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<Vec<NormalizedEvent>, TraceSourceError>> + Send;
}

/// Source backed by an event list held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTraceSource {
    events: Vec<NormalizedEvent>,
}

impl InMemoryTraceSource {
    pub fn new(events: Vec<NormalizedEvent>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: NormalizedEvent) {
        self.events.push(event);
    }

    /// Distinct session ids in first-arrival order.
    pub fn session_ids(&self) -> Vec<String> {
        distinct_sessions(&self.events)
    }
}

impl TraceSource for InMemoryTraceSource {
    async fn fetch(
        &self,
        session_id: &str,
        options: &FetchOptions,
    ) -> Result<Vec<NormalizedEvent>, TraceSourceError> {
        Ok(options.select(session_id, &self.events))
    }
}

pub(crate) fn distinct_sessions(events: &[NormalizedEvent]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    events
        .iter()
        .filter(|ev| seen.insert(ev.session_id.as_str()))
        .map(|ev| ev.session_id.clone())
        .collect()
}

#[cfg(feature = "tokio")]
mod jsonl {
    use std::path::{Path, PathBuf};

    use tracing::debug;

    use super::{distinct_sessions, FetchOptions, InMemoryTraceSource, TraceSource};
    use crate::config::{IngestConfig, IngestLimits};
    use crate::error::TraceSourceError;
    use crate::ingest::TraceLineIngestor;
    use crate::normalized::NormalizedEvent;

    /// Source reading a JSONL trace file. The file is re-read on every fetch so appended
    /// records show up in the next pass.
    #[derive(Debug, Clone)]
    pub struct JsonlTraceSource {
        path: PathBuf,
        limits: IngestLimits,
    }

    impl JsonlTraceSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                limits: IngestLimits::default(),
            }
        }

        pub fn with_limits(mut self, limits: IngestLimits) -> Self {
            self.limits = limits;
            self
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Every normalized event in the file, in line order.
        pub async fn load_all(&self) -> Result<Vec<NormalizedEvent>, TraceSourceError> {
            let bytes = tokio::fs::read(&self.path)
                .await
                .map_err(|source| TraceSourceError::Read {
                    path: self.path.clone(),
                    source,
                })?;
            let name = self.path.display().to_string();
            let events = TraceLineIngestor::new(
                bytes.as_slice(),
                IngestConfig::with_limits(self.limits),
                name,
            )
            .into_events();
            debug!(path = %self.path.display(), events = events.len(), "loaded trace file");
            Ok(events)
        }

        pub async fn session_ids(&self) -> Result<Vec<String>, TraceSourceError> {
            Ok(distinct_sessions(&self.load_all().await?))
        }

        /// Reads the file once and serves every later fetch from memory. Use this when one pass
        /// fetches many sessions.
        pub async fn snapshot(&self) -> Result<InMemoryTraceSource, TraceSourceError> {
            Ok(InMemoryTraceSource::new(self.load_all().await?))
        }
    }

    impl TraceSource for JsonlTraceSource {
        async fn fetch(
            &self,
            session_id: &str,
            options: &FetchOptions,
        ) -> Result<Vec<NormalizedEvent>, TraceSourceError> {
            let events = self.load_all().await?;
            Ok(options.select(session_id, &events))
        }
    }
}

#[cfg(feature = "tokio")]
pub use jsonl::JsonlTraceSource;

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<NormalizedEvent> {
        vec![
            NormalizedEvent::message_in(30, "a", "third"),
            NormalizedEvent::message_in(10, "a", "first"),
            NormalizedEvent::message_in(10, "b", "other"),
            NormalizedEvent::message_in(20, "a", "second"),
        ]
    }

    #[test]
    fn select_filters_session_and_window() {
        let options = FetchOptions {
            since: Some(15),
            until: Some(30),
            limit: None,
        };
        let picked = options.select("a", &events());
        let texts: Vec<_> = picked.iter().filter_map(NormalizedEvent::text).collect();
        assert_eq!(texts, vec!["third", "second"]);
    }

    #[test]
    fn limit_keeps_the_earliest_events() {
        let options = FetchOptions {
            limit: Some(2),
            ..FetchOptions::default()
        };
        let picked = options.select("a", &events());
        let stamps: Vec<_> = picked.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![10, 20]);
    }

    #[tokio::test]
    async fn in_memory_source_fetches_one_session() {
        let source = InMemoryTraceSource::new(events());
        assert_eq!(source.session_ids(), vec!["a".to_string(), "b".to_string()]);
        let fetched = source.fetch("b", &FetchOptions::default()).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].text(), Some("other"));
    }
}
