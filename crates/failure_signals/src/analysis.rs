//! One analysis pass: fetch, reconstruct, detect.
//!
//! Fetching is the only step that suspends. Stateless detection then runs per chain on the
//! blocking pool; repeat-fail detection runs afterwards, in chain order, under a single lock
//! of the shared state so results do not depend on worker scheduling.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use trace_events::{reconstruct_chains, FetchOptions, TraceSource, TraceSourceError};
use tracing::debug;

use crate::detectors::SharedRepeatFailState;
use crate::runner::SignalRunner;
use crate::signal::FailureSignal;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Source(#[from] TraceSourceError),
    #[error("detection worker failed: {0}")]
    Worker(#[from] JoinError),
    #[error("repeat-fail state lock is poisoned")]
    StatePoisoned,
}

/// Signals found in one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainReport {
    pub chain_id: String,
    pub session_id: String,
    pub agent_id: String,
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
    pub event_count: usize,
    pub signals: Vec<FailureSignal>,
}

/// Analyzes one session of `source` and returns one report per chain, in chain order.
pub async fn analyze<S>(
    source: &S,
    session_id: &str,
    options: &FetchOptions,
    runner: &SignalRunner,
    state: &SharedRepeatFailState,
) -> Result<Vec<ChainReport>, AnalysisError>
where
    S: TraceSource,
{
    let events = source.fetch(session_id, options).await?;
    let chains = reconstruct_chains(events, runner.chain_options());
    debug!(session = session_id, chains = chains.len(), "reconstructed chains");

    let mut workers = JoinSet::new();
    for (idx, chain) in chains.into_iter().enumerate() {
        let runner = runner.clone();
        workers.spawn_blocking(move || {
            let signals = runner.detect_stateless(&chain);
            (idx, chain, signals)
        });
    }

    let mut detected = Vec::with_capacity(workers.len());
    while let Some(joined) = workers.join_next().await {
        detected.push(joined?);
    }
    detected.sort_by_key(|(idx, _, _)| *idx);

    let mut guard = state.lock().map_err(|_| AnalysisError::StatePoisoned)?;
    let mut reports = Vec::with_capacity(detected.len());
    for (_, chain, mut signals) in detected {
        signals.extend(runner.detect_repeat_fail(&chain, &mut guard));
        reports.push(ChainReport {
            start_timestamp: chain.start_timestamp(),
            end_timestamp: chain.end_timestamp(),
            event_count: chain.len(),
            chain_id: chain.chain_id,
            session_id: chain.session_id,
            agent_id: chain.agent_id,
            signals,
        });
    }
    let evicted = guard.evict();
    drop(guard);

    debug!(
        session = session_id,
        reports = reports.len(),
        signals = reports.iter().map(|r| r.signals.len()).sum::<usize>(),
        evicted,
        "analysis pass finished"
    );
    Ok(reports)
}
