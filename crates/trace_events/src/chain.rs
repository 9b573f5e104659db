use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::normalized::{EventType, NormalizedEvent};

pub const DEFAULT_MAX_GAP_SECONDS: u64 = 300;
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ChainOptions {
    /// Idle time (exclusive) after which the next event opens a new chain.
    pub max_gap_seconds: u64,
    /// Hard cap on events per chain; reaching it forces a split.
    pub max_chain_length: usize,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            max_gap_seconds: DEFAULT_MAX_GAP_SECONDS,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }
}

/// One session/agent exchange, delimited by idle gaps. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationChain {
    pub session_id: String,
    pub agent_id: String,
    pub chain_id: String,
    pub events: Vec<NormalizedEvent>,
}

impl ConversationChain {
    pub fn start_timestamp(&self) -> Option<i64> {
        self.events.first().map(|ev| ev.timestamp)
    }

    pub fn end_timestamp(&self) -> Option<i64> {
        self.events.last().map(|ev| ev.timestamp)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Groups events by `(session_id, agent_id)` and cuts each group into chains.
///
/// `Unknown` events are dropped first; they never bridge an idle gap or count toward the length
/// cap.
///
/// Events are sorted by timestamp with a stable sort, so same-timestamp events keep the order in
/// which they were handed in. Output chains are ordered by start time; groups that start at the
/// same instant keep first-arrival order.
pub fn reconstruct_chains(
    events: Vec<NormalizedEvent>,
    options: ChainOptions,
) -> Vec<ConversationChain> {
    let max_gap_ms =
        i64::try_from(options.max_gap_seconds.saturating_mul(1000)).unwrap_or(i64::MAX);
    let max_len = options.max_chain_length.max(1);

    let mut group_index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<Vec<NormalizedEvent>> = Vec::new();
    let mut unknown = 0usize;
    for event in events {
        if event.event_type == EventType::Unknown {
            unknown += 1;
            continue;
        }
        let key = (event.session_id.clone(), event.agent_id.clone());
        let idx = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(event);
    }

    if unknown > 0 {
        debug!(unknown, "dropped events of unknown type before chaining");
    }

    let mut chains = Vec::new();
    for mut group in groups {
        group.sort_by_key(|ev| ev.timestamp);

        let mut current: Vec<NormalizedEvent> = Vec::new();
        let mut index = 0usize;
        for event in group {
            let gap_exceeded = current
                .last()
                .is_some_and(|prev| event.timestamp.saturating_sub(prev.timestamp) > max_gap_ms);
            if !current.is_empty() && (gap_exceeded || current.len() >= max_len) {
                chains.push(finish_chain(std::mem::take(&mut current), index));
                index += 1;
            }
            current.push(event);
        }
        if !current.is_empty() {
            chains.push(finish_chain(current, index));
        }
    }

    chains.sort_by_key(|chain| chain.start_timestamp().unwrap_or(i64::MIN));
    chains
}

fn finish_chain(events: Vec<NormalizedEvent>, index: usize) -> ConversationChain {
    let session_id = events[0].session_id.clone();
    let agent_id = events[0].agent_id.clone();
    ConversationChain {
        chain_id: format!("{session_id}:{agent_id}:{index}"),
        session_id,
        agent_id,
        events,
    }
}
