#![forbid(unsafe_code)]
//! Trace-side primitives for failure-signal analysis.
//!
//! This crate turns recorded agent traces into detector input. It provides:
//! - A normalizer that maps several raw event layouts onto one [`NormalizedEvent`] shape.
//! - A line-oriented JSONL ingestor that caps the bytes buffered per line.
//! - Chain reconstruction (idle-gap and length bounded).
//! - The [`TraceSource`] fetch contract plus in-memory and (feature `tokio`) file adapters.

mod chain;
mod config;
mod error;
mod ingest;
mod normalized;
mod reader;
mod schema;
mod source;

pub use chain::{
    reconstruct_chains, ChainOptions, ConversationChain, DEFAULT_MAX_CHAIN_LENGTH,
    DEFAULT_MAX_GAP_SECONDS,
};
pub use config::{ErrorDetailCapture, IngestConfig, IngestLimits};
pub use error::{ErrorDetail, ErrorDetailSink, LineRecord, LineRecordError, TraceSourceError};
pub use ingest::TraceLineIngestor;
pub use normalized::{EventPayload, EventType, NormalizedEvent, DEFAULT_AGENT_ID};
pub use reader::{BoundedLine, BoundedLineReader};
pub use schema::{
    detect_schema, map_event_type, normalize_event, normalize_payload, normalize_raw,
    SchemaVersion,
};
pub use source::{FetchOptions, InMemoryTraceSource, TraceSource};

#[cfg(feature = "tokio")]
pub use source::JsonlTraceSource;
