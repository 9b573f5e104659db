#![forbid(unsafe_code)]
//! Failure-signal detection over reconstructed agent trace chains.
//!
//! A [`SignalRunner`] is built from an [`AnalyzerConfig`]: it merges the selected language
//! packs into a [`PatternRegistry`] and instantiates the enabled detectors. Stateless detectors
//! are pure functions of one chain; the repeat-fail detector additionally reads and writes a
//! caller-owned [`RepeatFailState`].
//!
//! ```no_run
//! use std::sync::Mutex;
//!
//! use failure_signals::{analyze, AnalyzerConfig, RepeatFailState, SignalRunner};
//! use trace_events::{FetchOptions, JsonlTraceSource};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalyzerConfig::load("trace-scan.toml")?;
//! let runner = SignalRunner::new(&config);
//! let state = Mutex::new(RepeatFailState::new(config.repeat_fail_max_fingerprints));
//! let source = JsonlTraceSource::new("traces.jsonl");
//!
//! for report in analyze(&source, "session-1", &FetchOptions::default(), &runner, &state).await? {
//!     println!("{}: {} signals", report.chain_id, report.signals.len());
//! }
//! # Ok(())
//! # }
//! ```

mod analysis;
mod config;
pub mod detectors;
pub mod patterns;
mod runner;
mod signal;
pub mod similarity;

pub use analysis::{analyze, AnalysisError, ChainReport};
pub use config::{
    AnalyzerConfig, ConfigError, CustomPatterns, LanguageSelection, PatternMode,
    DEFAULT_DOOM_LOOP_THRESHOLD, DEFAULT_DOOM_LOOP_WINDOW, DEFAULT_REPEAT_FAIL_MAX_FINGERPRINTS,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use detectors::{
    fingerprint, normalize_error, strip_volatile_params, tool_exchanges, FingerprintEntry,
    RecordOutcome, RepeatFailDetector, RepeatFailState, SharedRepeatFailState, SignalDetector,
    ToolExchange,
};
pub use patterns::{PatternCategory, PatternRegistry, PatternSet};
pub use runner::SignalRunner;
pub use signal::{EventRange, FailureSignal, Severity, SignalKind};
