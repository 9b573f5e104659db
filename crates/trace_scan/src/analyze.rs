use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use failure_signals::{
    analyze, AnalysisError, AnalyzerConfig, ConfigError, RepeatFailState, SignalRunner,
};
use thiserror::Error;
use trace_events::{FetchOptions, IngestLimits, JsonlTraceSource, TraceSourceError};
use tracing::{debug, info};

#[derive(Debug, Parser)]
pub struct Args {
    /// JSONL trace file to read.
    #[arg(long)]
    pub events: PathBuf,

    /// TOML analyzer configuration (defaults apply when omitted).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Session to analyze; repeatable. Defaults to every session in the file.
    #[arg(long = "session")]
    pub sessions: Vec<String>,

    /// Inclusive lower bound, in epoch milliseconds.
    #[arg(long)]
    pub since: Option<i64>,

    /// Inclusive upper bound, in epoch milliseconds.
    #[arg(long)]
    pub until: Option<i64>,

    /// Keep only the earliest N events of each session.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Repeat-fail state file; read if present and rewritten after the run.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Lines longer than this many bytes are skipped.
    #[arg(long, default_value_t = IngestLimits::default().max_line_bytes)]
    pub max_line_bytes: usize,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    #[error("invalid repeat-fail state in `{path}`: {source}")]
    State {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] TraceSourceError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub async fn run(args: Args) -> Result<(), Error> {
    let config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    let runner = SignalRunner::new(&config);

    let mut state = match &args.state {
        Some(path) => load_state(path)?,
        None => RepeatFailState::default(),
    };
    state.set_max_entries(config.repeat_fail_max_fingerprints);
    let state = Mutex::new(state);

    let source = JsonlTraceSource::new(&args.events)
        .with_limits(IngestLimits {
            max_line_bytes: args.max_line_bytes,
            max_events: None,
        })
        .snapshot()
        .await?;
    let sessions = if args.sessions.is_empty() {
        let mut found = source.session_ids();
        found.sort();
        found
    } else {
        args.sessions.clone()
    };
    debug!(sessions = sessions.len(), path = %args.events.display(), "analyzing trace file");

    let options = FetchOptions {
        since: args.since,
        until: args.until,
        limit: args.limit,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut total = 0usize;
    for session in &sessions {
        for report in analyze(&source, session, &options, &runner, &state).await? {
            total += report.signals.len();
            serde_json::to_writer(&mut out, &report)?;
            out.write_all(b"\n").map_err(Error::Output)?;
        }
    }
    out.flush().map_err(Error::Output)?;
    info!(sessions = sessions.len(), signals = total, "scan finished");

    if let Some(path) = &args.state {
        let state = state
            .into_inner()
            .map_err(|_| AnalysisError::StatePoisoned)?;
        save_state(path, &state)?;
    }
    Ok(())
}

/// A missing file means a fresh state.
fn load_state(path: &Path) -> Result<RepeatFailState, Error> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no repeat-fail state yet; starting fresh");
            return Ok(RepeatFailState::default());
        }
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| Error::State {
        path: path.to_path_buf(),
        source,
    })
}

fn save_state(path: &Path, state: &RepeatFailState) -> Result<(), Error> {
    let mut bytes = serde_json::to_vec_pretty(state)?;
    bytes.push(b'\n');
    fs::write(path, bytes).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
