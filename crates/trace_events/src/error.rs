use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum LineRecordError {
    #[error("I/O error while reading trace input")]
    Io,
    #[error("invalid UTF-8 in trace input")]
    InvalidUtf8,
    #[error("line too long (observed_bytes={observed_bytes}, max_line_bytes={max_line_bytes})")]
    LineTooLong {
        observed_bytes: usize,
        max_line_bytes: usize,
    },
    #[error("trace line is not valid JSON: {summary}")]
    JsonParse { summary: String },
    #[error("trace record has no usable timestamp or session id")]
    Unusable,
}

#[derive(Debug, Clone)]
pub struct LineRecord<T> {
    pub line_number: usize,
    pub outcome: Result<T, LineRecordError>,
}

/// Full diagnostic for a rejected line; only produced with
/// [`ErrorDetailCapture::FullDetails`](crate::ErrorDetailCapture::FullDetails).
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub line_number: usize,
    pub source_name: String,
    pub details: String,
}

pub trait ErrorDetailSink: Send + 'static {
    fn on_error(&mut self, detail: ErrorDetail);
}

/// Failures surfaced by a [`TraceSource`](crate::TraceSource) fetch.
#[derive(Debug, Error)]
pub enum TraceSourceError {
    #[error("failed to read trace file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("trace source unavailable: {0}")]
    Unavailable(String),
}
