use std::io::BufRead;

use serde_json::Value;
use tracing::debug;

use crate::config::{ErrorDetailCapture, IngestConfig};
use crate::error::{ErrorDetail, LineRecord, LineRecordError};
use crate::normalized::NormalizedEvent;
use crate::reader::{BoundedLine, BoundedLineReader};
use crate::schema::normalize_raw;

/// Line-oriented JSONL ingestion: one raw trace record per line, normalized on the fly.
///
/// Every non-blank line yields exactly one [`LineRecord`]; rejected lines carry a
/// [`LineRecordError`] and never stop the iteration.
pub struct TraceLineIngestor<R: BufRead> {
    reader: BoundedLineReader<R>,
    config: IngestConfig,
    source_name: String,
    accepted: usize,
}

impl<R: BufRead> TraceLineIngestor<R> {
    pub fn new(reader: R, config: IngestConfig, source_name: impl Into<String>) -> Self {
        Self {
            reader: BoundedLineReader::new(reader, config.limits.max_line_bytes),
            config,
            source_name: source_name.into(),
            accepted: 0,
        }
    }

    /// Drains the ingestor, keeping accepted events in input order and logging the rest.
    pub fn into_events(self) -> Vec<NormalizedEvent> {
        let source_name = self.source_name.clone();
        let mut events = Vec::new();
        for record in self {
            match record.outcome {
                Ok(event) => events.push(event),
                Err(err) => debug!(
                    source = %source_name,
                    line_number = record.line_number,
                    error = %err,
                    "dropping trace line"
                ),
            }
        }
        events
    }

    fn normalize_line(line: &str) -> &str {
        line.strip_suffix('\r').unwrap_or(line)
    }

    fn line_is_blank(line: &str) -> bool {
        line.chars().all(|ch| ch.is_whitespace())
    }

    fn reject(
        &mut self,
        line_number: usize,
        err: LineRecordError,
        details: impl FnOnce() -> String,
    ) -> LineRecord<NormalizedEvent> {
        if self.config.error_detail_capture == ErrorDetailCapture::FullDetails {
            if let Some(sink) = self.config.error_sink.as_mut() {
                sink.on_error(ErrorDetail {
                    line_number,
                    source_name: self.source_name.clone(),
                    details: details(),
                });
            }
        }
        LineRecord {
            line_number,
            outcome: Err(err),
        }
    }

    fn limit_reached(&self) -> bool {
        self.config
            .limits
            .max_events
            .is_some_and(|max| self.accepted >= max)
    }
}

impl<R: BufRead> Iterator for TraceLineIngestor<R> {
    type Item = LineRecord<NormalizedEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.limit_reached() {
                return None;
            }
            match self.reader.next()? {
                BoundedLine::IoError { line_number } => {
                    return Some(self.reject(line_number, LineRecordError::Io, || {
                        "read failed".to_string()
                    }));
                }
                BoundedLine::LineTooLong {
                    line_number,
                    observed_bytes,
                    max_line_bytes,
                } => {
                    let err = LineRecordError::LineTooLong {
                        observed_bytes,
                        max_line_bytes,
                    };
                    let details = err.to_string();
                    return Some(self.reject(line_number, err, || details));
                }
                BoundedLine::Line { line_number, bytes } => {
                    let Ok(raw_line) = String::from_utf8(bytes) else {
                        return Some(self.reject(line_number, LineRecordError::InvalidUtf8, || {
                            "line is not UTF-8".to_string()
                        }));
                    };
                    let line = Self::normalize_line(&raw_line);
                    if Self::line_is_blank(line) {
                        continue;
                    }

                    let value: Value = match serde_json::from_str(line) {
                        Ok(value) => value,
                        Err(err) => {
                            // The summary omits the raw line so it never leaks into logs.
                            let summary = format!(
                                "{} at column {}",
                                classify_json_error(&err),
                                err.column()
                            );
                            let details = format!("{err}: {line}");
                            return Some(self.reject(
                                line_number,
                                LineRecordError::JsonParse { summary },
                                || details,
                            ));
                        }
                    };

                    let Some(event) = normalize_raw(&value) else {
                        let details = line.to_string();
                        return Some(self.reject(line_number, LineRecordError::Unusable, || {
                            details
                        }));
                    };

                    self.accepted += 1;
                    return Some(LineRecord {
                        line_number,
                        outcome: Ok(event),
                    });
                }
            }
        }
    }
}

fn classify_json_error(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        serde_json::error::Category::Io => "io error",
        serde_json::error::Category::Syntax => "syntax error",
        serde_json::error::Category::Data => "data error",
        serde_json::error::Category::Eof => "unexpected end of input",
    }
}
