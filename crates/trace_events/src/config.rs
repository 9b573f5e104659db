use crate::error::ErrorDetailSink;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ErrorDetailCapture {
    #[default]
    RedactedSummaryOnly,
    FullDetails,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct IngestLimits {
    pub max_line_bytes: usize,
    /// Stop after this many accepted events; `None` reads to the end of input.
    pub max_events: Option<usize>,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: 256 * 1024,
            max_events: None,
        }
    }
}

#[derive(Default)]
pub struct IngestConfig {
    pub limits: IngestLimits,
    pub error_detail_capture: ErrorDetailCapture,
    pub error_sink: Option<Box<dyn ErrorDetailSink>>,
}

impl IngestConfig {
    pub fn with_limits(limits: IngestLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }
}
