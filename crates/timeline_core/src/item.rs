use std::fmt;
use std::time::Duration;

pub const DEFAULT_TARGET_COUNT: usize = 5;
pub const DEFAULT_PACING_MS: u64 = 500;

/// One post read from the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedItem {
    pub text: String,
    /// Machine timestamp as exposed by the page (ISO 8601).
    pub timestamp_raw: String,
    /// `DD/MM/YYYY HH:MM:SS`, 24h.
    pub timestamp_display: String,
    /// Position of the candidate in the scan that discovered it.
    pub sequence_index: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("target count must be a whole number, got {0:?}")]
    InvalidTargetCount(String),
    #[error("target count must be at least 1")]
    ZeroTargetCount,
    #[error("pacing must be a whole number of milliseconds, got {0:?}")]
    InvalidPacing(String),
    #[error("pacing must be greater than zero")]
    ZeroPacing,
}

/// Parameters for one collection run. Validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRequest {
    target_count: usize,
    pacing: Duration,
}

impl CollectionRequest {
    pub fn new(target_count: usize, pacing: Duration) -> Result<Self, RequestError> {
        if target_count == 0 {
            return Err(RequestError::ZeroTargetCount);
        }
        if pacing.is_zero() {
            return Err(RequestError::ZeroPacing);
        }
        Ok(Self {
            target_count,
            pacing,
        })
    }

    /// Parses user-entered values. An empty pacing field means the default.
    pub fn parse(target_count: &str, pacing_ms: &str) -> Result<Self, RequestError> {
        let target = target_count.trim();
        let target = target
            .parse::<usize>()
            .map_err(|_| RequestError::InvalidTargetCount(target.to_string()))?;

        let pacing = pacing_ms.trim();
        let pacing = if pacing.is_empty() {
            DEFAULT_PACING_MS
        } else {
            pacing
                .parse::<u64>()
                .map_err(|_| RequestError::InvalidPacing(pacing.to_string()))?
        };

        Self::new(target, Duration::from_millis(pacing))
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    TargetReached,
    /// No new candidate could be collected for too many rounds.
    Exhausted,
    Cancelled,
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionReason::TargetReached => write!(f, "target reached"),
            CompletionReason::Exhausted => write!(f, "timeline exhausted"),
            CompletionReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Items in discovery order plus the reason the run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResult {
    pub items: Vec<CollectedItem>,
    pub reason: CompletionReason,
}

impl CollectionResult {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
