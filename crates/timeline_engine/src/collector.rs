use std::collections::HashSet;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn, set_round};
use timeline_core::{CollectedItem, CollectionRequest, CollectionResult, CompletionReason};
use tokio_util::sync::CancellationToken;

use crate::extract::Extractor;
use crate::fingerprint::{Fingerprint, Fingerprinter, PrefixFingerprint};
use crate::host::{ElementHandle, Host};
use crate::scroll::{smooth_scroll, StepError};
use crate::settings::CollectorSettings;
use crate::wait::{pause, Cancelled, FixedDelay, WaitPolicy};

#[derive(Debug, Clone, PartialEq)]
pub enum CollectorEvent {
    /// Fraction of the target collected so far.
    Progress(f64),
    ItemCollected {
        item: CollectedItem,
        position: usize,
    },
    CandidateSkipped {
        position: usize,
    },
    Scrolled {
        from: f64,
        to: f64,
        rescan_from_top: bool,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CollectorEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: CollectorEvent) {}
}

/// Scrolls the timeline and gathers items until the target is reached, the
/// run is cancelled, or nothing new turns up for `max_idle_rounds` rounds.
pub struct Collector {
    settings: CollectorSettings,
    wait: Arc<dyn WaitPolicy>,
    fingerprinter: Arc<dyn Fingerprinter>,
}

struct Run<'a> {
    items: Vec<CollectedItem>,
    last_scanned: Option<usize>,
    seen: HashSet<Fingerprint>,
    target: usize,
    sink: &'a dyn ProgressSink,
}

impl Collector {
    pub fn new(settings: CollectorSettings) -> Self {
        let fingerprinter = PrefixFingerprint {
            chars: settings.fingerprint_prefix_chars,
        };
        Self {
            settings,
            wait: Arc::new(FixedDelay),
            fingerprinter: Arc::new(fingerprinter),
        }
    }

    pub fn with_wait_policy(mut self, wait: Arc<dyn WaitPolicy>) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_fingerprinter(mut self, fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Always returns what was gathered, whatever the reason for stopping.
    pub async fn collect(
        &self,
        host: &dyn Host,
        request: CollectionRequest,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> CollectionResult {
        let mut run = Run {
            items: Vec::with_capacity(request.target_count()),
            last_scanned: None,
            seen: HashSet::new(),
            target: request.target_count(),
            sink,
        };
        let extractor = Extractor::new(
            host,
            &self.settings,
            self.wait.as_ref(),
            request.pacing(),
            cancel,
        );
        engine_info!(
            "Collecting {} items, pacing {:?}",
            run.target,
            request.pacing()
        );

        let mut round: u64 = 0;
        let mut idle_rounds: u32 = 0;
        let reason = loop {
            if run.items.len() >= run.target {
                break CompletionReason::TargetReached;
            }
            round += 1;
            set_round(round);

            if pause(request.pacing(), cancel).await.is_err() {
                break CompletionReason::Cancelled;
            }

            let candidates = match host.find_all(&self.settings.selectors.candidate).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    engine_warn!("Querying candidates failed: {}", err);
                    Vec::new()
                }
            };

            match self.scan(host, &extractor, &candidates, &mut run, cancel).await {
                Ok(true) => {
                    idle_rounds = 0;
                    continue;
                }
                Ok(false) => {}
                Err(Cancelled) => break CompletionReason::Cancelled,
            }

            idle_rounds += 1;
            if idle_rounds >= self.settings.max_idle_rounds {
                engine_info!("No new item after {} rounds, stopping", idle_rounds);
                break CompletionReason::Exhausted;
            }

            match self.scroll_for_more(host, &candidates, &mut run, request, cancel).await {
                Ok(()) => {}
                Err(Cancelled) => break CompletionReason::Cancelled,
            }
        };
        set_round(0);

        engine_info!("Collection ended ({}) with {} items", reason, run.items.len());
        CollectionResult {
            items: run.items,
            reason,
        }
    }

    /// Processes at most one new candidate. `Ok(true)` when an item was added.
    async fn scan(
        &self,
        host: &dyn Host,
        extractor: &Extractor<'_>,
        candidates: &[ElementHandle],
        run: &mut Run<'_>,
        cancel: &CancellationToken,
    ) -> Result<bool, Cancelled> {
        let start = run.last_scanned.map_or(0, |last| last + 1);
        for (position, &candidate) in candidates.iter().enumerate().skip(start) {
            let rendered = match host.inner_text(candidate).await {
                Ok(text) => text,
                Err(err) => {
                    engine_debug!("Candidate {} unreadable: {}", position, err);
                    continue;
                }
            };
            let fingerprint = self.fingerprinter.fingerprint(&rendered);
            if run.seen.contains(&fingerprint) {
                continue;
            }

            match extractor.extract(Some(candidate), position).await {
                Some(item) => {
                    run.seen.insert(fingerprint);
                    run.last_scanned = Some(position);
                    run.items.push(item.clone());
                    run.sink
                        .emit(CollectorEvent::ItemCollected { item, position });
                    run.sink.emit(CollectorEvent::Progress(
                        run.items.len() as f64 / run.target as f64,
                    ));
                    return Ok(true);
                }
                None => {
                    run.sink.emit(CollectorEvent::CandidateSkipped { position });
                    if cancel.is_cancelled() {
                        return Err(Cancelled);
                    }
                }
            }
        }
        Ok(false)
    }

    async fn scroll_for_more(
        &self,
        host: &dyn Host,
        candidates: &[ElementHandle],
        run: &mut Run<'_>,
        request: CollectionRequest,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let scrolled = smooth_scroll(
            host,
            self.settings.scroll_distance_px,
            request.pacing(),
            self.settings.frame_interval(),
            cancel,
        )
        .await;
        let (from, to) = match scrolled {
            Ok(offsets) => offsets,
            Err(StepError::Cancelled(cancelled)) => return Err(cancelled),
            Err(StepError::Host(err)) => {
                engine_warn!("Scrolling failed: {}", err);
                (0.0, 0.0)
            }
        };
        pause(request.pacing(), cancel).await?;

        // The list may have shrunk or been reordered under us.
        let rescan_from_top = matches!(run.last_scanned, Some(last) if last + 1 >= candidates.len());
        if rescan_from_top {
            run.last_scanned = None;
        }
        run.sink.emit(CollectorEvent::Scrolled {
            from,
            to,
            rescan_from_top,
        });
        Ok(())
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(CollectorSettings::default())
    }
}
