use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use timeline_core::{format_display_time, CollectedItem, DisplayZone};
use tokio_util::sync::CancellationToken;

use crate::host::{ElementHandle, Host};
use crate::scroll::{scroll_into_view, StepError};
use crate::settings::CollectorSettings;
use crate::wait::{scale, Settle, WaitPolicy};

/// Reads one candidate by opening its detail view.
///
/// Each call goes through three phases: enter (scroll, click), read, and
/// restore (navigate back if the click moved away). Restore runs whenever
/// enter has begun, whatever happened after.
pub struct Extractor<'a> {
    host: &'a dyn Host,
    settings: &'a CollectorSettings,
    wait: &'a dyn WaitPolicy,
    pacing: Duration,
    display_zone: DisplayZone,
    cancel: &'a CancellationToken,
}

#[derive(Debug, Default)]
struct DetailFields {
    text: Option<String>,
    timestamp: Option<String>,
}

/// Proof that the detail view may have been entered; must be restored.
#[must_use]
struct DetailVisit {
    restore_point: String,
}

impl<'a> Extractor<'a> {
    pub fn new(
        host: &'a dyn Host,
        settings: &'a CollectorSettings,
        wait: &'a dyn WaitPolicy,
        pacing: Duration,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            host,
            settings,
            wait,
            pacing,
            display_zone: settings.display_zone,
            cancel,
        }
    }

    /// Returns `None` when the candidate is missing, when either field could
    /// not be read, or when the host failed along the way. Never errors.
    pub async fn extract(
        &self,
        candidate: Option<ElementHandle>,
        index: usize,
    ) -> Option<CollectedItem> {
        let Some(candidate) = candidate else {
            engine_debug!("No candidate at position {}", index);
            return None;
        };

        let visit = match self.host.location().await {
            Ok(restore_point) => DetailVisit { restore_point },
            Err(err) => {
                engine_warn!("Cannot read location before candidate {}: {}", index, err);
                return None;
            }
        };

        let fields = match self.enter(candidate, &visit).await {
            Ok(()) => self.read().await.map_err(StepError::from),
            Err(err) => Err(err),
        };
        self.restore(visit).await;

        match fields {
            Ok(DetailFields {
                text: Some(text),
                timestamp: Some(timestamp),
            }) => {
                let timestamp_display = format_display_time(&timestamp, &self.display_zone)
                    .unwrap_or_else(|| timestamp.clone());
                Some(CollectedItem {
                    text,
                    timestamp_raw: timestamp,
                    timestamp_display,
                    sequence_index: index,
                })
            }
            Ok(fields) => {
                engine_debug!(
                    "Candidate {} incomplete (text: {}, timestamp: {})",
                    index,
                    fields.text.is_some(),
                    fields.timestamp.is_some()
                );
                None
            }
            Err(StepError::Cancelled(_)) => {
                engine_debug!("Extraction of candidate {} cancelled", index);
                None
            }
            Err(StepError::Host(err)) => {
                engine_warn!("Extraction of candidate {} failed: {}", index, err);
                None
            }
        }
    }

    async fn enter(&self, candidate: ElementHandle, visit: &DetailVisit) -> Result<(), StepError> {
        scroll_into_view(self.host, candidate, self.settings.scroll_margin_px).await?;
        self.wait
            .settle(self.host, Settle::Render, self.pacing, self.cancel)
            .await?;

        let selectors = &self.settings.selectors;
        let clickable = self
            .host
            .find_first_within(candidate, &selectors.activation)
            .await?
            .unwrap_or(candidate);
        // The timeline may already hold a full-text element of its own.
        let before = self.host.find_first(&selectors.full_text).await?;
        self.host.activate(clickable).await?;

        let budget = scale(self.pacing, self.settings.detail_wait_factor);
        let expect = Settle::Leave {
            from: &visit.restore_point,
            selector: &selectors.full_text,
            before,
        };
        self.wait
            .settle(self.host, expect, budget, self.cancel)
            .await?;
        Ok(())
    }

    async fn read(&self) -> Result<DetailFields, crate::HostError> {
        let selectors = &self.settings.selectors;

        let timestamp = match self.host.find_first(&selectors.timestamp).await? {
            Some(element) => self
                .host
                .attribute(element, &selectors.timestamp_attribute)
                .await?
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty()),
            None => None,
        };

        let text = match self.host.find_first(&selectors.full_text).await? {
            Some(container) => {
                let fragments = self.host.descendant_texts(container).await?;
                match join_fragments(&fragments) {
                    Some(joined) => Some(joined),
                    None => {
                        let rendered = self.host.inner_text(container).await?;
                        Some(rendered.trim().to_string())
                    }
                }
            }
            None => None,
        }
        .filter(|text| !text.is_empty());

        Ok(DetailFields { text, timestamp })
    }

    /// Navigates back if activation left the original page. Not cancellable.
    async fn restore(&self, visit: DetailVisit) {
        let current = match self.host.location().await {
            Ok(location) => location,
            Err(err) => {
                engine_warn!("Cannot read location to restore timeline: {}", err);
                return;
            }
        };
        if current == visit.restore_point {
            return;
        }

        engine_debug!("Returning from {} to {}", current, visit.restore_point);
        if let Err(err) = self.host.go_back().await {
            engine_warn!("Navigating back to {} failed: {}", visit.restore_point, err);
            return;
        }
        let budget = scale(self.pacing, self.settings.restore_wait_factor);
        let uncancellable = CancellationToken::new();
        let expect = Settle::Return {
            to: &visit.restore_point,
            selector: &self.settings.selectors.candidate,
        };
        let _ = self
            .wait
            .settle(self.host, expect, budget, &uncancellable)
            .await;
    }
}

/// Joins non-empty trimmed fragments with single spaces and collapses runs of
/// whitespace. `None` when no fragment carries text.
pub fn join_fragments(fragments: &[String]) -> Option<String> {
    let kept: Vec<&str> = fragments
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(kept.join(" ").split_whitespace().collect::<Vec<_>>().join(" "))
}
