use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::host::{ElementHandle, Host};

/// The run was cancelled while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cancelled")]
pub struct Cancelled;

/// Sleeps for `duration` unless `cancel` fires first.
pub async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), Cancelled> {
    tokio::select! {
        _ = cancel.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// `duration × factor`, rounded to whole milliseconds.
pub(crate) fn scale(duration: Duration, factor: f64) -> Duration {
    Duration::from_millis((duration.as_millis() as f64 * factor).round() as u64)
}

/// The page change a wait is meant to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle<'a> {
    /// Rendering after a scroll. Nothing observable changes.
    Render,
    /// Activation of a post: the page leaves `from`, or the first match of
    /// `selector` is no longer the element `before` it.
    Leave {
        from: &'a str,
        selector: &'a str,
        before: Option<ElementHandle>,
    },
    /// Going back: the page is at `to` again and `selector` matches.
    Return { to: &'a str, selector: &'a str },
}

/// How the collector waits for the host page to react.
///
/// Implementations must return within a bounded time even if the expected
/// change never happens.
#[async_trait::async_trait]
pub trait WaitPolicy: Send + Sync {
    async fn settle(
        &self,
        host: &dyn Host,
        expect: Settle<'_>,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled>;
}

/// Always sleeps the full budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedDelay;

#[async_trait::async_trait]
impl WaitPolicy for FixedDelay {
    async fn settle(
        &self,
        _host: &dyn Host,
        _expect: Settle<'_>,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        pause(budget, cancel).await
    }
}

/// Polls until the expected change is visible and returns right away.
///
/// Gives up after `timeout_factor × budget`. `Settle::Render` has nothing to
/// poll for and sleeps the budget.
#[derive(Debug, Clone, Copy)]
pub struct PollForElement {
    pub poll_interval: Duration,
    pub timeout_factor: f64,
}

impl Default for PollForElement {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            timeout_factor: 2.0,
        }
    }
}

impl PollForElement {
    async fn has_settled(host: &dyn Host, expect: Settle<'_>) -> bool {
        match expect {
            Settle::Render => true,
            Settle::Leave {
                from,
                selector,
                before,
            } => match host.find_first(selector).await {
                Ok(Some(found)) if Some(found) != before => true,
                Ok(Some(_)) => host.location().await.is_ok_and(|here| here != from),
                Ok(None) => false,
                // A page that breaks after the click is reported by the read.
                Err(_) => true,
            },
            Settle::Return { to, selector } => {
                host.location().await.is_ok_and(|here| here == to)
                    && matches!(host.find_first(selector).await, Ok(Some(_)))
            }
        }
    }
}

#[async_trait::async_trait]
impl WaitPolicy for PollForElement {
    async fn settle(
        &self,
        host: &dyn Host,
        expect: Settle<'_>,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), Cancelled> {
        if expect == Settle::Render {
            return pause(budget, cancel).await;
        }

        let deadline = tokio::time::Instant::now() + scale(budget, self.timeout_factor);
        loop {
            if Self::has_settled(host, expect).await {
                return Ok(());
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(());
            }
            pause(self.poll_interval.min(deadline - now), cancel).await?;
        }
    }
}
