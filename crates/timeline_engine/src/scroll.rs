use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::host::{ElementHandle, Host, HostError};
use crate::wait::Cancelled;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Aligns the element's top with `margin` pixels below the viewport top.
pub async fn scroll_into_view(
    host: &dyn Host,
    element: ElementHandle,
    margin: f64,
) -> Result<(), HostError> {
    let offset = host.scroll_offset().await?;
    let top = host.element_top(element).await?;
    host.scroll_to((offset + top - margin).max(0.0)).await
}

/// Scrolls down by `distance` in frame-sized steps spread over `duration`.
///
/// Returns `(start, end)` offsets as reported by the host, which may clamp at
/// the bottom of the page.
pub async fn smooth_scroll(
    host: &dyn Host,
    distance: f64,
    duration: Duration,
    frame_interval: Duration,
    cancel: &CancellationToken,
) -> Result<(f64, f64), StepError> {
    let start = host.scroll_offset().await?;
    let frames = (duration.as_millis() / frame_interval.as_millis().max(1)).max(1) as u32;
    for frame in 1..=frames {
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }
        let progress = f64::from(frame) / f64::from(frames);
        host.scroll_to(start + distance * progress).await?;
        host.next_frame().await?;
    }
    let end = host.scroll_offset().await?;
    Ok((start, end))
}
