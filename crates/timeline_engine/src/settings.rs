use std::time::Duration;

use serde::{Deserialize, Serialize};
use timeline_core::DisplayZone;

/// CSS selectors describing the timeline markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// One entry of the timeline.
    pub candidate: String,
    /// Element inside a candidate that opens its detail view.
    pub activation: String,
    pub timestamp: String,
    pub timestamp_attribute: String,
    pub full_text: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            candidate: r#"article[data-testid="tweet"]"#.to_string(),
            activation: r#"div[data-testid="tweet"]"#.to_string(),
            timestamp: "time".to_string(),
            timestamp_attribute: "datetime".to_string(),
            full_text: r#"[data-testid="tweetText"]"#.to_string(),
        }
    }
}

/// Tuning for one collector. Durations that depend on the run's pacing are
/// expressed as multipliers of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    pub selectors: Selectors,
    /// Wait after activating a candidate, relative to pacing.
    pub detail_wait_factor: f64,
    /// Wait after navigating back, relative to pacing.
    pub restore_wait_factor: f64,
    /// Space left above a candidate when it is scrolled into view.
    pub scroll_margin_px: f64,
    pub scroll_distance_px: f64,
    pub frame_interval_ms: u64,
    /// Characters of rendered text used to identify a candidate.
    pub fingerprint_prefix_chars: usize,
    /// Consecutive rounds without a new item before the run gives up.
    pub max_idle_rounds: u32,
    /// Zone for display times, stored as `display_offset_minutes`: `None`
    /// means local time, `Some(m)` a fixed offset of `m` minutes east of UTC.
    #[serde(rename = "display_offset_minutes", with = "zone_minutes")]
    pub display_zone: DisplayZone,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            detail_wait_factor: 1.6,
            restore_wait_factor: 2.0,
            scroll_margin_px: 100.0,
            scroll_distance_px: 500.0,
            frame_interval_ms: 16,
            fingerprint_prefix_chars: 100,
            max_idle_rounds: 8,
            display_zone: DisplayZone::Local,
        }
    }
}

impl CollectorSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

mod zone_minutes {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use timeline_core::DisplayZone;

    pub fn serialize<S: Serializer>(zone: &DisplayZone, serializer: S) -> Result<S::Ok, S::Error> {
        let minutes = match zone {
            DisplayZone::Local => None,
            DisplayZone::Fixed(offset) => Some(offset.local_minus_utc() / 60),
        };
        minutes.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DisplayZone, D::Error> {
        match Option::<i32>::deserialize(deserializer)? {
            None => Ok(DisplayZone::Local),
            Some(minutes) => DisplayZone::fixed_minutes(minutes).ok_or_else(|| {
                D::Error::custom(format!("display offset of {minutes} minutes is out of range"))
            }),
        }
    }
}
