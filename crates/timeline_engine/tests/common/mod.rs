//! Scripted timeline host shared by the engine tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use timeline_core::DisplayZone;
use timeline_engine::{
    CollectorEvent, CollectorSettings, DocumentQuery, ElementHandle, HostError, Navigation,
    ProgressSink, Viewport,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const HOME: &str = "https://timeline.test/home";

const ACTIVATION: u64 = 1_000;
const TIME: u64 = 2_000;
const TEXT: u64 = 3_000;
/// Index of the preview post the timeline renders inline.
const PREVIEW: usize = 999;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Settings with a fixed display offset so expected times do not depend on
/// the machine running the tests.
pub fn utc_settings() -> CollectorSettings {
    CollectorSettings {
        display_zone: DisplayZone::fixed_minutes(0).unwrap(),
        ..CollectorSettings::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Post {
    /// What the timeline shows before the post is opened.
    pub rendered: String,
    pub fragments: Vec<String>,
    /// Rendered text of the full-text container; `None` when it is missing.
    pub text: Option<String>,
    pub timestamp: Option<String>,
    /// Opening the post moves to its own page.
    pub navigates: bool,
    /// Time between the click and the detail page showing up.
    pub navigation_delay: Duration,
    pub fail_activation: bool,
    /// The detail page breaks once it has been opened.
    pub fail_after_navigation: bool,
}

impl Post {
    pub fn new(text: &str, timestamp: &str) -> Self {
        Self {
            rendered: text.to_string(),
            fragments: vec![text.to_string()],
            text: Some(text.to_string()),
            timestamp: Some(timestamp.to_string()),
            ..Self::default()
        }
    }

    pub fn without_timestamp(text: &str) -> Self {
        Self {
            timestamp: None,
            ..Self::new(text, "")
        }
    }

    pub fn navigating(mut self) -> Self {
        self.navigates = true;
        self
    }

    pub fn navigating_after(mut self, delay: Duration) -> Self {
        self.navigates = true;
        self.navigation_delay = delay;
        self
    }
}

#[derive(Debug)]
struct TimelineState {
    posts: Vec<Post>,
    preview: Option<Post>,
    initially_visible: usize,
    reveal_per_scroll: usize,
    reveal_distance: f64,
    offset: f64,
    deepest_offset: f64,
    opened: Option<usize>,
    /// When the opened post becomes visible.
    arrival: Option<Instant>,
    navigated: bool,
    activations: Vec<usize>,
    back_calls: usize,
}

impl TimelineState {
    fn visible(&self) -> usize {
        let scrolls = ((self.deepest_offset + 0.5) / self.reveal_distance).floor() as usize;
        (self.initially_visible + scrolls * self.reveal_per_scroll).min(self.posts.len())
    }

    /// The opened post, once it has finished loading.
    fn shown(&self) -> Option<usize> {
        self.opened
            .filter(|_| self.arrival.map_or(true, |at| Instant::now() >= at))
    }

    fn post(&self, index: usize) -> Option<&Post> {
        if index == PREVIEW {
            self.preview.as_ref()
        } else {
            self.posts.get(index)
        }
    }

    fn detail_broken(&self) -> bool {
        self.navigated
            && self
                .shown()
                .is_some_and(|index| self.posts[index].fail_after_navigation)
    }
}

pub struct FakeTimeline {
    selectors: timeline_engine::Selectors,
    state: Mutex<TimelineState>,
}

impl FakeTimeline {
    pub fn new(posts: Vec<Post>) -> Self {
        let visible = posts.len();
        Self::revealing(posts, visible, 0)
    }

    /// Shows `visible` posts and `per_scroll` more after each scroll gesture.
    pub fn revealing(posts: Vec<Post>, visible: usize, per_scroll: usize) -> Self {
        Self {
            selectors: timeline_engine::Selectors::default(),
            state: Mutex::new(TimelineState {
                posts,
                preview: None,
                initially_visible: visible,
                reveal_per_scroll: per_scroll,
                reveal_distance: CollectorSettings::default().scroll_distance_px,
                offset: 0.0,
                deepest_offset: 0.0,
                opened: None,
                arrival: None,
                navigated: false,
                activations: Vec::new(),
                back_calls: 0,
            }),
        }
    }

    /// Renders `post` inline on the timeline, so its time and text elements
    /// match the detail selectors before anything is opened.
    pub fn with_preview(self, post: Post) -> Self {
        self.state.lock().unwrap().preview = Some(post);
        self
    }

    pub fn activations(&self) -> Vec<usize> {
        self.state.lock().unwrap().activations.clone()
    }

    pub fn back_calls(&self) -> usize {
        self.state.lock().unwrap().back_calls
    }

    pub fn is_on_timeline(&self) -> bool {
        !self.state.lock().unwrap().navigated
    }

    fn post_for(handle: ElementHandle, base: u64) -> Option<usize> {
        handle
            .0
            .checked_sub(base)
            .filter(|i| *i < 1_000)
            .map(|i| i as usize)
    }
}

#[async_trait::async_trait]
impl DocumentQuery for FakeTimeline {
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>, HostError> {
        let state = self.state.lock().unwrap();
        if selector != self.selectors.candidate || state.navigated {
            return Ok(Vec::new());
        }
        Ok((0..state.visible() as u64).map(ElementHandle).collect())
    }

    async fn find_first(&self, selector: &str) -> Result<Option<ElementHandle>, HostError> {
        let state = self.state.lock().unwrap();
        if state.detail_broken() {
            return Err(HostError::Script("detail page crashed".into()));
        }
        let Some(index) = state.shown() else {
            if selector == self.selectors.candidate && state.visible() > 0 {
                return Ok(Some(ElementHandle(0)));
            }
            let found = match &state.preview {
                Some(_) if selector == self.selectors.timestamp => Some(TIME + PREVIEW as u64),
                Some(_) if selector == self.selectors.full_text => Some(TEXT + PREVIEW as u64),
                _ => None,
            };
            return Ok(found.map(ElementHandle));
        };
        let post = &state.posts[index];
        let found = if selector == self.selectors.timestamp {
            post.timestamp.is_some().then_some(TIME + index as u64)
        } else if selector == self.selectors.full_text {
            post.text.is_some().then_some(TEXT + index as u64)
        } else if selector == self.selectors.candidate {
            Some(index as u64)
        } else {
            None
        };
        Ok(found.map(ElementHandle))
    }

    async fn find_first_within(
        &self,
        scope: ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>, HostError> {
        if selector == self.selectors.activation && scope.0 < ACTIVATION {
            return Ok(Some(ElementHandle(ACTIVATION + scope.0)));
        }
        Ok(None)
    }

    async fn inner_text(&self, element: ElementHandle) -> Result<String, HostError> {
        let state = self.state.lock().unwrap();
        if let Some(post) = Self::post_for(element, TEXT).and_then(|index| state.post(index)) {
            return Ok(post.text.clone().unwrap_or_default());
        }
        state
            .posts
            .get(element.0 as usize)
            .map(|post| post.rendered.clone())
            .ok_or(HostError::StaleElement(element))
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, HostError> {
        let state = self.state.lock().unwrap();
        match Self::post_for(element, TIME).and_then(|index| state.post(index)) {
            Some(post) if name == self.selectors.timestamp_attribute => Ok(post.timestamp.clone()),
            Some(_) => Ok(None),
            None => Err(HostError::StaleElement(element)),
        }
    }

    async fn descendant_texts(&self, element: ElementHandle) -> Result<Vec<String>, HostError> {
        let state = self.state.lock().unwrap();
        Self::post_for(element, TEXT)
            .and_then(|index| state.post(index))
            .map(|post| post.fragments.clone())
            .ok_or(HostError::StaleElement(element))
    }
}

#[async_trait::async_trait]
impl Viewport for FakeTimeline {
    async fn scroll_offset(&self) -> Result<f64, HostError> {
        Ok(self.state.lock().unwrap().offset)
    }

    async fn scroll_to(&self, offset: f64) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        state.offset = offset.max(0.0);
        state.deepest_offset = state.deepest_offset.max(state.offset);
        Ok(())
    }

    /// Every element already sits at the scroll margin.
    async fn element_top(&self, _element: ElementHandle) -> Result<f64, HostError> {
        Ok(CollectorSettings::default().scroll_margin_px)
    }

    async fn next_frame(&self) -> Result<(), HostError> {
        tokio::task::yield_now().await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Navigation for FakeTimeline {
    async fn location(&self) -> Result<String, HostError> {
        let state = self.state.lock().unwrap();
        Ok(match (state.navigated, state.shown()) {
            (true, Some(index)) => format!("https://timeline.test/status/{index}"),
            _ => HOME.to_string(),
        })
    }

    async fn activate(&self, element: ElementHandle) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let index = Self::post_for(element, ACTIVATION)
            .or_else(|| (element.0 < ACTIVATION).then_some(element.0 as usize))
            .filter(|index| *index < state.posts.len())
            .ok_or(HostError::StaleElement(element))?;
        if state.posts[index].fail_activation {
            return Err(HostError::Script("click intercepted".into()));
        }
        state.activations.push(index);
        state.opened = Some(index);
        state.arrival = Some(Instant::now() + state.posts[index].navigation_delay);
        state.navigated = state.posts[index].navigates;
        Ok(())
    }

    async fn go_back(&self) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        if !state.navigated {
            return Err(HostError::NoHistory);
        }
        state.navigated = false;
        state.opened = None;
        state.arrival = None;
        state.back_calls += 1;
        Ok(())
    }
}

/// Records every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CollectorEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<CollectorEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn collected_positions(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                CollectorEvent::ItemCollected { position, .. } => Some(position),
                _ => None,
            })
            .collect()
    }

    pub fn skipped_positions(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                CollectorEvent::CandidateSkipped { position } => Some(position),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: CollectorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Cancels the run as soon as the first item comes in.
pub struct CancelAfterFirst {
    pub token: CancellationToken,
    pub inner: Arc<RecordingSink>,
}

impl ProgressSink for CancelAfterFirst {
    fn emit(&self, event: CollectorEvent) {
        if matches!(event, CollectorEvent::ItemCollected { .. }) {
            self.token.cancel();
        }
        self.inner.emit(event);
    }
}
