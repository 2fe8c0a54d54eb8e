//! Session controller: reacts to map triggers and drives rendering.
//!
//! Every trigger handler returns a [`TriggerEffects`] record of what it did
//! (levels refreshed, labels toggled, statuses emitted), so behaviour can be
//! checked without a live map.
//!
//! Triggers never wait on the network. A level whose dataset is cached for
//! the selected date is redrawn immediately; otherwise a fetch task is
//! spawned and its completion is applied later as a separate draw step
//! ([`SessionController::next_completion`], [`SessionController::settle`] or
//! the [`SessionController::run_viewport_ticks`] event loop).
//!
//! Rendering is clear-then-draw per level: a level's layer is emptied before
//! any glyph of the new pass is added.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use features::PointFeature;
use overlay_common::{DateKey, LevelKey, OverlayError, OverlayResult, ViewportWindow};
use renderer::{
    AdaptiveSampler, ArrowGlyphBuilder, GroundScale, GroupingLocale, LabelBoard, LabelPolicy,
    LabelToggle, PolylineStyle,
};
use storage::{CachedDataset, DatasetFetcher, RefreshOutcome, WindDatasetCache};

use crate::config::{ImageryConfig, ViewerConfig};
use crate::debounce::ViewportDebouncer;
use crate::surface::{ImageryState, RenderSurface, StatusSink};

/// What a render pass did for one level.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Drawn {
        drawn: usize,
        total: usize,
        stride: usize,
    },
    /// The level is not displayed; nothing was fetched.
    Inactive,
    /// No dataset for the date; the layer was cleared.
    Missing,
    /// The published dataset reports a build failure; the layer was cleared.
    BuildFailed,
    /// A newer request for the level took over; the layer was left alone.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelRender {
    pub level: LevelKey,
    pub outcome: RenderOutcome,
}

/// Observable results of one trigger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerEffects {
    /// Levels a refresh was requested for.
    pub refreshed: Vec<LevelKey>,
    pub rendered: Vec<LevelRender>,
    pub label_toggles: Vec<LabelToggle>,
    pub statuses: Vec<String>,
    /// "1:N" scale readout after a viewport change.
    pub scale_readout: Option<String>,
}

impl TriggerEffects {
    /// Latest outcome recorded for a level.
    pub fn outcome(&self, level: LevelKey) -> Option<&RenderOutcome> {
        self.rendered
            .iter()
            .rev()
            .find(|r| r.level == level)
            .map(|r| &r.outcome)
    }

    pub fn is_empty(&self) -> bool {
        self.refreshed.is_empty()
            && self.rendered.is_empty()
            && self.label_toggles.is_empty()
            && self.statuses.is_empty()
            && self.scale_readout.is_none()
    }

    /// Append `other`, keeping its scale readout when it has one.
    pub fn merged(mut self, other: TriggerEffects) -> Self {
        self.refreshed.extend(other.refreshed);
        self.rendered.extend(other.rendered);
        self.label_toggles.extend(other.label_toggles);
        self.statuses.extend(other.statuses);
        if other.scale_readout.is_some() {
            self.scale_readout = other.scale_readout;
        }
        self
    }
}

/// Everything a session renders with. Owned by the controller.
pub struct RenderContext<S, K> {
    pub surface: S,
    pub status: K,
    pub cache: Arc<WindDatasetCache>,
    pub labels: LabelBoard,
    pub policy: LabelPolicy,
    pub builder: ArrowGlyphBuilder,
    pub sampler: AdaptiveSampler,
    pub style: PolylineStyle,
    pub freshness_threshold_minutes: f64,
    pub scale: GroundScale,
    pub locale: GroupingLocale,
    pub imagery: ImageryConfig,
    pub opacity: f64,
    pub date: DateKey,
    pub viewport: ViewportWindow,
}

impl<S: RenderSurface, K: StatusSink> RenderContext<S, K> {
    fn emit(&mut self, effects: &mut TriggerEffects, message: String) {
        self.status.set_status(&message);
        effects.statuses.push(message);
    }

    fn imagery_state(&self) -> ImageryState {
        ImageryState {
            url: self.imagery.url.clone(),
            layers: self.imagery.layers.clone(),
            version: self.imagery.version.clone(),
            format: self.imagery.format.clone(),
            transparent: self.imagery.transparent,
            styles: self.imagery.styles.clone(),
            attribution: self.imagery.attribution.clone(),
            time: self.imagery.time_format.time_param(&self.date),
            opacity: self.opacity,
        }
    }

    fn scale_readout(&self) -> String {
        self.locale.format_scale(self.scale.denominator(&self.viewport))
    }

    /// Draw one cached dataset into its level's layer.
    fn draw(&mut self, level: LevelKey, dataset: &CachedDataset, effects: &mut TriggerEffects) -> RenderOutcome {
        self.surface.clear_layer(level);

        if let Some(error) = dataset.meta.error.as_deref() {
            warn!(level = %level, date = %self.date, error, "Published wind dataset reports a build failure");
            let message = format!("(Wind {} dataset build failed for {}: {})", level, self.date, error);
            self.emit(effects, message);
            return RenderOutcome::BuildFailed;
        }

        let field = &dataset.field;
        let stride = self.sampler.stride_for(&self.viewport);
        let mut drawn = 0;
        for sample in self.sampler.select(field, &self.viewport) {
            let Some(glyph) = self.builder.build(sample) else {
                continue;
            };
            self.surface.add_polyline(level, &glyph.shaft(), &self.style);
            self.surface.add_polyline(level, &glyph.head(), &self.style);
            drawn += 1;
        }

        info!(
            level = %level,
            date = %self.date,
            drawn,
            total = field.len(),
            stride,
            "Rendered wind layer"
        );

        let summary = match field.delta_minutes {
            Some(delta) => format!(
                "Wind {}: {} arrows (of {}, stride={}) | Δt={} min",
                level,
                drawn,
                field.len(),
                stride,
                delta
            ),
            None => format!(
                "Wind {}: {} arrows (of {}, stride={})",
                level,
                drawn,
                field.len(),
                stride
            ),
        };
        self.emit(effects, summary);

        if field.exceeds_freshness(self.freshness_threshold_minutes) {
            let delta = field.delta_minutes.unwrap_or_default();
            warn!(
                level = %level,
                delta_minutes = delta,
                threshold = self.freshness_threshold_minutes,
                "Wind model time far from selected date"
            );
            let message = format!(
                "Wind {}: model time is {} min from {} (threshold {} min)",
                level, delta, self.date, self.freshness_threshold_minutes
            );
            self.emit(effects, message);
        }

        RenderOutcome::Drawn {
            drawn,
            total: field.len(),
            stride,
        }
    }

    /// Apply a finished refresh for the selected date.
    fn apply_refresh(
        &mut self,
        level: LevelKey,
        result: OverlayResult<RefreshOutcome>,
        effects: &mut TriggerEffects,
    ) -> RenderOutcome {
        match result {
            Ok(RefreshOutcome::Inactive) => RenderOutcome::Inactive,
            Ok(RefreshOutcome::Ready(dataset)) => self.draw(level, &dataset, effects),
            Err(e) if e.is_stale() => {
                debug!(level = %level, error = %e, "Render superseded");
                RenderOutcome::Superseded
            }
            Err(e) => {
                self.surface.clear_layer(level);
                warn!(level = %level, date = %self.date, error = %e, "No wind dataset");
                let message = format!("(No wind {} for {})", level, self.date);
                self.emit(effects, message);
                RenderOutcome::Missing
            }
        }
    }

    fn update_labels(&mut self, effects: &mut TriggerEffects) {
        let toggles = self.labels.update(&self.policy, &self.viewport);
        for toggle in &toggles {
            self.surface.set_label_open(toggle.id, toggle.open);
        }
        effects.label_toggles.extend(toggles);
    }
}

/// A fetch task that has not been applied yet.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    date: DateKey,
    request: u64,
}

struct FetchCompletion {
    level: LevelKey,
    date: DateKey,
    request: u64,
    result: OverlayResult<RefreshOutcome>,
}

enum SessionEvent {
    Settled(Option<ViewportWindow>),
    Completed(Result<FetchCompletion, JoinError>),
}

/// Owns the render context and handles triggers.
pub struct SessionController<S, K> {
    ctx: RenderContext<S, K>,
    pending: JoinSet<FetchCompletion>,
    in_flight: HashMap<LevelKey, InFlight>,
    next_request: u64,
    debounce: Duration,
}

impl<S: RenderSurface, K: StatusSink> SessionController<S, K> {
    pub fn new(
        config: &ViewerConfig,
        fetcher: Arc<dyn DatasetFetcher>,
        surface: S,
        status: K,
        date: DateKey,
        viewport: ViewportWindow,
    ) -> OverlayResult<Self> {
        let table = config.wind.stride.table()?;
        config.wind.arrows.validate()?;
        let threshold = config.wind.freshness_threshold_minutes;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(OverlayError::InvalidConfig(format!(
                "freshness threshold must be non-negative, got {}",
                threshold
            )));
        }

        let ctx = RenderContext {
            surface,
            status,
            cache: Arc::new(WindDatasetCache::new(fetcher)),
            labels: LabelBoard::new(),
            policy: config.labels,
            builder: ArrowGlyphBuilder::new(config.wind.arrows),
            sampler: AdaptiveSampler::new(table),
            style: config.wind.style.clone(),
            freshness_threshold_minutes: threshold,
            scale: match config.labels {
                LabelPolicy::GroundScale(p) => p.scale,
                LabelPolicy::ZoomBand(_) => GroundScale::default(),
            },
            locale: config.readout.locale,
            imagery: config.imagery.clone(),
            opacity: config.imagery.opacity.clamp(0.0, 1.0),
            date,
            viewport,
        };

        Ok(Self {
            ctx,
            pending: JoinSet::new(),
            in_flight: HashMap::new(),
            next_request: 0,
            debounce: Duration::from_millis(config.debounce_ms),
        })
    }

    pub fn context(&self) -> &RenderContext<S, K> {
        &self.ctx
    }

    pub fn surface(&self) -> &S {
        &self.ctx.surface
    }

    pub fn status(&self) -> &K {
        &self.ctx.status
    }

    pub fn cache(&self) -> &Arc<WindDatasetCache> {
        &self.ctx.cache
    }

    pub fn labels(&self) -> &LabelBoard {
        &self.ctx.labels
    }

    pub fn date(&self) -> DateKey {
        self.ctx.date
    }

    pub fn viewport(&self) -> &ViewportWindow {
        &self.ctx.viewport
    }

    /// Fetch tasks whose completion has not been applied.
    pub fn pending_fetches(&self) -> usize {
        self.pending.len()
    }

    /// Bind labels for point features and apply the current visibility.
    pub fn bind_features(&mut self, features: &[PointFeature]) -> TriggerEffects {
        let mut effects = TriggerEffects::default();
        for feature in features {
            let id = self.ctx.labels.bind(feature.category, feature.label.clone());
            self.ctx.surface.bind_label(id, feature);
        }
        self.ctx.update_labels(&mut effects);
        debug!(count = features.len(), "Bound feature labels");
        effects
    }

    /// Push the imagery layer for the current date and opacity.
    pub fn show_imagery(&mut self) -> TriggerEffects {
        let mut effects = TriggerEffects::default();
        let imagery = self.ctx.imagery_state();
        self.ctx.surface.set_imagery(&imagery);
        let message = format!(
            "SO₂ (WMS) | Date (UTC): {} | TIME={}",
            self.ctx.date, imagery.time
        );
        self.ctx.emit(&mut effects, message);
        effects
    }

    /// Redraw a level from the cache, or start fetching it.
    async fn schedule_level(&mut self, level: LevelKey, effects: &mut TriggerEffects) {
        let date = self.ctx.date;

        if let Some(dataset) = self.ctx.cache.lookup(date, level).await {
            // The hit superseded whatever was in flight for the level.
            self.in_flight.remove(&level);
            let outcome = self.ctx.draw(level, &dataset, effects);
            effects.rendered.push(LevelRender { level, outcome });
            return;
        }

        if self.in_flight.get(&level).map(|f| f.date) == Some(date) {
            debug!(level = %level, date = %date, "Fetch already in flight");
            return;
        }

        self.next_request += 1;
        let request = self.next_request;
        self.in_flight.insert(level, InFlight { date, request });
        effects.refreshed.push(level);

        let cache = Arc::clone(&self.ctx.cache);
        self.pending.spawn(async move {
            let result = cache.refresh(date, level).await;
            FetchCompletion {
                level,
                date,
                request,
                result,
            }
        });
    }

    async fn schedule_active(&mut self, effects: &mut TriggerEffects) {
        let levels = self.ctx.cache.active_levels().await;
        for level in levels {
            self.schedule_level(level, effects).await;
        }
    }

    fn apply_completion(
        &mut self,
        joined: Result<FetchCompletion, JoinError>,
        effects: &mut TriggerEffects,
    ) {
        let completion = match joined {
            Ok(completion) => completion,
            Err(e) => {
                // The level is unknown; let every level fetch again.
                warn!(error = %e, "Wind fetch task failed");
                self.in_flight.clear();
                return;
            }
        };

        let FetchCompletion {
            level,
            date,
            request,
            result,
        } = completion;
        if self.in_flight.get(&level).map(|f| f.request) == Some(request) {
            self.in_flight.remove(&level);
        }

        let outcome = if date != self.ctx.date {
            debug!(level = %level, date = %date, "Completion for a previous date");
            RenderOutcome::Superseded
        } else {
            self.ctx.apply_refresh(level, result, effects)
        };
        effects.rendered.push(LevelRender { level, outcome });
    }

    /// Wait for the next fetch to finish and draw it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<TriggerEffects> {
        let joined = self.pending.join_next().await?;
        let mut effects = TriggerEffects::default();
        self.apply_completion(joined, &mut effects);
        Some(effects)
    }

    /// Apply every outstanding fetch.
    pub async fn settle(&mut self) -> TriggerEffects {
        let mut effects = TriggerEffects::default();
        while let Some(joined) = self.pending.join_next().await {
            self.apply_completion(joined, &mut effects);
        }
        effects
    }

    /// Drive the session from raw viewport ticks until the channel closes.
    ///
    /// Ticks are debounced with the configured quiet period; fetch
    /// completions are applied as they arrive. Outstanding fetches are
    /// settled before returning. One entry per handled event.
    pub async fn run_viewport_ticks(
        &mut self,
        mut ticks: mpsc::Receiver<ViewportWindow>,
    ) -> Vec<TriggerEffects> {
        let mut debouncer = ViewportDebouncer::new(self.debounce);
        let mut handled = Vec::new();

        loop {
            let event = tokio::select! {
                settled = debouncer.next_settled(&mut ticks) => SessionEvent::Settled(settled),
                Some(joined) = self.pending.join_next(), if !self.pending.is_empty() => {
                    SessionEvent::Completed(joined)
                }
            };

            match event {
                SessionEvent::Settled(Some(viewport)) => {
                    handled.push(self.on_viewport_changed(viewport).await);
                }
                SessionEvent::Settled(None) => break,
                SessionEvent::Completed(joined) => {
                    let mut effects = TriggerEffects::default();
                    self.apply_completion(joined, &mut effects);
                    handled.push(effects);
                }
            }
        }

        let rest = self.settle().await;
        if !rest.is_empty() {
            handled.push(rest);
        }
        handled
    }

    /// Pan or zoom settled on a new viewport.
    #[instrument(skip(self, viewport), fields(zoom = viewport.zoom))]
    pub async fn on_viewport_changed(&mut self, viewport: ViewportWindow) -> TriggerEffects {
        let mut effects = TriggerEffects::default();
        self.ctx.viewport = viewport;

        self.ctx.update_labels(&mut effects);
        effects.scale_readout = Some(self.ctx.scale_readout());
        self.schedule_active(&mut effects).await;
        effects
    }

    /// A wind level was switched on.
    #[instrument(skip(self))]
    pub async fn on_level_activated(&mut self, level: LevelKey) -> TriggerEffects {
        let mut effects = TriggerEffects::default();
        self.ctx.cache.activate(level).await;
        self.schedule_level(level, &mut effects).await;
        effects
    }

    /// A wind level was switched off: clear its layer and drop its data.
    #[instrument(skip(self))]
    pub async fn on_level_deactivated(&mut self, level: LevelKey) -> TriggerEffects {
        self.ctx.cache.deactivate(level).await;
        self.in_flight.remove(&level);
        self.ctx.surface.clear_layer(level);
        TriggerEffects::default()
    }

    /// The selected date changed: update imagery and redraw active levels.
    #[instrument(skip(self))]
    pub async fn on_date_changed(&mut self, date: DateKey) -> TriggerEffects {
        self.ctx.date = date;
        let mut effects = self.show_imagery();
        self.schedule_active(&mut effects).await;
        effects
    }

    /// The imagery opacity control moved. Values are clamped to [0, 1].
    pub fn on_opacity_changed(&mut self, opacity: f64) -> TriggerEffects {
        if opacity.is_finite() {
            self.ctx.opacity = opacity.clamp(0.0, 1.0);
        }
        let imagery = self.ctx.imagery_state();
        self.ctx.surface.set_imagery(&imagery);
        TriggerEffects::default()
    }

    /// Current "1:N" scale readout.
    pub fn scale_readout(&self) -> String {
        self.ctx.scale_readout()
    }

    /// Hand back the collaborators, e.g. to export a snapshot.
    pub fn into_parts(self) -> (S, K) {
        (self.ctx.surface, self.ctx.status)
    }
}
