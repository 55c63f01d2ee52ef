use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info};

use crate::bridge::{BridgeMessage, EventSink, LogEntry, LogState};
use crate::placement::{hit_test, place_items, PlacedItem, Point, Surface};
use crate::render::RenderModel;
use crate::settings::{LiveStyle, TrailSettings};
use crate::trail::{generate_trail, Symbol};
use crate::util::round_to_hundredths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRecord {
    pub symbol: Symbol,
    pub is_error: bool,
}

/// What a click did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Missed every target, hit an already selected one, or the run is not live.
    Ignored,
    Correct(Symbol),
    Wrong(Symbol),
}

/// Contents of the end-of-run dialog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultPopup {
    pub time: Option<f64>,
    pub errors: Option<u32>,
    pub show_buttons: bool,
}

#[derive(Debug, Clone)]
pub struct RunState {
    pub phase: RunPhase,
    pub current_index: usize,
    pub error_count: u32,
    pub started_at: Option<Instant>,
    pub elapsed_secs: f64,
    pub selections: Vec<SelectionRecord>,
    pub items: Vec<PlacedItem>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            phase: RunPhase::NotStarted,
            current_index: 0,
            error_count: 0,
            started_at: None,
            elapsed_secs: 0.0,
            selections: Vec::new(),
            items: Vec::new(),
        }
    }
}

/// A trail making test: the target sequence, where each target sits, and the
/// progress of the current run.
pub struct TrailTest<R: Rng = StdRng> {
    settings: TrailSettings,
    live: LiveStyle,
    trail: Vec<Symbol>,
    surface: Surface,
    state: RunState,
    log: Vec<LogEntry>,
    sink: Option<Box<dyn EventSink>>,
    rng: R,
}

impl TrailTest<StdRng> {
    pub fn new(settings: TrailSettings, surface: Surface) -> Self {
        Self::with_rng(settings, surface, StdRng::from_entropy())
    }
}

impl<R: Rng> TrailTest<R> {
    pub fn with_rng(settings: TrailSettings, surface: Surface, rng: R) -> Self {
        let trail = generate_trail(&settings);
        Self {
            live: LiveStyle::from(&settings),
            settings,
            trail,
            surface,
            state: RunState::default(),
            log: Vec::new(),
            sink: None,
            rng,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Begin a run, discarding any previous one.
    ///
    /// Random placements are drawn afresh; custom positions land in the same
    /// place every time. The cumulative log survives restarts.
    pub fn start(&mut self) {
        let items = place_items(&self.trail, &self.settings, self.surface, &mut self.rng);
        self.state = RunState {
            phase: RunPhase::Running,
            started_at: Some(Instant::now()),
            items,
            ..RunState::default()
        };
        debug!(trail_length = self.trail.len(), "run started");
    }

    pub fn restart(&mut self) {
        self.start();
    }

    /// Periodic timer callback. Ticks outside a live run are dropped.
    pub fn on_tick(&mut self) -> bool {
        if self.state.phase != RunPhase::Running {
            return false;
        }
        self.refresh_elapsed();
        true
    }

    /// Surface size changed. Placed targets keep their pixel positions.
    pub fn resize(&mut self, surface: Surface) {
        self.surface = surface;
    }

    pub fn click(&mut self, point: Point) -> ClickOutcome {
        if self.state.phase != RunPhase::Running {
            return ClickOutcome::Ignored;
        }

        let Some(symbol) = hit_test(&self.state.items, point, self.settings.radius()).map(|i| i.symbol)
        else {
            return ClickOutcome::Ignored;
        };

        if self.is_selected(symbol) {
            return ClickOutcome::Ignored;
        }

        self.refresh_elapsed();
        let expected = self.expected();

        if expected == Some(symbol) {
            self.state.selections.push(SelectionRecord {
                symbol,
                is_error: false,
            });
            self.push_log(LogState::Correct, symbol.label());
            self.advance();
            ClickOutcome::Correct(symbol)
        } else {
            self.push_log(LogState::Wrong, symbol.label());
            self.state.error_count += 1;

            if self.settings.allow_wrong_selections {
                self.state.selections.push(SelectionRecord {
                    symbol,
                    is_error: true,
                });
                self.advance();
            }
            ClickOutcome::Wrong(symbol)
        }
    }

    fn advance(&mut self) {
        self.state.current_index += 1;
        if self.state.current_index >= self.trail.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state.phase = RunPhase::Finished;
        info!(
            elapsed = self.state.elapsed_secs,
            errors = self.state.error_count,
            "run finished"
        );
        self.push_log(LogState::Finished, "-".to_string());
    }

    fn refresh_elapsed(&mut self) {
        if let Some(started_at) = self.state.started_at {
            self.state.elapsed_secs = round_to_hundredths(started_at.elapsed().as_secs_f64());
        }
    }

    fn push_log(&mut self, state: LogState, item: String) {
        let entry = LogEntry {
            state,
            item,
            elapsed_time: self.state.elapsed_secs,
        };
        debug!(%state, item = %entry.item, elapsed = entry.elapsed_time, "trail event");

        if let Some(sink) = self.sink.as_mut() {
            sink.post(&BridgeMessage::new(
                entry.clone(),
                self.state.elapsed_secs,
                self.state.error_count,
            ));
        }
        self.log.push(entry);
    }

    fn is_selected(&self, symbol: Symbol) -> bool {
        self.state.selections.iter().any(|s| s.symbol == symbol)
    }

    /// Next symbol the user has to hit, if the trail is not exhausted.
    pub fn expected(&self) -> Option<Symbol> {
        self.trail.get(self.state.current_index).copied()
    }

    pub fn popup(&self) -> Option<ResultPopup> {
        let popup = &self.settings.popup;
        if self.state.phase != RunPhase::Finished || popup.hide_all {
            return None;
        }
        Some(ResultPopup {
            time: (!popup.hide_results).then_some(self.state.elapsed_secs),
            errors: (!popup.hide_results).then_some(self.state.error_count),
            show_buttons: !popup.hide_buttons,
        })
    }

    pub fn render_model(&self) -> RenderModel {
        RenderModel::build(
            &self.state.items,
            &self.state.selections,
            &self.live,
            self.settings.radius(),
        )
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    pub fn has_started(&self) -> bool {
        self.state.phase != RunPhase::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        self.state.phase == RunPhase::Finished
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn error_count(&self) -> u32 {
        self.state.error_count
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.state.elapsed_secs
    }

    pub fn selections(&self) -> &[SelectionRecord] {
        &self.state.selections
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.state.items
    }

    pub fn trail(&self) -> &[Symbol] {
        &self.trail
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn settings(&self) -> &TrailSettings {
        &self.settings
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn live_style(&self) -> &LiveStyle {
        &self.live
    }

    pub fn live_style_mut(&mut self) -> &mut LiveStyle {
        &mut self.live
    }

    pub fn position_of(&self, symbol: Symbol) -> Option<Point> {
        self.state
            .items
            .iter()
            .find(|i| i.symbol == symbol)
            .map(|i| i.position)
    }
}
