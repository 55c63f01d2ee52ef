use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::Rect;

use crate::bridge::EventSink;
use crate::engine::{ClickOutcome, TrailTest};
use crate::runtime::TrailEvent;
use crate::settings::TrailSettings;
use crate::ui::geometry::{board_area, cell_to_point, surface_for};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Terminal session around one [`TrailTest`].
pub struct App {
    pub test: TrailTest,
    area: Rect,
}

impl App {
    /// Builds the test for the given terminal area and starts the first run.
    pub fn new(
        settings: TrailSettings,
        area: Rect,
        seed: Option<u64>,
        sink: Option<Box<dyn EventSink>>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut test = TrailTest::with_rng(settings, surface_for(board_area(area)), rng);
        if let Some(sink) = sink {
            test = test.with_sink(sink);
        }
        test.start();
        Self { test, area }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
        self.test.resize(surface_for(board_area(area)));
    }

    /// Restart is offered by the result dialog; hiding its buttons removes it
    /// once the run is over.
    fn can_restart(&self) -> bool {
        !self.test.has_finished() || self.test.popup().is_some_and(|p| p.show_buttons)
    }

    pub fn handle(&mut self, event: TrailEvent) -> Control {
        match event {
            TrailEvent::Tick => {
                self.test.on_tick();
            }
            TrailEvent::Resize => {}
            TrailEvent::Click { column, row } => {
                if let Some(point) = cell_to_point(board_area(self.area), column, row) {
                    if let ClickOutcome::Wrong(symbol) = self.test.click(point) {
                        tracing::debug!(%symbol, "wrong target");
                    }
                }
            }
            TrailEvent::Key(key) => return self.on_key(key),
        }
        Control::Continue
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('r') if self.can_restart() => self.test.restart(),
            KeyCode::Char('l') => {
                let live = self.test.live_style_mut();
                live.lines_under_dots = !live.lines_under_dots;
            }
            KeyCode::Char('w') => {
                let live = self.test.live_style_mut();
                live.show_wrong_selections = !live.show_wrong_selections;
            }
            KeyCode::Char('t') => {
                let live = self.test.live_style_mut();
                live.show_timer = !live.show_timer;
            }
            _ => {}
        }
        Control::Continue
    }
}
