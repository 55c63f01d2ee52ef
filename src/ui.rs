pub mod geometry;
pub mod popup;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker as CanvasMarker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Paragraph, Widget,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::placement::{Point, Surface};
use crate::render::{Connection, LineStyle, Marker, MarkerStyle, RenderModel};
use crate::ui::geometry::{board_area, header_area, surface_for, to_canvas, CELL_WIDTH_PX};
use crate::util::format_secs;

const LINE_COLOR: Color = Color::Blue;
const ERROR_COLOR: Color = Color::Red;
const DASH_PX: f64 = 8.0;
/// Spacing of the concentric rings that shade a selected marker.
const FILL_STEP_PX: f64 = 3.0;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let test = &self.test;
        let live = test.live_style();

        let timer = if live.show_timer {
            Span::styled(
                format_secs(test.elapsed_secs()),
                Style::default().add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        };
        let hints = Span::styled(
            "  r restart · l lines · w wrong · t timer · esc quit",
            Style::default().add_modifier(Modifier::DIM),
        );
        Paragraph::new(Line::from(vec![timer, hints]))
            .alignment(Alignment::Left)
            .render(header_area(area), buf);

        let board = board_area(area);
        let model = test.render_model();
        render_board(&model, surface_for(board), board, buf);

        if let Some(popup) = test.popup() {
            popup::ResultDialog::new(popup).render(area, buf);
        }
    }
}

fn render_board(model: &RenderModel, surface: Surface, board: Rect, buf: &mut Buffer) {
    Canvas::default()
        .marker(CanvasMarker::Braille)
        .x_bounds([0.0, surface.width])
        .y_bounds([0.0, surface.height])
        .paint(|ctx| {
            if model.lines_under_markers {
                draw_connections(ctx, &model.connections, surface);
                ctx.layer();
            }
            for marker in &model.markers {
                draw_marker(ctx, marker, model.radius, surface);
            }
            if !model.lines_under_markers {
                ctx.layer();
                draw_connections(ctx, &model.connections, surface);
            }
        })
        .render(board, buf);
}

fn draw_connections(ctx: &mut Context, connections: &[Connection], surface: Surface) {
    for c in connections {
        let (x1, y1) = to_canvas(surface, c.from);
        let (x2, y2) = to_canvas(surface, c.to);
        match c.style {
            LineStyle::Normal => ctx.draw(&CanvasLine::new(x1, y1, x2, y2, LINE_COLOR)),
            LineStyle::Error => {
                for (a, b) in dashes(Point::new(x1, y1), Point::new(x2, y2), DASH_PX) {
                    ctx.draw(&CanvasLine::new(a.x, a.y, b.x, b.y, ERROR_COLOR));
                }
            }
        }
    }
}

fn draw_marker(ctx: &mut Context, marker: &Marker, radius: f64, surface: Surface) {
    let (x, y) = to_canvas(surface, marker.position);
    let (ring, fill, text) = match marker.style {
        MarkerStyle::Default => (Color::Gray, None, Style::default().fg(Color::White)),
        MarkerStyle::Selected => (
            Color::DarkGray,
            Some(Color::DarkGray),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        MarkerStyle::Error => (
            ERROR_COLOR,
            Some(Color::LightRed),
            Style::default().fg(ERROR_COLOR).add_modifier(Modifier::BOLD),
        ),
    };

    if let Some(fill) = fill {
        let mut r = radius - FILL_STEP_PX;
        while r > 0.0 {
            ctx.draw(&Circle { x, y, radius: r, color: fill });
            r -= FILL_STEP_PX;
        }
    }
    ctx.draw(&Circle { x, y, radius, color: ring });

    let label = marker.symbol.label();
    let half_width = label.width() as f64 * CELL_WIDTH_PX / 2.0;
    ctx.print(x - half_width, y, Line::styled(label, text));
}

/// Split a segment into alternating drawn/skipped pieces of `dash` length.
fn dashes(from: Point, to: Point, dash: f64) -> Vec<(Point, Point)> {
    let length = from.distance(&to);
    if length <= dash {
        return vec![(from, to)];
    }
    let (dx, dy) = ((to.x - from.x) / length, (to.y - from.y) / length);
    let at = |d: f64| Point::new(from.x + dx * d, from.y + dy * d);

    let mut pieces = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        pieces.push((at(start), at(end)));
        start += dash * 2.0;
    }
    pieces
}

#[cfg(test)]
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    (area.y..area.y + area.height)
        .map(|y| {
            (area.x..area.x + area.width)
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
