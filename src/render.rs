use itertools::Itertools;

use crate::engine::SelectionRecord;
use crate::placement::{PlacedItem, Point};
use crate::settings::LiveStyle;
use crate::trail::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Default,
    Selected,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Normal,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub symbol: Symbol,
    pub position: Point,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from: Point,
    pub to: Point,
    pub style: LineStyle,
}

/// Everything a renderer needs to draw one frame of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub markers: Vec<Marker>,
    pub connections: Vec<Connection>,
    pub lines_under_markers: bool,
    pub radius: f64,
}

impl RenderModel {
    pub fn build(
        items: &[PlacedItem],
        selections: &[SelectionRecord],
        style: &LiveStyle,
        radius: f64,
    ) -> Self {
        let markers = items
            .iter()
            .map(|item| Marker {
                symbol: item.symbol,
                position: item.position,
                style: marker_style(item.symbol, selections, style),
            })
            .collect();

        let position_of = |symbol: Symbol| {
            items
                .iter()
                .find(|i| i.symbol == symbol)
                .map(|i| i.position)
        };

        let connections = selections
            .iter()
            .tuple_windows()
            .filter_map(|(prev, curr)| {
                let from = position_of(prev.symbol)?;
                let to = position_of(curr.symbol)?;
                let style = if curr.is_error && style.show_wrong_selections {
                    LineStyle::Error
                } else {
                    LineStyle::Normal
                };
                Some(Connection { from, to, style })
            })
            .collect();

        Self {
            markers,
            connections,
            lines_under_markers: style.lines_under_dots,
            radius,
        }
    }
}

fn marker_style(symbol: Symbol, selections: &[SelectionRecord], style: &LiveStyle) -> MarkerStyle {
    match selections.iter().find(|s| s.symbol == symbol) {
        None => MarkerStyle::Default,
        Some(s) if s.is_error && style.show_wrong_selections => MarkerStyle::Error,
        Some(_) => MarkerStyle::Selected,
    }
}
