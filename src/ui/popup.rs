use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::engine::ResultPopup;
use crate::util::format_secs;

const BUTTONS: &str = "[r] Restart   [esc] Quit";
const PADDING: u16 = 4;

/// End-of-run dialog, centred over whatever is below it.
pub struct ResultDialog {
    lines: Vec<Line<'static>>,
}

impl ResultDialog {
    pub fn new(popup: ResultPopup) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::styled("Test complete", bold.fg(Color::Green))];

        if let Some(time) = popup.time {
            lines.push(Line::raw(format!("Time: {}s", format_secs(time))));
        }
        if let Some(errors) = popup.errors {
            lines.push(Line::raw(format!("Errors: {errors}")));
        }
        if popup.show_buttons {
            lines.push(Line::raw(""));
            lines.push(Line::styled(BUTTONS, Style::default().add_modifier(Modifier::DIM)));
        }

        Self { lines }
    }

    fn size(&self) -> (u16, u16) {
        let widest = self
            .lines
            .iter()
            .map(|l| l.to_string().width())
            .max()
            .unwrap_or_default() as u16;
        (widest + PADDING, self.lines.len() as u16 + 2)
    }
}

fn centred(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

impl Widget for ResultDialog {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.size();
        let rect = centred(area, width, height);

        Clear.render(rect, buf);
        Paragraph::new(self.lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(rect, buf);
    }
}
