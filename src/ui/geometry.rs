use ratatui::layout::Rect;

use crate::placement::{Point, Surface};

/// Surface pixels covered by one terminal cell. Cells are about twice as tall
/// as they are wide, so this keeps circles round and the default radius sane.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

const HEADER_LINES: u16 = 1;

/// The part of the terminal given to the board, below the header line.
pub fn board_area(area: Rect) -> Rect {
    let header = HEADER_LINES.min(area.height);
    Rect::new(area.x, area.y + header, area.width, area.height - header)
}

pub fn header_area(area: Rect) -> Rect {
    Rect::new(area.x, area.y, area.width, HEADER_LINES.min(area.height))
}

pub fn surface_for(board: Rect) -> Surface {
    Surface::new(
        board.width as f64 * CELL_WIDTH_PX,
        board.height as f64 * CELL_HEIGHT_PX,
    )
}

/// Centre of the clicked cell in surface pixels, or None outside the board.
pub fn cell_to_point(board: Rect, column: u16, row: u16) -> Option<Point> {
    if column < board.x
        || row < board.y
        || column >= board.x + board.width
        || row >= board.y + board.height
    {
        return None;
    }
    Some(Point::new(
        (column - board.x) as f64 * CELL_WIDTH_PX + CELL_WIDTH_PX / 2.0,
        (row - board.y) as f64 * CELL_HEIGHT_PX + CELL_HEIGHT_PX / 2.0,
    ))
}

/// Terminal cell containing a surface point, the inverse of [`cell_to_point`].
pub fn point_to_cell(board: Rect, point: Point) -> (u16, u16) {
    (
        board.x + (point.x / CELL_WIDTH_PX).floor() as u16,
        board.y + (point.y / CELL_HEIGHT_PX).floor() as u16,
    )
}

/// Canvas y grows upwards; surface y grows downwards.
pub fn to_canvas(surface: Surface, point: Point) -> (f64, f64) {
    (point.x, surface.height - point.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_sits_below_header() {
        let board = board_area(Rect::new(0, 0, 80, 24));
        assert_eq!(board, Rect::new(0, 1, 80, 23));
        assert_eq!(board_area(Rect::new(0, 0, 10, 0)).height, 0);
    }

    #[test]
    fn surface_scales_cells_to_pixels() {
        assert_eq!(surface_for(Rect::new(0, 1, 80, 23)), Surface::new(640.0, 368.0));
    }

    #[test]
    fn clicks_map_to_cell_centres() {
        let board = Rect::new(0, 1, 80, 23);
        assert_eq!(cell_to_point(board, 0, 1), Some(Point::new(4.0, 8.0)));
        assert_eq!(cell_to_point(board, 10, 3), Some(Point::new(84.0, 40.0)));
        assert_eq!(cell_to_point(board, 10, 0), None);
        assert_eq!(cell_to_point(board, 80, 5), None);
    }

    #[test]
    fn point_to_cell_inverts_cell_to_point() {
        let board = Rect::new(2, 1, 40, 20);
        let p = cell_to_point(board, 17, 9).unwrap();
        assert_eq!(point_to_cell(board, p), (17, 9));
    }

    #[test]
    fn canvas_flips_y() {
        let surface = Surface::new(100.0, 50.0);
        assert_eq!(to_canvas(surface, Point::new(10.0, 5.0)), (10.0, 45.0));
    }
}
