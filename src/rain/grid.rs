// Grid renderer - the character buffer behind the rain effect
//
// The grid owns a width x height cell buffer matching the rain pane of the
// terminal. Each frame the animator's column state is painted into it from
// scratch: falling streams with a bright head and dimming tail, settled
// response characters in bold white, and a box-drawing frame around the
// settled block. The TUI then converts the buffer into styled lines.
//
// All writes are bounds-checked, so a terminal resize mid-animation just
// clips streams that now fall outside the buffer.

use crate::rain::animator::{ColumnState, TargetCell};
use crate::theme::RainColor;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Smallest viewport the grid will operate on; resize clamps to this
pub const MIN_WIDTH: u16 = 20;
pub const MIN_HEIGHT: u16 = 5;

/// How many trail characters after the head keep full brightness
const BRIGHT_TAIL: usize = 3;

/// Brightness class of a rain cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Head,
    Body,
    Dim,
}

/// One cell of the rain pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Blank,
    Rain {
        ch: char,
        shade: Shade,
    },
    Settled(char),
    Frame(char),
}

/// Character buffer for one full repaint of the rain pane
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        let mut grid = Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        };
        grid.resize(width, height);
        grid
    }

    /// Re-establish buffer dimensions, clamped to the minimum usable size.
    /// Existing contents are discarded; the next draw_frame repaints anyway.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width.max(MIN_WIDTH);
        self.height = height.max(MIN_HEIGHT);
        self.cells = vec![Cell::Blank; self.width as usize * self.height as usize];
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Blank);
    }

    /// Cell at (x, y); out-of-bounds reads come back blank
    pub fn cell(&self, x: u16, y: u16) -> Cell {
        if x >= self.width || y >= self.height {
            return Cell::Blank;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Bounds-checked write; coordinates outside the buffer are dropped
    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Repaint the whole buffer from the animator's current state.
    ///
    /// Paint order matters: streams first, then settled characters (so the
    /// message stays legible under crossing rain), then the frame around the
    /// settled block.
    pub fn draw_frame(&mut self, columns: &[ColumnState], targets: &[TargetCell]) {
        self.clear();

        for col in columns.iter().filter(|c| c.active) {
            let head_row = col.pos as i32;
            for (i, &ch) in col.trail.iter().enumerate() {
                let shade = if i == 0 {
                    Shade::Head
                } else if i <= BRIGHT_TAIL {
                    Shade::Body
                } else {
                    Shade::Dim
                };
                self.set(col.x as i32, head_row - i as i32, Cell::Rain { ch, shade });
            }
        }

        for target in targets.iter().filter(|t| t.settled) {
            self.set(target.x as i32, target.y as i32, Cell::Settled(target.ch));
        }

        self.draw_border(targets);
    }

    /// Box-drawing frame around the bounding box of settled characters,
    /// expanded by a small margin. Grows as more characters settle.
    fn draw_border(&mut self, targets: &[TargetCell]) {
        let settled = targets.iter().filter(|t| t.settled);
        let mut bounds: Option<(u16, u16, u16, u16)> = None;
        for t in settled {
            bounds = Some(match bounds {
                None => (t.x, t.x, t.y, t.y),
                Some((min_x, max_x, min_y, max_y)) => (
                    min_x.min(t.x),
                    max_x.max(t.x),
                    min_y.min(t.y),
                    max_y.max(t.y),
                ),
            });
        }
        let Some((min_x, max_x, min_y, max_y)) = bounds else {
            return;
        };

        let min_x = min_x.saturating_sub(2) as i32;
        let max_x = (max_x + 2).min(self.width - 1) as i32;
        let min_y = min_y.saturating_sub(1) as i32;
        let max_y = (max_y + 1).min(self.height - 1) as i32;
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        for x in (min_x + 1)..max_x {
            self.set_frame(x, min_y, '─');
            self.set_frame(x, max_y, '─');
        }
        for y in (min_y + 1)..max_y {
            self.set_frame(min_x, y, '│');
            self.set_frame(max_x, y, '│');
        }
        self.set_frame(min_x, min_y, '┌');
        self.set_frame(max_x, min_y, '┐');
        self.set_frame(min_x, max_y, '└');
        self.set_frame(max_x, max_y, '┘');
    }

    /// Frame segments overwrite rain but never settled text
    fn set_frame(&mut self, x: i32, y: i32, ch: char) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        if !matches!(self.cells[idx], Cell::Settled(_)) {
            self.cells[idx] = Cell::Frame(ch);
        }
    }

    /// Convert the buffer into styled lines, one per row, merging runs of
    /// identically-styled cells into single spans.
    pub fn lines(&self, color: RainColor) -> Vec<Line<'static>> {
        let head = Style::default()
            .fg(color.head())
            .add_modifier(Modifier::BOLD);
        let body = Style::default().fg(color.body());
        let dim = Style::default().fg(color.body()).add_modifier(Modifier::DIM);
        let settled = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let blank = Style::default();

        let mut lines = Vec::with_capacity(self.height as usize);
        for y in 0..self.height {
            let mut spans: Vec<Span<'static>> = Vec::new();
            let mut run = String::new();
            let mut run_style = blank;
            for x in 0..self.width {
                let (ch, style) = match self.cell(x, y) {
                    Cell::Blank => (' ', blank),
                    Cell::Rain { ch, shade } => match shade {
                        Shade::Head => (ch, head),
                        Shade::Body => (ch, body),
                        Shade::Dim => (ch, dim),
                    },
                    Cell::Settled(ch) => (ch, settled),
                    Cell::Frame(ch) => (ch, dim),
                };
                if style != run_style && !run.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut run), run_style));
                }
                run_style = style;
                run.push(ch);
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, run_style));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(x: u16, pos: f32, trail: &str) -> ColumnState {
        ColumnState {
            x,
            pos,
            speed: 1.0,
            trail: trail.chars().collect(),
            target: None,
            active: true,
        }
    }

    #[test]
    fn resize_clamps_to_minimum() {
        let grid = Grid::new(1, 1);
        assert_eq!(grid.width(), MIN_WIDTH);
        assert_eq!(grid.height(), MIN_HEIGHT);
    }

    #[test]
    fn draw_frame_paints_head_and_tail() {
        let mut grid = Grid::new(40, 20);
        grid.draw_frame(&[stream(5, 10.0, "abc")], &[]);
        assert_eq!(
            grid.cell(5, 10),
            Cell::Rain {
                ch: 'a',
                shade: Shade::Head
            }
        );
        assert_eq!(
            grid.cell(5, 9),
            Cell::Rain {
                ch: 'b',
                shade: Shade::Body
            }
        );
        assert_eq!(
            grid.cell(5, 8),
            Cell::Rain {
                ch: 'c',
                shade: Shade::Body
            }
        );
    }

    #[test]
    fn streams_outside_the_buffer_are_clipped() {
        let mut grid = Grid::new(40, 20);
        // Head below the bottom edge and a column past the right edge
        grid.draw_frame(&[stream(5, 300.0, "ab"), stream(200, 10.0, "ab")], &[]);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                assert_eq!(grid.cell(x, y), Cell::Blank);
            }
        }
    }

    #[test]
    fn settled_targets_win_over_rain() {
        let mut grid = Grid::new(40, 20);
        let target = TargetCell {
            ch: 'H',
            x: 5,
            y: 10,
            settled: true,
        };
        grid.draw_frame(&[stream(5, 10.0, "abc")], &[target]);
        assert_eq!(grid.cell(5, 10), Cell::Settled('H'));
    }

    #[test]
    fn border_surrounds_settled_block() {
        let mut grid = Grid::new(40, 20);
        let target = TargetCell {
            ch: 'H',
            x: 10,
            y: 10,
            settled: true,
        };
        grid.draw_frame(&[], &[target]);
        assert_eq!(grid.cell(8, 9), Cell::Frame('┌'));
        assert_eq!(grid.cell(12, 11), Cell::Frame('┘'));
        assert_eq!(grid.cell(10, 9), Cell::Frame('─'));
        assert_eq!(grid.cell(8, 10), Cell::Frame('│'));
    }

    #[test]
    fn unsettled_targets_leave_no_trace() {
        let mut grid = Grid::new(40, 20);
        let target = TargetCell {
            ch: 'H',
            x: 10,
            y: 10,
            settled: false,
        };
        grid.draw_frame(&[], &[target]);
        assert_eq!(grid.cell(10, 10), Cell::Blank);
    }

    #[test]
    fn lines_cover_the_full_viewport() {
        let grid = Grid::new(40, 20);
        let lines = grid.lines(RainColor::Green);
        assert_eq!(lines.len(), 20);
        let width: usize = lines[0].spans.iter().map(|s| s.content.chars().count()).sum();
        assert_eq!(width, 40);
    }
}
