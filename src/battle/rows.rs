//! Seven-column row rendering for the reconstructed battle log, in either
//! fixed-width text or pipe-table markup.

use std::fmt::Write as _;

pub const COLUMN_TITLES: [&str; 7] =
    ["Round", "Initiator", "Action", "Target", "Value", "Hit chance", "RNG"];

/// Right-justified column widths for the fixed-width mode; markup mode keeps
/// the same padding so both render through one code path.
pub const COLUMN_WIDTHS: [usize; 7] = [7, 30, 16, 30, 5, 11, 5];

/// Rule line emitted under the header in markup mode.
pub const MARKDOWN_RULE: &str = "-|-|-|-|-|-|-\n";

/// Placeholder for empty cells in markup mode, so table renderers keep the
/// column.
pub const EMPTY_MARKUP_CELL: &str = "&nbsp;";

const SEPARATOR_WIDTH: usize = 124;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Fixed,
    Markdown,
}

/// One cell of a log row. Numeric cells keep their type so the renderer
/// owns all text coercion; `Num` is the RNG column and renders with exactly
/// three decimals.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Num(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }

    fn render(&self, mode: RenderMode) -> String {
        match self {
            Cell::Empty => match mode {
                RenderMode::Fixed => String::new(),
                RenderMode::Markdown => EMPTY_MARKUP_CELL.to_string(),
            },
            Cell::Text(value) => value.clone(),
            Cell::Int(value) => value.to_string(),
            Cell::Num(value) => format!("{value:.3}"),
        }
    }
}

/// Round-position cell: `{round:>3}-{seq:<3}`, e.g. `"  2-0  "`.
pub fn position_cell(round: i32, seq: usize) -> Cell {
    Cell::Text(format!("{round:>3}-{seq:<3}"))
}

/// Render one row; same padding in both modes, markup mode substitutes the
/// non-breaking placeholder for empty cells.
pub fn construct_row(cells: &[Cell; 7], mode: RenderMode) -> String {
    let mut row = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            row.push_str(" | ");
        }
        let _ = write!(&mut row, "{:>width$}", cell.render(mode), width = COLUMN_WIDTHS[i]);
    }
    row.push('\n');
    row
}

/// Column header row; in markup mode the separator rule is appended.
pub fn header_row(mode: RenderMode) -> String {
    let cells: [Cell; 7] = COLUMN_TITLES.map(Cell::text);
    let mut header = construct_row(&cells, mode);
    if mode == RenderMode::Markdown {
        header.push_str(MARKDOWN_RULE);
    }
    header
}

/// Full-width dashed rule used around headers in fixed-width mode.
pub fn separator() -> String {
    let mut line = "-".repeat(SEPARATOR_WIDTH);
    line.push('\n');
    line
}
