//! Table rendering
//!
//! Draws a ratatui [`Table`] into an off-screen [`Buffer`] sized to the
//! content and reads it back as plain text lines.

use crate::resource::ResourceRecord;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::Line,
    widgets::{Block, Borders, Cell, Padding, Row, Table, Widget},
};

const HEADERS: [&str; 4] = ["REGION", "SERVICE", "PRODUCT", "ID"];

/// Gap between columns; the divider sits in the middle
const COLUMN_SPACING: u16 = 3;

/// Cells per buffer are kept within u16 range
const MAX_BUFFER_CELLS: usize = u16::MAX as usize;

/// Render records as a bordered table, one line per row
pub fn render_table(records: &[ResourceRecord]) -> String {
    let rows: Vec<[&str; 4]> = records
        .iter()
        .map(|r| {
            [
                r.region.as_str(),
                r.service.as_str(),
                r.product_display(),
                r.id.as_str(),
            ]
        })
        .collect();

    let widths = column_widths(&rows);
    let table_width = widths
        .iter()
        .fold(0u16, |acc, w| acc.saturating_add(*w))
        .saturating_add(COLUMN_SPACING * (HEADERS.len() as u16 - 1))
        .saturating_add(4);

    // Large tables are drawn in slices that join seamlessly
    let rows_per_chunk = (MAX_BUFFER_CELLS / table_width as usize)
        .saturating_sub(4)
        .max(1);
    let chunks: Vec<&[[&str; 4]]> = if rows.is_empty() {
        vec![&rows[..]]
    } else {
        rows.chunks(rows_per_chunk).collect()
    };

    let last = chunks.len() - 1;
    let mut lines = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        lines.extend(render_chunk(chunk, &widths, table_width, i == 0, i == last));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Widest cell per column, headers included
fn column_widths(rows: &[[&str; 4]]) -> [u16; 4] {
    let mut widths = HEADERS.map(text_width);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(text_width(cell));
        }
    }
    widths
}

fn text_width(text: &str) -> u16 {
    u16::try_from(Line::raw(text).width()).unwrap_or(u16::MAX)
}

fn render_chunk(
    rows: &[[&str; 4]],
    widths: &[u16; 4],
    width: u16,
    first: bool,
    last: bool,
) -> Vec<String> {
    let mut borders = Borders::LEFT | Borders::RIGHT;
    if first {
        borders |= Borders::TOP;
    }
    if last {
        borders |= Borders::BOTTOM;
    }

    // top border, header and its separator line
    let head = if first { 3 } else { 0 };
    let height = rows.len() as u16 + head + u16::from(last);
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);

    let body = rows
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(*cell))));
    let mut table = Table::new(body, (*widths).map(Constraint::Length))
        .column_spacing(COLUMN_SPACING)
        .block(
            Block::default()
                .borders(borders)
                .padding(Padding::horizontal(1)),
        );
    if first {
        table = table.header(Row::new(HEADERS.map(Cell::from)).bottom_margin(1));
    }
    Widget::render(table, area, &mut buf);

    draw_dividers(&mut buf, widths, first, last);

    (0..height).map(|y| read_line(&buf, y)).collect()
}

/// Read one buffer row back as text
///
/// A wide symbol occupies its own cell plus blank continuation cells,
/// which are skipped.
fn read_line(buf: &Buffer, y: u16) -> String {
    let mut line = String::new();
    let mut x = 0;
    while x < buf.area.width {
        let symbol = buf[(x, y)].symbol();
        line.push_str(symbol);
        x = x.saturating_add(text_width(symbol).max(1));
    }
    line.trim_end().to_string()
}

/// Column dividers, junctions and the header separator line
fn draw_dividers(buf: &mut Buffer, widths: &[u16; 4], first: bool, last: bool) {
    let area = buf.area;
    let right = area.width - 1;
    let bottom = area.height - 1;

    if first {
        let y = 2;
        buf[(0, y)].set_symbol("├");
        for x in 1..right {
            buf[(x, y)].set_symbol("─");
        }
        buf[(right, y)].set_symbol("┤");
    }

    let mut x = 2;
    for width in &widths[..widths.len() - 1] {
        x += width + COLUMN_SPACING / 2;
        for y in 0..area.height {
            let symbol = match (y, first, last) {
                (0, true, _) => "┬",
                (2, true, _) => "┼",
                (y, _, true) if y == bottom => "┴",
                _ => "│",
            };
            buf[(x, y)].set_symbol(symbol);
        }
        x += COLUMN_SPACING - COLUMN_SPACING / 2;
    }
}
