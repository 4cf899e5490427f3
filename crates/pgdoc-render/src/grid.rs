//! Fixed-width text grids.

use unicode_width::UnicodeWidthStr;

use crate::config::ColumnWidths;

/// Minimum cell width used by [`ColumnWidths::Fixed`].
const FIXED_CELL_WIDTH: usize = 20;

/// A text grid with a header row, rendered as fixed-width lines.
pub struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(header: &[&str]) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    /// Render header, separator, and rows.
    pub fn render(&self, widths: ColumnWidths) -> Vec<String> {
        let widths = self.column_widths(widths);
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(&self.header, &widths));
        lines.push(separator(&widths));
        for row in &self.rows {
            lines.push(format_row(row, &widths));
        }
        lines
    }

    fn column_widths(&self, strategy: ColumnWidths) -> Vec<usize> {
        match strategy {
            ColumnWidths::Auto => {
                let mut widths: Vec<usize> =
                    self.header.iter().map(|cell| display_width(cell)).collect();
                for row in &self.rows {
                    for (width, cell) in widths.iter_mut().zip(row) {
                        *width = (*width).max(display_width(cell));
                    }
                }
                widths
            }
            ColumnWidths::Fixed => self
                .header
                .iter()
                .map(|cell| display_width(cell).max(FIXED_CELL_WIDTH))
                .collect(),
        }
    }
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let pad = width.saturating_sub(display_width(cell));
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    format!(" {}", padded.join(" | ")).trim_end().to_string()
}

fn separator(widths: &[usize]) -> String {
    widths
        .iter()
        .map(|&width| "-".repeat(width + 2))
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        let mut grid = Grid::new(&["Column", "Type"]);
        grid.push_row(vec!["id".to_string(), "bigint".to_string()]);
        grid.push_row(vec![
            "email".to_string(),
            "character varying(255)".to_string(),
        ]);
        grid
    }

    #[test]
    fn auto_widths_fit_the_widest_cell() {
        let lines = sample().render(ColumnWidths::Auto);
        assert_eq!(lines[0], " Column | Type");
        assert_eq!(lines[1], "--------+------------------------");
        assert_eq!(lines[2], " id     | bigint");
        assert_eq!(lines[3], " email  | character varying(255)");
    }

    #[test]
    fn fixed_widths_pad_to_the_minimum() {
        let lines = sample().render(ColumnWidths::Fixed);
        assert_eq!(lines[2], format!(" id{} | bigint", " ".repeat(18)));
    }

    #[test]
    fn wide_glyphs_count_by_display_width() {
        let mut grid = Grid::new(&["Column", "Comment"]);
        grid.push_row(vec!["name".to_string(), "ユーザー".to_string()]);
        grid.push_row(vec!["other".to_string(), "plain".to_string()]);

        let lines = grid.render(ColumnWidths::Auto);
        // The four full-width glyphs occupy eight cells, wider than
        // "Comment"; the separator follows the display width.
        assert_eq!(lines[1], "--------+----------");
    }
}
