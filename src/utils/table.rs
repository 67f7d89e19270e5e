// src/utils/table.rs

//! Plain-text table layout for monospaced chat messages.

use unicode_segmentation::UnicodeSegmentation;

/// Column separator between cells.
const GAP: &str = "  ";

/// A left-aligned table with a header row and a dash rule beneath it.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells render as empty.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Width of each column: the widest of the header and every cell.
    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|col| {
                self.rows
                    .iter()
                    .chain(std::iter::once(&self.headers))
                    .filter_map(|row| row.get(col))
                    .map(|cell| text_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render the table. Lines carry no trailing whitespace.
    pub fn render(&self) -> String {
        let widths = self.column_widths();

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(&self.headers, &widths));
        lines.push(format_row(&rule, &widths));
        for row in &self.rows {
            lines.push(format_row(row, &widths));
        }
        lines.join("\n")
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = widths
        .iter()
        .enumerate()
        .map(|(col, width)| {
            let cell = cells.get(col).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(text_width(cell));
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(GAP);
    line.trim_end().to_string()
}

/// Width of a string in grapheme clusters.
pub fn text_width(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Cut a string to at most `max` grapheme clusters.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.grapheme_indices(true).nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
