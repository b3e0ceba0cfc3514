//! Fixed-width text tables
//!
//! Columns are left-aligned and sized to their widest value (header included),
//! capped at [`MAX_COLUMN_LENGTH`]. A line of `#` separates header from rows:
//!
//! ```text
//! Priority   Sum
//! ###############
//! High       2
//! Low        1
//! ```

/// Widest a column may grow; longer values are truncated
pub const MAX_COLUMN_LENGTH: usize = 60;

/// Extra spaces after each column's widest value
pub const COLUMN_PADDING: usize = 2;

/// A type that renders as one table row
pub trait TableRow {
    /// Column titles, in display order
    fn headers() -> Vec<&'static str>;

    /// Cell values, one per header
    fn cells(&self) -> Vec<String>;
}

/// Render `rows` as a text table.
///
/// An empty slice still renders the header and separator.
pub fn render<R: TableRow>(rows: &[R]) -> String {
    let headers = R::headers();
    let contents: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
    let widths = column_widths(&headers, &contents);

    let mut output = String::new();
    output.push_str(&render_line(headers.iter().copied(), &widths));

    let total: usize = widths.iter().map(|width| width + 1 + COLUMN_PADDING).sum();
    output.push_str(&"#".repeat(total));
    output.push('\n');

    for row in &contents {
        output.push_str(&render_line(row.iter().map(String::as_str), &widths));
    }
    output
}

fn column_widths(headers: &[&str], contents: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(column, header)| {
            contents
                .iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .fold(header.chars().count(), usize::max)
                .min(MAX_COLUMN_LENGTH)
        })
        .collect()
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.zip(widths) {
        let cell = truncate(cell, MAX_COLUMN_LENGTH);
        line.push_str(&format!("{:<width$} ", cell, width = width + COLUMN_PADDING));
    }
    line.push('\n');
    line
}

fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
