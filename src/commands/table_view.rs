use prettytable::{format, Cell, Row, Table};
use std::io;
use terminal_size::{terminal_size, Width};

use crate::models;

const DEFAULT_WIDTH: usize = 160;
const MIN_CELL_WIDTH: usize = 6;

/// Prints the first `limit` rows of a table, cells cut to share the terminal width
pub fn print(table: &models::Table, limit: usize) -> io::Result<()> {
    let width = match terminal_size() {
        Some((Width(w), _)) => w as usize,
        None => DEFAULT_WIDTH,
    };
    let columns = table.columns().len().max(1);
    let cell_width = (width / columns).saturating_sub(3).max(MIN_CELL_WIDTH);

    let mut view = Table::new();
    view.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    view.set_titles(Row::new(
        table
            .columns()
            .iter()
            .map(|c| Cell::new(&truncate(c, cell_width)).style_spec("b"))
            .collect(),
    ));
    for row in table.rows().iter().take(limit) {
        view.add_row(Row::new(
            row.cells
                .iter()
                .map(|c| {
                    let text = c.as_deref().unwrap_or("");
                    let cell = Cell::new(&truncate(text, cell_width));
                    match models::parse_number(text) {
                        Some(_) => cell.style_spec("r"),
                        None => cell,
                    }
                })
                .collect(),
        ));
    }
    view.print(&mut io::stdout())?;
    if table.len() > limit {
        println!("showing the first {} of {} rows", limit, table.len());
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_cells_are_cut() {
        assert_eq!(truncate("10100", 6), "10100");
        assert_eq!(truncate("Year-end bonus adjustment", 6), "Year-…");
        assert_eq!(truncate("법인카드 결제", 4), "법인카…");
    }
}
