use std::fmt::{self, Display, Formatter};

/// A ledger line
///
/// Cells are untyped text in column order, `None` standing for a null (empty) cell.
/// `seq` is the position of the line in ingestion order. It survives every
/// filtering step unchanged, so "first seen" questions can always be answered
/// without relying on the order rows happen to be stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub seq: usize,
    pub cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(seq: usize, cells: Vec<Option<String>>) -> Self {
        Row { seq, cells }
    }

    /// The non-null content of the cell at `index`
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|cell| cell.as_deref())
    }
}

/// An ordered set of ledger lines sharing one column list
///
/// Every stage of the reduction pipeline takes tables by reference and hands
/// back a fresh one with the same columns, so a table is never a new schema and
/// an empty result still knows its columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: vec![],
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Table::new(columns);
        for row in rows {
            table.push(row);
        }
        table
    }

    /// Builds a table from string literals, the empty string being null.
    /// Rows are numbered in the order given.
    ///
    /// ```rust
    /// # use jereduce::Table;
    /// let table = Table::from_str_rows(&["je_id", "hash"], &[&["1", "x"], &["2", ""]]);
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.rows()[1].get(1), None);
    /// ```
    pub fn from_str_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for cells in rows {
            table.push_cells(
                cells
                    .iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect(),
            );
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, names being compared exactly
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The sequence number the next appended line gets
    pub fn next_seq(&self) -> usize {
        self.rows.last().map_or(0, |row| row.seq + 1)
    }

    /// Appends a row, padding or cutting its cells to the column count
    pub fn push(&mut self, mut row: Row) {
        row.cells.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Appends cells as a new line numbered after the last one
    pub fn push_cells(&mut self, cells: Vec<Option<String>>) {
        let seq = self.next_seq();
        self.push(Row::new(seq, cells));
    }

    /// A fresh table with the rows for which `keep` holds, in the same order
    pub fn select<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Row) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// The first `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// All values of one column, nulls included
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| row.get(index))
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.columns.join("\t"))?;
        for row in self.rows.iter() {
            let cells: Vec<&str> = row
                .cells
                .iter()
                .map(|c| c.as_deref().unwrap_or(""))
                .collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}
