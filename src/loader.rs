//! CSV ingestion and export
//!
//! Every cell is read as text; an empty cell is null. Nothing is typed on the way
//! in, the condition language decides how to read a cell when it compares it.
use log::{debug, info};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::models::Table;
use crate::LoadError;

const BOM: &str = "\u{feff}";

/// Reads one CSV file; its header row gives the columns
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table, LoadError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let headers = read_headers(&mut reader, path)?;
    let mut table = Table::new(headers.clone());
    append_records(&mut reader, path, &headers, &mut table)?;
    info!("loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Reads files, directories and glob patterns into one table
///
/// A directory stands for the `*.csv` files inside it. Directories and patterns
/// are read in file name order. The first file read defines the columns: later
/// files are matched on it by header name, missing columns being null and extra
/// ones dropped. Sequence numbers run on across files.
pub fn load_files<P: AsRef<Path>>(inputs: &[P]) -> Result<Table, LoadError> {
    let mut files = vec![];
    for input in inputs {
        files.extend(resolve_input(input.as_ref())?);
    }
    if files.is_empty() {
        let names: Vec<String> = inputs
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect();
        return Err(LoadError::NoFiles(names.join(", ")));
    }

    let mut table: Option<Table> = None;
    for file in files.iter() {
        let mut reader = open(file)?;
        let headers = read_headers(&mut reader, file)?;
        let target = table.get_or_insert_with(|| Table::new(headers.clone()));
        let before = target.len();
        append_records(&mut reader, file, &headers, target)?;
        info!("loaded {} rows from {}", target.len() - before, file.display());
    }
    let table = table.unwrap_or_default();
    info!(
        "{} rows and {} columns from {} files",
        table.len(),
        table.columns().len(),
        files.len()
    );
    Ok(table)
}

fn resolve_input(input: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let expanded = PathBuf::from(shellexpand::tilde(&input.to_string_lossy()).to_string());
    let pattern = if expanded.is_dir() {
        expanded.join("*.csv").to_string_lossy().to_string()
    } else if is_pattern(&expanded.to_string_lossy()) {
        expanded.to_string_lossy().to_string()
    } else {
        return Ok(vec![expanded]);
    };

    let paths = glob::glob(&pattern).map_err(|source| LoadError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    let mut files = vec![];
    for entry in paths {
        let file = entry.map_err(|e| LoadError::Io {
            path: e.path().to_path_buf(),
            source: e.into(),
        })?;
        if file.is_file() {
            files.push(file);
        }
    }
    files.sort();
    debug!("{} -> {} files", pattern, files.len());
    if files.is_empty() {
        return Err(LoadError::NoFiles(input.display().to_string()));
    }
    Ok(files)
}

fn is_pattern(path: &str) -> bool {
    path.contains(|c: char| c == '*' || c == '?' || c == '[')
}

fn open(path: &Path) -> Result<csv::Reader<File>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>, path: &Path) -> Result<Vec<String>, LoadError> {
    let headers = reader.headers().map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    if headers.is_empty() {
        return Err(LoadError::MissingHeader(path.to_path_buf()));
    }
    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, h)| match i {
            0 => h.trim_start_matches(BOM).to_string(),
            _ => h.to_string(),
        })
        .collect())
}

/// Appends the records of a reader, placing each field under the table column
/// with the same header
fn append_records<R: Read>(
    reader: &mut csv::Reader<R>,
    path: &Path,
    headers: &[String],
    table: &mut Table,
) -> Result<(), LoadError> {
    let positions: Vec<Option<usize>> = table
        .columns()
        .iter()
        .map(|column| headers.iter().position(|h| h == column))
        .collect();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let cells = positions
            .iter()
            .map(|position| {
                position
                    .and_then(|i| record.get(i))
                    .filter(|cell| !cell.is_empty())
                    .map(String::from)
            })
            .collect();
        table.push_cells(cells);
    }
    Ok(())
}

/// Writes a table as CSV with a byte order mark, so spreadsheets pick UTF-8
pub fn write_csv<W: Write>(table: &Table, mut writer: W) -> csv::Result<()> {
    writer.write_all(BOM.as_bytes())?;
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.cells.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), LoadError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(table, file).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
