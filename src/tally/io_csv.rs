// Primitives for reading CSV files.

use std::io::Read;

use log::{debug, info};
use snafu::ResultExt;

use crate::tally::{io_common::Table, *};

pub fn read_csv_table(path: &str) -> BTallyResult<Table> {
    info!("Attempting to read CSV file {:?}", path);
    let rdr = csv_builder()
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_table(rdr)
}

/// Parses CSV content that is already in memory (for example a downloaded sheet).
pub fn parse_csv_table(text: &str) -> BTallyResult<Table> {
    let rdr = csv_builder().from_reader(text.trim().as_bytes());
    read_table(rdr)
}

fn csv_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    // Spreadsheet exports drop the trailing empty cells of a row.
    builder.has_headers(true).flexible(true);
    builder
}

fn read_table<R: Read>(mut rdr: csv::Reader<R>) -> BTallyResult<Table> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_table: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if line.iter().all(|s| s.trim().is_empty()) {
            debug!("read_table: skipping empty line {}", lineno);
            continue;
        }
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    debug!("read_table: {} rows", rows.len());
    Ok(Table { header, rows })
}
