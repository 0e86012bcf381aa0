use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::{OptionExt, ResultExt};

use crate::tally::{io_common::Table, *};

/// Reads a worksheet of an Excel file as a table of text cells.
///
/// If no worksheet name is given, the workbook must hold a single worksheet.
pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> BTallyResult<Table> {
    let wrange = get_range(path, worksheet_name)?;
    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(cell_text)
        .collect();
    debug!("read_xlsx_table: header: {:?}", header);

    let rows: Vec<Vec<String>> = iter
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>())
        .filter(|row| row.iter().any(|s| !s.trim().is_empty()))
        .collect();
    debug!("read_xlsx_table: {} rows", rows.len());
    Ok(Table { header, rows })
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        // Spreadsheets store every number as a float.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => "".to_string(),
        _ => {
            debug!("cell_text: ignoring cell {:?}", cell);
            "".to_string()
        }
    }
}

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> BTallyResult<calamine::Range<DataType>> {
    debug!(
        "read_xlsx_table: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(TallyError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_xlsx_table: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => Err(Box::new(TallyError::AmbiguousWorksheet {
                path: path.to_string(),
                worksheets: all_worksheets.iter().map(|(n, _)| n.clone()).collect(),
            })),
        }
    }
}
