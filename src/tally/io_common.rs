// Shared primitives for turning a table of text cells into rows.

use std::collections::HashMap;

use log::{debug, warn};
use seat_tally::builder::normalize_party_row;
use seat_tally::{PartyListEntry, RawRow};

/// A table read from any source: the header, then the data rows.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Maps a header of the district sheet to a field name.
/// Unknown headers are returned cleaned up.
pub fn normalize_header(header: &str) -> String {
    let clean = header.trim().to_lowercase();
    let field = match clean.as_str() {
        "ภาค" | "region" => "region",
        "จังหวัด" | "province" => "province",
        "เขต" | "district" => "district",
        "ชื่อ" | "candidate" => "name",
        "พรรค 2569" | "party" => "party",
        "คะแนน" | "votes" => "votes",
        "นับคะแนนแล้ว" | "counted" => "counted",
        _ => return clean,
    };
    field.to_string()
}

/// Maps a header of the party-list sheet to a field name.
pub fn normalize_party_list_header(header: &str) -> String {
    let clean = header.trim().to_lowercase();
    let field = match clean.as_str() {
        "พรรค" | "ชื่อพรรค" | "party" => "party",
        "คะแนน" | "votes" => "votes",
        "ที่นั่ง"
        | "จำนวนที่นั่ง"
        | "ส.ส."
        | "สส"
        | "ส.ส. บัญชีรายชื่อ"
        | "สส บัญชีรายชื่อ"
        | "ส.ส.บัญชีรายชื่อ"
        | "สสบัญชีรายชื่อ"
        | "บัญชีรายชื่อ"
        | "seats"
        | "จำนวน"
        | "จำนวน สส บัญชีรายชื่อ"
        | "จำนวน ส.ส. บัญชีรายชื่อ"
        | "จำนวน ส.ส.บัญชีรายชื่อ"
        | "จำนวนสสบัญชีรายชื่อ" => "seats",
        _ => return clean,
    };
    field.to_string()
}

// Spreadsheet exports sometimes start with a byte order mark.
fn strip_bom(s: &str) -> &str {
    s.trim_start_matches('\u{feff}')
}

fn field_positions(header: &[String], normalize: fn(&str) -> String) -> HashMap<String, usize> {
    let mut res: HashMap<String, usize> = HashMap::new();
    for (idx, h) in header.iter().enumerate() {
        // The first column wins when two headers map to the same field.
        res.entry(normalize(strip_bom(h))).or_insert(idx);
    }
    res
}

fn cell(row: &[String], positions: &HashMap<String, usize>, field: &str) -> Option<String> {
    positions
        .get(field)
        .map(|idx| row.get(*idx).map(|s| s.trim().to_string()).unwrap_or_default())
}

/// Reads the district rows of a table. The rows are not validated yet.
pub fn district_rows(table: &Table) -> Vec<RawRow> {
    let positions = field_positions(&table.header, normalize_header);
    debug!("district_rows: header {:?} -> {:?}", table.header, positions);
    for required in ["province", "district"] {
        if !positions.contains_key(required) {
            warn!(
                "district_rows: no {} column in header {:?}, every row will be dropped",
                required, table.header
            );
        }
    }
    table
        .rows
        .iter()
        .map(|row| RawRow {
            region: cell(row, &positions, "region"),
            province: cell(row, &positions, "province"),
            district: cell(row, &positions, "district"),
            name: cell(row, &positions, "name"),
            party: cell(row, &positions, "party"),
            votes: cell(row, &positions, "votes"),
            counted: cell(row, &positions, "counted"),
        })
        .collect()
}

/// Reads the party-list entries of a table. Rows without a party name are dropped.
pub fn party_list_entries(table: &Table) -> Vec<PartyListEntry> {
    let positions = field_positions(&table.header, normalize_party_list_header);
    debug!(
        "party_list_entries: header {:?} -> {:?}",
        table.header, positions
    );
    if !positions.contains_key("party") {
        warn!(
            "party_list_entries: no party column in header {:?}",
            table.header
        );
    }
    table
        .rows
        .iter()
        .filter_map(|row| {
            normalize_party_row(
                &cell(row, &positions, "party").unwrap_or_default(),
                &cell(row, &positions, "votes").unwrap_or_default(),
                &cell(row, &positions, "seats").unwrap_or_default(),
            )
        })
        .collect()
}
