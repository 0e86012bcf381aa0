// Downloads the CSV export of a shared Google spreadsheet.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info};
use seat_tally::builder::normalize_row;
use snafu::ResultExt;

use crate::tally::{
    io_common::{district_rows, party_list_entries},
    io_csv::parse_csv_table,
    *,
};

pub const DEFAULT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The export link of one sheet. The timestamp defeats intermediate caches.
pub fn sheet_url(base_url: &str, sheet_id: &str, gid: &str, timestamp: u128) -> String {
    format!(
        "{}/{}/export?format=csv&gid={}&_t={}",
        base_url.trim_end_matches('/'),
        sheet_id,
        gid,
        timestamp
    )
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn fetch_text(client: &reqwest::blocking::Client, url: &str) -> BTallyResult<String> {
    info!("Downloading {}", url);
    let text = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .context(FetchingSnafu { url })?;
    debug!("fetch_text: {} bytes from {}", text.len(), url);
    Ok(text)
}

/// Reads the CSV export of the district sheet.
///
/// A sheet without any usable row (no province column, no valid district
/// number...) is an error, so that the caller can fall back to local data.
pub fn parse_district_sheet(text: &str, url: &str) -> BTallyResult<Vec<RawRow>> {
    let rows = district_rows(&parse_csv_table(text)?);
    let valid = rows.iter().filter(|r| normalize_row(r).is_some()).count();
    if valid == 0 {
        return Err(Box::new(TallyError::EmptySheet {
            url: url.to_string(),
        }));
    }
    info!("Downloaded {} district rows, {} usable", rows.len(), valid);
    Ok(rows)
}

/// Downloads the district sheet and, if configured, the party-list sheet.
pub fn fetch_google_sheet(sheet: &GoogleSheet) -> BTallyResult<LoadedData> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context(FetchingSnafu {
            url: sheet.base_url(),
        })?;
    let timestamp = now_millis();

    let district_url = sheet_url(
        sheet.base_url(),
        &sheet.sheet_id,
        sheet.district_gid(),
        timestamp,
    );
    let rows = parse_district_sheet(&fetch_text(&client, &district_url)?, &district_url)?;

    let party_list = match &sheet.party_list_gid {
        Some(gid) => {
            let url = sheet_url(sheet.base_url(), &sheet.sheet_id, gid, timestamp);
            let entries = party_list_entries(&parse_csv_table(&fetch_text(&client, &url)?)?);
            let seats = entries
                .iter()
                .fold(0, |acc: u32, e| acc.saturating_add(e.seats));
            info!(
                "Downloaded {} party-list rows, {} seats",
                entries.len(),
                seats
            );
            entries
        }
        None => Vec::new(),
    };

    Ok(LoadedData { rows, party_list })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_sheet_needs_usable_rows() {
        let url = "http://localhost/abc/export?format=csv&gid=0";
        // Unknown headers: the single row cannot be placed.
        let res = parse_district_sheet("Province Name,Dist,party,votes\nA,1,X,10", url);
        assert!(matches!(
            res.map_err(|e| *e),
            Err(TallyError::EmptySheet { .. })
        ));
        assert!(parse_district_sheet("province,district,party,votes\n,1,X,10", url).is_err());
        assert!(parse_district_sheet("", url).is_err());

        let rows = parse_district_sheet(
            "province,district,party,votes\nA,1,X,10\n,2,Y,5",
            url,
        )
        .unwrap();
        // Invalid rows are kept here; the builder drops them later.
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn export_url() {
        assert_eq!(
            sheet_url(DEFAULT_BASE_URL, "abc", "42", 1700000000000),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=42&_t=1700000000000"
        );
        assert_eq!(
            sheet_url("http://localhost:8000/", "abc", "0", 1),
            "http://localhost:8000/abc/export?format=csv&gid=0&_t=1"
        );
    }
}
