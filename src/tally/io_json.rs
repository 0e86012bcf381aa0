// The results file used as a local fallback.

use std::fs;

use log::{debug, info};
use seat_tally::builder::normalize_party_row;
use seat_tally::{PartyListEntry, RawRow};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::ResultExt;

use crate::tally::*;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JsonCandidate {
    pub region: Option<JSValue>,
    pub province: Option<JSValue>,
    pub district: Option<JSValue>,
    pub name: Option<JSValue>,
    pub party: Option<JSValue>,
    pub votes: Option<JSValue>,
    pub counted: Option<JSValue>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct JsonPartyListEntry {
    pub party: Option<JSValue>,
    pub votes: Option<JSValue>,
    pub seats: Option<JSValue>,
    pub color: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsFile {
    #[serde(default)]
    pub candidates: Vec<JsonCandidate>,
    #[serde(rename = "partyList", default)]
    pub party_list: Vec<JsonPartyListEntry>,
}

// Numbers and strings are both accepted; anything else is treated as missing.
fn js_text(x: &Option<JSValue>) -> Option<String> {
    match x {
        Some(JSValue::String(s)) => Some(s.clone()),
        Some(JSValue::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub fn read_results_file(path: &str) -> BTallyResult<LoadedData> {
    info!("Attempting to read results file {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    parse_results(&contents)
}

pub fn parse_results(contents: &str) -> BTallyResult<LoadedData> {
    let results: ResultsFile = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    debug!(
        "parse_results: {} candidates, {} party-list rows",
        results.candidates.len(),
        results.party_list.len()
    );

    let rows: Vec<RawRow> = results
        .candidates
        .iter()
        .map(|c| RawRow {
            region: js_text(&c.region),
            province: js_text(&c.province),
            district: js_text(&c.district),
            name: js_text(&c.name),
            party: js_text(&c.party),
            votes: js_text(&c.votes),
            counted: js_text(&c.counted),
        })
        .collect();

    let party_list: Vec<PartyListEntry> = results
        .party_list
        .iter()
        .filter_map(|p| {
            let entry = normalize_party_row(
                &js_text(&p.party).unwrap_or_default(),
                &js_text(&p.votes).unwrap_or_default(),
                &js_text(&p.seats).unwrap_or_default(),
            )?;
            Some(PartyListEntry {
                color: p.color.clone(),
                ..entry
            })
        })
        .collect();

    Ok(LoadedData { rows, party_list })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_or_strings() {
        let data = parse_results(
            r##"{
              "candidates": [
                {"province": "น่าน", "district": 1, "party": "X", "votes": "120"},
                {"province": "น่าน", "district": "2", "party": "Y", "votes": 80, "counted": "3/9"}
              ],
              "partyList": [
                {"party": "X", "votes": 1000, "seats": 2, "color": "#101010"},
                {"party": "", "seats": 4}
              ]
            }"##,
        )
        .unwrap();
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0].district.as_deref(), Some("1"));
        assert_eq!(data.rows[0].votes.as_deref(), Some("120"));
        assert_eq!(data.rows[1].counted.as_deref(), Some("3/9"));
        assert_eq!(data.party_list.len(), 1);
        assert_eq!(data.party_list[0].seats, 2);
        assert_eq!(data.party_list[0].color.as_deref(), Some("#101010"));
    }

    #[test]
    fn missing_sections() {
        let data = parse_results("{}").unwrap();
        assert!(data.rows.is_empty());
        assert!(data.party_list.is_empty());
    }

    #[test]
    fn broken_json() {
        assert!(parse_results("{\"candidates\": [").is_err());
    }
}
