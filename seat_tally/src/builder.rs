pub use crate::config::*;
use crate::election::Election;

use log::debug;

/// A builder for collecting district rows and party-list rows.
///
/// Rows that cannot be used (no province, no valid district number) are
/// dropped silently, so that the aggregation only sees well-formed records.
///
/// ```
/// pub use seat_tally::builder::Builder;
/// pub use seat_tally::TallyRules;
/// # use seat_tally::TallyErrors;
///
/// let mut builder = Builder::new(&TallyRules::default())?;
///
/// builder.add_row_simple(&["เหนือ", "เชียงใหม่", "1", "Anna", "Green", "1200", ""]);
/// builder.add_row_simple(&["เหนือ", "", "1", "Bob", "Blue", "800", ""]);
/// builder.add_party_row("Green", "150000", "3");
///
/// let election = builder.build()?;
/// assert_eq!(election.records().len(), 1);
/// assert_eq!(election.parties()[0].total_seats, 4);
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TallyRules,
    pub(crate) _records: Vec<RawRecord>,
    pub(crate) _party_list: Vec<PartyListEntry>,
    pub(crate) _dropped: usize,
}

impl Builder {
    pub fn new(rules: &TallyRules) -> Result<Builder, TallyErrors> {
        if rules.palette.is_empty() {
            return Err(TallyErrors::EmptyPalette);
        }
        Ok(Builder {
            _rules: rules.clone(),
            _records: Vec::new(),
            _party_list: Vec::new(),
            _dropped: 0,
        })
    }

    /// Adds a row given as text cells, in the order:
    /// region, province, district, name, party, votes, counted.
    ///
    /// Returns true if the row was kept.
    pub fn add_row_simple(&mut self, cells: &[&str; 7]) -> bool {
        let [region, province, district, name, party, votes, counted] = cells;
        self.add_row(&RawRow {
            region: Some(region.to_string()),
            province: Some(province.to_string()),
            district: Some(district.to_string()),
            name: Some(name.to_string()),
            party: Some(party.to_string()),
            votes: Some(votes.to_string()),
            counted: Some(counted.to_string()),
        })
    }

    /// Adds a loosely typed row. Returns true if the row was kept.
    pub fn add_row(&mut self, row: &RawRow) -> bool {
        match normalize_row(row) {
            Some(r) => {
                self._records.push(r);
                true
            }
            None => {
                debug!("add_row: dropping row {:?}", row);
                self._dropped += 1;
                false
            }
        }
    }

    /// Adds a record that is already normalized.
    pub fn add_record(&mut self, record: RawRecord) {
        self._records.push(record);
    }

    /// Adds a party-list row given as text. Rows without a party name are dropped.
    pub fn add_party_row(&mut self, party: &str, votes: &str, seats: &str) -> bool {
        match normalize_party_row(party, votes, seats) {
            Some(entry) => {
                self._party_list.push(entry);
                true
            }
            None => {
                debug!("add_party_row: dropping row without a party name");
                self._dropped += 1;
                false
            }
        }
    }

    pub fn add_party_entry(&mut self, entry: PartyListEntry) {
        self._party_list.push(entry);
    }

    /// The number of rows that were rejected so far.
    pub fn dropped(&self) -> usize {
        self._dropped
    }

    pub fn build(self) -> Result<Election, TallyErrors> {
        Election::new(&self._rules, self._records, self._party_list)
    }
}

fn clean(s: &Option<String>) -> String {
    s.as_deref().unwrap_or("").trim().to_string()
}

/// Turns a loosely typed row into a record.
///
/// Returns None when the province is empty or when the district is not a
/// positive integer.
pub fn normalize_row(row: &RawRow) -> Option<RawRecord> {
    let province = clean(&row.province);
    if province.is_empty() {
        return None;
    }
    let district = parse_district(&clean(&row.district))?;
    Some(RawRecord {
        region: clean(&row.region),
        province,
        district,
        name: clean(&row.name),
        party: clean(&row.party),
        votes: parse_count(&clean(&row.votes)),
        counted: clean(&row.counted),
    })
}

pub fn normalize_party_row(party: &str, votes: &str, seats: &str) -> Option<PartyListEntry> {
    let party = party.trim();
    if party.is_empty() {
        return None;
    }
    Some(PartyListEntry {
        party: party.to_string(),
        votes: parse_count(votes),
        seats: parse_seats(seats),
        color: None,
    })
}

/// Parses a district number. Accepts plain digits and integral floats ("3.0").
pub fn parse_district(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(x) = s.parse::<u32>() {
        return if x > 0 { Some(x) } else { None };
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 1.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
            Some(f as u32)
        }
        _ => None,
    }
}

/// Parses a non-negative count. Anything that cannot be read as one is 0.
///
/// Thousands separators are accepted ("12,345"), and finite non-negative
/// floats are truncated.
pub fn parse_count(s: &str) -> u64 {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if let Ok(x) = cleaned.parse::<u64>() {
        return x;
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => f as u64,
        _ => 0,
    }
}

pub fn parse_seats(s: &str) -> u32 {
    u32::try_from(parse_count(s)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(province: &str, district: &str, votes: &str) -> RawRow {
        RawRow {
            province: Some(province.to_string()),
            district: Some(district.to_string()),
            votes: Some(votes.to_string()),
            ..RawRow::default()
        }
    }

    #[test]
    fn rows_are_trimmed() {
        let r = normalize_row(&RawRow {
            region: Some("  ใต้ ".to_string()),
            province: Some(" สงขลา".to_string()),
            district: Some(" 2 ".to_string()),
            name: Some("Anna ".to_string()),
            party: Some(" Green".to_string()),
            votes: Some(" 10 ".to_string()),
            counted: None,
        })
        .unwrap();
        assert_eq!(r.region, "ใต้");
        assert_eq!(r.province, "สงขลา");
        assert_eq!(r.district, 2);
        assert_eq!(r.name, "Anna");
        assert_eq!(r.party, "Green");
        assert_eq!(r.votes, 10);
        assert_eq!(r.counted, "");
    }

    #[test]
    fn invalid_rows_are_dropped() {
        assert_eq!(normalize_row(&row("", "1", "10")), None);
        assert_eq!(normalize_row(&row("   ", "1", "10")), None);
        assert_eq!(normalize_row(&row("A", "x", "10")), None);
        assert_eq!(normalize_row(&row("A", "", "10")), None);
        assert_eq!(normalize_row(&row("A", "0", "10")), None);
        assert_eq!(normalize_row(&row("A", "1.5", "10")), None);
        assert_eq!(normalize_row(&RawRow::default()), None);
    }

    #[test]
    fn bad_votes_default_to_zero() {
        assert_eq!(normalize_row(&row("A", "1", "abc")).unwrap().votes, 0);
        assert_eq!(normalize_row(&row("A", "1", "")).unwrap().votes, 0);
        assert_eq!(normalize_row(&row("A", "1", "-4")).unwrap().votes, 0);
    }

    #[test]
    fn counts() {
        assert_eq!(parse_count("12,345"), 12345);
        assert_eq!(parse_count("7.9"), 7);
        assert_eq!(parse_count("NaN"), 0);
        assert_eq!(parse_district("3.0"), Some(3));
        assert_eq!(parse_seats("99999999999"), 0);
    }

    #[test]
    fn builder_counts_dropped_rows() {
        let mut b = Builder::new(&TallyRules::default()).unwrap();
        assert!(b.add_row_simple(&["", "A", "1", "n", "X", "10", "1/2"]));
        assert!(!b.add_row_simple(&["", "A", "", "n", "X", "10", ""]));
        assert!(!b.add_party_row(" ", "1", "1"));
        assert!(b.add_party_row("X", "oops", "2"));
        assert_eq!(b.dropped(), 2);
        let e = b.build().unwrap();
        assert_eq!(e.party_list()[0].votes, 0);
        assert_eq!(e.party_list()[0].seats, 2);
    }

    #[test]
    fn empty_palette() {
        let rules = TallyRules {
            palette: vec![],
            ..TallyRules::default()
        };
        assert!(Builder::new(&rules).is_err());
    }
}
