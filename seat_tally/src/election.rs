use log::debug;

use crate::builder::{normalize_row, parse_seats};
use crate::colors::ColorResolver;
use crate::config::*;
use crate::views;
use crate::{build_party_summary_with, compute_district_winners};

/// The name given to party-list rows added by hand.
pub const NEW_PARTY_NAME: &str = "พรรคใหม่";

/// The current state of an election: the input collections and everything
/// derived from them.
///
/// The inputs are only ever replaced. Every change recomputes the winners and
/// the party summaries from scratch.
#[derive(Debug, Clone)]
pub struct Election {
    rules: TallyRules,
    resolver: ColorResolver,
    records: Vec<RawRecord>,
    party_list: Vec<PartyListEntry>,
    winners: Vec<DistrictWinner>,
    parties: Vec<PartySummary>,
}

impl Election {
    pub fn new(
        rules: &TallyRules,
        records: Vec<RawRecord>,
        party_list: Vec<PartyListEntry>,
    ) -> Result<Election, TallyErrors> {
        let mut e = Election {
            rules: rules.clone(),
            resolver: ColorResolver::new(rules)?,
            records,
            party_list,
            winners: Vec::new(),
            parties: Vec::new(),
        };
        e.recalculate();
        Ok(e)
    }

    fn recalculate(&mut self) {
        self.winners = compute_district_winners(&self.records);
        self.parties = build_party_summary_with(&self.winners, &self.party_list, &self.resolver);
        debug!(
            "recalculate: {} records, {} winners, {} parties",
            self.records.len(),
            self.winners.len(),
            self.parties.len()
        );
    }

    pub fn rules(&self) -> &TallyRules {
        &self.rules
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn party_list(&self) -> &[PartyListEntry] {
        &self.party_list
    }

    pub fn winners(&self) -> &[DistrictWinner] {
        &self.winners
    }

    pub fn parties(&self) -> &[PartySummary] {
        &self.parties
    }

    pub fn set_records(&mut self, records: Vec<RawRecord>) {
        self.records = records;
        self.recalculate();
    }

    pub fn set_party_list(&mut self, party_list: Vec<PartyListEntry>) {
        self.party_list = party_list;
        self.recalculate();
    }

    /// Replaces one record with an edited row.
    ///
    /// If the edited row is not valid, the previous record is kept. Returns
    /// true if the record was replaced.
    pub fn edit_record(&mut self, idx: usize, row: &RawRow) -> Result<bool, TallyErrors> {
        if idx >= self.records.len() {
            return Err(TallyErrors::UnknownRecord(idx));
        }
        let replaced = match normalize_row(row) {
            Some(r) => {
                self.records[idx] = r;
                true
            }
            None => false,
        };
        self.recalculate();
        Ok(replaced)
    }

    /// Edits the name and the seats of a party-list row. The votes are reset
    /// and the color of the row is kept.
    pub fn edit_party_row(&mut self, idx: usize, party: &str, seats: &str) -> Result<(), TallyErrors> {
        let entry = self
            .party_list
            .get_mut(idx)
            .ok_or(TallyErrors::UnknownRecord(idx))?;
        entry.party = party.trim().to_string();
        entry.votes = 0;
        entry.seats = parse_seats(seats);
        self.recalculate();
        Ok(())
    }

    /// Appends an empty party-list row, colored by its position.
    pub fn add_party_row(&mut self) {
        let color = self.resolver.palette_color(self.party_list.len()).to_string();
        self.party_list.push(PartyListEntry {
            party: NEW_PARTY_NAME.to_string(),
            votes: 0,
            seats: 0,
            color: Some(color),
        });
        self.recalculate();
    }

    pub fn total_districts(&self) -> usize {
        views::total_districts(&self.records)
    }

    pub fn party_list_seats(&self) -> u32 {
        self.party_list
            .iter()
            .fold(0, |acc: u32, p| acc.saturating_add(p.seats))
    }

    /// Parties ranked by the seats shown in the overview.
    pub fn ranking(&self) -> Vec<PartySummary> {
        views::seat_ranking(&self.parties, self.rules.include_party_list)
    }

    pub fn coalition(&self, selected_ids: &[String]) -> CoalitionScore {
        views::coalition(&self.parties, selected_ids, self.rules.majority_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::colors::PALETTE;

    fn election() -> Election {
        let mut b = Builder::new(&TallyRules::default()).unwrap();
        b.add_row_simple(&["", "A", "1", "a1", "X", "100", ""]);
        b.add_row_simple(&["", "A", "1", "a2", "Y", "150", ""]);
        b.add_row_simple(&["", "A", "2", "a3", "X", "0", ""]);
        b.add_party_row("Y", "1000", "5");
        b.add_party_row("Z", "500", "2");
        b.build().unwrap()
    }

    #[test]
    fn derived_state() {
        let e = election();
        assert_eq!(e.winners().len(), 1);
        assert_eq!(e.total_districts(), 2);
        assert_eq!(e.party_list_seats(), 7);
        let ranking = e.ranking();
        let names: Vec<&str> = ranking.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Y", "Z"]);
    }

    #[test]
    fn edits_recompute() {
        let mut e = election();
        let edited = RawRow {
            province: Some("A".to_string()),
            district: Some("2".to_string()),
            party: Some("X".to_string()),
            votes: Some("30".to_string()),
            ..RawRow::default()
        };
        assert_eq!(e.edit_record(2, &edited), Ok(true));
        assert_eq!(e.winners().len(), 2);
        assert_eq!(e.parties()[0].name, "Y");
        assert_eq!(e.parties()[1].name, "X");

        // An invalid edit keeps the row.
        let bad = RawRow::default();
        assert_eq!(e.edit_record(2, &bad), Ok(false));
        assert_eq!(e.records()[2].votes, 30);

        assert_eq!(e.edit_record(9, &bad), Err(TallyErrors::UnknownRecord(9)));
    }

    #[test]
    fn manual_party_rows() {
        let mut e = election();
        e.add_party_row();
        let added = e.party_list().last().unwrap();
        assert_eq!(added.party, NEW_PARTY_NAME);
        assert_eq!(added.color.as_deref(), Some(PALETTE[2]));

        e.edit_party_row(2, " W ", "4").unwrap();
        let w = e.parties().iter().find(|p| p.name == "W").unwrap();
        assert_eq!(w.list_seats, 4);
        assert_eq!(w.color, PALETTE[2]);
        assert_eq!(e.party_list_seats(), 11);
    }

    fn record(province: &str, district: u32, party: &str, votes: u64) -> RawRecord {
        RawRecord {
            region: String::new(),
            province: province.to_string(),
            district,
            name: format!("{}{}", party, district),
            party: party.to_string(),
            votes,
            counted: String::new(),
        }
    }

    #[test]
    fn replaced_records_recompute() {
        let mut e = election();
        e.set_records(vec![
            record("B", 1, "Z", 40),
            record("B", 1, "X", 10),
            record("B", 2, "X", 5),
        ]);
        let winners: Vec<&str> = e.winners().iter().map(|w| w.party.as_str()).collect();
        assert_eq!(winners, vec!["Z", "X"]);
        let totals: Vec<(&str, u32)> = e
            .parties()
            .iter()
            .map(|p| (p.name.as_str(), p.total_seats))
            .collect();
        assert_eq!(totals, vec![("Z", 3), ("X", 1), ("Y", 5)]);

        e.set_records(vec![]);
        assert!(e.winners().is_empty());
        assert_eq!(e.total_districts(), 0);
        let names: Vec<&str> = e.parties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Y", "Z"]);
        assert_eq!(e.parties()[0].district_seats, 0);
    }

    #[test]
    fn party_list_seats_saturate() {
        let mut e = election();
        let huge = PartyListEntry {
            party: "Q".to_string(),
            votes: 0,
            seats: u32::MAX,
            color: None,
        };
        e.set_party_list(vec![huge.clone(), huge]);
        assert_eq!(e.party_list_seats(), u32::MAX);
    }

    #[test]
    fn coalition_uses_rules() {
        let rules = TallyRules {
            majority_threshold: 6,
            include_party_list: false,
            ..TallyRules::default()
        };
        let mut e = election();
        e.set_party_list(vec![]);
        assert_eq!(e.parties().len(), 1);
        let e = Election::new(&rules, e.records().to_vec(), election().party_list().to_vec()).unwrap();
        let c = e.coalition(&["y".to_string()]);
        assert!(c.has_majority);
        let ranked: Vec<String> = e.ranking().into_iter().map(|p| p.id).collect();
        assert_eq!(ranked, vec!["y", "z"]);
    }
}
