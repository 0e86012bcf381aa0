mod config;
use log::{debug, info};

use std::collections::HashMap;

pub use crate::colors::{ColorResolver, ColorStrategy};
pub use crate::config::*;
pub use crate::election::Election;
pub use crate::views::*;

pub mod builder;
pub mod colors;
mod election;
pub mod manual;
mod views;

// **** Private structures ****

// A party as it is being accumulated, before its final color is known.
#[derive(Eq, PartialEq, Debug, Clone)]
struct PartyTally {
    name: String,
    color: Option<String>,
    district_seats: u32,
    list_seats: u32,
    party_list_votes: u64,
}

impl PartyTally {
    fn new(name: &str, resolver: &ColorResolver) -> PartyTally {
        PartyTally {
            name: name.to_string(),
            color: resolver.known_color(name).map(|s| s.to_string()),
            district_seats: 0,
            list_seats: 0,
            party_list_votes: 0,
        }
    }
}

/// Finds the leading record of every district.
///
/// Records are grouped by (province, district). Inside a group, a record only
/// replaces the current leader if it has strictly more votes, so the first
/// record seen keeps the district on a tie. Districts whose leader has no
/// votes yet are left out.
///
/// The winners come out in the order in which their district first appears.
pub fn compute_district_winners(records: &[RawRecord]) -> Vec<DistrictWinner> {
    let mut positions: HashMap<(&str, u32), usize> = HashMap::new();
    let mut leaders: Vec<&RawRecord> = Vec::new();
    for r in records.iter() {
        let key = (r.province.as_str(), r.district);
        match positions.get(&key) {
            Some(&pos) => {
                if r.votes > leaders[pos].votes {
                    leaders[pos] = r;
                }
            }
            None => {
                positions.insert(key, leaders.len());
                leaders.push(r);
            }
        }
    }
    let num_districts = leaders.len();
    let winners: Vec<DistrictWinner> = leaders
        .into_iter()
        .filter(|r| r.votes > 0)
        .cloned()
        .map(DistrictWinner::from)
        .collect();
    debug!(
        "compute_district_winners: {} records, {} districts, {} with votes",
        records.len(),
        num_districts,
        winners.len()
    );
    winners
}

/// Builds the seat summary of every party, with the default color rules.
pub fn build_party_summary(
    winners: &[DistrictWinner],
    party_list: &[PartyListEntry],
) -> Vec<PartySummary> {
    build_party_summary_with(winners, party_list, &ColorResolver::default())
}

/// Builds the seat summary of every party.
///
/// Parties appear in the order in which they are first met: first through
/// the district winners, then through the party list. The output only depends
/// on the content and the order of the inputs.
pub fn build_party_summary_with(
    winners: &[DistrictWinner],
    party_list: &[PartyListEntry],
    resolver: &ColorResolver,
) -> Vec<PartySummary> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<PartyTally> = Vec::new();

    for w in winners.iter() {
        let pos = *positions.entry(w.party.clone()).or_insert_with(|| {
            tallies.push(PartyTally::new(&w.party, resolver));
            tallies.len() - 1
        });
        tallies[pos].district_seats += 1;
    }

    for (idx, entry) in party_list.iter().enumerate() {
        let pos = *positions.entry(entry.party.clone()).or_insert_with(|| {
            tallies.push(PartyTally::new(&entry.party, resolver));
            tallies.len() - 1
        });
        let t = &mut tallies[pos];
        t.party_list_votes = entry.votes;
        t.list_seats = entry.seats;
        t.color = Some(resolver.resolve(&entry.party, entry.color.as_deref(), idx));
    }

    let res: Vec<PartySummary> = tallies
        .into_iter()
        .enumerate()
        .map(|(idx, t)| PartySummary {
            id: party_id(&t.name),
            color: resolver.resolve(&t.name, t.color.as_deref(), idx),
            total_seats: t.district_seats.saturating_add(t.list_seats),
            name: t.name,
            district_seats: t.district_seats,
            list_seats: t.list_seats,
            party_list_votes: t.party_list_votes,
        })
        .collect();

    for p in res.iter() {
        info!(
            "{:>6} {} ({} district, {} list)",
            p.total_seats, p.name, p.district_seats, p.list_seats
        );
    }
    res
}

/// A stable identifier for a party: the lowercase name, with every run of
/// whitespace replaced by a dash.
pub fn party_id(name: &str) -> String {
    let mut res = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                res.push('-');
            }
            in_space = true;
        } else {
            res.extend(c.to_lowercase());
            in_space = false;
        }
    }
    res
}
