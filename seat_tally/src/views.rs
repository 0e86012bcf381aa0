// Derived views over the records and the party summaries.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::config::*;

/// The number of distinct (province, district) pairs.
pub fn total_districts(records: &[RawRecord]) -> usize {
    records
        .iter()
        .map(|r| (r.province.as_str(), r.district))
        .collect::<HashSet<(&str, u32)>>()
        .len()
}

/// The highest district number seen in each province, in order of first appearance.
pub fn province_district_totals(records: &[RawRecord]) -> Vec<(String, u32)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut res: Vec<(String, u32)> = Vec::new();
    for r in records.iter() {
        match positions.get(r.province.as_str()) {
            Some(&pos) => {
                if r.district > res[pos].1 {
                    res[pos].1 = r.district;
                }
            }
            None => {
                positions.insert(r.province.as_str(), res.len());
                res.push((r.province.clone(), r.district));
            }
        }
    }
    res
}

/// Groups the provinces by region. Records without a region go to the default one.
pub fn provinces_by_region(records: &[RawRecord]) -> Vec<(String, Vec<String>)> {
    let mut res: Vec<(String, Vec<String>)> = Vec::new();
    for r in records.iter() {
        let region = region_or_default(&r.region);
        let pos = match res.iter().position(|(name, _)| name == region) {
            Some(pos) => pos,
            None => {
                res.push((region.to_string(), Vec::new()));
                res.len() - 1
            }
        };
        let provinces = &mut res[pos].1;
        if !provinces.contains(&r.province) {
            provinces.push(r.province.clone());
        }
    }
    res
}

/// One line per province, sorted by province name.
///
/// The region of a province is taken from the first record of each district.
pub fn province_summary(records: &[RawRecord]) -> Vec<ProvinceSummary> {
    let mut seen: HashSet<(&str, u32)> = HashSet::new();
    let mut by_province: HashMap<&str, ProvinceSummary> = HashMap::new();
    for r in records.iter() {
        if !seen.insert((r.province.as_str(), r.district)) {
            continue;
        }
        let s = by_province
            .entry(r.province.as_str())
            .or_insert_with(|| ProvinceSummary {
                region: region_or_default(&r.region).to_string(),
                province: r.province.clone(),
                districts: 0,
            });
        s.districts += 1;
    }
    let mut res: Vec<ProvinceSummary> = by_province.into_values().collect();
    res.sort_by(|a, b| a.province.cmp(&b.province));
    res
}

fn region_or_default(region: &str) -> &str {
    if region.is_empty() {
        DEFAULT_REGION
    } else {
        region
    }
}

/// The `num` best placed candidates of a district, with the progress of the count.
pub fn district_top(
    records: &[RawRecord],
    province: &str,
    district: u32,
    num: usize,
) -> DistrictTop {
    let mut candidates: Vec<RawRecord> = records
        .iter()
        .filter(|r| r.province == province && r.district == district)
        .cloned()
        .collect();
    // Stable: candidates with the same votes keep their input order.
    candidates.sort_by(|a, b| b.votes.cmp(&a.votes));

    let mut counted: Option<String> = None;
    for c in candidates.iter() {
        let label = c.counted.trim();
        if label.is_empty() {
            continue;
        }
        counted = match counted {
            None => Some(label.to_string()),
            Some(cur) => match (leading_number(&cur), leading_number(label)) {
                (Some(x), Some(y)) if y > x => Some(label.to_string()),
                _ => Some(cur),
            },
        };
    }

    candidates.truncate(num);
    debug!(
        "district_top: {} {}: {} candidates, counted {:?}",
        province,
        district,
        candidates.len(),
        counted
    );
    DistrictTop {
        province: province.to_string(),
        district,
        candidates,
        counted,
    }
}

// The first run of digits in a label: "4/20" -> 4.
fn leading_number(s: &str) -> Option<u64> {
    let digits: String = s
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u64>().ok()
}

/// The districts won by a party, sorted by province then district.
pub fn party_winners(winners: &[DistrictWinner], party: &str) -> Vec<DistrictWinner> {
    let mut res: Vec<DistrictWinner> = winners.iter().filter(|w| w.party == party).cloned().collect();
    res.sort_by(|a, b| {
        a.province
            .cmp(&b.province)
            .then_with(|| a.district.cmp(&b.district))
    });
    res
}

/// Parties by decreasing number of seats. Ties keep the summary order.
pub fn seat_ranking(parties: &[PartySummary], include_party_list: bool) -> Vec<PartySummary> {
    let mut res = parties.to_vec();
    res.sort_by(|a, b| {
        b.display_total(include_party_list)
            .cmp(&a.display_total(include_party_list))
    });
    res
}

/// Parties by decreasing number of party-list seats.
pub fn list_seat_ranking(parties: &[PartySummary]) -> Vec<PartySummary> {
    let mut res = parties.to_vec();
    res.sort_by(|a, b| b.list_seats.cmp(&a.list_seats));
    res
}

/// The distinct provinces and parties among the winners, in order of first appearance.
pub fn winner_filters(winners: &[DistrictWinner]) -> (Vec<String>, Vec<String>) {
    let mut provinces: Vec<String> = Vec::new();
    let mut parties: Vec<String> = Vec::new();
    for w in winners.iter() {
        if !provinces.contains(&w.province) {
            provinces.push(w.province.clone());
        }
        if !parties.contains(&w.party) {
            parties.push(w.party.clone());
        }
    }
    (provinces, parties)
}

/// Scores a coalition made of the parties whose id is in `selected_ids`.
///
/// Unknown ids are ignored.
pub fn coalition(parties: &[PartySummary], selected_ids: &[String], majority: u32) -> CoalitionScore {
    let mut members: Vec<PartySummary> = parties
        .iter()
        .filter(|p| selected_ids.contains(&p.id))
        .cloned()
        .collect();
    members.sort_by(|a, b| b.total_seats.cmp(&a.total_seats));
    let total_seats = members
        .iter()
        .fold(0, |acc: u32, p| acc.saturating_add(p.total_seats));
    CoalitionScore {
        parties: members,
        total_seats,
        has_majority: total_seats >= majority,
        shortfall: majority.saturating_sub(total_seats),
    }
}
