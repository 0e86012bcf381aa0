// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One row of district ballot data, after normalization.
///
/// Rows that reach this type always have a non-empty province and a
/// positive district number. Use the [`crate::builder::Builder`] to obtain
/// them from loosely typed input.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRecord {
    pub region: String,
    pub province: String,
    pub district: u32,
    pub name: String,
    pub party: String,
    pub votes: u64,
    /// Progress of the count, for example `4/20`. May be empty.
    pub counted: String,
}

/// A row as it comes out of a spreadsheet: every field is optional text.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RawRow {
    pub region: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub name: Option<String>,
    pub party: Option<String>,
    pub votes: Option<String>,
    pub counted: Option<String>,
}

/// The party-list allocation reported for one party.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyListEntry {
    pub party: String,
    pub votes: u64,
    pub seats: u32,
    /// A color attached to the row itself (manually added rows carry one).
    pub color: Option<String>,
}

// ******** Output data structures *********

/// The leading candidate of a district.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DistrictWinner {
    pub region: String,
    pub province: String,
    pub district: u32,
    pub name: String,
    pub party: String,
    pub votes: u64,
    pub counted: String,
}

impl From<RawRecord> for DistrictWinner {
    fn from(r: RawRecord) -> DistrictWinner {
        DistrictWinner {
            region: r.region,
            province: r.province,
            district: r.district,
            name: r.name,
            party: r.party,
            votes: r.votes,
            counted: r.counted,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartySummary {
    pub id: String,
    pub name: String,
    pub color: String,
    pub district_seats: u32,
    pub list_seats: u32,
    pub party_list_votes: u64,
    pub total_seats: u32,
}

impl PartySummary {
    /// The number of seats shown in rankings.
    pub fn display_total(&self, include_party_list: bool) -> u32 {
        if include_party_list {
            self.total_seats
        } else {
            self.district_seats
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProvinceSummary {
    pub region: String,
    pub province: String,
    /// Number of distinct districts with at least one row.
    pub districts: u32,
}

/// The best placed candidates of a single district.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DistrictTop {
    pub province: String,
    pub district: u32,
    pub candidates: Vec<RawRecord>,
    /// The most advanced progress label found in the district, if any.
    pub counted: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CoalitionScore {
    pub parties: Vec<PartySummary>,
    pub total_seats: u32,
    pub has_majority: bool,
    /// Seats still missing to reach the majority (0 once reached).
    pub shortfall: u32,
}

/// Errors raised when configuring or editing an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    /// The palette must hold at least one color.
    EmptyPalette,
    /// An edit referred to a row that does not exist.
    UnknownRecord(usize),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::EmptyPalette => write!(f, "TallyError: the color palette is empty"),
            TallyErrors::UnknownRecord(idx) => {
                write!(f, "TallyError: no record at position {}", idx)
            }
        }
    }
}

// ********* Configuration **********

/// The region used when a record does not name one.
pub const DEFAULT_REGION: &str = "กลาง";

/// Seats needed to form a government in a 500 seat house.
pub const DEFAULT_MAJORITY: u32 = 250;

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyRules {
    /// Fallback colors, picked by position.
    pub palette: Vec<String>,
    /// Party colors that take precedence over the built-in table.
    pub party_colors: Vec<(String, String)>,
    pub majority_threshold: u32,
    /// If false, rankings only count district seats.
    pub include_party_list: bool,
}

impl Default for TallyRules {
    fn default() -> TallyRules {
        TallyRules {
            palette: crate::colors::PALETTE.iter().map(|s| s.to_string()).collect(),
            party_colors: Vec::new(),
            majority_threshold: DEFAULT_MAJORITY,
            include_party_list: true,
        }
    }
}
