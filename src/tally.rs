use log::{debug, info, warn};

use seat_tally::builder::Builder;
use seat_tally::*;
use snafu::prelude::*;

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_json;
pub mod io_sheets;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The path {path} has no parent directory"))]
    MissingParentDir { path: String },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of a CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },

    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no usable worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display(
        "The Excel file {path} has several worksheets, pick one of {worksheets:?}"
    ))]
    AmbiguousWorksheet {
        path: String,
        worksheets: Vec<String>,
    },

    #[snafu(display("Error downloading {url}"))]
    Fetching { source: reqwest::Error, url: String },
    #[snafu(display("The sheet {url} holds no district result"))]
    EmptySheet { url: String },

    #[snafu(display("Unknown input type {input_type:?}, expected csv or xlsx"))]
    UnknownInputType { input_type: String },
    #[snafu(display(
        "No input: provide district results, a results file or a Google sheet id"
    ))]
    MissingInput {},
    #[snafu(display("Invalid rules"))]
    InvalidRules { source: TallyErrors },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type BTallyResult<T> = Result<T, Box<TallyError>>;

/// The rows read from the sources, before any validation.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LoadedData {
    pub rows: Vec<RawRow>,
    pub party_list: Vec<PartyListEntry>,
}

/// Where the data finally came from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DataOrigin {
    GoogleSheet,
    Files,
    Fallback,
    Nothing,
}

/// Combines the configuration file (if any) with the command line flags.
/// The flags win.
pub fn build_config(args: &Args) -> BTallyResult<TallyConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => TallyConfig::default(),
    };

    let provider = args.input_type.clone();
    if let Some(p) = &provider {
        if p != "csv" && p != "xlsx" {
            return Err(Box::new(TallyError::UnknownInputType {
                input_type: p.clone(),
            }));
        }
    }
    let file_source = |path: &String| FileSource {
        provider: provider.clone(),
        file_path: path.clone(),
        excel_worksheet_name: args.excel_worksheet_name.clone(),
    };
    if let Some(path) = &args.districts {
        config.district_source = Some(file_source(path));
    }
    if let Some(path) = &args.party_list {
        config.party_list_source = Some(file_source(path));
    }
    if let Some(path) = &args.results {
        config.fallback_results = Some(path.clone());
    }
    if let Some(sheet_id) = &args.sheet_id {
        let base_url = config.google_sheet.as_ref().and_then(|s| s.base_url.clone());
        config.google_sheet = Some(GoogleSheet {
            sheet_id: sheet_id.clone(),
            district_gid: args.district_gid.clone(),
            party_list_gid: args.party_list_gid.clone(),
            base_url,
        });
    }
    if let Some(out) = &args.out {
        config.output_settings.output_path = Some(out.clone());
    }
    if args.district_only {
        config.rules.include_party_list = Some(false);
    }
    Ok(config)
}

fn read_file_source<T>(
    source: &FileSource,
    convert: fn(&io_common::Table) -> Vec<T>,
) -> BTallyResult<Vec<T>> {
    let path = source.file_path.as_str();
    let table = match source.provider() {
        "csv" => io_csv::read_csv_table(path)?,
        "xlsx" => io_xlsx::read_xlsx_table(path, source.excel_worksheet_name.as_deref())?,
        x => {
            return Err(Box::new(TallyError::UnknownInputType {
                input_type: x.to_string(),
            }))
        }
    };
    Ok(convert(&table))
}

fn read_fallback(config: &TallyConfig) -> BTallyResult<(LoadedData, DataOrigin)> {
    match &config.fallback_results {
        Some(path) => Ok((io_json::read_results_file(path)?, DataOrigin::Fallback)),
        None => {
            warn!("No fallback results configured, continuing without data");
            Ok((LoadedData::default(), DataOrigin::Nothing))
        }
    }
}

/// Loads the rows, in order of preference: the Google sheet, the district
/// files, the fallback results file.
///
/// A failed download is not an error: the fallback file is used instead.
pub fn load_data(config: &TallyConfig) -> BTallyResult<(LoadedData, DataOrigin)> {
    if let Some(sheet) = &config.google_sheet {
        match io_sheets::fetch_google_sheet(sheet) {
            Ok(data) => return Ok((data, DataOrigin::GoogleSheet)),
            Err(e) => {
                warn!("Google Sheets fetch failed, using fallback: {}", e);
                return read_fallback(config);
            }
        }
    }

    if let Some(source) = &config.district_source {
        let rows = read_file_source(source, io_common::district_rows)?;
        let party_list = match &config.party_list_source {
            Some(s) => read_file_source(s, io_common::party_list_entries)?,
            None => Vec::new(),
        };
        return Ok((LoadedData { rows, party_list }, DataOrigin::Files));
    }

    if config.fallback_results.is_some() {
        return read_fallback(config);
    }
    Err(Box::new(TallyError::MissingInput {}))
}

fn winner_to_json(w: &DistrictWinner) -> JSValue {
    json!({
        "region": w.region,
        "province": w.province,
        "district": w.district,
        "name": w.name,
        "party": w.party,
        "votes": w.votes,
        "counted": w.counted,
    })
}

fn party_to_json(p: &PartySummary, winners: &[DistrictWinner]) -> JSValue {
    let won: Vec<JSValue> = party_winners(winners, &p.name)
        .iter()
        .map(|w| json!({"province": w.province, "district": w.district}))
        .collect();
    json!({
        "id": p.id,
        "name": p.name,
        "color": p.color,
        "districtSeats": p.district_seats,
        "listSeats": p.list_seats,
        "partyListVotes": p.party_list_votes,
        "totalSeats": p.total_seats,
        "winners": won,
    })
}

fn regions_to_json(records: &[RawRecord]) -> JSValue {
    let totals = province_district_totals(records);
    let regions: Vec<JSValue> = provinces_by_region(records)
        .iter()
        .map(|(region, provinces)| {
            let provinces: Vec<JSValue> = provinces
                .iter()
                .map(|p| {
                    let districts = totals
                        .iter()
                        .find(|(name, _)| name == p)
                        .map(|(_, n)| *n)
                        .unwrap_or(0);
                    json!({"province": p, "districts": districts})
                })
                .collect();
            json!({"region": region, "provinces": provinces})
        })
        .collect();
    JSValue::Array(regions)
}

// The three best placed candidates of every reported district.
fn districts_to_json(election: &Election) -> JSValue {
    let districts: Vec<JSValue> = election
        .winners()
        .iter()
        .map(|w| {
            let top = district_top(election.records(), &w.province, w.district, 3);
            let candidates: Vec<JSValue> = top
                .candidates
                .iter()
                .map(|c| json!({"name": c.name, "party": c.party, "votes": c.votes}))
                .collect();
            json!({
                "province": top.province,
                "district": top.district,
                "counted": top.counted,
                "candidates": candidates,
            })
        })
        .collect();
    JSValue::Array(districts)
}

fn coalition_to_json(c: &CoalitionScore, majority: u32) -> JSValue {
    let parties: Vec<JSValue> = c.parties.iter().map(|p| json!(p.id)).collect();
    json!({
        "parties": parties,
        "totalSeats": c.total_seats,
        "majorityThreshold": majority,
        "hasMajority": c.has_majority,
        "shortfall": c.shortfall,
    })
}

/// Assembles the summary document of an election.
pub fn build_summary_js(config: &TallyConfig, election: &Election, coalition: &[String]) -> JSValue {
    let ranking = election.ranking();
    let parties: Vec<JSValue> = ranking
        .iter()
        .map(|p| party_to_json(p, election.winners()))
        .collect();
    let party_list: Vec<JSValue> = list_seat_ranking(election.parties())
        .iter()
        .filter(|p| p.list_seats > 0)
        .map(|p| {
            json!({
                "id": p.id,
                "listSeats": p.list_seats,
                "partyListVotes": p.party_list_votes,
            })
        })
        .collect();
    let (filter_provinces, filter_parties) = winner_filters(election.winners());
    let winners: Vec<JSValue> = election.winners().iter().map(winner_to_json).collect();
    let provinces: Vec<JSValue> = province_summary(election.records())
        .iter()
        .map(|p| {
            json!({
                "province": p.province,
                "region": p.region,
                "districts": p.districts,
            })
        })
        .collect();

    let mut res = json!({
        "config": {
            "contest": config.contest_name(),
            "majorityThreshold": election.rules().majority_threshold,
            "includePartyList": election.rules().include_party_list,
        },
        "overview": {
            "countedDistricts": election.winners().len(),
            "totalDistricts": election.total_districts(),
            "partyListSeats": election.party_list_seats(),
        },
        "parties": parties,
        "partyList": party_list,
        "winners": winners,
        "districts": districts_to_json(election),
        "provinces": provinces,
        "regions": regions_to_json(election.records()),
        "filters": {
            "provinces": filter_provinces,
            "parties": filter_parties,
        },
    });
    if !coalition.is_empty() {
        let score = election.coalition(coalition);
        res["coalition"] = coalition_to_json(&score, election.rules().majority_threshold);
    }
    res
}

fn log_overview(election: &Election) {
    info!(
        "{} of {} districts reported, {} party-list seats",
        election.winners().len(),
        election.total_districts(),
        election.party_list_seats()
    );
    for (idx, p) in election.ranking().iter().take(5).enumerate() {
        info!(
            "#{} {}: {} seats ({} district / {} list)",
            idx + 1,
            p.name,
            p.display_total(election.rules().include_party_list),
            p.district_seats,
            p.list_seats
        );
    }
}

fn write_summary(config: &TallyConfig, pretty_js: &str) -> BTallyResult<()> {
    match config.output_settings.output_path.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).context(WritingSummarySnafu { path })?;
                }
            }
            fs::write(path, pretty_js).context(WritingSummarySnafu { path })?;
            info!("Summary written to {}", path);
        }
    }
    Ok(())
}

/// Compares the summary to a reference summary stored in a file.
pub fn check_reference(pretty_js_stats: &str, reference_path: &str) -> BTallyResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return Err(Box::new(TallyError::ReferenceMismatch {}));
    }
    info!("Summary matches the reference {}", reference_path);
    Ok(())
}

/// Tallies the election described by a configuration and returns the summary.
pub fn tally_config(config: &TallyConfig, coalition: &[String]) -> BTallyResult<JSValue> {
    let rules = config.rules.to_rules();
    let (data, origin) = load_data(config)?;
    info!(
        "Loaded {} rows and {} party-list rows from {:?}",
        data.rows.len(),
        data.party_list.len(),
        origin
    );

    let mut builder = Builder::new(&rules).context(InvalidRulesSnafu {})?;
    for row in data.rows.iter() {
        builder.add_row(row);
    }
    for entry in data.party_list {
        builder.add_party_entry(entry);
    }
    if builder.dropped() > 0 {
        info!("Dropped {} invalid rows", builder.dropped());
    }
    let election = builder.build().context(InvalidRulesSnafu {})?;
    log_overview(&election);

    Ok(build_summary_js(config, &election, coalition))
}

pub fn run_tally(args: &Args) -> BTallyResult<()> {
    let config = build_config(args)?;
    info!("config: {:?}", config);

    let coalition = args.coalition.clone().unwrap_or_default();
    let result_js = tally_config(&config, &coalition)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(&config, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference) = &args.reference {
        check_reference(&pretty_js_stats, reference)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn testdata(name: &str) -> String {
        let p: PathBuf = [env!("CARGO_MANIFEST_DIR"), "testdata", name].iter().collect();
        p.display().to_string()
    }

    fn temp_path(name: &str) -> String {
        let p = std::env::temp_dir().join(format!("seattally-{}-{}", std::process::id(), name));
        p.display().to_string()
    }

    fn args(cmd: &[&str]) -> Args {
        let mut v = vec!["seattally"];
        v.extend_from_slice(cmd);
        Args::parse_from(v)
    }

    fn party<'a>(summary: &'a JSValue, id: &str) -> &'a JSValue {
        summary["parties"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == id)
            .unwrap()
    }

    #[test]
    fn csv_files() {
        let districts = testdata("districts.csv");
        let party_list = testdata("party_list.csv");
        let a = args(&["-d", &districts, "-p", &party_list]);
        let config = build_config(&a).unwrap();
        let js = tally_config(&config, &[]).unwrap();

        // Three districts have votes, one has only zeros, one row is invalid.
        assert_eq!(js["overview"]["countedDistricts"], 3);
        assert_eq!(js["overview"]["totalDistricts"], 4);
        assert_eq!(js["overview"]["partyListSeats"], 7);

        let green = party(&js, "green");
        assert_eq!(green["districtSeats"], 2);
        assert_eq!(green["listSeats"], 4);
        assert_eq!(green["totalSeats"], 6);
        let blue = party(&js, "blue-wave");
        assert_eq!(blue["districtSeats"], 1);
        assert_eq!(blue["totalSeats"], 1);
        let red = party(&js, "red");
        assert_eq!(red["districtSeats"], 0);
        assert_eq!(red["listSeats"], 3);
        assert_eq!(js["parties"][0]["id"], "green");

        assert_eq!(js["provinces"].as_array().unwrap().len(), 2);

        // Green won น่าน 1 and สระบุรี 1, listed by province then district.
        let won = green["winners"].as_array().unwrap();
        assert_eq!(won.len(), 2);
        assert_eq!(won[0]["province"], "น่าน");
        assert_eq!(won[1]["province"], "สระบุรี");
        assert_eq!(party(&js, "red")["winners"].as_array().unwrap().len(), 0);

        let list = js["partyList"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], "green");
        assert_eq!(list[1]["listSeats"], 3);

        let regions = js["regions"].as_array().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0]["region"], "เหนือ");
        assert_eq!(regions[0]["provinces"][0]["province"], "น่าน");
        assert_eq!(regions[0]["provinces"][0]["districts"], 2);
        assert_eq!(regions[1]["provinces"][0]["districts"], 2);

        let districts = js["districts"].as_array().unwrap();
        assert_eq!(districts.len(), 3);
        assert_eq!(districts[0]["counted"], "10/20");
        assert_eq!(districts[0]["candidates"][0]["votes"], 1500);
        assert_eq!(districts[0]["candidates"][1]["party"], "Blue Wave");

        assert_eq!(js["filters"]["provinces"][0], "น่าน");
        assert_eq!(js["filters"]["parties"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn config_file_and_coalition() {
        let a = args(&["-c", &testdata("config.json")]);
        let config = build_config(&a).unwrap();
        assert_eq!(config.contest_name(), "Test election");
        let js = tally_config(&config, &["green".to_string(), "red".to_string()]).unwrap();
        assert_eq!(js["config"]["majorityThreshold"], 9);
        assert_eq!(js["coalition"]["totalSeats"], 9);
        assert_eq!(js["coalition"]["hasMajority"], true);
        assert_eq!(js["coalition"]["shortfall"], 0);
        // The configured color wins over the palette.
        assert_eq!(party(&js, "red")["color"], "#aa0000");
    }

    #[test]
    fn district_only_ranking() {
        let districts = testdata("districts.csv");
        let party_list = testdata("party_list.csv");
        let a = args(&["-d", &districts, "-p", &party_list, "--district-only"]);
        let config = build_config(&a).unwrap();
        let js = tally_config(&config, &[]).unwrap();
        assert_eq!(js["config"]["includePartyList"], false);
        assert_eq!(js["parties"][1]["id"], "blue-wave");
    }

    #[test]
    fn json_results() {
        let a = args(&["--results", &testdata("results.json")]);
        let config = build_config(&a).unwrap();
        let (data, origin) = load_data(&config).unwrap();
        assert_eq!(origin, DataOrigin::Fallback);
        assert_eq!(data.rows.len(), 4);
        let js = tally_config(&config, &[]).unwrap();
        assert_eq!(js["overview"]["countedDistricts"], 2);
        assert_eq!(party(&js, "green")["totalSeats"], 5);
    }

    #[test]
    fn unreachable_sheet_falls_back() {
        let mut config = TallyConfig {
            google_sheet: Some(GoogleSheet {
                sheet_id: "missing".to_string(),
                district_gid: None,
                party_list_gid: None,
                // Nothing listens on the discard port.
                base_url: Some("http://127.0.0.1:9".to_string()),
            }),
            fallback_results: Some(testdata("results.json")),
            ..TallyConfig::default()
        };
        let (_, origin) = load_data(&config).unwrap();
        assert_eq!(origin, DataOrigin::Fallback);

        config.fallback_results = None;
        let (data, origin) = load_data(&config).unwrap();
        assert_eq!(origin, DataOrigin::Nothing);
        assert!(data.rows.is_empty());
    }

    #[test]
    fn no_input() {
        let config = build_config(&args(&[])).unwrap();
        let res = load_data(&config);
        assert!(matches!(
            res.map_err(|e| *e),
            Err(TallyError::MissingInput {})
        ));
    }

    #[test]
    fn unknown_input_type() {
        assert!(build_config(&args(&["-d", "x.ods", "--input-type", "ods"])).is_err());
    }

    #[test]
    fn reference_roundtrip() {
        let out = temp_path("summary.json");
        let districts = testdata("districts.csv");
        let a = args(&["-d", &districts, "-o", &out]);
        run_tally(&a).unwrap();

        // The written summary is its own reference.
        let a = args(&["-d", &districts, "-o", &out, "-r", &out]);
        run_tally(&a).unwrap();

        let a = args(&["-d", &districts, "--district-only", "-r", &out]);
        let other = temp_path("other.json");
        let a = Args {
            out: Some(other.clone()),
            ..a
        };
        assert!(matches!(
            run_tally(&a).map_err(|e| *e),
            Err(TallyError::ReferenceMismatch {})
        ));
        let _ = fs::remove_file(out);
        let _ = fs::remove_file(other);
    }
}
